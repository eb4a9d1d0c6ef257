//! Editing commands over a topological complex.
//!
//! Every command follows the same shape: validate the input cells, snapshot
//! the complex, ask the kernel for a result shape, reconcile, then move group
//! membership from removed cells to their successors. A failure at any step
//! restores the snapshot.

pub mod boolean;
mod command;
pub mod create;
pub mod glue;
pub mod groups;
pub mod remove;
pub mod section;
pub mod split;
pub mod types;

pub use boolean::{execute_common, execute_cut, execute_fuse, Tool};
pub use create::{
    execute_import, execute_new_box, execute_new_rectangle, execute_new_segment,
    execute_new_vertex,
};
pub use glue::{execute_glue, execute_glue_all};
pub use groups::transfer_groups;
pub use remove::execute_remove;
pub use section::execute_section;
pub use split::execute_split_curve;
pub use types::*;
