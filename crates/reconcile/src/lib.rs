//! Topology reconciliation: rebuild a consistent complex around the shape a
//! kernel operation produced.
//!
//! A pass runs in stages, each a method on [`Session`]:
//!
//! 1. [`ReferenceSet::collect`]: reference closure and adjacent cells.
//! 2. [`Session::classify_shape`]: kept / reused / created per dimension,
//!    in canonical order.
//! 3. [`Session::connect`]: additive relinking from kernel boundaries.
//! 4. [`Session::clean`] and [`Session::build_replacements`]: removed set,
//!    orphan cleanup and the old→new replacement map.
//! 5. [`Session::propagate`]: localized repair of adjacent volumes.
//!
//! [`reconcile`] chains them for the common case.

pub mod cleanup;
pub mod classify;
pub mod config;
pub mod connect;
pub mod diagnostics;
pub mod error;
pub mod order;
pub mod propagate;
pub mod reference;
pub mod replace;
pub mod session;

pub use classify::{Classification, PassMode};
pub use config::ReconcileOptions;
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::ReconcileError;
pub use reference::{strip_internal_links, ReferenceSet};
pub use session::{reconcile, reconcile_all, ReconcileResult, Session};
