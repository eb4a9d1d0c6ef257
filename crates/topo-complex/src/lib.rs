//! Cellular topological complex layered over kernel shapes.
//!
//! Cells live in an arena owned by [`Complex`] and refer to each other by
//! [`CellId`]. Adjacency is kept bidirectional by construction: the only way
//! to add or remove an edge is through [`Complex::link`] / [`Complex::unlink`].

pub mod audit;
pub mod cell;
pub mod complex;

pub use audit::{audit_complex, AdjacencyError, ComplexAudit};
pub use cell::{Cell, CellId, CellKind};
pub use complex::{Complex, ComplexError};
