use geom_types::Dimension;
use serde::{Deserialize, Serialize};

/// Opaque handle to a shape in the geometry kernel.
/// Valid only for the current kernel session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShapeHandle(pub u64);

impl std::fmt::Display for ShapeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of shape a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Vertex,
    Edge,
    Face,
    Solid,
    Compound,
    /// Unbounded tool region on one side of an axis plane.
    HalfSpace,
    /// Unbounded splitting plane.
    Plane,
}

impl ShapeKind {
    /// Topological dimension, for the kinds that map onto a cell.
    pub fn dimension(self) -> Option<Dimension> {
        match self {
            ShapeKind::Vertex => Some(Dimension::Vertex),
            ShapeKind::Edge => Some(Dimension::Curve),
            ShapeKind::Face => Some(Dimension::Surface),
            ShapeKind::Solid => Some(Dimension::Volume),
            ShapeKind::Compound | ShapeKind::HalfSpace | ShapeKind::Plane => None,
        }
    }

    /// The kind a cell of `dim` is expected to wrap.
    pub fn for_dimension(dim: Dimension) -> Self {
        match dim {
            Dimension::Vertex => ShapeKind::Vertex,
            Dimension::Curve => ShapeKind::Edge,
            Dimension::Surface => ShapeKind::Face,
            Dimension::Volume => ShapeKind::Solid,
        }
    }
}

/// Boolean and splitting operations offered by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOp {
    Cut,
    Fuse,
    Common,
    Sew,
    /// General splitter: the first shape cut by all the others, pieces kept.
    Split,
}

/// Which side of an axis plane a half-space covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Coordinates at or below the plane offset.
    Below,
    /// Coordinates at or above the plane offset.
    Above,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Below => Side::Above,
            Side::Above => Side::Below,
        }
    }
}

/// Errors from kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("boolean {op:?} failed: {reason}")]
    BooleanFailed { op: BooleanOp, reason: String },

    #[error("boolean {op:?} produced no shape")]
    DegenerateResult { op: BooleanOp },

    #[error("shape not found: {handle}")]
    ShapeNotFound { handle: ShapeHandle },

    #[error("operation not supported: {operation}")]
    NotSupported { operation: String },

    #[error("kernel error: {message}")]
    Other { message: String },
}
