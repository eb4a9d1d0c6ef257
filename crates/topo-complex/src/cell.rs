use geom_kernel::ShapeHandle;
use geom_types::Dimension;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

// ─── Cell Keys ───────────────────────────────────────────────────────────────

new_key_type! {
    pub struct CellId;
}

// ─── Cells ───────────────────────────────────────────────────────────────────

/// Dimension-specific payload of a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellKind {
    Vertex {
        shape: ShapeHandle,
        curves: Vec<CellId>,
    },
    Curve {
        /// More than one shape for a composite curve.
        shapes: Vec<ShapeHandle>,
        vertices: Vec<CellId>,
        surfaces: Vec<CellId>,
    },
    Surface {
        /// More than one shape for a composite surface.
        shapes: Vec<ShapeHandle>,
        curves: Vec<CellId>,
        volumes: Vec<CellId>,
    },
    Volume {
        shape: ShapeHandle,
        surfaces: Vec<CellId>,
    },
}

impl CellKind {
    pub fn empty(dim: Dimension, shapes: Vec<ShapeHandle>) -> Option<Self> {
        let first = *shapes.first()?;
        Some(match dim {
            Dimension::Vertex => CellKind::Vertex {
                shape: first,
                curves: Vec::new(),
            },
            Dimension::Curve => CellKind::Curve {
                shapes,
                vertices: Vec::new(),
                surfaces: Vec::new(),
            },
            Dimension::Surface => CellKind::Surface {
                shapes,
                curves: Vec::new(),
                volumes: Vec::new(),
            },
            Dimension::Volume => CellKind::Volume {
                shape: first,
                surfaces: Vec::new(),
            },
        })
    }
}

/// A topological entity of fixed dimension wrapping kernel shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Process-unique, monotonically allocated. Drives ordering and naming.
    pub serial: u64,
    pub kind: CellKind,
    /// Names of the groups this cell is displayed in. Not owned by the complex.
    pub groups: Vec<String>,
    /// Tombstone flag: a retired cell has no adjacency and is kept only so
    /// that ids handed out earlier still resolve.
    pub retired: bool,
}

impl Cell {
    pub fn dimension(&self) -> Dimension {
        match self.kind {
            CellKind::Vertex { .. } => Dimension::Vertex,
            CellKind::Curve { .. } => Dimension::Curve,
            CellKind::Surface { .. } => Dimension::Surface,
            CellKind::Volume { .. } => Dimension::Volume,
        }
    }

    /// Display name such as `Pt0004` or `Vol0001`.
    pub fn name(&self) -> String {
        format!("{}{:04}", self.dimension().prefix(), self.serial)
    }

    pub fn shapes(&self) -> &[ShapeHandle] {
        match &self.kind {
            CellKind::Vertex { shape, .. } | CellKind::Volume { shape, .. } => {
                std::slice::from_ref(shape)
            }
            CellKind::Curve { shapes, .. } | CellKind::Surface { shapes, .. } => shapes,
        }
    }

    pub fn is_composite(&self) -> bool {
        self.shapes().len() > 1
    }

    /// Adjacent cells one dimension down.
    pub fn down(&self) -> &[CellId] {
        match &self.kind {
            CellKind::Vertex { .. } => &[],
            CellKind::Curve { vertices, .. } => vertices,
            CellKind::Surface { curves, .. } => curves,
            CellKind::Volume { surfaces, .. } => surfaces,
        }
    }

    /// Adjacent cells one dimension up.
    pub fn up(&self) -> &[CellId] {
        match &self.kind {
            CellKind::Vertex { curves, .. } => curves,
            CellKind::Curve { surfaces, .. } => surfaces,
            CellKind::Surface { volumes, .. } => volumes,
            CellKind::Volume { .. } => &[],
        }
    }

    pub fn has_adjacency(&self) -> bool {
        !self.down().is_empty() || !self.up().is_empty()
    }

    pub(crate) fn down_mut(&mut self) -> Option<&mut Vec<CellId>> {
        match &mut self.kind {
            CellKind::Vertex { .. } => None,
            CellKind::Curve { vertices, .. } => Some(vertices),
            CellKind::Surface { curves, .. } => Some(curves),
            CellKind::Volume { surfaces, .. } => Some(surfaces),
        }
    }

    pub(crate) fn up_mut(&mut self) -> Option<&mut Vec<CellId>> {
        match &mut self.kind {
            CellKind::Vertex { curves, .. } => Some(curves),
            CellKind::Curve { surfaces, .. } => Some(surfaces),
            CellKind::Surface { volumes, .. } => Some(volumes),
            CellKind::Volume { .. } => None,
        }
    }

    /// Replace the kernel representation, keeping the arity rules of the kind.
    pub(crate) fn set_shapes(&mut self, new_shapes: Vec<ShapeHandle>) -> bool {
        match &mut self.kind {
            CellKind::Vertex { shape, .. } | CellKind::Volume { shape, .. } => {
                if new_shapes.len() != 1 {
                    return false;
                }
                *shape = new_shapes[0];
            }
            CellKind::Curve { shapes, .. } | CellKind::Surface { shapes, .. } => {
                if new_shapes.is_empty() {
                    return false;
                }
                *shapes = new_shapes;
            }
        }
        true
    }
}
