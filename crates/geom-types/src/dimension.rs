use serde::{Deserialize, Serialize};

/// Topological dimension of a cell or kernel sub-shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Vertex = 0,
    Curve = 1,
    Surface = 2,
    Volume = 3,
}

impl Dimension {
    /// All dimensions, lowest first.
    pub const ALL: [Dimension; 4] = [
        Dimension::Vertex,
        Dimension::Curve,
        Dimension::Surface,
        Dimension::Volume,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The dimension immediately below, if any.
    pub fn lower(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// The dimension immediately above, if any.
    pub fn higher(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// Name prefix used when displaying cells of this dimension.
    pub fn prefix(self) -> &'static str {
        match self {
            Dimension::Vertex => "Pt",
            Dimension::Curve => "Crb",
            Dimension::Surface => "Surf",
            Dimension::Volume => "Vol",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Vertex => "vertex",
            Dimension::Curve => "curve",
            Dimension::Surface => "surface",
            Dimension::Volume => "volume",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
