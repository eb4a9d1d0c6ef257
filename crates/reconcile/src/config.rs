//! Options controlling a reconciliation pass.

use geom_types::Tolerance;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconcileOptions {
    /// Track replacements of removed volumes (pairwise containment checks).
    pub replace_volumes: bool,
    /// Destroy isolated vertices created by the pass.
    pub delete_orphan_vertices: bool,
    /// Repair adjacent volumes whose surfaces were modified.
    pub propagate_adjacent: bool,
    pub tolerance: Tolerance,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            replace_volumes: true,
            delete_orphan_vertices: true,
            propagate_adjacent: true,
            tolerance: Tolerance::default(),
        }
    }
}

impl ReconcileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps isolated vertices, which a curve split reattaches afterwards.
    pub fn for_curve_split() -> Self {
        Self {
            delete_orphan_vertices: false,
            ..Self::default()
        }
    }

    /// Skips volume replacement tracking; unmatched adjacent volumes are kept.
    pub fn without_volume_tracking() -> Self {
        Self {
            replace_volumes: false,
            ..Self::default()
        }
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }
}
