use serde::{Deserialize, Serialize};

use crate::point::Point3d;

/// Tolerance thresholds for geometric identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Points closer than this are considered coincident.
    pub coincidence: f64,
    /// Relative grid step for canonical ordering, scaled by the extent of
    /// the shape being decomposed.
    pub relative: f64,
    /// Curves shorter than this (and faces smaller than its square) are degenerate.
    pub degenerate_length: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            coincidence: 1e-7,
            relative: 1e-6,
            degenerate_length: 1e-10,
        }
    }
}

impl Tolerance {
    pub fn points_coincident(&self, a: &Point3d, b: &Point3d) -> bool {
        a.distance_to(b) < self.coincidence
    }

    pub fn is_zero_length(&self, length: f64) -> bool {
        length.abs() < self.degenerate_length
    }

    pub fn is_zero_area(&self, area: f64) -> bool {
        area <= self.degenerate_length * self.degenerate_length
    }

    /// Ordering grid step for a shape of the given extent.
    pub fn ordering_step(&self, extent: f64) -> f64 {
        (self.relative * extent).max(self.coincidence)
    }
}
