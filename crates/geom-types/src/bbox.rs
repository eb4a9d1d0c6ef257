use serde::{Deserialize, Serialize};

use crate::point::{Axis, Point3d};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3d,
    pub max: Point3d,
}

impl BoundingBox {
    pub fn new(min: Point3d, max: Point3d) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3d::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3d::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points(points: &[Point3d]) -> Self {
        let mut bb = Self::empty();
        for p in points {
            bb.expand_to_include(p);
        }
        bb
    }

    pub fn expand_to_include(&mut self, p: &Point3d) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut bb = *self;
        bb.expand_to_include(&other.min);
        bb.expand_to_include(&other.max);
        bb
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    pub fn extent(&self, axis: Axis) -> f64 {
        self.max.coord(axis) - self.min.coord(axis)
    }

    /// Length of the main diagonal; zero for a point-sized box.
    pub fn diagonal(&self) -> f64 {
        if self.is_valid() {
            self.min.distance_to(&self.max)
        } else {
            0.0
        }
    }

    pub fn volume(&self) -> f64 {
        if !self.is_valid() {
            return 0.0;
        }
        Axis::ALL.iter().map(|&a| self.extent(a)).product()
    }

    pub fn center(&self) -> Point3d {
        self.min.midpoint(&self.max)
    }

    /// Overlap test with closed boundaries.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        Axis::ALL.iter().all(|&a| {
            self.min.coord(a) <= other.max.coord(a) && other.min.coord(a) <= self.max.coord(a)
        })
    }

    /// Intersection box, or `None` when the boxes do not overlap.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.intersects(other) {
            return None;
        }
        Some(BoundingBox::new(
            Point3d::new(
                self.min.x.max(other.min.x),
                self.min.y.max(other.min.y),
                self.min.z.max(other.min.z),
            ),
            Point3d::new(
                self.max.x.min(other.max.x),
                self.max.y.min(other.max.y),
                self.max.z.min(other.max.z),
            ),
        ))
    }

    pub fn contains_point(&self, p: &Point3d, tol: f64) -> bool {
        Axis::ALL.iter().all(|&a| {
            p.coord(a) >= self.min.coord(a) - tol && p.coord(a) <= self.max.coord(a) + tol
        })
    }

    pub fn contains_box(&self, other: &BoundingBox, tol: f64) -> bool {
        self.contains_point(&other.min, tol) && self.contains_point(&other.max, tol)
    }

    /// Corner-wise equality within `tol`.
    pub fn approx_eq(&self, other: &BoundingBox, tol: f64) -> bool {
        self.min.distance_to(&other.min) < tol && self.max.distance_to(&other.max) < tol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounding_box_from_points() {
        let bb = BoundingBox::from_points(&[
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 2.0, 3.0),
            Point3d::new(-1.0, 0.5, 1.0),
        ]);
        assert_relative_eq!(bb.min.x, -1.0);
        assert_relative_eq!(bb.max.y, 2.0);
        assert_relative_eq!(bb.volume(), 2.0 * 2.0 * 3.0);
    }

    #[test]
    fn test_bounding_box_intersection() {
        let a = BoundingBox::new(Point3d::new(0.0, 0.0, 0.0), Point3d::new(2.0, 2.0, 2.0));
        let b = BoundingBox::new(Point3d::new(1.0, 1.0, 1.0), Point3d::new(3.0, 3.0, 3.0));
        let c = BoundingBox::new(Point3d::new(5.0, 5.0, 5.0), Point3d::new(6.0, 6.0, 6.0));
        let ab = a.intersection(&b).unwrap();
        assert_relative_eq!(ab.volume(), 1.0);
        assert!(a.intersection(&c).is_none());
    }

    #[test]
    fn test_empty_box_is_invalid() {
        let bb = BoundingBox::empty();
        assert!(!bb.is_valid());
        assert_eq!(bb.diagonal(), 0.0);
        assert_eq!(bb.volume(), 0.0);
    }

    #[test]
    fn test_contains_box_with_tolerance() {
        let outer = BoundingBox::new(Point3d::ORIGIN, Point3d::new(1.0, 1.0, 1.0));
        let inner = BoundingBox::new(
            Point3d::new(0.0, 0.0, -1e-9),
            Point3d::new(0.5, 1.0, 1.0),
        );
        assert!(outer.contains_box(&inner, 1e-7));
        assert!(!inner.contains_box(&outer, 1e-7));
    }
}
