//! Canonical ordering of kernel sub-shapes.
//!
//! Kernel enumeration order is an implementation detail, so the sub-shapes of
//! each dimension are sorted on geometric keys quantized to a grid scaled by
//! the extent of the parent shape. Keys that still collide keep kernel order
//! and are reported.

use geom_kernel::{KernelIntrospect, ShapeHandle};
use geom_types::{Dimension, Point3d};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CanonicalKey {
    /// Quantized bounding box, min corner then max corner.
    corners: [i64; 6],
    /// Quantized vertex positions (plus the midpoint for curves), sorted.
    points: Vec<[i64; 3]>,
    measure: i64,
}

fn quantize(value: f64, step: f64) -> i64 {
    (value / step).round() as i64
}

fn quantize_point(p: &Point3d, step: f64) -> [i64; 3] {
    [quantize(p.x, step), quantize(p.y, step), quantize(p.z, step)]
}

pub fn canonical_key(
    kernel: &dyn KernelIntrospect,
    shape: ShapeHandle,
    step: f64,
) -> CanonicalKey {
    let bbox = kernel.bounding_box(shape);
    let lo = quantize_point(&bbox.min, step);
    let hi = quantize_point(&bbox.max, step);

    let mut points: Vec<[i64; 3]> = kernel
        .vertex_points(shape)
        .iter()
        .map(|p| quantize_point(p, step))
        .collect();
    if kernel.shape_dimension(shape) == Some(Dimension::Curve) {
        if let Some(mid) = kernel.midpoint(shape) {
            points.push(quantize_point(&mid, step));
        }
    }
    points.sort_unstable();

    CanonicalKey {
        corners: [lo[0], lo[1], lo[2], hi[0], hi[1], hi[2]],
        points,
        measure: quantize(kernel.measure(shape), step),
    }
}

/// Sub-shapes in canonical order, with the groups whose keys collided.
#[derive(Debug, Clone, Default)]
pub struct Ordered {
    pub shapes: Vec<ShapeHandle>,
    pub ties: Vec<Vec<ShapeHandle>>,
}

pub fn canonical_order(
    kernel: &dyn KernelIntrospect,
    shapes: &[ShapeHandle],
    step: f64,
) -> Ordered {
    let mut keyed: Vec<(CanonicalKey, ShapeHandle)> = shapes
        .iter()
        .map(|&s| (canonical_key(kernel, s, step), s))
        .collect();
    // Stable: tied shapes keep kernel order.
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    let mut ties = Vec::new();
    let mut start = 0;
    for i in 1..=keyed.len() {
        if i == keyed.len() || keyed[i].0 != keyed[start].0 {
            if i - start > 1 {
                ties.push(keyed[start..i].iter().map(|(_, s)| *s).collect());
            }
            start = i;
        }
    }

    Ordered {
        shapes: keyed.into_iter().map(|(_, s)| s).collect(),
        ties,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom_kernel::{Kernel, MockKernel};

    #[test]
    fn box_vertices_sort_lexicographically() {
        let mut k = MockKernel::new();
        let b = k
            .make_box(Point3d::new(0.0, 0.0, 0.0), Point3d::new(1.0, 2.0, 3.0))
            .unwrap();
        let verts = k.decompose(b, Dimension::Vertex);
        let ordered = canonical_order(&k, &verts, 1e-6);
        let points: Vec<[f64; 3]> = ordered
            .shapes
            .iter()
            .map(|v| k.vertex_points(*v)[0].to_array())
            .collect();
        let mut sorted = points.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(points, sorted);
        assert!(ordered.ties.is_empty());
    }

    #[test]
    fn order_ignores_enumeration_order() {
        let mut k = MockKernel::new();
        let b = k
            .make_box(Point3d::new(0.0, 0.0, 0.0), Point3d::new(1.0, 1.0, 1.0))
            .unwrap();
        let mut edges = k.decompose(b, Dimension::Curve);
        let forward = canonical_order(&k, &edges, 1e-6).shapes;
        edges.reverse();
        let backward = canonical_order(&k, &edges, 1e-6).shapes;
        assert_eq!(forward, backward);
    }

    #[test]
    fn coincident_shapes_are_reported_as_ties() {
        let mut k = MockKernel::new();
        let a = k.make_vertex(Point3d::new(1.0, 1.0, 1.0));
        let b = k.make_vertex(Point3d::new(1.0, 1.0, 1.0 + 1e-9));
        let c = k.make_vertex(Point3d::new(2.0, 0.0, 0.0));
        let ordered = canonical_order(&k, &[c, b, a], 1e-6);
        assert_eq!(ordered.shapes, vec![b, a, c]);
        assert_eq!(ordered.ties, vec![vec![b, a]]);
    }

    #[test]
    fn grid_absorbs_noise() {
        let mut k = MockKernel::new();
        let a = k.make_vertex(Point3d::new(0.5, 0.0, 0.0));
        let b = k.make_vertex(Point3d::new(0.5 + 1e-9, 0.0, 0.0));
        assert_eq!(canonical_key(&k, a, 1e-6), canonical_key(&k, b, 1e-6));
    }
}
