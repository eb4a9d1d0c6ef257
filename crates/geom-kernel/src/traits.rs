use geom_types::{Axis, BoundingBox, Dimension, Point3d};

use crate::types::*;

/// Core geometry kernel trait. Provides shape construction, booleans and
/// lineage queries. Implemented by MockKernel (deterministic test double).
pub trait Kernel {
    /// Create an isolated vertex.
    fn make_vertex(&mut self, point: Point3d) -> ShapeHandle;

    /// Create a straight edge between two distinct points.
    fn make_segment(&mut self, start: Point3d, end: Point3d) -> Result<ShapeHandle, KernelError>;

    /// Create an axis-aligned planar rectangle from two opposite corners.
    /// The corners must share exactly one coordinate.
    fn make_rectangle(&mut self, a: Point3d, b: Point3d) -> Result<ShapeHandle, KernelError>;

    /// Create an axis-aligned box solid from its min and max corners.
    fn make_box(&mut self, min: Point3d, max: Point3d) -> Result<ShapeHandle, KernelError>;

    /// Create an unbounded half-space tool.
    fn make_half_space(&mut self, axis: Axis, offset: f64, side: Side) -> ShapeHandle;

    /// Create an unbounded splitting plane normal to `axis`.
    fn make_plane(&mut self, axis: Axis, offset: f64) -> ShapeHandle;

    /// Group shapes into a compound without merging anything.
    fn make_compound(&mut self, shapes: &[ShapeHandle]) -> Result<ShapeHandle, KernelError>;

    /// Run a boolean operation. The first shape is the object, the rest are tools
    /// (for Fuse and Sew all shapes play the same role).
    fn compute_boolean(
        &mut self,
        op: BooleanOp,
        shapes: &[ShapeHandle],
    ) -> Result<ShapeHandle, KernelError>;

    /// Lineage query: the pieces `target` becomes after a general fuse with
    /// `tool`, restricted to the region of `target`.
    fn split_modified(
        &mut self,
        target: ShapeHandle,
        tool: ShapeHandle,
    ) -> Result<Vec<ShapeHandle>, KernelError>;
}

/// Topology introspection trait. Provides read-only queries on kernel shapes.
pub trait KernelIntrospect {
    /// Kind of a shape, or `None` for an unknown handle.
    fn shape_kind(&self, shape: ShapeHandle) -> Option<ShapeKind>;

    /// All distinct sub-shapes of one dimension, in kernel enumeration order.
    /// A shape of that dimension decomposes to itself.
    fn decompose(&self, shape: ShapeHandle, dim: Dimension) -> Vec<ShapeHandle>;

    /// Sub-shapes one dimension down, in full traversal order (repeats kept).
    fn boundary_of(&self, shape: ShapeHandle) -> Vec<ShapeHandle>;

    /// Geometric equality within `tol`.
    fn equal(&self, a: ShapeHandle, b: ShapeHandle, tol: f64) -> bool;

    /// Whether `b` lies entirely inside `a`, within `tol`.
    fn contains(&self, a: ShapeHandle, b: ShapeHandle, tol: f64) -> bool;

    fn bounding_box(&self, shape: ShapeHandle) -> BoundingBox;

    /// Length, area or volume depending on the shape's dimension.
    fn measure(&self, shape: ShapeHandle) -> f64;

    /// Positions of every distinct vertex of the shape.
    fn vertex_points(&self, shape: ShapeHandle) -> Vec<Point3d>;

    /// Parametric midpoint of an edge.
    fn midpoint(&self, edge: ShapeHandle) -> Option<Point3d>;

    fn shape_dimension(&self, shape: ShapeHandle) -> Option<Dimension> {
        self.shape_kind(shape).and_then(ShapeKind::dimension)
    }
}
