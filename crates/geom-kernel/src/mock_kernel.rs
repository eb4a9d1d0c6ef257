//! MockKernel: deterministic test double implementing Kernel + KernelIntrospect.
//!
//! Geometry is rectilinear: vertices, straight edges, axis-aligned rectangles
//! and solids made of disjoint boxes. Every operation result is built by one
//! `ShapeBuilder`, which shares coincident vertices, edges and faces and splits
//! edges at vertices lying on them, so results look like a real BRep kernel's
//! non-unified output.

use std::collections::HashMap;

use geom_types::{Axis, BoundingBox, Dimension, Point3d};
use tracing::debug;

use crate::primitives::{fuse_specs, FaceRect, SolidSpec};
use crate::traits::{Kernel, KernelIntrospect};
use crate::types::*;

#[derive(Debug, Clone)]
enum MockShape {
    Vertex { point: Point3d },
    Edge { start: ShapeHandle, end: ShapeHandle },
    Face { rect: FaceRect, edges: Vec<ShapeHandle> },
    Solid { blocks: Vec<BoundingBox>, faces: Vec<ShapeHandle> },
    Compound { children: Vec<ShapeHandle> },
    HalfSpace { axis: Axis, offset: f64, side: Side },
    Plane { axis: Axis, offset: f64 },
}

/// Deterministic test double for the geometry kernel.
pub struct MockKernel {
    next_handle: u64,
    shapes: HashMap<ShapeHandle, MockShape>,
    tolerance: f64,
    split_modified_calls: usize,
}

impl MockKernel {
    pub fn new() -> Self {
        Self::with_tolerance(1e-7)
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            next_handle: 1,
            shapes: HashMap::new(),
            tolerance,
            split_modified_calls: 0,
        }
    }

    /// Number of lineage queries answered so far.
    pub fn split_modified_calls(&self) -> usize {
        self.split_modified_calls
    }

    /// Number of shapes ever allocated.
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    fn alloc(&mut self, shape: MockShape) -> ShapeHandle {
        let h = ShapeHandle(self.next_handle);
        self.next_handle += 1;
        self.shapes.insert(h, shape);
        h
    }

    fn get(&self, h: ShapeHandle) -> Result<&MockShape, KernelError> {
        self.shapes
            .get(&h)
            .ok_or(KernelError::ShapeNotFound { handle: h })
    }

    fn point_of(&self, h: ShapeHandle) -> Option<Point3d> {
        match self.shapes.get(&h) {
            Some(MockShape::Vertex { point }) => Some(*point),
            _ => None,
        }
    }

    fn segment_of(&self, h: ShapeHandle) -> Option<(Point3d, Point3d)> {
        match self.shapes.get(&h) {
            Some(MockShape::Edge { start, end }) => Some((self.point_of(*start)?, self.point_of(*end)?)),
            _ => None,
        }
    }

    fn rect_of(&self, h: ShapeHandle) -> Option<FaceRect> {
        match self.shapes.get(&h) {
            Some(MockShape::Face { rect, .. }) => Some(*rect),
            _ => None,
        }
    }

    fn spec_of(&self, h: ShapeHandle) -> Option<SolidSpec> {
        match self.shapes.get(&h) {
            Some(MockShape::Solid { blocks, faces }) => Some(SolidSpec {
                blocks: blocks.clone(),
                faces: faces.iter().filter_map(|f| self.rect_of(*f)).collect(),
            }),
            _ => None,
        }
    }

    fn blocks_of(&self, h: ShapeHandle) -> &[BoundingBox] {
        match self.shapes.get(&h) {
            Some(MockShape::Solid { blocks, .. }) => blocks,
            _ => &[],
        }
    }

    /// Solids of a shape as specs; errors when the shape holds anything else.
    fn solid_specs(&self, shape: ShapeHandle, op: BooleanOp) -> Result<Vec<SolidSpec>, KernelError> {
        self.get(shape)?;
        let solids = self.decompose(shape, Dimension::Volume);
        let lower = [Dimension::Surface, Dimension::Curve, Dimension::Vertex]
            .iter()
            .any(|&d| {
                self.decompose(shape, d).iter().any(|s| {
                    !solids
                        .iter()
                        .any(|solid| self.decompose(*solid, d).contains(s))
                })
            });
        if lower {
            return Err(KernelError::NotSupported {
                operation: format!("{op:?} on non-solid shapes"),
            });
        }
        Ok(solids.iter().filter_map(|s| self.spec_of(*s)).collect())
    }

    fn finish(&mut self, mut built: Vec<ShapeHandle>) -> Result<ShapeHandle, KernelError> {
        if built.len() == 1 {
            return Ok(built.remove(0));
        }
        self.make_compound(&built)
    }

    fn fuse(&mut self, shapes: &[ShapeHandle]) -> Result<ShapeHandle, KernelError> {
        let mut specs = Vec::new();
        for &s in shapes {
            specs.extend(self.solid_specs(s, BooleanOp::Fuse)?);
        }
        let fused = fuse_specs(&specs, self.tolerance).map_err(|reason| {
            KernelError::BooleanFailed {
                op: BooleanOp::Fuse,
                reason,
            }
        })?;
        let built = ShapeBuilder::new(self).solids(&fused, &[]);
        self.finish(built)
    }

    fn cut(&mut self, object: ShapeHandle, tools: &[ShapeHandle]) -> Result<ShapeHandle, KernelError> {
        let mut specs = self.solid_specs(object, BooleanOp::Cut)?;
        for &tool in tools {
            let tool_shape = self.get(tool)?.clone();
            specs = match tool_shape {
                MockShape::HalfSpace { axis, offset, side } => specs
                    .iter()
                    .filter_map(|s| s.keep_side(axis, offset, side.opposite(), self.tolerance))
                    .collect(),
                MockShape::Solid { blocks, .. } if blocks.len() == 1 => {
                    let mut kept = Vec::new();
                    for spec in &specs {
                        kept.extend(self.cut_by_box(spec, &blocks[0])?);
                    }
                    kept
                }
                _ => {
                    return Err(KernelError::NotSupported {
                        operation: "cut by a tool other than a half-space or box".to_string(),
                    })
                }
            };
        }
        if specs.is_empty() {
            return Err(KernelError::DegenerateResult { op: BooleanOp::Cut });
        }
        let built = ShapeBuilder::new(self).solids(&specs, &[]);
        self.finish(built)
    }

    /// Box tools are supported when they miss the solid, swallow it, or act
    /// as a half-space over its extent.
    fn cut_by_box(&self, spec: &SolidSpec, tool: &BoundingBox) -> Result<Option<SolidSpec>, KernelError> {
        let tol = self.tolerance;
        let overlaps = spec.blocks.iter().any(|b| {
            b.intersection(tool)
                .map(|c| c.volume() > tol)
                .unwrap_or(false)
        });
        if !overlaps {
            return Ok(Some(spec.clone()));
        }
        let bb = spec.bbox();
        if tool.contains_box(&bb, tol) {
            return Ok(None);
        }
        let spans = |a: Axis| {
            tool.min.coord(a) <= bb.min.coord(a) + tol && tool.max.coord(a) >= bb.max.coord(a) - tol
        };
        for axis in Axis::ALL {
            let (u, v) = axis.others();
            if !(spans(u) && spans(v)) {
                continue;
            }
            if tool.min.coord(axis) <= bb.min.coord(axis) + tol {
                return Ok(spec.keep_side(axis, tool.max.coord(axis), Side::Above, tol));
            }
            if tool.max.coord(axis) >= bb.max.coord(axis) - tol {
                return Ok(spec.keep_side(axis, tool.min.coord(axis), Side::Below, tol));
            }
        }
        Err(KernelError::NotSupported {
            operation: "cut by a box that pierces the solid".to_string(),
        })
    }

    fn common(&mut self, object: ShapeHandle, tools: &[ShapeHandle]) -> Result<ShapeHandle, KernelError> {
        let mut specs = self.solid_specs(object, BooleanOp::Common)?;
        for &tool in tools {
            let tool_shape = self.get(tool)?.clone();
            specs = match tool_shape {
                MockShape::HalfSpace { axis, offset, side } => specs
                    .iter()
                    .filter_map(|s| s.keep_side(axis, offset, side, self.tolerance))
                    .collect(),
                MockShape::Solid { blocks, .. } => {
                    let region = blocks
                        .iter()
                        .fold(BoundingBox::empty(), |acc, b| acc.union(b));
                    if blocks.len() != 1 {
                        return Err(KernelError::NotSupported {
                            operation: "common with a multi-block solid".to_string(),
                        });
                    }
                    specs
                        .iter()
                        .filter_map(|s| s.intersect_box(&region, self.tolerance))
                        .collect()
                }
                _ => {
                    return Err(KernelError::NotSupported {
                        operation: "common with a tool other than a half-space or box".to_string(),
                    })
                }
            };
        }
        if specs.is_empty() {
            return Err(KernelError::DegenerateResult {
                op: BooleanOp::Common,
            });
        }
        let built = ShapeBuilder::new(self).solids(&specs, &[]);
        self.finish(built)
    }

    fn sew(&mut self, shapes: &[ShapeHandle]) -> Result<ShapeHandle, KernelError> {
        let mut items = Vec::new();
        for &s in shapes {
            self.get(s)?;
            self.collect_items(s, &mut items);
        }
        if items.is_empty() {
            return Err(KernelError::DegenerateResult { op: BooleanOp::Sew });
        }
        let built = ShapeBuilder::new(self).items(&items, &[]);
        self.make_compound(&built)
    }

    /// Flatten a shape into independent top-level items, dropping sub-shapes
    /// already covered by a solid or face of the same shape.
    fn collect_items(&self, shape: ShapeHandle, out: &mut Vec<BuildItem>) {
        match self.shapes.get(&shape) {
            Some(MockShape::Compound { children }) => {
                for c in children {
                    self.collect_items(*c, out);
                }
            }
            Some(MockShape::Solid { .. }) => {
                if let Some(spec) = self.spec_of(shape) {
                    out.push(BuildItem::Solid(spec));
                }
            }
            Some(MockShape::Face { rect, .. }) => out.push(BuildItem::Face(*rect)),
            Some(MockShape::Edge { .. }) => {
                if let Some((a, b)) = self.segment_of(shape) {
                    out.push(BuildItem::Edge(a, b));
                }
            }
            Some(MockShape::Vertex { point }) => out.push(BuildItem::Vertex(*point)),
            _ => {}
        }
    }

    fn split(&mut self, object: ShapeHandle, tools: &[ShapeHandle]) -> Result<ShapeHandle, KernelError> {
        let tol = self.tolerance;
        let mut items = Vec::new();
        self.get(object)?;
        self.collect_items(object, &mut items);

        let mut extra_points = Vec::new();
        for &tool in tools {
            let tool_shape = self.get(tool)?.clone();
            match tool_shape {
                MockShape::Plane { axis, offset } => {
                    items = items
                        .into_iter()
                        .flat_map(|item| item.split_by_plane(axis, offset, tol))
                        .collect();
                }
                _ => {
                    let points = self.vertex_points(tool);
                    if points.is_empty() {
                        return Err(KernelError::NotSupported {
                            operation: "split by a tool without vertices".to_string(),
                        });
                    }
                    extra_points.extend(points);
                }
            }
        }
        if items.is_empty() {
            return Err(KernelError::DegenerateResult { op: BooleanOp::Split });
        }
        let built = ShapeBuilder::new(self).items(&items, &extra_points);
        self.finish(built)
    }

    fn solid_contains(&self, blocks: &[BoundingBox], b: ShapeHandle, tol: f64) -> bool {
        let inside = |p: &Point3d| blocks.iter().any(|blk| blk.contains_point(p, tol));
        match self.shapes.get(&b) {
            Some(MockShape::Solid { blocks: inner, .. }) => inner.iter().all(|ib| {
                let covered: f64 = blocks
                    .iter()
                    .filter_map(|blk| blk.intersection(ib))
                    .map(|c| c.volume())
                    .sum();
                covered >= ib.volume() - tol * ib.volume().max(1.0)
            }),
            Some(MockShape::Compound { children }) => {
                children.iter().all(|c| self.solid_contains(blocks, *c, tol))
            }
            Some(_) => {
                let points = self.vertex_points(b);
                !points.is_empty()
                    && points.iter().all(|p| inside(p))
                    && inside(&self.bounding_box(b).center())
            }
            None => false,
        }
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

/// One independent piece of geometry to be rebuilt.
#[derive(Debug, Clone)]
enum BuildItem {
    Vertex(Point3d),
    Edge(Point3d, Point3d),
    Face(FaceRect),
    Solid(SolidSpec),
}

impl BuildItem {
    fn corner_points(&self) -> Vec<Point3d> {
        match self {
            BuildItem::Vertex(p) => vec![*p],
            BuildItem::Edge(a, b) => vec![*a, *b],
            BuildItem::Face(r) => r.corners().to_vec(),
            BuildItem::Solid(s) => s.faces.iter().flat_map(|f| f.corners()).collect(),
        }
    }

    fn split_by_plane(self, axis: Axis, offset: f64, tol: f64) -> Vec<BuildItem> {
        match self {
            BuildItem::Solid(spec) => {
                let pieces: Vec<BuildItem> = [Side::Below, Side::Above]
                    .iter()
                    .filter_map(|&side| spec.keep_side(axis, offset, side, tol))
                    .map(BuildItem::Solid)
                    .collect();
                pieces
            }
            BuildItem::Face(rect) => {
                let i = match rect.normal.others() {
                    (u, _) if u == axis => 0,
                    (_, v) if v == axis => 1,
                    _ => return vec![BuildItem::Face(rect)],
                };
                let mut cuts = [Vec::new(), Vec::new()];
                cuts[i].push(offset);
                rect.tiled(&cuts, tol).into_iter().map(BuildItem::Face).collect()
            }
            BuildItem::Edge(a, b) => {
                let (ca, cb) = (a.coord(axis), b.coord(axis));
                let crosses = (ca - offset) * (cb - offset) < 0.0
                    && (ca - offset).abs() > tol
                    && (cb - offset).abs() > tol;
                if !crosses {
                    return vec![BuildItem::Edge(a, b)];
                }
                let p = a.lerp(&b, (offset - ca) / (cb - ca));
                vec![BuildItem::Edge(a, p), BuildItem::Edge(p, b)]
            }
            BuildItem::Vertex(p) => vec![BuildItem::Vertex(p)],
        }
    }
}

/// Builds one operation result, sharing coincident geometry.
struct ShapeBuilder<'k> {
    kernel: &'k mut MockKernel,
    vertices: Vec<(Point3d, ShapeHandle)>,
    edges: Vec<([ShapeHandle; 2], ShapeHandle)>,
    faces: Vec<(FaceRect, ShapeHandle)>,
    splitters: Vec<Point3d>,
}

impl<'k> ShapeBuilder<'k> {
    fn new(kernel: &'k mut MockKernel) -> Self {
        Self {
            kernel,
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            splitters: Vec::new(),
        }
    }

    fn tol(&self) -> f64 {
        self.kernel.tolerance
    }

    fn solids(self, specs: &[SolidSpec], extra_points: &[Point3d]) -> Vec<ShapeHandle> {
        let items: Vec<BuildItem> = specs.iter().cloned().map(BuildItem::Solid).collect();
        self.items(&items, extra_points)
    }

    fn items(mut self, items: &[BuildItem], extra_points: &[Point3d]) -> Vec<ShapeHandle> {
        self.splitters = items.iter().flat_map(BuildItem::corner_points).collect();
        self.splitters.extend_from_slice(extra_points);

        let mut built = Vec::with_capacity(items.len());
        for item in items {
            let h = match item {
                BuildItem::Vertex(p) => self.vertex(*p),
                BuildItem::Edge(a, b) => {
                    let mut chain = self.edge_chain(*a, *b);
                    if chain.len() == 1 {
                        chain.remove(0)
                    } else {
                        built.extend(chain);
                        continue;
                    }
                }
                BuildItem::Face(rect) => self.face(rect),
                BuildItem::Solid(spec) => self.solid(spec),
            };
            if !built.contains(&h) {
                built.push(h);
            }
        }
        debug!(count = built.len(), "mock build complete");
        built
    }

    fn vertex(&mut self, p: Point3d) -> ShapeHandle {
        let tol = self.tol();
        if let Some((_, h)) = self.vertices.iter().find(|(q, _)| q.distance_to(&p) < tol) {
            return *h;
        }
        let h = self.kernel.alloc(MockShape::Vertex { point: p });
        self.vertices.push((p, h));
        h
    }

    /// Edges along segment `a`→`b`, split at every splitter lying inside it.
    fn edge_chain(&mut self, a: Point3d, b: Point3d) -> Vec<ShapeHandle> {
        let tol = self.tol();
        let length = a.distance_to(&b);
        let mut stops: Vec<(f64, Point3d)> = self
            .splitters
            .iter()
            .filter_map(|p| {
                let (t, dist) = p.project_on_segment(&a, &b);
                let interior = t * length > tol && (1.0 - t) * length > tol;
                (dist < tol && interior).then_some((t, *p))
            })
            .collect();
        stops.sort_by(|x, y| x.0.total_cmp(&y.0));
        stops.dedup_by(|x, y| x.1.distance_to(&y.1) < tol);

        let mut points = vec![a];
        points.extend(stops.into_iter().map(|(_, p)| p));
        points.push(b);

        points
            .windows(2)
            .map(|w| {
                let (s, e) = (self.vertex(w[0]), self.vertex(w[1]));
                self.edge(s, e)
            })
            .collect()
    }

    fn edge(&mut self, s: ShapeHandle, e: ShapeHandle) -> ShapeHandle {
        let key = if s <= e { [s, e] } else { [e, s] };
        if let Some((_, h)) = self.edges.iter().find(|(k, _)| *k == key) {
            return *h;
        }
        let h = self.kernel.alloc(MockShape::Edge { start: s, end: e });
        self.edges.push((key, h));
        h
    }

    fn face(&mut self, rect: &FaceRect) -> ShapeHandle {
        let tol = self.tol();
        if let Some((_, h)) = self.faces.iter().find(|(r, _)| r.approx_eq(rect, tol)) {
            return *h;
        }
        let mut edges = Vec::new();
        for (a, b) in rect.sides() {
            edges.extend(self.edge_chain(a, b));
        }
        let h = self.kernel.alloc(MockShape::Face { rect: *rect, edges });
        self.faces.push((*rect, h));
        h
    }

    fn solid(&mut self, spec: &SolidSpec) -> ShapeHandle {
        let faces = spec.faces.iter().map(|f| self.face(f)).collect();
        self.kernel.alloc(MockShape::Solid {
            blocks: spec.blocks.clone(),
            faces,
        })
    }
}

impl Kernel for MockKernel {
    fn make_vertex(&mut self, point: Point3d) -> ShapeHandle {
        self.alloc(MockShape::Vertex { point })
    }

    fn make_segment(&mut self, start: Point3d, end: Point3d) -> Result<ShapeHandle, KernelError> {
        if start.distance_to(&end) < self.tolerance {
            return Err(KernelError::Other {
                message: "segment endpoints coincide".to_string(),
            });
        }
        let built = ShapeBuilder::new(self).items(&[BuildItem::Edge(start, end)], &[]);
        self.finish(built)
    }

    fn make_rectangle(&mut self, a: Point3d, b: Point3d) -> Result<ShapeHandle, KernelError> {
        let rect = FaceRect::from_corners(&a, &b, self.tolerance).ok_or_else(|| KernelError::Other {
            message: "rectangle corners must share exactly one coordinate".to_string(),
        })?;
        let built = ShapeBuilder::new(self).items(&[BuildItem::Face(rect)], &[]);
        self.finish(built)
    }

    fn make_box(&mut self, min: Point3d, max: Point3d) -> Result<ShapeHandle, KernelError> {
        let block = BoundingBox::from_points(&[min, max]);
        if Axis::ALL.iter().any(|&a| block.extent(a) < self.tolerance) {
            return Err(KernelError::Other {
                message: "box has a zero extent".to_string(),
            });
        }
        let built = ShapeBuilder::new(self).solids(&[SolidSpec::from_block(block)], &[]);
        self.finish(built)
    }

    fn make_half_space(&mut self, axis: Axis, offset: f64, side: Side) -> ShapeHandle {
        self.alloc(MockShape::HalfSpace { axis, offset, side })
    }

    fn make_plane(&mut self, axis: Axis, offset: f64) -> ShapeHandle {
        self.alloc(MockShape::Plane { axis, offset })
    }

    fn make_compound(&mut self, shapes: &[ShapeHandle]) -> Result<ShapeHandle, KernelError> {
        for &s in shapes {
            self.get(s)?;
        }
        Ok(self.alloc(MockShape::Compound {
            children: shapes.to_vec(),
        }))
    }

    fn compute_boolean(
        &mut self,
        op: BooleanOp,
        shapes: &[ShapeHandle],
    ) -> Result<ShapeHandle, KernelError> {
        debug!(?op, shapes = shapes.len(), "mock boolean");
        let (&object, tools) = shapes.split_first().ok_or(KernelError::BooleanFailed {
            op,
            reason: "no input shapes".to_string(),
        })?;
        match op {
            BooleanOp::Fuse => self.fuse(shapes),
            BooleanOp::Sew => self.sew(shapes),
            BooleanOp::Cut => self.cut(object, tools),
            BooleanOp::Common => self.common(object, tools),
            BooleanOp::Split => self.split(object, tools),
        }
    }

    fn split_modified(
        &mut self,
        target: ShapeHandle,
        tool: ShapeHandle,
    ) -> Result<Vec<ShapeHandle>, KernelError> {
        self.split_modified_calls += 1;
        let tol = self.tolerance;
        let specs = self.solid_specs(target, BooleanOp::Split)?;
        self.get(tool)?;
        let tool_faces: Vec<FaceRect> = self
            .decompose(tool, Dimension::Surface)
            .iter()
            .filter_map(|f| self.rect_of(*f))
            .collect();
        let tool_points = self.vertex_points(tool);
        let imprinted: Vec<SolidSpec> = specs
            .iter()
            .map(|s| s.imprinted(&tool_faces, tol))
            .collect();
        Ok(ShapeBuilder::new(self).solids(&imprinted, &tool_points))
    }
}

impl KernelIntrospect for MockKernel {
    fn shape_kind(&self, shape: ShapeHandle) -> Option<ShapeKind> {
        self.shapes.get(&shape).map(|s| match s {
            MockShape::Vertex { .. } => ShapeKind::Vertex,
            MockShape::Edge { .. } => ShapeKind::Edge,
            MockShape::Face { .. } => ShapeKind::Face,
            MockShape::Solid { .. } => ShapeKind::Solid,
            MockShape::Compound { .. } => ShapeKind::Compound,
            MockShape::HalfSpace { .. } => ShapeKind::HalfSpace,
            MockShape::Plane { .. } => ShapeKind::Plane,
        })
    }

    fn decompose(&self, shape: ShapeHandle, dim: Dimension) -> Vec<ShapeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![shape];
        let mut ordered = Vec::new();
        // Depth-first, children in stored order.
        while let Some(h) = stack.pop() {
            ordered.push(h);
            let children: Vec<ShapeHandle> = match self.shapes.get(&h) {
                Some(MockShape::Compound { children }) => children.clone(),
                Some(s) if self.shape_dimension(h) > Some(dim) => match s {
                    MockShape::Solid { faces, .. } => faces.clone(),
                    MockShape::Face { edges, .. } => edges.clone(),
                    MockShape::Edge { start, end } => vec![*start, *end],
                    _ => Vec::new(),
                },
                _ => Vec::new(),
            };
            stack.extend(children.into_iter().rev());
        }
        for h in ordered {
            if self.shape_dimension(h) == Some(dim) && !out.contains(&h) {
                out.push(h);
            }
        }
        out
    }

    fn boundary_of(&self, shape: ShapeHandle) -> Vec<ShapeHandle> {
        match self.shapes.get(&shape) {
            Some(MockShape::Solid { faces, .. }) => faces.clone(),
            Some(MockShape::Face { edges, .. }) => edges.clone(),
            Some(MockShape::Edge { start, end }) => vec![*start, *end],
            _ => Vec::new(),
        }
    }

    fn equal(&self, a: ShapeHandle, b: ShapeHandle, tol: f64) -> bool {
        if a == b {
            return self.shapes.contains_key(&a);
        }
        match (self.shapes.get(&a), self.shapes.get(&b)) {
            (Some(MockShape::Vertex { point: p }), Some(MockShape::Vertex { point: q })) => {
                p.distance_to(q) < tol
            }
            (Some(MockShape::Edge { .. }), Some(MockShape::Edge { .. })) => {
                match (self.segment_of(a), self.segment_of(b)) {
                    (Some((a0, a1)), Some((b0, b1))) => {
                        (a0.distance_to(&b0) < tol && a1.distance_to(&b1) < tol)
                            || (a0.distance_to(&b1) < tol && a1.distance_to(&b0) < tol)
                    }
                    _ => false,
                }
            }
            (Some(MockShape::Face { rect: r, .. }), Some(MockShape::Face { rect: s, .. })) => {
                r.approx_eq(s, tol)
            }
            (Some(MockShape::Solid { .. }), Some(MockShape::Solid { .. })) => {
                let (va, vb) = (self.measure(a), self.measure(b));
                self.bounding_box(a).approx_eq(&self.bounding_box(b), tol)
                    && (va - vb).abs() < tol * va.max(1.0)
            }
            _ => false,
        }
    }

    fn contains(&self, a: ShapeHandle, b: ShapeHandle, tol: f64) -> bool {
        let Some(shape_a) = self.shapes.get(&a) else {
            return false;
        };
        if !self.shapes.contains_key(&b) {
            return false;
        }
        match shape_a {
            MockShape::Vertex { .. } => self.equal(a, b, tol),
            MockShape::Edge { .. } => {
                let Some((s, e)) = self.segment_of(a) else {
                    return false;
                };
                let points = self.vertex_points(b);
                let on_segment = |p: &Point3d| {
                    let (t, dist) = p.project_on_segment(&s, &e);
                    let slack = tol / s.distance_to(&e).max(tol);
                    dist < tol && t >= -slack && t <= 1.0 + slack
                };
                matches!(
                    self.shape_kind(b),
                    Some(ShapeKind::Vertex) | Some(ShapeKind::Edge)
                ) && points.iter().all(on_segment)
            }
            MockShape::Face { rect, .. } => match self.shapes.get(&b) {
                Some(MockShape::Face { rect: inner, .. }) => rect.contains_rect(inner, tol),
                Some(MockShape::Vertex { .. }) | Some(MockShape::Edge { .. }) => self
                    .vertex_points(b)
                    .iter()
                    .all(|p| rect.contains_point(p, tol)),
                _ => false,
            },
            MockShape::Solid { blocks, .. } => self.solid_contains(blocks, b, tol),
            MockShape::Compound { children } => {
                children.iter().any(|c| self.contains(*c, b, tol))
            }
            MockShape::HalfSpace { .. } | MockShape::Plane { .. } => false,
        }
    }

    fn bounding_box(&self, shape: ShapeHandle) -> BoundingBox {
        match self.shapes.get(&shape) {
            Some(MockShape::Vertex { point }) => BoundingBox::new(*point, *point),
            Some(MockShape::Edge { .. }) => match self.segment_of(shape) {
                Some((a, b)) => BoundingBox::from_points(&[a, b]),
                None => BoundingBox::empty(),
            },
            Some(MockShape::Face { rect, .. }) => rect.bbox(),
            Some(MockShape::Solid { .. }) => self
                .blocks_of(shape)
                .iter()
                .fold(BoundingBox::empty(), |acc, b| acc.union(b)),
            Some(MockShape::Compound { children }) => children
                .iter()
                .map(|c| self.bounding_box(*c))
                .filter(BoundingBox::is_valid)
                .fold(BoundingBox::empty(), |acc, b| acc.union(&b)),
            _ => BoundingBox::empty(),
        }
    }

    fn measure(&self, shape: ShapeHandle) -> f64 {
        match self.shapes.get(&shape) {
            Some(MockShape::Edge { .. }) => self
                .segment_of(shape)
                .map(|(a, b)| a.distance_to(&b))
                .unwrap_or(0.0),
            Some(MockShape::Face { rect, .. }) => rect.area(),
            Some(MockShape::Solid { blocks, .. }) => blocks.iter().map(BoundingBox::volume).sum(),
            Some(MockShape::Compound { children }) => {
                children.iter().map(|c| self.measure(*c)).sum()
            }
            _ => 0.0,
        }
    }

    fn vertex_points(&self, shape: ShapeHandle) -> Vec<Point3d> {
        self.decompose(shape, Dimension::Vertex)
            .into_iter()
            .filter_map(|v| self.point_of(v))
            .collect()
    }

    fn midpoint(&self, edge: ShapeHandle) -> Option<Point3d> {
        self.segment_of(edge).map(|(a, b)| a.midpoint(&b))
    }
}
