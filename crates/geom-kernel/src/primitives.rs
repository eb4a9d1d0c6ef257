//! Rectilinear primitives backing the mock kernel: axis-aligned planar
//! rectangles and solids described as unions of disjoint boxes.

use geom_types::{Axis, BoundingBox, Point3d};

use crate::types::Side;

/// Axis-aligned planar rectangle. `lo`/`hi` are ranges along the two
/// in-plane axes given by `normal.others()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceRect {
    pub normal: Axis,
    pub offset: f64,
    pub lo: [f64; 2],
    pub hi: [f64; 2],
}

impl FaceRect {
    pub fn new(normal: Axis, offset: f64, lo: [f64; 2], hi: [f64; 2]) -> Self {
        Self {
            normal,
            offset,
            lo: [lo[0].min(hi[0]), lo[1].min(hi[1])],
            hi: [lo[0].max(hi[0]), lo[1].max(hi[1])],
        }
    }

    /// Rectangle spanned by two opposite corners that share exactly one coordinate.
    pub fn from_corners(a: &Point3d, b: &Point3d, tol: f64) -> Option<Self> {
        let flat: Vec<Axis> = Axis::ALL
            .iter()
            .copied()
            .filter(|&ax| (a.coord(ax) - b.coord(ax)).abs() < tol)
            .collect();
        if flat.len() != 1 {
            return None;
        }
        let normal = flat[0];
        let (u, v) = normal.others();
        Some(Self::new(
            normal,
            a.coord(normal),
            [a.coord(u), a.coord(v)],
            [b.coord(u), b.coord(v)],
        ))
    }

    fn axes(&self) -> (Axis, Axis) {
        self.normal.others()
    }

    pub fn point(&self, u: f64, v: f64) -> Point3d {
        let (au, av) = self.axes();
        Point3d::ORIGIN
            .with_coord(self.normal, self.offset)
            .with_coord(au, u)
            .with_coord(av, v)
    }

    /// Corners in boundary loop order.
    pub fn corners(&self) -> [Point3d; 4] {
        [
            self.point(self.lo[0], self.lo[1]),
            self.point(self.hi[0], self.lo[1]),
            self.point(self.hi[0], self.hi[1]),
            self.point(self.lo[0], self.hi[1]),
        ]
    }

    /// Boundary sides in loop order.
    pub fn sides(&self) -> [(Point3d, Point3d); 4] {
        let c = self.corners();
        [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
    }

    pub fn area(&self) -> f64 {
        (self.hi[0] - self.lo[0]) * (self.hi[1] - self.lo[1])
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::from_points(&self.corners())
    }

    pub fn coplanar(&self, other: &FaceRect, tol: f64) -> bool {
        self.normal == other.normal && (self.offset - other.offset).abs() < tol
    }

    pub fn approx_eq(&self, other: &FaceRect, tol: f64) -> bool {
        self.coplanar(other, tol)
            && (0..2).all(|i| {
                (self.lo[i] - other.lo[i]).abs() < tol && (self.hi[i] - other.hi[i]).abs() < tol
            })
    }

    pub fn contains_rect(&self, other: &FaceRect, tol: f64) -> bool {
        self.coplanar(other, tol)
            && (0..2).all(|i| other.lo[i] >= self.lo[i] - tol && other.hi[i] <= self.hi[i] + tol)
    }

    pub fn contains_point(&self, p: &Point3d, tol: f64) -> bool {
        let (au, av) = self.axes();
        let uv = [p.coord(au), p.coord(av)];
        (p.coord(self.normal) - self.offset).abs() < tol
            && (0..2).all(|i| uv[i] >= self.lo[i] - tol && uv[i] <= self.hi[i] + tol)
    }

    /// Area shared with a coplanar rectangle; zero otherwise.
    pub fn overlap_area(&self, other: &FaceRect, tol: f64) -> f64 {
        if !self.coplanar(other, tol) {
            return 0.0;
        }
        (0..2)
            .map(|i| (self.hi[i].min(other.hi[i]) - self.lo[i].max(other.lo[i])).max(0.0))
            .product()
    }

    /// Subdivide along interior cut values of each in-plane axis.
    pub fn tiled(&self, cuts: &[Vec<f64>; 2], tol: f64) -> Vec<FaceRect> {
        let ranges: Vec<Vec<(f64, f64)>> = (0..2)
            .map(|i| {
                let mut stops = vec![self.lo[i]];
                let mut inner: Vec<f64> = cuts[i]
                    .iter()
                    .copied()
                    .filter(|&c| c > self.lo[i] + tol && c < self.hi[i] - tol)
                    .collect();
                inner.sort_by(f64::total_cmp);
                inner.dedup_by(|a, b| (*a - *b).abs() < tol);
                stops.extend(inner);
                stops.push(self.hi[i]);
                stops.windows(2).map(|w| (w[0], w[1])).collect()
            })
            .collect();

        let mut tiles = Vec::new();
        for &(v0, v1) in &ranges[1] {
            for &(u0, u1) in &ranges[0] {
                tiles.push(FaceRect::new(self.normal, self.offset, [u0, v0], [u1, v1]));
            }
        }
        tiles
    }

    /// Clip to one side of an axis plane; `None` when nothing remains.
    fn clip(&self, axis: Axis, offset: f64, side: Side, tol: f64) -> Option<FaceRect> {
        let (au, av) = self.axes();
        let i = if axis == au {
            0
        } else if axis == av {
            1
        } else {
            return Some(*self);
        };
        let mut r = *self;
        match side {
            Side::Below => {
                if r.lo[i] >= offset - tol {
                    return None;
                }
                r.hi[i] = r.hi[i].min(offset);
            }
            Side::Above => {
                if r.hi[i] <= offset + tol {
                    return None;
                }
                r.lo[i] = r.lo[i].max(offset);
            }
        }
        Some(r)
    }
}

/// The six boundary faces of a box: bottom, top, front, back, left, right.
pub fn box_faces(block: &BoundingBox) -> Vec<FaceRect> {
    let mut faces = Vec::with_capacity(6);
    for normal in [Axis::Z, Axis::Y, Axis::X] {
        let (u, v) = normal.others();
        let lo = [block.min.coord(u), block.min.coord(v)];
        let hi = [block.max.coord(u), block.max.coord(v)];
        faces.push(FaceRect::new(normal, block.min.coord(normal), lo, hi));
        faces.push(FaceRect::new(normal, block.max.coord(normal), lo, hi));
    }
    faces
}

/// Cross-section of a box at an axis plane.
fn section_of(block: &BoundingBox, axis: Axis, offset: f64) -> FaceRect {
    let (u, v) = axis.others();
    FaceRect::new(
        axis,
        offset,
        [block.min.coord(u), block.min.coord(v)],
        [block.max.coord(u), block.max.coord(v)],
    )
}

/// A solid as a union of disjoint boxes together with its boundary faces.
#[derive(Debug, Clone, PartialEq)]
pub struct SolidSpec {
    pub blocks: Vec<BoundingBox>,
    pub faces: Vec<FaceRect>,
}

impl SolidSpec {
    pub fn from_block(block: BoundingBox) -> Self {
        Self {
            faces: box_faces(&block),
            blocks: vec![block],
        }
    }

    pub fn volume(&self) -> f64 {
        self.blocks.iter().map(BoundingBox::volume).sum()
    }

    pub fn bbox(&self) -> BoundingBox {
        self.blocks
            .iter()
            .fold(BoundingBox::empty(), |acc, b| acc.union(b))
    }

    /// Keep the part of the solid on `side` of the plane `axis = offset`.
    pub fn keep_side(&self, axis: Axis, offset: f64, side: Side, tol: f64) -> Option<SolidSpec> {
        let mut blocks = Vec::new();
        let mut caps = Vec::new();
        for block in &self.blocks {
            let (lo, hi) = (block.min.coord(axis), block.max.coord(axis));
            let (inside, outside) = match side {
                Side::Below => (hi <= offset + tol, lo >= offset - tol),
                Side::Above => (lo >= offset - tol, hi <= offset + tol),
            };
            if inside {
                blocks.push(*block);
            } else if !outside {
                let mut clipped = *block;
                match side {
                    Side::Below => clipped.max = clipped.max.with_coord(axis, offset),
                    Side::Above => clipped.min = clipped.min.with_coord(axis, offset),
                }
                caps.push(section_of(block, axis, offset));
                blocks.push(clipped);
            }
        }
        if blocks.is_empty() {
            return None;
        }

        let mut faces = Vec::new();
        for face in &self.faces {
            if face.normal == axis {
                let keep = if (face.offset - offset).abs() < tol {
                    blocks.iter().any(|b| b.contains_box(&face.bbox(), tol))
                } else {
                    match side {
                        Side::Below => face.offset < offset,
                        Side::Above => face.offset > offset,
                    }
                };
                if keep {
                    faces.push(*face);
                }
            } else if let Some(clipped) = face.clip(axis, offset, side, tol) {
                faces.push(clipped);
            }
        }
        faces.extend(caps);
        Some(SolidSpec { blocks, faces })
    }

    /// Keep only the part inside `region`.
    pub fn intersect_box(&self, region: &BoundingBox, tol: f64) -> Option<SolidSpec> {
        let mut spec = self.clone();
        for axis in Axis::ALL {
            spec = spec.keep_side(axis, region.min.coord(axis), Side::Above, tol)?;
            spec = spec.keep_side(axis, region.max.coord(axis), Side::Below, tol)?;
        }
        Some(spec)
    }

    /// Subdivide every face by the coplanar rectangles in `tools` that overlap it.
    pub fn imprinted(&self, tools: &[FaceRect], tol: f64) -> SolidSpec {
        let mut faces = Vec::new();
        for face in &self.faces {
            let mut cuts = [Vec::new(), Vec::new()];
            for tool in tools {
                if face.overlap_area(tool, tol) > tol * tol {
                    for i in 0..2 {
                        cuts[i].push(tool.lo[i]);
                        cuts[i].push(tool.hi[i]);
                    }
                }
            }
            faces.extend(face.tiled(&cuts, tol));
        }
        SolidSpec {
            blocks: self.blocks.clone(),
            faces,
        }
    }
}

/// Fuse solids that touch along full faces. Coincident face pairs vanish and
/// their owners merge; solids that only touch or stay apart remain separate.
pub fn fuse_specs(specs: &[SolidSpec], tol: f64) -> Result<Vec<SolidSpec>, String> {
    for (i, a) in specs.iter().enumerate() {
        for b in &specs[i + 1..] {
            for ba in &a.blocks {
                for bb in &b.blocks {
                    if let Some(common) = ba.intersection(bb) {
                        if common.volume() > tol {
                            return Err("overlapping volumes".to_string());
                        }
                    }
                }
            }
        }
    }

    let faces: Vec<(usize, FaceRect)> = specs
        .iter()
        .enumerate()
        .flat_map(|(owner, s)| s.faces.iter().map(move |f| (owner, *f)))
        .collect();

    let mut parent: Vec<usize> = (0..specs.len()).collect();
    fn find(parent: &mut [usize], i: usize) -> usize {
        let mut root = i;
        while parent[root] != root {
            root = parent[root];
        }
        parent[i] = root;
        root
    }

    let mut cancelled = vec![false; faces.len()];
    for i in 0..faces.len() {
        for j in (i + 1)..faces.len() {
            let ((oi, fi), (oj, fj)) = (faces[i], faces[j]);
            if oi == oj || cancelled[i] || cancelled[j] {
                continue;
            }
            if fi.approx_eq(&fj, tol) {
                cancelled[i] = true;
                cancelled[j] = true;
                let (ri, rj) = (find(&mut parent, oi), find(&mut parent, oj));
                parent[ri.max(rj)] = ri.min(rj);
            } else if fi.overlap_area(&fj, tol) > tol * tol {
                return Err("partially coincident faces".to_string());
            }
        }
    }

    let mut groups: Vec<(usize, SolidSpec)> = Vec::new();
    for (owner, spec) in specs.iter().enumerate() {
        let root = find(&mut parent, owner);
        let kept = faces
            .iter()
            .zip(&cancelled)
            .filter(|((o, _), gone)| *o == owner && !**gone)
            .map(|((_, f), _)| *f);
        match groups.iter_mut().find(|(r, _)| *r == root) {
            Some((_, group)) => {
                group.blocks.extend(spec.blocks.iter().copied());
                group.faces.extend(kept);
            }
            None => groups.push((
                root,
                SolidSpec {
                    blocks: spec.blocks.clone(),
                    faces: kept.collect(),
                },
            )),
        }
    }
    Ok(groups.into_iter().map(|(_, s)| s).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TOL: f64 = 1e-7;

    fn unit_box_at(x: f64) -> SolidSpec {
        SolidSpec::from_block(BoundingBox::new(
            Point3d::new(x, 0.0, 0.0),
            Point3d::new(x + 1.0, 1.0, 1.0),
        ))
    }

    #[test]
    fn box_has_six_faces_of_unit_area() {
        let spec = unit_box_at(0.0);
        assert_eq!(spec.faces.len(), 6);
        for f in &spec.faces {
            assert_relative_eq!(f.area(), 1.0);
        }
    }

    #[test]
    fn from_corners_requires_one_flat_axis() {
        let a = Point3d::new(0.0, 0.0, 1.0);
        assert!(FaceRect::from_corners(&a, &Point3d::new(2.0, 3.0, 1.0), TOL).is_some());
        assert!(FaceRect::from_corners(&a, &Point3d::new(2.0, 3.0, 4.0), TOL).is_none());
        assert!(FaceRect::from_corners(&a, &Point3d::new(2.0, 0.0, 1.0), TOL).is_none());
    }

    #[test]
    fn fuse_cancels_shared_face() {
        let fused = fuse_specs(&[unit_box_at(0.0), unit_box_at(1.0)], TOL).unwrap();
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].faces.len(), 10);
        assert_relative_eq!(fused[0].volume(), 2.0);
    }

    #[test]
    fn fuse_keeps_disjoint_solids_apart() {
        let fused = fuse_specs(&[unit_box_at(0.0), unit_box_at(3.0)], TOL).unwrap();
        assert_eq!(fused.len(), 2);
    }

    #[test]
    fn fuse_rejects_overlap() {
        assert!(fuse_specs(&[unit_box_at(0.0), unit_box_at(0.5)], TOL).is_err());
    }

    #[test]
    fn keep_side_clips_and_caps() {
        let half = unit_box_at(0.0)
            .keep_side(Axis::X, 0.5, Side::Below, TOL)
            .unwrap();
        assert_eq!(half.faces.len(), 6);
        assert_relative_eq!(half.volume(), 0.5);
        assert!(half
            .faces
            .iter()
            .any(|f| f.normal == Axis::X && (f.offset - 0.5).abs() < TOL));
    }

    #[test]
    fn keep_side_missing_plane_is_identity() {
        let spec = unit_box_at(0.0);
        assert_eq!(spec.keep_side(Axis::X, 5.0, Side::Below, TOL), Some(spec.clone()));
        assert_eq!(spec.keep_side(Axis::X, 5.0, Side::Above, TOL), None);
    }

    #[test]
    fn imprint_tiles_coplanar_face() {
        let top = SolidSpec::from_block(BoundingBox::new(
            Point3d::new(0.0, 0.0, 1.0),
            Point3d::new(2.0, 1.0, 2.0),
        ));
        let tools = [
            FaceRect::new(Axis::Z, 1.0, [0.0, 0.0], [1.0, 1.0]),
            FaceRect::new(Axis::Z, 1.0, [1.0, 0.0], [2.0, 1.0]),
        ];
        let imprinted = top.imprinted(&tools, TOL);
        assert_eq!(imprinted.faces.len(), 7);
    }

    #[test]
    fn intersect_box_clips_to_region() {
        let spec = unit_box_at(0.0);
        let region = BoundingBox::new(Point3d::new(0.5, -1.0, -1.0), Point3d::new(4.0, 4.0, 4.0));
        let common = spec.intersect_box(&region, TOL).unwrap();
        assert_relative_eq!(common.volume(), 0.5);
    }
}
