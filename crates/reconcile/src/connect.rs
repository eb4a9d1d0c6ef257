use geom_kernel::ShapeHandle;
use geom_types::Dimension;
use topo_complex::CellId;
use tracing::debug;

use crate::classify::Classification;
use crate::error::ReconcileError;
use crate::session::Session;

impl Session<'_> {
    /// Link the cells of a classification pass along the kernel's boundary
    /// relation: volumes to their faces, surfaces to their edges (full
    /// traversal), curves to their end vertices. Links are only added.
    pub fn connect(&mut self, pass: &Classification) -> Result<usize, ReconcileError> {
        let tol = self.options.tolerance.coincidence;
        let mut added = 0;
        for dim in [Dimension::Volume, Dimension::Surface, Dimension::Curve] {
            let Some(lower) = dim.lower() else { continue };
            for &(shape, cell) in &pass.pairs[dim.index()] {
                let kernel = self.kernel.as_introspect();
                let mut boundary = kernel.boundary_of(shape);
                if dim != Dimension::Surface {
                    dedup_in_order(&mut boundary);
                }
                let targets: Vec<CellId> = boundary
                    .into_iter()
                    .filter_map(|b| {
                        pass.cell_for(lower, b).or_else(|| {
                            pass.pairs[lower.index()]
                                .iter()
                                .find(|(s, _)| kernel.equal(*s, b, tol))
                                .map(|(_, c)| *c)
                        })
                    })
                    .collect();
                for target in targets {
                    if self.complex.link(cell, target)? {
                        added += 1;
                    }
                }
            }
        }
        debug!(links = added, "pass connected");
        Ok(added)
    }
}

fn dedup_in_order(shapes: &mut Vec<ShapeHandle>) {
    let mut seen = Vec::with_capacity(shapes.len());
    shapes.retain(|s| {
        if seen.contains(s) {
            false
        } else {
            seen.push(*s);
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::PassMode;
    use crate::config::ReconcileOptions;
    use geom_kernel::{Kernel, MockKernel};
    use geom_types::Point3d;
    use topo_complex::Complex;

    #[test]
    fn box_is_fully_linked() {
        let mut k = MockKernel::new();
        let b = k
            .make_box(Point3d::new(0.0, 0.0, 0.0), Point3d::new(1.0, 1.0, 1.0))
            .unwrap();
        let mut c = Complex::new();
        let mut session = Session::new(&mut c, &mut k, ReconcileOptions::new());
        let pass = session.classify_shape(b, PassMode::Primary).unwrap();
        // 6 faces + 24 face-edge + 24 edge-vertex links.
        assert_eq!(session.connect(&pass).unwrap(), 54);
        assert_eq!(session.connect(&pass).unwrap(), 0);

        let vol = pass.resolved(Dimension::Volume)[0];
        assert_eq!(c.down(vol).len(), 6);
        for e in c.cells(Dimension::Curve) {
            assert_eq!(c.down(e).len(), 2);
            assert_eq!(c.up(e).len(), 2);
        }
        for v in c.cells(Dimension::Vertex) {
            assert_eq!(c.up(v).len(), 3);
        }
        assert!(c.audit().all_valid());
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let mut shapes = vec![ShapeHandle(3), ShapeHandle(1), ShapeHandle(3), ShapeHandle(2)];
        dedup_in_order(&mut shapes);
        assert_eq!(shapes, vec![ShapeHandle(3), ShapeHandle(1), ShapeHandle(2)]);
    }
}
