use geom_kernel::{KernelIntrospect, ShapeKind};
use geom_types::Dimension;
use topo_complex::{CellId, Complex};
use tracing::{debug, instrument};

use crate::classify::cell_equals;
use crate::error::ReconcileError;
use crate::session::Session;

// ─── Replacements ────────────────────────────────────────────────────────────

impl Session<'_> {
    /// Compute the successors of every removed cell. A candidate that equals
    /// or covers the removed cell replaces it alone; otherwise every
    /// candidate it covers is a partial successor.
    ///
    /// Removed adjacent volumes without a successor are moved back to kept.
    #[instrument(skip(self))]
    pub fn build_replacements(&mut self) -> Result<(), ReconcileError> {
        let tol = self.options.tolerance.coincidence;
        let track_volumes = self.options.replace_volumes;

        for e in self.removed.clone() {
            if !self.complex.is_live(e) {
                continue;
            }
            let dim = self.complex.dimension(e);
            let kernel = self.kernel.as_introspect();
            check_representation(self.complex, kernel, e)?;

            if dim == Dimension::Volume && !track_volumes {
                if self.refs.adjacent[dim.index()].contains(&e) {
                    self.restore_kept(e);
                }
                continue;
            }

            let candidates: Vec<CellId> = self.kept[dim.index()]
                .iter()
                .chain(&self.created[dim.index()])
                .copied()
                .filter(|c| *c != e && self.complex.is_live(*c))
                .collect();
            let mut successors = if dim == Dimension::Vertex {
                candidates
                    .iter()
                    .copied()
                    .find(|c| {
                        let shape = self.complex[*c].shapes()[0];
                        cell_equals(self.complex, kernel, e, shape, tol)
                    })
                    .into_iter()
                    .collect()
            } else {
                successors_of(self.complex, kernel, e, &candidates, tol)?
            };
            self.complex.sort_by_serial(&mut successors);

            if successors.is_empty() {
                self.replaced_by.remove(&e);
                if dim == Dimension::Volume && self.refs.adjacent[dim.index()].contains(&e) {
                    self.restore_kept(e);
                }
            } else {
                debug!(
                    cell = %self.complex.name(e),
                    successors = successors.len(),
                    "replacement recorded"
                );
                self.replaced_by.insert(e, successors);
            }
        }
        Ok(())
    }

    fn restore_kept(&mut self, id: CellId) {
        self.removed.retain(|r| *r != id);
        self.replaced_by.remove(&id);
        let list = &mut self.kept[self.complex.dimension(id).index()];
        if !list.contains(&id) {
            list.push(id);
        }
    }
}

/// Successors gathered over every representation of `removed`. Per
/// representation, a candidate that equals or covers it wins alone;
/// otherwise every candidate it covers is a partial successor.
fn successors_of(
    complex: &Complex,
    kernel: &dyn KernelIntrospect,
    removed: CellId,
    candidates: &[CellId],
    tol: f64,
) -> Result<Vec<CellId>, ReconcileError> {
    let mut successors = Vec::new();
    for &rep in complex[removed].shapes() {
        let mut full = None;
        let mut partial = Vec::new();
        for &cand in candidates {
            if complex[cand].is_composite() {
                continue;
            }
            check_representation(complex, kernel, cand)?;
            let shape = complex[cand].shapes()[0];
            if kernel.equal(shape, rep, tol) || kernel.contains(shape, rep, tol) {
                full = Some(cand);
                break;
            }
            if kernel.contains(rep, shape, tol) {
                partial.push(cand);
            }
        }
        match full {
            Some(cand) => successors.push(cand),
            None => successors.extend(partial),
        }
    }
    successors.sort();
    successors.dedup();
    Ok(successors)
}

/// Every representation must be a kernel shape of the cell's own dimension.
fn check_representation(
    complex: &Complex,
    kernel: &dyn KernelIntrospect,
    id: CellId,
) -> Result<(), ReconcileError> {
    let dim = complex.dimension(id);
    let expected = ShapeKind::for_dimension(dim);
    for &shape in complex[id].shapes() {
        match kernel.shape_kind(shape) {
            Some(kind) if kind == expected => {}
            other => {
                return Err(ReconcileError::Consistency {
                    cell: complex.name(id),
                    reason: format!("representation {shape} is {other:?}, expected {expected:?}"),
                })
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconcileOptions;
    use geom_kernel::{Kernel, MockKernel};
    use geom_types::Point3d;
    use topo_complex::Complex;

    fn p(x: f64, y: f64, z: f64) -> Point3d {
        Point3d::new(x, y, z)
    }

    #[test]
    fn split_edge_is_partially_replaced() {
        let mut k = MockKernel::new();
        let whole = k.make_segment(p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0)).unwrap();
        let left = k.make_segment(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)).unwrap();
        let right = k.make_segment(p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)).unwrap();
        let mut c = Complex::new();
        let old = c.add_curve(whole);
        let a = c.add_curve(right);
        let b = c.add_curve(left);
        let mut session = Session::new(&mut c, &mut k, ReconcileOptions::new());
        session.removed.push(old);
        session.created[1] = vec![a, b];
        session.build_replacements().unwrap();
        assert_eq!(session.replaced_by.get(&old), Some(&vec![a, b]));
    }

    #[test]
    fn covering_candidate_replaces_alone() {
        let mut k = MockKernel::new();
        let short = k.make_segment(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)).unwrap();
        let long = k.make_segment(p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0)).unwrap();
        let mut c = Complex::new();
        let old = c.add_curve(short);
        let new = c.add_curve(long);
        let mut session = Session::new(&mut c, &mut k, ReconcileOptions::new());
        session.removed.push(old);
        session.kept[1].push(new);
        session.build_replacements().unwrap();
        assert_eq!(session.replaced_by.get(&old), Some(&vec![new]));
    }

    #[test]
    fn composite_curve_collects_successors_of_every_piece() {
        let mut k = MockKernel::new();
        let first = k.make_segment(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)).unwrap();
        let second = k.make_segment(p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)).unwrap();
        let long = k.make_segment(p(0.0, 0.0, 0.0), p(1.5, 0.0, 0.0)).unwrap();
        let tail = k.make_segment(p(1.5, 0.0, 0.0), p(2.0, 0.0, 0.0)).unwrap();
        let mut c = Complex::new();
        let old = c.create_cell(Dimension::Curve, vec![first, second]).unwrap();
        let a = c.add_curve(long);
        let b = c.add_curve(tail);
        let mut session = Session::new(&mut c, &mut k, ReconcileOptions::new());
        session.removed.push(old);
        session.created[1] = vec![b, a];
        session.build_replacements().unwrap();
        assert_eq!(session.replaced_by.get(&old), Some(&vec![a, b]));
    }

    #[test]
    fn removed_cell_listed_as_kept_never_replaces_itself() {
        let mut k = MockKernel::new();
        let seg = k.make_segment(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)).unwrap();
        let mut c = Complex::new();
        let old = c.add_curve(seg);
        let mut session = Session::new(&mut c, &mut k, ReconcileOptions::new());
        session.removed.push(old);
        session.kept[1].push(old);
        session.build_replacements().unwrap();
        assert!(session.replaced_by.get(&old).is_none());
    }

    #[test]
    fn wrong_representation_kind_is_fatal() {
        let mut k = MockKernel::new();
        let point = k.make_vertex(p(0.0, 0.0, 0.0));
        let mut c = Complex::new();
        let bogus = c.add_curve(point);
        let mut session = Session::new(&mut c, &mut k, ReconcileOptions::new());
        session.removed.push(bogus);
        let err = session.build_replacements().unwrap_err();
        assert!(err.is_consistency());
    }
}
