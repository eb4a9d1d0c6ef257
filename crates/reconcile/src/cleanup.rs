use geom_types::Dimension;
use topo_complex::CellId;
use tracing::{debug, instrument};

use crate::diagnostics::Diagnostic;
use crate::session::Session;

// ─── Removal and Orphans ─────────────────────────────────────────────────────

impl Session<'_> {
    /// Move every reference that was not kept into the removed set, then
    /// destroy created cells that ended up without adjacency. Orphan vertices
    /// are only destroyed when `delete_orphan_vertices` is set.
    #[instrument(skip(self))]
    pub fn clean(&mut self, delete_orphan_vertices: bool) {
        for dim in Dimension::ALL {
            let d = dim.index();
            for &id in &self.refs.reference[d] {
                if !self.kept[d].contains(&id) && !self.removed.contains(&id) {
                    self.removed.push(id);
                }
            }
        }

        for dim in Dimension::ALL {
            if dim == Dimension::Vertex && !delete_orphan_vertices {
                continue;
            }
            let d = dim.index();
            let complex = &mut *self.complex;
            let (orphans, live): (Vec<CellId>, Vec<CellId>) = self.created[d]
                .iter()
                .copied()
                .filter(|c| complex.contains(*c))
                .partition(|c| !complex[*c].has_adjacency());
            for &orphan in &orphans {
                complex.destroy(orphan);
            }
            self.created[d] = live;
            if !orphans.is_empty() {
                self.diagnostics.push(Diagnostic::OrphanCleanup {
                    dimension: dim,
                    count: orphans.len(),
                });
            }
        }
        debug!(removed = self.removed.len(), "references cleaned");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconcileOptions;
    use crate::reference::ReferenceSet;
    use geom_kernel::{Kernel, MockKernel};
    use geom_types::Point3d;
    use topo_complex::Complex;

    fn p(x: f64, y: f64, z: f64) -> Point3d {
        Point3d::new(x, y, z)
    }

    #[test]
    fn unkept_references_are_removed() {
        let mut k = MockKernel::new();
        let mut c = Complex::new();
        let v0 = c.add_vertex(k.make_vertex(p(0.0, 0.0, 0.0)));
        let v1 = c.add_vertex(k.make_vertex(p(1.0, 0.0, 0.0)));
        let mut session = Session::new(&mut c, &mut k, ReconcileOptions::new());
        session.refs = ReferenceSet::collect(session.complex, &[v0, v1]);
        session.kept[0].push(v0);
        session.clean(true);
        assert_eq!(session.removed, vec![v1]);
    }

    #[test]
    fn orphan_vertices_follow_option() {
        let mut k = MockKernel::new();
        let lone = k.make_vertex(p(3.0, 3.0, 3.0));
        let mut c = Complex::new();
        let mut session = Session::new(&mut c, &mut k, ReconcileOptions::new());
        session.classify_shape(lone, crate::PassMode::Primary).unwrap();
        session.clean(false);
        assert_eq!(session.created[0].len(), 1);
        session.clean(true);
        assert!(session.created[0].is_empty());
        assert_eq!(session.diagnostics.orphans_discarded(), 1);
        assert!(c.is_empty());
    }
}
