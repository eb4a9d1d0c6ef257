use geom_kernel::ShapeHandle;
use geom_types::Dimension;
use topo_complex::CellId;
use tracing::{debug, info, instrument};

use crate::classify::PassMode;
use crate::error::ReconcileError;
use crate::reference::strip_internal_links;
use crate::session::Session;

// ─── Adjacent Volume Repair ──────────────────────────────────────────────────

impl Session<'_> {
    /// Repair every adjacent volume that lost one of its surfaces. Each one
    /// is imprinted with `result_shape` by the kernel and the pieces are
    /// classified in adjacent mode. Repair goes one level deep only.
    ///
    /// Returns the number of volumes repaired.
    #[instrument(skip(self))]
    pub fn propagate(&mut self, result_shape: ShapeHandle) -> Result<usize, ReconcileError> {
        let mut repaired = 0;
        for vol in self.refs.adjacent[Dimension::Volume.index()].clone() {
            if !self.complex.is_live(vol) || self.refs.is_reference(self.complex, vol) {
                continue;
            }
            let touched = self
                .complex
                .down(vol)
                .iter()
                .any(|s| self.removed.contains(s) || self.replaced_by.contains_key(s));
            if !touched {
                continue;
            }
            self.repair_volume(vol, result_shape)?;
            repaired += 1;
        }
        if repaired > 0 {
            info!(repaired, "adjacent volumes repaired");
        }
        Ok(repaired)
    }

    fn repair_volume(&mut self, vol: CellId, result_shape: ShapeHandle) -> Result<(), ReconcileError> {
        debug!(volume = %self.complex.name(vol), "repairing adjacent volume");
        self.refs.extend_with(self.complex, vol);
        let mut closure = self.complex.down_closure(vol);
        closure.push(vol);
        strip_internal_links(self.complex, &closure);

        let rep = self.complex[vol].shapes()[0];
        let pieces = self.kernel.split_modified(rep, result_shape)?;
        for piece in pieces {
            let pass = self.classify_shape(piece, PassMode::Adjacent)?;
            self.connect(&pass)?;
            if pass.resolved(Dimension::Volume).contains(&vol) {
                self.complex.set_representation(vol, vec![piece])?;
            }
        }

        self.clean(true);
        self.build_replacements()
    }

    /// Swap the links surviving adjacent cells hold to removed cells for
    /// links to their successors. Links to removed cells without successors
    /// are dropped.
    pub fn rewrite_adjacent_links(&mut self) -> Result<usize, ReconcileError> {
        let mut rewritten = 0;
        for dim in [Dimension::Curve, Dimension::Surface, Dimension::Volume] {
            for cell in self.refs.adjacent[dim.index()].clone() {
                if !self.complex.is_live(cell) || self.removed.contains(&cell) {
                    continue;
                }
                let stale: Vec<CellId> = self
                    .complex
                    .down(cell)
                    .iter()
                    .copied()
                    .filter(|d| self.removed.contains(d))
                    .collect();
                for old in stale {
                    self.complex.unlink(cell, old)?;
                    for &succ in self.replaced_by.get(&old).into_iter().flatten() {
                        if self.complex.is_live(succ) {
                            self.complex.link(cell, succ)?;
                        }
                    }
                    rewritten += 1;
                }
            }
        }
        debug!(rewritten, "adjacent links rewritten");
        Ok(rewritten)
    }
}
