use geom_kernel::{KernelIntrospect, ShapeHandle};
use geom_types::{Dimension, Tolerance};
use topo_complex::{CellId, Complex};
use tracing::{debug, instrument};

use crate::diagnostics::Diagnostic;
use crate::error::ReconcileError;
use crate::order;
use crate::session::Session;

// ─── Classification ──────────────────────────────────────────────────────────

/// Which classification rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassMode {
    /// The result of the operation itself.
    Primary,
    /// A repaired piece of an adjacent volume. Adjacent volumes may also be
    /// matched by containment.
    Adjacent,
}

/// Outcome of classifying one kernel shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// Sub-shape to cell mapping per dimension, in canonical order.
    pub pairs: [Vec<(ShapeHandle, CellId)>; 4],
    /// Distinct cells the shape resolved to, per dimension.
    pub resolved: [Vec<CellId>; 4],
    /// Cells this pass had to create.
    pub created: [Vec<CellId>; 4],
}

impl Classification {
    /// Cell a sub-shape was mapped to, by handle.
    pub fn cell_for(&self, dim: Dimension, shape: ShapeHandle) -> Option<CellId> {
        self.pairs[dim.index()]
            .iter()
            .find(|(s, _)| *s == shape)
            .map(|(_, c)| *c)
    }

    pub fn resolved(&self, dim: Dimension) -> &[CellId] {
        &self.resolved[dim.index()]
    }

    fn record(&mut self, dim: Dimension, shape: ShapeHandle, cell: CellId) {
        self.pairs[dim.index()].push((shape, cell));
        let resolved = &mut self.resolved[dim.index()];
        if !resolved.contains(&cell) {
            resolved.push(cell);
        }
    }
}

/// Sub-shapes too small to carry a cell.
fn is_degenerate(
    kernel: &dyn KernelIntrospect,
    dim: Dimension,
    shape: ShapeHandle,
    tol: &Tolerance,
) -> bool {
    match dim {
        Dimension::Curve => tol.is_zero_length(kernel.measure(shape)),
        Dimension::Surface => tol.is_zero_area(kernel.measure(shape)),
        _ => false,
    }
}

/// Whether any representation of `cell` equals `shape`.
pub(crate) fn cell_equals(
    complex: &Complex,
    kernel: &dyn KernelIntrospect,
    cell: CellId,
    shape: ShapeHandle,
    tol: f64,
) -> bool {
    complex
        .get(cell)
        .map(|c| c.shapes().iter().any(|s| kernel.equal(*s, shape, tol)))
        .unwrap_or(false)
}

impl Session<'_> {
    /// Classify every dimension of `shape`, lowest first.
    pub fn classify_shape(
        &mut self,
        shape: ShapeHandle,
        mode: PassMode,
    ) -> Result<Classification, ReconcileError> {
        let mut pass = Classification::default();
        for dim in Dimension::ALL {
            self.classify(dim, shape, mode, &mut pass)?;
        }
        Ok(pass)
    }

    /// Map each sub-shape of `shape` of dimension `dim` to a cell: a matching
    /// reference (kept), a cell created earlier in this operation (reused),
    /// or a new cell.
    #[instrument(skip(self, pass))]
    pub fn classify(
        &mut self,
        dim: Dimension,
        shape: ShapeHandle,
        mode: PassMode,
        pass: &mut Classification,
    ) -> Result<(), ReconcileError> {
        let tol = self.options.tolerance;
        let d = dim.index();
        let kernel = self.kernel.as_introspect();

        let subs: Vec<ShapeHandle> = kernel
            .decompose(shape, dim)
            .into_iter()
            .filter(|s| !is_degenerate(kernel, dim, *s, &tol))
            .collect();
        let step = tol.ordering_step(kernel.bounding_box(shape).diagonal());
        let ordered = order::canonical_order(kernel, &subs, step);
        for tie in &ordered.ties {
            let position = kernel.bounding_box(tie[0]).center().to_array();
            self.diagnostics.push(Diagnostic::AmbiguousIdentity {
                dimension: dim,
                candidates: tie.iter().map(ShapeHandle::to_string).collect(),
                position,
            });
        }

        let (mut kept, mut reused, mut fresh) = (0usize, 0usize, 0usize);
        for sub in ordered.shapes {
            let mut matches: Vec<CellId> = self.refs.reference[d]
                .iter()
                .copied()
                .filter(|c| self.complex.is_live(*c))
                .filter(|c| cell_equals(self.complex, kernel, *c, sub, tol.coincidence))
                .collect();
            if matches.is_empty() && dim == Dimension::Volume && mode == PassMode::Adjacent {
                matches = self.refs.adjacent[d]
                    .iter()
                    .copied()
                    .filter(|c| self.complex.is_live(*c))
                    .filter(|c| {
                        self.complex[*c]
                            .shapes()
                            .iter()
                            .any(|rep| kernel.contains(sub, *rep, tol.coincidence))
                    })
                    .collect();
            }

            let unmatched: Vec<CellId> = matches
                .iter()
                .copied()
                .filter(|c| !self.kept[d].contains(c))
                .collect();
            if let Some(&winner) = unmatched.first() {
                if unmatched.len() > 1 {
                    self.diagnostics.push(Diagnostic::AmbiguousIdentity {
                        dimension: dim,
                        candidates: unmatched.iter().map(|c| self.complex.name(*c)).collect(),
                        position: kernel.bounding_box(sub).center().to_array(),
                    });
                }
                self.kept[d].push(winner);
                pass.record(dim, sub, winner);
                kept += 1;
                continue;
            }
            if let Some(&already) = matches.first() {
                pass.record(dim, sub, already);
                kept += 1;
                continue;
            }

            let earlier = self.created[d].iter().copied().find(|c| {
                self.complex
                    .get(*c)
                    .map(|cell| {
                        !cell.retired
                            && !cell.is_composite()
                            && kernel.equal(cell.shapes()[0], sub, tol.coincidence)
                    })
                    .unwrap_or(false)
            });
            if let Some(cell) = earlier {
                pass.record(dim, sub, cell);
                reused += 1;
                continue;
            }

            let cell = self.complex.create_cell(dim, vec![sub])?;
            self.created[d].push(cell);
            pass.created[d].push(cell);
            pass.record(dim, sub, cell);
            fresh += 1;
        }

        debug!(kept, reused, created = fresh, "dimension classified");
        Ok(())
    }
}
