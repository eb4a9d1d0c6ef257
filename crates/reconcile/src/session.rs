use std::collections::BTreeMap;

use geom_kernel::{KernelBundle, ShapeHandle};
use geom_types::Dimension;
use topo_complex::{CellId, Complex};
use tracing::{info, instrument};

use crate::classify::PassMode;
use crate::config::ReconcileOptions;
use crate::diagnostics::Diagnostics;
use crate::error::ReconcileError;
use crate::reference::{strip_internal_links, ReferenceSet};

// ─── Session ─────────────────────────────────────────────────────────────────

/// Working state of one reconciliation. Stages are methods spread across
/// the crate's modules; [`reconcile`] runs them in order.
pub struct Session<'a> {
    pub(crate) complex: &'a mut Complex,
    pub(crate) kernel: &'a mut dyn KernelBundle,
    pub(crate) options: ReconcileOptions,
    pub(crate) refs: ReferenceSet,
    pub(crate) kept: [Vec<CellId>; 4],
    pub(crate) created: [Vec<CellId>; 4],
    pub(crate) removed: Vec<CellId>,
    pub(crate) replaced_by: BTreeMap<CellId, Vec<CellId>>,
    pub(crate) diagnostics: Diagnostics,
}

impl<'a> Session<'a> {
    pub fn new(
        complex: &'a mut Complex,
        kernel: &'a mut dyn KernelBundle,
        options: ReconcileOptions,
    ) -> Self {
        Self {
            complex,
            kernel,
            options,
            refs: ReferenceSet::default(),
            kept: Default::default(),
            created: Default::default(),
            removed: Vec::new(),
            replaced_by: BTreeMap::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Install the reference set and drop the links between references, so
    /// that only links the result confirms come back.
    pub fn begin(&mut self, refs: ReferenceSet) {
        strip_internal_links(self.complex, &refs.all_references());
        self.refs = refs;
    }

    pub fn references(&self) -> &ReferenceSet {
        &self.refs
    }

    pub fn kept(&self, dim: Dimension) -> &[CellId] {
        &self.kept[dim.index()]
    }

    pub fn created(&self, dim: Dimension) -> &[CellId] {
        &self.created[dim.index()]
    }

    pub fn removed(&self) -> &[CellId] {
        &self.removed
    }

    pub fn replaced_by(&self) -> &BTreeMap<CellId, Vec<CellId>> {
        &self.replaced_by
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Settle the removed set, check that nothing surviving still points at
    /// it, and retire it.
    pub fn finalize(mut self) -> Result<ReconcileResult, ReconcileError> {
        let complex = &mut *self.complex;
        let kept = &self.kept;
        self.removed
            .retain(|r| !kept[complex.dimension(*r).index()].contains(r));
        complex.sort_by_serial(&mut self.removed);
        let removed = &self.removed;
        self.replaced_by.retain(|e, _| removed.contains(e));

        for &r in removed {
            if !complex.is_live(r) {
                continue;
            }
            if let Some(&other) = complex
                .neighbors(r)
                .iter()
                .find(|n| complex.is_live(**n) && !removed.contains(n))
            {
                return Err(ReconcileError::Consistency {
                    cell: complex.name(r),
                    reason: format!("removed cell still linked to {}", complex.name(other)),
                });
            }
        }
        for &r in removed {
            complex.retire(r);
        }

        let mut created: [Vec<CellId>; 4] = Default::default();
        let mut kept: [Vec<CellId>; 4] = Default::default();
        for d in 0..4 {
            created[d] = self.created[d]
                .iter()
                .copied()
                .filter(|c| complex.is_live(*c))
                .collect();
            complex.sort_by_serial(&mut created[d]);
            kept[d] = self.kept[d].clone();
            complex.sort_by_serial(&mut kept[d]);
        }

        Ok(ReconcileResult {
            created,
            kept,
            removed: self.removed,
            replaced_by: self.replaced_by,
            diagnostics: self.diagnostics,
        })
    }
}

// ─── Result ──────────────────────────────────────────────────────────────────

/// What a reconciliation did to the complex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileResult {
    /// New cells per dimension, serial-ordered.
    pub created: [Vec<CellId>; 4],
    /// Reference cells that survived, per dimension.
    pub kept: [Vec<CellId>; 4],
    /// Retired cells, serial-ordered.
    pub removed: Vec<CellId>,
    /// Successors of removed cells. Cells without successors have no entry.
    pub replaced_by: BTreeMap<CellId, Vec<CellId>>,
    pub diagnostics: Diagnostics,
}

impl ReconcileResult {
    pub fn created_in(&self, dim: Dimension) -> &[CellId] {
        &self.created[dim.index()]
    }

    pub fn kept_in(&self, dim: Dimension) -> &[CellId] {
        &self.kept[dim.index()]
    }

    /// Removed cells of one dimension. Retired cells still resolve.
    pub fn removed_in(&self, complex: &Complex, dim: Dimension) -> Vec<CellId> {
        self.removed
            .iter()
            .copied()
            .filter(|r| complex.dimension(*r) == dim)
            .collect()
    }

    pub fn successors(&self, cell: CellId) -> &[CellId] {
        self.replaced_by.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn all_created(&self) -> Vec<CellId> {
        self.created.iter().flatten().copied().collect()
    }

    pub fn created_count(&self) -> usize {
        self.created.iter().map(Vec::len).sum()
    }

    /// Nothing created and nothing removed.
    pub fn is_noop(&self) -> bool {
        self.created_count() == 0 && self.removed.is_empty()
    }
}

// ─── Entry Points ────────────────────────────────────────────────────────────

/// Reconcile the complex with `result_shape`, the kernel output of an
/// operation that consumed `inputs`.
#[instrument(skip(complex, kernel, options))]
pub fn reconcile(
    complex: &mut Complex,
    kernel: &mut dyn KernelBundle,
    inputs: &[CellId],
    result_shape: ShapeHandle,
    options: &ReconcileOptions,
) -> Result<ReconcileResult, ReconcileError> {
    let refs = ReferenceSet::collect(complex, inputs);
    run(complex, kernel, refs, result_shape, options)
}

/// Reconcile with every live cell as a reference, for operations over the
/// whole model.
#[instrument(skip(complex, kernel, options))]
pub fn reconcile_all(
    complex: &mut Complex,
    kernel: &mut dyn KernelBundle,
    result_shape: ShapeHandle,
    options: &ReconcileOptions,
) -> Result<ReconcileResult, ReconcileError> {
    let refs = ReferenceSet::collect_all(complex);
    run(complex, kernel, refs, result_shape, options)
}

fn run(
    complex: &mut Complex,
    kernel: &mut dyn KernelBundle,
    refs: ReferenceSet,
    result_shape: ShapeHandle,
    options: &ReconcileOptions,
) -> Result<ReconcileResult, ReconcileError> {
    let mut session = Session::new(complex, kernel, *options);
    session.begin(refs);

    let pass = session.classify_shape(result_shape, PassMode::Primary)?;
    session.connect(&pass)?;
    session.clean(options.delete_orphan_vertices);
    session.build_replacements()?;
    if options.propagate_adjacent {
        session.propagate(result_shape)?;
    }
    session.rewrite_adjacent_links()?;

    let result = session.finalize()?;
    info!(
        created = result.created_count(),
        kept = result.kept.iter().map(Vec::len).sum::<usize>(),
        removed = result.removed.len(),
        replaced = result.replaced_by.len(),
        warnings = result.diagnostics.len(),
        "reconciliation complete"
    );
    Ok(result)
}
