use geom_kernel::{KernelBundle, KernelError, ShapeHandle};
use geom_types::Dimension;
use reconcile::{reconcile, reconcile_all, ReconcileOptions, ReconcileResult};
use topo_complex::{CellId, Complex};
use tracing::{info, instrument, warn};

use crate::groups::transfer_groups;
use crate::types::{CommandKind, EditError, EditResult};

/// Cells a command consumes.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Scope<'a> {
    Cells(&'a [CellId]),
    /// Every live cell.
    All,
}

/// Snapshot, build the result shape, reconcile and transfer groups. The
/// snapshot is restored on any error.
#[instrument(skip_all, fields(command = ?kind))]
pub(crate) fn run_command<F>(
    complex: &mut Complex,
    kernel: &mut dyn KernelBundle,
    kind: CommandKind,
    scope: Scope<'_>,
    options: &ReconcileOptions,
    build: F,
) -> Result<EditResult, EditError>
where
    F: FnOnce(&mut dyn KernelBundle) -> Result<ShapeHandle, KernelError>,
{
    let snapshot = complex.snapshot();
    match apply(complex, kernel, scope, options, build) {
        Ok((shape, outcome)) => {
            let moved = transfer_groups(complex, &outcome);
            info!(
                created = outcome.created_count(),
                removed = outcome.removed.len(),
                group_moves = moved,
                "command applied"
            );
            Ok(EditResult {
                command: kind,
                shape: Some(shape),
                outcome,
            })
        }
        Err(err) => {
            warn!(error = %err, "command failed, complex restored");
            complex.restore(snapshot);
            Err(err)
        }
    }
}

fn apply<F>(
    complex: &mut Complex,
    kernel: &mut dyn KernelBundle,
    scope: Scope<'_>,
    options: &ReconcileOptions,
    build: F,
) -> Result<(ShapeHandle, ReconcileResult), EditError>
where
    F: FnOnce(&mut dyn KernelBundle) -> Result<ShapeHandle, KernelError>,
{
    let shape = build(&mut *kernel)?;
    let outcome = match scope {
        Scope::Cells(inputs) => reconcile(complex, kernel, inputs, shape, options)?,
        Scope::All => reconcile_all(complex, kernel, shape, options)?,
    };
    Ok((shape, outcome))
}

// ─── Input Checks ────────────────────────────────────────────────────────────

/// Every cell must be live and, when `dim` is given, of that dimension.
pub(crate) fn check_inputs(
    complex: &Complex,
    cells: &[CellId],
    dim: Option<Dimension>,
) -> Result<(), EditError> {
    if cells.is_empty() {
        return Err(EditError::invalid("no input cells"));
    }
    for &id in cells {
        if !complex.is_live(id) {
            return Err(EditError::invalid(format!(
                "{} is not a live cell",
                complex.name(id)
            )));
        }
        if let Some(dim) = dim {
            if complex.dimension(id) != dim {
                return Err(EditError::invalid(format!(
                    "{} is not a {dim}",
                    complex.name(id)
                )));
            }
        }
    }
    Ok(())
}

/// Kernel representations of the given cells, in order.
pub(crate) fn representations(complex: &Complex, cells: &[CellId]) -> Vec<ShapeHandle> {
    cells
        .iter()
        .flat_map(|id| complex[*id].shapes().iter().copied())
        .collect()
}

/// One shape standing for several: the shape itself or a compound.
pub(crate) fn single_or_compound(
    kernel: &mut dyn KernelBundle,
    shapes: &[ShapeHandle],
) -> Result<ShapeHandle, KernelError> {
    match shapes {
        [one] => Ok(*one),
        many => kernel.make_compound(many),
    }
}
