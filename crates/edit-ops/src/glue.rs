use geom_kernel::{BooleanOp, KernelBundle};
use reconcile::ReconcileOptions;
use topo_complex::{CellId, Complex};

use crate::command::{check_inputs, representations, run_command, Scope};
use crate::types::{CommandKind, EditError, EditResult};

/// Sew cells together so that coincident geometry is shared. Duplicates are
/// merged into the cell with the lowest serial.
pub fn execute_glue(
    complex: &mut Complex,
    kernel: &mut dyn KernelBundle,
    cells: &[CellId],
) -> Result<EditResult, EditError> {
    check_inputs(complex, cells, None)?;
    let shapes = representations(complex, cells);
    run_command(
        complex,
        kernel,
        CommandKind::Glue,
        Scope::Cells(cells),
        &ReconcileOptions::new(),
        |k| k.compute_boolean(BooleanOp::Sew, &shapes),
    )
}

/// Glue every top-level cell of the complex, with every live cell as a
/// reference.
pub fn execute_glue_all(
    complex: &mut Complex,
    kernel: &mut dyn KernelBundle,
) -> Result<EditResult, EditError> {
    let top: Vec<CellId> = complex
        .iter()
        .filter(|(_, cell)| !cell.retired && cell.up().is_empty())
        .map(|(id, _)| id)
        .collect();
    check_inputs(complex, &top, None)?;
    let shapes = representations(complex, &top);
    run_command(
        complex,
        kernel,
        CommandKind::Glue,
        Scope::All,
        &ReconcileOptions::new(),
        |k| k.compute_boolean(BooleanOp::Sew, &shapes),
    )
}
