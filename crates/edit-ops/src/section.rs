use geom_kernel::{BooleanOp, KernelBundle};
use geom_types::Axis;
use reconcile::ReconcileOptions;
use topo_complex::{CellId, Complex};

use crate::command::{check_inputs, representations, run_command, single_or_compound, Scope};
use crate::types::{CommandKind, EditError, EditResult};

/// Split cells by the plane `axis = offset`. Neighbours sharing a modified
/// face are repaired so that they follow the new faces.
pub fn execute_section(
    complex: &mut Complex,
    kernel: &mut dyn KernelBundle,
    cells: &[CellId],
    axis: Axis,
    offset: f64,
) -> Result<EditResult, EditError> {
    check_inputs(complex, cells, None)?;
    let shapes = representations(complex, cells);
    run_command(
        complex,
        kernel,
        CommandKind::Section,
        Scope::Cells(cells),
        &ReconcileOptions::new(),
        |k| {
            let object = single_or_compound(k, &shapes)?;
            let plane = k.make_plane(axis, offset);
            k.compute_boolean(BooleanOp::Split, &[object, plane])
        },
    )
}
