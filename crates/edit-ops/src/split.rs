use geom_kernel::{BooleanOp, KernelBundle};
use geom_types::{Dimension, Point3d};
use reconcile::ReconcileOptions;
use topo_complex::{CellId, Complex};

use crate::command::{check_inputs, run_command, Scope};
use crate::types::{CommandKind, EditError, EditResult};

/// Split a curve in two at an interior point.
pub fn execute_split_curve(
    complex: &mut Complex,
    kernel: &mut dyn KernelBundle,
    curve: CellId,
    at: Point3d,
) -> Result<EditResult, EditError> {
    check_inputs(complex, &[curve], Some(Dimension::Curve))?;
    let [rep] = complex[curve].shapes() else {
        return Err(EditError::invalid(format!(
            "{} is a composite curve",
            complex.name(curve)
        )));
    };
    let rep = *rep;
    let options = ReconcileOptions::for_curve_split();
    let tol = options.tolerance.coincidence;

    let splitter = kernel.make_vertex(at);
    let introspect = kernel.as_introspect();
    if !introspect.contains(rep, splitter, tol) {
        return Err(EditError::invalid(format!(
            "point is not on {}",
            complex.name(curve)
        )));
    }
    if introspect
        .vertex_points(rep)
        .iter()
        .any(|end| options.tolerance.points_coincident(end, &at))
    {
        return Err(EditError::invalid(format!(
            "point is an end of {}",
            complex.name(curve)
        )));
    }

    run_command(
        complex,
        kernel,
        CommandKind::SplitCurve,
        Scope::Cells(&[curve]),
        &options,
        |k| k.compute_boolean(BooleanOp::Split, &[rep, splitter]),
    )
}
