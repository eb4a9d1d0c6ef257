//! Commands that bring new geometry into the complex.

use geom_kernel::{KernelBundle, ShapeHandle};
use geom_types::Point3d;
use reconcile::ReconcileOptions;
use topo_complex::Complex;

use crate::command::{run_command, Scope};
use crate::types::{CommandKind, EditError, EditResult};

/// Reconcile an existing kernel shape into the complex with no references.
/// Every sub-shape gets a fresh cell, standalone vertices included. Shapes
/// that coincide with existing cells are duplicated until glued.
pub fn execute_import(
    complex: &mut Complex,
    kernel: &mut dyn KernelBundle,
    shape: ShapeHandle,
) -> Result<EditResult, EditError> {
    run_command(
        complex,
        kernel,
        CommandKind::Import,
        Scope::Cells(&[]),
        &ReconcileOptions::for_curve_split(),
        |_| Ok(shape),
    )
}

pub fn execute_new_vertex(
    complex: &mut Complex,
    kernel: &mut dyn KernelBundle,
    point: Point3d,
) -> Result<EditResult, EditError> {
    let shape = kernel.make_vertex(point);
    execute_import(complex, kernel, shape)
}

pub fn execute_new_segment(
    complex: &mut Complex,
    kernel: &mut dyn KernelBundle,
    start: Point3d,
    end: Point3d,
) -> Result<EditResult, EditError> {
    let shape = kernel.make_segment(start, end)?;
    execute_import(complex, kernel, shape)
}

pub fn execute_new_rectangle(
    complex: &mut Complex,
    kernel: &mut dyn KernelBundle,
    a: Point3d,
    b: Point3d,
) -> Result<EditResult, EditError> {
    let shape = kernel.make_rectangle(a, b)?;
    execute_import(complex, kernel, shape)
}

pub fn execute_new_box(
    complex: &mut Complex,
    kernel: &mut dyn KernelBundle,
    min: Point3d,
    max: Point3d,
) -> Result<EditResult, EditError> {
    let shape = kernel.make_box(min, max)?;
    execute_import(complex, kernel, shape)
}
