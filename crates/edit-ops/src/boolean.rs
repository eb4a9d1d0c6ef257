use geom_kernel::{BooleanOp, KernelBundle, ShapeHandle, Side};
use geom_types::{Axis, Dimension};
use reconcile::ReconcileOptions;
use topo_complex::{CellId, Complex};
use tracing::debug;

use crate::command::{check_inputs, representations, run_command, single_or_compound, Scope};
use crate::groups::transfer_groups;
use crate::types::{CommandKind, EditError, EditResult};

/// Tool of a cut or common.
#[derive(Debug, Clone, PartialEq)]
pub enum Tool {
    /// Unbounded half-space on `side` of the plane `axis = offset`.
    HalfSpace { axis: Axis, offset: f64, side: Side },
    /// Volumes of the complex. They are consumed by the command.
    Volumes(Vec<CellId>),
}

/// Fuse volumes into as few volumes as the kernel can make. Every consumed
/// volume is replaced by all the resulting volumes.
pub fn execute_fuse(
    complex: &mut Complex,
    kernel: &mut dyn KernelBundle,
    volumes: &[CellId],
) -> Result<EditResult, EditError> {
    check_inputs(complex, volumes, Some(Dimension::Volume))?;
    if volumes.len() < 2 {
        return Err(EditError::invalid("fuse needs at least two volumes"));
    }
    let shapes = representations(complex, volumes);
    let mut edit = run_command(
        complex,
        kernel,
        CommandKind::Fuse,
        Scope::Cells(volumes),
        &ReconcileOptions::new(),
        |k| k.compute_boolean(BooleanOp::Fuse, &shapes),
    )?;

    let fused = edit.created_in(Dimension::Volume).to_vec();
    if !fused.is_empty() {
        for v in volumes {
            if edit.outcome.removed.contains(v) {
                let successors = edit.outcome.replaced_by.entry(*v).or_default();
                for f in &fused {
                    if !successors.contains(f) {
                        successors.push(*f);
                    }
                }
                complex.sort_by_serial(successors);
            }
        }
        transfer_groups(complex, &edit.outcome);
    }
    debug!(fused = fused.len(), "fuse complete");
    Ok(edit)
}

/// Remove the tool's region from `objects`.
pub fn execute_cut(
    complex: &mut Complex,
    kernel: &mut dyn KernelBundle,
    objects: &[CellId],
    tool: &Tool,
) -> Result<EditResult, EditError> {
    run_boolean(complex, kernel, CommandKind::Cut, BooleanOp::Cut, objects, tool)
}

/// Keep only the part of `objects` inside the tool.
pub fn execute_common(
    complex: &mut Complex,
    kernel: &mut dyn KernelBundle,
    objects: &[CellId],
    tool: &Tool,
) -> Result<EditResult, EditError> {
    run_boolean(
        complex,
        kernel,
        CommandKind::Common,
        BooleanOp::Common,
        objects,
        tool,
    )
}

fn run_boolean(
    complex: &mut Complex,
    kernel: &mut dyn KernelBundle,
    kind: CommandKind,
    op: BooleanOp,
    objects: &[CellId],
    tool: &Tool,
) -> Result<EditResult, EditError> {
    check_inputs(complex, objects, Some(Dimension::Volume))?;
    let mut inputs = objects.to_vec();
    let tool_shapes: Vec<ShapeHandle> = match tool {
        Tool::HalfSpace { .. } => Vec::new(),
        Tool::Volumes(volumes) => {
            check_inputs(complex, volumes, Some(Dimension::Volume))?;
            if volumes.iter().any(|v| objects.contains(v)) {
                return Err(EditError::invalid("a volume cannot be both object and tool"));
            }
            inputs.extend(volumes.iter().copied());
            representations(complex, volumes)
        }
    };
    let object_shapes = representations(complex, objects);

    run_command(
        complex,
        kernel,
        kind,
        Scope::Cells(&inputs),
        &ReconcileOptions::new(),
        |k| {
            let object = single_or_compound(k, &object_shapes)?;
            let mut operands = vec![object];
            match tool {
                Tool::HalfSpace { axis, offset, side } => {
                    operands.push(k.make_half_space(*axis, *offset, *side))
                }
                Tool::Volumes(_) => operands.extend(tool_shapes.iter().copied()),
            }
            k.compute_boolean(op, &operands)
        },
    )
}
