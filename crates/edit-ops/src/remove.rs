use reconcile::ReconcileResult;
use topo_complex::{CellId, Complex};
use tracing::{info, instrument};

use crate::command::check_inputs;
use crate::types::{CommandKind, EditError, EditResult};

/// Remove cells together with every cell built on them. With
/// `propagate_down`, lower cells left with nothing above them go as well.
#[instrument(skip(complex))]
pub fn execute_remove(
    complex: &mut Complex,
    cells: &[CellId],
    propagate_down: bool,
) -> Result<EditResult, EditError> {
    check_inputs(complex, cells, None)?;

    let mut doomed: Vec<CellId> = Vec::new();
    for &id in cells {
        doomed.push(id);
        doomed.extend(complex.up_closure(id));
    }
    complex.sort_by_serial(&mut doomed);

    if propagate_down {
        loop {
            let mut orphaned = Vec::new();
            for &id in &doomed {
                for &below in complex.down(id) {
                    if doomed.contains(&below) || orphaned.contains(&below) {
                        continue;
                    }
                    if complex.up(below).iter().all(|up| doomed.contains(up)) {
                        orphaned.push(below);
                    }
                }
            }
            if orphaned.is_empty() {
                break;
            }
            doomed.extend(orphaned);
        }
        complex.sort_by_serial(&mut doomed);
    }

    for &id in &doomed {
        complex.retire(id);
    }
    info!(removed = doomed.len(), "cells removed");

    Ok(EditResult {
        command: CommandKind::Remove,
        shape: None,
        outcome: ReconcileResult {
            removed: doomed,
            ..Default::default()
        },
    })
}
