use geom_kernel::{KernelError, ShapeHandle};
use geom_types::Dimension;
use reconcile::{ReconcileError, ReconcileResult};
use serde::{Deserialize, Serialize};
use topo_complex::CellId;

/// Which command produced an [`EditResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    Import,
    Fuse,
    Cut,
    Common,
    Glue,
    Section,
    SplitCurve,
    Remove,
}

/// Complete result of an editing command.
#[derive(Debug, Clone)]
pub struct EditResult {
    pub command: CommandKind,
    /// The kernel shape the complex was reconciled with. `None` for commands
    /// that never call the kernel.
    pub shape: Option<ShapeHandle>,
    /// Provenance: created, kept, removed and replaced cells.
    pub outcome: ReconcileResult,
}

impl EditResult {
    pub fn created_in(&self, dim: Dimension) -> &[CellId] {
        self.outcome.created_in(dim)
    }

    pub fn removed(&self) -> &[CellId] {
        &self.outcome.removed
    }

    pub fn successors(&self, cell: CellId) -> &[CellId] {
        self.outcome.successors(cell)
    }
}

/// Errors from editing commands. The complex is back in its pre-command
/// state whenever one of these is returned.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EditError {
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("reconciliation failed: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
}

impl EditError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        EditError::InvalidInput {
            reason: reason.into(),
        }
    }
}
