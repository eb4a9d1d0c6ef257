use geom_kernel::KernelError;
use topo_complex::ComplexError;

/// Fatal errors from a reconciliation pass. Either one aborts the command;
/// the caller restores its snapshot.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReconcileError {
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("inconsistent complex at {cell}: {reason}")]
    Consistency { cell: String, reason: String },

    #[error("inconsistent complex: {0}")]
    Complex(#[from] ComplexError),
}

impl ReconcileError {
    /// True for errors signalling a corrupt complex rather than a kernel failure.
    pub fn is_consistency(&self) -> bool {
        matches!(
            self,
            ReconcileError::Consistency { .. } | ReconcileError::Complex(_)
        )
    }
}
