//! Helper functions: error type, point and box fixtures, cell lookups.

use edit_ops::EditError;
use geom_kernel::{BooleanOp, Kernel, KernelError, KernelIntrospect, MockKernel, ShapeHandle};
use geom_types::{Dimension, Point3d};
use topo_complex::{CellId, Complex};

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("cell not found: {name}")]
    CellNotFound { name: String },

    #[error("duplicate name: {name}")]
    DuplicateName { name: String },

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },

    #[error("command failed: {0}")]
    Edit(#[from] EditError),

    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("report serialisation failed: {0}")]
    Report(#[from] serde_json::Error),
}

// ── Geometry Fixtures ───────────────────────────────────────────────────────

pub fn point(c: [f64; 3]) -> Point3d {
    Point3d::new(c[0], c[1], c[2])
}

/// One compound holding every box, sewn so touching boxes share faces.
pub fn sewn_boxes(
    kernel: &mut MockKernel,
    boxes: &[([f64; 3], [f64; 3])],
) -> Result<ShapeHandle, HarnessError> {
    let mut shapes = Vec::with_capacity(boxes.len());
    for (min, max) in boxes {
        shapes.push(kernel.make_box(point(*min), point(*max))?);
    }
    Ok(kernel.compute_boolean(BooleanOp::Sew, &shapes)?)
}

// ── Cell Lookups ────────────────────────────────────────────────────────────

/// Live cell of `dim` whose bounding box minimum corner is at `min`.
pub fn cell_with_min_corner(
    complex: &Complex,
    introspect: &dyn KernelIntrospect,
    dim: Dimension,
    min: [f64; 3],
) -> Option<CellId> {
    let target = point(min);
    complex.cells(dim).into_iter().find(|id| {
        complex[*id]
            .shapes()
            .first()
            .map(|s| introspect.bounding_box(*s).min.distance_to(&target) < 1e-9)
            .unwrap_or(false)
    })
}

/// Surfaces bounding more than one volume.
pub fn shared_surfaces(complex: &Complex) -> Vec<CellId> {
    complex
        .cells(Dimension::Surface)
        .into_iter()
        .filter(|s| complex.up(*s).len() > 1)
        .collect()
}

/// Live cell counts per dimension, vertices first.
pub fn live_counts(complex: &Complex) -> [usize; 4] {
    Dimension::ALL.map(|d| complex.live_count(d))
}
