//! Assertion helpers with diagnostic output.
//!
//! Every failure names the step it happened after and shows expected versus
//! actual values.

use topo_complex::{CellId, Complex};

use crate::helpers::{live_counts, HarnessError};
use crate::oracle::OracleVerdict;

/// Assert exact live cell counts, vertices first.
pub fn assert_live_counts(
    complex: &Complex,
    expected: [usize; 4],
    ctx: &str,
) -> Result<(), HarnessError> {
    let actual = live_counts(complex);
    if actual == expected {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] expected V={} C={} S={} Vol={}, got V={} C={} S={} Vol={}",
                ctx,
                expected[0],
                expected[1],
                expected[2],
                expected[3],
                actual[0],
                actual[1],
                actual[2],
                actual[3],
            ),
        })
    }
}

/// Assert every verdict passed, reporting the first that did not.
pub fn assert_all_pass(verdicts: &[OracleVerdict], ctx: &str) -> Result<(), HarnessError> {
    match verdicts.iter().find(|v| !v.passed) {
        None => Ok(()),
        Some(v) => Err(HarnessError::OracleFailure {
            oracle: v.oracle_name.clone(),
            detail: format!("[{}] {}", ctx, v.detail),
        }),
    }
}

/// Assert a cell is bounded by exactly `expected` cells one dimension down.
pub fn assert_boundary_size(
    complex: &Complex,
    cell: CellId,
    expected: usize,
    ctx: &str,
) -> Result<(), HarnessError> {
    let actual = complex.down(cell).len();
    if actual == expected {
        return Ok(());
    }
    Err(HarnessError::AssertionFailed {
        detail: format!(
            "[{}] {} expected {} boundary cells, got {}",
            ctx,
            complex.name(cell),
            expected,
            actual
        ),
    })
}

/// Assert the cell is retired and was replaced by exactly `expected` cells.
pub fn assert_replaced(
    complex: &Complex,
    successors: &[CellId],
    cell: CellId,
    expected: usize,
    ctx: &str,
) -> Result<(), HarnessError> {
    if complex.is_live(cell) {
        return Err(HarnessError::AssertionFailed {
            detail: format!("[{}] {} is still live", ctx, complex.name(cell)),
        });
    }
    if successors.len() != expected {
        return Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] {} expected {} successors, got {}",
                ctx,
                complex.name(cell),
                expected,
                successors.len()
            ),
        });
    }
    Ok(())
}
