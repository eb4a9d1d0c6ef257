//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail, not panics.
//! This lets a test collect all failures in one pass.

use geom_kernel::KernelIntrospect;
use geom_types::Dimension;
use reconcile::ReconcileResult;
use serde::Serialize;
use topo_complex::Complex;

/// The result of a single oracle check.
#[derive(Debug, Clone, Serialize)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
        }
    }

    fn from_failures(name: &str, checked: usize, what: &str, failures: Vec<String>) -> Self {
        if failures.is_empty() {
            Self::pass(name, format!("all {checked} {what} ok"))
        } else {
            Self::fail(
                name,
                format!(
                    "{} of {checked} {what} failed: {:?}",
                    failures.len(),
                    &failures[..failures.len().min(5)]
                ),
            )
        }
    }
}

// ── Complex Oracles ─────────────────────────────────────────────────────────

/// Adjacency is symmetric, one dimension apart, duplicate-free and never
/// points at a retired cell.
pub fn check_adjacency(complex: &Complex) -> OracleVerdict {
    let audit = complex.audit();
    if audit.all_valid() {
        OracleVerdict::pass("adjacency", format!("{} cells audited", complex.len()))
    } else {
        OracleVerdict::fail(
            "adjacency",
            format!(
                "{} audit errors: {:?}",
                audit.errors.len(),
                &audit.errors[..audit.errors.len().min(5)]
            ),
        )
    }
}

/// Every curve, surface and volume is bounded by something.
pub fn check_boundaries(complex: &Complex) -> OracleVerdict {
    let mut checked = 0;
    let mut failures = Vec::new();
    for dim in [Dimension::Curve, Dimension::Surface, Dimension::Volume] {
        for id in complex.cells(dim) {
            checked += 1;
            if complex.down(id).is_empty() {
                failures.push(complex.name(id));
            }
        }
    }
    OracleVerdict::from_failures("boundaries", checked, "bounded cells", failures)
}

/// No two live cells of one dimension carry the same geometry.
pub fn check_geometric_uniqueness(
    complex: &Complex,
    introspect: &dyn KernelIntrospect,
    tol: f64,
) -> OracleVerdict {
    let mut checked = 0;
    let mut failures = Vec::new();
    for dim in Dimension::ALL {
        let cells = complex.cells(dim);
        checked += cells.len();
        for (i, a) in cells.iter().enumerate() {
            for b in &cells[i + 1..] {
                let same = complex[*a].shapes().iter().all(|sa| {
                    complex[*b]
                        .shapes()
                        .iter()
                        .any(|sb| introspect.equal(*sa, *sb, tol))
                });
                if same {
                    failures.push(format!("{} = {}", complex.name(*a), complex.name(*b)));
                }
            }
        }
    }
    OracleVerdict::from_failures("geometric_uniqueness", checked, "cells", failures)
}

// ── Provenance Oracles ──────────────────────────────────────────────────────

/// Removed cells are retired and detached, and were not created in the same
/// run.
pub fn check_removed_detached(complex: &Complex, result: &ReconcileResult) -> OracleVerdict {
    let created = result.all_created();
    let failures = result
        .removed
        .iter()
        .filter(|id| {
            complex.is_live(**id) || complex[**id].has_adjacency() || created.contains(id)
        })
        .map(|id| complex.name(*id))
        .collect();
    OracleVerdict::from_failures("removed_detached", result.removed.len(), "removed cells", failures)
}

/// No cell replaces itself, and every successor is live and of the same
/// dimension as the cell it replaces.
pub fn check_replacements(complex: &Complex, result: &ReconcileResult) -> OracleVerdict {
    let mut failures = Vec::new();
    for (old, successors) in &result.replaced_by {
        if successors.contains(old) {
            failures.push(format!("{} replaces itself", complex.name(*old)));
        }
        for s in successors {
            if !complex.is_live(*s) {
                failures.push(format!(
                    "{} successor {} is gone",
                    complex.name(*old),
                    complex.name(*s)
                ));
            } else if complex.dimension(*s) != complex.dimension(*old) {
                failures.push(format!(
                    "{} successor {} changes dimension",
                    complex.name(*old),
                    complex.name(*s)
                ));
            }
        }
    }
    OracleVerdict::from_failures(
        "replacements",
        result.replaced_by.len(),
        "replaced cells",
        failures,
    )
}

/// Created vertices hang off a created or kept curve, unless the run made
/// no curves at all.
pub fn check_no_orphan_vertices(complex: &Complex, result: &ReconcileResult) -> OracleVerdict {
    let vertices = result.created_in(Dimension::Vertex);
    if result.created_in(Dimension::Curve).is_empty() && result.kept_in(Dimension::Curve).is_empty()
    {
        return OracleVerdict::pass("orphan_vertices", "no curves in result".to_string());
    }
    let failures = vertices
        .iter()
        .filter(|v| complex.up(**v).is_empty())
        .map(|v| complex.name(*v))
        .collect();
    OracleVerdict::from_failures("orphan_vertices", vertices.len(), "created vertices", failures)
}

// ── Composite ───────────────────────────────────────────────────────────────

/// Checks that only need the complex.
pub fn run_complex_checks(
    complex: &Complex,
    introspect: &dyn KernelIntrospect,
    tol: f64,
) -> Vec<OracleVerdict> {
    vec![
        check_adjacency(complex),
        check_boundaries(complex),
        check_geometric_uniqueness(complex, introspect, tol),
    ]
}

/// Every check, for the complex right after `result` was produced.
pub fn run_all_checks(
    complex: &Complex,
    introspect: &dyn KernelIntrospect,
    result: &ReconcileResult,
    tol: f64,
) -> Vec<OracleVerdict> {
    let mut verdicts = run_complex_checks(complex, introspect, tol);
    verdicts.push(check_removed_detached(complex, result));
    verdicts.push(check_replacements(complex, result));
    verdicts.push(check_no_orphan_vertices(complex, result));
    verdicts
}
