//! Tests for verification oracles.

use geom_kernel::ShapeHandle;
use reconcile::ReconcileResult;
use test_harness::oracle::*;
use test_harness::ModelBuilder;
use topo_complex::Complex;

fn box_model() -> ModelBuilder {
    let mut m = ModelBuilder::mock();
    m.new_box("box", [0., 0., 0.], [1., 1., 1.]).unwrap();
    m
}

// ── Complex Oracle Tests ────────────────────────────────────────────────

#[test]
fn imported_box_passes_every_check() {
    let m = box_model();
    let verdicts = m.check_all();
    assert_eq!(verdicts.len(), 6);
    for v in &verdicts {
        assert!(v.passed, "{} failed: {}", v.oracle_name, v.detail);
    }
}

#[test]
fn retired_links_pass_and_unbounded_curve_fails() {
    let mut c = Complex::new();
    let v = c.add_vertex(ShapeHandle(1));
    let e = c.add_curve(ShapeHandle(2));
    c.link(v, e).unwrap();
    c.retire(v);
    assert!(check_adjacency(&c).passed);

    let mut c = Complex::new();
    c.add_curve(ShapeHandle(2));
    let verdict = check_boundaries(&c);
    assert!(!verdict.passed);
    assert!(verdict.detail.contains("Crb"), "{}", verdict.detail);
}

#[test]
fn duplicates_fail_geometric_uniqueness() {
    let mut m = ModelBuilder::mock();
    m.new_box("a", [0., 0., 0.], [1., 1., 1.]).unwrap();
    m.new_box("b", [1., 0., 0.], [2., 1., 1.]).unwrap();
    let verdict = check_geometric_uniqueness(m.complex(), m.kernel(), 1e-7);
    assert!(!verdict.passed);
    assert!(verdict.detail.starts_with("9 of"), "{}", verdict.detail);

    m.glue_all().unwrap();
    assert!(check_geometric_uniqueness(m.complex(), m.kernel(), 1e-7).passed);
}

// ── Provenance Oracle Tests ─────────────────────────────────────────────

#[test]
fn self_replacement_is_reported() {
    let mut c = Complex::new();
    let e = c.add_curve(ShapeHandle(1));
    let mut r = ReconcileResult::default();
    r.replaced_by.insert(e, vec![e]);
    let verdict = check_replacements(&c, &r);
    assert!(!verdict.passed);
    assert!(verdict.detail.contains("replaces itself"));
}

#[test]
fn live_removed_cell_is_reported() {
    let mut c = Complex::new();
    let e = c.add_curve(ShapeHandle(1));
    let r = ReconcileResult {
        removed: vec![e],
        ..Default::default()
    };
    assert!(!check_removed_detached(&c, &r).passed);
    c.retire(e);
    assert!(check_removed_detached(&c, &r).passed);
}

#[test]
fn section_passes_provenance_checks() {
    let mut m = ModelBuilder::mock();
    m.new_box("box", [0., 0., 0.], [2., 1., 1.]).unwrap();
    m.section("box", geom_types::Axis::X, 1.0).unwrap();
    let r = &m.last_result().unwrap().outcome;
    assert!(check_removed_detached(m.complex(), r).passed);
    assert!(check_replacements(m.complex(), r).passed);
    assert!(check_no_orphan_vertices(m.complex(), r).passed);
}
