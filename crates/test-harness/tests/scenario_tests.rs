//! Multi-command editing sessions against MockKernel.
//!
//! Scenarios run with auto-check on where every intermediate complex is
//! expected to be clean, so each command is followed by the oracle suite.

use geom_kernel::Side;
use geom_types::Axis;
use test_harness::assertions::{assert_all_pass, assert_boundary_size, assert_replaced};
use test_harness::helpers::shared_surfaces;
use test_harness::ModelBuilder;

// ── Scenario 1: Import and glue ─────────────────────────────────────────

#[test]
fn separate_boxes_glued_share_one_face() {
    // Separate imports duplicate the touching face, so no auto-check here.
    let mut m = ModelBuilder::mock();
    m.new_box("a", [0., 0., 0.], [1., 1., 1.]).unwrap();
    m.new_box("b", [1., 0., 0.], [2., 1., 1.]).unwrap();
    m.assert_live_counts([16, 24, 12, 2]).unwrap();
    assert!(shared_surfaces(m.complex()).is_empty());

    m.glue_all().unwrap();
    m.assert_live_counts([12, 20, 11, 2]).unwrap();
    assert_eq!(shared_surfaces(m.complex()).len(), 1);
    assert_all_pass(&m.check_all(), "glue").unwrap();
}

// ── Scenario 2: Section next to a neighbour ─────────────────────────────

#[test]
fn section_repairs_neighbour() {
    let mut m = ModelBuilder::mock().with_auto_check();
    m.sewn_boxes(
        &["lower", "upper"],
        &[([0., 0., 0.], [2., 1., 1.]), ([0., 0., 1.], [2., 1., 2.])],
    )
    .unwrap();
    let lower = m.cell("lower").unwrap();
    let upper = m.cell("upper").unwrap();

    m.section("lower", Axis::X, 1.0).unwrap();
    let last = m.last_result().unwrap();
    assert_replaced(m.complex(), last.successors(lower), lower, 2, "section").unwrap();
    assert_eq!(m.kernel().split_modified_calls(), 1);
    assert_boundary_size(m.complex(), upper, 7, "section").unwrap();
    assert_eq!(shared_surfaces(m.complex()).len(), 3);
}

// ── Scenario 3: Cut, then remove what is left ───────────────────────────

#[test]
fn cut_then_remove_everything() {
    let mut m = ModelBuilder::mock().with_auto_check();
    m.new_box("box", [0., 0., 0.], [2., 1., 1.]).unwrap();
    m.cut_half_space("box", Axis::X, 1.0, Side::Above).unwrap();
    m.assert_live_counts([8, 12, 6, 1]).unwrap();
    m.remove("box", true).unwrap();
    m.assert_live_counts([0, 0, 0, 0]).unwrap();
}

// ── Scenario 4: Fuse a sewn pair ────────────────────────────────────────

#[test]
fn fuse_sewn_pair() {
    let mut m = ModelBuilder::mock().with_auto_check();
    m.sewn_boxes(
        &["a", "b"],
        &[([0., 0., 0.], [1., 1., 1.]), ([1., 0., 0.], [2., 1., 1.])],
    )
    .unwrap();
    let fused = m.fuse("ab", "a", "b").unwrap();
    m.assert_live_counts([12, 20, 10, 1]).unwrap();
    assert_boundary_size(m.complex(), fused, 10, "fuse").unwrap();
    assert_eq!(m.cell("a").unwrap(), fused);
}

// ── Scenario 5: Curve split ─────────────────────────────────────────────

#[test]
fn split_curve_into_halves() {
    let mut m = ModelBuilder::mock().with_auto_check();
    m.new_segment("rail", [0., 0., 0.], [3., 0., 0.]).unwrap();
    let first = m.split_curve("rail", [1., 0., 0.]).unwrap();
    assert_eq!(first.len(), 2);
    m.assert_live_counts([3, 2, 0, 0]).unwrap();
    assert!(m.cell("rail").is_err());
}
