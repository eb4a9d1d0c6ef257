//! Editing commands driven end to end through the mock kernel.

use approx::assert_relative_eq;
use edit_ops::{
    execute_common, execute_cut, execute_fuse, execute_glue, execute_glue_all, execute_import,
    execute_new_box, execute_new_segment, execute_remove, execute_section, execute_split_curve,
    CommandKind, EditError, Tool,
};
use geom_kernel::{BooleanOp, Kernel, KernelError, KernelIntrospect, MockKernel, ShapeHandle, Side};
use geom_types::{Axis, Dimension, Point3d};
use topo_complex::{CellId, Complex};

fn p(x: f64, y: f64, z: f64) -> Point3d {
    Point3d::new(x, y, z)
}

fn live_counts(c: &Complex) -> [usize; 4] {
    Dimension::ALL.map(|d| c.live_count(d))
}

fn created_counts(r: &edit_ops::EditResult) -> [usize; 4] {
    Dimension::ALL.map(|d| r.created_in(d).len())
}

fn sewn_import(c: &mut Complex, k: &mut MockKernel, boxes: &[(Point3d, Point3d)]) {
    let shapes: Vec<ShapeHandle> = boxes
        .iter()
        .map(|(a, b)| k.make_box(*a, *b).unwrap())
        .collect();
    let sewn = k.compute_boolean(BooleanOp::Sew, &shapes).unwrap();
    execute_import(c, k, sewn).unwrap();
}

fn shared_face(c: &Complex) -> CellId {
    c.cells(Dimension::Surface)
        .into_iter()
        .find(|s| c.up(*s).len() == 2)
        .unwrap()
}

fn volume_with_min_x(c: &Complex, k: &MockKernel, x: f64) -> CellId {
    c.cells(Dimension::Volume)
        .into_iter()
        .find(|v| (k.bounding_box(c[*v].shapes()[0]).min.x - x).abs() < 1e-9)
        .unwrap()
}

// ── Import Tests ──

#[test]
fn new_box_creates_full_topology() {
    let mut k = MockKernel::new();
    let mut c = Complex::new();
    let r = execute_new_box(&mut c, &mut k, p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)).unwrap();
    assert_eq!(r.command, CommandKind::Import);
    assert!(r.shape.is_some());
    assert_eq!(created_counts(&r), [8, 12, 6, 1]);
    assert!(r.removed().is_empty());
}

#[test]
fn new_segment_creates_curve_and_ends() {
    let mut k = MockKernel::new();
    let mut c = Complex::new();
    let r = execute_new_segment(&mut c, &mut k, p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0)).unwrap();
    assert_eq!(created_counts(&r), [2, 1, 0, 0]);
    let curve = r.created_in(Dimension::Curve)[0];
    assert_eq!(c.down(curve).len(), 2);
}

// ── Fuse Tests ──

#[test]
fn fuse_replaces_both_volumes_and_merges_groups() {
    let mut k = MockKernel::new();
    let mut c = Complex::new();
    sewn_import(
        &mut c,
        &mut k,
        &[
            (p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)),
            (p(1.0, 0.0, 0.0), p(2.0, 1.0, 1.0)),
        ],
    );
    let left = volume_with_min_x(&c, &k, 0.0);
    let right = volume_with_min_x(&c, &k, 1.0);
    let wall = shared_face(&c);
    c.add_to_group(left, "left");
    c.add_to_group(right, "right");
    c.add_to_group(wall, "wall");

    let r = execute_fuse(&mut c, &mut k, &[left, right]).unwrap();
    assert_eq!(r.command, CommandKind::Fuse);
    assert_eq!(created_counts(&r), [0, 0, 0, 1]);
    let fused = r.created_in(Dimension::Volume)[0];
    assert_eq!(r.successors(left), &[fused]);
    assert_eq!(r.successors(right), &[fused]);
    assert!(r.removed().contains(&wall));
    assert!(r.successors(wall).is_empty());

    assert_eq!(c.groups(fused).len(), 2);
    assert_eq!(c.group_members("left"), vec![fused]);
    assert_eq!(c.group_members("right"), vec![fused]);
    assert!(c.group_members("wall").is_empty());
    assert_eq!(live_counts(&c), [12, 20, 10, 1]);
    assert!(c.audit().all_valid());
}

#[test]
fn fuse_needs_two_volumes() {
    let mut k = MockKernel::new();
    let mut c = Complex::new();
    execute_new_box(&mut c, &mut k, p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)).unwrap();
    let vol = c.cells(Dimension::Volume)[0];
    let face = c.cells(Dimension::Surface)[0];

    let err = execute_fuse(&mut c, &mut k, &[vol]).unwrap_err();
    assert!(matches!(err, EditError::InvalidInput { .. }));
    let err = execute_fuse(&mut c, &mut k, &[vol, face]).unwrap_err();
    assert!(matches!(err, EditError::InvalidInput { .. }));
    let err = execute_fuse(&mut c, &mut k, &[]).unwrap_err();
    assert!(matches!(err, EditError::InvalidInput { .. }));
}

// ── Cut Tests ──

#[test]
fn cut_that_misses_changes_nothing() {
    let mut k = MockKernel::new();
    let mut c = Complex::new();
    execute_new_box(&mut c, &mut k, p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)).unwrap();
    let vol = c.cells(Dimension::Volume)[0];
    let tool = Tool::HalfSpace {
        axis: Axis::Z,
        offset: 5.0,
        side: Side::Above,
    };
    let r = execute_cut(&mut c, &mut k, &[vol], &tool).unwrap();
    assert!(r.outcome.is_noop());
    assert!(c.is_live(vol));
}

#[test]
fn failed_cut_leaves_complex_untouched() {
    let mut k = MockKernel::new();
    let mut c = Complex::new();
    execute_new_box(&mut c, &mut k, p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)).unwrap();
    let vol = c.cells(Dimension::Volume)[0];
    let tool = Tool::HalfSpace {
        axis: Axis::X,
        offset: -1.0,
        side: Side::Above,
    };
    let err = execute_cut(&mut c, &mut k, &[vol], &tool).unwrap_err();
    assert!(matches!(
        err,
        EditError::Kernel(KernelError::DegenerateResult { .. })
    ));
    assert!(c.is_live(vol));
    assert_eq!(live_counts(&c), [8, 12, 6, 1]);
    assert!(c.audit().all_valid());
}

#[test]
fn cut_by_volume_consumes_the_tool() {
    let mut k = MockKernel::new();
    let mut c = Complex::new();
    execute_new_box(&mut c, &mut k, p(0.0, 0.0, 0.0), p(2.0, 1.0, 1.0)).unwrap();
    let object = c.cells(Dimension::Volume)[0];
    execute_new_box(&mut c, &mut k, p(1.0, -1.0, -1.0), p(3.0, 2.0, 2.0)).unwrap();
    let tool = volume_with_min_x(&c, &k, 1.0);
    c.add_to_group(object, "part");

    let r = execute_cut(&mut c, &mut k, &[object], &Tool::Volumes(vec![tool])).unwrap();
    assert_eq!(created_counts(&r), [4, 8, 5, 1]);
    assert_eq!(r.successors(object), r.created_in(Dimension::Volume));
    assert!(!c.is_live(tool));
    assert!(!c.is_live(object));
    assert_eq!(live_counts(&c), [8, 12, 6, 1]);
    assert_eq!(c.group_members("part"), r.created_in(Dimension::Volume));
    assert!(c.audit().all_valid());
}

#[test]
fn object_cannot_be_its_own_tool() {
    let mut k = MockKernel::new();
    let mut c = Complex::new();
    execute_new_box(&mut c, &mut k, p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)).unwrap();
    let vol = c.cells(Dimension::Volume)[0];
    let err = execute_cut(&mut c, &mut k, &[vol], &Tool::Volumes(vec![vol])).unwrap_err();
    assert!(matches!(err, EditError::InvalidInput { .. }));
}

// ── Common Tests ──

#[test]
fn common_with_half_space_keeps_one_side() {
    let mut k = MockKernel::new();
    let mut c = Complex::new();
    execute_new_box(&mut c, &mut k, p(0.0, 0.0, 0.0), p(2.0, 1.0, 1.0)).unwrap();
    let vol = c.cells(Dimension::Volume)[0];
    let tool = Tool::HalfSpace {
        axis: Axis::X,
        offset: 1.0,
        side: Side::Below,
    };
    let r = execute_common(&mut c, &mut k, &[vol], &tool).unwrap();
    assert_eq!(r.command, CommandKind::Common);
    assert_eq!(created_counts(&r), [4, 8, 5, 1]);
    let piece = r.created_in(Dimension::Volume)[0];
    assert_relative_eq!(k.measure(c[piece].shapes()[0]), 1.0);
    assert_eq!(live_counts(&c), [8, 12, 6, 1]);
}

// ── Glue Tests ──

fn two_separate_boxes(c: &mut Complex, k: &mut MockKernel) {
    execute_new_box(c, k, p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)).unwrap();
    execute_new_box(c, k, p(1.0, 0.0, 0.0), p(2.0, 1.0, 1.0)).unwrap();
    assert_eq!(live_counts(c), [16, 24, 12, 2]);
}

#[test]
fn glue_merges_duplicates_and_keeps_groups() {
    let mut k = MockKernel::new();
    let mut c = Complex::new();
    two_separate_boxes(&mut c, &mut k);
    let right = volume_with_min_x(&c, &k, 1.0);
    let duplicate = c
        .down(right)
        .iter()
        .copied()
        .find(|s| {
            let bb = k.bounding_box(c[*s].shapes()[0]);
            bb.max.x - bb.min.x < 1e-9 && bb.min.x.abs() > 0.5 && bb.min.x < 1.5
        })
        .unwrap();
    c.add_to_group(duplicate, "interface");

    let vols = c.cells(Dimension::Volume);
    let r = execute_glue(&mut c, &mut k, &vols).unwrap();
    assert_eq!(r.outcome.created_count(), 0);
    assert_eq!(live_counts(&c), [12, 20, 11, 2]);

    let survivor = r.successors(duplicate);
    assert_eq!(survivor.len(), 1);
    assert_eq!(c.group_members("interface"), survivor);
    assert_eq!(c.up(survivor[0]).len(), 2);
    assert!(c.audit().all_valid());
}

#[test]
fn glue_all_reaches_sewn_topology() {
    let mut k = MockKernel::new();
    let mut c = Complex::new();
    two_separate_boxes(&mut c, &mut k);
    let r = execute_glue_all(&mut c, &mut k).unwrap();
    assert_eq!(r.command, CommandKind::Glue);
    assert_eq!(r.outcome.created_count(), 0);
    assert_eq!(live_counts(&c), [12, 20, 11, 2]);
    assert!(c.audit().all_valid());
}

#[test]
fn glue_all_on_empty_complex_is_rejected() {
    let mut k = MockKernel::new();
    let mut c = Complex::new();
    let err = execute_glue_all(&mut c, &mut k).unwrap_err();
    assert!(matches!(err, EditError::InvalidInput { .. }));
}

// ── Section Tests ──

#[test]
fn section_splits_volume_and_carries_groups() {
    let mut k = MockKernel::new();
    let mut c = Complex::new();
    sewn_import(
        &mut c,
        &mut k,
        &[
            (p(0.0, 0.0, 0.0), p(2.0, 1.0, 1.0)),
            (p(0.0, 0.0, 1.0), p(2.0, 1.0, 2.0)),
        ],
    );
    let vols = c.cells(Dimension::Volume);
    let (lower, upper) = if k.bounding_box(c[vols[0]].shapes()[0]).min.z < 0.5 {
        (vols[0], vols[1])
    } else {
        (vols[1], vols[0])
    };
    c.add_to_group(lower, "base");

    let r = execute_section(&mut c, &mut k, &[lower], Axis::X, 1.0).unwrap();
    assert_eq!(r.command, CommandKind::Section);
    assert_eq!(r.successors(lower).len(), 2);
    assert_eq!(c.group_members("base"), r.successors(lower));
    assert!(c.is_live(upper));
    assert_eq!(c.down(upper).len(), 7);
    assert!(c.audit().all_valid());
}

// ── Curve Split Tests ──

#[test]
fn split_curve_at_interior_point() {
    let mut k = MockKernel::new();
    let mut c = Complex::new();
    execute_new_segment(&mut c, &mut k, p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0)).unwrap();
    let curve = c.cells(Dimension::Curve)[0];
    c.add_to_group(curve, "rail");

    let r = execute_split_curve(&mut c, &mut k, curve, p(0.5, 0.0, 0.0)).unwrap();
    assert_eq!(created_counts(&r), [1, 2, 0, 0]);
    assert_eq!(r.removed(), &[curve]);
    assert_eq!(c.group_members("rail").len(), 2);
    let mid = r.created_in(Dimension::Vertex)[0];
    assert_eq!(c.up(mid).len(), 2);
}

#[test]
fn split_curve_rejects_bad_points() {
    let mut k = MockKernel::new();
    let mut c = Complex::new();
    execute_new_segment(&mut c, &mut k, p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0)).unwrap();
    let curve = c.cells(Dimension::Curve)[0];

    for at in [p(2.0, 0.0, 0.0), p(1.0, 1.0, 0.0)] {
        let err = execute_split_curve(&mut c, &mut k, curve, at).unwrap_err();
        assert!(matches!(err, EditError::InvalidInput { .. }));
    }
    assert!(c.is_live(curve));
    assert_eq!(live_counts(&c), [2, 1, 0, 0]);

    let vertex = c.cells(Dimension::Vertex)[0];
    let err = execute_split_curve(&mut c, &mut k, vertex, p(1.0, 0.0, 0.0)).unwrap_err();
    assert!(matches!(err, EditError::InvalidInput { .. }));
}

// ── Remove Tests ──

#[test]
fn remove_takes_cells_built_on_the_input() {
    let mut c = Complex::new();
    let mut k = MockKernel::new();
    execute_new_box(&mut c, &mut k, p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)).unwrap();
    let face = c.cells(Dimension::Surface)[0];
    let vol = c.cells(Dimension::Volume)[0];

    let r = execute_remove(&mut c, &[face], false).unwrap();
    assert_eq!(r.command, CommandKind::Remove);
    assert!(r.shape.is_none());
    assert_eq!(r.removed().len(), 2);
    assert!(!c.is_live(vol));
    assert_eq!(live_counts(&c), [8, 12, 5, 0]);
    assert!(c.audit().all_valid());
}

#[test]
fn remove_with_propagation_spares_shared_boundary() {
    let mut c = Complex::new();
    let mut k = MockKernel::new();
    sewn_import(
        &mut c,
        &mut k,
        &[
            (p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)),
            (p(1.0, 0.0, 0.0), p(2.0, 1.0, 1.0)),
        ],
    );
    let left = volume_with_min_x(&c, &k, 0.0);
    let wall = shared_face(&c);

    let r = execute_remove(&mut c, &[left], true).unwrap();
    assert_eq!(r.removed().len(), 1 + 5 + 8 + 4);
    assert!(c.is_live(wall));
    assert_eq!(live_counts(&c), [8, 12, 6, 1]);
    assert!(c.audit().all_valid());
}

#[test]
fn remove_everything_below_a_lone_volume() {
    let mut c = Complex::new();
    let mut k = MockKernel::new();
    execute_new_box(&mut c, &mut k, p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)).unwrap();
    let vol = c.cells(Dimension::Volume)[0];
    execute_remove(&mut c, &[vol], true).unwrap();
    assert_eq!(live_counts(&c), [0, 0, 0, 0]);
}

// ── Failure Tests ──

#[test]
fn consistency_error_restores_the_complex() {
    let mut k = MockKernel::new();
    let mut c = Complex::new();
    execute_new_box(&mut c, &mut k, p(0.0, 0.0, 0.0), p(2.0, 1.0, 1.0)).unwrap();
    let vol = c.cells(Dimension::Volume)[0];
    let curve = c.cells(Dimension::Curve)[0];
    let stray = k.make_vertex(p(9.0, 9.0, 9.0));
    c.set_representation(curve, vec![stray]).unwrap();

    let tool = Tool::HalfSpace {
        axis: Axis::X,
        offset: 1.0,
        side: Side::Above,
    };
    let err = execute_cut(&mut c, &mut k, &[vol], &tool).unwrap_err();
    match err {
        EditError::Reconcile(e) => assert!(e.is_consistency()),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(c.is_live(vol));
    assert_eq!(c[curve].shapes(), &[stray]);
    assert_eq!(live_counts(&c), [8, 12, 6, 1]);
}
