//! Scenario tests for the landmark-to-transform solver.

use approx::assert_relative_eq;
use hat_tryon::anchor::AnchorHandle;
use hat_tryon::landmarks::LandmarkSet;
use hat_tryon::projection::Projection;
use hat_tryon::simulate::landmark_set_from_centered;
use hat_tryon::smoothing::TransformSmoother;
use hat_tryon::solver::PoseSolver;
use nalgebra::{UnitQuaternion, Vector3};

fn make_solver(alpha: f64) -> PoseSolver {
    PoseSolver::new(
        Projection::new(60.0, 1.0, 1.0),
        TransformSmoother::new(alpha, alpha, alpha),
        1.0,
        0.25,
    )
}

/// Face-on landmarks with the eyes `eye_half` either side of center, shifted
/// as a whole by `shift`.
fn face_set(eye_half: f64, shift: Vector3<f64>) -> LandmarkSet {
    landmark_set_from_centered(
        Vector3::new(-eye_half, 0.0, 0.0) + shift,
        Vector3::new(eye_half, 0.0, 0.0) + shift,
        shift,
        Vector3::new(0.0, -0.2, 0.0) + shift,
        Vector3::new(0.0, 0.25, 0.0) + shift,
    )
}

#[test]
fn test_orientation_is_unit_quaternion() {
    let solver = make_solver(0.25);
    // A face with yaw, pitch and roll all nonzero: nothing axis-aligned.
    let set = landmark_set_from_centered(
        Vector3::new(-0.08, 0.01, 0.02),
        Vector3::new(0.09, 0.03, -0.01),
        Vector3::new(0.01, 0.0, 0.04),
        Vector3::new(0.02, -0.19, 0.01),
        Vector3::new(-0.01, 0.24, -0.02),
    );
    let target = solver.derive_target(&set).unwrap().unwrap();
    assert_relative_eq!(target.orientation.into_inner().norm(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_scale_positive_and_monotone_in_eye_distance() {
    let solver = make_solver(0.25);
    let narrow = solver
        .derive_target(&face_set(0.05, Vector3::zeros()))
        .unwrap()
        .unwrap();
    let wide = solver
        .derive_target(&face_set(0.10, Vector3::zeros()))
        .unwrap()
        .unwrap();

    assert!(narrow.scale > 0.0);
    assert!(wide.scale > narrow.scale);
}

#[test]
fn test_smoothing_idempotent_at_fixed_point() {
    let mut solver = make_solver(0.25);
    let anchor = AnchorHandle::new();
    let set = face_set(0.1, Vector3::zeros());

    solver.process(Some(&set), &anchor); // seeds
    let settled = anchor.snapshot();

    for _ in 0..5 {
        solver.process(Some(&set), &anchor);
    }
    let after = anchor.snapshot();

    assert_relative_eq!(after.position, settled.position, epsilon = 1e-12);
    assert_relative_eq!(after.scale, settled.scale, epsilon = 1e-12);
    assert_relative_eq!(
        after.orientation.angle_to(&settled.orientation),
        0.0,
        epsilon = 1e-9
    );
}

#[test]
fn test_smoothing_geometric_convergence() {
    let alpha = 0.25;
    let mut solver = make_solver(alpha);
    let anchor = AnchorHandle::new();

    let seed_set = face_set(0.05, Vector3::zeros());
    // Shifted, wider, and with a tilted face axis, so every channel has
    // ground to cover.
    let target_set = landmark_set_from_centered(
        Vector3::new(0.0, 0.05, 0.0),
        Vector3::new(0.2, 0.05, 0.0),
        Vector3::new(0.1, 0.05, 0.0),
        Vector3::new(0.15, -0.15, 0.0),
        Vector3::new(0.05, 0.30, 0.0),
    );
    let seed = solver.derive_target(&seed_set).unwrap().unwrap();
    let target = solver.derive_target(&target_set).unwrap().unwrap();

    solver.process(Some(&seed_set), &anchor);
    let steps = 4;
    for _ in 0..steps {
        solver.process(Some(&target_set), &anchor);
    }
    let state = anchor.snapshot();

    // Remaining error is (1 - alpha)^k of the initial error, per channel.
    let remaining = (1.0 - alpha).powi(steps);
    let expected_position = target.position + (seed.position - target.position) * remaining;
    let expected_scale = target.scale + (seed.scale - target.scale) * remaining;

    assert_relative_eq!(state.position, expected_position, epsilon = 1e-12);
    assert_relative_eq!(state.scale, expected_scale, epsilon = 1e-12);

    let initial_angle = seed.orientation.angle_to(&target.orientation);
    assert_relative_eq!(
        state.orientation.angle_to(&target.orientation),
        initial_angle * remaining,
        epsilon = 1e-9
    );
}

#[test]
fn test_no_face_hides_without_moving() {
    let mut solver = make_solver(0.25);
    let anchor = AnchorHandle::new();

    solver.process(Some(&face_set(0.1, Vector3::zeros())), &anchor);
    let tracked = anchor.snapshot();
    assert!(tracked.visible);

    solver.process(None, &anchor);
    let hidden = anchor.snapshot();
    assert!(!hidden.visible);
    assert_relative_eq!(hidden.position, tracked.position);
    assert_relative_eq!(hidden.scale, tracked.scale);
    assert_eq!(hidden.orientation, tracked.orientation);

    // An empty set means the same thing as no set.
    solver.process(Some(&face_set(0.1, Vector3::zeros())), &anchor);
    assert!(anchor.snapshot().visible);
    solver.process(Some(&LandmarkSet::new(Vec::new())), &anchor);
    assert!(!anchor.snapshot().visible);
}

#[test]
fn test_degenerate_eyes_keep_previous_state() {
    let mut solver = make_solver(0.25);
    let anchor = AnchorHandle::new();

    solver.process(Some(&face_set(0.1, Vector3::zeros())), &anchor);
    let before = anchor.snapshot();
    assert!(before.visible);

    // Left and right eye centers coincide exactly: corrupt data.
    let degenerate = landmark_set_from_centered(
        Vector3::new(0.02, 0.01, 0.0),
        Vector3::new(0.02, 0.01, 0.0),
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(0.0, -0.2, 0.0),
        Vector3::new(0.0, 0.25, 0.0),
    );
    solver.process(Some(&degenerate), &anchor);
    let after = anchor.snapshot();

    // Unchanged, visibility included: this was a bad frame, not a lost face.
    assert!(after.visible);
    assert_relative_eq!(after.position, before.position);
    assert_relative_eq!(after.scale, before.scale);
    assert_eq!(after.orientation, before.orientation);
}

#[test]
fn test_face_on_first_callback() {
    let mut solver = make_solver(0.25);
    let anchor = AnchorHandle::new();

    // Eyes at (-0.1, 0, 0) and (0.1, 0, 0), nose at origin, chin below,
    // forehead above; fov 60 deg, aspect 1, depth 1. First callback seeds.
    solver.process(Some(&face_set(0.1, Vector3::zeros())), &anchor);
    let state = anchor.snapshot();

    assert!(state.visible);
    assert!(state.scale > 0.0);
    assert!(state.position.y > 0.0);
    assert_relative_eq!(
        state.orientation.angle_to(&UnitQuaternion::identity()),
        0.0,
        epsilon = 1e-10
    );

    // The numbers behind the assertions: half extents are tan(30 deg), the
    // inter-eye distance 0.2 becomes 0.2 * 2 * tan(30 deg) world units, and
    // the crown sits a quarter of that above the projected forehead.
    let half = 30.0_f64.to_radians().tan();
    let expected_scale = 0.2 * 2.0 * half;
    assert_relative_eq!(state.scale, expected_scale, epsilon = 1e-12);
    assert_relative_eq!(
        state.position.y,
        0.25 * 2.0 * half + 0.25 * expected_scale,
        epsilon = 1e-12
    );
    assert_relative_eq!(state.position.x, 0.0, epsilon = 1e-12);
    assert_relative_eq!(state.position.z, 0.0, epsilon = 1e-12);
}

#[test]
fn test_two_step_blend_composes() {
    let alpha = 0.25;
    let mut solver = make_solver(alpha);
    let anchor = AnchorHandle::new();

    let set0 = face_set(0.08, Vector3::zeros());
    let set1 = face_set(0.08, Vector3::new(0.05, 0.0, 0.0));
    let set2 = face_set(0.08, Vector3::new(-0.03, 0.04, 0.0));

    let p0 = solver.derive_target(&set0).unwrap().unwrap().position;
    let t1 = solver.derive_target(&set1).unwrap().unwrap().position;
    let t2 = solver.derive_target(&set2).unwrap().unwrap().position;

    solver.process(Some(&set0), &anchor); // seed: position == p0
    solver.process(Some(&set1), &anchor);
    solver.process(Some(&set2), &anchor);

    // Two independent exponential steps, not a single blend toward t2.
    let expected = p0.lerp(&t1, alpha).lerp(&t2, alpha);
    assert_relative_eq!(anchor.snapshot().position, expected, epsilon = 1e-12);
}
