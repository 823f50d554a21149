use std::f64::consts::FRAC_PI_2;

use approx::assert_relative_eq;
use stagecraft::{
    Config, Interpolation, ObjectId, ObjectKind, OverlapPolicy, Stage, StageError, StaggerEntry,
    Transform, Value,
};

fn stage_with(cfg: Config) -> (Stage, ObjectId) {
    let mut stage = Stage::new(cfg);
    stage
        .register_kind(ObjectKind::new("lamp").with_property("brightness", 0.0))
        .unwrap();
    let lamp = stage.spawn("lamp").unwrap();
    (stage, lamp)
}

fn x_at(stage: &Stage, id: ObjectId, t: f64) -> f64 {
    stage.state_of(id, t).unwrap().position()[0]
}

/// it should let the animation with the later start win on overlapping windows
#[test]
fn later_start_wins_on_overlap() {
    let (mut stage, lamp) = stage_with(Config::default());
    stage
        .play_staggered([
            StaggerEntry::new(0.0, 1.0, [stage.animate(lamp).shift([10.0, 0.0, 0.0])]),
            StaggerEntry::new(0.5, 1.0, [stage.animate(lamp).move_to([-10.0, 0.0, 0.0])]),
        ])
        .unwrap();

    // before the second starts, the first governs
    assert_relative_eq!(x_at(&stage, lamp, 0.25), 2.5, epsilon = 1e-9);
    // afterwards the second governs, departing from the first's end value
    assert_relative_eq!(x_at(&stage, lamp, 0.75), 5.0, epsilon = 1e-9);
    assert_relative_eq!(x_at(&stage, lamp, 1.5), -10.0, epsilon = 1e-9);
}

/// it should resolve equal start times in favor of the animation appended last
#[test]
fn equal_starts_go_to_the_last_appended() {
    let (mut stage, lamp) = stage_with(Config::default());
    stage
        .play_staggered([
            StaggerEntry::new(0.0, 1.0, [stage.animate(lamp).customize("brightness", 4.0)]),
            StaggerEntry::new(0.0, 1.0, [stage.animate(lamp).customize("brightness", 2.0)]),
        ])
        .unwrap();
    // second write departs from the first's pending end value (4.0)
    assert_eq!(
        stage.value_of(lamp, "brightness", 0.5).unwrap(),
        Value::Scalar(3.0)
    );
    assert_eq!(
        stage.value_of(lamp, "brightness", 1.0).unwrap(),
        Value::Scalar(2.0)
    );
}

/// it should reject overlapping writes under the strict policy and commit nothing
#[test]
fn reject_policy_turns_overlap_into_an_error() {
    let cfg = Config {
        overlap_policy: OverlapPolicy::Reject,
        ..Config::default()
    };
    let (mut stage, lamp) = stage_with(cfg);
    let err = stage
        .play_staggered([
            StaggerEntry::new(0.0, 1.0, [stage.animate(lamp).shift([10.0, 0.0, 0.0])]),
            StaggerEntry::new(0.5, 1.0, [stage.animate(lamp).shift([1.0, 0.0, 0.0])]),
        ])
        .unwrap_err();
    assert!(matches!(err, StageError::OverlappingWrite { .. }));
    assert_eq!(stage.clock(), 0.0);
    assert!(stage.timeline().is_empty());

    // back-to-back windows are fine
    stage.play([stage.animate(lamp).shift([1.0, 0.0, 0.0])], 1.0).unwrap();
    stage.play([stage.animate(lamp).shift([1.0, 0.0, 0.0])], 1.0).unwrap();
    assert_relative_eq!(x_at(&stage, lamp, 2.0), 2.0, epsilon = 1e-9);
}

/// it should fall back to construction-time values before any animation
#[test]
fn base_values_before_first_animation() {
    let (mut stage, lamp) = stage_with(Config::default());
    stage.wait(1.0).unwrap();
    stage
        .play([stage.animate(lamp).customize("brightness", 1.0)], 1.0)
        .unwrap();
    let early = stage.state_of(lamp, 0.5).unwrap();
    assert_eq!(early.get("brightness"), Some(&Value::Scalar(0.0)));
    assert_eq!(early.get("visible"), Some(&Value::Bool(true)));
    assert_eq!(early.transform(), Transform::IDENTITY);
    assert_eq!(early.values.len(), 5);
}

/// it should sample the same state no matter how often or in what order it is asked
#[test]
fn sampling_is_idempotent() {
    let (mut stage, lamp) = stage_with(Config::default());
    stage.play([stage.animate(lamp).shift([1.0, 2.0, 3.0])], 2.0).unwrap();
    let later = stage.state_of(lamp, 1.7).unwrap();
    let earlier = stage.state_of(lamp, 0.3).unwrap();
    assert_eq!(stage.state_of(lamp, 1.7).unwrap(), later);
    assert_eq!(stage.state_of(lamp, 0.3).unwrap(), earlier);
    assert_eq!(stage.timeline().len(), 1);
}

/// it should accumulate rotations and interpolate along the shortest arc
#[test]
fn rotations_compose_and_slerp() {
    let (mut stage, lamp) = stage_with(Config::default());
    stage.play([stage.animate(lamp).rotate_euler(0.0, 0.0, FRAC_PI_2)], 1.0).unwrap();
    stage.play([stage.animate(lamp).rotate_euler(0.0, 0.0, FRAC_PI_2)], 1.0).unwrap();

    let end = stage.state_of(lamp, 2.0).unwrap().transform();
    let p = end.transform_point([1.0, 0.0, 0.0]);
    assert_relative_eq!(p[0], -1.0, epsilon = 1e-9);
    assert_relative_eq!(p[1], 0.0, epsilon = 1e-9);

    let mid = stage.state_of(lamp, 1.5).unwrap().transform();
    let p = mid.transform_point([1.0, 0.0, 0.0]);
    let c = (3.0 * std::f64::consts::FRAC_PI_4).cos();
    let s = (3.0 * std::f64::consts::FRAC_PI_4).sin();
    assert_relative_eq!(p[0], c, epsilon = 1e-9);
    assert_relative_eq!(p[1], s, epsilon = 1e-9);
}

/// it should apply easing and step interpolation per builder
#[test]
fn interpolation_kinds_shape_the_window() {
    let (mut stage, lamp) = stage_with(Config::default());
    stage
        .play(
            [stage
                .animate(lamp)
                .customize("brightness", 1.0)
                .with_interpolation(Interpolation::Step)],
            1.0,
        )
        .unwrap();
    stage
        .play(
            [stage
                .animate(lamp)
                .shift([1.0, 0.0, 0.0])
                .with_interpolation(Interpolation::Smooth)],
            1.0,
        )
        .unwrap();

    assert_eq!(
        stage.value_of(lamp, "brightness", 0.99).unwrap(),
        Value::Scalar(0.0)
    );
    assert_eq!(
        stage.value_of(lamp, "brightness", 1.0).unwrap(),
        Value::Scalar(1.0)
    );
    // symmetric ease-in-out passes through the midpoint, slower near the ends
    assert_relative_eq!(x_at(&stage, lamp, 1.5), 0.5, epsilon = 1e-6);
    assert!(x_at(&stage, lamp, 1.1) < 0.1);
}

/// it should reject writes whose type differs from the property's tag
#[test]
fn type_tags_are_enforced() {
    let (mut stage, lamp) = stage_with(Config::default());
    let err = stage
        .play([stage.animate(lamp).customize("brightness", true)], 1.0)
        .unwrap_err();
    assert!(matches!(err, StageError::TypeMismatch { .. }));
    let err = stage
        .play([stage.animate(lamp).customize("glow", 1.0)], 1.0)
        .unwrap_err();
    assert!(matches!(err, StageError::UnknownProperty { .. }));
}
