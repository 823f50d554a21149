use approx::assert_relative_eq;
use stagecraft::{
    bake, export_baked_json, BakeConfig, Grid, MarkerSet, ObjectKind, Stage, StageError,
    StaggerEntry, Value,
};

fn playground_marks() -> MarkerSet {
    stagecraft_test_fixtures::marks::load("playground").expect("marker fixture")
}

/// it should look markers up by exact name and report misses
#[test]
fn markers_from_fixture() {
    let stage = Stage::default().with_marks(playground_marks());
    let ramp = stage.mark("ramp_top").unwrap();
    assert_eq!(ramp.location, [-6.0, 3.0, 0.0]);
    assert_eq!(stage.mark("landing").unwrap().scale, [2.0, 2.0, 2.0]);
    assert_eq!(stage.mark("seesaw").unwrap().rotation, [0.0, 0.0, 0.0, 1.0]);
    assert!(matches!(
        stage.mark("Ramp_Top"),
        Err(StageError::UnknownMark { .. })
    ));

    let launch: MarkerSet = stagecraft_test_fixtures::marks::load("launch").unwrap();
    let stage = Stage::default().with_marks(launch);
    assert!(stage.mark("Launch").is_ok());
    assert!(stage.mark("launch").is_err());
}

/// it should move objects onto markers with move_to
#[test]
fn move_to_marker() {
    let mut stage = Stage::default().with_marks(playground_marks());
    stage.register_kind(ObjectKind::new("ball")).unwrap();
    let ball = stage.spawn("ball").unwrap();
    let target = stage.mark("ramp_top").unwrap();
    stage
        .play(
            [stage
                .animate(ball)
                .move_to(target.location)
                .set_rotation(target.rotation)],
            1.0,
        )
        .unwrap();
    let world = stage.resolve_world_transform(ball, 1.0).unwrap();
    let expected = target.transform();
    for i in 0..3 {
        assert_relative_eq!(world.position[i], expected.position[i], epsilon = 1e-12);
    }
    for i in 0..4 {
        assert_relative_eq!(world.rotation[i], expected.rotation[i], epsilon = 1e-9);
    }
}

/// it should lay objects out on a grid and stagger them in x-major order
#[test]
fn grid_layout_with_stagger() {
    let grid = Grid::new([0.0, 0.0, 0.0], [4.0, 0.0, 2.0], 3, 1, 2).unwrap();
    assert_eq!(grid.points().len(), 6);

    let mut stage = Stage::default();
    stage.register_kind(ObjectKind::new("ball")).unwrap();
    let mut balls = Vec::new();
    for p in grid.points() {
        balls.push(
            stage
                .create_object("ball", [("position", Value::Vec3(p))])
                .unwrap(),
        );
    }
    assert_eq!(
        stage.state_of(balls[1], 0.0).unwrap().position(),
        [0.0, 0.0, 2.0]
    );
    assert_eq!(
        stage.state_of(balls[2], 0.0).unwrap().position(),
        [2.0, 0.0, 0.0]
    );

    let entries: Vec<StaggerEntry> = balls
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            StaggerEntry::new(0.1 * i as f64, 0.5, [stage.animate(b).shift([0.0, 1.0, 0.0])])
        })
        .collect();
    stage.play_staggered(entries).unwrap();
    assert_relative_eq!(stage.clock(), 1.0, epsilon = 1e-12);
    assert_eq!(
        stage.state_of(balls[5], 1.0).unwrap().position(),
        [4.0, 1.0, 2.0]
    );
}

/// it should bake every live object at the configured frame rate
#[test]
fn bake_samples_frames_inclusively() {
    let mut stage = Stage::default();
    stage.register_kind(ObjectKind::new("ball")).unwrap();
    let a = stage.spawn("ball").unwrap();
    let b = stage.spawn("ball").unwrap();
    stage.play([stage.animate(a).shift([1.0, 0.0, 0.0])], 1.0).unwrap();
    stage.remove_object(b).unwrap();

    let baked = bake(
        &stage,
        &BakeConfig {
            frame_rate: Some(4.0),
            ..BakeConfig::default()
        },
    )
    .unwrap();
    assert_eq!(baked.frame_count, 5);
    assert_eq!(baked.end_time, 1.0);
    assert_eq!(baked.objects.len(), 1);

    let obj = &baked.objects[0];
    assert_eq!(obj.id, a);
    assert_eq!(obj.kind, "ball");
    let position = obj
        .tracks
        .iter()
        .find(|t| t.property == "position")
        .expect("position track");
    assert_eq!(position.values.len(), 5);
    assert_eq!(position.values[2], Value::vec3(0.5, 0.0, 0.0));
    assert_relative_eq!(obj.world[4].position[0], 1.0);

    let json = export_baked_json(&baked).unwrap();
    assert_eq!(json["frame_count"], 5);
    assert_eq!(json["objects"][0]["tracks"][0]["property"], "position");
}

/// it should fall back to the stage defaults for a partial bake config
#[test]
fn bake_config_defaults() {
    let cfg: BakeConfig = serde_json::from_str(r#"{ "end_time": 0.5 }"#).unwrap();
    let mut stage = Stage::default();
    stage.register_kind(ObjectKind::new("ball")).unwrap();
    stage.spawn("ball").unwrap();
    let baked = bake(&stage, &cfg).unwrap();
    assert_eq!(baked.frame_rate, 24.0);
    assert_eq!(baked.frame_count, 13);
}
