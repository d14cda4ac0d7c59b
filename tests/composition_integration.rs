//! Scene composition integration tests: type definitions on disk, metadata
//! merging and manifest order.

use kinetoscope::components::entitykind::EntityKind;
use kinetoscope::components::gameobject::GameObject;
use kinetoscope::components::parallax::Parallax;
use kinetoscope::components::sprite::Sprite;
use kinetoscope::error::EngineError;
use kinetoscope::resources::canvassize::CanvasSize;
use kinetoscope::resources::clock::ManualClock;
use kinetoscope::resources::engineconfig::EngineConfig;
use kinetoscope::resources::frameclock::FrameClock;
use kinetoscope::resources::manifest::{FileManifestSource, Manifest};
use kinetoscope::resources::registry::{DefinitionLoader, ObjectRegistry};
use kinetoscope::resources::surface::RecordingSurface;
use kinetoscope::scene::scene_objects;
use kinetoscope::systems::engine::{EngineLoop, EngineState};

const HERO: &str = r#"{
    "name": "Hero",
    "kind": "Sprite",
    "defaults": {
        "image": "hero.png",
        "width": 16,
        "height": 16,
        "cols": 4,
        "speed": 2,
        "animations": [{"name": "idle", "frames": 4}, {"name": "run", "frames": 6}],
        "curr_animation": "idle"
    }
}"#;

const HILLS: &str = r#"{
    "name": "Hills",
    "kind": "Parallax",
    "defaults": {
        "layers": [
            {"name": "far", "image": "far.png", "width": 300, "height": 100, "scroll_speed": 0.25},
            {"name": "near", "image": "near.png", "width": 300, "height": 100, "scroll_speed": 1.0}
        ]
    }
}"#;

fn fixtures() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let objects = dir.path().join("objects");
    std::fs::create_dir(&objects).unwrap();
    std::fs::write(objects.join("Hero.json"), HERO).unwrap();
    std::fs::write(objects.join("Hills.json"), HILLS).unwrap();
    std::fs::write(objects.join("Broken.json"), "{ not json").unwrap();
    std::fs::write(
        dir.path().join("scenes.json"),
        r#"{"entry": {
            "canvas_width": 320,
            "canvas_height": 200,
            "fps": 30,
            "gameObjects": [
                {"name": "Hills"},
                {"name": "Broken"},
                {"name": "Hero", "x": 40, "y": 120, "curr_animation": "run"},
                {"name": "Ghost"},
                {"name": "Hero", "x": 80, "curr_animation": "fly"},
                {"name": "Object", "size": 10}
            ]
        }}"#,
    )
    .unwrap();
    dir
}

fn load_fixtures(dir: &tempfile::TempDir) -> EngineLoop<RecordingSurface, ManualClock> {
    let mut engine = engine_for(dir);
    engine
        .load(&mut FileManifestSource::new(dir.path().join("scenes.json")))
        .unwrap();
    engine
}

fn engine_for(dir: &tempfile::TempDir) -> EngineLoop<RecordingSurface, ManualClock> {
    let registry = ObjectRegistry::new(DefinitionLoader::new(dir.path().join("objects"), "json"));
    EngineLoop::new(
        RecordingSurface::new(),
        ManualClock::new(),
        registry,
        EngineConfig::default(),
    )
}

#[test]
fn composes_scene_from_definitions_on_disk() {
    let dir = fixtures();
    let mut engine = load_fixtures(&dir);
    assert_eq!(engine.state(), EngineState::Running);

    let world = engine.world_mut();
    assert_eq!(*world.resource::<CanvasSize>(), CanvasSize { w: 320, h: 200 });
    assert_eq!(world.resource::<FrameClock>().fps, 30.0);

    let composed: Vec<(String, EntityKind)> = scene_objects(world)
        .into_iter()
        .map(|e| {
            (
                world.get::<GameObject>(e).unwrap().name.clone(),
                *world.get::<EntityKind>(e).unwrap(),
            )
        })
        .collect();
    assert_eq!(
        composed,
        vec![
            ("Hills".to_string(), EntityKind::Parallax),
            ("Hero".to_string(), EntityKind::Sprite),
            ("Hero".to_string(), EntityKind::Sprite),
            ("Object".to_string(), EntityKind::GameObject),
        ]
    );

    let hills = scene_objects(world)[0];
    let layers: Vec<String> = Parallax::layers(world, hills)
        .into_iter()
        .map(|e| world.get::<GameObject>(e).unwrap().name.clone())
        .collect();
    assert_eq!(layers, vec!["far", "near"]);

    let report = engine.composition_report().unwrap();
    assert_eq!(report.composed, 4);
    let failed: Vec<(usize, &str)> = report
        .failures
        .iter()
        .map(|f| (f.index, f.type_name.as_str()))
        .collect();
    assert_eq!(failed, vec![(1, "Broken"), (3, "Ghost")]);
    assert!(matches!(report.failures[0].error, EngineError::TypeLoad { .. }));
    assert!(matches!(report.failures[1].error, EngineError::Unregistered(_)));
}

#[test]
fn entry_metadata_overrides_definition_defaults() {
    let dir = fixtures();
    let mut engine = load_fixtures(&dir);
    let world = engine.world_mut();
    let objects = scene_objects(world);

    let runner = world.get::<GameObject>(objects[1]).unwrap();
    assert_eq!((runner.x, runner.y), (40.0, 120.0));
    assert_eq!(runner.speed, 2.0);
    let sprite = world.get::<Sprite>(objects[1]).unwrap();
    assert_eq!(sprite.current_animation(), Some("run"));

    // Unknown start animation falls back to the first declared one.
    assert_eq!(world.get::<GameObject>(objects[2]).unwrap().x, 80.0);
    let sprite = world.get::<Sprite>(objects[2]).unwrap();
    assert_eq!(sprite.current_animation(), Some("idle"));

    let object = world.get::<GameObject>(objects[3]).unwrap();
    assert_eq!((object.width, object.height), (10.0, 10.0));
    assert!(world.get::<Sprite>(objects[3]).is_none());
}

#[test]
fn sprite_animation_table_from_definition() {
    let dir = fixtures();
    let mut registry =
        ObjectRegistry::new(DefinitionLoader::new(dir.path().join("objects"), "json"));
    let hero = registry
        .instantiate("Hero", &serde_json::Map::new())
        .unwrap();
    let sprite = hero.as_sprite().unwrap();
    assert_eq!((sprite.sprite_width, sprite.sprite_height), (4.0, 8.0));

    let run = &sprite.animator().animations()[1];
    assert_eq!(run.name, "run");
    let rects: Vec<(f32, f32)> = run.frames.iter().map(|r| (r.col, r.row)).collect();
    let expected: Vec<(f32, f32)> = (0..6).map(|i| (4.0 * i as f32, 8.0)).collect();
    assert_eq!(rects, expected);
}

#[test]
fn definitions_load_once_per_name() {
    let dir = fixtures();
    let mut engine = load_fixtures(&dir);
    assert!(engine.registry().unwrap().is_registered("Hero"));

    // Removing the file does not matter once the type is registered.
    std::fs::remove_file(dir.path().join("objects").join("Hero.json")).unwrap();
    let manifest = Manifest::from_json(r#"{"entry": {"gameObjects": [{"name": "Hero"}]}}"#)
        .unwrap();
    engine.load_manifest(&manifest).unwrap();
    assert_eq!(scene_objects(engine.world_mut()).len(), 1);
    assert!(engine.composition_report().unwrap().is_complete());
}

#[test]
fn missing_manifest_file_keeps_loading() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_for(&dir);
    let result = engine.load(&mut FileManifestSource::new(dir.path().join("scenes.json")));
    assert!(matches!(result, Err(EngineError::ManifestLoad(_))));
    assert_eq!(engine.state(), EngineState::Loading);
    assert!(engine.frame_clock().is_none());
}
