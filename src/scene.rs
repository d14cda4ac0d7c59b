//! Scene setup and queries over the world.
//!
//! A scene is the set of resources and entities the engine puts into its
//! `World` when a manifest loads:
//!
//! - [`FrameClock`] and [`CanvasSize`] resources,
//! - one root entity per composed manifest entry, tagged with its
//!   [`ManifestIndex`],
//! - parallax layers as children of their parallax.
//!
//! The drawing surface stays in the world across scenes as a non-send
//! resource and is resized when a scene starts.

use bevy_ecs::hierarchy::ChildOf;
use bevy_ecs::prelude::*;
use log::debug;

use crate::components::entitykind::SceneObject;
use crate::components::gameobject::GameObject;
use crate::components::manifestindex::ManifestIndex;
use crate::resources::canvassize::CanvasSize;
use crate::resources::frameclock::FrameClock;
use crate::resources::manifest::SceneMeta;
use crate::resources::surface::Surface;
use crate::systems::render::{clear_canvas, render_objects};
use crate::systems::scroll::scroll_backgrounds;

/// Schedule run on every throttled tick: clear, update, draw.
pub fn redraw_schedule<S: Surface>() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((clear_canvas::<S>, scroll_backgrounds, render_objects::<S>).chain());
    schedule
}

/// Start an empty scene sized and clocked from manifest metadata.
///
/// `fps` and `game_speed` fall back to the given defaults. Objects of any
/// previous scene are despawned first.
pub fn begin_scene<S: Surface>(
    world: &mut World,
    meta: &SceneMeta,
    default_fps: f64,
    default_speed: f64,
) -> CanvasSize {
    clear_scene(world);

    let (w, h) = meta.dimensions();
    let fps = meta
        .fps
        .filter(|f| *f > 0.0 && f.is_finite())
        .unwrap_or(default_fps);
    let clock = FrameClock::new(fps).with_time_scale(meta.game_speed.unwrap_or(default_speed));
    let canvas = CanvasSize { w, h };

    world.insert_resource(clock);
    world.insert_resource(canvas);
    if let Some(mut surface) = world.get_non_send_resource_mut::<S>() {
        surface.resize(w, h);
    }
    canvas
}

/// Despawn every scene object. Parallax layers go with their parent.
pub fn clear_scene(world: &mut World) {
    let roots: Vec<Entity> = world
        .query_filtered::<Entity, (With<GameObject>, Without<ChildOf>)>()
        .iter(world)
        .collect();
    if !roots.is_empty() {
        debug!("Despawning {} scene object(s)", roots.len());
    }
    for entity in roots {
        world.despawn(entity);
    }
}

/// Append an object after every existing one.
pub fn add_object(world: &mut World, object: SceneObject) -> Entity {
    let next = world
        .query::<&ManifestIndex>()
        .iter(world)
        .map(|index| index.0 + 1)
        .max()
        .unwrap_or(0);
    object.spawn(world, ManifestIndex(next))
}

/// Scene objects in update and draw order.
pub fn scene_objects(world: &mut World) -> Vec<Entity> {
    let mut objects: Vec<(ManifestIndex, Entity)> = world
        .query_filtered::<(&ManifestIndex, Entity), Without<ChildOf>>()
        .iter(world)
        .map(|(index, entity)| (*index, entity))
        .collect();
    objects.sort_by_key(|(index, _)| *index);
    objects.into_iter().map(|(_, entity)| entity).collect()
}

/// Scene objects declared with type name `name`, in order.
pub fn named_objects(world: &mut World, name: &str) -> Vec<Entity> {
    scene_objects(world)
        .into_iter()
        .filter(|entity| world.get::<GameObject>(*entity).is_some_and(|body| body.name == name))
        .collect()
}
