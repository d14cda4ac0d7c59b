//! Commands queued by Lua scripts.
//!
//! Scripts never touch the world directly. Each `engine.*` call pushes a
//! [`SceneCmd`] that is applied once the `update` callback has returned.

use bevy_ecs::hierarchy::ChildOf;
use bevy_ecs::prelude::*;
use log::warn;

use crate::components::animation::CycleDirection;
use crate::components::gameobject::{Direction, GameObject};
use crate::components::sprite::Sprite;
use crate::resources::frameclock::FrameClock;

/// A scene mutation requested from Lua. `object` is the type name the
/// object was declared with and targets every scene object with that name.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCmd {
    SetAnimation { object: String, animation: String },
    CycleAnimation { object: String, direction: CycleDirection },
    Move { object: String, direction: Direction },
    SetSpeed { object: String, speed: f32 },
    SetPosition { object: String, x: f32, y: f32 },
    /// Change the redraw rate of the scene.
    SetFps { fps: f64 },
}

/// Apply `commands` to the scene in `world`, in queue order.
///
/// Commands naming an unknown object, or a sprite command aimed at a plain
/// object, are logged and dropped.
pub fn apply_scene_commands(world: &mut World, commands: Vec<SceneCmd>) {
    for cmd in commands {
        match cmd {
            SceneCmd::SetFps { fps } => {
                if !(fps > 0.0) || !fps.is_finite() {
                    warn!(target: "lua", "set_fps: ignoring invalid rate {}", fps);
                    continue;
                }
                match world.get_resource_mut::<FrameClock>() {
                    Some(mut clock) => clock.fps = fps,
                    None => warn!(target: "lua", "set_fps: no scene loaded"),
                }
            }
            SceneCmd::SetAnimation { object, animation } => {
                for_each_sprite(world, &object, "set_animation", |sprite| {
                    sprite.set_animation(&animation);
                });
            }
            SceneCmd::CycleAnimation { object, direction } => {
                for_each_sprite(world, &object, "cycle_animation", |sprite| {
                    sprite.cycle_animation(direction);
                });
            }
            SceneCmd::Move { object, direction } => {
                for_each_named(world, &object, "move", |body| {
                    body.move_towards(direction);
                });
            }
            SceneCmd::SetSpeed { object, speed } => {
                if !(speed >= 0.0) || !speed.is_finite() {
                    warn!(target: "lua", "set_speed: speed must be a non-negative number ({})", speed);
                    continue;
                }
                for_each_named(world, &object, "set_speed", |body| {
                    body.speed = speed;
                });
            }
            SceneCmd::SetPosition { object, x, y } => {
                for_each_named(world, &object, "set_position", |body| {
                    body.x = x;
                    body.y = y;
                });
            }
        }
    }
}

fn for_each_named(
    world: &mut World,
    object: &str,
    command: &str,
    mut f: impl FnMut(&mut GameObject),
) {
    let mut hits = 0;
    let mut query = world.query_filtered::<&mut GameObject, Without<ChildOf>>();
    for mut body in query.iter_mut(world) {
        if body.name == object {
            f(&mut body);
            hits += 1;
        }
    }
    if hits == 0 {
        warn!(target: "lua", "{}: no object named '{}'", command, object);
    }
}

fn for_each_sprite(world: &mut World, object: &str, command: &str, mut f: impl FnMut(&mut Sprite)) {
    let mut hits = 0;
    let mut query = world.query::<(&GameObject, &mut Sprite)>();
    for (body, mut sprite) in query.iter_mut(world) {
        if body.name == object {
            f(&mut sprite);
            hits += 1;
        }
    }
    if hits == 0 {
        warn!(target: "lua", "{}: no sprite named '{}'", command, object);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::entitykind::{EntityKind, SceneObject};
    use crate::scene::{add_object, named_objects};
    use serde_json::{Value, json};

    fn make_world() -> World {
        let mut world = World::new();
        world.insert_resource(FrameClock::default());
        let Value::Object(meta) = json!({
            "name": "Hero", "image": "hero.png", "width": 16, "height": 16, "cols": 4,
            "speed": 2.0,
            "animations": [{"name": "idle", "frames": 4}, {"name": "run", "frames": 6}]
        }) else {
            unreachable!()
        };
        add_object(&mut world, EntityKind::Sprite.build(meta).unwrap());
        add_object(&mut world, SceneObject::GameObject(GameObject::new("Rock")));
        world
    }

    fn body(world: &mut World, name: &str) -> GameObject {
        let entity = named_objects(world, name)[0];
        world.get::<GameObject>(entity).unwrap().clone()
    }

    fn animation(world: &mut World, name: &str) -> Option<String> {
        let entity = named_objects(world, name)[0];
        world
            .get::<Sprite>(entity)
            .and_then(|s| s.current_animation().map(str::to_string))
    }

    #[test]
    fn sprite_commands_reach_sprites() {
        let mut world = make_world();
        apply_scene_commands(
            &mut world,
            vec![
                SceneCmd::SetAnimation { object: "Hero".into(), animation: "run".into() },
                SceneCmd::Move { object: "Hero".into(), direction: Direction::Right },
            ],
        );
        let hero = body(&mut world, "Hero");
        assert_eq!(hero.x, 2.0);
        assert_eq!(hero.dir, Direction::Right);
        assert_eq!(animation(&mut world, "Hero").as_deref(), Some("run"));

        apply_scene_commands(
            &mut world,
            vec![SceneCmd::CycleAnimation { object: "Hero".into(), direction: CycleDirection::Next }],
        );
        assert_eq!(animation(&mut world, "Hero").as_deref(), Some("idle"));
    }

    #[test]
    fn invalid_commands_are_dropped() {
        let mut world = make_world();
        apply_scene_commands(
            &mut world,
            vec![
                SceneCmd::SetAnimation { object: "Rock".into(), animation: "run".into() },
                SceneCmd::SetSpeed { object: "Rock".into(), speed: -1.0 },
                SceneCmd::SetSpeed { object: "Rock".into(), speed: f32::NAN },
                SceneCmd::SetFps { fps: 0.0 },
                SceneCmd::SetFps { fps: f64::NAN },
                SceneCmd::SetPosition { object: "Nobody".into(), x: 1.0, y: 1.0 },
            ],
        );
        assert_eq!(world.resource::<FrameClock>().fps, FrameClock::default().fps);
        assert_eq!(body(&mut world, "Rock").speed, 0.0);
    }

    #[test]
    fn set_speed_and_position() {
        let mut world = make_world();
        apply_scene_commands(
            &mut world,
            vec![
                SceneCmd::SetSpeed { object: "Rock".into(), speed: 5.0 },
                SceneCmd::SetPosition { object: "Rock".into(), x: 10.0, y: 20.0 },
                SceneCmd::Move { object: "Rock".into(), direction: Direction::Up },
                SceneCmd::SetFps { fps: 30.0 },
            ],
        );
        let rock = body(&mut world, "Rock");
        assert_eq!((rock.x, rock.y, rock.speed), (10.0, 15.0, 5.0));
        assert_eq!(world.resource::<FrameClock>().fps, 30.0);
    }
}
