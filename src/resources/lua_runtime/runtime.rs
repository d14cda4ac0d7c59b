//! Lua runtime core implementation.
//!
//! `LuaRuntime` owns the interpreter and the global `engine` table. Script
//! calls only queue [`SceneCmd`]s; [`LuaUpdateHook`] drains and applies them
//! to the world after each `update(ctx)` call.

use super::commands::*;
use crate::components::animation::CycleDirection;
use crate::components::entitykind::EntityKind;
use crate::components::gameobject::{Direction, GameObject};
use crate::components::sprite::Sprite;
use crate::error::EngineResult;
use crate::resources::canvassize::CanvasSize;
use crate::resources::frameclock::FrameClock;
use crate::scene::scene_objects;
use crate::systems::engine::UpdateHook;
use bevy_ecs::prelude::*;
use mlua::prelude::*;
use std::cell::RefCell;
use std::path::Path;

use log::{error, info, warn};

/// Shared state reachable from the `engine.*` closures through Lua's app data.
struct LuaAppData {
    scene_commands: RefCell<Vec<SceneCmd>>,
}

/// Resource holding the Lua interpreter state.
///
/// The Lua state is not thread-safe; keep the runtime on the loop's thread.
pub struct LuaRuntime {
    lua: Lua,
}

/// Registers a Lua function that pushes a command to the scene queue.
macro_rules! register_cmd {
    ($engine:expr, $lua:expr, $name:expr, |$args:pat_param| $arg_ty:ty, $cmd:expr) => {
        $engine.set(
            $name,
            $lua.create_function(|lua, $args: $arg_ty| {
                let cmd = $cmd;
                lua.app_data_ref::<LuaAppData>()
                    .ok_or_else(|| LuaError::runtime("LuaAppData not found"))?
                    .scene_commands
                    .borrow_mut()
                    .push(cmd);
                Ok(())
            })?,
        )?;
    };
}

fn parse_direction(s: &str) -> LuaResult<Direction> {
    Direction::parse(s).ok_or_else(|| LuaError::runtime(format!("unknown direction '{}'", s)))
}

fn parse_cycle(s: &str) -> LuaResult<CycleDirection> {
    CycleDirection::parse(s)
        .ok_or_else(|| LuaError::runtime(format!("unknown cycle direction '{}'", s)))
}

impl LuaRuntime {
    /// Creates a new Lua runtime and registers the `engine` table.
    ///
    /// # Errors
    ///
    /// Returns an error if Lua initialization or API registration fails.
    pub fn new() -> LuaResult<Self> {
        let lua = Lua::new();

        lua.load(r#"package.path = "./assets/scripts/?.lua;./assets/scripts/?/init.lua;" .. package.path"#)
            .exec()?;

        lua.set_app_data(LuaAppData {
            scene_commands: RefCell::new(Vec::new()),
        });

        let runtime = Self { lua };
        runtime.register_base_api()?;
        runtime.register_scene_api()?;
        Ok(runtime)
    }

    /// Registers the `engine` table and its logging functions.
    fn register_base_api(&self) -> LuaResult<()> {
        let engine = self.lua.create_table()?;

        // engine.log(message)
        engine.set(
            "log",
            self.lua.create_function(|_, msg: String| {
                info!(target: "lua", "{}", msg);
                Ok(())
            })?,
        )?;

        engine.set(
            "log_info",
            self.lua.create_function(|_, msg: String| {
                info!(target: "lua", "{}", msg);
                Ok(())
            })?,
        )?;

        engine.set(
            "log_warn",
            self.lua.create_function(|_, msg: String| {
                warn!(target: "lua", "{}", msg);
                Ok(())
            })?,
        )?;

        engine.set(
            "log_error",
            self.lua.create_function(|_, msg: String| {
                error!(target: "lua", "{}", msg);
                Ok(())
            })?,
        )?;

        self.lua.globals().set("engine", engine)?;
        Ok(())
    }

    /// Registers the scene commands in the `engine` table.
    fn register_scene_api(&self) -> LuaResult<()> {
        let engine: LuaTable = self.lua.globals().get("engine")?;
        register_cmd!(engine, self.lua, "set_animation",
            |(object, animation)| (String, String), SceneCmd::SetAnimation { object, animation });
        register_cmd!(engine, self.lua, "cycle_animation",
            |(object, direction)| (String, Option<String>),
            SceneCmd::CycleAnimation {
                object,
                direction: match direction {
                    Some(d) => parse_cycle(&d)?,
                    None => CycleDirection::Next,
                },
            });
        register_cmd!(engine, self.lua, "move",
            |(object, direction)| (String, String),
            SceneCmd::Move { object, direction: parse_direction(&direction)? });
        register_cmd!(engine, self.lua, "set_speed",
            |(object, speed)| (String, f32), SceneCmd::SetSpeed { object, speed });
        register_cmd!(engine, self.lua, "set_position",
            |(object, x, y)| (String, f32, f32), SceneCmd::SetPosition { object, x, y });
        register_cmd!(engine, self.lua, "set_fps", |fps| f64, SceneCmd::SetFps { fps });
        Ok(())
    }

    /// Drains all queued scene commands.
    pub fn drain_scene_commands(&self) -> Vec<SceneCmd> {
        self.lua
            .app_data_ref::<LuaAppData>()
            .map(|data| data.scene_commands.borrow_mut().drain(..).collect())
            .unwrap_or_default()
    }

    /// Loads and executes a Lua script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the script has syntax/runtime errors.
    pub fn run_script(&self, path: impl AsRef<Path>) -> LuaResult<()> {
        let path = path.as_ref();
        let script = std::fs::read_to_string(path)
            .map_err(|e| LuaError::ExternalError(std::sync::Arc::new(e)))?;
        self.lua
            .load(&script)
            .set_name(path.display().to_string())
            .exec()
    }

    /// Executes a chunk of Lua source.
    pub fn run_source(&self, name: &str, source: &str) -> LuaResult<()> {
        self.lua.load(source).set_name(name).exec()
    }

    /// Checks if a global function exists.
    pub fn has_function(&self, name: &str) -> bool {
        self.lua.globals().get::<LuaFunction>(name).is_ok()
    }

    /// Builds the `ctx` table passed to `update`.
    ///
    /// ```lua
    /// ctx = { timestamp, frame, elapsed, width, height,
    ///         objects = { { name, kind, x, y, width, height, speed, dir, animation }, ... } }
    /// ```
    fn build_ctx(&self, timestamp: f64, world: &mut World) -> LuaResult<LuaTable> {
        let ctx = self.lua.create_table()?;
        ctx.set("timestamp", timestamp)?;
        if let Some(clock) = world.get_resource::<FrameClock>() {
            ctx.set("frame", clock.frame)?;
            ctx.set("elapsed", clock.elapsed)?;
        }
        if let Some(canvas) = world.get_resource::<CanvasSize>() {
            ctx.set("width", canvas.w)?;
            ctx.set("height", canvas.h)?;
        }

        let objects = self.lua.create_table()?;
        for (i, entity) in scene_objects(world).into_iter().enumerate() {
            let Some(body) = world.get::<GameObject>(entity) else {
                continue;
            };
            let entry = self.lua.create_table()?;
            entry.set("name", body.name.as_str())?;
            if let Some(kind) = world.get::<EntityKind>(entity) {
                entry.set("kind", kind.type_name())?;
            }
            entry.set("x", body.x)?;
            entry.set("y", body.y)?;
            entry.set("width", body.width)?;
            entry.set("height", body.height)?;
            entry.set("speed", body.speed)?;
            entry.set("dir", format!("{:?}", body.dir).to_lowercase())?;
            if let Some(animation) = world
                .get::<Sprite>(entity)
                .and_then(|sprite| sprite.current_animation())
            {
                entry.set("animation", animation)?;
            }
            objects.set(i + 1, entry)?;
        }
        ctx.set("objects", objects)?;
        Ok(ctx)
    }

    /// Calls the script's global `update(ctx)`, if it defines one.
    ///
    /// # Errors
    ///
    /// Returns an error if building the context or the callback fails.
    pub fn call_update(&self, timestamp: f64, world: &mut World) -> LuaResult<()> {
        let Ok(update) = self.lua.globals().get::<LuaFunction>("update") else {
            return Ok(());
        };
        let ctx = self.build_ctx(timestamp, world)?;
        update.call::<()>(ctx)
    }

    /// Returns a reference to the underlying Lua state.
    pub fn lua(&self) -> &Lua {
        &self.lua
    }
}

/// Runs a Lua script's `update(ctx)` as the engine's per-tick hook.
pub struct LuaUpdateHook {
    runtime: LuaRuntime,
}

impl LuaUpdateHook {
    pub fn new(runtime: LuaRuntime) -> Self {
        if !runtime.has_function("update") {
            warn!("Lua script defines no update(ctx) function");
        }
        Self { runtime }
    }

    /// Create a runtime and run the script at `path` in it.
    pub fn from_script(path: impl AsRef<Path>) -> EngineResult<Self> {
        let runtime = LuaRuntime::new()?;
        runtime.run_script(&path)?;
        info!("Loaded Lua script {}", path.as_ref().display());
        Ok(Self::new(runtime))
    }

    pub fn runtime(&self) -> &LuaRuntime {
        &self.runtime
    }
}

impl UpdateHook for LuaUpdateHook {
    fn update(&mut self, timestamp: f64, world: &mut World) {
        if let Err(e) = self.runtime.call_update(timestamp, world) {
            error!(target: "lua", "update() failed: {}", e);
        }
        // Commands queued before an error still apply.
        let commands = self.runtime.drain_scene_commands();
        if !commands.is_empty() {
            apply_scene_commands(world, commands);
        }
    }
}
