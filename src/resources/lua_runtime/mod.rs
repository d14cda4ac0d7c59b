//! Lua scripting for the host simulation hook.
//!
//! A script defines a global `update(ctx)` that runs once per engine tick.
//! It reads the scene through `ctx` and changes it through the global
//! `engine` table:
//!
//! - [`commands`] - the [`SceneCmd`] queue and how it is applied
//! - [`runtime`] - the interpreter, the `engine` table and [`LuaUpdateHook`]
//!
//! # Example
//!
//! ```lua
//! function update(ctx)
//!     if ctx.frame % 120 == 0 then
//!         engine.cycle_animation("Hero", "next")
//!     end
//!     engine.move("Hero", "right")
//!     engine.log("frame " .. ctx.frame)
//! end
//! ```

mod commands;
mod runtime;

pub use commands::*;
pub use runtime::*;
