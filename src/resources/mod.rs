//! Long-lived engine resources.
//!
//! Overview
//! - `canvassize` – drawing surface dimensions of the current scene
//! - `clock` – wall-clock source for the engine loop (real or manual)
//! - `engineconfig` – INI-backed engine configuration
//! - `frameclock` – per-scene frame counter and redraw throttle
//! - `lua_runtime` – Lua interpreter running the per-tick hook (feature `lua`)
//! - `manifest` – scene manifest model and where it is fetched from
//! - `registry` – type name to object type map with lazy definition loading
//! - `surface` – drawing surface abstraction and a recording implementation
pub mod canvassize;
pub mod clock;
pub mod engineconfig;
pub mod frameclock;
#[cfg(feature = "lua")]
pub mod lua_runtime;
pub mod manifest;
pub mod registry;
pub mod surface;
