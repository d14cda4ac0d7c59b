//! Kinetoscope engine library.
//!
//! A minimal 2D scene engine: a manifest declares a scene and its objects,
//! object types resolve through a registry, and a frame loop updates and
//! draws the objects onto a [`resources::surface::Surface`] at a throttled
//! rate.
//!
//! Exposed as a library for the binary and for integration tests.

pub mod components;
pub mod error;
pub mod resources;
pub mod scene;
pub mod systems;
