//! Canvas size resource.
//!
//! Dimensions of the current scene's drawing surface in pixels, resolved
//! from the manifest when the scene loads.

use bevy_ecs::prelude::Resource;

#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasSize {
    pub w: u32,
    pub h: u32,
}
