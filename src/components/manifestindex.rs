//! Manifest position component.
//!
//! Scene objects carry the position of the manifest entry they were built
//! from. Update and draw order both follow it; failed entries leave gaps but
//! never reorder the rest.

use bevy_ecs::prelude::Component;

/// Position of an object's entry in the scene manifest. Lower draws first.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ManifestIndex(pub usize);
