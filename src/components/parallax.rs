//! Parallax: a stack of background layers.
//!
//! The parallax entity carries a [`GameObject`] and the [`Parallax`] marker.
//! Each layer is a child entity (`ChildOf` the parallax) with its own body
//! and [`BackgroundLayer`]. Children keep insertion order, which is the
//! back-to-front draw order; there is no z-index.

use bevy_ecs::hierarchy::{ChildOf, Children};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::backgroundlayer::{BackgroundLayer, BackgroundLayerConfig};
use crate::components::gameobject::{GameObject, GameObjectConfig};
use crate::error::EngineResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallaxConfig {
    #[serde(flatten)]
    pub object: GameObjectConfig,
    /// Back-to-front.
    #[serde(default)]
    pub layers: Vec<BackgroundLayerConfig>,
}

/// Marks an entity whose children are its layers.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Parallax;

impl Parallax {
    /// Validate metadata. Returns the parallax body and its layers in order.
    pub fn try_from_config(
        config: ParallaxConfig,
    ) -> EngineResult<(GameObject, Vec<(GameObject, BackgroundLayer)>)> {
        let object = GameObject::try_from_config(config.object)?;
        let layers = config
            .layers
            .into_iter()
            .map(BackgroundLayer::try_from_config)
            .collect::<EngineResult<Vec<_>>>()?;
        Ok((object, layers))
    }

    /// Spawn a layer in front of the existing ones.
    pub fn add_layer(
        world: &mut World,
        parallax: Entity,
        body: GameObject,
        layer: BackgroundLayer,
    ) -> Entity {
        world.spawn((body, layer, ChildOf(parallax))).id()
    }

    /// Layer entities, back-to-front.
    pub fn layers(world: &World, parallax: Entity) -> Vec<Entity> {
        world
            .get::<Children>(parallax)
            .map(|children| children.iter().collect())
            .unwrap_or_default()
    }
}
