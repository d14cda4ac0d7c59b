//! The closed set of object kinds and the bundles they spawn.
//!
//! Which components an object gets is decided by its [`EntityKind`] at
//! composition time. The kind's factory turns merged JSON metadata into a
//! typed config, validates it, and yields a [`SceneObject`] that is only
//! spawned once everything validated, so a bad entry never leaves a
//! half-built entity behind.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::components::backgroundlayer::{BackgroundLayer, BackgroundLayerConfig};
use crate::components::gameobject::{GameObject, GameObjectConfig};
use crate::components::manifestindex::ManifestIndex;
use crate::components::parallax::{Parallax, ParallaxConfig};
use crate::components::sprite::{Sprite, SpriteConfig};
use crate::error::{EngineError, EngineResult};

/// Built-in kinds a type name can resolve to. Also stored on each spawned
/// object so scripts can tell kinds apart.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    #[serde(alias = "Object")]
    GameObject,
    Sprite,
    BackgroundLayer,
    Parallax,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::GameObject,
        EntityKind::Sprite,
        EntityKind::BackgroundLayer,
        EntityKind::Parallax,
    ];

    /// Canonical type name the kind is registered under.
    pub fn type_name(self) -> &'static str {
        match self {
            EntityKind::GameObject => "GameObject",
            EntityKind::Sprite => "Sprite",
            EntityKind::BackgroundLayer => "BackgroundLayer",
            EntityKind::Parallax => "Parallax",
        }
    }

    /// Build an object of this kind from merged metadata.
    pub fn build(self, meta: Map<String, Value>) -> EngineResult<SceneObject> {
        let name = meta
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(self.type_name())
            .to_string();
        let value = Value::Object(meta);
        match self {
            EntityKind::GameObject => {
                let config: GameObjectConfig = parse_config(&name, value)?;
                Ok(SceneObject::GameObject(GameObject::try_from_config(config)?))
            }
            EntityKind::Sprite => {
                let config: SpriteConfig = parse_config(&name, value)?;
                let (body, sprite) = Sprite::try_from_config(config)?;
                Ok(SceneObject::Sprite(body, sprite))
            }
            EntityKind::BackgroundLayer => {
                let config: BackgroundLayerConfig = parse_config(&name, value)?;
                let (body, layer) = BackgroundLayer::try_from_config(config)?;
                Ok(SceneObject::BackgroundLayer(body, layer))
            }
            EntityKind::Parallax => {
                let config: ParallaxConfig = parse_config(&name, value)?;
                let (body, layers) = Parallax::try_from_config(config)?;
                Ok(SceneObject::Parallax(body, layers))
            }
        }
    }
}

fn parse_config<T: serde::de::DeserializeOwned>(name: &str, value: Value) -> EngineResult<T> {
    serde_json::from_value(value).map_err(|e| EngineError::invalid(name, e.to_string()))
}

/// A validated object, ready to spawn.
#[derive(Debug, Clone)]
pub enum SceneObject {
    GameObject(GameObject),
    Sprite(GameObject, Sprite),
    BackgroundLayer(GameObject, BackgroundLayer),
    /// Body plus layers, back-to-front.
    Parallax(GameObject, Vec<(GameObject, BackgroundLayer)>),
}

impl SceneObject {
    pub fn kind(&self) -> EntityKind {
        match self {
            SceneObject::GameObject(_) => EntityKind::GameObject,
            SceneObject::Sprite(..) => EntityKind::Sprite,
            SceneObject::BackgroundLayer(..) => EntityKind::BackgroundLayer,
            SceneObject::Parallax(..) => EntityKind::Parallax,
        }
    }

    pub fn body(&self) -> &GameObject {
        match self {
            SceneObject::GameObject(body)
            | SceneObject::Sprite(body, _)
            | SceneObject::BackgroundLayer(body, _)
            | SceneObject::Parallax(body, _) => body,
        }
    }

    pub fn name(&self) -> &str {
        &self.body().name
    }

    pub fn as_sprite(&self) -> Option<&Sprite> {
        match self {
            SceneObject::Sprite(_, sprite) => Some(sprite),
            _ => None,
        }
    }

    /// Spawn the object at manifest position `index`. Parallax layers become
    /// children of the parallax entity.
    pub fn spawn(self, world: &mut World, index: ManifestIndex) -> Entity {
        let kind = self.kind();
        match self {
            SceneObject::GameObject(body) => world.spawn((body, kind, index)).id(),
            SceneObject::Sprite(body, sprite) => world.spawn((body, sprite, kind, index)).id(),
            SceneObject::BackgroundLayer(body, layer) => {
                world.spawn((body, layer, kind, index)).id()
            }
            SceneObject::Parallax(body, layers) => {
                let parallax = world.spawn((body, Parallax, kind, index)).id();
                for (layer_body, layer) in layers {
                    Parallax::add_layer(world, parallax, layer_body, layer);
                }
                parallax
            }
        }
    }
}
