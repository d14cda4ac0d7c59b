//! Positioned, sized body carried by every scene object.
//!
//! Kind-specific components ([`Sprite`](crate::components::sprite::Sprite),
//! [`BackgroundLayer`](crate::components::backgroundlayer::BackgroundLayer),
//! [`Parallax`](crate::components::parallax::Parallax)) sit beside it on the
//! same entity.

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

const DEFAULT_SIZE: f32 = 600.0;

/// Facing / movement direction of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "u")]
    Up,
    #[serde(alias = "d")]
    Down,
    #[serde(alias = "l")]
    Left,
    #[serde(alias = "r")]
    Right,
    #[default]
    #[serde(alias = "s")]
    Stationary,
}

impl Direction {
    /// Parse a full name (`"up"`) or its initial (`"u"`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "u" | "up" => Some(Self::Up),
            "d" | "down" => Some(Self::Down),
            "l" | "left" => Some(Self::Left),
            "r" | "right" => Some(Self::Right),
            "s" | "stationary" => Some(Self::Stationary),
            _ => None,
        }
    }
}

/// Metadata shared by every object kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameObjectConfig {
    /// Type identifier the object was declared with.
    pub name: String,
    pub x: f32,
    pub y: f32,
    /// Explicit width; `0` means "use `size`".
    pub width: f32,
    /// Explicit height; `0` means "use `size`".
    pub height: f32,
    pub size: f32,
    pub speed: f32,
    pub dir: Direction,
    pub collisions: bool,
}

impl Default for GameObjectConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            size: DEFAULT_SIZE,
            speed: 0.0,
            dir: Direction::Stationary,
            collisions: false,
        }
    }
}

/// Positioned, sized body common to all scene objects.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct GameObject {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub dir: Direction,
    /// Stored for game code; the engine does no collision detection.
    pub collisions: bool,
}

impl GameObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_config(GameObjectConfig {
            name: name.into(),
            ..GameObjectConfig::default()
        })
    }

    fn from_config(config: GameObjectConfig) -> Self {
        let pick = |explicit: f32| if explicit != 0.0 { explicit } else { config.size };
        Self {
            width: pick(config.width),
            height: pick(config.height),
            name: config.name,
            x: config.x,
            y: config.y,
            speed: config.speed,
            dir: config.dir,
            collisions: config.collisions,
        }
    }

    /// Build from metadata, rejecting negative sizes and speeds.
    pub fn try_from_config(config: GameObjectConfig) -> EngineResult<Self> {
        let obj = Self::from_config(config);
        if obj.width < 0.0 || obj.height < 0.0 {
            return Err(EngineError::invalid(
                &obj.name,
                format!("size must not be negative ({}x{})", obj.width, obj.height),
            ));
        }
        if obj.speed < 0.0 {
            return Err(EngineError::invalid(&obj.name, "speed must not be negative"));
        }
        Ok(obj)
    }

    /// Move one step of `speed` along a cardinal axis and face that way.
    pub fn move_towards(&mut self, dir: Direction) {
        match dir {
            Direction::Up => self.y -= self.speed,
            Direction::Down => self.y += self.speed,
            Direction::Left => self.x -= self.speed,
            Direction::Right => self.x += self.speed,
            Direction::Stationary => {}
        }
        self.dir = dir;
    }
}
