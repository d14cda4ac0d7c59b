//! Horizontally scrolling background image.
//!
//! The layer's [`GameObject`] gives its position and tile size. Each redraw
//! the [`scroll_backgrounds`](crate::systems::scroll::scroll_backgrounds)
//! system moves the offset left by `scroll_speed`, wrapping at the tile
//! width, and the image is drawn twice side by side so the seam never shows.

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

use crate::components::gameobject::{GameObject, GameObjectConfig};
use crate::error::{EngineError, EngineResult};
use crate::resources::surface::{ImageKey, Rect, Surface};

const DEFAULT_SCROLL_SPEED: f32 = 0.5;

fn default_scroll_speed() -> f32 {
    DEFAULT_SCROLL_SPEED
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundLayerConfig {
    #[serde(flatten)]
    pub object: GameObjectConfig,
    pub image: String,
    /// Pixels scrolled left per update.
    #[serde(default = "default_scroll_speed")]
    pub scroll_speed: f32,
}

#[derive(Component, Debug, Clone)]
pub struct BackgroundLayer {
    pub image: ImageKey,
    pub scroll_speed: f32,
    /// Current horizontal offset, always in `(-width, 0]`.
    pub offset: f32,
}

impl BackgroundLayer {
    pub fn new(image: impl AsRef<str>, scroll_speed: f32) -> Self {
        Self {
            image: ImageKey::new(image),
            scroll_speed,
            offset: 0.0,
        }
    }

    /// Validate metadata. Returns the body and the layer, to be spawned together.
    pub fn try_from_config(config: BackgroundLayerConfig) -> EngineResult<(GameObject, Self)> {
        let object = GameObject::try_from_config(config.object)?;
        if object.width <= 0.0 {
            return Err(EngineError::invalid(&object.name, "layer width must be > 0"));
        }
        if !(config.scroll_speed >= 0.0) || !config.scroll_speed.is_finite() {
            return Err(EngineError::invalid(
                &object.name,
                "scroll_speed must be a non-negative number",
            ));
        }
        let layer = Self::new(&config.image, config.scroll_speed);
        Ok((object, layer))
    }

    /// Advance one update on a tile `width` pixels wide.
    pub fn scroll(&mut self, width: f32) {
        self.offset -= self.scroll_speed;
        if self.offset <= -width {
            self.offset = self.offset.rem_euclid(width);
            if self.offset > 0.0 {
                self.offset -= width;
            }
        }
    }

    pub fn draw(&self, body: &GameObject, surface: &mut dyn Surface) {
        let src = Rect::new(0.0, 0.0, body.width, body.height);
        let x = body.x + self.offset;
        surface.draw_image(&self.image, src, Rect::new(x, body.y, body.width, body.height));
        surface.draw_image(
            &self.image,
            src,
            Rect::new(x + body.width, body.y, body.width, body.height),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::surface::RecordingSurface;

    fn layer(width: f32) -> (GameObject, BackgroundLayer) {
        BackgroundLayer::try_from_config(BackgroundLayerConfig {
            object: GameObjectConfig {
                name: "BackgroundLayer".into(),
                width,
                height: 50.0,
                ..Default::default()
            },
            image: "sky.png".into(),
            scroll_speed: DEFAULT_SCROLL_SPEED,
        })
        .unwrap()
    }

    #[test]
    fn offset_wraps_by_width() {
        let (body, mut bg) = layer(10.0);
        for n in 1..=200u32 {
            bg.scroll(body.width);
            let expected = -((0.5 * n as f32) % 10.0);
            assert!((bg.offset - expected).abs() < 1e-4, "n={n} got {}", bg.offset);
            assert!(bg.offset <= 0.0 && bg.offset > -10.0);
        }
    }

    #[test]
    fn wraps_when_speed_does_not_divide_width() {
        let (body, mut bg) = layer(10.0);
        bg.scroll_speed = 3.0;
        for _ in 0..4 {
            bg.scroll(body.width);
        }
        // 12 px scrolled on a 10 px layer
        assert!((bg.offset + 2.0).abs() < 1e-4);
    }

    #[test]
    fn draws_two_tiles() {
        let (body, mut bg) = layer(10.0);
        bg.scroll(body.width);
        let mut surface = RecordingSurface::new();
        bg.draw(&body, &mut surface);
        let dsts: Vec<Rect> = surface.image_draws().map(|(_, _, dst)| dst).collect();
        assert_eq!(dsts, vec![
            Rect::new(-0.5, 0.0, 10.0, 50.0),
            Rect::new(9.5, 0.0, 10.0, 50.0),
        ]);
    }

    #[test]
    fn zero_width_is_rejected() {
        let err = BackgroundLayer::try_from_config(BackgroundLayerConfig {
            object: GameObjectConfig {
                name: "BackgroundLayer".into(),
                size: 0.0,
                ..Default::default()
            },
            image: "sky.png".into(),
            scroll_speed: 0.5,
        });
        assert!(err.is_err());
    }
}
