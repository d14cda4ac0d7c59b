//! Sheet sprite component.
//!
//! Lives beside a [`GameObject`] whose `width`/`height` describe the whole
//! sheet. Drawn by [`render_objects`](crate::systems::render::render_objects)
//! at the scene's frame counter.

use bevy_ecs::prelude::Component;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::components::animation::{
    AnimationDef, CycleDirection, FrameRect, SpriteAnimator, build_animation_table,
    is_valid_speed,
};
use crate::components::gameobject::{GameObject, GameObjectConfig};
use crate::error::{EngineError, EngineResult};
use crate::resources::surface::{ImageKey, Rect, Surface};

const DEFAULT_BASE_ANIMATION_SPEED: f64 = 5.0;

fn default_base_animation_speed() -> f64 {
    DEFAULT_BASE_ANIMATION_SPEED
}

fn default_cols() -> u32 {
    1
}

/// Sprite metadata. `width`/`height` describe the whole sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteConfig {
    #[serde(flatten)]
    pub object: GameObjectConfig,
    pub image: String,
    #[serde(default = "default_cols")]
    pub cols: u32,
    /// Sheet rows; defaults to one row per animation.
    #[serde(default)]
    pub rows: Option<u32>,
    #[serde(default)]
    pub dx: f32,
    #[serde(default)]
    pub dy: f32,
    #[serde(default)]
    pub dw: Option<f32>,
    #[serde(default)]
    pub dh: Option<f32>,
    #[serde(default = "default_base_animation_speed")]
    pub base_animation_speed: f64,
    pub animations: Vec<AnimationDef>,
    #[serde(default)]
    pub curr_animation: Option<String>,
}

/// Animated sprite drawn from a sheet of equally sized cells.
#[derive(Component, Debug, Clone)]
pub struct Sprite {
    pub image: ImageKey,
    pub sprite_width: f32,
    pub sprite_height: f32,
    pub dx: f32,
    pub dy: f32,
    pub dw: f32,
    pub dh: f32,
    animator: SpriteAnimator,
}

impl Sprite {
    /// Validate metadata, derive the animation table and select the start animation.
    ///
    /// The start animation is `curr_animation` when it names a declared
    /// animation, otherwise the first one, so a sprite never renders unset.
    /// Returns the body and the sprite, to be spawned together.
    pub fn try_from_config(config: SpriteConfig) -> EngineResult<(GameObject, Self)> {
        let object = GameObject::try_from_config(config.object)?;
        let name = object.name.clone();

        if config.animations.is_empty() {
            return Err(EngineError::invalid(&name, "sprite declares no animations"));
        }
        if let Some(bad) = config.animations.iter().find(|a| a.frames == 0) {
            return Err(EngineError::invalid(
                &name,
                format!("animation '{}' has zero frames", bad.name),
            ));
        }
        if let Some(bad) = config
            .animations
            .iter()
            .find(|a| a.speed.is_some_and(|s| !is_valid_speed(s)))
        {
            return Err(EngineError::invalid(
                &name,
                format!("animation '{}' speed must be a positive number", bad.name),
            ));
        }
        if !is_valid_speed(config.base_animation_speed) {
            return Err(EngineError::invalid(
                &name,
                "base_animation_speed must be a positive number",
            ));
        }
        let rows = config.rows.unwrap_or(config.animations.len() as u32);
        if config.cols == 0 || rows == 0 {
            return Err(EngineError::invalid(&name, "cols and rows must be >= 1"));
        }

        let sprite_width = (object.width / config.cols as f32).ceil();
        let sprite_height = (object.height / rows as f32).ceil();
        let table = build_animation_table(&config.animations, sprite_width, sprite_height);
        let mut animator = SpriteAnimator::new(table, config.base_animation_speed);

        let start = match config.curr_animation {
            Some(wanted) if animator.animation_list().contains(&wanted) => wanted,
            other => {
                let first = animator.animation_list()[0].clone();
                if let Some(wanted) = other {
                    warn!(
                        "Sprite '{}': start animation '{}' unknown, using '{}'",
                        name, wanted, first
                    );
                }
                first
            }
        };
        animator.set_animation(&start);

        let sprite = Self {
            image: ImageKey::new(&config.image),
            sprite_width,
            sprite_height,
            dx: config.dx,
            dy: config.dy,
            dw: config.dw.unwrap_or(sprite_width),
            dh: config.dh.unwrap_or(sprite_height),
            animator,
        };
        Ok((object, sprite))
    }

    pub fn animator(&self) -> &SpriteAnimator {
        &self.animator
    }

    pub fn animation_list(&self) -> &[String] {
        self.animator.animation_list()
    }

    pub fn set_animation(&mut self, name: &str) -> bool {
        self.animator.set_animation(name)
    }

    pub fn cycle_animation(&mut self, direction: CycleDirection) {
        self.animator.cycle_animation(direction);
    }

    pub fn current_animation(&self) -> Option<&str> {
        self.animator.current_name()
    }

    /// Source and destination rectangles for the frame shown at `scene_frame`.
    fn frame_rects(&self, scene_frame: u64) -> Option<(Rect, Rect)> {
        let FrameRect { col, row } = self.animator.current_rect(scene_frame)?;
        let src = Rect::new(col, row, self.sprite_width, self.sprite_height);
        let dst = Rect::new(self.dx, self.dy, self.dw, self.dh);
        Some((src, dst))
    }

    /// Blit the current cell to the destination rectangle.
    pub fn draw(&self, scene_frame: u64, surface: &mut dyn Surface) {
        if let Some((src, dst)) = self.frame_rects(scene_frame) {
            surface.draw_image(&self.image, src, dst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::surface::RecordingSurface;

    fn config() -> SpriteConfig {
        SpriteConfig {
            object: GameObjectConfig {
                name: "Hero".into(),
                width: 16.0,
                height: 16.0,
                ..Default::default()
            },
            image: "hero.png".into(),
            cols: 4,
            rows: None,
            dx: 10.0,
            dy: 20.0,
            dw: None,
            dh: None,
            base_animation_speed: 5.0,
            animations: vec![AnimationDef::new("idle", 4), AnimationDef::new("run", 6)],
            curr_animation: Some("run".into()),
        }
    }

    fn sprite(config: SpriteConfig) -> Sprite {
        Sprite::try_from_config(config).unwrap().1
    }

    #[test]
    fn derives_cells_from_sheet_size() {
        let (body, sprite) = Sprite::try_from_config(config()).unwrap();
        assert_eq!(body.name, "Hero");
        assert_eq!(sprite.sprite_width, 4.0);
        assert_eq!(sprite.sprite_height, 8.0);
        assert_eq!((sprite.dw, sprite.dh), (4.0, 8.0));

        let run = &sprite.animator().animations()[1];
        assert_eq!(run.frames.len(), 6);
        for (i, rect) in run.frames.iter().enumerate() {
            assert_eq!(rect.col, 4.0 * i as f32);
            assert_eq!(rect.row, sprite.sprite_height);
        }
    }

    #[test]
    fn start_animation_falls_back_to_first() {
        let mut cfg = config();
        cfg.curr_animation = None;
        assert_eq!(sprite(cfg).current_animation(), Some("idle"));

        let mut cfg = config();
        cfg.curr_animation = Some("fly".into());
        assert_eq!(sprite(cfg).current_animation(), Some("idle"));
    }

    #[test]
    fn draws_current_frame_to_destination() {
        let sprite = sprite(config());
        let mut surface = RecordingSurface::new();

        // run: base speed 5, so frame 12 shows cell 2
        sprite.draw(12, &mut surface);

        let (image, src, dst) = surface.image_draws().next().unwrap();
        assert_eq!(image.as_str(), "hero.png");
        assert_eq!(src, Rect::new(8.0, 8.0, 4.0, 8.0));
        assert_eq!(dst, Rect::new(10.0, 20.0, 4.0, 8.0));
    }

    #[test]
    fn accepts_fractional_speeds() {
        let mut cfg = config();
        cfg.animations[1].speed = Some(2.5);
        cfg.base_animation_speed = 0.5;
        let sprite = sprite(cfg);
        let mut surface = RecordingSurface::new();

        // run at 2.5: frame 8 shows cell floor(3.2) = 3
        sprite.draw(8, &mut surface);
        let (_, src, _) = surface.image_draws().next().unwrap();
        assert_eq!(src, Rect::new(12.0, 8.0, 4.0, 8.0));
    }

    #[test]
    fn rejects_degenerate_sheets() {
        let mut cfg = config();
        cfg.animations.clear();
        assert!(Sprite::try_from_config(cfg).is_err());

        let mut cfg = config();
        cfg.animations.push(AnimationDef::new("empty", 0));
        assert!(Sprite::try_from_config(cfg).is_err());

        let mut cfg = config();
        cfg.cols = 0;
        assert!(Sprite::try_from_config(cfg).is_err());

        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut cfg = config();
            cfg.animations[0].speed = Some(bad);
            assert!(Sprite::try_from_config(cfg).is_err(), "speed {bad}");

            let mut cfg = config();
            cfg.base_animation_speed = bad;
            assert!(Sprite::try_from_config(cfg).is_err(), "base speed {bad}");
        }
    }
}
