//! Sprite-sheet animation.
//!
//! A sheet holds one animation per row, frames laid out left-to-right. The
//! animation table is derived once per sprite from the declared frame counts;
//! the [`SpriteAnimator`] then maps the scene's frame counter to a cell:
//!
//! ```text
//! frame_index = floor(scene_frame / speed) % frame_count
//! ```
//!
//! Speeds are game frames per sprite frame and may be fractional: `0.5`
//! advances two cells per tick, `2.5` holds each cell for two or three ticks.
//!
//! Playback is tied to the frame counter, not wall-clock time, so animations
//! run faster when ticks arrive faster.

use log::warn;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{EngineError, EngineResult};

/// Declarative animation entry from sprite metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationDef {
    pub name: String,
    /// Number of frames in this animation's row.
    pub frames: usize,
    /// Game frames per sprite frame. Falls back to the sprite's base speed.
    #[serde(default)]
    pub speed: Option<f64>,
}

impl AnimationDef {
    pub fn new(name: impl Into<String>, frames: usize) -> Self {
        Self {
            name: name.into(),
            frames,
            speed: None,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }
}

/// Top-left corner of a frame cell inside the sheet, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameRect {
    pub col: f32,
    pub row: f32,
}

/// An animation with its derived frame cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub name: String,
    /// Position in the sprite's animation list, also its row in the sheet.
    pub index: usize,
    pub speed: Option<f64>,
    pub frames: SmallVec<[FrameRect; 8]>,
}

/// Derive the frame cells of every animation.
///
/// Animation `i` gets `frames_i` cells `{col: cell_width * f, row: i * cell_height}`.
/// Frame counts are not checked against the real sheet size; an oversized
/// count reads past the image.
pub fn build_animation_table(
    defs: &[AnimationDef],
    cell_width: f32,
    cell_height: f32,
) -> Vec<Animation> {
    defs.iter()
        .enumerate()
        .map(|(index, def)| Animation {
            name: def.name.clone(),
            index,
            speed: def.speed,
            frames: (0..def.frames)
                .map(|f| FrameRect {
                    col: cell_width * f as f32,
                    row: index as f32 * cell_height,
                })
                .collect(),
        })
        .collect()
}

/// Direction for [`SpriteAnimator::cycle_animation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleDirection {
    Next,
    #[serde(alias = "prev")]
    Previous,
}

impl CycleDirection {
    /// Parse `"next"` or `"prev"`/`"previous"`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "next" => Some(Self::Next),
            "prev" | "previous" => Some(Self::Previous),
            _ => None,
        }
    }
}

/// Active animation selection and frame lookup for one sprite.
#[derive(Debug, Clone)]
pub struct SpriteAnimator {
    animations: Vec<Animation>,
    names: Vec<String>,
    current: Option<usize>,
    base_speed: f64,
}

/// Whether `speed` can divide the frame counter: positive and finite.
pub fn is_valid_speed(speed: f64) -> bool {
    speed > 0.0 && speed.is_finite()
}

impl SpriteAnimator {
    pub fn new(animations: Vec<Animation>, base_speed: f64) -> Self {
        let names = animations.iter().map(|a| a.name.clone()).collect();
        Self {
            animations,
            names,
            current: None,
            base_speed,
        }
    }

    /// Animation names in declaration order.
    pub fn animation_list(&self) -> &[String] {
        &self.names
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn current(&self) -> Option<&Animation> {
        self.current.map(|i| &self.animations[i])
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current().map(|a| a.name.as_str())
    }

    /// Select an animation by name.
    ///
    /// Unknown names leave the selection untouched. A selected animation
    /// without its own speed takes the base speed, which is then stored on
    /// the animation.
    pub fn try_set_animation(&mut self, name: &str) -> EngineResult<()> {
        let idx = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| EngineError::AnimationNotFound(name.to_string()))?;
        let anim = &mut self.animations[idx];
        if anim.speed.is_none() {
            anim.speed = Some(self.base_speed);
        }
        self.current = Some(idx);
        Ok(())
    }

    /// Like [`Self::try_set_animation`], logging a miss and returning `false`.
    pub fn set_animation(&mut self, name: &str) -> bool {
        match self.try_set_animation(name) {
            Ok(()) => true,
            Err(e) => {
                warn!("{} (known: {:?})", e, self.names);
                false
            }
        }
    }

    /// Step to the neighbouring animation, wrapping at both ends.
    pub fn cycle_animation(&mut self, direction: CycleDirection) {
        let len = self.names.len();
        if len == 0 {
            return;
        }
        let next = match (self.current, direction) {
            (None, CycleDirection::Next) => 0,
            (None, CycleDirection::Previous) => len - 1,
            (Some(i), CycleDirection::Next) => (i + 1) % len,
            (Some(i), CycleDirection::Previous) => (i as isize - 1).rem_euclid(len as isize) as usize,
        };
        let name = self.names[next].clone();
        self.set_animation(&name);
    }

    /// Index of the frame to show at `scene_frame`, if an animation is selected.
    pub fn frame_index(&self, scene_frame: u64) -> Option<usize> {
        let anim = self.current()?;
        if anim.frames.is_empty() {
            return None;
        }
        let speed = anim.speed.unwrap_or(self.base_speed);
        let step = (scene_frame as f64 / speed).floor() as u64;
        Some((step % anim.frames.len() as u64) as usize)
    }

    /// Sheet cell to show at `scene_frame`.
    pub fn current_rect(&self, scene_frame: u64) -> Option<FrameRect> {
        let idx = self.frame_index(scene_frame)?;
        self.current().map(|a| a.frames[idx])
    }
}
