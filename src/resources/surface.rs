//! Drawing surface abstraction.
//!
//! The engine never decodes images or talks to a graphics API directly. It
//! hands image keys and rectangles to a [`Surface`], which owns whatever
//! texture cache and context the host provides.
//!
//! [`RecordingSurface`] keeps the draw commands of the latest frame and a few
//! counters. It backs the headless binary and the test suite.

use std::sync::Arc;

/// Axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// Key of an image asset, usually its path. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageKey(pub Arc<str>);

impl ImageKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Host drawing context consumed by the engine.
///
/// Lives in the world as a non-send resource, so host contexts tied to
/// one thread work too.
pub trait Surface: 'static {
    /// Resize the backing canvas. Called once when a scene takes ownership.
    fn resize(&mut self, width: u32, height: u32);
    /// Clear a region of the canvas.
    fn clear(&mut self, rect: Rect);
    /// Copy `src` from `image` into `dst` on the canvas.
    fn draw_image(&mut self, image: &ImageKey, src: Rect, dst: Rect);
}

/// A single recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear(Rect),
    Image { image: ImageKey, src: Rect, dst: Rect },
}

/// Surface that records what would have been drawn.
///
/// Each `clear` of the whole canvas starts a new frame and drops the commands
/// of the previous one, so memory stays bounded on long headless runs.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub width: u32,
    pub height: u32,
    commands: Vec<DrawCmd>,
    /// Number of `clear` calls seen.
    pub clears: u64,
    /// Number of `draw_image` calls seen.
    pub draws: u64,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands issued since the last full clear (the clear included).
    pub fn commands(&self) -> &[DrawCmd] {
        &self.commands
    }

    /// Image draws issued since the last full clear.
    pub fn image_draws(&self) -> impl Iterator<Item = (&ImageKey, Rect, Rect)> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCmd::Image { image, src, dst } => Some((image, *src, *dst)),
            DrawCmd::Clear(_) => None,
        })
    }

    fn is_full_canvas(&self, rect: Rect) -> bool {
        rect.x <= 0.0
            && rect.y <= 0.0
            && rect.w >= self.width as f32
            && rect.h >= self.height as f32
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn clear(&mut self, rect: Rect) {
        if self.is_full_canvas(rect) {
            self.commands.clear();
        }
        self.clears += 1;
        self.commands.push(DrawCmd::Clear(rect));
    }

    fn draw_image(&mut self, image: &ImageKey, src: Rect, dst: Rect) {
        self.draws += 1;
        self.commands.push(DrawCmd::Image {
            image: image.clone(),
            src,
            dst,
        });
    }
}
