//! Scene manifest.
//!
//! The manifest is fetched once at startup and describes the entry scene:
//!
//! ```json
//! {
//!   "entry": {
//!     "canvas_size": 300,
//!     "fps": 60,
//!     "gameObjects": [
//!       { "name": "BackgroundLayer", "image": "sky.png", "width": 300, "height": 300 },
//!       { "name": "Hero", "x": 40, "y": 200 }
//!     ]
//!   }
//! }
//! ```
//!
//! Object entries stay untyped JSON objects here; they are only validated
//! once their type has been resolved.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::error::{EngineError, EngineResult};

const DEFAULT_CANVAS_SIZE: u32 = 600;

/// Untyped metadata of one object entry.
pub type ObjectMeta = Map<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub entry: SceneMeta,
}

impl Manifest {
    pub fn from_json(text: &str) -> EngineResult<Self> {
        serde_json::from_str(text).map_err(|e| EngineError::manifest(e.to_string()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneMeta {
    #[serde(default)]
    pub canvas_width: Option<u32>,
    #[serde(default)]
    pub canvas_height: Option<u32>,
    #[serde(default)]
    pub canvas_size: Option<u32>,
    #[serde(default)]
    pub fps: Option<f64>,
    #[serde(default)]
    pub game_speed: Option<f64>,
    #[serde(default, rename = "gameObjects", alias = "game_objects")]
    pub game_objects: Vec<ObjectMeta>,
}

impl SceneMeta {
    /// Canvas size as `width || size || 600`, `height || size || 600`.
    pub fn dimensions(&self) -> (u32, u32) {
        let pick = |explicit: Option<u32>| {
            explicit
                .filter(|v| *v > 0)
                .or(self.canvas_size.filter(|v| *v > 0))
                .unwrap_or(DEFAULT_CANVAS_SIZE)
        };
        (pick(self.canvas_width), pick(self.canvas_height))
    }
}

/// Where the manifest comes from.
pub trait ManifestSource {
    fn fetch(&mut self) -> EngineResult<Manifest>;
}

/// Reads the manifest from a JSON file.
pub struct FileManifestSource {
    pub path: PathBuf,
}

impl FileManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ManifestSource for FileManifestSource {
    fn fetch(&mut self) -> EngineResult<Manifest> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            EngineError::manifest(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        Manifest::from_json(&text)
    }
}

/// Hands out an already parsed manifest.
impl ManifestSource for Manifest {
    fn fetch(&mut self) -> EngineResult<Manifest> {
        Ok(self.clone())
    }
}
