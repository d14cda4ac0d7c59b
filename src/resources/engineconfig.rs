//! Engine configuration.
//!
//! Settings loaded from an INI file. Defaults are safe for startup, and any
//! key missing from the file keeps its default.
//!
//! # Configuration File Format
//!
//! ```ini
//! [engine]
//! target_fps = 60
//! game_speed = 1.0
//!
//! [paths]
//! manifest = ./assets/scenes.json
//! objects = ./assets/objects
//! object_ext = json
//! script = ./assets/scripts/main.lua
//!
//! [loop]
//! ready_poll_ms = 100
//! frame_interval_ms = 8.33
//! ```

use bevy_ecs::prelude::Resource;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::error::{EngineError, EngineResult};

const DEFAULT_TARGET_FPS: f64 = 60.0;
const DEFAULT_GAME_SPEED: f64 = 1.0;
const DEFAULT_MANIFEST_PATH: &str = "./assets/scenes.json";
const DEFAULT_OBJECTS_PATH: &str = "./assets/objects";
const DEFAULT_OBJECT_EXT: &str = "json";
const DEFAULT_SCRIPT_PATH: &str = "./assets/scripts/main.lua";
const DEFAULT_READY_POLL_MS: u64 = 100;
/// Host refresh cadence, like a 120 Hz display.
const DEFAULT_FRAME_INTERVAL_MS: f64 = 1000.0 / 120.0;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Redraw rate used when the manifest does not set one.
    pub target_fps: f64,
    /// Simulation time scale used when the manifest does not set one.
    pub game_speed: f64,
    pub manifest_path: PathBuf,
    /// Directory searched for `<TypeName>.<object_ext>` definitions.
    pub objects_path: PathBuf,
    pub object_ext: String,
    /// Script providing the host `update` hook.
    pub script_path: PathBuf,
    /// Readiness polling interval, at least 1.
    pub ready_poll_ms: u64,
    /// Time between scheduled ticks.
    pub frame_interval_ms: f64,
    pub config_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            game_speed: DEFAULT_GAME_SPEED,
            manifest_path: PathBuf::from(DEFAULT_MANIFEST_PATH),
            objects_path: PathBuf::from(DEFAULT_OBJECTS_PATH),
            object_ext: DEFAULT_OBJECT_EXT.to_string(),
            script_path: PathBuf::from(DEFAULT_SCRIPT_PATH),
            ready_poll_ms: DEFAULT_READY_POLL_MS,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load values from the INI file at `config_path`.
    pub fn load_from_file(&mut self) -> EngineResult<()> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| EngineError::Config(format!("failed to load config file: {}", e)))?;
        self.apply(&config)?;

        info!(
            "Loaded config: fps={}, game_speed={}, manifest={:?}, objects={:?}",
            self.target_fps, self.game_speed, self.manifest_path, self.objects_path
        );
        Ok(())
    }

    /// Load values from INI text.
    pub fn load_from_str(&mut self, text: &str) -> EngineResult<()> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| EngineError::Config(format!("failed to parse config: {}", e)))?;
        self.apply(&config)
    }

    fn apply(&mut self, config: &Ini) -> EngineResult<()> {
        let float = |section: &str, key: &str| {
            config
                .getfloat(section, key)
                .map_err(|e| EngineError::Config(format!("[{}] {}: {}", section, key, e)))
        };

        // [engine]
        if let Some(fps) = float("engine", "target_fps")? {
            if !(fps > 0.0) || !fps.is_finite() {
                return Err(EngineError::Config(format!(
                    "[engine] target_fps must be a positive number, got {}",
                    fps
                )));
            }
            self.target_fps = fps;
        }
        if let Some(speed) = float("engine", "game_speed")? {
            if !speed.is_finite() {
                return Err(EngineError::Config("[engine] game_speed must be finite".into()));
            }
            self.game_speed = speed;
        }

        // [paths]
        if let Some(path) = config.get("paths", "manifest") {
            self.manifest_path = PathBuf::from(path);
        }
        if let Some(path) = config.get("paths", "objects") {
            self.objects_path = PathBuf::from(path);
        }
        if let Some(ext) = config.get("paths", "object_ext") {
            self.object_ext = ext.trim_start_matches('.').to_string();
        }
        if let Some(path) = config.get("paths", "script") {
            self.script_path = PathBuf::from(path);
        }

        // [loop]
        if let Some(ms) = config
            .getuint("loop", "ready_poll_ms")
            .map_err(|e| EngineError::Config(format!("[loop] ready_poll_ms: {}", e)))?
        {
            if ms == 0 {
                return Err(EngineError::Config("[loop] ready_poll_ms must be >= 1".into()));
            }
            self.ready_poll_ms = ms;
        }
        if let Some(ms) = float("loop", "frame_interval_ms")? {
            if !ms.is_finite() {
                return Err(EngineError::Config("[loop] frame_interval_ms must be finite".into()));
            }
            self.frame_interval_ms = ms.max(0.0);
        }
        Ok(())
    }

    /// Write the current values to `config_path`.
    pub fn save_to_file(&self) -> EngineResult<()> {
        let mut config = Ini::new();

        config.set("engine", "target_fps", Some(self.target_fps.to_string()));
        config.set("engine", "game_speed", Some(self.game_speed.to_string()));

        config.set("paths", "manifest", Some(self.manifest_path.display().to_string()));
        config.set("paths", "objects", Some(self.objects_path.display().to_string()));
        config.set("paths", "object_ext", Some(self.object_ext.clone()));
        config.set("paths", "script", Some(self.script_path.display().to_string()));

        config.set("loop", "ready_poll_ms", Some(self.ready_poll_ms.to_string()));
        config.set("loop", "frame_interval_ms", Some(self.frame_interval_ms.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| EngineError::Config(format!("failed to save config file: {}", e)))?;

        info!("Saved config to {:?}", self.config_path);
        Ok(())
    }
}
