//! Kinetoscope main entry point.
//!
//! Runs the engine headless against a recording surface:
//!
//! 1. Load `config.ini` (missing keys keep their defaults)
//! 2. Wait until the scene manifest exists
//! 3. Compose the entry scene, resolving object types from `assets/objects/`
//! 4. Tick the frame loop, running `assets/scripts/main.lua`'s `update(ctx)`
//!    every tick when the `lua` feature is enabled
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --ticks 600
//! ```

use clap::Parser;
use kinetoscope::resources::clock::SystemClock;
use kinetoscope::resources::engineconfig::EngineConfig;
use kinetoscope::resources::manifest::FileManifestSource;
use kinetoscope::resources::registry::{DefinitionLoader, ObjectRegistry};
use kinetoscope::resources::surface::RecordingSurface;
use kinetoscope::systems::engine::EngineLoop;
use std::path::PathBuf;

type HeadlessEngine = EngineLoop<RecordingSurface, SystemClock>;

/// Run `script_path`'s `update(ctx)` every tick, if the script exists.
#[cfg(feature = "lua")]
fn install_script_hook(engine: &mut HeadlessEngine, config: &EngineConfig) {
    use kinetoscope::resources::lua_runtime::LuaUpdateHook;

    if !config.script_path.exists() {
        log::info!("No script at {}, running without update hook", config.script_path.display());
        return;
    }
    match LuaUpdateHook::from_script(&config.script_path) {
        Ok(hook) => engine.set_update_hook(hook),
        Err(e) => log::error!("Failed to load {}: {}", config.script_path.display(), e),
    }
}

#[cfg(not(feature = "lua"))]
fn install_script_hook(_engine: &mut HeadlessEngine, _config: &EngineConfig) {
    log::info!("Built without Lua support, running without update hook");
}

/// Kinetoscope 2D scene engine
#[derive(Parser)]
#[command(version, about = "Minimal real-time 2D scene engine.")]
struct Cli {
    /// Engine configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Scene manifest, overriding the configured one.
    #[arg(long, value_name = "PATH")]
    manifest: Option<PathBuf>,

    /// Stop after this many ticks. Runs until interrupted when omitted.
    #[arg(long, value_name = "N")]
    ticks: Option<u64>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = EngineConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        log::warn!("Using default configuration: {}", e);
    }
    if let Some(manifest) = cli.manifest {
        config.manifest_path = manifest;
    }

    log::info!("Kinetoscope starting with manifest {}", config.manifest_path.display());

    let registry = ObjectRegistry::new(DefinitionLoader::new(
        &config.objects_path,
        config.object_ext.as_str(),
    ));
    let mut engine = EngineLoop::new(
        RecordingSurface::new(),
        SystemClock::new(),
        registry,
        config.clone(),
    );

    install_script_hook(&mut engine, &config);

    let manifest_path = config.manifest_path.clone();
    let mut ready = move || manifest_path.exists();
    let mut source = FileManifestSource::new(&config.manifest_path);

    match engine.run(&mut ready, &mut source, cli.ticks) {
        Ok(ticks) => {
            if let Some(surface) = engine.surface() {
                log::info!(
                    "Ran {} tick(s): {} frame(s), {} redraw(s), {} image draw(s)",
                    ticks,
                    engine.frame(),
                    surface.clears,
                    surface.draws
                );
            }
            if let Some(report) = engine.composition_report()
                && !report.is_complete()
            {
                log::warn!("{} object entr(ies) failed to compose", report.failures.len());
            }
        }
        Err(e) => {
            log::error!("Engine failed: {}", e);
            std::process::exit(1);
        }
    }
}
