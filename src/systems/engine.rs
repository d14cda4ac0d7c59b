//! Engine loop.
//!
//! The loop moves through `AwaitingReady → Loading → Running → Stopped`.
//!
//! - **AwaitingReady** polls a [`ReadinessCheck`] on a fixed interval.
//! - **Loading** fetches the manifest, starts the entry scene in the world
//!   and composes its objects. A failed fetch leaves the loop here.
//! - **Running** ticks once per scheduled frame. Every tick advances the
//!   [`FrameClock`] and runs the [`UpdateHook`]; only throttled ticks (at
//!   most `fps` per second) run the redraw schedule.
//!
//! The loop owns a single `World` holding the [`EngineConfig`],
//! [`ObjectRegistry`] and the surface (as a non-send resource), plus the
//! current scene. Time comes from an injected [`Clock`] and the loop ends
//! when a [`StopHandle`] fires, so tests can drive it deterministically.

use std::marker::PhantomData;

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use log::{debug, error, info, warn};

use crate::error::EngineResult;
use crate::resources::clock::Clock;
use crate::resources::engineconfig::EngineConfig;
use crate::resources::frameclock::FrameClock;
use crate::resources::manifest::{Manifest, ManifestSource};
use crate::resources::registry::ObjectRegistry;
use crate::resources::surface::Surface;
use crate::scene::{begin_scene, redraw_schedule};
use crate::systems::composition::{CompositionReport, compose_scene};
use crate::systems::time::{advance_frame_clock, take_redraw};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    AwaitingReady,
    Loading,
    Running,
    Stopped,
}

/// Host simulation callback, run once per tick after the frame counter moves.
pub trait UpdateHook {
    fn update(&mut self, timestamp: f64, world: &mut World);
}

impl<F: FnMut(f64, &mut World)> UpdateHook for F {
    fn update(&mut self, timestamp: f64, world: &mut World) {
        self(timestamp, world)
    }
}

/// Host readiness condition polled before loading.
pub trait ReadinessCheck {
    fn is_ready(&mut self) -> bool;
}

impl<F: FnMut() -> bool> ReadinessCheck for F {
    fn is_ready(&mut self) -> bool {
        self()
    }
}

pub struct AlwaysReady;

impl ReadinessCheck for AlwaysReady {
    fn is_ready(&mut self) -> bool {
        true
    }
}

/// Requests the loop to stop. Can be cloned and sent to other threads.
#[derive(Clone)]
pub struct StopHandle {
    tx: Sender<()>,
}

impl StopHandle {
    pub fn stop(&self) {
        match self.tx.try_send(()) {
            // A stop is already pending.
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Disconnected(())) => debug!("Stop requested after the loop ended"),
        }
    }
}

pub struct EngineLoop<S: Surface, C: Clock> {
    state: EngineState,
    clock: C,
    world: World,
    redraw: Schedule,
    hook: Option<Box<dyn UpdateHook>>,
    report: Option<CompositionReport>,
    stop_tx: Sender<()>,
    stop_rx: Receiver<()>,
    surface: PhantomData<fn() -> S>,
}

impl<S: Surface, C: Clock> EngineLoop<S, C> {
    pub fn new(surface: S, clock: C, registry: ObjectRegistry, config: EngineConfig) -> Self {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
        let mut world = World::new();
        world.insert_resource(config);
        world.insert_resource(registry);
        world.insert_non_send_resource(surface);
        Self {
            state: EngineState::AwaitingReady,
            clock,
            world,
            redraw: redraw_schedule::<S>(),
            hook: None,
            report: None,
            stop_tx,
            stop_rx,
            surface: PhantomData,
        }
    }

    pub fn set_update_hook(&mut self, hook: impl UpdateHook + 'static) {
        self.hook = Some(Box::new(hook));
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn surface(&self) -> Option<&S> {
        self.world.get_non_send_resource::<S>()
    }

    /// Frame clock of the current scene, once one is loaded.
    pub fn frame_clock(&self) -> Option<&FrameClock> {
        self.world.get_resource::<FrameClock>()
    }

    pub fn frame(&self) -> u64 {
        self.frame_clock().map_or(0, |clock| clock.frame)
    }

    pub fn registry(&self) -> Option<&ObjectRegistry> {
        self.world.get_resource::<ObjectRegistry>()
    }

    pub fn config(&self) -> Option<&EngineConfig> {
        self.world.get_resource::<EngineConfig>()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Outcome of the latest scene composition.
    pub fn composition_report(&self) -> Option<&CompositionReport> {
        self.report.as_ref()
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            tx: self.stop_tx.clone(),
        }
    }

    fn stop_requested(&self) -> bool {
        self.stop_rx.try_recv().is_ok()
    }

    fn set_state(&mut self, state: EngineState) {
        if self.state != state {
            info!("Engine state: {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    fn settings(&self) -> EngineConfig {
        self.config().cloned().unwrap_or_default()
    }

    /// Poll `ready` every `ready_poll_ms` (at least 1ms) until it is ready,
    /// then move to `Loading`.
    ///
    /// Returns `false` if a stop was requested while waiting.
    pub fn wait_until_ready(&mut self, ready: &mut dyn ReadinessCheck) -> bool {
        let poll_ms = self.settings().ready_poll_ms.max(1) as f64;
        loop {
            if self.stop_requested() {
                self.set_state(EngineState::Stopped);
                return false;
            }
            if ready.is_ready() {
                self.set_state(EngineState::Loading);
                return true;
            }
            self.clock.sleep_ms(poll_ms);
        }
    }

    /// Fetch the manifest and build the entry scene.
    ///
    /// On failure the error is logged and returned, and the loop stays in `Loading`.
    pub fn load(&mut self, source: &mut dyn ManifestSource) -> EngineResult<()> {
        self.set_state(EngineState::Loading);
        match source.fetch() {
            Ok(manifest) => self.load_manifest(&manifest),
            Err(e) => {
                error!("Error loading scene manifest: {}", e);
                Err(e)
            }
        }
    }

    /// Build the entry scene of `manifest`, replacing any current scene.
    pub fn load_manifest(&mut self, manifest: &Manifest) -> EngineResult<()> {
        let settings = self.settings();
        let entry = &manifest.entry;
        let canvas =
            begin_scene::<S>(&mut self.world, entry, settings.target_fps, settings.game_speed);
        info!(
            "Loading scene {}x{} at {} fps with {} object entries",
            canvas.w,
            canvas.h,
            self.frame_clock().map_or(settings.target_fps, |clock| clock.fps),
            entry.game_objects.len()
        );
        let report = compose_scene(&mut self.world, &entry.game_objects);
        self.report = Some(report);
        self.set_state(EngineState::Running);
        Ok(())
    }

    /// Run one frame at `timestamp` (milliseconds). Returns whether it redrew.
    pub fn tick(&mut self, timestamp: f64) -> bool {
        if self.state != EngineState::Running {
            warn!("Tick ignored in state {:?}", self.state);
            return false;
        }

        advance_frame_clock(&mut self.world, timestamp);
        if let Some(hook) = self.hook.as_mut() {
            hook.update(timestamp, &mut self.world);
        }
        if take_redraw(&mut self.world) {
            self.redraw.run(&mut self.world);
            true
        } else {
            false
        }
    }

    /// Drive the whole state machine until stopped.
    ///
    /// Ticks every `frame_interval_ms` on the injected clock. `max_ticks`
    /// bounds the run; `None` runs until the stop handle fires. Returns the
    /// number of ticks run.
    pub fn run(
        &mut self,
        ready: &mut dyn ReadinessCheck,
        source: &mut dyn ManifestSource,
        max_ticks: Option<u64>,
    ) -> EngineResult<u64> {
        if self.state == EngineState::AwaitingReady && !self.wait_until_ready(ready) {
            return Ok(0);
        }
        if self.state != EngineState::Running {
            self.load(source)?;
        }

        let frame_interval_ms = self.settings().frame_interval_ms;
        let mut ticks = 0;
        while max_ticks.is_none_or(|max| ticks < max) {
            if self.stop_requested() {
                break;
            }
            let now = self.clock.now_ms();
            self.tick(now);
            ticks += 1;
            self.clock.sleep_ms(frame_interval_ms);
        }
        self.set_state(EngineState::Stopped);
        info!("Engine stopped after {} tick(s)", ticks);
        Ok(ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::resources::clock::ManualClock;
    use crate::resources::surface::RecordingSurface;
    use crate::scene::scene_objects;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn config(ready_poll_ms: u64) -> EngineConfig {
        EngineConfig {
            target_fps: 60.0,
            game_speed: 1.0,
            ready_poll_ms,
            frame_interval_ms: 1000.0 / 60.0,
            ..EngineConfig::new()
        }
    }

    fn make_engine() -> EngineLoop<RecordingSurface, ManualClock> {
        EngineLoop::new(
            RecordingSurface::new(),
            ManualClock::new(),
            ObjectRegistry::default(),
            config(100),
        )
    }

    fn manifest() -> Manifest {
        Manifest::from_json(r#"{"entry": {"canvas_size": 64, "gameObjects": [{"name": "Object"}]}}"#)
            .unwrap()
    }

    #[test]
    fn readiness_is_polled_on_interval() {
        let mut engine = make_engine();
        let mut polls = 0;
        let mut ready = || {
            polls += 1;
            polls >= 4
        };
        assert!(engine.wait_until_ready(&mut ready));
        assert_eq!(engine.state(), EngineState::Loading);
        assert_eq!(engine.clock().now_ms(), 300.0);
    }

    #[test]
    fn zero_poll_interval_still_sleeps() {
        let mut engine: EngineLoop<RecordingSurface, ManualClock> = EngineLoop::new(
            RecordingSurface::new(),
            ManualClock::new(),
            ObjectRegistry::default(),
            config(0),
        );
        let mut polls = 0;
        let mut ready = || {
            polls += 1;
            polls >= 4
        };
        assert!(engine.wait_until_ready(&mut ready));
        assert_eq!(engine.clock().now_ms(), 3.0);
    }

    #[test]
    fn stop_while_waiting_for_readiness() {
        let mut engine = make_engine();
        let stop = engine.stop_handle();
        let mut ready = move || {
            stop.stop();
            false
        };
        assert!(!engine.wait_until_ready(&mut ready));
        assert_eq!(engine.state(), EngineState::Stopped);
    }

    #[test]
    fn failed_manifest_stays_loading() {
        let mut engine = make_engine();
        struct Broken;
        impl ManifestSource for Broken {
            fn fetch(&mut self) -> EngineResult<Manifest> {
                Err(EngineError::manifest("connection refused"))
            }
        }
        let result = engine.run(&mut AlwaysReady, &mut Broken, Some(10));
        assert!(matches!(result, Err(EngineError::ManifestLoad(_))));
        assert_eq!(engine.state(), EngineState::Loading);
        assert!(engine.frame_clock().is_none());
        assert!(!engine.tick(0.0));
    }

    #[test]
    fn hook_runs_every_tick_after_the_counter_moves() {
        let mut engine = make_engine();
        let seen = Rc::new(RefCell::new(Vec::<u64>::new()));
        let log = seen.clone();
        engine.set_update_hook(move |_ts: f64, world: &mut World| {
            log.borrow_mut().push(world.resource::<FrameClock>().frame);
        });
        engine.load(&mut manifest()).unwrap();

        for i in 0..5 {
            engine.tick(i as f64);
        }
        assert_eq!(*seen.borrow(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn redraws_are_throttled_to_fps() {
        let mut engine = make_engine();
        engine.load(&mut manifest()).unwrap();

        assert!(engine.tick(0.0));
        assert!(!engine.tick(8.0));
        assert!(!engine.tick(16.0));
        assert!(engine.tick(17.0));
        assert_eq!(engine.frame_clock().unwrap().time_to_frame, 0.0);
        assert_eq!(engine.surface().unwrap().clears, 2);
    }

    #[test]
    fn run_honours_tick_limit_and_stop() {
        let mut engine = make_engine();
        let ticks = engine.run(&mut AlwaysReady, &mut manifest(), Some(10)).unwrap();
        assert_eq!(ticks, 10);
        assert_eq!(engine.state(), EngineState::Stopped);
        assert_eq!(engine.frame(), 10);

        let mut engine = make_engine();
        let stop = engine.stop_handle();
        let mut count = 0;
        engine.set_update_hook(move |_ts: f64, _world: &mut World| {
            count += 1;
            if count == 3 {
                stop.stop();
            }
        });
        let ticks = engine.run(&mut AlwaysReady, &mut manifest(), None).unwrap();
        assert_eq!(ticks, 3);
    }

    #[test]
    fn reloading_reuses_the_surface() {
        let mut engine = make_engine();
        engine.load(&mut manifest()).unwrap();
        engine.tick(0.0);
        let other = Manifest::from_json(r#"{"entry": {"canvas_width": 32, "canvas_height": 16}}"#)
            .unwrap();
        engine.load_manifest(&other).unwrap();

        let surface = engine.surface().unwrap();
        assert_eq!((surface.width, surface.height), (32, 16));
        assert_eq!(surface.clears, 1);
        assert_eq!(engine.frame(), 0);
        assert!(scene_objects(engine.world_mut()).is_empty());
    }
}
