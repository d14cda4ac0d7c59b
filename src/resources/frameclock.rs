//! Per-scene frame clock.
//!
//! One counter drives everything frame-based: it increments once per tick,
//! animations index into sheets with it, and the simulation hook sees it.
//! Redraws are throttled separately by accumulating tick deltas in
//! milliseconds until they exceed the `1000 / fps` interval.
//!
//! Advanced by [`advance_frame_clock`](crate::systems::time::advance_frame_clock).

use bevy_ecs::prelude::Resource;

pub const DEFAULT_FPS: f64 = 60.0;

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    /// Ticks so far. Never decreases.
    pub frame: u64,
    /// Milliseconds accumulated since the last redraw.
    pub time_to_frame: f64,
    /// Timestamp of the previous tick, `None` before the first one.
    pub frame_time: Option<f64>,
    /// Target redraw rate.
    pub fps: f64,
    /// Multiplier applied to deltas added to `elapsed`.
    pub time_scale: f64,
    /// Scaled simulation milliseconds since the first tick.
    pub elapsed: f64,
    /// Unscaled delta of the latest tick.
    pub delta: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_FPS)
    }
}

impl FrameClock {
    pub fn new(fps: f64) -> Self {
        Self {
            frame: 0,
            time_to_frame: 0.0,
            frame_time: None,
            fps,
            time_scale: 1.0,
            elapsed: 0.0,
            delta: 0.0,
        }
    }

    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Milliseconds between redraws.
    pub fn frame_interval(&self) -> f64 {
        1000.0 / self.fps
    }

    /// Start a tick: accumulate the delta since the previous one and bump the counter.
    ///
    /// A timestamp older than the previous one counts as a zero delta.
    pub fn begin_tick(&mut self, timestamp: f64) {
        let delta = match self.frame_time {
            Some(prev) => (timestamp - prev).max(0.0),
            None => 0.0,
        };
        self.frame_time = Some(timestamp);
        self.delta = delta;
        self.time_to_frame += delta;
        self.elapsed += delta * self.time_scale;
        self.frame += 1;
    }

    /// Whether this tick should redraw. Resets the accumulator when it does.
    ///
    /// The first tick always redraws so the scene is visible immediately.
    /// After that the accumulator must strictly exceed one interval.
    pub fn take_redraw(&mut self) -> bool {
        if self.frame == 1 || self.time_to_frame > self.frame_interval() {
            self.time_to_frame = 0.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_redraws_with_zero_delta() {
        let mut clock = FrameClock::new(60.0);
        clock.begin_tick(5_000.0);
        assert_eq!(clock.delta, 0.0);
        assert_eq!(clock.frame, 1);
        assert!(clock.take_redraw());
    }

    #[test]
    fn throttles_until_interval_is_reached() {
        let mut clock = FrameClock::new(60.0);
        clock.begin_tick(0.0);
        assert!(clock.take_redraw());

        let mut t = 0.0;
        for _ in 0..3 {
            t += 5.0;
            clock.begin_tick(t);
            assert!(!clock.take_redraw());
        }
        assert_eq!(clock.time_to_frame, 15.0);

        t += 2.0;
        clock.begin_tick(t);
        assert!(clock.take_redraw());
        assert_eq!(clock.time_to_frame, 0.0);
    }

    #[test]
    fn exactly_one_interval_does_not_redraw() {
        let mut clock = FrameClock::new(60.0);
        clock.begin_tick(0.0);
        assert!(clock.take_redraw());

        clock.begin_tick(1000.0 / 60.0);
        assert!(!clock.take_redraw());
        assert_eq!(clock.time_to_frame, 1000.0 / 60.0);

        clock.begin_tick(1000.0 / 60.0 + 0.01);
        assert!(clock.take_redraw());
        assert_eq!(clock.time_to_frame, 0.0);
    }

    #[test]
    fn backwards_timestamp_is_zero_delta() {
        let mut clock = FrameClock::new(60.0);
        clock.begin_tick(100.0);
        clock.begin_tick(50.0);
        assert_eq!(clock.delta, 0.0);
        assert_eq!(clock.frame, 2);
    }

    #[test]
    fn time_scale_only_affects_elapsed() {
        let mut clock = FrameClock::new(60.0).with_time_scale(2.0);
        clock.begin_tick(0.0);
        clock.begin_tick(10.0);
        assert_eq!(clock.elapsed, 20.0);
        assert_eq!(clock.time_to_frame, 10.0);
    }
}
