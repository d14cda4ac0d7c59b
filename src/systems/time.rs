//! Frame clock update.
//!
//! Advances the [`FrameClock`] resource once per tick and decides whether
//! the tick redraws.

use bevy_ecs::prelude::*;

use crate::resources::frameclock::FrameClock;

/// Start a tick at `timestamp` (milliseconds): accumulate the delta since
/// the previous tick and bump the frame counter.
pub fn advance_frame_clock(world: &mut World, timestamp: f64) {
    world.resource_mut::<FrameClock>().begin_tick(timestamp);
}

/// Whether the current tick redraws. Resets the throttle when it does.
pub fn take_redraw(world: &mut World) -> bool {
    world
        .get_resource_mut::<FrameClock>()
        .is_some_and(|mut clock| clock.take_redraw())
}
