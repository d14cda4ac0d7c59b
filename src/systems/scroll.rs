//! Background scrolling.
//!
//! Runs once per redraw, before rendering. Moves every background layer
//! (standalone or inside a parallax) left by its `scroll_speed`.

use bevy_ecs::prelude::*;

use crate::components::backgroundlayer::BackgroundLayer;
use crate::components::gameobject::GameObject;

pub fn scroll_backgrounds(mut layers: Query<(&GameObject, &mut BackgroundLayer)>) {
    for (body, mut layer) in layers.iter_mut() {
        layer.scroll(body.width);
    }
}
