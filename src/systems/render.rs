//! Redraw systems.
//!
//! A redraw clears the whole canvas, then draws every scene object in
//! [`ManifestIndex`] order. Parallax children are drawn right after their
//! parent, back-to-front. Sprites pick their cell from the scene's frame
//! counter.
//!
//! The surface is a non-send resource of the concrete type `S`, so both
//! systems are generic over it.

use bevy_ecs::hierarchy::{ChildOf, Children};
use bevy_ecs::prelude::*;

use crate::components::backgroundlayer::BackgroundLayer;
use crate::components::gameobject::GameObject;
use crate::components::manifestindex::ManifestIndex;
use crate::components::sprite::Sprite;
use crate::resources::canvassize::CanvasSize;
use crate::resources::frameclock::FrameClock;
use crate::resources::surface::{Rect, Surface};

pub fn clear_canvas<S: Surface>(canvas: Res<CanvasSize>, mut surface: NonSendMut<S>) {
    surface.clear(Rect::new(0.0, 0.0, canvas.w as f32, canvas.h as f32));
}

pub fn render_objects<S: Surface>(
    clock: Res<FrameClock>,
    roots: Query<
        (
            &ManifestIndex,
            &GameObject,
            Option<&Sprite>,
            Option<&BackgroundLayer>,
            Option<&Children>,
        ),
        Without<ChildOf>,
    >,
    layers: Query<(&GameObject, &BackgroundLayer), With<ChildOf>>,
    mut surface: NonSendMut<S>,
) {
    let mut to_draw: Vec<_> = roots.iter().collect();
    to_draw.sort_by_key(|(index, ..)| **index);

    let surface: &mut dyn Surface = &mut *surface;
    for (_, body, sprite, layer, children) in to_draw {
        if let Some(sprite) = sprite {
            sprite.draw(clock.frame, surface);
        }
        if let Some(layer) = layer {
            layer.draw(body, surface);
        }
        let Some(children) = children else {
            continue;
        };
        for child in children.iter() {
            if let Ok((layer_body, layer)) = layers.get(child) {
                layer.draw(layer_body, surface);
            }
        }
    }
}
