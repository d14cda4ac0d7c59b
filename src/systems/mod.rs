//! Engine systems.
//!
//! Submodules overview
//! - [`composition`] – spawn a scene's objects from manifest entries
//! - [`engine`] – readiness, loading and the throttled frame loop
//! - [`render`] – clear the canvas and draw objects in manifest order
//! - [`scroll`] – advance background layers once per redraw
//! - [`time`] – advance the frame clock and decide on redraws
pub mod composition;
pub mod engine;
pub mod render;
pub mod scroll;
pub mod time;
