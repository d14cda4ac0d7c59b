//! ECS components for scene objects.
//!
//! Submodules overview:
//! - [`animation`] – sprite-sheet frame tables and the animation selector
//! - [`backgroundlayer`] – a single horizontally scrolling background image
//! - [`entitykind`] – the closed set of object kinds and their spawn bundles
//! - [`gameobject`] – positioned, sized body shared by every object
//! - [`manifestindex`] – manifest position, the update and draw order
//! - [`parallax`] – marker for an entity whose children are layers
//! - [`sprite`] – animated sprite drawn from a sheet

pub mod animation;
pub mod backgroundlayer;
pub mod entitykind;
pub mod gameobject;
pub mod manifestindex;
pub mod parallax;
pub mod sprite;
