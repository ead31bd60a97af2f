//! Tendril - procedural 2D terrain, vegetation and parallax backdrops
//!
//! Everything is generated from a seed and a config: a noise height function
//! streamed as terrain chunks, recursive plant skeletons turned into shell
//! polygons and leaf clusters, and tiled mountain layers. Generators draw into
//! a scene graph of recorded drawing commands; `render::Raster` turns a
//! flattened scene into pixels.

pub mod background;
pub mod core;
pub mod math;
pub mod procgen;
pub mod render;
pub mod scene;
pub mod streaming;
pub mod terrain;
pub mod world;
