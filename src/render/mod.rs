//! Renderer-facing types: colors, drawing commands and a CPU raster target

pub mod color;
pub mod draw;
pub mod raster;

pub use color::Color;
pub use draw::{DrawCommand, DrawList, RenderSink};
pub use raster::Raster;
