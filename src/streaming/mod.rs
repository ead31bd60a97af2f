//! World-aligned tiling shared by terrain chunks and parallax layers

pub mod cache;
pub mod span;

pub use cache::{TileCache, WindowUpdate};
pub use span::{edge, index_for, sample_span, TileSpan};
