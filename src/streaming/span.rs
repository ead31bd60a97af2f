//! World-aligned tile spans and edge-snapped sampling.
//!
//! A tile's edges are always computed from its integer index as
//! `index * width`, so neighbours derive the shared edge from the same
//! expression and sample the exact same world x there.

use crate::core::types::DVec2;

/// One world-aligned slab `[start, end]` of a tiled strip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileSpan {
    pub index: i64,
    pub start: f64,
    pub end: f64,
}

impl TileSpan {
    /// Span of tile `index` for a strip of `width`-wide tiles.
    pub fn at(index: i64, width: f64) -> Self {
        Self {
            index,
            start: edge(index, width),
            end: edge(index + 1, width),
        }
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.start && x < self.end
    }
}

/// World x of the left edge of tile `index`.
#[inline]
pub fn edge(index: i64, width: f64) -> f64 {
    index as f64 * width
}

/// Index of the tile containing world x.
#[inline]
pub fn index_for(x: f64, width: f64) -> i64 {
    (x / width).floor() as i64
}

/// Sample `f` across the span every `step` units. The first and last samples
/// are snapped to the exact span edges so adjacent tiles meet without gaps.
pub fn sample_span(span: &TileSpan, step: f64, f: impl Fn(f64) -> f64) -> Vec<DVec2> {
    let count = (span.width() / step).ceil().max(1.0) as usize;
    let mut samples = Vec::with_capacity(count + 1);

    samples.push(DVec2::new(span.start, f(span.start)));
    for i in 1..count {
        let x = span.start + i as f64 * step;
        if x >= span.end {
            break;
        }
        samples.push(DVec2::new(x, f(x)));
    }
    samples.push(DVec2::new(span.end, f(span.end)));
    samples
}
