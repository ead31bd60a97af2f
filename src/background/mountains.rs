//! Mountain silhouette tiles
//!
//! The ridgeline is a pure function of layer-space x, so any two tiles that
//! share an edge sample the same height there.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use super::parallax::LayerParams;
use crate::core::types::DVec2;
use crate::math::{Polygon, Seed};
use crate::streaming::{sample_span, TileSpan};

/// Ridgeline of one mountain layer.
pub struct Ridge {
    noise: Fbm<Perlin>,
    /// Layer-space units per noise cycle
    feature_width: f64,
    base_y: f64,
    peak_height: f64,
    vertical_bias: f64,
    /// Lowest point any tile polygon reaches
    floor_y: f64,
}

impl Ridge {
    /// Build the ridge for a validated layer.
    pub fn new(params: &LayerParams, seed: Seed) -> Self {
        let noise = Fbm::<Perlin>::new(seed.0)
            .set_octaves(params.octaves as usize)
            .set_persistence(0.5)
            .set_lacunarity(2.0);
        Self {
            noise,
            feature_width: params.tile_width / params.peak_count as f64,
            base_y: params.base_y,
            peak_height: params.peak_height,
            vertical_bias: params.vertical_bias,
            floor_y: params.base_y + params.skirt,
        }
    }

    /// Ridge y at layer-space x. Stays within `[base_y - peak_height, base_y]`.
    pub fn y_at(&self, x: f64) -> f64 {
        let n = self.noise.get([x / self.feature_width, 0.5]);
        let normalized = ((n + 1.0) * 0.5).clamp(0.0, 1.0);
        let height = self.peak_height * (self.vertical_bias + (1.0 - self.vertical_bias) * normalized);
        self.base_y - height
    }

    pub fn floor_y(&self) -> f64 {
        self.floor_y
    }

    /// Ridge samples across one tile, edges snapped.
    pub fn profile(&self, span: &TileSpan, step: f64) -> Vec<DVec2> {
        sample_span(span, step, |x| self.y_at(x))
    }

    /// Filled silhouette of one tile in layer space.
    pub fn tile_polygon(&self, span: &TileSpan, step: f64) -> Polygon {
        Polygon::below_profile(&self.profile(span, step), self.floor_y)
    }
}
