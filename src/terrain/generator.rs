//! Noise-based ground height function

use serde::{Deserialize, Serialize};

use super::noise::{octave_noise, Permutation};
use crate::core::error::{ensure_finite, ensure_non_negative, ensure_positive};
use crate::core::types::DVec2;
use crate::core::{Error, Result};
use crate::math::Seed;

/// Parameters controlling terrain generation. Screen convention: y grows downward.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub seed: Seed,
    pub baseline: f64,         // Ground y where noise is zero
    pub wavelength: f64,       // World units per noise cycle (larger = smoother)
    pub amplitude: f64,        // Max noise displacement in pixels
    pub octaves: u32,          // Noise detail levels
    pub ripple_amplitude: f64, // Small periodic bumps on top of the noise
    pub ripple_wavelength: f64,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: Seed(42),
            baseline: 400.0,
            wavelength: 1000.0,
            amplitude: 100.0,
            octaves: 3,
            ripple_amplitude: 4.0,
            ripple_wavelength: 90.0,
        }
    }
}

impl TerrainParams {
    pub fn validate(&self) -> Result<()> {
        ensure_finite("terrain.baseline", self.baseline)?;
        ensure_positive("terrain.wavelength", self.wavelength)?;
        ensure_non_negative("terrain.amplitude", self.amplitude)?;
        ensure_non_negative("terrain.ripple_amplitude", self.ripple_amplitude)?;
        ensure_positive("terrain.ripple_wavelength", self.ripple_wavelength)?;
        if self.octaves == 0 || self.octaves > 16 {
            return Err(Error::config("terrain.octaves", format!("must lie in 1..=16, got {}", self.octaves)));
        }
        Ok(())
    }

    /// Largest distance the surface can move from `baseline`, either way.
    pub fn max_displacement(&self) -> f64 {
        self.amplitude + self.ripple_amplitude
    }
}

/// Pure height function shared by rendering and collision.
#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    params: TerrainParams,
    perm: Permutation,
}

impl TerrainGenerator {
    /// Create a new terrain generator with the given parameters
    pub fn new(params: TerrainParams) -> Result<Self> {
        params.validate()?;
        let perm = Permutation::new(params.seed);
        Ok(Self { params, perm })
    }

    /// Get terrain parameters
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Periodic ripple term added on top of the octave noise.
    pub fn ripple_at(&self, x: f64) -> f64 {
        let phase = x / self.params.ripple_wavelength * std::f64::consts::TAU;
        phase.sin() * self.params.ripple_amplitude
    }

    /// Ground y at world x. The only height source: chunk polygons and
    /// collision queries both call this.
    pub fn height_at(&self, x: f64) -> f64 {
        let n = octave_noise(&self.perm, x / self.params.wavelength, self.params.octaves);
        self.params.baseline + n * self.params.amplitude + self.ripple_at(x)
    }

    /// Slope dy/dx at world x by central difference.
    pub fn slope_at(&self, x: f64) -> f64 {
        let eps = 0.5;
        (self.height_at(x + eps) - self.height_at(x - eps)) / (2.0 * eps)
    }

    /// Unit surface normal pointing away from the ground (toward -y).
    pub fn normal_at(&self, x: f64) -> DVec2 {
        DVec2::new(self.slope_at(x), -1.0).normalize()
    }

    /// Min/max ground y sampled across `[min_x, max_x]` at `step` intervals.
    pub fn height_bounds(&self, min_x: f64, max_x: f64, step: f64) -> (f64, f64) {
        let mut min_h = f64::INFINITY;
        let mut max_h = f64::NEG_INFINITY;
        let mut x = min_x;
        loop {
            let h = self.height_at(x);
            min_h = min_h.min(h);
            max_h = max_h.max(h);
            if x >= max_x {
                break;
            }
            x = (x + step.max(1e-3)).min(max_x);
        }
        (min_h, max_h)
    }
}
