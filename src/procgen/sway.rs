//! Wind sway for plant nodes
//!
//! Generators only hand back static geometry plus `Sway` parameters; the
//! animator turns elapsed time into a rotation on each plant's scene node.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::core::error::{ensure_non_negative, ensure_range};
use crate::core::Result;
use crate::math::Rng;
use crate::scene::{SceneGraph, SceneNodeId};

/// Ranges sway parameters are drawn from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwayParams {
    /// Peak rotation, radians
    pub amplitude: (f64, f64),
    /// Oscillations per second
    pub frequency: (f64, f64),
}

impl Default for SwayParams {
    fn default() -> Self {
        Self {
            amplitude: (0.01, 0.03),
            frequency: (0.2, 0.45),
        }
    }
}

impl SwayParams {
    pub fn validate(&self) -> Result<()> {
        ensure_range("sway.amplitude", self.amplitude)?;
        ensure_non_negative("sway.amplitude", self.amplitude.0)?;
        ensure_range("sway.frequency", self.frequency)?;
        ensure_non_negative("sway.frequency", self.frequency.0)?;
        Ok(())
    }
}

/// Sway of one plant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sway {
    pub amplitude: f64,
    pub frequency: f64,
    pub phase: f64,
}

impl Sway {
    /// Draw amplitude, frequency and phase from `rng`.
    pub fn sample(rng: &mut Rng, params: &SwayParams) -> Self {
        Self {
            amplitude: rng.range(params.amplitude.0, params.amplitude.1),
            frequency: rng.range(params.frequency.0, params.frequency.1),
            phase: rng.range(0.0, TAU),
        }
    }

    /// Rotation in radians at time `t` seconds.
    pub fn rotation_at(&self, t: f64) -> f64 {
        self.amplitude * (TAU * self.frequency * t + self.phase).sin()
    }
}

/// Drives the rotation of swaying scene nodes.
#[derive(Debug, Default)]
pub struct SwayAnimator {
    entries: Vec<(SceneNodeId, Sway)>,
    time: f64,
}

impl SwayAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start animating `node`. Re-adding a node replaces its sway.
    pub fn add(&mut self, node: SceneNodeId, sway: Sway) {
        match self.entries.iter_mut().find(|(id, _)| *id == node) {
            Some(entry) => entry.1 = sway,
            None => self.entries.push((node, sway)),
        }
    }

    /// Stop animating `node`. Unknown nodes are ignored.
    pub fn remove(&mut self, node: SceneNodeId) {
        self.entries.retain(|(id, _)| *id != node);
    }

    /// Elapsed animation time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advance time by `dt` seconds and apply. Negative or non-finite `dt` counts as zero.
    pub fn tick(&mut self, dt: f64, scene: &mut SceneGraph) {
        if dt.is_finite() && dt > 0.0 {
            self.time += dt;
        }
        self.apply(scene);
    }

    /// Set every node's rotation for the current time. Nodes no longer in
    /// the scene are dropped.
    pub fn apply(&mut self, scene: &mut SceneGraph) {
        self.entries.retain(|(id, _)| scene.contains(*id));
        for (id, sway) in &self.entries {
            scene.set_rotation(*id, sway.rotation_at(self.time));
        }
    }
}
