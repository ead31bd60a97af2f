//! Leaf and petal cluster placement
//!
//! Clusters of overlapping soft blobs are dropped on every skeleton anchor
//! plus a number of extra scatter points around the crown. Density is purely
//! probabilistic; clusters never avoid each other.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::core::error::{ensure_in_range, ensure_non_negative, ensure_positive, ensure_range};
use crate::core::types::DVec2;
use crate::core::{Error, Result};
use crate::math::{Aabb, Rng};
use crate::render::{Color, RenderSink};

/// Canopy placement parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanopyParams {
    pub color: Color,
    /// Extra clusters scattered around the crown
    pub crown_scatter: u32,
    /// Radius of the crown scatter area
    pub crown_radius: f64,
    /// Blobs per cluster, inclusive
    pub blobs: (u32, u32),
    /// Blob radius range
    pub blob_radius: (f64, f64),
    /// Max blob offset from the cluster center, as a multiple of blob radius
    pub blob_offset: f64,
    /// Cluster opacity range
    pub alpha: (f64, f64),
    /// Outer halo radius as a multiple of the blob radius
    pub soft_edge_scale: f64,
    /// Halo opacity as a fraction of the blob opacity
    pub soft_edge_alpha: f64,
    /// Probability that an anchor gets a cluster at all
    pub anchor_chance: f64,
}

impl Default for CanopyParams {
    fn default() -> Self {
        Self {
            color: Color::from_hex(0x3f7f35),
            crown_scatter: 6,
            crown_radius: 45.0,
            blobs: (3, 8),
            blob_radius: (7.0, 15.0),
            blob_offset: 1.1,
            alpha: (0.6, 0.9),
            soft_edge_scale: 1.35,
            soft_edge_alpha: 0.35,
            anchor_chance: 1.0,
        }
    }
}

impl CanopyParams {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("canopy.crown_radius", self.crown_radius)?;
        ensure_range("canopy.blob_radius", self.blob_radius)?;
        ensure_positive("canopy.blob_radius", self.blob_radius.0)?;
        ensure_non_negative("canopy.blob_offset", self.blob_offset)?;
        ensure_range("canopy.alpha", self.alpha)?;
        ensure_in_range("canopy.alpha", self.alpha.0, 0.0, 1.0)?;
        ensure_in_range("canopy.alpha", self.alpha.1, 0.0, 1.0)?;
        ensure_in_range("canopy.soft_edge_scale", self.soft_edge_scale, 1.0, 4.0)?;
        ensure_in_range("canopy.soft_edge_alpha", self.soft_edge_alpha, 0.0, 1.0)?;
        ensure_in_range("canopy.anchor_chance", self.anchor_chance, 0.0, 1.0)?;
        if self.blobs.0 == 0 || self.blobs.0 > self.blobs.1 {
            return Err(Error::config(
                "canopy.blobs",
                format!("invalid count range {:?}", self.blobs),
            ));
        }
        Ok(())
    }
}

/// One soft elliptical blob.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blob {
    pub center: DVec2,
    pub radii: DVec2,
    pub rotation: f64,
    pub alpha: f64,
}

/// A group of blobs sharing a center and opacity.
#[derive(Clone, Debug, PartialEq)]
pub struct LeafCluster {
    pub center: DVec2,
    pub alpha: f64,
    pub blobs: Vec<Blob>,
}

/// Every cluster of one leaf or petal layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Canopy {
    pub color: Color,
    pub soft_edge_scale: f64,
    pub soft_edge_alpha: f64,
    pub clusters: Vec<LeafCluster>,
}

impl Canopy {
    pub fn blob_count(&self) -> usize {
        self.clusters.iter().map(|c| c.blobs.len()).sum()
    }

    pub fn bounds(&self) -> Aabb {
        let mut bounds = Aabb::EMPTY;
        for blob in self.clusters.iter().flat_map(|c| c.blobs.iter()) {
            let r = DVec2::splat(blob.radii.max_element() * self.soft_edge_scale);
            bounds.expand(blob.center - r);
            bounds.expand(blob.center + r);
        }
        bounds
    }

    /// Draw each blob as a faint halo under an opaque core.
    pub fn draw(&self, sink: &mut dyn RenderSink) {
        for blob in self.clusters.iter().flat_map(|c| c.blobs.iter()) {
            sink.begin_fill(self.color, blob.alpha * self.soft_edge_alpha);
            sink.ellipse(blob.center, blob.radii * self.soft_edge_scale, blob.rotation);
            sink.end_fill();

            sink.begin_fill(self.color, blob.alpha);
            sink.ellipse(blob.center, blob.radii, blob.rotation);
            sink.end_fill();
        }
    }
}

fn cluster(rng: &mut Rng, center: DVec2, params: &CanopyParams) -> LeafCluster {
    let (lo, hi) = params.blobs;
    let count = lo + rng.index((hi - lo + 1) as usize) as u32;
    let alpha = rng.range(params.alpha.0, params.alpha.1);

    let blobs = (0..count)
        .map(|_| {
            let radius = rng.range(params.blob_radius.0, params.blob_radius.1);
            let offset = DVec2::new(rng.signed(1.0), rng.signed(1.0)) * radius * params.blob_offset;
            Blob {
                center: center + offset,
                radii: DVec2::new(radius, radius * rng.range(0.7, 1.0)),
                rotation: rng.range(0.0, TAU),
                alpha: alpha * rng.range(0.85, 1.0),
            }
        })
        .collect();

    LeafCluster { center, alpha, blobs }
}

/// Place clusters on `anchors` and around `crown`, drawing from `rng` in a fixed order.
pub fn place_canopy(rng: &mut Rng, anchors: &[DVec2], crown: DVec2, params: &CanopyParams) -> Canopy {
    let mut clusters = Vec::with_capacity(anchors.len() + params.crown_scatter as usize);

    for &anchor in anchors {
        if rng.chance(params.anchor_chance) {
            clusters.push(cluster(rng, anchor, params));
        }
    }

    for _ in 0..params.crown_scatter {
        let angle = rng.range(0.0, TAU);
        let distance = params.crown_radius * rng.next_f64().sqrt();
        let center = crown + DVec2::from_angle(angle) * distance;
        clusters.push(cluster(rng, center, params));
    }

    Canopy {
        color: params.color,
        soft_edge_scale: params.soft_edge_scale,
        soft_edge_alpha: params.soft_edge_alpha,
        clusters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, DrawList};

    fn anchors() -> Vec<DVec2> {
        vec![DVec2::new(-20.0, -80.0), DVec2::new(15.0, -95.0), DVec2::new(0.0, -110.0)]
    }

    #[test]
    fn test_default_params_valid() {
        assert!(CanopyParams::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_params() {
        let bad = [
            CanopyParams { blobs: (0, 4), ..Default::default() },
            CanopyParams { blobs: (5, 3), ..Default::default() },
            CanopyParams { blob_radius: (0.0, 3.0), ..Default::default() },
            CanopyParams { alpha: (0.5, 1.5), ..Default::default() },
            CanopyParams { soft_edge_scale: 0.5, ..Default::default() },
        ];
        for params in bad {
            assert!(params.validate().is_err());
        }
    }

    #[test]
    fn test_cluster_sizes_within_range() {
        let params = CanopyParams::default();
        let mut rng = Rng::new(5);
        let canopy = place_canopy(&mut rng, &anchors(), DVec2::new(0.0, -110.0), &params);
        assert_eq!(canopy.clusters.len(), 3 + 6);
        for c in &canopy.clusters {
            assert!((3..=8).contains(&c.blobs.len()));
            assert!(c.alpha >= 0.6 && c.alpha < 0.9);
            for b in &c.blobs {
                assert!(b.alpha <= c.alpha);
                assert!(b.radii.x >= 7.0 && b.radii.x < 15.0);
            }
        }
    }

    #[test]
    fn test_clusters_sit_on_anchors_then_crown() {
        let params = CanopyParams::default();
        let mut rng = Rng::new(9);
        let crown = DVec2::new(0.0, -110.0);
        let canopy = place_canopy(&mut rng, &anchors(), crown, &params);
        for (c, a) in canopy.clusters.iter().zip(anchors()) {
            assert_eq!(c.center, a);
        }
        for c in &canopy.clusters[3..] {
            assert!(c.center.distance(crown) <= params.crown_radius + 1e-9);
        }
    }

    #[test]
    fn test_deterministic() {
        let params = CanopyParams::default();
        let a = place_canopy(&mut Rng::new("leaf"), &anchors(), DVec2::ZERO, &params);
        let b = place_canopy(&mut Rng::new("leaf"), &anchors(), DVec2::ZERO, &params);
        assert_eq!(a, b);
    }

    #[test]
    fn test_draw_emits_halo_and_core() {
        let params = CanopyParams { crown_scatter: 0, ..Default::default() };
        let canopy = place_canopy(&mut Rng::new(1), &anchors()[..1], DVec2::ZERO, &params);
        let mut list = DrawList::new();
        canopy.draw(&mut list);
        assert_eq!(list.fill_count(), canopy.blob_count() * 2);

        let ellipses: Vec<DVec2> = list
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Ellipse { radii, .. } => Some(*radii),
                _ => None,
            })
            .collect();
        assert!(ellipses[0].x > ellipses[1].x);
    }

    #[test]
    fn test_zero_anchor_chance() {
        let params = CanopyParams { anchor_chance: 0.0, crown_scatter: 2, ..Default::default() };
        let canopy = place_canopy(&mut Rng::new(3), &anchors(), DVec2::ZERO, &params);
        assert_eq!(canopy.clusters.len(), 2);
    }
}
