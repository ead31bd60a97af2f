//! Drifting cloud field
//!
//! Clouds are scattered once across a fixed layer-space span and follow the
//! same parallax offset as the mountain layers, without tiles. Positions wrap
//! around the span so the field never runs out while scrolling.

use serde::{Deserialize, Serialize};

use super::parallax::layer_offset;
use crate::core::error::{ensure_in_range, ensure_positive, ensure_range};
use crate::core::types::DVec2;
use crate::core::{Error, Result};
use crate::math::{Rng, Seed};
use crate::render::{Color, DrawList, RenderSink};
use crate::scene::{LocalTransform, NodeContent, SceneGraph, SceneNodeId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudParams {
    pub parallax: f64,
    pub count: u32,
    /// Layer-space width the clouds are scattered over and wrap around
    pub span: f64,
    /// Screen y range of cloud centers
    pub height: (f64, f64),
    /// Cloud width range
    pub width: (f64, f64),
    /// Puffs per cloud, inclusive
    pub puffs: (u32, u32),
    pub color: Color,
    pub alpha: (f64, f64),
}

impl Default for CloudParams {
    fn default() -> Self {
        Self {
            parallax: 0.1,
            count: 9,
            span: 4096.0,
            height: (40.0, 180.0),
            width: (90.0, 220.0),
            puffs: (3, 6),
            color: Color::WHITE,
            alpha: (0.55, 0.85),
        }
    }
}

impl CloudParams {
    pub fn validate(&self) -> Result<()> {
        ensure_in_range("clouds.parallax", self.parallax, 0.0, 1.0)?;
        ensure_positive("clouds.span", self.span)?;
        ensure_range("clouds.height", self.height)?;
        ensure_range("clouds.width", self.width)?;
        ensure_positive("clouds.width", self.width.0)?;
        ensure_range("clouds.alpha", self.alpha)?;
        ensure_in_range("clouds.alpha", self.alpha.0, 0.0, 1.0)?;
        ensure_in_range("clouds.alpha", self.alpha.1, 0.0, 1.0)?;
        if self.puffs.0 == 0 || self.puffs.0 > self.puffs.1 {
            return Err(Error::config("clouds.puffs", format!("invalid count range {:?}", self.puffs)));
        }
        if self.width.1 * 2.0 > self.span {
            return Err(Error::config("clouds.span", "must be at least twice the widest cloud"));
        }
        Ok(())
    }
}

/// One placed cloud.
#[derive(Clone, Debug)]
pub struct Cloud {
    /// Layer-space anchor
    pub origin: DVec2,
    pub width: f64,
    pub node: SceneNodeId,
}

/// Puff outline of one cloud, relative to its anchor.
fn cloud_drawing(rng: &mut Rng, width: f64, params: &CloudParams) -> DrawList {
    let (lo, hi) = params.puffs;
    let puffs = lo + rng.index((hi - lo + 1) as usize) as u32;
    let alpha = rng.range(params.alpha.0, params.alpha.1);
    let base = width / (puffs as f64 + 1.0);

    let mut drawing = DrawList::new();
    for i in 0..puffs {
        let x = base * (i as f64 + 1.0) - width * 0.5;
        // Middle puffs rise higher and grow larger
        let t = 1.0 - ((i as f64 + 0.5) / puffs as f64 - 0.5).abs() * 2.0;
        let radius = base * rng.range(0.8, 1.1) * (0.8 + 0.5 * t);
        let center = DVec2::new(x, -radius * 0.3 * t + rng.signed(base * 0.1));
        drawing.begin_fill(params.color, alpha);
        drawing.ellipse(center, DVec2::new(radius, radius * 0.75), 0.0);
        drawing.end_fill();
    }
    drawing
}

/// Parallax-scrolled cloud sprites.
pub struct CloudField {
    params: CloudParams,
    clouds: Vec<Cloud>,
    group: SceneNodeId,
    offset: f64,
}

impl CloudField {
    pub fn new(params: CloudParams, seed: Seed, scene: &mut SceneGraph, parent: SceneNodeId) -> Result<Self> {
        params.validate()?;
        let mut rng = Rng::new(seed);
        let group = scene.add_child(parent, "clouds", NodeContent::Group);

        let clouds = (0..params.count)
            .map(|i| {
                let origin = DVec2::new(rng.range(0.0, params.span), rng.range(params.height.0, params.height.1));
                let width = rng.range(params.width.0, params.width.1);
                let drawing = cloud_drawing(&mut rng, width, &params);
                let node = scene.add_child(group, format!("cloud {i}"), NodeContent::Drawing(drawing));
                Cloud { origin, width, node }
            })
            .collect();

        let mut field = Self { params, clouds, group, offset: 0.0 };
        field.update(0.0, scene);
        Ok(field)
    }

    pub fn params(&self) -> &CloudParams {
        &self.params
    }

    pub fn clouds(&self) -> &[Cloud] {
        &self.clouds
    }

    pub fn group(&self) -> SceneNodeId {
        self.group
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Screen x of a cloud anchor for the current offset, wrapped into
    /// `[-max_width, span - max_width)`.
    pub fn screen_x(&self, cloud: &Cloud) -> f64 {
        let margin = self.params.width.1;
        (cloud.origin.x + self.offset + margin).rem_euclid(self.params.span) - margin
    }

    /// Move every cloud for a camera scroll. Never regenerates geometry.
    pub fn update(&mut self, scroll: f64, scene: &mut SceneGraph) {
        self.offset = layer_offset(scroll, self.params.parallax);
        for cloud in &self.clouds {
            let position = DVec2::new(self.screen_x(cloud).round(), cloud.origin.y.round());
            scene.set_transform(cloud.node, LocalTransform::from_position(position));
        }
    }

    /// Remove every cloud node.
    pub fn clear(&mut self, scene: &mut SceneGraph) {
        for cloud in self.clouds.drain(..) {
            scene.remove(cloud.node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(scene: &mut SceneGraph, seed: u32) -> CloudField {
        let root = scene.root();
        CloudField::new(CloudParams::default(), Seed(seed), scene, root).unwrap()
    }

    #[test]
    fn test_rejects_bad_params() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        for params in [
            CloudParams { parallax: 2.0, ..Default::default() },
            CloudParams { span: 100.0, ..Default::default() },
            CloudParams { puffs: (0, 2), ..Default::default() },
            CloudParams { width: (50.0, 10.0), ..Default::default() },
        ] {
            assert!(CloudField::new(params, Seed(1), &mut scene, root).is_err());
        }
    }

    #[test]
    fn test_one_node_per_cloud() {
        let mut scene = SceneGraph::new();
        let f = field(&mut scene, 1);
        assert_eq!(f.clouds().len(), 9);
        assert_eq!(scene.children(f.group()).count(), 9);
        for cloud in f.clouds() {
            let NodeContent::Drawing(drawing) = &scene.get(cloud.node).unwrap().content else {
                panic!("cloud node without drawing");
            };
            assert!((3..=6).contains(&drawing.fill_count()));
        }
    }

    #[test]
    fn test_update_moves_without_regenerating() {
        let mut scene = SceneGraph::new();
        let mut f = field(&mut scene, 2);
        let nodes: Vec<SceneNodeId> = f.clouds().iter().map(|c| c.node).collect();
        let count = scene.node_count();

        f.update(1000.0, &mut scene);
        assert_eq!(f.offset(), -100.0);
        assert_eq!(scene.node_count(), count);
        assert_eq!(f.clouds().iter().map(|c| c.node).collect::<Vec<_>>(), nodes);
    }

    #[test]
    fn test_clouds_follow_parallax_offset() {
        let mut scene = SceneGraph::new();
        let mut f = field(&mut scene, 3);
        let before: Vec<f64> = f.clouds().iter().map(|c| f.screen_x(c)).collect();
        f.update(100.0, &mut scene);
        for (cloud, x0) in f.clouds().iter().zip(before) {
            let x1 = f.screen_x(cloud);
            // Moved left by 10 unless it wrapped around the span
            assert!((x0 - 10.0 - x1).abs() < 1e-9 || (x0 - 10.0 + 4096.0 - x1).abs() < 1e-9);
        }
    }

    #[test]
    fn test_positions_wrap_and_round() {
        let mut scene = SceneGraph::new();
        let mut f = field(&mut scene, 4);
        for scroll in [0.0, 12_345.6, -98_765.4, 1e7] {
            f.update(scroll, &mut scene);
            for cloud in f.clouds() {
                let x = f.screen_x(cloud);
                assert!(x >= -220.0 && x < 4096.0 - 220.0);
                let p = scene.position(cloud.node).unwrap();
                assert_eq!(p.x.fract(), 0.0);
            }
        }
    }

    #[test]
    fn test_deterministic_scatter() {
        let mut scene_a = SceneGraph::new();
        let mut scene_b = SceneGraph::new();
        let a = field(&mut scene_a, 5);
        let b = field(&mut scene_b, 5);
        for (ca, cb) in a.clouds().iter().zip(b.clouds()) {
            assert_eq!(ca.origin, cb.origin);
            assert_eq!(ca.width, cb.width);
        }
    }
}
