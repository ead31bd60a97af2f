//! Parallax backdrop: tiled mountain layers and a cloud field
//!
//! Backdrop nodes live in screen space. Layers are added back to front, so
//! the farthest layer paints first.

pub mod clouds;
pub mod mountains;
pub mod parallax;

pub use clouds::{Cloud, CloudField, CloudParams};
pub use mountains::Ridge;
pub use parallax::{layer_offset, LayerParams, ParallaxLayer, ParallaxTile};

use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::math::Seed;
use crate::render::Color;
use crate::scene::{NodeContent, SceneGraph, SceneNodeId};

/// Backdrop layout, back to front.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropParams {
    pub sky_color: Color,
    pub clouds: Option<CloudParams>,
    pub layers: Vec<LayerParams>,
}

impl Default for BackdropParams {
    fn default() -> Self {
        Self {
            sky_color: Color::from_hex(0xa8d0e6),
            clouds: Some(CloudParams::default()),
            layers: vec![Self::far_mountains(), Self::near_mountains()],
        }
    }
}

impl BackdropParams {
    /// Pale, slow, tall range on the horizon
    pub fn far_mountains() -> LayerParams {
        LayerParams {
            name: "far mountains".to_string(),
            parallax: 0.15,
            color: Color::from_hex(0x9aaec4),
            peak_count: 2,
            vertical_bias: 0.3,
            tile_width: 1536.0,
            base_y: 380.0,
            peak_height: 260.0,
            ..LayerParams::default()
        }
    }

    /// Darker, faster foothills
    pub fn near_mountains() -> LayerParams {
        LayerParams {
            name: "near mountains".to_string(),
            parallax: 0.4,
            color: Color::from_hex(0x6b8a7a),
            peak_count: 4,
            vertical_bias: 0.15,
            tile_width: 1024.0,
            base_y: 430.0,
            peak_height: 140.0,
            ..LayerParams::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(clouds) = &self.clouds {
            clouds.validate()?;
        }
        for layer in &self.layers {
            layer.validate()?;
        }
        Ok(())
    }
}

/// Every background layer of a world.
pub struct Backdrop {
    sky_color: Color,
    group: SceneNodeId,
    clouds: Option<CloudField>,
    layers: Vec<ParallaxLayer>,
}

impl Backdrop {
    /// Build the backdrop under `parent` for a screen `viewport_width` pixels
    /// wide. Layer seeds are derived from `seed`.
    pub fn new(
        params: &BackdropParams,
        seed: Seed,
        viewport_width: f64,
        scene: &mut SceneGraph,
        parent: SceneNodeId,
    ) -> Result<Self> {
        params.validate()?;
        let group = scene.add_child(parent, "backdrop", NodeContent::Group);

        let clouds = params
            .clouds
            .clone()
            .map(|c| CloudField::new(c, seed.derive(0xC10D), scene, group))
            .transpose()?;

        let layers = params
            .layers
            .iter()
            .enumerate()
            .map(|(i, layer)| ParallaxLayer::new(layer.clone(), seed.derive(i as u32 + 1), viewport_width, scene, group))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            sky_color: params.sky_color,
            group,
            clouds,
            layers,
        })
    }

    pub fn sky_color(&self) -> Color {
        self.sky_color
    }

    pub fn group(&self) -> SceneNodeId {
        self.group
    }

    pub fn layers(&self) -> &[ParallaxLayer] {
        &self.layers
    }

    pub fn clouds(&self) -> Option<&CloudField> {
        self.clouds.as_ref()
    }

    /// Scroll every layer to `camera_x`. Returns how many layers rebuilt tiles.
    pub fn update(&mut self, camera_x: f64, scene: &mut SceneGraph) -> usize {
        if let Some(clouds) = self.clouds.as_mut() {
            clouds.update(camera_x, scene);
        }
        self.layers
            .iter_mut()
            .map(|layer| layer.update(camera_x, scene))
            .filter(|redrawn| *redrawn)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backdrop() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let mut backdrop = Backdrop::new(&BackdropParams::default(), Seed(7), 1280.0, &mut scene, root).unwrap();
        assert_eq!(backdrop.layers().len(), 2);
        assert!(backdrop.clouds().is_some());

        assert_eq!(backdrop.update(0.0, &mut scene), 2);
        assert_eq!(backdrop.update(10.0, &mut scene), 0);

        // Paint order: clouds, far, near
        let order: Vec<SceneNodeId> = scene.children(backdrop.group()).collect();
        assert_eq!(order.len(), 3);
        assert_eq!(order[1], backdrop.layers()[0].group());
        assert_eq!(order[2], backdrop.layers()[1].group());
    }

    #[test]
    fn test_near_layer_redraws_first() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let params = BackdropParams { clouds: None, ..Default::default() };
        let mut backdrop = Backdrop::new(&params, Seed(7), 1280.0, &mut scene, root).unwrap();
        backdrop.update(0.0, &mut scene);

        // View centers: near 0.4 * 2600 + 640 = 1680 crosses 1024; far 0.15 * 2600 + 640 = 1030 stays under 1536
        assert_eq!(backdrop.update(2600.0, &mut scene), 1);
        assert_eq!(backdrop.layers()[1].base_index(), Some(1));
        assert_eq!(backdrop.layers()[0].base_index(), Some(0));
    }

    #[test]
    fn test_invalid_layer_rejected() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let mut params = BackdropParams::default();
        params.layers[1].parallax = 3.0;
        assert!(Backdrop::new(&params, Seed(7), 1280.0, &mut scene, root).is_err());
    }

    #[test]
    fn test_params_json_roundtrip() {
        let params = BackdropParams::default();
        let json = serde_json::to_string(&params).unwrap();
        let restored: BackdropParams = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, params);
    }
}
