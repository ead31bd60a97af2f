//! Parallax mountain layers
//!
//! Each layer scrolls at a fraction of the camera speed and keeps a window of
//! world-aligned tiles (previous, current, next) in a `TileCache`. Tiles are
//! rebuilt only when the current tile index changes; between crossings an
//! update just moves the tile nodes.
//!
//! Layer space: a layer offset of `-scroll * parallax` maps layer-space x to
//! screen x as `screen = x + offset`. The current tile is the one under the
//! view center, `floor((viewport_width / 2 - offset) / tile_width)`. The window
//! holds one tile on each side, more when half the viewport is wider than a
//! tile, so the whole screen is always covered.

use serde::{Deserialize, Serialize};

use super::mountains::Ridge;
use crate::core::error::{ensure_finite, ensure_in_range, ensure_positive};
use crate::core::types::DVec2;
use crate::core::{Error, Result};
use crate::math::{Polygon, Seed};
use crate::render::{Color, DrawList, RenderSink};
use crate::scene::{LocalTransform, NodeContent, SceneGraph, SceneNodeId};
use crate::streaming::{TileCache, TileSpan};

/// One parallax mountain layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerParams {
    pub name: String,
    /// Fraction of camera motion applied to this layer, 0 = fixed, 1 = moves with the ground
    pub parallax: f64,
    pub color: Color,
    /// Peaks per tile
    pub peak_count: u32,
    /// Minimum ridge height as a fraction of `peak_height`
    pub vertical_bias: f64,
    /// Layer-space width of one tile. Independent of the viewport size.
    pub tile_width: f64,
    /// Screen y of the ridge foot
    pub base_y: f64,
    pub peak_height: f64,
    /// How far the fill extends below `base_y`
    pub skirt: f64,
    pub sample_step: f64,
    pub octaves: u32,
}

impl Default for LayerParams {
    fn default() -> Self {
        Self {
            name: "mountains".to_string(),
            parallax: 0.3,
            color: Color::from_hex(0x7d8fa8),
            peak_count: 3,
            vertical_bias: 0.25,
            tile_width: 1024.0,
            base_y: 420.0,
            peak_height: 220.0,
            skirt: 600.0,
            sample_step: 16.0,
            octaves: 4,
        }
    }
}

impl LayerParams {
    pub fn validate(&self) -> Result<()> {
        ensure_in_range("layer.parallax", self.parallax, 0.0, 1.0)?;
        ensure_in_range("layer.vertical_bias", self.vertical_bias, 0.0, 1.0)?;
        ensure_positive("layer.tile_width", self.tile_width)?;
        if self.tile_width.fract() != 0.0 {
            return Err(Error::config(
                "layer.tile_width",
                format!("must be a whole number of pixels, got {}", self.tile_width),
            ));
        }
        ensure_finite("layer.base_y", self.base_y)?;
        ensure_positive("layer.peak_height", self.peak_height)?;
        ensure_positive("layer.skirt", self.skirt)?;
        ensure_positive("layer.sample_step", self.sample_step)?;
        if self.peak_count == 0 {
            return Err(Error::config("layer.peak_count", "must be >= 1"));
        }
        if self.octaves == 0 || self.octaves > 8 {
            return Err(Error::config("layer.octaves", format!("must lie in 1..=8, got {}", self.octaves)));
        }
        Ok(())
    }
}

/// A live tile of a parallax layer.
#[derive(Clone, Debug)]
pub struct ParallaxTile {
    pub span: TileSpan,
    /// Silhouette relative to the tile's left edge
    pub polygon: Polygon,
    pub node: SceneNodeId,
}

/// Screen offset of a layer for a camera scroll.
pub fn layer_offset(scroll: f64, parallax: f64) -> f64 {
    -scroll * parallax
}

/// Scrolling, tiled mountain silhouette.
pub struct ParallaxLayer {
    params: LayerParams,
    ridge: Ridge,
    tiles: TileCache<ParallaxTile>,
    group: SceneNodeId,
    viewport_width: f64,
    /// Tile index the live tiles are anchored to
    base_index: Option<i64>,
    offset: f64,
}

impl ParallaxLayer {
    /// Build a layer for a screen `viewport_width` pixels wide. Tile nodes
    /// go under a new group node of `parent`.
    pub fn new(
        params: LayerParams,
        seed: Seed,
        viewport_width: f64,
        scene: &mut SceneGraph,
        parent: SceneNodeId,
    ) -> Result<Self> {
        params.validate()?;
        ensure_positive("viewport_width", viewport_width)?;
        let view_distance = (viewport_width * 0.5 / params.tile_width).ceil().max(1.0) as u32;
        let ridge = Ridge::new(&params, seed);
        let tiles = TileCache::new(params.tile_width, view_distance)?;
        let group = scene.add_child(parent, params.name.clone(), NodeContent::Group);
        Ok(Self {
            params,
            ridge,
            tiles,
            group,
            viewport_width,
            base_index: None,
            offset: 0.0,
        })
    }

    pub fn params(&self) -> &LayerParams {
        &self.params
    }

    pub fn group(&self) -> SceneNodeId {
        self.group
    }

    pub fn base_index(&self) -> Option<i64> {
        self.base_index
    }

    /// Current layer offset in screen units.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn tile(&self, index: i64) -> Option<&ParallaxTile> {
        self.tiles.get(index)
    }

    /// Live tile indices, ascending.
    pub fn live_indices(&self) -> Vec<i64> {
        self.tiles.indices().collect()
    }

    /// Ridge y at layer-space x.
    pub fn ridge_y_at(&self, x: f64) -> f64 {
        self.ridge.y_at(x)
    }

    /// Scroll the layer. Returns true if tiles were rebuilt.
    pub fn update(&mut self, scroll: f64, scene: &mut SceneGraph) -> bool {
        self.offset = layer_offset(scroll, self.params.parallax);
        let view_x = self.viewport_width * 0.5 - self.offset;
        let index = self.tiles.index_for(view_x);

        let redrawn = self.base_index != Some(index);
        if redrawn {
            let ridge = &self.ridge;
            let params = &self.params;
            let group = self.group;
            let update = self.tiles.update(view_x, |span| {
                let polygon = ridge.tile_polygon(&span, params.sample_step);
                let local = Polygon::new(
                    polygon.points.iter().map(|p| DVec2::new(p.x - span.start, p.y)).collect(),
                );
                let mut drawing = DrawList::new();
                drawing.fill_polygon(&local, params.color, 1.0);
                let node = scene.add_child(group, format!("{} tile {}", params.name, span.index), NodeContent::Drawing(drawing));
                ParallaxTile { span, polygon: local, node }
            });
            for (_, tile) in &update.evicted {
                scene.remove(tile.node);
            }
            log::debug!(
                "Layer '{}' anchored to tile {} (+{} -{})",
                self.params.name,
                index,
                update.generated.len(),
                update.evicted.len()
            );
            self.base_index = Some(index);
        }

        // Tile starts are whole pixels, so rounding the offset once keeps
        // neighbours exactly one tile width apart.
        let shift = self.offset.round();
        for (_, tile) in self.tiles.iter() {
            let x = tile.span.start + shift;
            scene.set_transform(tile.node, LocalTransform::from_position(DVec2::new(x, 0.0)));
        }
        redrawn
    }

    /// Remove every tile node.
    pub fn clear(&mut self, scene: &mut SceneGraph) {
        for (_, tile) in self.tiles.drain() {
            scene.remove(tile.node);
        }
        self.base_index = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: f64 = 800.0;

    fn layer(scene: &mut SceneGraph, parallax: f64) -> ParallaxLayer {
        let params = LayerParams {
            parallax,
            tile_width: 800.0,
            sample_step: 20.0,
            ..Default::default()
        };
        let root = scene.root();
        ParallaxLayer::new(params, Seed(3), VIEWPORT, scene, root).unwrap()
    }

    /// Screen x range spanned by the live tile nodes.
    fn covered(l: &ParallaxLayer, scene: &SceneGraph) -> (f64, f64) {
        let width = l.params().tile_width;
        l.live_indices().iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
            let x = scene.position(l.tile(i).unwrap().node).unwrap().x;
            (lo.min(x), hi.max(x + width))
        })
    }

    #[test]
    fn test_rejects_bad_params() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        for params in [
            LayerParams { parallax: 1.5, ..Default::default() },
            LayerParams { parallax: -0.1, ..Default::default() },
            LayerParams { tile_width: 0.0, ..Default::default() },
            LayerParams { tile_width: 1000.5, ..Default::default() },
            LayerParams { peak_count: 0, ..Default::default() },
            LayerParams { sample_step: f64::INFINITY, ..Default::default() },
        ] {
            assert!(ParallaxLayer::new(params, Seed(1), VIEWPORT, &mut scene, root).is_err());
        }
        assert!(ParallaxLayer::new(LayerParams::default(), Seed(1), 0.0, &mut scene, root).is_err());
    }

    #[test]
    fn test_three_slots_around_current() {
        let mut scene = SceneGraph::new();
        let mut l = layer(&mut scene, 0.5);
        assert!(l.update(0.0, &mut scene));
        assert_eq!(l.base_index(), Some(0));
        assert_eq!(l.live_indices(), vec![-1, 0, 1]);
        assert_eq!(scene.children(l.group()).count(), 3);
    }

    #[test]
    fn test_redraw_only_on_tile_crossing() {
        let mut scene = SceneGraph::new();
        let mut l = layer(&mut scene, 0.5);
        assert!(l.update(0.0, &mut scene));
        let node = l.tile(0).unwrap().node;

        // view center 450, 750: same tile
        assert!(!l.update(100.0, &mut scene));
        assert!(!l.update(700.0, &mut scene));
        assert_eq!(l.tile(0).unwrap().node, node);

        // view center 850: next tile
        assert!(l.update(900.0, &mut scene));
        assert_eq!(l.base_index(), Some(1));
        assert_eq!(l.live_indices(), vec![0, 1, 2]);
        // Tile 0 stayed live and was not rebuilt
        assert_eq!(l.tile(0).unwrap().node, node);
        assert_eq!(scene.node_count(), 2 + 3);
    }

    #[test]
    fn test_scrolling_backwards() {
        let mut scene = SceneGraph::new();
        let mut l = layer(&mut scene, 1.0);
        l.update(0.0, &mut scene);
        // view center -10
        assert!(l.update(-410.0, &mut scene));
        assert_eq!(l.live_indices(), vec![-2, -1, 0]);
    }

    #[test]
    fn test_window_tracks_monotonic_scroll() {
        let mut scene = SceneGraph::new();
        let mut l = layer(&mut scene, 0.35);
        let mut scroll = 0.0;
        while scroll < 20_000.0 {
            l.update(scroll, &mut scene);
            let index = ((scroll * 0.35 + VIEWPORT / 2.0) / 800.0).floor() as i64;
            assert_eq!(l.live_indices(), vec![index - 1, index, index + 1]);
            assert_eq!(scene.node_count(), 2 + 3);
            scroll += 123.4;
        }
    }

    #[test]
    fn test_tiles_cover_viewport() {
        for (tile_width, viewport, slots) in [(800.0, 800.0, 3), (1024.0, 1280.0, 3), (600.0, 2000.0, 5)] {
            let mut scene = SceneGraph::new();
            let root = scene.root();
            let params = LayerParams { parallax: 0.45, tile_width, ..Default::default() };
            let mut l = ParallaxLayer::new(params, Seed(8), viewport, &mut scene, root).unwrap();
            let mut scroll = -7_000.0;
            while scroll < 15_000.0 {
                l.update(scroll, &mut scene);
                assert_eq!(l.live_indices().len(), slots);
                let (left, right) = covered(&l, &scene);
                assert!(left <= 0.0 && right >= viewport, "scroll {scroll}: [{left}, {right}) of {viewport}");
                scroll += 97.3;
            }
        }
    }

    #[test]
    fn test_tiles_positioned_on_integer_offsets() {
        let mut scene = SceneGraph::new();
        let mut l = layer(&mut scene, 0.37);
        l.update(1234.5, &mut scene);
        let offset = l.offset();
        for index in l.live_indices() {
            let tile = l.tile(index).unwrap();
            let position = scene.position(tile.node).unwrap();
            assert_eq!(position.x.fract(), 0.0);
            assert_eq!(position.x, index as f64 * 800.0 + offset.round());
        }
        // Neighbouring tiles butt exactly one tile width apart
        let p0 = scene.position(l.tile(0).unwrap().node).unwrap();
        let p1 = scene.position(l.tile(1).unwrap().node).unwrap();
        assert_eq!(p1.x - p0.x, 800.0);
    }

    #[test]
    fn test_adjacent_tiles_meet_at_shared_edge() {
        let mut scene = SceneGraph::new();
        let mut l = layer(&mut scene, 0.5);
        l.update(0.0, &mut scene);
        let left = l.tile(0).unwrap();
        let right = l.tile(1).unwrap();
        // Local polygons: profile first, then the two floor corners
        let left_edge = left.polygon.points[left.polygon.len() - 3];
        let right_edge = right.polygon.points[0];
        assert_eq!(left_edge.x, 800.0);
        assert_eq!(right_edge.x, 0.0);
        assert_eq!(left_edge.y, right_edge.y);
        assert_eq!(left_edge.y, l.ridge_y_at(800.0));
    }

    #[test]
    fn test_static_layer_never_redraws() {
        let mut scene = SceneGraph::new();
        let mut l = layer(&mut scene, 0.0);
        assert!(l.update(0.0, &mut scene));
        for scroll in [500.0, 5_000.0, -50_000.0] {
            assert!(!l.update(scroll, &mut scene));
        }
    }

    #[test]
    fn test_clear_releases_tiles() {
        let mut scene = SceneGraph::new();
        let mut l = layer(&mut scene, 0.5);
        l.update(0.0, &mut scene);
        l.clear(&mut scene);
        assert_eq!(scene.node_count(), 2);
        assert!(l.update(0.0, &mut scene));
    }
}
