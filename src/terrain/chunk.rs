//! Terrain chunks and the chunk manager
//!
//! A chunk is one `chunk_width`-wide slab of ground, filled from the sampled
//! surface down to `floor_depth` below the baseline. The manager keeps the
//! chunks within `view_distance` of the viewpoint alive, each as one drawing
//! node in the scene graph; eviction removes the node in the same call.

use serde::{Deserialize, Serialize};

use super::generator::{TerrainGenerator, TerrainParams};
use crate::core::error::ensure_positive;
use crate::core::types::DVec2;
use crate::core::{Error, Result};
use crate::math::Polygon;
use crate::render::{Color, DrawList, RenderSink};
use crate::scene::{NodeContent, SceneGraph, SceneNodeId};
use crate::streaming::{sample_span, TileCache, TileSpan, WindowUpdate};

/// Chunk layout and look.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkParams {
    /// World width of one chunk
    pub chunk_width: f64,
    /// Distance between surface samples
    pub sample_step: f64,
    /// Chunks kept on each side of the viewpoint's chunk
    pub view_distance: u32,
    /// How far below the baseline the fill extends
    pub floor_depth: f64,
    pub ground_color: Color,
    /// Thin band drawn along the surface
    pub grass_color: Color,
    pub grass_thickness: f64,
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self {
            chunk_width: 512.0,
            sample_step: 16.0,
            view_distance: 2,
            floor_depth: 1200.0,
            ground_color: Color::from_hex(0x5b4636),
            grass_color: Color::from_hex(0x4f8a3c),
            grass_thickness: 10.0,
        }
    }
}

impl ChunkParams {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("chunks.chunk_width", self.chunk_width)?;
        ensure_positive("chunks.sample_step", self.sample_step)?;
        ensure_positive("chunks.floor_depth", self.floor_depth)?;
        ensure_positive("chunks.grass_thickness", self.grass_thickness)?;
        Ok(())
    }

    /// The floor must stay below the lowest surface the terrain can reach,
    /// or chunk polygons fold over themselves.
    pub fn validate_for(&self, terrain: &TerrainParams) -> Result<()> {
        self.validate()?;
        let reach = terrain.max_displacement();
        if self.floor_depth <= reach {
            return Err(Error::config(
                "chunks.floor_depth",
                format!("{} must exceed terrain amplitude plus ripple ({reach})", self.floor_depth),
            ));
        }
        Ok(())
    }
}

/// One generated slab of ground.
#[derive(Clone, Debug)]
pub struct TerrainChunk {
    pub span: TileSpan,
    /// Surface samples, first and last on the exact chunk edges
    pub surface: Vec<DVec2>,
    /// Filled ground polygon
    pub polygon: Polygon,
    /// Scene node holding this chunk's drawing
    pub node: SceneNodeId,
}

impl TerrainChunk {
    pub fn index(&self) -> i64 {
        self.span.index
    }
}

/// Sample the surface of one chunk span.
pub fn chunk_surface(terrain: &TerrainGenerator, span: &TileSpan, step: f64) -> Vec<DVec2> {
    sample_span(span, step, |x| terrain.height_at(x))
}

/// Band of `thickness` hanging below a surface line.
fn surface_band(surface: &[DVec2], thickness: f64) -> Polygon {
    let mut points = surface.to_vec();
    points.extend(surface.iter().rev().map(|p| *p + DVec2::new(0.0, thickness)));
    Polygon::new(points)
}

/// Streams terrain chunks around a moving viewpoint.
pub struct ChunkManager {
    terrain: TerrainGenerator,
    params: ChunkParams,
    cache: TileCache<TerrainChunk>,
    /// Parent group of every chunk node
    group: SceneNodeId,
}

impl ChunkManager {
    /// Create a manager whose chunk nodes live under a new group node of `parent`.
    pub fn new(
        terrain: TerrainGenerator,
        params: ChunkParams,
        scene: &mut SceneGraph,
        parent: SceneNodeId,
    ) -> Result<Self> {
        params.validate_for(terrain.params())?;
        let cache = TileCache::new(params.chunk_width, params.view_distance)?;
        let group = scene.add_child(parent, "terrain", NodeContent::Group);
        Ok(Self { terrain, params, cache, group })
    }

    pub fn terrain(&self) -> &TerrainGenerator {
        &self.terrain
    }

    pub fn params(&self) -> &ChunkParams {
        &self.params
    }

    pub fn group(&self) -> SceneNodeId {
        self.group
    }

    /// Ground y at world x for collision. Same function the chunks sample.
    pub fn ground_y_at(&self, x: f64) -> f64 {
        self.terrain.height_at(x)
    }

    /// Bottom y of every chunk polygon.
    pub fn floor_y(&self) -> f64 {
        self.terrain.params().baseline + self.params.floor_depth
    }

    /// Generate chunks entering the window around world x and evict the
    /// ones leaving it. Evicted entries carry the released scene node.
    pub fn update_for_x(&mut self, x: f64, scene: &mut SceneGraph) -> WindowUpdate<SceneNodeId> {
        let floor = self.floor_y();
        let terrain = &self.terrain;
        let params = &self.params;
        let group = self.group;

        let update = self.cache.update(x, |span| {
            let surface = chunk_surface(terrain, &span, params.sample_step);
            let polygon = Polygon::below_profile(&surface, floor);

            let mut drawing = DrawList::new();
            drawing.fill_polygon(&polygon, params.ground_color, 1.0);
            drawing.fill_polygon(&surface_band(&surface, params.grass_thickness), params.grass_color, 1.0);

            let node = scene.add_child(group, format!("chunk {}", span.index), NodeContent::Drawing(drawing));
            TerrainChunk { span, surface, polygon, node }
        });

        for (_, chunk) in &update.evicted {
            scene.remove(chunk.node);
        }

        if !update.is_unchanged() {
            log::debug!(
                "Terrain window centered on chunk {}: +{} -{} ({} live)",
                update.center,
                update.generated.len(),
                update.evicted.len(),
                self.cache.len()
            );
        }

        WindowUpdate {
            center: update.center,
            generated: update.generated,
            evicted: update.evicted.into_iter().map(|(i, chunk)| (i, chunk.node)).collect(),
        }
    }

    /// Drop a chunk now. Absent indices are ignored.
    pub fn evict(&mut self, index: i64, scene: &mut SceneGraph) {
        if let Some(chunk) = self.cache.remove(index) {
            scene.remove(chunk.node);
        }
    }

    pub fn chunk(&self, index: i64) -> Option<&TerrainChunk> {
        self.cache.get(index)
    }

    /// Live chunk indices, ascending.
    pub fn live_indices(&self) -> Vec<i64> {
        self.cache.indices().collect()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Remove every chunk node. The group node stays.
    pub fn clear(&mut self, scene: &mut SceneGraph) {
        for (_, chunk) in self.cache.drain() {
            scene.remove(chunk.node);
        }
    }
}
