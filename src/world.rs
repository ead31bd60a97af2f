//! World: terrain, backdrop and planted vegetation on one scene graph
//!
//! Scene layout, in paint order:
//!
//! ```text
//! root
//! ├── backdrop            screen space, parallax layers
//! └── world               translated by -camera_x
//!     ├── terrain         one node per live chunk
//!     └── vegetation      one node per planted plant
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::background::{Backdrop, BackdropParams};
use crate::core::error::ensure_positive;
use crate::core::types::DVec2;
use crate::core::Result;
use crate::math::Seed;
use crate::procgen::{PlantKind, PlantSpec, SwayAnimator};
use crate::render::Color;
use crate::scene::{LocalTransform, NodeContent, SceneGraph, SceneNodeId};
use crate::terrain::{ChunkManager, ChunkParams, TerrainGenerator, TerrainParams};

/// Complete world configuration, loadable from JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for the backdrop layers
    pub seed: Seed,
    pub terrain: TerrainParams,
    pub chunks: ChunkParams,
    pub backdrop: BackdropParams,
    /// Visible width in world units; chunks are streamed around the view center
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: Seed(42),
            terrain: TerrainParams::default(),
            chunks: ChunkParams::default(),
            backdrop: BackdropParams::default(),
            viewport_width: 1280.0,
            viewport_height: 720.0,
        }
    }
}

impl WorldConfig {
    /// Default world with every seed set to `seed`.
    pub fn with_seed(seed: impl Into<Seed>) -> Self {
        let seed = seed.into();
        let mut config = Self { seed, ..Self::default() };
        config.terrain.seed = seed;
        config
    }

    pub fn validate(&self) -> Result<()> {
        self.terrain.validate()?;
        self.chunks.validate_for(&self.terrain)?;
        self.backdrop.validate()?;
        ensure_positive("viewport_width", self.viewport_width)?;
        ensure_positive("viewport_height", self.viewport_height)?;
        Ok(())
    }

    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded world config from {}", path.display());
        Ok(config)
    }

    /// Save a config file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json_string()?)?;
        Ok(())
    }
}

/// A plant placed in the world.
#[derive(Clone, Debug)]
pub struct Planted {
    pub spec: PlantSpec,
    /// World x of the plant's root
    pub x: f64,
    pub node: SceneNodeId,
}

/// Streams terrain and backdrop around the camera and hosts plants.
pub struct World {
    config: WorldConfig,
    scene: SceneGraph,
    backdrop: Backdrop,
    world_group: SceneNodeId,
    chunks: ChunkManager,
    vegetation: SceneNodeId,
    plants: Vec<Planted>,
    sway: SwayAnimator,
    camera_x: f64,
}

impl World {
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        let mut scene = SceneGraph::new();
        let root = scene.root();

        let backdrop = Backdrop::new(&config.backdrop, config.seed, config.viewport_width, &mut scene, root)?;
        let world_group = scene.add_child(root, "world", NodeContent::Group);
        let terrain = TerrainGenerator::new(config.terrain.clone())?;
        let chunks = ChunkManager::new(terrain, config.chunks.clone(), &mut scene, world_group)?;
        let vegetation = scene.add_child(world_group, "vegetation", NodeContent::Group);

        let mut world = Self {
            config,
            scene,
            backdrop,
            world_group,
            chunks,
            vegetation,
            plants: Vec::new(),
            sway: SwayAnimator::new(),
            camera_x: 0.0,
        };
        world.update(0.0, 0.0);
        Ok(world)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn chunks(&self) -> &ChunkManager {
        &self.chunks
    }

    pub fn backdrop(&self) -> &Backdrop {
        &self.backdrop
    }

    pub fn sky_color(&self) -> Color {
        self.backdrop.sky_color()
    }

    /// World x at the left screen edge.
    pub fn camera_x(&self) -> f64 {
        self.camera_x
    }

    /// Per-frame update: move the camera, stream chunks and backdrop tiles,
    /// advance sway by `dt` seconds. `dt = 0` only re-applies the current state.
    pub fn update(&mut self, camera_x: f64, dt: f64) {
        self.camera_x = camera_x;
        self.scene.set_transform(
            self.world_group,
            LocalTransform::from_position(DVec2::new(-camera_x.round(), 0.0)),
        );
        let center = camera_x + self.config.viewport_width * 0.5;
        self.chunks.update_for_x(center, &mut self.scene);
        self.backdrop.update(camera_x, &mut self.scene);
        self.sway.tick(dt, &mut self.scene);
    }

    /// Ground y at world x; the same function the chunks are built from.
    pub fn ground_y_at(&self, x: f64) -> f64 {
        self.chunks.ground_y_at(x)
    }

    /// Generate a plant and root it on the ground at world x.
    pub fn plant(&mut self, spec: PlantSpec, x: f64) -> Result<SceneNodeId> {
        let plant = spec.generate()?;
        let root = DVec2::new(x, self.ground_y_at(x));
        let node = plant.attach(&mut self.scene, self.vegetation, root);
        self.sway.add(node, plant.sway);
        log::debug!("Planted {} at x={x:.1}", plant.kind.name());
        self.plants.push(Planted { spec, x, node });
        Ok(node)
    }

    /// Water a plant. A weed blooms into a flower bush in place; other plants
    /// are unchanged. Returns the plant's node afterwards, or `None` if
    /// `node` is not a planted plant.
    pub fn water(&mut self, node: SceneNodeId) -> Result<Option<SceneNodeId>> {
        let Some(index) = self.plants.iter().position(|p| p.node == node) else {
            return Ok(None);
        };
        if self.plants[index].spec.kind() != PlantKind::Weed {
            return Ok(Some(node));
        }
        let bloomed = self.plants[index].spec.bloomed();
        let x = self.plants[index].x;
        self.uproot(node);
        self.plant(bloomed, x).map(Some)
    }

    /// Remove a plant. Unknown nodes are ignored.
    pub fn uproot(&mut self, node: SceneNodeId) {
        if let Some(index) = self.plants.iter().position(|p| p.node == node) {
            self.plants.remove(index);
            self.sway.remove(node);
            self.scene.remove(node);
        }
    }

    pub fn planted(&self) -> &[Planted] {
        &self.plants
    }
}
