//! Procedural plants
//!
//! Trees, weeds and flower bushes all run the same pipeline: grow a branch
//! skeleton, extract shell polygons, place leaf clusters, optionally place a
//! blossom layer, then sample sway. Only the parameter presets differ.
//!
//! A `PlantSpec` (seed + params) is the persistence unit: regenerating from a
//! deserialized spec yields the same plant.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::canopy::{place_canopy, Canopy, CanopyParams};
use super::shell::{extract_shells, Shell};
use super::skeleton::{Skeleton, SkeletonBuilder, SkeletonParams};
use super::sway::{Sway, SwayParams};
use crate::core::types::DVec2;
use crate::core::Result;
use crate::math::{Aabb, Rng, Seed};
use crate::render::{Color, DrawList, RenderSink};
use crate::scene::{LocalTransform, NodeContent, SceneGraph, SceneNodeId};

/// Plant style preset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantKind {
    #[default]
    Tree,
    Weed,
    FlowerBush,
}

impl PlantKind {
    pub fn name(self) -> &'static str {
        match self {
            PlantKind::Tree => "tree",
            PlantKind::Weed => "weed",
            PlantKind::FlowerBush => "flower_bush",
        }
    }
}

/// Parameters for the whole plant pipeline
///
/// Deserializing fills every missing field from the preset of the given
/// `kind` (tree when absent), nested tables included.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlantParams {
    pub kind: PlantKind,
    pub skeleton: SkeletonParams,
    pub bark_color: Color,
    pub leaves: CanopyParams,
    /// Petal layer drawn over the leaves
    pub blossoms: Option<CanopyParams>,
    pub sway: SwayParams,
}

impl Default for PlantParams {
    fn default() -> Self {
        Self::tree()
    }
}

impl PlantParams {
    /// Tall branching tree with a full leaf crown
    pub fn tree() -> Self {
        Self {
            kind: PlantKind::Tree,
            skeleton: SkeletonParams::default(),
            bark_color: Color::from_hex(0x5a3d26),
            leaves: CanopyParams::default(),
            blossoms: None,
            sway: SwayParams::default(),
        }
    }

    /// Short scraggly stem with a few small leaves
    pub fn weed() -> Self {
        Self {
            kind: PlantKind::Weed,
            skeleton: SkeletonParams {
                trunk_length: 26.0,
                trunk_thickness: 3.0,
                trunk_lean: 0.25,
                max_depth: 2,
                branch_factor: 2,
                extra_branch_chance: 0.1,
                length_decay: (0.5, 0.9),
                thickness_decay: (0.85, 0.95),
                min_thickness: 0.6,
                spread: 0.6,
                angle_jitter: 0.12,
                segment_length: 5.0,
                min_child_length: 4.0,
                min_branch_height: 6.0,
                upward_band: 1.3,
                band_reflect: 0.5,
                twig_chance: 0.1,
                twig_length: 0.4,
            },
            bark_color: Color::from_hex(0x5d7a2e),
            leaves: CanopyParams {
                color: Color::from_hex(0x6b8f2a),
                crown_scatter: 1,
                crown_radius: 6.0,
                blobs: (3, 4),
                blob_radius: (2.0, 4.0),
                anchor_chance: 0.8,
                ..CanopyParams::default()
            },
            blossoms: None,
            sway: SwayParams {
                amplitude: (0.04, 0.08),
                frequency: (0.5, 0.9),
            },
        }
    }

    /// Low round bush covered in blossoms
    pub fn flower_bush() -> Self {
        Self {
            kind: PlantKind::FlowerBush,
            skeleton: SkeletonParams {
                trunk_length: 34.0,
                trunk_thickness: 5.0,
                trunk_lean: 0.15,
                max_depth: 3,
                branch_factor: 3,
                extra_branch_chance: 0.3,
                length_decay: (0.55, 0.9),
                thickness_decay: (0.88, 0.96),
                min_thickness: 0.7,
                spread: 0.7,
                angle_jitter: 0.08,
                segment_length: 6.0,
                min_child_length: 5.0,
                min_branch_height: 8.0,
                upward_band: 1.35,
                band_reflect: 0.5,
                twig_chance: 0.2,
                twig_length: 0.35,
            },
            bark_color: Color::from_hex(0x4e6b2c),
            leaves: CanopyParams {
                color: Color::from_hex(0x47873a),
                crown_scatter: 3,
                crown_radius: 14.0,
                blobs: (3, 6),
                blob_radius: (4.0, 7.0),
                ..CanopyParams::default()
            },
            blossoms: Some(CanopyParams {
                color: Color::from_hex(0xe86fa8),
                crown_scatter: 4,
                crown_radius: 16.0,
                blobs: (3, 5),
                blob_radius: (2.0, 3.5),
                blob_offset: 1.6,
                alpha: (0.8, 1.0),
                soft_edge_scale: 1.2,
                soft_edge_alpha: 0.25,
                anchor_chance: 0.9,
            }),
            sway: SwayParams {
                amplitude: (0.02, 0.05),
                frequency: (0.3, 0.6),
            },
        }
    }

    pub fn for_kind(kind: PlantKind) -> Self {
        match kind {
            PlantKind::Tree => Self::tree(),
            PlantKind::Weed => Self::weed(),
            PlantKind::FlowerBush => Self::flower_bush(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.skeleton.validate()?;
        self.leaves.validate()?;
        if let Some(blossoms) = &self.blossoms {
            blossoms.validate()?;
        }
        self.sway.validate()?;
        Ok(())
    }
}

/// Recursively write `overrides` over `base`. Objects merge key by key;
/// anything else replaces.
fn overlay(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                overlay(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (base, overrides) => *base = overrides,
    }
}

impl<'de> Deserialize<'de> for PlantParams {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let overrides = Value::deserialize(deserializer)?;
        if !overrides.is_object() {
            return Err(D::Error::custom("plant params must be a table"));
        }
        let kind = match overrides.get("kind") {
            Some(kind) => PlantKind::deserialize(kind).map_err(D::Error::custom)?,
            None => PlantKind::default(),
        };

        let mut merged = serde_json::to_value(Self::for_kind(kind)).map_err(D::Error::custom)?;
        overlay(&mut merged, overrides);

        Ok(Self {
            kind,
            skeleton: SkeletonParams::deserialize(&merged["skeleton"]).map_err(D::Error::custom)?,
            bark_color: Color::deserialize(&merged["bark_color"]).map_err(D::Error::custom)?,
            leaves: CanopyParams::deserialize(&merged["leaves"]).map_err(D::Error::custom)?,
            blossoms: Option::<CanopyParams>::deserialize(&merged["blossoms"]).map_err(D::Error::custom)?,
            sway: SwayParams::deserialize(&merged["sway"]).map_err(D::Error::custom)?,
        })
    }
}

/// Everything needed to rebuild a plant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlantSpec {
    pub seed: Seed,
    #[serde(default)]
    pub params: PlantParams,
}

impl PlantSpec {
    pub fn new(seed: impl Into<Seed>, params: PlantParams) -> Self {
        Self { seed: seed.into(), params }
    }

    pub fn tree(seed: impl Into<Seed>) -> Self {
        Self::new(seed, PlantParams::tree())
    }

    pub fn weed(seed: impl Into<Seed>) -> Self {
        Self::new(seed, PlantParams::weed())
    }

    pub fn flower_bush(seed: impl Into<Seed>) -> Self {
        Self::new(seed, PlantParams::flower_bush())
    }

    pub fn kind(&self) -> PlantKind {
        self.params.kind
    }

    /// A watered weed turns into a flower bush grown from the same seed.
    /// Other kinds are returned unchanged.
    pub fn bloomed(&self) -> Self {
        match self.params.kind {
            PlantKind::Weed => Self::flower_bush(self.seed),
            _ => self.clone(),
        }
    }

    /// Validate and generate in one step.
    pub fn generate(&self) -> Result<Plant> {
        Ok(PlantGenerator::new(self.clone())?.generate())
    }
}

/// Generated plant geometry, rooted at the origin and growing toward -y.
#[derive(Clone, Debug, PartialEq)]
pub struct Plant {
    pub kind: PlantKind,
    pub skeleton: Skeleton,
    pub shells: Vec<Shell>,
    pub bark_color: Color,
    pub leaves: Canopy,
    pub blossoms: Option<Canopy>,
    pub sway: Sway,
}

impl Plant {
    /// Draw bark shells, then leaves, then blossoms.
    pub fn draw(&self, sink: &mut dyn RenderSink) {
        for shell in &self.shells {
            sink.fill_polygon(&shell.polygon(), self.bark_color, 1.0);
        }
        self.leaves.draw(sink);
        if let Some(blossoms) = &self.blossoms {
            blossoms.draw(sink);
        }
    }

    /// Record the plant into a fresh draw list.
    pub fn drawing(&self) -> DrawList {
        let mut list = DrawList::new();
        self.draw(&mut list);
        list
    }

    pub fn bounds(&self) -> Aabb {
        let mut bounds = self.skeleton.bounds().merged(&self.leaves.bounds());
        if let Some(blossoms) = &self.blossoms {
            bounds = bounds.merged(&blossoms.bounds());
        }
        bounds
    }

    /// Add the plant as one drawing node under `parent`, rooted at `position`.
    pub fn attach(&self, scene: &mut SceneGraph, parent: SceneNodeId, position: DVec2) -> SceneNodeId {
        let node = scene.add_child(parent, self.kind.name(), NodeContent::Drawing(self.drawing()));
        scene.set_transform(node, LocalTransform::from_position(position));
        node
    }
}

/// Runs the plant pipeline for one spec.
pub struct PlantGenerator {
    spec: PlantSpec,
}

impl PlantGenerator {
    /// Validates the plant params up front, so `generate` cannot fail.
    pub fn new(spec: PlantSpec) -> Result<Self> {
        spec.params.validate()?;
        Ok(Self { spec })
    }

    pub fn spec(&self) -> &PlantSpec {
        &self.spec
    }

    /// Build the plant. Each call starts a fresh stream from the seed.
    pub fn generate(&self) -> Plant {
        let params = &self.spec.params;
        let mut rng = Rng::new(self.spec.seed);

        let skeleton = SkeletonBuilder::new(&params.skeleton).build(&mut rng);
        let shells = extract_shells(&skeleton.paths);
        let crown = skeleton.crown();
        let leaves = place_canopy(&mut rng, &skeleton.anchors, crown, &params.leaves);
        let blossoms = params
            .blossoms
            .as_ref()
            .map(|b| place_canopy(&mut rng, &skeleton.anchors, crown, b));
        let sway = Sway::sample(&mut rng, &params.sway);

        log::debug!(
            "Generated {} (seed {}): {} paths, {} leaf blobs",
            params.kind.name(),
            self.spec.seed.0,
            skeleton.path_count(),
            leaves.blob_count()
        );

        Plant {
            kind: params.kind,
            skeleton,
            shells,
            bark_color: params.bark_color,
            leaves,
            blossoms,
            sway,
        }
    }
}
