//! Scene graph node types
//!
//! Core types for the scene graph: node IDs, transforms, content variants, and nodes.

use crate::core::types::{DAffine2, DVec2};
use crate::render::DrawList;

/// Unique identifier for a scene graph node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneNodeId(pub u64);

/// Local transform relative to the parent node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalTransform {
    pub position: DVec2,
    /// Radians, clockwise on screen (y down).
    pub rotation: f64,
    pub scale: DVec2,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            position: DVec2::ZERO,
            rotation: 0.0,
            scale: DVec2::ONE,
        }
    }
}

impl LocalTransform {
    /// Identity transform (no translation, rotation, or scaling).
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a translation-only transform.
    pub fn from_position(position: DVec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Convert to an affine matrix: scale, then rotate, then translate.
    pub fn to_affine(&self) -> DAffine2 {
        DAffine2::from_scale_angle_translation(self.scale, self.rotation, self.position)
    }
}

/// What a scene node contains.
#[derive(Clone, Debug, Default)]
pub enum NodeContent {
    /// A grouping node with no geometry of its own.
    #[default]
    Group,

    /// Recorded drawing commands in node-local coordinates.
    Drawing(DrawList),
}

/// A single node in the scene graph.
#[derive(Clone, Debug)]
pub struct SceneNode {
    pub id: SceneNodeId,
    pub name: String,
    pub parent: Option<SceneNodeId>,
    pub children: Vec<SceneNodeId>,
    pub local_transform: LocalTransform,
    /// Cached world transform (recomputed during propagation).
    pub world_transform: DAffine2,
    pub visible: bool,
    pub content: NodeContent,
}

impl SceneNode {
    /// Create a new scene node.
    pub fn new(id: SceneNodeId, name: impl Into<String>, content: NodeContent) -> Self {
        Self {
            id,
            name: name.into(),
            parent: None,
            children: Vec::new(),
            local_transform: LocalTransform::identity(),
            world_transform: DAffine2::IDENTITY,
            visible: true,
            content,
        }
    }
}
