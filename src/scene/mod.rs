//! Scene graph consumed by the renderer

pub mod flatten;
pub mod graph;
pub mod node;

pub use flatten::FlatDrawEntry;
pub use graph::SceneGraph;
pub use node::{LocalTransform, NodeContent, SceneNode, SceneNodeId};
