//! Flattened scene graph output for rendering.
//!
//! `FlatDrawEntry` is the result of walking the scene graph: one entry per
//! visible drawing node, in paint order, with its resolved world transform.

use crate::core::types::DAffine2;
use crate::render::DrawList;

use super::node::SceneNodeId;

/// One entry in the flattened visible set.
#[derive(Clone, Debug)]
pub struct FlatDrawEntry<'a> {
    pub node: SceneNodeId,
    /// Node-local to world transform.
    pub transform: DAffine2,
    pub drawing: &'a DrawList,
}
