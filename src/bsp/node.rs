//! BSP tree node and tree data structures.

use crate::brush::{Brush, Side};
use crate::float_types::parry3d::bounding_volume::Aabb;
use crate::game::ContentFlags;
use crate::plane::PlaneHandle;

/// One cell of the BSP tree. An interior node carries a splitting plane and
/// two children; a leaf carries the contents of the volume it encloses.
#[derive(Debug, Default)]
pub struct Node {
    /// Splitting plane (always positive-facing), or `None` for a leaf.
    pub plane: Option<PlaneHandle>,
    /// The winning side the splitter was taken from.
    pub side: Option<Side>,
    pub front: Option<Box<Node>>,
    pub back: Option<Box<Node>>,
    /// The sub-region of space this node represents, as a brush. Created at
    /// the root from the grown world bounds and halved at each split.
    pub volume: Option<Brush>,
    /// Leaf contents, combined through the game adapter.
    pub contents: ContentFlags,
    /// Source indices of the brushes that survived into this leaf.
    pub original_brushes: Vec<usize>,
    /// Splitter came from a non-structural pass; not needed for visibility.
    pub detail_separator: bool,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.plane.is_none()
    }
}

/// A built tree: the root node plus the overall input bounds.
#[derive(Debug)]
pub struct Tree {
    pub head: Node,
    pub bounds: Aabb,
}
