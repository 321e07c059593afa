/// QuadNode: one cell of the quadtree arena.
///
/// A node is either a leaf (holds entries, no children) or internal
/// (exactly four children, no entries). Children are stored by index in
/// the owning tree's node array; the parent link is a plain index used
/// for bookkeeping only.
///
/// Quadrant order is fixed: 0 = top-left `[min, mid]`, 1 = top-right,
/// 2 = bottom-left, 3 = bottom-right `[mid, max]`. `child_index` and
/// `quadrant_bounds` share this layout.

use glam::Vec2;
use crate::geometry::BoundingBox2D;
use super::draw_list::DrawListId;
use super::quad_item::QuadEntry;

pub const QUADRANT_TOP_LEFT: usize = 0;
pub const QUADRANT_TOP_RIGHT: usize = 1;
pub const QUADRANT_BOTTOM_LEFT: usize = 2;
pub const QUADRANT_BOTTOM_RIGHT: usize = 3;

/// Index of a node in the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node of every tree.
    pub const ROOT: NodeId = NodeId(0);

    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single node in the quadtree.
#[derive(Debug, Clone)]
pub struct QuadNode<K> {
    pub(crate) id: NodeId,
    pub(crate) bounds: BoundingBox2D,
    pub(crate) depth: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Option<[NodeId; 4]>,
    pub(crate) items: Vec<QuadEntry<K>>,
    pub(crate) draw_list: Option<DrawListId>,
}

impl<K> QuadNode<K> {
    pub(crate) fn new(id: NodeId, bounds: BoundingBox2D, depth: u32, parent: Option<NodeId>) -> Self {
        Self {
            id,
            bounds,
            depth,
            parent,
            children: None,
            items: Vec::new(),
            draw_list: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn bounds(&self) -> &BoundingBox2D {
        &self.bounds
    }

    /// Root = 0, child = parent + 1.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The four children in quadrant order, if subdivided.
    pub fn children(&self) -> Option<&[NodeId; 4]> {
        self.children.as_ref()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Entries held directly by this node (always empty for internal nodes).
    pub fn entries(&self) -> &[QuadEntry<K>] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Cached draw list, if `generate_lists` compiled one for this leaf.
    pub fn draw_list(&self) -> Option<DrawListId> {
        self.draw_list
    }

    /// Quadrant of `point` relative to this node's center.
    ///
    /// Points on the center lines go right / bottom.
    pub fn child_index(&self, point: Vec2) -> usize {
        let mid = self.bounds.center();
        (point.x >= mid.x) as usize | (((point.y >= mid.y) as usize) << 1)
    }

    /// Bounds of quadrant `index` (0..4) of this node.
    pub fn quadrant_bounds(&self, index: usize) -> BoundingBox2D {
        quadrant_bounds(&self.bounds, index)
    }
}

impl<K: Copy> QuadNode<K> {
    /// Handles of the entries held directly by this node.
    pub fn item_keys(&self) -> impl Iterator<Item = K> + '_ {
        self.items.iter().map(|entry| entry.key)
    }
}

/// Split `bounds` at its center and return quadrant `index`.
pub(crate) fn quadrant_bounds(bounds: &BoundingBox2D, index: usize) -> BoundingBox2D {
    let (min, max, mid) = (bounds.min(), bounds.max(), bounds.center());
    match index {
        QUADRANT_TOP_LEFT => BoundingBox2D::from_corners(min, mid),
        QUADRANT_TOP_RIGHT => BoundingBox2D::from_corners(Vec2::new(mid.x, min.y), Vec2::new(max.x, mid.y)),
        QUADRANT_BOTTOM_LEFT => BoundingBox2D::from_corners(Vec2::new(min.x, mid.y), Vec2::new(mid.x, max.y)),
        _ => BoundingBox2D::from_corners(mid, max),
    }
}

#[cfg(test)]
#[path = "quad_node_tests.rs"]
mod tests;
