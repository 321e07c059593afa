//! Quadtree module
//!
//! Adaptive region quadtree over item handles, with point, box and frustum
//! queries (set-collecting and visitor forms) and cached per-leaf draw
//! lists.

mod draw_list;
mod quad_item;
mod quad_node;
mod quad_tree;

pub use draw_list::{DrawListId, QuadDrawer};
pub use quad_item::{ItemKey, QuadEntry, QuadItem};
pub use quad_node::{
    NodeId, QuadNode,
    QUADRANT_TOP_LEFT, QUADRANT_TOP_RIGHT, QUADRANT_BOTTOM_LEFT, QUADRANT_BOTTOM_RIGHT,
};
pub use quad_tree::{QuadTree, QuadTreeConfig, QuadTreeStats};
