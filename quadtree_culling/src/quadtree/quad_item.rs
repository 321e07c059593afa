/// Item capability consumed by the quadtree.
///
/// The tree never owns items. It stores a copyable handle per leaf
/// reference together with the bounds the item had when it was inserted.
/// The caller owns the items themselves, typically in a
/// `SlotMap<ItemKey, T>`.

use slotmap::new_key_type;
use crate::geometry::BoundingBox2D;

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Default handle type for items stored in a QuadTree.
    ///
    /// Keys stay valid while other items come and go in the caller's
    /// SlotMap, which makes them safe non-owning references.
    pub struct ItemKey;
}

// ===== QUAD ITEM =====

/// Anything that can be placed in a QuadTree.
pub trait QuadItem {
    /// 2D bounds used to route the item to leaves.
    fn quad_item_bounds(&self) -> BoundingBox2D;

    /// Emit the item's geometry into the draw list being compiled.
    ///
    /// Called by `QuadTree::generate_lists_with` for every entry of a leaf,
    /// between the drawer's `compile_list` and `end_list`.
    fn draw_quad_item(&self) {}
}

impl QuadItem for BoundingBox2D {
    fn quad_item_bounds(&self) -> BoundingBox2D {
        *self
    }
}

/// One leaf reference: the item handle and its bounds at insertion time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadEntry<K> {
    pub key: K,
    pub bounds: BoundingBox2D,
}
