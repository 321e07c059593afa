/// Cached per-leaf draw lists.
///
/// The rendering backend compiles one list per non-empty leaf through the
/// `QuadDrawer` trait; the tree only keeps the returned `DrawListId`.
/// Lists are never invalidated automatically: call `generate_lists` again
/// after inserting items or clearing the tree.
///
/// Recording a list is bracketed like a display list: `compile_list` opens
/// it, each resolved item's `QuadItem::draw_quad_item` emits into it, and
/// `end_list` closes it.

use std::hash::Hash;
use crate::geometry::{BoundingBox2D, Frustum};
use super::quad_item::QuadItem;
use super::quad_node::QuadNode;
use super::quad_tree::QuadTree;

/// Backend handle of a compiled draw list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawListId(pub u32);

/// Rendering backend used to build and replay leaf draw lists.
pub trait QuadDrawer<K> {
    /// Open a new list for the leaf holding `items`.
    fn compile_list(&mut self, items: &[K]) -> DrawListId;

    /// Close the list opened by the last `compile_list`.
    fn end_list(&mut self, _list: DrawListId) {}

    /// Replay a previously compiled list.
    fn call_list(&mut self, list: DrawListId);

    /// Release a list that is no longer referenced by any leaf.
    fn delete_list(&mut self, _list: DrawListId) {}

    /// Draw the outline of one node (debug view).
    fn draw_outline(&mut self, _bounds: &BoundingBox2D, _depth: u32) {}
}

impl<K: Copy + Eq + Hash> QuadTree<K> {
    /// (Re)compile the draw list of every non-empty leaf.
    ///
    /// Previous lists, and lists orphaned by subdivision or `clear`, are
    /// released first. Returns the number of lists compiled. No item draw
    /// hook runs; see `generate_lists_with`.
    pub fn generate_lists<D: QuadDrawer<K> + ?Sized>(&mut self, drawer: &mut D) -> usize {
        self.generate_lists_with(drawer, |_| None::<&BoundingBox2D>)
    }

    /// Like `generate_lists`, calling `draw_quad_item` on every entry of
    /// each compiled leaf that `resolve` maps back to an item.
    ///
    /// An item stored in several leaves is drawn once per leaf list.
    pub fn generate_lists_with<'a, D, I, R>(&mut self, drawer: &mut D, mut resolve: R) -> usize
    where
        D: QuadDrawer<K> + ?Sized,
        I: QuadItem + ?Sized + 'a,
        R: FnMut(K) -> Option<&'a I>,
    {
        for list in self.orphaned_lists.drain(..) {
            drawer.delete_list(list);
        }

        let mut compiled = 0;
        let mut keys = Vec::new();
        for node in self.nodes_mut() {
            if let Some(list) = node.draw_list.take() {
                drawer.delete_list(list);
            }
            if !node.is_leaf() || node.items.is_empty() {
                continue;
            }

            keys.clear();
            keys.extend(node.items.iter().map(|entry| entry.key));
            let list = drawer.compile_list(&keys);
            for &key in &keys {
                if let Some(item) = resolve(key) {
                    item.draw_quad_item();
                }
            }
            drawer.end_list(list);
            node.draw_list = Some(list);
            compiled += 1;
        }

        crate::quad_debug!("quadcull::QuadTree", "Generated {} leaf draw lists", compiled);
        compiled
    }

    /// Replay every cached leaf list.
    pub fn draw<D: QuadDrawer<K> + ?Sized>(&self, drawer: &mut D) {
        for list in self.leaves().filter_map(QuadNode::draw_list) {
            drawer.call_list(list);
        }
    }

    /// Replay the cached lists of leaves intersecting the frustum.
    pub fn draw_in_frustum<D: QuadDrawer<K> + ?Sized>(&self, frustum: &Frustum, drawer: &mut D) {
        self.visit_leaves_in_frustum(frustum, |leaf| {
            if let Some(list) = leaf.draw_list {
                drawer.call_list(list);
            }
        });
    }

    /// Draw the bounds of every node, internal ones included.
    pub fn outline<D: QuadDrawer<K> + ?Sized>(&self, drawer: &mut D) {
        for node in self.nodes() {
            drawer.draw_outline(node.bounds(), node.depth());
        }
    }
}

#[cfg(test)]
#[path = "draw_list_tests.rs"]
mod tests;
