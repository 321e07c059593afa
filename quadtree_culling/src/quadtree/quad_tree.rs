/// QuadTree: adaptive region quadtree for per-frame culling queries.
///
/// Leaves hold entries until they exceed `max_node_items`; the next
/// insertion then splits the leaf into four quadrants in one shot and
/// redistributes its entries. An item straddling quadrant boundaries is
/// referenced by every leaf it overlaps. Leaves at `max_node_depth` never
/// split.
///
/// Queries prune whole subtrees by node bounds and report every entry of
/// each reached leaf without re-testing the entry's own bounds. Callers that
/// need exact hits re-check `item_bounds` themselves.
///
/// There is no removal or move: rebuild (`clear` + re-insert) when items
/// change.

use std::hash::Hash;
use glam::Vec2;
use rustc_hash::{FxHashMap, FxHashSet};
use crate::error::{log_and_return_error, Error, Result};
use crate::geometry::{BoundingBox2D, Frustum, FrustumTest};
use super::draw_list::DrawListId;
use super::quad_item::{ItemKey, QuadEntry, QuadItem};
use super::quad_node::{quadrant_bounds, NodeId, QuadNode};

const SOURCE: &str = "quadcull::QuadTree";

// ===== CONFIG =====

/// Construction-time configuration of a QuadTree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadTreeConfig {
    /// Root bounds. Items that do not overlap them are dropped.
    pub bounds: BoundingBox2D,
    /// Leaves at this depth never subdivide (root = 0)
    pub max_node_depth: u32,
    /// Leaf capacity; one more insertion triggers subdivision
    pub max_node_items: usize,
    /// World z of the tree plane when tested against a 3D frustum
    pub elevation: f32,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            bounds: BoundingBox2D::from_corners(Vec2::splat(-1024.0), Vec2::splat(1024.0)),
            max_node_depth: 8,
            max_node_items: 16,
            elevation: 0.0,
        }
    }
}

impl QuadTreeConfig {
    /// Default thresholds over the given root bounds.
    pub fn new(bounds: BoundingBox2D) -> Self {
        Self { bounds, ..Self::default() }
    }

    pub fn with_max_node_depth(mut self, max_node_depth: u32) -> Self {
        self.max_node_depth = max_node_depth;
        self
    }

    pub fn with_max_node_items(mut self, max_node_items: usize) -> Self {
        self.max_node_items = max_node_items;
        self
    }

    pub fn with_elevation(mut self, elevation: f32) -> Self {
        self.elevation = elevation;
        self
    }

    /// Check the thresholds and bounds.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidBounds` if the root bounds are empty or have no area
    /// - `Error::InvalidConfig` if depth or capacity is zero
    pub fn validate(&self) -> Result<()> {
        if !self.bounds.is_initialized() {
            return Err(Error::InvalidBounds("root bounds are empty".to_string()));
        }
        if !(self.bounds.area() > 0.0) {
            return Err(Error::InvalidBounds(format!(
                "root bounds have no area ({} x {})",
                self.bounds.width(),
                self.bounds.height()
            )));
        }
        if self.max_node_depth == 0 {
            return Err(Error::InvalidConfig("max_node_depth must be at least 1".to_string()));
        }
        if self.max_node_items == 0 {
            return Err(Error::InvalidConfig("max_node_items must be at least 1".to_string()));
        }
        Ok(())
    }
}

// ===== STATS =====

/// Snapshot of the tree counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuadTreeStats {
    /// Leaf references currently stored
    pub item_count: usize,
    /// Live nodes
    pub node_count: usize,
    /// Cumulative `add_item` calls
    pub unique_item_count: usize,
    pub leaf_count: usize,
    pub max_depth_reached: u32,
}

/// Per-handle bookkeeping: last inserted bounds and leaf fan-out.
#[derive(Debug, Clone, Copy)]
struct ItemRecord {
    bounds: BoundingBox2D,
    node_count: u32,
}

// ===== QUAD TREE =====

/// Adaptive region quadtree over item handles `K`.
#[derive(Debug)]
pub struct QuadTree<K = ItemKey> {
    /// Node arena; index 0 is the root
    nodes: Vec<QuadNode<K>>,
    config: QuadTreeConfig,
    /// Fan-out and bounds per handle
    records: FxHashMap<K, ItemRecord>,
    item_count: usize,
    node_count: usize,
    unique_item_count: usize,
    /// Lists owned by nodes that stopped being leaves or were destroyed;
    /// released on the next `generate_lists`
    pub(crate) orphaned_lists: Vec<DrawListId>,
}

impl<K: Copy + Eq + Hash> QuadTree<K> {
    /// Create a tree over `bounds` with the given thresholds.
    ///
    /// Thresholds are not validated: zero capacity subdivides down to
    /// `max_depth` on every insertion. See `try_with_config`.
    pub fn new(bounds: BoundingBox2D, max_depth: u32, max_items: usize) -> Self {
        Self::with_config(
            QuadTreeConfig::new(bounds)
                .with_max_node_depth(max_depth)
                .with_max_node_items(max_items),
        )
    }

    /// Create a tree from a full configuration (unchecked).
    pub fn with_config(config: QuadTreeConfig) -> Self {
        crate::quad_debug!(
            SOURCE,
            "Created quadtree: bounds {:?}..{:?}, max depth {}, max items {}",
            config.bounds.min(),
            config.bounds.max(),
            config.max_node_depth,
            config.max_node_items
        );

        Self {
            nodes: vec![QuadNode::new(NodeId::ROOT, config.bounds, 0, None)],
            config,
            records: FxHashMap::default(),
            item_count: 0,
            node_count: 1,
            unique_item_count: 0,
            orphaned_lists: Vec::new(),
        }
    }

    /// Validating form of `with_config`.
    ///
    /// # Errors
    ///
    /// Returns (and logs) the error from `QuadTreeConfig::validate`.
    pub fn try_with_config(config: QuadTreeConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|error| log_and_return_error(SOURCE, error))?;
        Ok(Self::with_config(config))
    }

    // ===== ACCESSORS =====

    pub fn config(&self) -> &QuadTreeConfig {
        &self.config
    }

    pub fn bounds(&self) -> &BoundingBox2D {
        &self.config.bounds
    }

    /// Leaf references currently stored (straddling items count once per leaf).
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of `add_item` calls since construction (never decreases).
    pub fn unique_item_count(&self) -> usize {
        self.unique_item_count
    }

    pub fn root(&self) -> &QuadNode<K> {
        &self.nodes[NodeId::ROOT.0]
    }

    pub fn node(&self, id: NodeId) -> Option<&QuadNode<K>> {
        self.nodes.get(id.0)
    }

    /// All live nodes in arena order (parents before children).
    pub fn nodes(&self) -> impl Iterator<Item = &QuadNode<K>> {
        self.nodes.iter()
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut QuadNode<K>> {
        self.nodes.iter_mut()
    }

    pub fn leaves(&self) -> impl Iterator<Item = &QuadNode<K>> {
        self.nodes.iter().filter(|node| node.is_leaf())
    }

    /// Deepest node depth currently present.
    pub fn depth(&self) -> u32 {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }

    /// How many leaves currently reference `key` (0 if none).
    pub fn node_count_of(&self, key: K) -> u32 {
        self.records.get(&key).map_or(0, |record| record.node_count)
    }

    /// Bounds `key` was last inserted with.
    pub fn item_bounds(&self, key: K) -> Option<BoundingBox2D> {
        self.records.get(&key).map(|record| record.bounds)
    }

    pub fn stats(&self) -> QuadTreeStats {
        QuadTreeStats {
            item_count: self.item_count,
            node_count: self.node_count,
            unique_item_count: self.unique_item_count,
            leaf_count: self.leaves().count(),
            max_depth_reached: self.depth(),
        }
    }

    // ===== INSERTION =====

    /// Insert an item under handle `key`.
    ///
    /// Items whose bounds miss the root bounds are dropped (logged at warn).
    /// Inserting an existing handle again adds new references; it does not
    /// move the old ones.
    pub fn add_item<I: QuadItem + ?Sized>(&mut self, key: K, item: &I) {
        self.unique_item_count += 1;
        let bounds = item.quad_item_bounds();

        if !self.nodes[NodeId::ROOT.0].bounds.overlaps(&bounds) {
            crate::quad_warn!(
                SOURCE,
                "Dropped item with bounds {:?}..{:?}: outside root bounds",
                bounds.min(),
                bounds.max()
            );
            return;
        }

        self.records
            .entry(key)
            .and_modify(|record| record.bounds = bounds)
            .or_insert(ItemRecord { bounds, node_count: 0 });

        self.insert_into(NodeId::ROOT, QuadEntry { key, bounds });
    }

    /// A node takes entries directly while it is a leaf with room, or a
    /// leaf that reached the depth cap.
    fn allow_more_items(&self, id: NodeId) -> bool {
        let node = &self.nodes[id.0];
        node.children.is_none()
            && (node.depth >= self.config.max_node_depth
                || node.items.len() < self.config.max_node_items)
    }

    fn insert_into(&mut self, id: NodeId, entry: QuadEntry<K>) {
        if self.allow_more_items(id) {
            self.push_entry(id, entry);
            return;
        }

        match self.nodes[id.0].children {
            Some(children) => {
                for child in children {
                    if self.nodes[child.0].bounds.overlaps(&entry.bounds) {
                        self.insert_into(child, entry);
                    }
                }
            }
            None => {
                let children = self.subdivide(id);
                self.distribute(&children, entry);
            }
        }
    }

    /// Split a leaf into four quadrant children and move its entries down.
    ///
    /// Entries are pushed straight into the children without capacity
    /// checks; a child only splits on a later insertion.
    fn subdivide(&mut self, id: NodeId) -> [NodeId; 4] {
        let parent_bounds = self.nodes[id.0].bounds;
        let depth = self.nodes[id.0].depth + 1;

        let first = self.nodes.len();
        let children = [NodeId(first), NodeId(first + 1), NodeId(first + 2), NodeId(first + 3)];
        for (quadrant, child) in children.iter().enumerate() {
            self.nodes.push(QuadNode::new(
                *child,
                quadrant_bounds(&parent_bounds, quadrant),
                depth,
                Some(id),
            ));
        }
        self.node_count += 4;

        let node = &mut self.nodes[id.0];
        node.children = Some(children);
        if let Some(list) = node.draw_list.take() {
            self.orphaned_lists.push(list);
        }
        let moved = std::mem::take(&mut self.nodes[id.0].items);

        crate::quad_trace!(
            SOURCE,
            "Subdivided node {} at depth {} ({} items redistributed)",
            id.0,
            depth - 1,
            moved.len()
        );

        for entry in moved {
            self.item_count -= 1;
            if let Some(record) = self.records.get_mut(&entry.key) {
                record.node_count = record.node_count.saturating_sub(1);
            }
            self.distribute(&children, entry);
        }

        children
    }

    /// Push `entry` into every child whose bounds overlap it.
    fn distribute(&mut self, children: &[NodeId; 4], entry: QuadEntry<K>) {
        for &child in children {
            if self.nodes[child.0].bounds.overlaps(&entry.bounds) {
                self.push_entry(child, entry);
            }
        }
    }

    fn push_entry(&mut self, id: NodeId, entry: QuadEntry<K>) {
        self.nodes[id.0].items.push(entry);
        self.item_count += 1;
        if let Some(record) = self.records.get_mut(&entry.key) {
            record.node_count += 1;
        }
    }

    // ===== DESTRUCTION =====

    /// Destroy every node and reference, leaving an empty root leaf.
    ///
    /// `unique_item_count` keeps counting across clears. Draw lists of the
    /// destroyed leaves are released on the next `generate_lists`.
    pub fn clear(&mut self) {
        let before = self.node_count;
        self.destroy_node(NodeId::ROOT);

        self.nodes.truncate(1);
        self.nodes[NodeId::ROOT.0] = QuadNode::new(NodeId::ROOT, self.config.bounds, 0, None);
        self.node_count += 1;
        self.records.clear();

        debug_assert_eq!(self.item_count, 0);
        crate::quad_debug!(SOURCE, "Cleared quadtree ({} nodes destroyed)", before);
    }

    /// Recursively release a node: children first, then its own references.
    fn destroy_node(&mut self, id: NodeId) {
        if let Some(children) = self.nodes[id.0].children.take() {
            for child in children {
                self.destroy_node(child);
            }
        }

        let node = &mut self.nodes[id.0];
        if let Some(list) = node.draw_list.take() {
            self.orphaned_lists.push(list);
        }
        let items = std::mem::take(&mut self.nodes[id.0].items);
        self.item_count -= items.len();
        for entry in &items {
            if let Some(record) = self.records.get_mut(&entry.key) {
                record.node_count = record.node_count.saturating_sub(1);
            }
        }
        self.node_count -= 1;
    }

    // ===== POINT QUERIES =====

    /// Items of the leaf containing `point`.
    pub fn get_items_at(&self, point: Vec2) -> FxHashSet<K> {
        let mut results = FxHashSet::default();
        self.visit_items_at(point, |key| {
            results.insert(key);
        });
        results
    }

    /// Visit each entry of the leaf containing `point`.
    pub fn visit_items_at<F: FnMut(K)>(&self, point: Vec2, mut visitor: F) {
        if let Some(leaf) = self.leaf_at(point) {
            for entry in &leaf.items {
                visitor(entry.key);
            }
        }
    }

    /// Descend to the single leaf containing `point`.
    pub fn leaf_at(&self, point: Vec2) -> Option<&QuadNode<K>> {
        let mut node = &self.nodes[NodeId::ROOT.0];
        if !node.bounds.contains(point) {
            return None;
        }

        while let Some(children) = &node.children {
            node = &self.nodes[children[node.child_index(point)].0];
        }
        Some(node)
    }

    // ===== BOX QUERIES =====

    /// Items of every leaf overlapping `bounds`.
    pub fn get_items_in_bounds(&self, bounds: &BoundingBox2D) -> FxHashSet<K> {
        let mut results = FxHashSet::default();
        self.visit_items_in_bounds(bounds, |key| {
            results.insert(key);
        });
        results
    }

    /// Visit each entry of every leaf overlapping `bounds`.
    ///
    /// Entries replicated across several visited leaves are visited once
    /// per leaf.
    pub fn visit_items_in_bounds<F: FnMut(K)>(&self, bounds: &BoundingBox2D, mut visitor: F) {
        self.walk_bounds(NodeId::ROOT, bounds, &mut |leaf: &QuadNode<K>| {
            for entry in &leaf.items {
                visitor(entry.key);
            }
        });
    }

    /// Visit every leaf overlapping `bounds`.
    pub fn visit_leaves_in_bounds<F: FnMut(&QuadNode<K>)>(&self, bounds: &BoundingBox2D, mut visitor: F) {
        self.walk_bounds(NodeId::ROOT, bounds, &mut visitor);
    }

    fn walk_bounds<F: FnMut(&QuadNode<K>)>(&self, id: NodeId, bounds: &BoundingBox2D, visitor: &mut F) {
        let node = &self.nodes[id.0];
        if !node.bounds.overlaps(bounds) {
            return;
        }

        match &node.children {
            None => visitor(node),
            Some(children) => {
                for &child in children {
                    self.walk_bounds(child, bounds, visitor);
                }
            }
        }
    }

    // ===== FRUSTUM QUERIES =====

    /// Items of every leaf intersecting the frustum at the tree elevation.
    pub fn get_items_in_frustum(&self, frustum: &Frustum) -> FxHashSet<K> {
        let mut results = FxHashSet::default();
        self.visit_items_in_frustum(frustum, |key| {
            results.insert(key);
        });
        results
    }

    /// Visit each entry of every leaf intersecting the frustum.
    ///
    /// Entries replicated across several visited leaves are visited once
    /// per leaf.
    pub fn visit_items_in_frustum<F: FnMut(K)>(&self, frustum: &Frustum, mut visitor: F) {
        self.visit_leaves_in_frustum(frustum, |leaf| {
            for entry in &leaf.items {
                visitor(entry.key);
            }
        });
    }

    /// Distinct leaves (empty ones included) intersecting the frustum.
    pub fn get_leaves_in_frustum(&self, frustum: &Frustum) -> Vec<NodeId> {
        let mut results = Vec::new();
        self.visit_leaves_in_frustum(frustum, |leaf| results.push(leaf.id));
        results
    }

    /// Visit every leaf intersecting the frustum.
    pub fn visit_leaves_in_frustum<F: FnMut(&QuadNode<K>)>(&self, frustum: &Frustum, mut visitor: F) {
        let root_class = frustum.classify_2d(&self.nodes[NodeId::ROOT.0].bounds, self.config.elevation);
        self.walk_frustum(NodeId::ROOT, frustum, root_class, &mut visitor);
    }

    /// 3-way classification at each node:
    /// - `Outside` → skip entire subtree
    /// - `Inside` → collect every leaf below without further testing
    /// - `Partial` → classify children and recurse
    fn walk_frustum<F: FnMut(&QuadNode<K>)>(
        &self,
        id: NodeId,
        frustum: &Frustum,
        classification: FrustumTest,
        visitor: &mut F,
    ) {
        let node = &self.nodes[id.0];

        match classification {
            FrustumTest::Outside => {}
            FrustumTest::Inside => self.walk_all(id, visitor),
            FrustumTest::Partial => match &node.children {
                None => visitor(node),
                Some(children) => {
                    for &child in children {
                        let child_class =
                            frustum.classify_2d(&self.nodes[child.0].bounds, self.config.elevation);
                        self.walk_frustum(child, frustum, child_class, visitor);
                    }
                }
            },
        }
    }

    fn walk_all<F: FnMut(&QuadNode<K>)>(&self, id: NodeId, visitor: &mut F) {
        let node = &self.nodes[id.0];
        match &node.children {
            None => visitor(node),
            Some(children) => {
                for &child in children {
                    self.walk_all(child, visitor);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "quad_tree_tests.rs"]
mod tests;
