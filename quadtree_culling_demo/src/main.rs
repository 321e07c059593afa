//! Quadtree culling demo
//!
//! Scatters props over a terrain, then runs a few frames of an orbiting
//! camera: the tree is rebuilt from scratch each frame, queried against
//! the camera frustum, and the visible leaves are "drawn" through cached
//! draw lists.

use std::cell::Cell;
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slotmap::SlotMap;
use quadtree_culling::quadcull::{
    log::{self, LogSeverity},
    BoundingBox2D, DrawListId, Frustum, ItemKey, QuadDrawer, QuadItem, QuadTree, QuadTreeConfig,
};
use quadtree_culling::{quad_info, quad_warn};

const SOURCE: &str = "demo";
const WORLD_HALF_SIZE: f32 = 512.0;
const PROP_COUNT: usize = 2_000;
const FRAME_COUNT: u32 = 8;

/// A static prop standing on the terrain.
struct Prop {
    position: Vec2,
    radius: f32,
    /// Times the prop was emitted into a leaf list
    emitted: Cell<u32>,
}

impl QuadItem for Prop {
    fn quad_item_bounds(&self) -> BoundingBox2D {
        BoundingBox2D::from_center_size(self.position, Vec2::splat(self.radius * 2.0))
    }

    fn draw_quad_item(&self) {
        self.emitted.set(self.emitted.get() + 1);
    }
}

/// Counts lists and draw calls instead of talking to a GPU.
///
/// Deleted list slots are recycled so the table stays bounded by the
/// number of live leaves.
#[derive(Default)]
struct CountingDrawer {
    lists: Vec<Vec<ItemKey>>,
    free: Vec<u32>,
    draw_calls: usize,
    items_drawn: usize,
}

impl QuadDrawer<ItemKey> for CountingDrawer {
    fn compile_list(&mut self, items: &[ItemKey]) -> DrawListId {
        match self.free.pop() {
            Some(slot) => {
                let list = &mut self.lists[slot as usize];
                list.clear();
                list.extend_from_slice(items);
                DrawListId(slot)
            }
            None => {
                self.lists.push(items.to_vec());
                DrawListId((self.lists.len() - 1) as u32)
            }
        }
    }

    fn call_list(&mut self, list: DrawListId) {
        self.draw_calls += 1;
        self.items_drawn += self.lists[list.0 as usize].len();
    }

    fn delete_list(&mut self, list: DrawListId) {
        self.lists[list.0 as usize].clear();
        self.free.push(list.0);
    }
}

fn scatter_props(count: usize) -> SlotMap<ItemKey, Prop> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut props = SlotMap::with_key();
    for _ in 0..count {
        let position = Vec2::new(
            rng.random_range(-WORLD_HALF_SIZE..WORLD_HALF_SIZE),
            rng.random_range(-WORLD_HALF_SIZE..WORLD_HALF_SIZE),
        );
        let radius = rng.random_range(1.0..7.0);
        props.insert(Prop { position, radius, emitted: Cell::new(0) });
    }
    props
}

fn main() {
    log::set_min_severity(LogSeverity::Debug);

    let props = scatter_props(PROP_COUNT);
    let config = QuadTreeConfig::new(BoundingBox2D::from_corners(
        Vec2::splat(-WORLD_HALF_SIZE),
        Vec2::splat(WORLD_HALF_SIZE),
    ))
    .with_max_node_depth(6)
    .with_max_node_items(24);

    let mut tree = match QuadTree::try_with_config(config) {
        Ok(tree) => tree,
        Err(error) => {
            quad_warn!(SOURCE, "Falling back to default config: {}", error);
            QuadTree::with_config(QuadTreeConfig::default())
        }
    };

    let mut frustum = Frustum::default();
    let mut drawer = CountingDrawer::default();

    for frame in 0..FRAME_COUNT {
        // Fully dynamic scene: rebuild every frame
        tree.clear();
        for (key, prop) in &props {
            tree.add_item(key, prop);
        }
        let lists = tree.generate_lists_with(&mut drawer, |key| props.get(key));

        let angle = frame as f32 / FRAME_COUNT as f32 * std::f32::consts::TAU;
        let eye = Vec3::new(angle.cos() * 300.0, angle.sin() * 300.0, 120.0);
        if let Err(error) = frustum.try_update(eye, Vec3::ZERO, Vec3::Z, 60.0, 16.0 / 9.0, 1.0, 800.0) {
            quad_warn!(SOURCE, "Skipping frame {}: {}", frame, error);
            continue;
        }

        let visible = tree.get_items_in_frustum(&frustum);
        let leaves = tree.get_leaves_in_frustum(&frustum);

        drawer.draw_calls = 0;
        drawer.items_drawn = 0;
        tree.draw_in_frustum(&frustum, &mut drawer);

        let stats = tree.stats();
        quad_info!(
            SOURCE,
            "Frame {}: {} / {} props visible in {} leaves, {} of {} lists drawn for {} items ({} nodes, depth {})",
            frame,
            visible.len(),
            props.len(),
            leaves.len(),
            drawer.draw_calls,
            lists,
            drawer.items_drawn,
            stats.node_count,
            stats.max_depth_reached
        );
    }

    let emitted: u32 = props.values().map(|prop| prop.emitted.get()).sum();
    quad_info!(
        SOURCE,
        "Total insertions: {}, item emissions into lists: {}, list slots: {}",
        tree.unique_item_count(),
        emitted,
        drawer.lists.len()
    );
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
