use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;
use slotmap::SlotMap;
use crate::error::Error;
use crate::geometry::{BoundingBox2D, Frustum};
use crate::quadtree::quad_node::{
    QUADRANT_BOTTOM_LEFT, QUADRANT_BOTTOM_RIGHT, QUADRANT_TOP_LEFT, QUADRANT_TOP_RIGHT,
};
use super::*;

fn rect(min: (f32, f32), max: (f32, f32)) -> BoundingBox2D {
    BoundingBox2D::from_corners(Vec2::new(min.0, min.1), Vec2::new(max.0, max.1))
}

fn world() -> BoundingBox2D {
    rect((0.0, 0.0), (100.0, 100.0))
}

fn set(keys: &[u32]) -> FxHashSet<u32> {
    keys.iter().copied().collect()
}

/// Seeded random boxes inside [0, 100]².
fn scattered_boxes(count: usize, seed: u64) -> Vec<BoundingBox2D> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..count)
        .map(|_| {
            let x: f32 = rng.random_range(0.0..95.0);
            let y: f32 = rng.random_range(0.0..95.0);
            let w: f32 = rng.random_range(0.5..5.0);
            let h: f32 = rng.random_range(0.5..5.0);
            rect((x, y), (x + w, y + h))
        })
        .collect()
}

fn child_of(tree: &QuadTree<u32>, parent: NodeId, quadrant: usize) -> &QuadNode<u32> {
    let children = tree.node(parent).unwrap().children().unwrap();
    tree.node(children[quadrant]).unwrap()
}

/// Check the structural invariants and counters of a tree.
fn assert_consistent(tree: &QuadTree<u32>) {
    let mut leaf_items = 0;
    let mut fan_out: rustc_hash::FxHashMap<u32, u32> = Default::default();

    for node in tree.nodes() {
        match node.children() {
            None => {
                leaf_items += node.item_count();
                for key in node.item_keys() {
                    *fan_out.entry(key).or_default() += 1;
                }
            }
            Some(children) => {
                assert_eq!(node.item_count(), 0, "internal node {:?} holds items", node.id());

                let mut union = BoundingBox2D::new();
                for (quadrant, &child_id) in children.iter().enumerate() {
                    let child = tree.node(child_id).unwrap();
                    assert_eq!(child.depth(), node.depth() + 1);
                    assert_eq!(child.parent(), Some(node.id()));
                    assert_eq!(*child.bounds(), node.quadrant_bounds(quadrant));
                    union.update_box(child.bounds());
                }
                assert_eq!(union, *node.bounds());
            }
        }
        assert!(node.depth() <= tree.config().max_node_depth);
    }

    assert_eq!(tree.item_count(), leaf_items);
    assert_eq!(tree.node_count(), tree.nodes().count());
    for (key, count) in fan_out {
        assert_eq!(tree.node_count_of(key), count, "fan-out of item {}", key);
    }
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_new_tree_is_single_empty_leaf() {
    let tree: QuadTree<u32> = QuadTree::new(world(), 4, 1);

    assert_eq!(tree.item_count(), 0);
    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.unique_item_count(), 0);
    assert!(tree.root().is_leaf());
    assert_eq!(tree.depth(), 0);
    assert_eq!(*tree.bounds(), world());
    assert_eq!(tree.config().max_node_depth, 4);
    assert_eq!(tree.config().max_node_items, 1);
}

#[test]
fn test_config_defaults_and_builders() {
    let config = QuadTreeConfig::default();
    assert_eq!(config.max_node_depth, 8);
    assert_eq!(config.max_node_items, 16);
    assert_eq!(config.elevation, 0.0);
    assert!(config.validate().is_ok());

    let config = QuadTreeConfig::new(world())
        .with_max_node_depth(3)
        .with_max_node_items(2)
        .with_elevation(-4.0);
    assert_eq!(config.bounds, world());
    assert_eq!(config.max_node_depth, 3);
    assert_eq!(config.max_node_items, 2);
    assert_eq!(config.elevation, -4.0);
}

#[test]
fn test_try_with_config_rejects_degenerate_settings() {
    let zero_depth = QuadTreeConfig::new(world()).with_max_node_depth(0);
    let zero_items = QuadTreeConfig::new(world()).with_max_node_items(0);
    let empty_bounds = QuadTreeConfig::new(BoundingBox2D::new());
    let flat_bounds = QuadTreeConfig::new(rect((0.0, 0.0), (100.0, 0.0)));

    assert!(matches!(QuadTree::<u32>::try_with_config(zero_depth), Err(Error::InvalidConfig(_))));
    assert!(matches!(QuadTree::<u32>::try_with_config(zero_items), Err(Error::InvalidConfig(_))));
    assert!(matches!(QuadTree::<u32>::try_with_config(empty_bounds), Err(Error::InvalidBounds(_))));
    assert!(matches!(QuadTree::<u32>::try_with_config(flat_bounds), Err(Error::InvalidBounds(_))));

    let tree = QuadTree::<u32>::try_with_config(QuadTreeConfig::new(world())).unwrap();
    assert_eq!(tree.node_count(), 1);
}

// ============================================================================
// Insertion & subdivision
// ============================================================================

#[test]
fn test_two_items_split_root() {
    let mut tree = QuadTree::new(world(), 4, 1);
    tree.add_item(1, &rect((10.0, 10.0), (20.0, 20.0)));
    assert_eq!(tree.node_count(), 1, "first item fits in the root");

    tree.add_item(2, &rect((80.0, 80.0), (90.0, 90.0)));

    assert_eq!(tree.node_count(), 5);
    assert_eq!(tree.item_count(), 2);
    assert_eq!(tree.unique_item_count(), 2);
    assert!(!tree.root().is_leaf());
    assert_eq!(tree.root().item_count(), 0);

    let root = NodeId::ROOT;
    assert_eq!(child_of(&tree, root, QUADRANT_TOP_LEFT).item_keys().collect::<Vec<_>>(), vec![1]);
    assert_eq!(child_of(&tree, root, QUADRANT_BOTTOM_RIGHT).item_keys().collect::<Vec<_>>(), vec![2]);
    assert_eq!(child_of(&tree, root, QUADRANT_TOP_RIGHT).item_count(), 0);
    assert_eq!(child_of(&tree, root, QUADRANT_BOTTOM_LEFT).item_count(), 0);

    assert_eq!(tree.get_items_at(Vec2::new(15.0, 15.0)), set(&[1]));
    assert_eq!(tree.get_items_at(Vec2::new(85.0, 85.0)), set(&[2]));
    assert_consistent(&tree);
}

#[test]
fn test_straddling_item_replicated_into_all_quadrants() {
    let mut tree = QuadTree::new(world(), 4, 1);
    tree.add_item(7, &rect((40.0, 40.0), (60.0, 60.0)));
    assert_eq!(tree.node_count_of(7), 1);

    tree.add_item(1, &rect((10.0, 10.0), (20.0, 20.0)));

    assert_eq!(tree.node_count_of(7), 4);
    assert_eq!(tree.node_count_of(1), 1);
    for quadrant in 0..4 {
        assert!(child_of(&tree, NodeId::ROOT, quadrant).item_keys().any(|key| key == 7));
    }
    assert_eq!(tree.item_count(), 5);
    assert_eq!(tree.unique_item_count(), 2);
    assert_consistent(&tree);
}

#[test]
fn test_subdivision_is_one_shot() {
    let mut tree = QuadTree::new(world(), 4, 1);
    tree.add_item(1, &rect((1.0, 1.0), (2.0, 2.0)));
    tree.add_item(2, &rect((3.0, 3.0), (4.0, 4.0)));

    // Both land in the top-left child, over capacity, without a second split
    assert_eq!(tree.node_count(), 5);
    assert_eq!(child_of(&tree, NodeId::ROOT, QUADRANT_TOP_LEFT).item_count(), 2);

    // The next insertion reaching that child splits it
    tree.add_item(3, &rect((30.0, 30.0), (31.0, 31.0)));
    assert_eq!(tree.node_count(), 9);
    assert_eq!(tree.depth(), 2);

    let top_left = child_of(&tree, NodeId::ROOT, QUADRANT_TOP_LEFT).id();
    assert_eq!(child_of(&tree, top_left, QUADRANT_TOP_LEFT).item_keys().collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(child_of(&tree, top_left, QUADRANT_BOTTOM_RIGHT).item_keys().collect::<Vec<_>>(), vec![3]);
    assert_consistent(&tree);
}

#[test]
fn test_depth_cap_stops_subdivision() {
    let mut tree = QuadTree::new(world(), 1, 1);
    for key in 0..10 {
        tree.add_item(key, &rect((1.0, 1.0), (2.0, 2.0)));
    }

    assert_eq!(tree.node_count(), 5);
    assert_eq!(tree.depth(), 1);
    assert_eq!(child_of(&tree, NodeId::ROOT, QUADRANT_TOP_LEFT).item_count(), 10);
    assert_consistent(&tree);
}

#[test]
fn test_zero_capacity_subdivides_immediately() {
    let mut tree = QuadTree::new(world(), 3, 0);
    tree.add_item(1, &rect((1.0, 1.0), (2.0, 2.0)));

    assert_eq!(tree.node_count(), 5);
    assert_eq!(tree.item_count(), 1);
    assert_consistent(&tree);
}

#[test]
fn test_item_outside_root_is_dropped() {
    let mut tree = QuadTree::new(world(), 4, 1);
    tree.add_item(1, &rect((200.0, 200.0), (210.0, 210.0)));
    tree.add_item(2, &BoundingBox2D::new());

    assert_eq!(tree.unique_item_count(), 2);
    assert_eq!(tree.item_count(), 0);
    assert_eq!(tree.node_count_of(1), 0);
    assert!(tree.item_bounds(1).is_none());
    assert!(tree.get_items_in_bounds(&rect((150.0, 150.0), (250.0, 250.0))).is_empty());
}

#[test]
fn test_item_partially_outside_root_is_kept() {
    let mut tree = QuadTree::new(world(), 4, 4);
    tree.add_item(1, &rect((90.0, 90.0), (150.0, 150.0)));

    assert_eq!(tree.item_count(), 1);
    assert_eq!(tree.get_items_at(Vec2::new(95.0, 95.0)), set(&[1]));
}

#[test]
fn test_reinserting_key_adds_references() {
    let mut tree = QuadTree::new(world(), 4, 8);
    tree.add_item(1, &rect((10.0, 10.0), (20.0, 20.0)));
    tree.add_item(1, &rect((30.0, 30.0), (40.0, 40.0)));

    assert_eq!(tree.node_count_of(1), 2);
    assert_eq!(tree.item_count(), 2);
    assert_eq!(tree.unique_item_count(), 2);
    assert_eq!(tree.item_bounds(1), Some(rect((30.0, 30.0), (40.0, 40.0))));
}

#[test]
fn test_counters_stay_consistent_under_many_insertions() {
    let mut tree = QuadTree::new(world(), 5, 3);
    let boxes = scattered_boxes(300, 7);

    for (key, bounds) in boxes.iter().enumerate() {
        tree.add_item(key as u32, bounds);
    }

    assert_eq!(tree.unique_item_count(), 300);
    assert!(tree.item_count() >= 300, "every item has at least one reference");
    assert!(tree.depth() > 1);
    assert_consistent(&tree);

    let stats = tree.stats();
    assert_eq!(stats.item_count, tree.item_count());
    assert_eq!(stats.node_count, tree.node_count());
    assert_eq!(stats.unique_item_count, 300);
    assert_eq!(stats.leaf_count, tree.leaves().count());
    assert_eq!(stats.max_depth_reached, tree.depth());
    assert_eq!((stats.node_count - 1) % 4, 0);
}

// ============================================================================
// Point queries
// ============================================================================

#[test]
fn test_point_query_empty_and_outside() {
    let mut tree = QuadTree::new(world(), 4, 1);
    assert!(tree.get_items_at(Vec2::new(50.0, 50.0)).is_empty());

    tree.add_item(1, &rect((10.0, 10.0), (20.0, 20.0)));
    assert!(tree.get_items_at(Vec2::new(-1.0, 50.0)).is_empty());
    assert!(tree.leaf_at(Vec2::new(101.0, 50.0)).is_none());
}

#[test]
fn test_point_query_finds_items_in_their_leaf() {
    let mut tree = QuadTree::new(world(), 6, 2);
    let boxes = scattered_boxes(120, 99);
    for (key, bounds) in boxes.iter().enumerate() {
        tree.add_item(key as u32, bounds);
    }

    for (key, bounds) in boxes.iter().enumerate() {
        let center = bounds.center();
        let leaf = tree.leaf_at(center).unwrap();
        assert!(leaf.bounds().contains(center));
        assert!(
            tree.get_items_at(center).contains(&(key as u32)),
            "item {} missing at its own center",
            key
        );
    }
}

#[test]
fn test_visit_items_at_matches_set_form() {
    let mut tree = QuadTree::new(world(), 4, 1);
    tree.add_item(1, &rect((10.0, 10.0), (20.0, 20.0)));
    tree.add_item(2, &rect((12.0, 12.0), (14.0, 14.0)));
    tree.add_item(3, &rect((80.0, 80.0), (90.0, 90.0)));

    let mut visited = Vec::new();
    tree.visit_items_at(Vec2::new(13.0, 13.0), |key| visited.push(key));
    visited.sort();

    assert_eq!(visited, vec![1, 2]);
    assert_eq!(tree.get_items_at(Vec2::new(13.0, 13.0)), set(&[1, 2]));
}

// ============================================================================
// Box queries
// ============================================================================

#[test]
fn test_box_query_is_leaf_granular() {
    let mut tree = QuadTree::new(world(), 4, 1);
    tree.add_item(1, &rect((10.0, 10.0), (20.0, 20.0)));
    tree.add_item(2, &rect((80.0, 80.0), (90.0, 90.0)));

    // Misses item 1 but overlaps its leaf
    let query = rect((40.0, 40.0), (45.0, 45.0));
    assert_eq!(tree.get_items_in_bounds(&query), set(&[1]));

    let exact: Vec<u32> = tree
        .get_items_in_bounds(&query)
        .into_iter()
        .filter(|&key| tree.item_bounds(key).is_some_and(|b| b.overlaps(&query)))
        .collect();
    assert!(exact.is_empty());
}

#[test]
fn test_box_query_superset_and_leaf_bound() {
    let mut tree = QuadTree::new(world(), 5, 4);
    let boxes = scattered_boxes(200, 3);
    for (key, bounds) in boxes.iter().enumerate() {
        tree.add_item(key as u32, bounds);
    }

    let queries = [
        rect((0.0, 0.0), (10.0, 10.0)),
        rect((25.0, 60.0), (55.0, 75.0)),
        rect((49.0, 49.0), (51.0, 51.0)),
        rect((90.0, 0.0), (100.0, 100.0)),
    ];

    for query in &queries {
        let result = tree.get_items_in_bounds(query);

        for (key, bounds) in boxes.iter().enumerate() {
            if bounds.overlaps(query) {
                assert!(result.contains(&(key as u32)), "missing overlapping item {}", key);
            }
        }

        let mut reachable = FxHashSet::default();
        tree.visit_leaves_in_bounds(query, |leaf| {
            assert!(leaf.bounds().overlaps(query));
            reachable.extend(leaf.item_keys());
        });
        assert_eq!(result, reachable);
    }
}

#[test]
fn test_box_visitor_reports_each_leaf_occurrence() {
    let mut tree = QuadTree::new(world(), 4, 1);
    tree.add_item(7, &rect((40.0, 40.0), (60.0, 60.0)));
    tree.add_item(1, &rect((10.0, 10.0), (20.0, 20.0)));

    let mut visits = 0;
    tree.visit_items_in_bounds(&world(), |key| {
        if key == 7 {
            visits += 1;
        }
    });

    assert_eq!(visits, 4);
    assert_eq!(tree.get_items_in_bounds(&world()), set(&[1, 7]));
}

#[test]
fn test_queries_are_idempotent() {
    let mut tree = QuadTree::new(world(), 5, 2);
    for (key, bounds) in scattered_boxes(80, 11).iter().enumerate() {
        tree.add_item(key as u32, bounds);
    }

    let query = rect((20.0, 20.0), (70.0, 45.0));
    let frustum = top_down(Vec2::new(50.0, 50.0), 30.0);

    assert_eq!(tree.get_items_in_bounds(&query), tree.get_items_in_bounds(&query));
    assert_eq!(tree.get_items_in_frustum(&frustum), tree.get_items_in_frustum(&frustum));
    assert_eq!(tree.get_leaves_in_frustum(&frustum), tree.get_leaves_in_frustum(&frustum));
    assert_eq!(tree.get_items_at(Vec2::new(33.0, 33.0)), tree.get_items_at(Vec2::new(33.0, 33.0)));
}

// ============================================================================
// Frustum queries
// ============================================================================

/// Camera `height` units above `center`, looking straight down with a narrow FOV.
fn top_down(center: Vec2, height: f32) -> Frustum {
    Frustum::new(
        center.extend(height),
        center.extend(0.0),
        Vec3::Y,
        30.0,
        1.0,
        1.0,
        1000.0,
    )
}

#[test]
fn test_frustum_query_culls_other_quadrants() {
    let mut tree = QuadTree::new(world(), 4, 1);
    tree.add_item(1, &rect((10.0, 10.0), (20.0, 20.0)));
    tree.add_item(2, &rect((80.0, 80.0), (90.0, 90.0)));

    let frustum = top_down(Vec2::new(15.0, 15.0), 20.0);

    assert_eq!(tree.get_items_in_frustum(&frustum), set(&[1]));
    let leaves = tree.get_leaves_in_frustum(&frustum);
    assert_eq!(leaves, vec![child_of(&tree, NodeId::ROOT, QUADRANT_TOP_LEFT).id()]);
}

#[test]
fn test_frustum_seeing_everything_collects_all_leaves() {
    let mut tree = QuadTree::new(world(), 5, 2);
    for (key, bounds) in scattered_boxes(60, 5).iter().enumerate() {
        tree.add_item(key as u32, bounds);
    }

    let frustum = Frustum::new(
        Vec3::new(50.0, 50.0, 500.0),
        Vec3::new(50.0, 50.0, 0.0),
        Vec3::Y,
        60.0,
        1.0,
        1.0,
        1000.0,
    );

    let all: FxHashSet<u32> = (0..60).collect();
    assert_eq!(tree.get_items_in_frustum(&frustum), all);

    let leaves = tree.get_leaves_in_frustum(&frustum);
    let distinct: FxHashSet<NodeId> = leaves.iter().copied().collect();
    assert_eq!(leaves.len(), distinct.len());
    assert_eq!(leaves.len(), tree.leaves().count());
}

#[test]
fn test_frustum_behind_camera_is_empty() {
    let mut tree = QuadTree::new(world(), 4, 2);
    for (key, bounds) in scattered_boxes(40, 21).iter().enumerate() {
        tree.add_item(key as u32, bounds);
    }

    // Looking up, away from the tree plane
    let frustum = Frustum::new(
        Vec3::new(50.0, 50.0, 10.0),
        Vec3::new(50.0, 50.0, 20.0),
        Vec3::Y,
        90.0,
        1.0,
        1.0,
        1000.0,
    );

    assert!(tree.get_items_in_frustum(&frustum).is_empty());
    assert!(tree.get_leaves_in_frustum(&frustum).is_empty());
}

#[test]
fn test_frustum_respects_elevation() {
    let config = QuadTreeConfig::new(world()).with_max_node_items(4).with_elevation(100.0);
    let mut tree = QuadTree::with_config(config);
    tree.add_item(1u32, &rect((45.0, 45.0), (55.0, 55.0)));

    // Camera at z = 50 looking down: the tree plane at z = 100 is behind it
    assert!(tree.get_items_in_frustum(&top_down(Vec2::new(50.0, 50.0), 50.0)).is_empty());
    // Camera at z = 150 looking down sees it
    assert_eq!(tree.get_items_in_frustum(&top_down(Vec2::new(50.0, 50.0), 150.0)), set(&[1]));
}

#[test]
fn test_visit_leaves_in_frustum_gives_nodes() {
    let mut tree = QuadTree::new(world(), 4, 1);
    tree.add_item(1, &rect((10.0, 10.0), (20.0, 20.0)));
    tree.add_item(2, &rect((80.0, 80.0), (90.0, 90.0)));

    let mut seen = Vec::new();
    tree.visit_leaves_in_frustum(&top_down(Vec2::new(85.0, 85.0), 20.0), |leaf| {
        assert!(leaf.is_leaf());
        seen.extend(leaf.item_keys());
    });

    assert_eq!(seen, vec![2]);
}

#[test]
fn test_empty_tree_frustum_query() {
    let tree: QuadTree<u32> = QuadTree::new(world(), 4, 1);
    let frustum = top_down(Vec2::new(50.0, 50.0), 200.0);

    assert!(tree.get_items_in_frustum(&frustum).is_empty());
    assert_eq!(tree.get_leaves_in_frustum(&frustum), vec![NodeId::ROOT]);
}

// ============================================================================
// Destruction
// ============================================================================

#[test]
fn test_clear_resets_tree_but_keeps_unique_count() {
    let mut tree = QuadTree::new(world(), 5, 2);
    for (key, bounds) in scattered_boxes(50, 17).iter().enumerate() {
        tree.add_item(key as u32, bounds);
    }
    assert!(tree.node_count() > 1);

    tree.clear();

    assert_eq!(tree.item_count(), 0);
    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.unique_item_count(), 50);
    assert!(tree.root().is_leaf());
    assert_eq!(tree.node_count_of(3), 0);
    assert!(tree.get_items_in_bounds(&world()).is_empty());

    tree.add_item(99, &rect((1.0, 1.0), (2.0, 2.0)));
    assert_eq!(tree.get_items_at(Vec2::new(1.5, 1.5)), set(&[99]));
    assert_eq!(tree.unique_item_count(), 51);
    assert_consistent(&tree);
}

// ============================================================================
// Slot map handles
// ============================================================================

struct Sprite {
    position: Vec2,
    half_size: f32,
}

impl QuadItem for Sprite {
    fn quad_item_bounds(&self) -> BoundingBox2D {
        BoundingBox2D::from_center_size(self.position, Vec2::splat(self.half_size * 2.0))
    }
}

#[test]
fn test_slotmap_keys_and_custom_items() {
    let mut sprites: SlotMap<ItemKey, Sprite> = SlotMap::with_key();
    let a = sprites.insert(Sprite { position: Vec2::new(15.0, 15.0), half_size: 2.0 });
    let b = sprites.insert(Sprite { position: Vec2::new(85.0, 15.0), half_size: 2.0 });

    let mut tree: QuadTree = QuadTree::new(world(), 4, 1);
    for (key, sprite) in &sprites {
        tree.add_item(key, sprite);
    }

    assert_eq!(tree.get_items_at(Vec2::new(15.0, 15.0)).into_iter().collect::<Vec<_>>(), vec![a]);
    assert_eq!(tree.get_items_at(Vec2::new(85.0, 15.0)).into_iter().collect::<Vec<_>>(), vec![b]);
    assert_eq!(tree.item_bounds(a), Some(sprites[a].quad_item_bounds()));
}
