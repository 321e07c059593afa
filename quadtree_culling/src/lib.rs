/*!
# Quadtree Culling

Adaptive 2D region quadtree for per-frame visibility and spatial queries.

A render/simulation loop inserts its items once (or rebuilds the tree when
they move), updates a `Frustum` from the camera, and asks the tree which
items or leaf regions are visible.

## Architecture

- **BoundingBox2D / BoundingBox3D**: lazily initialized axis-aligned boxes
- **Frustum**: six inward-facing planes with conservative box tests
- **QuadTree / QuadNode**: capacity-adaptive 4-ary tree stored in a node arena
- **QuadDrawer**: rendering backend seam for cached per-leaf draw lists
- **Logger**: pluggable crate logging (colored console by default)

## Example

```
use quadtree_culling::quadcull::{BoundingBox2D, QuadTree};
use quadtree_culling::glam::Vec2;

let world = BoundingBox2D::from_corners(Vec2::ZERO, Vec2::splat(100.0));
let mut tree: QuadTree<u32> = QuadTree::new(world, 4, 1);

tree.add_item(1, &BoundingBox2D::from_corners(Vec2::splat(10.0), Vec2::splat(20.0)));
tree.add_item(2, &BoundingBox2D::from_corners(Vec2::splat(80.0), Vec2::splat(90.0)));

assert!(tree.get_items_at(Vec2::new(15.0, 15.0)).contains(&1));
```
*/

// Internal modules
mod error;
pub mod log;
pub mod geometry;
pub mod quadtree;

// Main quadcull namespace module
pub mod quadcull {
    // Error types
    pub use crate::error::{Error, Result};

    // Geometry primitives
    pub use crate::geometry::{BoundingBox2D, BoundingBox3D, Frustum, FrustumTest};

    // Spatial index
    pub use crate::quadtree::{
        DrawListId, ItemKey, NodeId, QuadDrawer, QuadEntry, QuadItem, QuadNode,
        QuadTree, QuadTreeConfig, QuadTreeStats,
    };

    // Logging sub-module (types and global logger control)
    pub mod log {
        pub use crate::log::{
            Logger, LogEntry, LogSeverity, DefaultLogger,
            set_logger, reset_logger, set_min_severity, min_severity,
        };
    }
}

// Re-export math library at crate root
pub use glam;
