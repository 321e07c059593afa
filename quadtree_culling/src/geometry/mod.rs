//! Geometry module: bounding boxes and the view frustum.
//!
//! Supporting primitives consumed by the quadtree: lazily initialized
//! 2D/3D boxes and a six-plane frustum with conservative box tests.

mod bounding_box;
mod frustum;

pub use bounding_box::{BoundingBox2D, BoundingBox3D};
pub use frustum::{
    Frustum, FrustumTest,
    PLANE_TOP, PLANE_BOTTOM, PLANE_LEFT, PLANE_RIGHT, PLANE_NEAR, PLANE_FAR,
    CORNER_NEAR_TOP_LEFT, CORNER_NEAR_TOP_RIGHT, CORNER_NEAR_BOTTOM_LEFT, CORNER_NEAR_BOTTOM_RIGHT,
    CORNER_FAR_TOP_LEFT, CORNER_FAR_TOP_RIGHT, CORNER_FAR_BOTTOM_LEFT, CORNER_FAR_BOTTOM_RIGHT,
};
