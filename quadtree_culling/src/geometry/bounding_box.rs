/// Axis-aligned bounding boxes (2D and 3D).
///
/// Both variants start empty and grow monotonically through `update`.
/// An empty box contains nothing and overlaps nothing. All tests use closed
/// intervals with no epsilon, so boxes that only touch on an edge overlap.

use glam::{Vec2, Vec3};

// ===== BOUNDING BOX 2D =====

/// 2D axis-aligned bounding box, lazily initialized by its first point.
///
/// Invariant: once initialized, `min.x <= max.x` and `min.y <= max.y`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox2D {
    min: Vec2,
    max: Vec2,
    initialized: bool,
}

impl BoundingBox2D {
    /// Create an empty box.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a box spanning two corners (in any order).
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let mut bounds = Self::new();
        bounds.update(a);
        bounds.update(b);
        bounds
    }

    /// Create a box from a center point and a full size.
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() * 0.5;
        Self::from_corners(center - half, center + half)
    }

    /// Back to the empty state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether at least one point has been added.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Minimum corner. Meaningless while the box is empty.
    pub fn min(&self) -> Vec2 {
        self.min
    }

    /// Maximum corner. Meaningless while the box is empty.
    pub fn max(&self) -> Vec2 {
        self.max
    }

    /// Grow to include `point`. The first call seeds both corners.
    pub fn update(&mut self, point: Vec2) {
        if self.initialized {
            self.min = self.min.min(point);
            self.max = self.max.max(point);
        } else {
            self.min = point;
            self.max = point;
            self.initialized = true;
        }
    }

    /// Union with another box. An empty `other` leaves `self` unchanged.
    pub fn update_box(&mut self, other: &BoundingBox2D) {
        if other.initialized {
            self.update(other.min);
            self.update(other.max);
        }
    }

    /// Closed-interval point containment.
    pub fn contains(&self, point: Vec2) -> bool {
        self.initialized
            && point.x >= self.min.x && point.x <= self.max.x
            && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Whether `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &BoundingBox2D) -> bool {
        self.initialized && other.initialized
            && self.min.x <= other.min.x && self.max.x >= other.max.x
            && self.min.y <= other.min.y && self.max.y >= other.max.y
    }

    /// True iff no separating axis exists. Touching edges overlap.
    pub fn overlaps(&self, other: &BoundingBox2D) -> bool {
        self.initialized && other.initialized
            && self.min.x <= other.max.x && self.max.x >= other.min.x
            && self.min.y <= other.max.y && self.max.y >= other.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Lift into a flat 3D box at height `z`.
    pub fn to_3d(&self, z: f32) -> BoundingBox3D {
        if !self.initialized {
            return BoundingBox3D::new();
        }
        BoundingBox3D::from_corners(self.min.extend(z), self.max.extend(z))
    }
}

// ===== BOUNDING BOX 3D =====

/// 3D axis-aligned bounding box, lazily initialized by its first point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox3D {
    min: Vec3,
    max: Vec3,
    initialized: bool,
}

impl BoundingBox3D {
    /// Create an empty box.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a box spanning two corners (in any order).
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        let mut bounds = Self::new();
        bounds.update(a);
        bounds.update(b);
        bounds
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Grow to include `point`. The first call seeds both corners.
    pub fn update(&mut self, point: Vec3) {
        if self.initialized {
            self.min = self.min.min(point);
            self.max = self.max.max(point);
        } else {
            self.min = point;
            self.max = point;
            self.initialized = true;
        }
    }

    /// Union with another box. An empty `other` leaves `self` unchanged.
    pub fn update_box(&mut self, other: &BoundingBox3D) {
        if other.initialized {
            self.update(other.min);
            self.update(other.max);
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        self.initialized
            && point.x >= self.min.x && point.x <= self.max.x
            && point.y >= self.min.y && point.y <= self.max.y
            && point.z >= self.min.z && point.z <= self.max.z
    }

    pub fn contains_box(&self, other: &BoundingBox3D) -> bool {
        self.initialized && other.initialized
            && self.min.x <= other.min.x && self.max.x >= other.max.x
            && self.min.y <= other.min.y && self.max.y >= other.max.y
            && self.min.z <= other.min.z && self.max.z >= other.max.z
    }

    pub fn overlaps(&self, other: &BoundingBox3D) -> bool {
        self.initialized && other.initialized
            && self.min.x <= other.max.x && self.max.x >= other.min.x
            && self.min.y <= other.max.y && self.max.y >= other.min.y
            && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn depth(&self) -> f32 {
        self.max.z - self.min.z
    }

    /// Footprint area on the XY plane.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn volume(&self) -> f32 {
        self.area() * self.depth()
    }
}

#[cfg(test)]
#[path = "bounding_box_tests.rs"]
mod tests;
