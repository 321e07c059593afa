/// Frustum: six clipping planes for visibility culling.
///
/// Each plane is represented as a Vec4 (A, B, C, D) where:
/// - (A, B, C) is the inward-pointing unit normal
/// - D is the signed distance term
/// - A point P is inside the frustum if dot(plane, P_homogeneous) >= 0 for all planes
///
/// The frustum is recomputed wholesale once per frame, either from camera
/// parameters (`update`) or from a view-projection matrix
/// (`from_view_projection`). A default-constructed frustum has all-zero
/// planes and therefore culls nothing.

use glam::{Mat4, Vec2, Vec3, Vec4};
use crate::error::{log_and_return_error, Error, Result};
use super::bounding_box::{BoundingBox2D, BoundingBox3D};

/// Result of a 3-way frustum/box classification.
///
/// Used by the quadtree frustum queries for hierarchical culling:
/// - `Outside` → skip the entire subtree
/// - `Inside` → collect the whole subtree without further plane tests
/// - `Partial` → keep testing children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumTest {
    /// Box is entirely outside the frustum
    Outside,
    /// Box is entirely inside the frustum
    Inside,
    /// Box (potentially) straddles at least one plane
    Partial,
}

/// Frustum plane indices
pub const PLANE_TOP: usize = 0;
pub const PLANE_BOTTOM: usize = 1;
pub const PLANE_LEFT: usize = 2;
pub const PLANE_RIGHT: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Frustum corner indices
pub const CORNER_NEAR_TOP_LEFT: usize = 0;
pub const CORNER_NEAR_TOP_RIGHT: usize = 1;
pub const CORNER_NEAR_BOTTOM_LEFT: usize = 2;
pub const CORNER_NEAR_BOTTOM_RIGHT: usize = 3;
pub const CORNER_FAR_TOP_LEFT: usize = 4;
pub const CORNER_FAR_TOP_RIGHT: usize = 5;
pub const CORNER_FAR_BOTTOM_LEFT: usize = 6;
pub const CORNER_FAR_BOTTOM_RIGHT: usize = 7;

/// Six frustum planes plus the derived view-volume geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct Frustum {
    /// Frustum planes: top, bottom, left, right, near, far
    pub planes: [Vec4; 6],
    /// View-volume corners, indexed by the `CORNER_*` constants
    corners: [Vec3; 8],
    /// Near plane half extent (x = half width, y = half height)
    near_half_size: Vec2,
    /// Far plane half extent (x = half width, y = half height)
    far_half_size: Vec2,
}

/// Plane through three points, normal = (c - b) x (a - b).
///
/// The winding decides which side is "inside"; the triples in `update`
/// are ordered so every normal faces the frustum interior.
fn plane_from_points(a: Vec3, b: Vec3, c: Vec3) -> Vec4 {
    let normal = (c - b).cross(a - b).normalize_or_zero();
    normal.extend(-normal.dot(b))
}

impl Frustum {
    /// Build a frustum from camera parameters.
    ///
    /// Equivalent to `Frustum::default()` followed by `update`.
    pub fn new(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_degrees: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let mut frustum = Self::default();
        frustum.update(eye, target, up, fov_degrees, aspect_ratio, near, far);
        frustum
    }

    /// Recompute the whole frustum from camera parameters.
    ///
    /// `fov_degrees` is the vertical field of view. Inputs are not checked:
    /// a degenerate camera (eye == target, up parallel to the view ray,
    /// near <= 0) yields meaningless planes. Use `try_update` to validate.
    pub fn update(
        &mut self,
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_degrees: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) {
        let view_dir = (target - eye).normalize_or_zero();
        let right = view_dir.cross(up).normalize_or_zero();
        let cam_up = right.cross(view_dir);

        let tan_half_fov = (fov_degrees.to_radians() * 0.5).tan();
        let near_half_height = near * tan_half_fov;
        let far_half_height = far * tan_half_fov;
        self.near_half_size = Vec2::new(near_half_height * aspect_ratio, near_half_height);
        self.far_half_size = Vec2::new(far_half_height * aspect_ratio, far_half_height);

        let near_center = eye + view_dir * near;
        let far_center = eye + view_dir * far;

        let corner = |center: Vec3, half: Vec2, sx: f32, sy: f32| {
            center + cam_up * (half.y * sy) + right * (half.x * sx)
        };

        let ntl = corner(near_center, self.near_half_size, -1.0, 1.0);
        let ntr = corner(near_center, self.near_half_size, 1.0, 1.0);
        let nbl = corner(near_center, self.near_half_size, -1.0, -1.0);
        let nbr = corner(near_center, self.near_half_size, 1.0, -1.0);
        let ftl = corner(far_center, self.far_half_size, -1.0, 1.0);
        let ftr = corner(far_center, self.far_half_size, 1.0, 1.0);
        let fbl = corner(far_center, self.far_half_size, -1.0, -1.0);
        let fbr = corner(far_center, self.far_half_size, 1.0, -1.0);

        self.corners = [ntl, ntr, nbl, nbr, ftl, ftr, fbl, fbr];

        // Winding of each triple fixes the inward orientation.
        self.planes[PLANE_TOP] = plane_from_points(ntr, ntl, ftl);
        self.planes[PLANE_BOTTOM] = plane_from_points(nbl, nbr, fbr);
        self.planes[PLANE_LEFT] = plane_from_points(ntl, nbl, fbl);
        self.planes[PLANE_RIGHT] = plane_from_points(nbr, ntr, fbr);
        self.planes[PLANE_NEAR] = plane_from_points(ntl, ntr, nbr);
        self.planes[PLANE_FAR] = plane_from_points(ftr, ftl, fbl);
    }

    /// Validating form of `update`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidFrustum` (and logs it) if the parameters
    /// cannot describe a view volume. The frustum is left untouched.
    pub fn try_update(
        &mut self,
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_degrees: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Result<()> {
        let reject = |msg: String| log_and_return_error("quadcull::Frustum", Error::InvalidFrustum(msg));

        if !(near > 0.0) || !(far > near) {
            return Err(reject(format!("expected 0 < near < far, got near={} far={}", near, far)));
        }
        if !(fov_degrees > 0.0 && fov_degrees < 180.0) {
            return Err(reject(format!("fov must be in (0, 180) degrees, got {}", fov_degrees)));
        }
        if !(aspect_ratio > 0.0) {
            return Err(reject(format!("aspect ratio must be positive, got {}", aspect_ratio)));
        }
        let view_dir = target - eye;
        if view_dir.length_squared() == 0.0 {
            return Err(reject("eye and target coincide".to_string()));
        }
        if view_dir.cross(up).length_squared() == 0.0 {
            return Err(reject("up vector is parallel to the view direction".to_string()));
        }

        self.update(eye, target, up, fov_degrees, aspect_ratio, near, far);
        Ok(())
    }

    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Uses the Gribb & Hartmann method with glam's [0, 1] clip depth.
    /// Works for both perspective and orthographic projections. Corners are
    /// recovered by unprojecting the clip-space cube.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let m = vp.to_cols_array_2d();
        let row = |r: usize| Vec4::new(m[0][r], m[1][r], m[2][r], m[3][r]);
        let (row0, row1, row2, row3) = (row(0), row(1), row(2), row(3));

        let mut planes = [Vec4::ZERO; 6];
        planes[PLANE_TOP] = row3 - row1;
        planes[PLANE_BOTTOM] = row3 + row1;
        planes[PLANE_LEFT] = row3 + row0;
        planes[PLANE_RIGHT] = row3 - row0;
        planes[PLANE_NEAR] = row2;
        planes[PLANE_FAR] = row3 - row2;

        // Normalize each plane so distances are metric
        for plane in &mut planes {
            let normal_len = plane.truncate().length();
            if normal_len > 0.0 {
                *plane /= normal_len;
            }
        }

        let inverse = vp.inverse();
        let unproject = |x: f32, y: f32, z: f32| inverse.project_point3(Vec3::new(x, y, z));
        let corners = [
            unproject(-1.0, 1.0, 0.0),
            unproject(1.0, 1.0, 0.0),
            unproject(-1.0, -1.0, 0.0),
            unproject(1.0, -1.0, 0.0),
            unproject(-1.0, 1.0, 1.0),
            unproject(1.0, 1.0, 1.0),
            unproject(-1.0, -1.0, 1.0),
            unproject(1.0, -1.0, 1.0),
        ];

        let half_extent = |a: usize, b: usize, c: usize| {
            Vec2::new(
                corners[a].distance(corners[b]) * 0.5,
                corners[a].distance(corners[c]) * 0.5,
            )
        };

        Self {
            planes,
            corners,
            near_half_size: half_extent(CORNER_NEAR_TOP_LEFT, CORNER_NEAR_TOP_RIGHT, CORNER_NEAR_BOTTOM_LEFT),
            far_half_size: half_extent(CORNER_FAR_TOP_LEFT, CORNER_FAR_TOP_RIGHT, CORNER_FAR_BOTTOM_LEFT),
        }
    }

    /// View-volume corners, indexed by the `CORNER_*` constants.
    pub fn corners(&self) -> &[Vec3; 8] {
        &self.corners
    }

    /// Near plane half width / half height.
    pub fn near_half_size(&self) -> Vec2 {
        self.near_half_size
    }

    /// Far plane half width / half height.
    pub fn far_half_size(&self) -> Vec2 {
        self.far_half_size
    }

    /// Signed distance from `point` to plane `plane` (positive = inside).
    pub fn distance(&self, plane: usize, point: Vec3) -> f32 {
        let p = self.planes[plane];
        p.truncate().dot(point) + p.w
    }

    /// Point containment: non-negative distance to all six planes.
    pub fn contains(&self, point: Vec3) -> bool {
        (0..6).all(|plane| self.distance(plane, point) >= 0.0)
    }

    /// Test if a 3D box intersects this frustum.
    ///
    /// Uses the "positive vertex" test: for each plane, find the box corner
    /// most in the direction of the plane normal. If that corner is outside,
    /// the box is fully outside.
    ///
    /// May return false positives near frustum edges (conservative), never
    /// false negatives. An empty box never intersects.
    pub fn intersects(&self, bounds: &BoundingBox3D) -> bool {
        if !bounds.is_initialized() {
            return false;
        }

        let (min, max) = (bounds.min(), bounds.max());
        for plane in &self.planes {
            let normal = plane.truncate();

            let p_vertex = Vec3::new(
                if normal.x >= 0.0 { max.x } else { min.x },
                if normal.y >= 0.0 { max.y } else { min.y },
                if normal.z >= 0.0 { max.z } else { min.z },
            );

            if normal.dot(p_vertex) + plane.w < 0.0 {
                return false;
            }
        }

        true
    }

    /// Test a 2D box lying flat at height `z`.
    pub fn intersects_2d(&self, bounds: &BoundingBox2D, z: f32) -> bool {
        self.intersects(&bounds.to_3d(z))
    }

    /// Classify a 3D box against the frustum (3-way test).
    ///
    /// Tests both the positive vertex (p-vertex) and negative vertex (n-vertex)
    /// against each plane:
    /// - If the p-vertex is outside any plane → `Outside` (early out)
    /// - If the n-vertex is outside any plane → at least `Partial`
    /// - If all n-vertices are inside all planes → `Inside`
    pub fn classify(&self, bounds: &BoundingBox3D) -> FrustumTest {
        if !bounds.is_initialized() {
            return FrustumTest::Outside;
        }

        let (min, max) = (bounds.min(), bounds.max());
        let mut all_inside = true;

        for plane in &self.planes {
            let normal = plane.truncate();

            let p_vertex = Vec3::new(
                if normal.x >= 0.0 { max.x } else { min.x },
                if normal.y >= 0.0 { max.y } else { min.y },
                if normal.z >= 0.0 { max.z } else { min.z },
            );

            if normal.dot(p_vertex) + plane.w < 0.0 {
                return FrustumTest::Outside;
            }

            let n_vertex = Vec3::new(
                if normal.x >= 0.0 { min.x } else { max.x },
                if normal.y >= 0.0 { min.y } else { max.y },
                if normal.z >= 0.0 { min.z } else { max.z },
            );

            if normal.dot(n_vertex) + plane.w < 0.0 {
                all_inside = false;
            }
        }

        if all_inside { FrustumTest::Inside } else { FrustumTest::Partial }
    }

    /// `classify` for a 2D box lying flat at height `z`.
    pub fn classify_2d(&self, bounds: &BoundingBox2D, z: f32) -> FrustumTest {
        self.classify(&bounds.to_3d(z))
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
