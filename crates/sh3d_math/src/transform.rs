// Transform utilities for Mat4
//
// Extends glam::Mat4 with bounds helpers used when placing objects.
// Note: glam::Mat4 already provides transform_point3() and inverse()

use glam::{Mat4, Vec3};
use crate::Aabb;

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;

    /// Exact world-space bounds of a point set under this matrix.
    ///
    /// Tighter than `transform_aabb` for rotated geometry, since only the
    /// actual vertices contribute.
    fn transform_points_bounds(&self, points: &[Vec3]) -> Option<Aabb>;
}

impl Mat4Ext for Mat4 {
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        if aabb.is_empty() {
            return Aabb::EMPTY;
        }

        let corners = aabb.corners().map(|corner| self.transform_point3(corner));
        Aabb::enclosing(corners).unwrap_or(Aabb::EMPTY)
    }

    fn transform_points_bounds(&self, points: &[Vec3]) -> Option<Aabb> {
        Aabb::enclosing(points.iter().map(|&p| self.transform_point3(p)))
    }
}
