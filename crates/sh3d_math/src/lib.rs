// Re-export glam for convenience
pub use glam::*;

// Bounds and transform helpers
mod aabb;
mod interval;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use transform::Mat4Ext;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euler_xyz_matches_zyx_composition() {
        // Euler XYZ (x applied first) is Rz * Ry * Rx
        let q = Quat::from_euler(EulerRot::ZYX, 0.3, 0.0, 0.7);
        let m = Mat3::from_rotation_z(0.3) * Mat3::from_rotation_x(0.7);
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!((q * p - m * p).length() < 1e-5);
    }
}
