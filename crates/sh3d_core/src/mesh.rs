//! Mesh geometry representation for the scene graph.
//!
//! This module provides a host-agnostic mesh representation populated from
//! OBJ files. Object-level operations that rewrite geometry (joining parts,
//! moving the origin, baking transforms) are expressed here as pure mesh
//! transformations.

use sh3d_math::{Aabb, Mat3, Mat4, Vec3};

/// A mesh consisting of vertex positions, optional normals, and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals (optional - will be computed if not provided)
    pub normals: Option<Vec<Vec3>>,

    /// UV coordinates (optional - one [u, v] per vertex)
    pub uvs: Option<Vec<[f32; 2]>>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and indices, optionally with normals.
    ///
    /// If normals are not provided, they will NOT be automatically computed.
    /// Call `compute_normals()` explicitly if you need them.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>, normals: Option<Vec<Vec3>>) -> Self {
        Self::new_with_uvs(positions, indices, normals, None)
    }

    /// Create a new mesh with UV coordinates.
    pub fn new_with_uvs(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        normals: Option<Vec<Vec3>>,
        uvs: Option<Vec<[f32; 2]>>,
    ) -> Self {
        let bounds = Self::compute_bounds(&positions);
        Self {
            positions,
            normals,
            uvs,
            indices,
            bounds,
        }
    }

    fn compute_bounds(positions: &[Vec3]) -> Aabb {
        Aabb::enclosing(positions.iter().copied()).unwrap_or(Aabb::EMPTY)
    }

    /// Compute smooth vertex normals by averaging face normals.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.positions.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];

        for face in self.indices.chunks(3) {
            if face.len() < 3 {
                continue;
            }

            let i0 = face[0] as usize;
            let i1 = face[1] as usize;
            let i2 = face[2] as usize;

            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                continue;
            }

            let p0 = self.positions[i0];
            let edge1 = self.positions[i1] - p0;
            let edge2 = self.positions[i2] - p0;
            // OBJ faces are counter-clockwise
            let face_normal = edge1.cross(edge2);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            *normal = normal.try_normalize().unwrap_or(Vec3::Z);
        }

        self.normals = Some(normals);
    }

    /// Check if the mesh has normals.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Ensure the mesh has one normal per vertex, computing them if necessary.
    pub fn ensure_normals(&mut self) {
        let should_compute = match &self.normals {
            None => true,
            Some(normals) => normals.len() != self.positions.len(),
        };

        if should_compute {
            if let Some(normals) = &self.normals {
                log::debug!(
                    "Normals array length ({}) doesn't match vertex count ({}), computing smooth normals",
                    normals.len(),
                    self.positions.len()
                );
            }
            self.compute_normals();
        }
    }

    /// Get the mesh center (center of bounding box).
    pub fn center(&self) -> Vec3 {
        self.bounds.centroid()
    }

    /// Size of the local bounding box along each axis.
    pub fn extent(&self) -> Vec3 {
        if self.bounds.is_empty() {
            Vec3::ZERO
        } else {
            self.bounds.extent()
        }
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Return a copy of this mesh with `matrix` baked into the vertices.
    ///
    /// Normals go through the inverse transpose so mirrored or non-uniformly
    /// scaled geometry keeps correct shading.
    pub fn transformed(&self, matrix: &Mat4) -> Mesh {
        let positions = self
            .positions
            .iter()
            .map(|&p| matrix.transform_point3(p))
            .collect();

        let normal_matrix = Mat3::from_mat4(*matrix).inverse().transpose();
        let normals = self.normals.as_ref().map(|normals| {
            normals
                .iter()
                .map(|&n| (normal_matrix * n).try_normalize().unwrap_or(n))
                .collect()
        });

        Mesh::new_with_uvs(positions, self.indices.clone(), normals, self.uvs.clone())
    }

    /// Return a copy of this mesh moved by `offset`.
    pub fn translated(&self, offset: Vec3) -> Mesh {
        self.transformed(&Mat4::from_translation(offset))
    }

    /// Append another mesh's geometry, rebasing its indices.
    ///
    /// Optional attributes survive only when both meshes carry them.
    pub fn append(&mut self, other: &Mesh) {
        let base = self.positions.len() as u32;

        self.normals = match (self.normals.take(), &other.normals) {
            (Some(mut normals), Some(extra)) => {
                normals.extend_from_slice(extra);
                Some(normals)
            }
            _ => None,
        };
        self.uvs = match (self.uvs.take(), &other.uvs) {
            (Some(mut uvs), Some(extra)) => {
                uvs.extend_from_slice(extra);
                Some(uvs)
            }
            _ => None,
        };

        self.positions.extend_from_slice(&other.positions);
        self.indices.extend(other.indices.iter().map(|i| i + base));
        self.bounds = Aabb::surrounding(&self.bounds, &other.bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn triangle() -> Mesh {
        Mesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2],
            None,
        )
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = triangle();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.has_normals());
    }

    #[test]
    fn test_compute_normals_ccw() {
        let mut mesh = triangle();
        mesh.compute_normals();

        // Counter-clockwise in the XY plane faces +Z
        for normal in mesh.normals.as_ref().unwrap() {
            assert!((normal.z - 1.0).abs() < 0.001);
        }
    }

    #[test]
    fn test_bounds_computation() {
        let mesh = Mesh::new(
            vec![
                Vec3::new(-1.0, -2.0, -3.0),
                Vec3::new(4.0, 5.0, 6.0),
                Vec3::new(0.0, 0.0, 0.0),
            ],
            vec![0, 1, 2],
            None,
        );

        assert_eq!(mesh.bounds.min(), Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(mesh.bounds.max(), Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(mesh.extent(), Vec3::new(5.0, 7.0, 9.0));
    }

    #[test]
    fn test_empty_mesh_extent_is_zero() {
        let mesh = Mesh::new(Vec::new(), Vec::new(), None);
        assert_eq!(mesh.extent(), Vec3::ZERO);
    }

    #[test]
    fn test_transformed_rotates_positions_and_normals() {
        let mut mesh = triangle();
        mesh.compute_normals();

        // +90 degrees around X turns +Y into +Z and +Z into -Y
        let rotated = mesh.transformed(&Mat4::from_rotation_x(FRAC_PI_2));

        assert!((rotated.positions[2] - Vec3::Z).length() < 0.001);
        let n = rotated.normals.as_ref().unwrap()[0];
        assert!((n - Vec3::NEG_Y).length() < 0.001);
        assert!((rotated.bounds.z.max - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_translated_moves_bounds() {
        let moved = triangle().translated(Vec3::new(-0.5, -0.5, 2.0));
        assert_eq!(moved.bounds.min(), Vec3::new(-0.5, -0.5, 2.0));
        assert_eq!(moved.center(), Vec3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_append_rebases_indices() {
        let mut a = triangle();
        let b = triangle().translated(Vec3::new(5.0, 0.0, 0.0));
        a.append(&b);

        assert_eq!(a.vertex_count(), 6);
        assert_eq!(a.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(a.bounds.x.max, 6.0);
        assert!(!a.has_normals());
    }
}
