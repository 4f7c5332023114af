//! Placement math for imported pieces.
//!
//! Everything here is pure: given a piece's document attributes and its local
//! geometry, compute the object transform. Conventions follow the home
//! format: lengths in centimeters (multiplied by the import scale), the plan
//! Y axis pointing south (negated for the scene), yaw and pitch applied as
//! negative Euler XYZ angles.

use std::f32::consts::FRAC_PI_2;

use sh3d_math::{Aabb, EulerRot, Mat3, Mat4, Mat4Ext, Quat, Vec3};

use crate::host::Transform;

/// Convert a length from home units to scene units.
pub fn to_scene_units(value: f32, scale: f32) -> f32 {
    value * scale
}

/// Convert a length from scene units back to home units.
pub fn from_scene_units(value: f32, scale: f32) -> f32 {
    value / scale
}

/// Rotation from Euler XYZ angles (X applied first).
pub fn euler_xyz(angles: Vec3) -> Quat {
    Quat::from_euler(EulerRot::ZYX, angles.z, angles.y, angles.x)
}

/// Orientation an object is left in after a model rotation has been baked.
pub fn reference_orientation() -> Quat {
    euler_xyz(Vec3::new(FRAC_PI_2, 0.0, 0.0))
}

/// Translation that moves `bounds` onto the origin.
///
/// Written against the `[+x, -x, +y, -y, +z, -z]` bound order the offsets
/// were tuned with; numerically it is the negated centroid.
pub fn center_offset(bounds: &Aabb) -> Vec3 {
    let b = [
        bounds.x.max,
        bounds.x.min,
        bounds.y.max,
        bounds.y.min,
        bounds.z.max,
        bounds.z.min,
    ];
    Vec3::new(
        -b[0] - (b[1] - b[0]) / 2.0,
        -b[2] - (b[3] - b[2]) / 2.0,
        -b[4] - (b[5] - b[4]) / 2.0,
    )
}

/// Scale giving a mesh of local `extent` the requested `dimensions`.
///
/// The sign of `current` survives, so a mirrored object stays mirrored.
/// Axes with zero extent cannot be sized and keep their current scale.
pub fn dimension_scale(extent: Vec3, dimensions: Vec3, current: Vec3) -> Vec3 {
    let axis = |extent: f32, dimension: f32, current: f32| {
        if extent > 0.0 {
            (dimension / extent).copysign(current)
        } else {
            current
        }
    };
    Vec3::new(
        axis(extent.x, dimensions.x, current.x),
        axis(extent.y, dimensions.y, current.y),
        axis(extent.z, dimensions.z, current.z),
    )
}

/// A piece's `modelRotation`: a 3x3 matrix re-orienting the model file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelRotation(Mat3);

impl ModelRotation {
    /// From the document's row-major values.
    pub fn from_row_major(values: [f32; 9]) -> Self {
        Self(Mat3::from_cols_array(&values).transpose())
    }

    pub fn from_mat3(matrix: Mat3) -> Self {
        Self(matrix)
    }

    pub fn matrix(&self) -> Mat3 {
        self.0
    }

    pub fn to_quat(&self) -> Quat {
        Quat::from_mat3(&self.0)
    }

    /// Orientation after baking this rotation into the geometry and resetting
    /// the object to [`reference_orientation`].
    pub fn normalized(&self) -> Quat {
        reference_orientation() * self.to_quat()
    }
}

/// Inputs to [`compute_placement`], in home units unless noted.
#[derive(Clone, Copy, Debug)]
pub struct PlacementInput<'a> {
    /// Local geometry, origin at the bounds center
    pub positions: &'a [Vec3],

    /// Scale currently on the object (carries mirroring)
    pub current_scale: Vec3,

    pub x: f32,
    pub y: f32,
    pub elevation: Option<f32>,
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    pub angle: Option<f32>,
    pub pitch: Option<f32>,

    /// Elevation of the piece's level
    pub level_elevation: f32,

    /// Home units to scene units
    pub scale: f32,
}

/// Result of [`compute_placement`], in scene units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub transform: Transform,

    /// Vertical extent used to rest the piece on its elevation
    pub height: f32,

    /// Recentering applied after rotation (zero when not rotated)
    pub center_offset: Vec3,
}

impl Placement {
    pub fn is_recentered(&self) -> bool {
        self.center_offset != Vec3::ZERO
    }
}

/// Size, rotate and position a piece.
///
/// Yaw and pitch change the silhouette, so when either is present the
/// world-space bounds of the rotated, scaled geometry replace the declared
/// height and their center offset is added to the final location.
pub fn compute_placement(input: &PlacementInput<'_>) -> Placement {
    let s = input.scale;

    let extent = Aabb::enclosing(input.positions.iter().copied())
        .map(|b| b.extent())
        .unwrap_or(Vec3::ZERO);
    let dimensions = Vec3::new(
        to_scene_units(input.width, s),
        to_scene_units(input.depth, s),
        to_scene_units(input.height, s),
    );
    let scale = dimension_scale(extent, dimensions, input.current_scale);

    let euler = Vec3::new(
        input.pitch.map_or(0.0, |p| -p),
        0.0,
        input.angle.map_or(0.0, |a| -a),
    );
    let rotation = euler_xyz(euler);

    let mut height = dimensions.z;
    let mut offset = Vec3::ZERO;
    if input.angle.is_some() || input.pitch.is_some() {
        let matrix = Mat4::from_scale_rotation_translation(scale, rotation, Vec3::ZERO);
        if let Some(bounds) = matrix.transform_points_bounds(input.positions) {
            height = bounds.z.size();
            offset = center_offset(&bounds);
            log::debug!(
                "Rotated bounds {:?}..{:?}, height {height}, offset {offset:?}",
                bounds.min(),
                bounds.max()
            );
        }
    }

    let z = height / 2.0
        + input.elevation.map_or(0.0, |e| to_scene_units(e, s))
        + to_scene_units(input.level_elevation, s);
    let location = Vec3::new(to_scene_units(input.x, s), -to_scene_units(input.y, s), z);

    Placement {
        transform: Transform {
            translation: location + offset,
            rotation,
            scale,
        },
        height,
        center_offset: offset,
    }
}
