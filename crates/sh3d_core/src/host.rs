//! The scene operations an import drives.
//!
//! [`SceneHost`] abstracts the live scene of an authoring application: object
//! and collection management, mesh file import, transform editing and material
//! wiring. The importer only talks to this trait, which keeps its placement
//! logic testable against the in-memory [`Scene`](crate::scene::Scene).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sh3d_math::{Mat4, Quat, Vec3, Vec4};
use thiserror::Error;

use crate::mesh::Mesh;
use crate::texture::TextureError;

/// Handle to an object in the host scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

/// Handle to a collection (named grouping) in the host scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionId(pub usize);

/// Handle to a material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub usize);

/// Handle to a loaded image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub usize);

/// Errors raised by scene operations.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Failed to load mesh {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error("Mesh file {0} contains no geometry")]
    NoGeometry(PathBuf),

    #[error("No objects to join")]
    NothingToJoin,

    #[error("Unknown object {0:?}")]
    UnknownObject(ObjectId),

    #[error("Unknown collection {0:?}")]
    UnknownCollection(CollectionId),

    #[error("Unknown material {0:?}")]
    UnknownMaterial(MaterialId),

    #[error("Unknown image {0:?}")]
    UnknownImage(ImageId),
}

pub type HostResult<T> = Result<T, HostError>;

/// Transform components that can be composed into a matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Translation
    pub translation: Vec3,

    /// Rotation (as quaternion)
    pub rotation: Quat,

    /// Scale, negative components mirror
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform with only translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Create a new transform with only rotation.
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Default::default()
        }
    }

    /// Convert to a 4x4 transformation matrix.
    ///
    /// Order: Scale -> Rotate -> Translate (SRT)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Which transform components [`SceneHost::apply_transform`] bakes into geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyTransform {
    pub location: bool,
    pub rotation: bool,
    pub scale: bool,
}

impl ApplyTransform {
    pub const LOCATION_ROTATION: Self = Self {
        location: true,
        rotation: true,
        scale: false,
    };

    pub const ROTATION: Self = Self {
        location: false,
        rotation: true,
        scale: false,
    };

    /// Split `transform` into the baked matrix and what stays on the object.
    pub fn split(&self, transform: &Transform) -> (Mat4, Transform) {
        let mut baked = Transform::default();
        let mut kept = *transform;

        if self.location {
            baked.translation = transform.translation;
            kept.translation = Vec3::ZERO;
        }
        if self.rotation {
            baked.rotation = transform.rotation;
            kept.rotation = Quat::IDENTITY;
        }
        if self.scale {
            baked.scale = transform.scale;
            kept.scale = Vec3::ONE;
        }

        (baked.to_matrix(), kept)
    }
}

/// Operations on a live, exclusively owned scene.
///
/// Objects reference mesh data that may be shared between several objects
/// (linked duplicates); operations that rewrite geometry affect every user of
/// that data. Material slots belong to the mesh data as well.
pub trait SceneHost {
    /// Remove every object, mesh, material, image and non-root collection.
    fn clear(&mut self);

    /// The scene's top-level collection.
    fn root_collection(&self) -> CollectionId;

    /// Create a collection linked under `parent`.
    fn create_collection(&mut self, name: &str, parent: CollectionId) -> HostResult<CollectionId>;

    /// Load a mesh file, one object per part, linked into the root collection.
    ///
    /// New objects carry the file's Y-up to Z-up conversion as a pending rotation.
    fn import_mesh(&mut self, path: &Path) -> HostResult<Vec<ObjectId>>;

    /// Merge all `objects` into the first one, which is returned.
    fn join_objects(&mut self, objects: &[ObjectId]) -> HostResult<ObjectId>;

    /// New object sharing the mesh data of `object`, linked nowhere.
    fn duplicate_linked(&mut self, object: ObjectId) -> HostResult<ObjectId>;

    /// Rename an object and return the unique name it actually got.
    fn rename_object(&mut self, object: ObjectId, name: &str) -> HostResult<String>;

    fn object_name(&self, object: ObjectId) -> HostResult<String>;

    fn transform(&self, object: ObjectId) -> HostResult<Transform>;

    fn set_transform(&mut self, object: ObjectId, transform: Transform) -> HostResult<()>;

    /// The object's geometry in its local space.
    fn mesh(&self, object: ObjectId) -> HostResult<Arc<Mesh>>;

    /// Move the object origin to the center of its local bounding box
    /// without moving the geometry in world space.
    fn origin_to_geometry_bounds(&mut self, object: ObjectId) -> HostResult<()>;

    /// Bake the selected transform components into the geometry.
    fn apply_transform(&mut self, object: ObjectId, apply: ApplyTransform) -> HostResult<()>;

    fn shade_flat(&mut self, object: ObjectId) -> HostResult<()>;

    fn link_object(&mut self, object: ObjectId, collection: CollectionId) -> HostResult<()>;

    fn unlink_object_from_all(&mut self, object: ObjectId) -> HostResult<()>;

    /// Material slots of the object's mesh data.
    fn materials(&self, object: ObjectId) -> HostResult<Vec<MaterialId>>;

    fn material_name(&self, material: MaterialId) -> HostResult<String>;

    fn set_diffuse_color(&mut self, material: MaterialId, color: Vec4) -> HostResult<()>;

    /// Load an image file into the scene. A path that is already loaded
    /// returns the existing image.
    fn load_image(&mut self, path: &Path) -> HostResult<ImageId>;

    /// Feed `image` into the material's base color input.
    fn connect_base_color_texture(&mut self, material: MaterialId, image: ImageId) -> HostResult<()>;
}
