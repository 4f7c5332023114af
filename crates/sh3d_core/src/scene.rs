//! In-memory scene graph.
//!
//! [`Scene`] is a self-contained [`SceneHost`]: objects reference shared
//! prototypes (mesh data plus material slots), collections form a tree under a
//! root, and images are decoded textures. It backs the command line tool and
//! the tests, and doubles as a reference for what each host operation means.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use sh3d_math::{Aabb, Mat4, Mat4Ext, Quat, Vec3, Vec4};

use crate::host::{
    ApplyTransform, CollectionId, HostError, HostResult, ImageId, MaterialId, ObjectId, SceneHost,
    Transform,
};
use crate::mesh::Mesh;
use crate::obj::load_obj;
use crate::texture::{load_texture, Texture};

/// Name of the root collection.
pub const ROOT_COLLECTION: &str = "Scene Collection";

/// A surface material.
#[derive(Clone, Debug)]
pub struct Material {
    /// Unique material name
    pub name: String,

    /// Viewport diffuse color (RGBA, 0-1)
    pub diffuse_color: Vec4,

    /// Texture feeding the base color, if any
    pub base_color_texture: Option<ImageId>,
}

impl Material {
    /// Create a new material with just a name and diffuse color.
    pub fn new(name: impl Into<String>, diffuse_color: Vec4) -> Self {
        Self {
            name: name.into(),
            diffuse_color,
            base_color_texture: None,
        }
    }

    /// Check if this material uses a texture.
    pub fn has_texture(&self) -> bool {
        self.base_color_texture.is_some()
    }
}

/// Mesh data shared by every object that uses it.
#[derive(Clone, Debug)]
pub struct Prototype {
    /// Unique identifier within the scene
    pub id: usize,

    /// Data name (from the mesh file part)
    pub name: String,

    /// Shared mesh geometry
    pub mesh: Arc<Mesh>,

    /// Material slots
    pub materials: Vec<MaterialId>,

    pub flat_shading: bool,
}

/// An object: a named, transformed use of a prototype.
#[derive(Clone, Debug)]
pub struct SceneObject {
    pub name: String,
    pub prototype_id: usize,
    pub transform: Transform,
}

impl SceneObject {
    /// Get the 4x4 model matrix for this object.
    pub fn model_matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }
}

/// A named grouping of objects and child collections.
#[derive(Clone, Debug)]
pub struct Collection {
    pub name: String,
    pub children: Vec<CollectionId>,
    pub objects: Vec<ObjectId>,
}

impl Collection {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            objects: Vec::new(),
        }
    }
}

/// A loaded image.
#[derive(Clone, Debug)]
pub struct Image {
    pub name: String,
    pub texture: Arc<Texture>,
}

/// A complete scene containing prototypes, objects, collections, materials and images.
#[derive(Clone, Debug)]
pub struct Scene {
    /// Scene name (usually from the archive name)
    pub name: String,

    pub prototypes: Vec<Prototype>,

    /// Objects by id; joined-away objects leave a hole
    objects: Vec<Option<SceneObject>>,

    pub collections: Vec<Collection>,

    pub materials: Vec<Material>,

    pub images: Vec<Image>,

    /// Loaded images by file path
    image_paths: HashMap<PathBuf, ImageId>,

    /// Number of mesh files read since the last clear
    mesh_loads: usize,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Scene")
    }
}

impl Scene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prototypes: Vec::new(),
            objects: Vec::new(),
            collections: vec![Collection::new(ROOT_COLLECTION)],
            materials: Vec::new(),
            images: Vec::new(),
            image_paths: HashMap::new(),
            mesh_loads: 0,
        }
    }

    /// Add a prototype to the scene and return its ID.
    pub fn add_prototype(&mut self, mesh: Arc<Mesh>, name: String) -> usize {
        let id = self.prototypes.len();
        self.prototypes.push(Prototype {
            id,
            name,
            mesh,
            materials: Vec::new(),
            flat_shading: false,
        });
        id
    }

    /// Add an object using a prototype; it is not linked to any collection.
    pub fn add_object(&mut self, prototype_id: usize, name: &str, transform: Transform) -> ObjectId {
        let name = self.unique_object_name(name);
        let id = ObjectId(self.objects.len());
        self.objects.push(Some(SceneObject {
            name,
            prototype_id,
            transform,
        }));
        id
    }

    /// Add a material to the scene, uniquifying its name.
    pub fn add_material(&mut self, mut material: Material) -> MaterialId {
        material.name = unique_name(&material.name, |n| {
            self.materials.iter().any(|m| m.name == n)
        });
        let id = MaterialId(self.materials.len());
        self.materials.push(material);
        id
    }

    pub fn object(&self, id: ObjectId) -> HostResult<&SceneObject> {
        self.objects
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(HostError::UnknownObject(id))
    }

    fn object_mut(&mut self, id: ObjectId) -> HostResult<&mut SceneObject> {
        self.objects
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(HostError::UnknownObject(id))
    }

    fn prototype_of(&self, id: ObjectId) -> HostResult<&Prototype> {
        let proto = self.object(id)?.prototype_id;
        self.prototypes.get(proto).ok_or(HostError::UnknownObject(id))
    }

    fn prototype_of_mut(&mut self, id: ObjectId) -> HostResult<&mut Prototype> {
        let proto = self.object(id)?.prototype_id;
        self.prototypes
            .get_mut(proto)
            .ok_or(HostError::UnknownObject(id))
    }

    fn collection_mut(&mut self, id: CollectionId) -> HostResult<&mut Collection> {
        self.collections
            .get_mut(id.0)
            .ok_or(HostError::UnknownCollection(id))
    }

    pub fn material(&self, id: MaterialId) -> HostResult<&Material> {
        self.materials.get(id.0).ok_or(HostError::UnknownMaterial(id))
    }

    /// Live objects with their ids.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.as_ref().map(|o| (ObjectId(i), o)))
    }

    pub fn object_by_name(&self, name: &str) -> Option<ObjectId> {
        self.objects()
            .find(|(_, o)| o.name == name)
            .map(|(id, _)| id)
    }

    pub fn collection_by_name(&self, name: &str) -> Option<CollectionId> {
        self.collections
            .iter()
            .position(|c| c.name == name)
            .map(CollectionId)
    }

    /// Objects linked directly into `collection`.
    pub fn collection_objects(&self, collection: CollectionId) -> &[ObjectId] {
        self.collections
            .get(collection.0)
            .map(|c| c.objects.as_slice())
            .unwrap_or(&[])
    }

    /// Collections `object` is linked into.
    pub fn users_collection(&self, object: ObjectId) -> Vec<CollectionId> {
        self.collections
            .iter()
            .enumerate()
            .filter(|(_, c)| c.objects.contains(&object))
            .map(|(i, _)| CollectionId(i))
            .collect()
    }

    /// Number of objects sharing `object`'s mesh data, itself included.
    pub fn data_users(&self, object: ObjectId) -> usize {
        match self.object(object) {
            Ok(target) => self
                .objects()
                .filter(|(_, o)| o.prototype_id == target.prototype_id)
                .count(),
            Err(_) => 0,
        }
    }

    /// Get total object count.
    pub fn object_count(&self) -> usize {
        self.objects().count()
    }

    /// Get prototype count.
    pub fn prototype_count(&self) -> usize {
        self.prototypes.len()
    }

    /// Get material count.
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Number of mesh files read since the last clear.
    pub fn mesh_loads(&self) -> usize {
        self.mesh_loads
    }

    /// Get total triangle count across all objects.
    pub fn total_triangle_count(&self) -> usize {
        self.objects()
            .filter_map(|(_, o)| self.prototypes.get(o.prototype_id))
            .map(|p| p.mesh.triangle_count())
            .sum()
    }

    /// Compute the world-space bounding box of all objects.
    pub fn world_bounds(&self) -> Aabb {
        self.objects()
            .filter_map(|(_, o)| {
                let proto = self.prototypes.get(o.prototype_id)?;
                Some(o.model_matrix().transform_aabb(&proto.mesh.bounds))
            })
            .fold(Aabb::EMPTY, |acc, b| Aabb::surrounding(&acc, &b))
    }

    /// World-space bounds of one object, computed from its vertices.
    pub fn object_world_bounds(&self, object: ObjectId) -> HostResult<Option<Aabb>> {
        let matrix = self.object(object)?.model_matrix();
        let mesh = &self.prototype_of(object)?.mesh;
        Ok(matrix.transform_points_bounds(&mesh.positions))
    }

    /// Serializable overview of the scene.
    pub fn summary(&self) -> SceneSummary {
        let bounds = self.world_bounds();
        SceneSummary {
            name: self.name.clone(),
            objects: self.object_count(),
            prototypes: self.prototype_count(),
            materials: self.material_count(),
            images: self.images.len(),
            triangles: self.total_triangle_count(),
            bounds: (!bounds.is_empty()).then(|| [bounds.min().to_array(), bounds.max().to_array()]),
            collections: self.collection_summary(CollectionId(0)),
        }
    }

    fn collection_summary(&self, id: CollectionId) -> CollectionSummary {
        let collection = &self.collections[id.0];
        CollectionSummary {
            name: collection.name.clone(),
            objects: collection
                .objects
                .iter()
                .filter_map(|&o| self.object(o).ok())
                .map(|o| ObjectSummary {
                    name: o.name.clone(),
                    location: o.transform.translation.to_array(),
                    dimensions: self
                        .prototypes
                        .get(o.prototype_id)
                        .map(|p| (p.mesh.extent() * o.transform.scale.abs()).to_array())
                        .unwrap_or_default(),
                })
                .collect(),
            children: collection
                .children
                .iter()
                .map(|&c| self.collection_summary(c))
                .collect(),
        }
    }

    fn unique_object_name(&self, base: &str) -> String {
        let taken: HashSet<&str> = self.objects().map(|(_, o)| o.name.as_str()).collect();
        unique_name(base, |n| taken.contains(n))
    }
}

/// `base`, or `base.001`, `base.002`, ... until `taken` says no.
fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|i| format!("{base}.{i:03}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

impl SceneHost for Scene {
    fn clear(&mut self) {
        let name = std::mem::take(&mut self.name);
        *self = Scene::new(name);
    }

    fn root_collection(&self) -> CollectionId {
        CollectionId(0)
    }

    fn create_collection(&mut self, name: &str, parent: CollectionId) -> HostResult<CollectionId> {
        if parent.0 >= self.collections.len() {
            return Err(HostError::UnknownCollection(parent));
        }

        let name = unique_name(name, |n| self.collections.iter().any(|c| c.name == n));
        let id = CollectionId(self.collections.len());
        self.collections.push(Collection::new(name));
        self.collection_mut(parent)?.children.push(id);
        Ok(id)
    }

    fn import_mesh(&mut self, path: &Path) -> HostResult<Vec<ObjectId>> {
        let obj = load_obj(path).map_err(|source| HostError::Obj {
            path: path.to_path_buf(),
            source,
        })?;
        self.mesh_loads += 1;

        if obj.parts.is_empty() {
            return Err(HostError::NoGeometry(path.to_path_buf()));
        }

        let mut materials = Vec::with_capacity(obj.materials.len());
        for m in &obj.materials {
            let rgb = m.diffuse.unwrap_or(Vec3::splat(0.8));
            let material = self.add_material(Material::new(&m.name, rgb.extend(m.opacity)));

            // map_Kd is relative to the OBJ; a broken one only costs the texture
            if let Some(texture) = &m.diffuse_texture {
                let texture_path = path.parent().unwrap_or(Path::new("")).join(texture);
                match self.load_image(&texture_path) {
                    Ok(image) => self.connect_base_color_texture(material, image)?,
                    Err(e) => log::warn!("Material {}: {}", m.name, e),
                }
            }
            materials.push(material);
        }

        // OBJ is Y-up; the scene is Z-up
        let axis_conversion = Transform::from_rotation(Quat::from_rotation_x(std::f32::consts::FRAC_PI_2));

        let root = self.root_collection();
        let mut objects = Vec::with_capacity(obj.parts.len());
        for part in obj.parts {
            let proto = self.add_prototype(Arc::new(part.mesh), part.name.clone());
            if let Some(&material) = part.material.and_then(|i| materials.get(i)) {
                self.prototypes[proto].materials.push(material);
            }

            let object = self.add_object(proto, &part.name, axis_conversion);
            self.link_object(object, root)?;
            objects.push(object);
        }

        log::debug!(
            "Imported {} object(s) and {} material(s) from {}",
            objects.len(),
            materials.len(),
            path.display()
        );
        Ok(objects)
    }

    fn join_objects(&mut self, objects: &[ObjectId]) -> HostResult<ObjectId> {
        let (&target, rest) = objects.split_first().ok_or(HostError::NothingToJoin)?;

        let to_local = self.object(target)?.model_matrix().inverse();
        let mut mesh = (*self.prototype_of(target)?.mesh).clone();
        let mut slots = self.prototype_of(target)?.materials.clone();

        for &other in rest {
            let matrix = to_local * self.object(other)?.model_matrix();
            let proto = self.prototype_of(other)?;
            mesh.append(&proto.mesh.transformed(&matrix));
            for material in &proto.materials {
                if !slots.contains(material) {
                    slots.push(*material);
                }
            }
        }

        for &other in rest {
            self.unlink_object_from_all(other)?;
            self.objects[other.0] = None;
        }

        let proto = self.prototype_of_mut(target)?;
        proto.mesh = Arc::new(mesh);
        proto.materials = slots;
        Ok(target)
    }

    fn duplicate_linked(&mut self, object: ObjectId) -> HostResult<ObjectId> {
        let source = self.object(object)?.clone();
        Ok(self.add_object(source.prototype_id, &source.name, source.transform))
    }

    fn rename_object(&mut self, object: ObjectId, name: &str) -> HostResult<String> {
        if self.object(object)?.name == name {
            return Ok(name.to_string());
        }
        // The object's own current name does not count as taken
        let taken: HashSet<&str> = self
            .objects()
            .filter(|&(id, _)| id != object)
            .map(|(_, o)| o.name.as_str())
            .collect();
        let unique = unique_name(name, |n| taken.contains(n));
        self.object_mut(object)?.name = unique.clone();
        Ok(unique)
    }

    fn object_name(&self, object: ObjectId) -> HostResult<String> {
        Ok(self.object(object)?.name.clone())
    }

    fn transform(&self, object: ObjectId) -> HostResult<Transform> {
        Ok(self.object(object)?.transform)
    }

    fn set_transform(&mut self, object: ObjectId, transform: Transform) -> HostResult<()> {
        self.object_mut(object)?.transform = transform;
        Ok(())
    }

    fn mesh(&self, object: ObjectId) -> HostResult<Arc<Mesh>> {
        Ok(self.prototype_of(object)?.mesh.clone())
    }

    fn origin_to_geometry_bounds(&mut self, object: ObjectId) -> HostResult<()> {
        let mesh = self.mesh(object)?;
        if mesh.bounds.is_empty() {
            return Ok(());
        }
        let center = mesh.center();

        let transform = self.object(object)?.transform;
        let world_shift = transform.rotation * (transform.scale * center);

        self.prototype_of_mut(object)?.mesh = Arc::new(mesh.translated(-center));
        self.object_mut(object)?.transform.translation += world_shift;
        Ok(())
    }

    fn apply_transform(&mut self, object: ObjectId, apply: ApplyTransform) -> HostResult<()> {
        let (baked, kept) = apply.split(&self.object(object)?.transform);
        let mesh = self.mesh(object)?;

        self.prototype_of_mut(object)?.mesh = Arc::new(mesh.transformed(&baked));
        self.object_mut(object)?.transform = kept;
        Ok(())
    }

    fn shade_flat(&mut self, object: ObjectId) -> HostResult<()> {
        self.prototype_of_mut(object)?.flat_shading = true;
        Ok(())
    }

    fn link_object(&mut self, object: ObjectId, collection: CollectionId) -> HostResult<()> {
        self.object(object)?;
        let collection = self.collection_mut(collection)?;
        if !collection.objects.contains(&object) {
            collection.objects.push(object);
        }
        Ok(())
    }

    fn unlink_object_from_all(&mut self, object: ObjectId) -> HostResult<()> {
        self.object(object)?;
        for collection in &mut self.collections {
            collection.objects.retain(|&o| o != object);
        }
        Ok(())
    }

    fn materials(&self, object: ObjectId) -> HostResult<Vec<MaterialId>> {
        Ok(self.prototype_of(object)?.materials.clone())
    }

    fn material_name(&self, material: MaterialId) -> HostResult<String> {
        Ok(self.material(material)?.name.clone())
    }

    fn set_diffuse_color(&mut self, material: MaterialId, color: Vec4) -> HostResult<()> {
        self.materials
            .get_mut(material.0)
            .ok_or(HostError::UnknownMaterial(material))?
            .diffuse_color = color;
        Ok(())
    }

    fn load_image(&mut self, path: &Path) -> HostResult<ImageId> {
        if let Some(&image) = self.image_paths.get(path) {
            log::debug!("Image already loaded: {}", path.display());
            return Ok(image);
        }

        let texture = load_texture(path)?;
        let base = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Image".to_string());
        let name = unique_name(&base, |n| self.images.iter().any(|i| i.name == n));

        let id = ImageId(self.images.len());
        self.images.push(Image {
            name,
            texture: Arc::new(texture),
        });
        self.image_paths.insert(path.to_path_buf(), id);
        Ok(id)
    }

    fn connect_base_color_texture(&mut self, material: MaterialId, image: ImageId) -> HostResult<()> {
        if image.0 >= self.images.len() {
            return Err(HostError::UnknownImage(image));
        }
        self.materials
            .get_mut(material.0)
            .ok_or(HostError::UnknownMaterial(material))?
            .base_color_texture = Some(image);
        Ok(())
    }
}

/// Overview of a scene for reports.
#[derive(Clone, Debug, Serialize)]
pub struct SceneSummary {
    pub name: String,
    pub objects: usize,
    pub prototypes: usize,
    pub materials: usize,
    pub images: usize,
    pub triangles: usize,
    /// `[min, max]` world corners
    pub bounds: Option<[[f32; 3]; 2]>,
    pub collections: CollectionSummary,
}

#[derive(Clone, Debug, Serialize)]
pub struct CollectionSummary {
    pub name: String,
    pub objects: Vec<ObjectSummary>,
    pub children: Vec<CollectionSummary>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ObjectSummary {
    pub name: String,
    pub location: [f32; 3],
    pub dimensions: [f32; 3],
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn unit_cube(offset: Vec3) -> Arc<Mesh> {
        let positions = (0..8)
            .map(|i| {
                Vec3::new(
                    (i & 1) as f32,
                    ((i >> 1) & 1) as f32,
                    ((i >> 2) & 1) as f32,
                ) + offset
            })
            .collect();
        Arc::new(Mesh::new(positions, vec![0, 1, 2, 1, 3, 2], None))
    }

    fn scene_with_cube(offset: Vec3) -> (Scene, ObjectId) {
        let mut scene = Scene::new("test");
        let proto = scene.add_prototype(unit_cube(offset), "cube".to_string());
        let object = scene.add_object(proto, "Cube", Transform::default());
        let root = scene.root_collection();
        scene.link_object(object, root).unwrap();
        (scene, object)
    }

    #[test]
    fn test_unique_names() {
        let (mut scene, cube) = scene_with_cube(Vec3::ZERO);
        let copy1 = scene.duplicate_linked(cube).unwrap();
        let copy2 = scene.duplicate_linked(cube).unwrap();

        assert_eq!(scene.object(copy1).unwrap().name, "Cube.001");
        assert_eq!(scene.object(copy2).unwrap().name, "Cube.002");
        assert_eq!(scene.rename_object(copy2, "Cube").unwrap(), "Cube.002");
        assert_eq!(scene.rename_object(copy2, "Crate").unwrap(), "Crate");
        assert_eq!(scene.rename_object(copy1, "Crate").unwrap(), "Crate.001");
    }

    #[test]
    fn test_duplicate_linked_shares_data_and_is_unlinked() {
        let (mut scene, cube) = scene_with_cube(Vec3::ZERO);
        let copy = scene.duplicate_linked(cube).unwrap();

        assert_eq!(scene.prototype_count(), 1);
        assert_eq!(scene.data_users(cube), 2);
        assert!(scene.users_collection(copy).is_empty());
        assert!(Arc::ptr_eq(&scene.mesh(cube).unwrap(), &scene.mesh(copy).unwrap()));
    }

    #[test]
    fn test_origin_to_geometry_bounds_keeps_world_position() {
        let (mut scene, cube) = scene_with_cube(Vec3::new(2.0, 0.0, 0.0));
        let before = scene.object_world_bounds(cube).unwrap().unwrap();

        scene.origin_to_geometry_bounds(cube).unwrap();

        let mesh = scene.mesh(cube).unwrap();
        assert!(mesh.center().length() < 0.001);
        let t = scene.transform(cube).unwrap();
        assert!((t.translation - Vec3::new(2.5, 0.5, 0.5)).length() < 0.001);

        let after = scene.object_world_bounds(cube).unwrap().unwrap();
        assert!((after.min() - before.min()).length() < 0.001);
        assert!((after.max() - before.max()).length() < 0.001);
    }

    #[test]
    fn test_apply_rotation_bakes_geometry() {
        let (mut scene, cube) = scene_with_cube(Vec3::ZERO);
        scene
            .set_transform(cube, Transform::from_rotation(Quat::from_rotation_x(FRAC_PI_2)))
            .unwrap();

        scene.apply_transform(cube, ApplyTransform::ROTATION).unwrap();

        assert_eq!(scene.transform(cube).unwrap().rotation, Quat::IDENTITY);
        let bounds = scene.mesh(cube).unwrap().bounds;
        // +Y rotated onto +Z, +Z onto -Y
        assert!((bounds.y.min + 1.0).abs() < 0.001);
        assert!((bounds.z.max - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_join_objects_merges_into_first() {
        let (mut scene, cube) = scene_with_cube(Vec3::ZERO);
        let other_proto = scene.add_prototype(unit_cube(Vec3::ZERO), "other".to_string());
        let other = scene.add_object(
            other_proto,
            "Other",
            Transform::from_translation(Vec3::new(3.0, 0.0, 0.0)),
        );
        let root = scene.root_collection();
        scene.link_object(other, root).unwrap();

        let joined = scene.join_objects(&[cube, other]).unwrap();

        assert_eq!(joined, cube);
        assert_eq!(scene.object_count(), 1);
        assert!(scene.object(other).is_err());
        let mesh = scene.mesh(cube).unwrap();
        assert_eq!(mesh.vertex_count(), 16);
        assert!((mesh.bounds.x.max - 4.0).abs() < 0.001);
        assert_eq!(scene.collection_objects(root), &[cube]);
    }

    #[test]
    fn test_collections_and_linking() {
        let (mut scene, cube) = scene_with_cube(Vec3::ZERO);
        let root = scene.root_collection();
        let home = scene.create_collection("Home", root).unwrap();
        let again = scene.create_collection("Home", root).unwrap();

        assert_eq!(scene.collections[again.0].name, "Home.001");
        assert_eq!(scene.collections[root.0].children, vec![home, again]);

        scene.unlink_object_from_all(cube).unwrap();
        scene.link_object(cube, home).unwrap();
        scene.link_object(cube, home).unwrap();

        assert_eq!(scene.users_collection(cube), vec![home]);
        assert_eq!(scene.collection_objects(home), &[cube]);
        assert!(scene.collection_objects(root).is_empty());
        assert!(scene.create_collection("Orphan", CollectionId(99)).is_err());
    }

    #[test]
    fn test_clear_keeps_only_root() {
        let (mut scene, _) = scene_with_cube(Vec3::ZERO);
        let root = scene.root_collection();
        scene.create_collection("Home", root).unwrap();
        scene.add_material(Material::new("m", Vec4::ONE));

        scene.clear();

        assert_eq!(scene.name, "test");
        assert_eq!(scene.object_count(), 0);
        assert_eq!(scene.prototype_count(), 0);
        assert_eq!(scene.material_count(), 0);
        assert_eq!(scene.collections.len(), 1);
        assert_eq!(scene.collections[0].name, ROOT_COLLECTION);
    }

    #[test]
    fn test_materials_and_textures() {
        let (mut scene, cube) = scene_with_cube(Vec3::ZERO);
        let wood = scene.add_material(Material::new("wood", Vec4::ONE));
        let wood2 = scene.add_material(Material::new("wood", Vec4::ONE));
        scene.prototype_of_mut(cube).unwrap().materials = vec![wood, wood2];

        assert_eq!(scene.material_name(wood2).unwrap(), "wood.001");
        assert_eq!(scene.materials(cube).unwrap(), vec![wood, wood2]);

        scene.set_diffuse_color(wood, Vec4::new(1.0, 0.0, 0.0, 1.0)).unwrap();
        assert_eq!(scene.material(wood).unwrap().diffuse_color.x, 1.0);

        assert!(scene.connect_base_color_texture(wood, ImageId(0)).is_err());
        assert!(!scene.material(wood).unwrap().has_texture());
    }

    #[test]
    fn test_import_mesh_reads_parts_and_materials() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("lamp.obj"),
            "mtllib lamp.mtl\no Base\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl metal\nf 1 2 3\n\
             o Shade\nv 0 2 0\nv 1 2 0\nv 0 3 0\nusemtl linen\nf 4 5 6\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("lamp.mtl"),
            "newmtl metal\nKd 0.5 0.5 0.5\nmap_Kd brushed.png\n\nnewmtl linen\nKd 1 1 1\nd 0.5\nmap_Kd missing.png\n",
        )
        .unwrap();
        image::RgbaImage::new(1, 1)
            .save(dir.path().join("brushed.png"))
            .unwrap();

        let mut scene = Scene::new("test");
        let parts = scene.import_mesh(&dir.path().join("lamp.obj")).unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(scene.mesh_loads(), 1);
        assert_eq!(scene.collection_objects(scene.root_collection()), parts.as_slice());

        // Y-up parts arrive with a pending axis conversion
        let t = scene.transform(parts[0]).unwrap();
        assert!(t.rotation.angle_between(Quat::from_rotation_x(FRAC_PI_2)) < 0.001);

        let metal = scene.material(scene.materials(parts[0]).unwrap()[0]).unwrap();
        assert_eq!(metal.name, "metal");
        assert_eq!(metal.base_color_texture, Some(ImageId(0)));

        let linen = scene.material(scene.materials(parts[1]).unwrap()[0]).unwrap();
        assert_eq!(linen.diffuse_color.w, 0.5);
        assert!(!linen.has_texture());
    }

    #[test]
    fn test_shared_mtl_texture_loads_once() {
        let dir = tempfile::tempdir().unwrap();
        let obj = |material: &str| {
            format!("mtllib shared.mtl\no Part\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl {material}\nf 1 2 3\n")
        };
        std::fs::write(dir.path().join("table.obj"), obj("wood")).unwrap();
        std::fs::write(dir.path().join("shelf.obj"), obj("wood")).unwrap();
        std::fs::write(dir.path().join("shared.mtl"), "newmtl wood\nKd 1 1 1\nmap_Kd wood.png\n").unwrap();
        image::RgbaImage::new(1, 1).save(dir.path().join("wood.png")).unwrap();

        let mut scene = Scene::new("test");
        let table = scene.import_mesh(&dir.path().join("table.obj")).unwrap()[0];
        let shelf = scene.import_mesh(&dir.path().join("shelf.obj")).unwrap()[0];

        assert_eq!(scene.images.len(), 1);
        assert_eq!(scene.images[0].name, "wood.png");
        for object in [table, shelf] {
            let slot = scene.materials(object).unwrap()[0];
            assert_eq!(scene.material(slot).unwrap().base_color_texture, Some(ImageId(0)));
        }
        assert_eq!(scene.load_image(&dir.path().join("wood.png")).unwrap(), ImageId(0));

        scene.clear();
        assert!(scene.images.is_empty());
        assert_eq!(scene.load_image(&dir.path().join("wood.png")).unwrap(), ImageId(0));
        assert_eq!(scene.images.len(), 1);
    }

    #[test]
    fn test_import_mesh_missing_file() {
        let mut scene = Scene::new("test");
        let err = scene.import_mesh(Path::new("/nowhere/chair.obj")).unwrap_err();

        assert!(matches!(err, HostError::Obj { .. }));
        assert_eq!(scene.mesh_loads(), 0);
    }

    #[test]
    fn test_world_bounds() {
        let (mut scene, cube) = scene_with_cube(Vec3::ZERO);
        scene
            .set_transform(cube, Transform::from_translation(Vec3::new(0.0, 0.0, 5.0)))
            .unwrap();

        let bounds = scene.world_bounds();
        assert_eq!(bounds.min(), Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(bounds.max(), Vec3::new(1.0, 1.0, 6.0));

        let summary = scene.summary();
        assert_eq!(summary.objects, 1);
        assert_eq!(summary.collections.objects[0].name, "Cube");
    }
}
