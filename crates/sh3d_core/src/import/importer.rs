//! The home tree walker.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sh3d_math::Vec3;
use thiserror::Error;

use crate::config::{ConfigError, ImportConfig};
use crate::home::{
    load_archive, ArchiveError, FurnitureGroup, HomeNode, Level, LoadedHome, Piece,
    PieceCategory,
};
use crate::host::{
    ApplyTransform, CollectionId, HostError, ImageId, ObjectId, SceneHost, Transform,
};
use crate::import::placement::{
    compute_placement, reference_orientation, ModelRotation, PlacementInput,
};

/// Errors that abort an import.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("Scene operation failed: {0}")]
    Host(#[from] HostError),

    #[error("Importing piece {name:?} from {model}: {source}")]
    Piece {
        name: String,
        model: PathBuf,
        #[source]
        source: HostError,
    },
}

pub type ImportResult<T> = Result<T, ImportError>;

/// Collection names created for every import.
pub mod collection_names {
    pub const HOME: &str = "Home";
    pub const LIBRARY: &str = "Library";
    pub const STRUCTURE: &str = "Structure";
    pub const DOORS_OR_WINDOWS: &str = "DoorsOrWindows";
    pub const FURNITURE: &str = "Furnitures";
    pub const LIGHTS: &str = "Lights";
}

/// What an import run created.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Mesh files loaded for pieces
    pub templates: usize,

    /// Linked duplicates of earlier templates
    pub instances: usize,

    /// Objects imported from the structure mesh
    pub structure_parts: usize,

    /// Distinct texture images loaded
    pub images: usize,

    /// Furniture group collections
    pub groups: usize,

    /// Light elements seen (not turned into scene lights)
    pub lights: usize,

    /// Nodes the importer does not handle
    pub skipped: usize,
}

/// Collections every import populates.
#[derive(Clone, Copy, Debug)]
pub struct HomeCollections {
    pub home: CollectionId,
    pub library: CollectionId,
    pub structure: CollectionId,
    pub doors_or_windows: CollectionId,
    pub furniture: CollectionId,
    pub lights: CollectionId,
}

impl HomeCollections {
    /// Create `Home` and `Library` under the root and the category
    /// collections under `Home`.
    pub fn create<H: SceneHost>(host: &mut H) -> Result<Self, HostError> {
        use collection_names::*;

        let root = host.root_collection();
        let home = host.create_collection(HOME, root)?;
        let library = host.create_collection(LIBRARY, root)?;

        Ok(Self {
            home,
            library,
            structure: host.create_collection(STRUCTURE, home)?,
            doors_or_windows: host.create_collection(DOORS_OR_WINDOWS, home)?,
            furniture: host.create_collection(FURNITURE, home)?,
            lights: host.create_collection(LIGHTS, home)?,
        })
    }

    /// Collection for a top-level piece of `category`.
    pub fn for_category(&self, category: &PieceCategory) -> CollectionId {
        match category {
            PieceCategory::DoorOrWindow => self.doors_or_windows,
            PieceCategory::Light => self.lights,
            PieceCategory::Furniture | PieceCategory::Other(_) => self.furniture,
        }
    }
}

/// Where a piece's object is linked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    /// Directly under the home: the category collection
    TopLevel,
    /// Inside a furniture group
    Group(CollectionId),
}

/// Unpack, reset the scene and import a home archive.
pub fn import_archive<H: SceneHost>(
    host: &mut H,
    archive: &Path,
    config: &ImportConfig,
) -> ImportResult<ImportReport> {
    config.validate()?;
    let home = load_archive(archive, config)?;
    import_home(host, &home, config)
}

/// Reset the scene and import an already loaded home.
pub fn import_home<H: SceneHost>(
    host: &mut H,
    home: &LoadedHome,
    config: &ImportConfig,
) -> ImportResult<ImportReport> {
    config.validate()?;
    host.clear();

    let collections = HomeCollections::create(host)?;
    let mut importer = Importer::new(host, home, config, collections);

    if config.import_structure {
        importer.import_structure()?;
    }
    importer.walk(&home.document.nodes, Target::TopLevel)?;

    let report = importer.finish();
    log::info!(
        "Import finished: {} template(s), {} instance(s), {} structure part(s), {} image(s), {} group(s)",
        report.templates,
        report.instances,
        report.structure_parts,
        report.images,
        report.groups
    );
    Ok(report)
}

/// Pieces share a template when both the name and the model rotation match,
/// since the rotation is baked into the shared geometry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TemplateKey {
    name: String,
    rotation: Option<[u32; 9]>,
}

impl TemplateKey {
    fn of(piece: &Piece) -> Self {
        Self {
            name: piece.name.clone(),
            // + 0.0 folds -0.0 into 0.0
            rotation: piece
                .model_rotation
                .map(|values| values.map(|v| (v + 0.0).to_bits())),
        }
    }
}

/// Run-scoped import state.
pub struct Importer<'a, H: SceneHost> {
    host: &'a mut H,
    home: &'a LoadedHome,
    config: &'a ImportConfig,
    collections: HomeCollections,

    /// Levels seen so far, by id
    levels: HashMap<String, Level>,

    /// First object loaded for each piece name and model rotation
    templates: HashMap<TemplateKey, ObjectId>,

    /// Images by document path
    images: HashMap<String, ImageId>,

    report: ImportReport,
}

impl<'a, H: SceneHost> Importer<'a, H> {
    pub fn new(
        host: &'a mut H,
        home: &'a LoadedHome,
        config: &'a ImportConfig,
        collections: HomeCollections,
    ) -> Self {
        Self {
            host,
            home,
            config,
            collections,
            levels: HashMap::new(),
            templates: HashMap::new(),
            images: HashMap::new(),
            report: ImportReport::default(),
        }
    }

    pub fn finish(self) -> ImportReport {
        self.report
    }

    /// Import the house structure into the `Structure` collection.
    pub fn import_structure(&mut self) -> ImportResult<()> {
        let Some(structure) = &self.home.document.structure else {
            log::warn!("Home has no structure mesh");
            return Ok(());
        };

        let path = self.home.resolve(structure);
        log::info!("Importing structure {}", path.display());

        let parts = self.host.import_mesh(&path)?;
        for &part in &parts {
            self.host.apply_transform(part, ApplyTransform::LOCATION_ROTATION)?;
        }

        for &part in &parts {
            let mut transform = self.host.transform(part)?;
            transform.scale *= self.config.scale;
            transform.translation = Vec3::ZERO;
            self.host.set_transform(part, transform)?;
            self.host.shade_flat(part)?;

            self.host.unlink_object_from_all(part)?;
            self.host.link_object(part, self.collections.structure)?;
        }

        self.report.structure_parts += parts.len();
        Ok(())
    }

    fn walk(&mut self, nodes: &[HomeNode], target: Target) -> ImportResult<()> {
        for node in nodes {
            match node {
                HomeNode::Level(level) => {
                    self.levels.insert(level.id.clone(), level.clone());
                }
                HomeNode::FurnitureGroup(group) => self.import_group(group, target)?,
                HomeNode::Piece(piece) => {
                    self.import_piece(piece, target)?;
                    if piece.light.is_some() {
                        self.note_light(piece);
                    }
                }
                HomeNode::ObserverCamera(camera) => {
                    log::debug!(
                        "Observer camera at ({}, {}, {}) yaw {} pitch {} not imported",
                        camera.x,
                        camera.y,
                        camera.z,
                        camera.yaw,
                        camera.pitch
                    );
                    self.report.skipped += 1;
                }
                HomeNode::Other(tag) => {
                    log::debug!("Skipping <{tag}>");
                    self.report.skipped += 1;
                }
            }
        }
        Ok(())
    }

    fn import_group(&mut self, group: &FurnitureGroup, target: Target) -> ImportResult<()> {
        let parent = match target {
            Target::TopLevel => self.collections.home,
            Target::Group(collection) => collection,
        };

        log::info!("Group <{}>", group.name);
        let collection = self.host.create_collection(&group.name, parent)?;
        self.report.groups += 1;

        self.walk(&group.children, Target::Group(collection))
    }

    fn import_piece(&mut self, piece: &Piece, target: Target) -> ImportResult<()> {
        let model = self.home.resolve(&piece.model);
        self.place_piece(piece, target)
            .map_err(|source| ImportError::Piece {
                name: piece.name.clone(),
                model,
                source,
            })
    }

    fn place_piece(&mut self, piece: &Piece, target: Target) -> Result<(), HostError> {
        log::info!("Importing <{}>", piece.name);

        let key = TemplateKey::of(piece);
        let (object, is_template) = match self.templates.get(&key) {
            Some(&template) => {
                log::info!("Instancing object <{}>", piece.name);
                let object = self.host.duplicate_linked(template)?;
                self.host.set_transform(object, Transform::default())?;
                self.report.instances += 1;
                (object, false)
            }
            None => {
                let object = self.load_template(piece)?;
                self.report.templates += 1;
                (object, true)
            }
        };

        self.host.unlink_object_from_all(object)?;
        let collection = match target {
            Target::TopLevel => self.collections.for_category(&piece.category),
            Target::Group(collection) => collection,
        };
        self.host.link_object(object, collection)?;
        if is_template {
            self.host.link_object(object, self.collections.library)?;
            self.templates.insert(key, object);
        }

        if piece.model_mirrored {
            let mut transform = self.host.transform(object)?;
            transform.scale.x = -transform.scale.x;
            self.host.set_transform(object, transform)?;
        }

        // Instances share geometry already baked with the same rotation
        if let (true, Some(values)) = (is_template, piece.model_rotation) {
            self.bake_model_rotation(object, ModelRotation::from_row_major(values))?;
        }

        self.apply_placement(object, piece)?;
        self.apply_colors(object, piece)?;
        self.apply_materials(object, piece)
    }

    /// Load a piece's mesh file as one object, origin at its bounds center.
    fn load_template(&mut self, piece: &Piece) -> Result<ObjectId, HostError> {
        let path = self.home.resolve(&piece.model);
        log::info!("Loading object {}", path.display());

        let parts = self.host.import_mesh(&path)?;
        let object = self.host.join_objects(&parts)?;
        self.host.rename_object(object, &piece.name)?;
        self.host.origin_to_geometry_bounds(object)?;

        let mut transform = self.host.transform(object)?;
        log::debug!("Loaded at {:?}", transform.translation);
        transform.translation = Vec3::ZERO;
        self.host.set_transform(object, transform)?;

        self.host.apply_transform(object, ApplyTransform::LOCATION_ROTATION)?;
        Ok(object)
    }

    /// Bake `rotation` into the geometry, then leave the object in the
    /// reference orientation.
    fn bake_model_rotation(&mut self, object: ObjectId, rotation: ModelRotation) -> Result<(), HostError> {
        let mut transform = self.host.transform(object)?;
        transform.rotation = rotation.to_quat();
        self.host.set_transform(object, transform)?;
        self.host.apply_transform(object, ApplyTransform::ROTATION)?;

        let mut transform = self.host.transform(object)?;
        transform.rotation = reference_orientation();
        self.host.set_transform(object, transform)
    }

    fn apply_placement(&mut self, object: ObjectId, piece: &Piece) -> Result<(), HostError> {
        let level_elevation = match &piece.level {
            Some(id) => match self.levels.get(id) {
                Some(level) => level.elevation,
                None => {
                    log::warn!("<{}> is on unknown level {id:?}", piece.name);
                    0.0
                }
            },
            None => 0.0,
        };

        let mesh = self.host.mesh(object)?;
        let current = self.host.transform(object)?;
        let placement = compute_placement(&PlacementInput {
            positions: &mesh.positions,
            current_scale: current.scale,
            x: piece.x,
            y: piece.y,
            elevation: piece.elevation,
            width: piece.width,
            depth: piece.depth,
            height: piece.height,
            angle: piece.angle,
            pitch: piece.pitch,
            level_elevation,
            scale: self.config.scale,
        });

        log::debug!(
            "<{}> location {:?} scale {:?} height {}",
            piece.name,
            placement.transform.translation,
            placement.transform.scale,
            placement.height
        );
        if placement.is_recentered() {
            log::debug!("<{}> recentered by {:?}", piece.name, placement.center_offset);
        }
        self.host.set_transform(object, placement.transform)
    }

    fn apply_colors(&mut self, object: ObjectId, piece: &Piece) -> Result<(), HostError> {
        let Some(color) = piece.color else {
            return Ok(());
        };
        for material in self.host.materials(object)? {
            self.host.set_diffuse_color(material, color.rgba())?;
        }
        Ok(())
    }

    /// Apply material overrides to every slot whose name contains the
    /// override's name.
    fn apply_materials(&mut self, object: ObjectId, piece: &Piece) -> Result<(), HostError> {
        if piece.materials.is_empty() {
            return Ok(());
        }

        let slots = self.host.materials(object)?;
        for material in &piece.materials {
            for &slot in &slots {
                let slot_name = self.host.material_name(slot)?;
                if !slot_name.contains(&material.name) {
                    continue;
                }

                if let Some(color) = material.color {
                    log::debug!("Material {slot_name}: color {:?}", color.0);
                    self.host.set_diffuse_color(slot, color.rgba())?;
                }
                if let Some(image) = &material.texture {
                    let image = self.image(image)?;
                    self.host.connect_base_color_texture(slot, image)?;
                }
            }
        }
        Ok(())
    }

    /// Load an image once per run.
    fn image(&mut self, path: &str) -> Result<ImageId, HostError> {
        if let Some(&image) = self.images.get(path) {
            log::debug!("Image already loaded: {path}");
            return Ok(image);
        }

        log::debug!("Image loading: {path}");
        let image = self.host.load_image(&self.home.resolve(path))?;
        self.images.insert(path.to_string(), image);
        self.report.images += 1;
        Ok(image)
    }

    fn note_light(&mut self, piece: &Piece) {
        if let Some(light) = &piece.light {
            log::info!(
                "Light <{}> power {} with {} source(s); scene lights are not created",
                piece.name,
                light.power,
                light.sources.len()
            );
            self.report.lights += 1;
        }
    }
}
