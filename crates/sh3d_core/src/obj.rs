//! Wavefront OBJ loading.
//!
//! SweetHome3D archives store every model and the house structure as OBJ
//! files with an accompanying MTL library. Each OBJ object/group becomes one
//! [`ObjPart`]; materials are kept by name so the scene can build material
//! slots from them.

use std::path::Path;

use sh3d_math::Vec3;

use crate::mesh::Mesh;

/// A material parsed from the MTL library.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjMaterial {
    pub name: String,

    /// `Kd` diffuse color
    pub diffuse: Option<Vec3>,

    /// `d` dissolve, 1.0 when absent
    pub opacity: f32,

    /// `map_Kd` path, relative to the OBJ file
    pub diffuse_texture: Option<String>,
}

/// One object of an OBJ file.
#[derive(Clone, Debug)]
pub struct ObjPart {
    pub name: String,
    pub mesh: Mesh,

    /// Index into [`ObjFile::materials`]
    pub material: Option<usize>,
}

/// Everything loaded from one OBJ file.
#[derive(Clone, Debug, Default)]
pub struct ObjFile {
    pub parts: Vec<ObjPart>,
    pub materials: Vec<ObjMaterial>,
}

impl ObjFile {
    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(|p| p.mesh.vertex_count()).sum()
    }
}

/// Load an OBJ file, triangulated with a single index buffer.
///
/// A missing or broken MTL library is not fatal: the parts load without
/// materials and a warning is logged.
pub fn load_obj(path: &Path) -> Result<ObjFile, tobj::LoadError> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        },
    )?;

    let materials = match materials {
        Ok(materials) => materials,
        Err(e) => {
            log::warn!("No usable MTL library for {}: {}", path.display(), e);
            Vec::new()
        }
    };

    let parts = models.into_iter().map(convert_model).collect();
    let materials = materials.into_iter().map(convert_material).collect();

    Ok(ObjFile { parts, materials })
}

fn convert_model(model: tobj::Model) -> ObjPart {
    let mesh = model.mesh;

    let positions: Vec<Vec3> = mesh
        .positions
        .chunks_exact(3)
        .map(Vec3::from_slice)
        .collect();

    let normals = if mesh.normals.is_empty() {
        None
    } else {
        Some(mesh.normals.chunks_exact(3).map(Vec3::from_slice).collect())
    };

    let uvs = if mesh.texcoords.is_empty() {
        None
    } else {
        Some(mesh.texcoords.chunks_exact(2).map(|uv| [uv[0], uv[1]]).collect())
    };

    let mut mesh_out = Mesh::new_with_uvs(positions, mesh.indices, normals, uvs);
    mesh_out.ensure_normals();

    ObjPart {
        name: model.name,
        mesh: mesh_out,
        material: mesh.material_id,
    }
}

fn convert_material(material: tobj::Material) -> ObjMaterial {
    ObjMaterial {
        name: material.name,
        diffuse: material.diffuse.map(Vec3::from_array),
        opacity: material.dissolve.unwrap_or(1.0),
        diffuse_texture: material.diffuse_texture,
    }
}
