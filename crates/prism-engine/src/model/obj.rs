use std::path::Path;

use anyhow::Context;

use crate::texture::TextureKind;

use super::importer::SceneImporter;
use super::scene::{MaterialRecord, MeshRecord, SceneGraph, SceneNode, TextureSource};

/// Wavefront OBJ with an optional MTL library.
///
/// Faces are triangulated and every OBJ object or group becomes one mesh
/// record under a single root node. `map_Kd` is the diffuse texture and
/// `map_Ks` the specular one. Texture coordinates are flipped to a top-left
/// origin, the convention the rest of the scene graph uses.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjImporter;

impl SceneImporter for ObjImporter {
    fn import(&self, path: &Path) -> anyhow::Result<SceneGraph> {
        let (models, materials) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS)
            .with_context(|| format!("reading {}", path.display()))?;

        let materials = match materials {
            Ok(materials) => materials,
            Err(e) => {
                log::warn!("{}: material library not loaded: {e}", path.display());
                Vec::new()
            }
        };

        let directory = path.parent().unwrap_or(Path::new(""));

        let mut meshes = Vec::new();
        for model in &models {
            match read_mesh(&model.mesh) {
                Some(record) => meshes.push(record),
                None => log::warn!("{}: object `{}` has no faces", path.display(), model.name),
            }
        }

        let materials = materials
            .iter()
            .map(|material| read_material(material, directory))
            .collect();

        log::debug!("imported {}: {} mesh records", path.display(), meshes.len());

        Ok(SceneGraph {
            nodes: vec![SceneNode { meshes: (0..meshes.len()).collect(), children: Vec::new() }],
            roots: vec![0],
            meshes,
            materials,
        })
    }
}

fn read_mesh(mesh: &tobj::Mesh) -> Option<MeshRecord> {
    if mesh.positions.is_empty() || mesh.indices.is_empty() {
        return None;
    }

    let positions = mesh.positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect();
    let normals = (!mesh.normals.is_empty())
        .then(|| mesh.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]).collect());
    let tex_coords = (!mesh.texcoords.is_empty())
        .then(|| mesh.texcoords.chunks_exact(2).map(|t| [t[0], 1.0 - t[1]]).collect());

    Some(MeshRecord {
        positions,
        normals,
        tex_coords,
        indices: mesh.indices.clone(),
        material: mesh.material_id,
    })
}

fn read_material(material: &tobj::Material, directory: &Path) -> MaterialRecord {
    let slots = [
        (TextureKind::Diffuse, &material.diffuse_texture),
        (TextureKind::Specular, &material.specular_texture),
    ];

    let textures = slots
        .into_iter()
        .filter_map(|(kind, name)| {
            let name = name.as_deref()?.trim();
            (!name.is_empty()).then(|| (kind, TextureSource::File(directory.join(name))))
        })
        .collect();

    MaterialRecord { textures }
}
