use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};

use crate::texture::TextureKind;

use super::obj::ObjImporter;
use super::scene::{MaterialRecord, MeshRecord, SceneGraph, SceneNode, TextureSource};

/// Reads a scene file into a [`SceneGraph`].
pub trait SceneImporter {
    fn import(&self, path: &Path) -> anyhow::Result<SceneGraph>;
}

/// glTF 2.0 (`.gltf` with external or embedded buffers, or binary `.glb`).
///
/// Every primitive becomes one mesh record. Diffuse textures come from the
/// base color (or the specular-glossiness diffuse) texture. Specular textures
/// come from the specular-glossiness texture, else from `KHR_materials_specular`
/// (`specularTexture`, then `specularColorTexture`). Node transforms are not
/// applied.
#[derive(Debug, Default, Clone, Copy)]
pub struct GltfImporter;

impl SceneImporter for GltfImporter {
    fn import(&self, path: &Path) -> anyhow::Result<SceneGraph> {
        let gltf::Gltf { document, blob } =
            gltf::Gltf::open(path).with_context(|| format!("reading {}", path.display()))?;

        let directory = path.parent().unwrap_or(Path::new(""));
        let buffers = gltf::import_buffers(&document, Some(directory), blob)
            .with_context(|| format!("loading buffers of {}", path.display()))?;

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| anyhow!("{} has no scene", path.display()))?;

        let roots: Vec<usize> = scene.nodes().map(|n| n.index()).collect();
        if roots.is_empty() {
            bail!("{} has no root node", path.display());
        }

        let mut meshes = Vec::new();
        let mut primitives_of: HashMap<usize, Vec<usize>> = HashMap::new();
        for mesh in document.meshes() {
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    log::warn!(
                        "{}: skipping mesh {} primitive {} ({:?})",
                        path.display(),
                        mesh.index(),
                        primitive.index(),
                        primitive.mode()
                    );
                    continue;
                }
                let Some(record) = read_primitive(&primitive, &buffers) else {
                    log::warn!("{}: mesh {} primitive {} has no positions", path.display(), mesh.index(), primitive.index());
                    continue;
                };
                primitives_of.entry(mesh.index()).or_default().push(meshes.len());
                meshes.push(record);
            }
        }

        let nodes = document
            .nodes()
            .map(|node| SceneNode {
                meshes: node
                    .mesh()
                    .and_then(|m| primitives_of.get(&m.index()).cloned())
                    .unwrap_or_default(),
                children: node.children().map(|c| c.index()).collect(),
            })
            .collect();

        let materials = document
            .materials()
            .map(|material| read_material(&material, path, directory, &buffers))
            .collect();

        log::debug!(
            "imported {}: {} nodes, {} mesh records",
            path.display(),
            document.nodes().len(),
            meshes.len()
        );

        Ok(SceneGraph { nodes, roots, meshes, materials })
    }
}

/// Picks the importer from the file extension (case-insensitive).
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoImporter;

impl AutoImporter {
    pub fn for_path(path: &Path) -> anyhow::Result<&'static dyn SceneImporter> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "gltf" | "glb" => Ok(&GltfImporter),
            "obj" => Ok(&ObjImporter),
            _ => bail!("{}: unsupported model format `{extension}`", path.display()),
        }
    }
}

impl SceneImporter for AutoImporter {
    fn import(&self, path: &Path) -> anyhow::Result<SceneGraph> {
        Self::for_path(path)?.import(path)
    }
}

fn read_primitive(primitive: &gltf::Primitive<'_>, buffers: &[gltf::buffer::Data]) -> Option<MeshRecord> {
    let reader = primitive.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));

    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let normals = reader.read_normals().map(|it| it.collect());
    let tex_coords = reader.read_tex_coords(0).map(|it| it.into_f32().collect());
    let indices = match reader.read_indices() {
        Some(it) => it.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    Some(MeshRecord {
        positions,
        normals,
        tex_coords,
        indices,
        material: primitive.material().index(),
    })
}

fn read_material(
    material: &gltf::Material<'_>,
    model_path: &Path,
    directory: &Path,
    buffers: &[gltf::buffer::Data],
) -> MaterialRecord {
    let mut textures = Vec::new();
    let mut push = |kind: TextureKind, texture: gltf::Texture<'_>| {
        if let Some(source) = texture_source(&texture.source(), model_path, directory, buffers) {
            textures.push((kind, source));
        }
    };

    let specular_glossiness = material.pbr_specular_glossiness();

    let diffuse = material
        .pbr_metallic_roughness()
        .base_color_texture()
        .or_else(|| specular_glossiness.as_ref().and_then(|sg| sg.diffuse_texture()));
    if let Some(info) = diffuse {
        push(TextureKind::Diffuse, info.texture());
    }

    let specular = specular_glossiness
        .as_ref()
        .and_then(|sg| sg.specular_glossiness_texture())
        .or_else(|| {
            material
                .specular()
                .and_then(|s| s.specular_texture().or_else(|| s.specular_color_texture()))
        });
    if let Some(info) = specular {
        push(TextureKind::Specular, info.texture());
    }

    MaterialRecord { textures }
}

fn texture_source(
    image: &gltf::Image<'_>,
    model_path: &Path,
    directory: &Path,
    buffers: &[gltf::buffer::Data],
) -> Option<TextureSource> {
    match image.source() {
        gltf::image::Source::Uri { uri, .. } if uri.starts_with("data:") => {
            log::warn!("{}: data URI images are not supported (image {})", model_path.display(), image.index());
            None
        }
        gltf::image::Source::Uri { uri, .. } => Some(TextureSource::File(directory.join(uri))),
        gltf::image::Source::View { view, .. } => {
            let data = buffers.get(view.buffer().index())?;
            let bytes = data.0.get(view.offset()..view.offset() + view.length())?;
            Some(TextureSource::Embedded {
                key: embedded_key(model_path, image.index()),
                bytes: bytes.to_vec(),
            })
        }
    }
}

fn embedded_key(model_path: &Path, image: usize) -> PathBuf {
    PathBuf::from(format!("{}#image{image}", model_path.display()))
}
