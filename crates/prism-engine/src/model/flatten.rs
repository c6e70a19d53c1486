use std::path::Path;

use crate::mesh::{MeshData, Vertex};

use super::cache::{TextureCache, TextureLoader};
use super::importer::SceneImporter;
use super::scene::{MeshRecord, SceneGraph};

/// Geometry and resolved textures of one mesh, ready for upload.
#[derive(Debug, Clone)]
pub struct LoadedMesh<H> {
    pub data: MeshData,
    pub textures: Vec<H>,
}

/// Imports `path` and flattens it into meshes in scene pre-order.
///
/// Returns `None` when the importer fails; the error is logged.
pub fn import_meshes<L: TextureLoader>(
    importer: &dyn SceneImporter,
    path: &Path,
    cache: &mut TextureCache<L::Handle>,
    loader: &mut L,
) -> Option<Vec<LoadedMesh<L::Handle>>> {
    let graph = match importer.import(path) {
        Ok(graph) => graph,
        Err(e) => {
            log::error!("failed to import model {}: {e:#}", path.display());
            return None;
        }
    };

    Some(flatten(&graph, cache, loader))
}

pub(crate) fn flatten<L: TextureLoader>(
    graph: &SceneGraph,
    cache: &mut TextureCache<L::Handle>,
    loader: &mut L,
) -> Vec<LoadedMesh<L::Handle>> {
    graph
        .mesh_order()
        .into_iter()
        .map(|index| {
            let record = &graph.meshes[index];

            let textures = record
                .material
                .and_then(|m| graph.materials.get(m))
                .map(|material| {
                    material
                        .textures
                        .iter()
                        .map(|(kind, source)| cache.resolve(loader, source, *kind))
                        .collect()
                })
                .unwrap_or_default();

            LoadedMesh { data: mesh_data(record), textures }
        })
        .collect()
}

/// Interleaves a record; missing normals and texture coordinates read as zero.
fn mesh_data(record: &MeshRecord) -> MeshData {
    let vertices = record
        .positions
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            let normal = record
                .normals
                .as_ref()
                .and_then(|n| n.get(i).copied())
                .unwrap_or([0.0; 3]);
            let tex_coords = record
                .tex_coords
                .as_ref()
                .and_then(|t| t.get(i).copied())
                .unwrap_or([0.0; 2]);
            Vertex::new(position, normal, tex_coords)
        })
        .collect();

    MeshData::new(vertices, record.indices.clone())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::model::cache::tests::CountingLoader;
    use crate::model::scene::{MaterialRecord, SceneNode, TextureSource};
    use crate::texture::TextureKind;

    struct FixedImporter(SceneGraph);

    impl SceneImporter for FixedImporter {
        fn import(&self, _path: &Path) -> anyhow::Result<SceneGraph> {
            Ok(self.0.clone())
        }
    }

    struct FailingImporter;

    impl SceneImporter for FailingImporter {
        fn import(&self, path: &Path) -> anyhow::Result<SceneGraph> {
            anyhow::bail!("cannot open {}", path.display())
        }
    }

    fn triangle_record(material: Option<usize>) -> MeshRecord {
        MeshRecord {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: Some(vec![[0.0, 0.0, 1.0]; 3]),
            tex_coords: None,
            indices: vec![0, 1, 2],
            material,
        }
    }

    /// Two nodes whose meshes share one material.
    fn two_meshes_one_material() -> SceneGraph {
        SceneGraph {
            nodes: vec![
                SceneNode { meshes: vec![0], children: vec![1] },
                SceneNode { meshes: vec![1], children: vec![] },
            ],
            roots: vec![0],
            meshes: vec![triangle_record(Some(0)), triangle_record(Some(0))],
            materials: vec![MaterialRecord {
                textures: vec![
                    (TextureKind::Diffuse, TextureSource::File(PathBuf::from("m/body_diff.png"))),
                    (TextureKind::Specular, TextureSource::File(PathBuf::from("m/body_spec.png"))),
                ],
            }],
        }
    }

    #[test]
    fn shared_textures_load_once() {
        let importer = FixedImporter(two_meshes_one_material());
        let mut cache = TextureCache::new();
        let mut loader = CountingLoader::default();

        let meshes = import_meshes(&importer, Path::new("m/scene.gltf"), &mut cache, &mut loader)
            .expect("import succeeds");

        assert_eq!(meshes.len(), 2);
        assert_eq!(loader.loads.len(), 2);
        assert_eq!(meshes[0].textures, meshes[1].textures);
        assert_eq!(meshes[0].textures, vec![0, 1]);
    }

    #[test]
    fn failed_import_yields_nothing() {
        let mut cache = TextureCache::new();
        let mut loader = CountingLoader::default();

        let meshes = import_meshes(&FailingImporter, Path::new("missing.gltf"), &mut cache, &mut loader);

        assert!(meshes.is_none());
        assert!(loader.loads.is_empty());
    }

    #[test]
    fn missing_attributes_read_as_zero() {
        let mut record = triangle_record(None);
        record.normals = None;
        let data = mesh_data(&record);
        assert_eq!(data.vertices.len(), 3);
        assert!(data.vertices.iter().all(|v| v.normal == [0.0; 3] && v.tex_coords == [0.0; 2]));
        assert_eq!(data.indices, vec![0, 1, 2]);
    }

    #[test]
    fn mesh_without_material_has_no_textures() {
        let graph = SceneGraph {
            nodes: vec![SceneNode { meshes: vec![0], children: vec![] }],
            roots: vec![0],
            meshes: vec![triangle_record(None)],
            materials: vec![],
        };
        let mut cache = TextureCache::new();
        let mut loader = CountingLoader::default();

        let meshes = flatten(&graph, &mut cache, &mut loader);
        assert_eq!(meshes.len(), 1);
        assert!(meshes[0].textures.is_empty());
    }
}
