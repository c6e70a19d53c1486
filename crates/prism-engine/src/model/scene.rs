use std::collections::HashSet;
use std::path::PathBuf;

use crate::texture::TextureKind;

/// Where a material texture comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureSource {
    /// Image file, already joined with the model's directory.
    File(PathBuf),
    /// Encoded image stored inside the scene file. `key` is a synthetic path
    /// (`<model>#image<N>`) used for deduplication.
    Embedded { key: PathBuf, bytes: Vec<u8> },
}

impl TextureSource {
    /// Cache key for this source.
    pub fn key(&self) -> &std::path::Path {
        match self {
            TextureSource::File(path) => path,
            TextureSource::Embedded { key, .. } => key,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneNode {
    /// Indices into [`SceneGraph::meshes`].
    pub meshes: Vec<usize>,
    /// Indices into [`SceneGraph::nodes`].
    pub children: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshRecord {
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    /// First texture coordinate set only.
    pub tex_coords: Option<Vec<[f32; 2]>>,
    /// Triangle list.
    pub indices: Vec<u32>,
    /// Index into [`SceneGraph::materials`].
    pub material: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialRecord {
    pub textures: Vec<(TextureKind, TextureSource)>,
}

/// An imported scene, detached from the file format it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneGraph {
    pub nodes: Vec<SceneNode>,
    pub roots: Vec<usize>,
    pub meshes: Vec<MeshRecord>,
    pub materials: Vec<MaterialRecord>,
}

impl SceneGraph {
    /// Mesh record indices in depth-first pre-order: a node's meshes, then
    /// its children in order.
    ///
    /// Walks an explicit stack. A node reachable along several paths is
    /// visited once, so shared subtrees and cycles are harmless. Out-of-range
    /// indices are skipped.
    pub fn mesh_order(&self) -> Vec<usize> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();

        while let Some(index) = stack.pop() {
            if !visited.insert(index) {
                continue;
            }
            let Some(node) = self.nodes.get(index) else {
                log::warn!("scene references missing node {index}");
                continue;
            };

            order.extend(node.meshes.iter().copied().filter(|&m| m < self.meshes.len()));
            stack.extend(node.children.iter().rev());
        }

        order
    }
}
