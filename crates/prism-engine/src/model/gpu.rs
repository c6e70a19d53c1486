use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::mesh::Mesh;
use crate::render::RenderCtx;
use crate::shader::Shader;
use crate::texture::{Texture, TextureKind, TextureOptions};

use super::cache::{TextureCache, TextureLoader};
use super::flatten::import_meshes;
use super::importer::{AutoImporter, SceneImporter};

/// Decodes and uploads textures for a model.
///
/// Scene-file textures are uploaded as stored (glTF UVs already address the
/// top row at `v = 0`).
pub struct GpuTextureLoader<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
}

impl GpuTextureLoader<'_> {
    fn options() -> TextureOptions {
        TextureOptions { flip_vertically: false, ..TextureOptions::default() }
    }
}

impl TextureLoader for GpuTextureLoader<'_> {
    type Handle = Rc<Texture>;

    fn load_file(&mut self, path: &Path, kind: TextureKind) -> Rc<Texture> {
        Rc::new(Texture::load(self.device, self.queue, path, kind, Self::options()))
    }

    fn load_bytes(&mut self, key: &Path, bytes: &[u8], kind: TextureKind) -> Rc<Texture> {
        Rc::new(Texture::from_encoded(self.device, self.queue, key, bytes, kind, Self::options()))
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ModelState {
    Unloaded,
    /// Terminal, whether or not the import produced any meshes.
    Loaded,
}

/// Meshes imported from one scene file.
pub struct Model {
    meshes: Vec<Mesh>,
    textures: TextureCache<Rc<Texture>>,
    directory: PathBuf,
    state: ModelState,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            meshes: Vec::new(),
            textures: TextureCache::new(),
            directory: PathBuf::new(),
            state: ModelState::Unloaded,
        }
    }
}

impl Model {
    /// Loads a glTF (`.gltf`/`.glb`) or Wavefront (`.obj`) file, picked by
    /// extension. Failures are logged and produce a model with no meshes.
    pub fn load(device: &wgpu::Device, queue: &wgpu::Queue, path: impl AsRef<Path>) -> Self {
        Self::load_with(&AutoImporter, device, queue, path)
    }

    pub fn load_with(
        importer: &dyn SceneImporter,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<Path>,
    ) -> Self {
        let path = path.as_ref();
        let mut model = Self { state: ModelState::Loaded, ..Self::default() };
        let mut loader = GpuTextureLoader { device, queue };

        let Some(loaded) = import_meshes(importer, path, &mut model.textures, &mut loader) else {
            return model;
        };

        model.directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        model.meshes = loaded
            .into_iter()
            .map(|m| Mesh::new(device, m.data, m.textures))
            .collect();

        log::info!(
            "loaded model {} ({} meshes, {} textures)",
            path.display(),
            model.meshes.len(),
            model.textures.len()
        );
        model
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn textures(&self) -> &TextureCache<Rc<Texture>> {
        &self.textures
    }

    /// Directory the scene file was read from; empty if the import failed.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Draws every mesh in load order.
    pub fn draw(&mut self, ctx: &RenderCtx<'_>, pass: &mut wgpu::RenderPass<'_>, shader: &mut Shader) {
        for mesh in &mut self.meshes {
            mesh.draw(ctx, pass, shader);
        }
    }
}
