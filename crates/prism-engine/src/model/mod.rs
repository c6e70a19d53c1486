//! Scene-file models.
//!
//! Loading runs in three steps:
//! 1. a [`SceneImporter`] turns the file into a library-independent
//!    [`SceneGraph`] (an index arena of nodes, mesh records and materials);
//! 2. [`import_meshes`] walks the graph and resolves every material texture
//!    through a [`TextureCache`], so a path is decoded and uploaded once;
//! 3. [`Model`] uploads the resulting geometry as [`Mesh`](crate::mesh::Mesh)es.
//!
//! Steps 1 and 2 never touch the GPU; textures go through the
//! [`TextureLoader`] seam.

mod cache;
mod flatten;
mod gpu;
mod importer;
mod obj;
mod scene;

pub use cache::{TextureCache, TextureLoader};
pub use flatten::{import_meshes, LoadedMesh};
pub use gpu::{GpuTextureLoader, Model, ModelState};
pub use importer::{AutoImporter, GltfImporter, SceneImporter};
pub use obj::ObjImporter;
pub use scene::{MaterialRecord, MeshRecord, SceneGraph, SceneNode, TextureSource};
