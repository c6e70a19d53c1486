//! Prism engine crate.
//!
//! Owns the window/GPU runtime plus the rendering building blocks the demos are
//! assembled from: a fly camera, WGSL shader programs, textures, meshes and
//! scene-graph models.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod render;
pub mod camera;
pub mod shader;
pub mod texture;
pub mod mesh;
pub mod model;
