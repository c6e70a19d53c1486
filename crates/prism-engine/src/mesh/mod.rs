//! Drawable meshes.
//!
//! [`MeshData`] is the CPU description (vertices, `u32` indices). [`Mesh`]
//! owns the uploaded buffers plus the material textures, each tagged with a
//! `(kind, slot)` pair that maps onto a shader binding name.

mod gpu;
mod material;
pub mod primitives;
mod vertex;

pub use gpu::Mesh;
pub use material::{assign_slots, binding_name, MaterialSlot};
pub use vertex::{MeshData, Vertex};
