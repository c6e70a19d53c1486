//! WGSL shader programs.
//!
//! A [`Shader`] is built from two sources (vertex, fragment). Each source is
//! parsed and validated with naga, then the pair is "linked": entry points are
//! checked and the resource interface of both stages is reflected and merged.
//!
//! Resource conventions:
//! - `@group(0) @binding(0)`: the one uniform block. Its members are addressed
//!   by name (`"model"`, `"material.shininess"`, `"point_lights[1].position"`).
//! - `@group(1)`: material textures and samplers, matched to mesh textures by
//!   variable name (`texture_diffuse0`, `texture_specular0`, ...).
//!
//! Failures never panic. They are logged, kept as diagnostics on the shader,
//! and every draw through a failed shader is skipped.

mod compile;
mod error;
mod program;
mod reflect;
mod ring;
mod state;
mod uniforms;

pub use error::{ShaderError, ShaderStage};
pub use program::Shader;
pub use reflect::{MaterialBinding, MaterialBindingKind, UniformField, UniformLayout, UniformType};
pub use state::{BlendMode, PipelineState, StencilMode};
pub use uniforms::UniformBlock;
