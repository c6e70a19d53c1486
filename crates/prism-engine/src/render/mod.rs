//! Rendering context types shared by the shader, mesh and model layers.
//!
//! Convention:
//! - right-handed world space, +Y up, camera looking down -Z
//! - clip-space depth in [0, 1] (wgpu), cleared to 1.0 each frame
//! - stencil cleared to 0 each frame

mod color;
mod ctx;
mod viewport;

pub use color::Color;
pub use ctx::{RenderCtx, RenderTarget};
pub use viewport::Viewport;
