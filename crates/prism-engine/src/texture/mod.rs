//! Texture decoding and upload.
//!
//! Decoding is CPU-only and testable; `Texture` owns the GPU side. Decode
//! failures never propagate: they are logged and produce a 1×1 zero texture.

mod decode;
mod gpu;

pub use decode::{
    decode_bytes, decode_file, generate_mips, mip_level_count, pixel_format_for_channels,
    DecodedImage, MipLevel, PixelFormat,
};
pub use gpu::{create_sampler, Texture, TextureKind, TextureOptions};
