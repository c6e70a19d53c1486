use std::path::{Path, PathBuf};

use super::decode::{
    decode_bytes, decode_file, generate_mips, mip_level_count, DecodedImage, MipLevel,
};

/// Semantic role of a texture within a material.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum TextureKind {
    Diffuse,
    Specular,
}

impl TextureKind {
    /// Name fragment used in material binding names (`texture_<kind><slot>`).
    pub fn as_str(self) -> &'static str {
        match self {
            TextureKind::Diffuse => "diffuse",
            TextureKind::Specular => "specular",
        }
    }

    /// Color data is sampled as sRGB; specular intensity is linear.
    pub fn is_srgb(self) -> bool {
        matches!(self, TextureKind::Diffuse)
    }
}

/// Upload options.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureOptions {
    /// Flip rows so that `v = 0` samples the bottom of the image.
    pub flip_vertically: bool,
    pub generate_mipmaps: bool,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            flip_vertically: true,
            generate_mipmaps: true,
        }
    }
}

/// A sampled 2-D texture on the GPU.
#[derive(Debug)]
pub struct Texture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    kind: TextureKind,
    source: PathBuf,
}

impl Texture {
    /// Decodes `path` and uploads it.
    ///
    /// A decode failure is logged and yields a 1×1 zero texture.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        kind: TextureKind,
        options: TextureOptions,
    ) -> Self {
        let image = decode_file(path, options.flip_vertically).unwrap_or_else(|e| {
            log::error!("texture failed to load at path {}: {e}", path.display());
            DecodedImage::zeroed()
        });
        log::debug!("loaded texture {} ({}x{}, {} channels)", path.display(), image.width, image.height, image.channels);
        Self::from_image(device, queue, path, &image, kind, options)
    }

    /// Decodes an in-memory encoded image (e.g. embedded in a scene file).
    pub fn from_encoded(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        key: &Path,
        bytes: &[u8],
        kind: TextureKind,
        options: TextureOptions,
    ) -> Self {
        let image = decode_bytes(bytes, options.flip_vertically).unwrap_or_else(|e| {
            log::error!("embedded texture {} failed to decode: {e}", key.display());
            DecodedImage::zeroed()
        });
        Self::from_image(device, queue, key, &image, kind, options)
    }

    /// 1×1 texture of one color; used for material slots nothing is bound to.
    pub fn solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        rgba: [u8; 4],
        kind: TextureKind,
    ) -> Self {
        let options = TextureOptions { flip_vertically: false, generate_mipmaps: false };
        Self::from_image(device, queue, Path::new(label), &DecodedImage::solid(rgba), kind, options)
    }

    /// Uploads an already decoded image.
    ///
    /// An image the device cannot hold (over the size limit, empty, or with a
    /// short pixel buffer) is logged and replaced by a 1×1 zero texture.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &Path,
        image: &DecodedImage,
        kind: TextureKind,
        options: TextureOptions,
    ) -> Self {
        let fallback;
        let image = match image.upload_problem(device.limits().max_texture_dimension_2d) {
            Some(problem) => {
                log::error!("texture {} cannot be uploaded: {problem}", source.display());
                fallback = DecodedImage::zeroed();
                &fallback
            }
            None => image,
        };

        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let format = image.format.texture_format(kind.is_srgb());
        let mip_level_count = if options.generate_mipmaps {
            mip_level_count(image.width, image.height)
        } else {
            1
        };

        let label = format!("prism texture {}", source.display());
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&label),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let levels = if options.generate_mipmaps {
            generate_mips(image)
        } else {
            vec![MipLevel {
                width: image.width,
                height: image.height,
                pixels: image.pixels.clone(),
            }]
        };

        let bpp = image.format.bytes_per_pixel();
        for (mip_level, level) in levels.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &level.pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(level.width * bpp),
                    rows_per_image: Some(level.height),
                },
                wgpu::Extent3d {
                    width: level.width,
                    height: level.height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        if let Some(err) = pollster::block_on(scope.pop()) {
            log::error!("texture {} rejected by the device: {err}", source.display());
            let options = TextureOptions { flip_vertically: false, generate_mipmaps: false };
            return Self::from_image(device, queue, source, &DecodedImage::zeroed(), kind, options);
        }

        Self {
            texture,
            view,
            kind,
            source: source.to_path_buf(),
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn kind(&self) -> TextureKind {
        self.kind
    }

    /// Path (or synthetic key) the texture was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }
}

/// Repeat addressing with trilinear filtering.
pub fn create_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("prism material sampler"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Linear,
        ..Default::default()
    })
}
