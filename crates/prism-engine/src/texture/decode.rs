use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, RgbaImage};

/// CPU pixel layout after decoding.
///
/// There is no three-channel texture format on the GPU, so RGB (and gray+alpha)
/// sources are widened to RGBA.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PixelFormat {
    R8,
    Rgba8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelFormat::R8 => 1,
            PixelFormat::Rgba8 => 4,
        }
    }

    /// GPU format for this layout. Single-channel data is always linear.
    pub fn texture_format(self, srgb: bool) -> wgpu::TextureFormat {
        match self {
            PixelFormat::R8 => wgpu::TextureFormat::R8Unorm,
            PixelFormat::Rgba8 if srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            PixelFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// Chooses the pixel layout for a source channel count.
pub fn pixel_format_for_channels(channels: u8) -> PixelFormat {
    match channels {
        1 => PixelFormat::R8,
        _ => PixelFormat::Rgba8,
    }
}

/// Decoded image, tightly packed rows, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Channel count of the source file (1–4).
    pub channels: u8,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    fn from_dynamic(img: DynamicImage, flip_vertically: bool) -> Self {
        let img = if flip_vertically { img.flipv() } else { img };
        let channels = img.color().channel_count();
        let format = pixel_format_for_channels(channels);
        let (width, height) = (img.width(), img.height());
        let pixels = match format {
            PixelFormat::R8 => img.into_luma8().into_raw(),
            PixelFormat::Rgba8 => img.into_rgba8().into_raw(),
        };
        Self { width, height, channels, format, pixels }
    }

    /// 1×1 transparent black image.
    pub fn zeroed() -> Self {
        Self {
            width: 1,
            height: 1,
            channels: 4,
            format: PixelFormat::Rgba8,
            pixels: vec![0; 4],
        }
    }

    /// 1×1 image of a single RGBA color.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self { pixels: rgba.to_vec(), ..Self::zeroed() }
    }

    /// Why this image cannot be uploaded to a device whose 2-D textures are
    /// at most `max_dimension` texels on a side, or `None` if it can.
    pub fn upload_problem(&self, max_dimension: u32) -> Option<String> {
        if self.width == 0 || self.height == 0 {
            return Some(format!("image is empty ({}x{})", self.width, self.height));
        }
        if self.width > max_dimension || self.height > max_dimension {
            return Some(format!(
                "{}x{} exceeds the device limit of {max_dimension} texels per side",
                self.width, self.height
            ));
        }
        let expected = self.width as u64 * self.height as u64 * self.format.bytes_per_pixel() as u64;
        if self.pixels.len() as u64 != expected {
            return Some(format!("pixel buffer holds {} bytes, expected {expected}", self.pixels.len()));
        }
        None
    }
}

pub fn decode_file(path: &Path, flip_vertically: bool) -> image::ImageResult<DecodedImage> {
    let img = image::ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(DecodedImage::from_dynamic(img, flip_vertically))
}

pub fn decode_bytes(bytes: &[u8], flip_vertically: bool) -> image::ImageResult<DecodedImage> {
    let img = image::load_from_memory(bytes)?;
    Ok(DecodedImage::from_dynamic(img, flip_vertically))
}

/// Number of levels in a full mip chain down to 1×1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// One level of a mip chain.
#[derive(Debug, Clone, PartialEq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Builds the full mip chain, level 0 being the image itself.
pub fn generate_mips(image: &DecodedImage) -> Vec<MipLevel> {
    let count = mip_level_count(image.width, image.height);
    let mut levels = Vec::with_capacity(count as usize);
    levels.push(MipLevel {
        width: image.width,
        height: image.height,
        pixels: image.pixels.clone(),
    });

    for _ in 1..count {
        let Some(prev) = levels.last() else { break };
        let (w, h) = ((prev.width / 2).max(1), (prev.height / 2).max(1));
        let pixels = match image.format {
            PixelFormat::R8 => GrayImage::from_raw(prev.width, prev.height, prev.pixels.clone())
                .map(|img| image::imageops::resize(&img, w, h, FilterType::Triangle).into_raw()),
            PixelFormat::Rgba8 => RgbaImage::from_raw(prev.width, prev.height, prev.pixels.clone())
                .map(|img| image::imageops::resize(&img, w, h, FilterType::Triangle).into_raw()),
        };
        let Some(pixels) = pixels else {
            log::warn!("mip chain truncated at {}x{}: pixel buffer size mismatch", prev.width, prev.height);
            break;
        };
        levels.push(MipLevel { width: w, height: h, pixels });
    }

    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Luma, Rgb, RgbImage};
    use std::io::Cursor;

    fn encode_png(img: DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    // ── channel mapping ───────────────────────────────────────────────────

    #[test]
    fn channel_count_selects_format() {
        assert_eq!(pixel_format_for_channels(1), PixelFormat::R8);
        assert_eq!(pixel_format_for_channels(2), PixelFormat::Rgba8);
        assert_eq!(pixel_format_for_channels(3), PixelFormat::Rgba8);
        assert_eq!(pixel_format_for_channels(4), PixelFormat::Rgba8);
    }

    #[test]
    fn srgb_only_applies_to_color_data() {
        assert_eq!(PixelFormat::R8.texture_format(true), wgpu::TextureFormat::R8Unorm);
        assert_eq!(PixelFormat::Rgba8.texture_format(true), wgpu::TextureFormat::Rgba8UnormSrgb);
        assert_eq!(PixelFormat::Rgba8.texture_format(false), wgpu::TextureFormat::Rgba8Unorm);
    }

    // ── decode ────────────────────────────────────────────────────────────

    #[test]
    fn rgb_png_is_widened_to_rgba() {
        let img = RgbImage::from_pixel(2, 1, Rgb([10, 20, 30]));
        let decoded = decode_bytes(&encode_png(DynamicImage::ImageRgb8(img)), false).unwrap();
        assert_eq!(decoded.channels, 3);
        assert_eq!(decoded.format, PixelFormat::Rgba8);
        assert_eq!(decoded.pixels, vec![10, 20, 30, 255, 10, 20, 30, 255]);
    }

    #[test]
    fn gray_png_stays_single_channel() {
        let img = GrayImage::from_pixel(3, 2, Luma([77]));
        let decoded = decode_bytes(&encode_png(DynamicImage::ImageLuma8(img)), false).unwrap();
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.format, PixelFormat::R8);
        assert_eq!(decoded.pixels.len(), 6);
    }

    #[test]
    fn flip_reverses_rows() {
        let mut img = GrayImage::new(1, 2);
        img.put_pixel(0, 0, Luma([1]));
        img.put_pixel(0, 1, Luma([2]));
        let bytes = encode_png(DynamicImage::ImageLuma8(img));
        assert_eq!(decode_bytes(&bytes, false).unwrap().pixels, vec![1, 2]);
        assert_eq!(decode_bytes(&bytes, true).unwrap().pixels, vec![2, 1]);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(decode_bytes(b"definitely not an image", false).is_err());
    }

    #[test]
    fn missing_file_fails_to_decode() {
        let path = std::env::temp_dir().join("prism-missing-texture-7c1e.png");
        assert!(decode_file(&path, true).is_err());
    }

    // ── upload limits ─────────────────────────────────────────────────────

    fn rgba(width: u32, height: u32) -> DecodedImage {
        DecodedImage {
            width,
            height,
            channels: 4,
            format: PixelFormat::Rgba8,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    #[test]
    fn image_within_limit_can_be_uploaded() {
        assert_eq!(rgba(8192, 1).upload_problem(8192), None);
        assert_eq!(DecodedImage::zeroed().upload_problem(1), None);
    }

    #[test]
    fn image_wider_than_limit_is_refused() {
        let problem = rgba(8193, 1).upload_problem(8192).unwrap();
        assert!(problem.contains("8193x1"), "{problem}");
        assert!(rgba(1, 8193).upload_problem(8192).is_some());
    }

    #[test]
    fn empty_or_short_buffers_are_refused() {
        let empty = DecodedImage { width: 0, height: 0, pixels: Vec::new(), ..DecodedImage::zeroed() };
        assert!(empty.upload_problem(8192).is_some());

        let short = DecodedImage { width: 2, height: 2, ..DecodedImage::zeroed() };
        assert!(short.upload_problem(8192).unwrap().contains("expected 16"));
    }

    // ── mips ──────────────────────────────────────────────────────────────

    #[test]
    fn mip_counts() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 1), 2);
        assert_eq!(mip_level_count(256, 128), 9);
        assert_eq!(mip_level_count(640, 480), 10);
        assert_eq!(mip_level_count(0, 0), 1);
    }

    #[test]
    fn mip_chain_halves_down_to_one_pixel() {
        let image = DecodedImage {
            width: 8,
            height: 2,
            channels: 4,
            format: PixelFormat::Rgba8,
            pixels: vec![200; 8 * 2 * 4],
        };
        let sizes: Vec<_> = generate_mips(&image).iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(sizes, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
    }

    #[test]
    fn mip_levels_have_matching_byte_counts() {
        let image = DecodedImage {
            width: 4,
            height: 4,
            channels: 1,
            format: PixelFormat::R8,
            pixels: vec![9; 16],
        };
        for level in generate_mips(&image) {
            assert_eq!(level.pixels.len() as u32, level.width * level.height);
        }
    }
}
