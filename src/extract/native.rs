//! Built-in foreground extractor.

use bytes::Bytes;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{imageops, ExtendedColorType, GrayImage, ImageEncoder, RgbaImage};
use tracing::debug;

use super::options::ExtractOptions;
use super::refine::{close, open, refine_edges};
use super::segment::segment;
use super::ForegroundExtractor;
use crate::error::ExtractionError;

/// Foreground extractor that needs no model files.
///
/// Segments the image with border-seeded color models, cleans the mask with
/// morphology, softens its edges and writes the result into the alpha channel
/// of a full-resolution RGBA PNG.
///
/// # Example
///
/// ```no_run
/// use bg_remover::extract::{ExtractOptions, ForegroundExtractor, NativeExtractor, QualityPreset};
///
/// let extractor = NativeExtractor::new(ExtractOptions::from_preset(QualityPreset::Fast));
/// let photo = std::fs::read("photo.jpg").unwrap();
/// let png = extractor.extract(&photo).unwrap();
/// std::fs::write("cutout.png", &png).unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct NativeExtractor {
    options: ExtractOptions,
}

impl NativeExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Compute the soft alpha mask for an already decoded image.
    pub fn alpha_mask(&self, image: &RgbaImage) -> Result<GrayImage, ExtractionError> {
        let (width, height) = image.dimensions();
        let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();

        let inset = self.options.inset(width, height);
        let seg = segment(&rgb, inset, self.options.iterations)?;
        debug!(
            width,
            height,
            rounds = seg.rounds,
            foreground_pixels = seg.foreground_pixels,
            "segmentation finished"
        );

        let kernel = self.options.kernel_size(width, height);
        let mask = open(&close(&seg.mask, kernel), kernel);
        if mask.pixels().all(|p| p[0] == 0) {
            return Err(ExtractionError::NoForeground);
        }

        let guide = imageops::grayscale(&rgb);
        Ok(refine_edges(&mask, &guide, self.options.edge_mode, kernel))
    }
}

impl ForegroundExtractor for NativeExtractor {
    fn name(&self) -> &str {
        "native"
    }

    fn extract(&self, image: &[u8]) -> Result<Bytes, ExtractionError> {
        let decoded =
            image::load_from_memory(image).map_err(|e| ExtractionError::Decode(e.to_string()))?;
        let mut rgba = decoded.to_rgba8();

        let alpha = self.alpha_mask(&rgba)?;
        for (pixel, mask) in rgba.pixels_mut().zip(alpha.pixels()) {
            let combined = pixel[3] as u32 * mask[0] as u32;
            pixel[3] = ((combined + 127) / 255) as u8;
        }

        encode_png(&rgba)
    }
}

/// Encode an RGBA image as PNG with maximum compression.
pub fn encode_png(image: &RgbaImage) -> Result<Bytes, ExtractionError> {
    let mut out = Vec::new();
    PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| ExtractionError::Encode(e.to_string()))?;

    Ok(Bytes::from(out))
}
