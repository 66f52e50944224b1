//! Raster decoding and color mode normalization.

use std::fmt;

use image::{ColorType, DynamicImage, ImageFormat};

use crate::error::DecodeError;

/// Channel layout of a decoded image, independent of bit depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Single luminance channel
    Gray,
    /// Luminance plus alpha
    GrayAlpha,
    /// Three color channels
    Rgb,
    /// Three color channels plus alpha
    Rgba,
    /// Any layout the decoder reports that is none of the above
    Other,
}

impl ColorMode {
    /// Classify a decoded image by its channel layout.
    pub fn of(image: &DynamicImage) -> Self {
        match image.color() {
            ColorType::L8 | ColorType::L16 => ColorMode::Gray,
            ColorType::La8 | ColorType::La16 => ColorMode::GrayAlpha,
            ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => ColorMode::Rgb,
            ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => ColorMode::Rgba,
            _ => ColorMode::Other,
        }
    }

    /// Whether this layout is accepted without conversion.
    #[inline]
    pub fn is_normalized(self) -> bool {
        matches!(self, ColorMode::Rgb | ColorMode::Rgba)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColorMode::Gray => "L",
            ColorMode::GrayAlpha => "LA",
            ColorMode::Rgb => "RGB",
            ColorMode::Rgba => "RGBA",
            ColorMode::Other => "other",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of a decoded image, cheap to copy around after the raster is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    /// Layout as stored in the encoded bytes
    pub source_mode: ColorMode,
    /// Layout after normalization (always RGB or RGBA)
    pub mode: ColorMode,
}

/// An in-memory raster whose color mode is RGB or RGBA.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    image: DynamicImage,
    format: ImageFormat,
    source_mode: ColorMode,
}

impl DecodedImage {
    /// Decode encoded image bytes and normalize the color mode.
    ///
    /// Images that are neither RGB nor RGBA are converted to 8-bit RGB.
    /// Dimensions are never changed.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::UnknownFormat`] if the bytes match no known image signature
    /// - [`DecodeError::Image`] if the format is known but decoding fails
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let format =
            image::guess_format(bytes).map_err(|_| DecodeError::UnknownFormat { len: bytes.len() })?;
        let image = image::load_from_memory_with_format(bytes, format)?;

        let source_mode = ColorMode::of(&image);
        let image = if source_mode.is_normalized() {
            image
        } else {
            DynamicImage::ImageRgb8(image.to_rgb8())
        };

        Ok(Self {
            image,
            format,
            source_mode,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Color mode after normalization.
    pub fn mode(&self) -> ColorMode {
        ColorMode::of(&self.image)
    }

    /// Color mode of the encoded source.
    pub fn source_mode(&self) -> ColorMode {
        self.source_mode
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn info(&self) -> ImageInfo {
        ImageInfo {
            width: self.width(),
            height: self.height(),
            format: self.format,
            source_mode: self.source_mode,
            mode: self.mode(),
        }
    }
}
