//! Border-seeded color model segmentation.
//!
//! Pixels inside a border inset start as probable foreground, pixels in the
//! border are fixed background. Each round builds a quantized color histogram
//! for both sets and relabels every interior pixel to whichever model explains
//! its color better. A uniform backdrop therefore dominates the background
//! model and drops out of the interior within a round or two, while colors that
//! never touch the border stay foreground.

use image::{GrayImage, Luma, RgbImage};
use tracing::trace;

use crate::error::ExtractionError;

/// Bits kept per channel when binning colors.
const BITS_PER_CHANNEL: u32 = 4;

const LEVELS: usize = 1 << BITS_PER_CHANNEL;

/// Number of histogram bins (16 x 16 x 16).
const BIN_COUNT: usize = LEVELS * LEVELS * LEVELS;

/// Mask value for foreground pixels.
pub const FOREGROUND: u8 = 255;

/// Mask value for background pixels.
pub const BACKGROUND: u8 = 0;

#[inline]
fn color_bin(pixel: [u8; 3]) -> u16 {
    let shift = 8 - BITS_PER_CHANNEL;
    let r = (pixel[0] >> shift) as u16;
    let g = (pixel[1] >> shift) as u16;
    let b = (pixel[2] >> shift) as u16;
    (r << (2 * BITS_PER_CHANNEL)) | (g << BITS_PER_CHANNEL) | b
}

/// Pseudo-count added to every bin so unseen colors keep a tiny likelihood.
const PRIOR: f64 = 0.01;

/// Quantized color histogram.
struct ColorModel {
    counts: Vec<u32>,
    total: u64,
}

impl ColorModel {
    fn new() -> Self {
        Self {
            counts: vec![0; BIN_COUNT],
            total: 0,
        }
    }

    fn clear(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0);
        self.total = 0;
    }

    #[inline]
    fn add(&mut self, bin: u16) {
        self.counts[bin as usize] += 1;
        self.total += 1;
    }

    /// Share of the model's pixels that fall in `bin`.
    ///
    /// An empty model is uniform. Ties go to the background in [`segment`].
    #[inline]
    fn likelihood(&self, bin: u16) -> f64 {
        if self.total == 0 {
            return 1.0 / BIN_COUNT as f64;
        }
        (self.counts[bin as usize] as f64 + PRIOR) / (self.total as f64 + PRIOR)
    }
}

/// Outcome of [`segment`].
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Binary mask, [`FOREGROUND`] or [`BACKGROUND`] per pixel
    pub mask: GrayImage,

    /// Rounds actually run before convergence
    pub rounds: u32,

    pub foreground_pixels: usize,
}

/// Split `image` into foreground and background.
///
/// `inset` is the border width `(x, y)` treated as known background. At most
/// `iterations` relabelling rounds are run; the loop stops early once no pixel
/// changes side.
///
/// # Errors
///
/// [`ExtractionError::ImageTooSmall`] if the inset leaves no interior.
pub fn segment(
    image: &RgbImage,
    inset: (u32, u32),
    iterations: u32,
) -> Result<Segmentation, ExtractionError> {
    let (width, height) = image.dimensions();
    let (inset_x, inset_y) = inset;

    if width <= inset_x.saturating_mul(2) || height <= inset_y.saturating_mul(2) {
        return Err(ExtractionError::ImageTooSmall {
            width,
            height,
            inset_x,
            inset_y,
        });
    }

    let interior = |x: u32, y: u32| {
        x >= inset_x && x < width - inset_x && y >= inset_y && y < height - inset_y
    };

    let bins: Vec<u16> = image.pixels().map(|p| color_bin(p.0)).collect();
    let mut labels: Vec<bool> = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| interior(x, y))
        .collect();

    let mut background = ColorModel::new();
    let mut foreground = ColorModel::new();
    let mut rounds = 0;

    for _ in 0..iterations {
        background.clear();
        foreground.clear();
        for (bin, &is_fg) in bins.iter().zip(&labels) {
            if is_fg {
                foreground.add(*bin);
            } else {
                background.add(*bin);
            }
        }

        if foreground.total == 0 {
            break;
        }
        rounds += 1;

        let mut changed = 0usize;
        for y in inset_y..height - inset_y {
            let row = (y * width) as usize;
            for x in inset_x..width - inset_x {
                let idx = row + x as usize;
                let bin = bins[idx];
                let is_fg = foreground.likelihood(bin) > background.likelihood(bin);
                if is_fg != labels[idx] {
                    labels[idx] = is_fg;
                    changed += 1;
                }
            }
        }

        trace!(round = rounds, changed, "segmentation round");
        if changed == 0 {
            break;
        }
    }

    let foreground_pixels = labels.iter().filter(|&&fg| fg).count();
    let mask = GrayImage::from_fn(width, height, |x, y| {
        if labels[(y * width + x) as usize] {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    });

    Ok(Segmentation {
        mask,
        rounds,
        foreground_pixels,
    })
}
