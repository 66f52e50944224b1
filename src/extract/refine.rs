//! Mask cleanup and edge refinement.
//!
//! Morphology removes speckles and fills pin holes in the binary mask; the edge
//! filters then turn the hard 0/255 boundary into a soft alpha ramp.

use image::{imageops, GrayImage, ImageBuffer, Luma};
use imageproc::filter::bilateral::GaussianEuclideanColorDistance;
use imageproc::filter::{bilateral_filter, separable_filter_equal};
use imageproc::morphology::{grayscale_close, grayscale_open, Mask};

use super::options::EdgeMode;

/// Radius of the bilateral filter window (9 px diameter).
const BILATERAL_RADIUS: u8 = 4;

const BILATERAL_SIGMA_COLOR: f32 = 75.0;

const BILATERAL_SIGMA_SPACE: f32 = 75.0;

/// Regularization of the guided filter, on intensities scaled to 0..1.
const GUIDED_EPS: f32 = 0.01;

/// Single-channel `f32` image used for the guided filter's moments.
type FloatImage = ImageBuffer<Luma<f32>, Vec<f32>>;

// =============================================================================
// Morphology
// =============================================================================

/// Elliptical structuring element fitting a `size` x `size` box.
fn structuring_element(size: u32) -> Mask {
    Mask::disk((size / 2).min(u8::MAX as u32) as u8)
}

/// Dilate then erode: fills holes smaller than the kernel.
pub fn close(mask: &GrayImage, size: u32) -> GrayImage {
    grayscale_close(mask, &structuring_element(size))
}

/// Erode then dilate: removes islands smaller than the kernel.
pub fn open(mask: &GrayImage, size: u32) -> GrayImage {
    grayscale_open(mask, &structuring_element(size))
}

// =============================================================================
// Edge Filters
// =============================================================================

/// Soften the mask boundary according to `mode`.
///
/// `guide` is the grayscale source image, used by [`EdgeMode::Guided`].
/// `kernel_size` is the morphology kernel size the mask was cleaned with.
pub fn refine_edges(
    mask: &GrayImage,
    guide: &GrayImage,
    mode: EdgeMode,
    kernel_size: u32,
) -> GrayImage {
    match mode {
        EdgeMode::Blur => {
            let mut blur_size = (kernel_size * 2 + 1).max(5);
            if blur_size % 2 == 0 {
                blur_size += 1;
            }
            imageops::blur(mask, blur_size as f32 / 4.0)
        }
        EdgeMode::Bilateral => bilateral_filter(
            mask,
            BILATERAL_RADIUS,
            BILATERAL_SIGMA_SPACE,
            GaussianEuclideanColorDistance::new(BILATERAL_SIGMA_COLOR),
        ),
        EdgeMode::Guided => guided_filter(guide, mask, kernel_size.max(4), GUIDED_EPS),
    }
}

fn to_unit(image: &GrayImage) -> FloatImage {
    FloatImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y)[0] as f32 / 255.0])
    })
}

/// Mean over a `(2r+1)` square window, edges replicated.
fn box_mean(image: &FloatImage, radius: u32) -> FloatImage {
    let size = 2 * radius as usize + 1;
    let kernel = vec![1.0 / size as f32; size];
    separable_filter_equal(image, &kernel)
}

fn product(lhs: &FloatImage, rhs: &FloatImage) -> FloatImage {
    let mut out = lhs.clone();
    for (value, factor) in out.iter_mut().zip(rhs.iter()) {
        *value *= factor;
    }
    out
}

/// Guided filter (He et al.) of `mask` using `guide` for edge structure.
///
/// Moments are kept in `f32` and each buffer is released as soon as the next
/// stage no longer reads it.
pub fn guided_filter(guide: &GrayImage, mask: &GrayImage, radius: u32, eps: f32) -> GrayImage {
    let i = to_unit(guide);

    // a and b start as corr(I, I) and corr(I, p) and are rewritten in place
    let (a, b) = {
        let p = to_unit(mask);
        let mean_i = box_mean(&i, radius);
        let mean_p = box_mean(&p, radius);
        let mut a = box_mean(&product(&i, &i), radius);
        let mut b = box_mean(&product(&i, &p), radius);

        for (((ak, bk), &mi), &mp) in a
            .iter_mut()
            .zip(b.iter_mut())
            .zip(mean_i.iter())
            .zip(mean_p.iter())
        {
            let var_i = *ak - mi * mi;
            let cov_ip = *bk - mi * mp;
            *ak = cov_ip / (var_i + eps);
            *bk = mp - *ak * mi;
        }
        (a, b)
    };

    let mean_a = box_mean(&a, radius);
    drop(a);
    let mean_b = box_mean(&b, radius);
    drop(b);

    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        let q = mean_a.get_pixel(x, y)[0] * i.get_pixel(x, y)[0] + mean_b.get_pixel(x, y)[0];
        Luma([(q * 255.0).round().clamp(0.0, 255.0) as u8])
    })
}
