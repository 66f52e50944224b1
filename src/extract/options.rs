//! Tuning knobs for the native extractor.

use std::fmt;

use clap::ValueEnum;

/// Smallest accepted number of segmentation rounds.
pub const MIN_ITERATIONS: u32 = 1;

/// Largest accepted number of segmentation rounds.
pub const MAX_ITERATIONS: u32 = 20;

/// Named trade-offs between speed and mask quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum QualityPreset {
    /// 5 rounds, Gaussian edges, small kernel
    Fast,
    /// 8 rounds, guided-filter edges
    #[default]
    Balanced,
    /// 12 rounds, guided-filter edges, large kernel
    Quality,
}

/// How the binary mask is softened before it becomes the alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EdgeMode {
    /// Gaussian blur of the mask
    Blur,
    /// Edge-preserving bilateral filter of the mask
    Bilateral,
    /// Guided filter using the grayscale image as guide
    Guided,
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QualityPreset::Fast => "fast",
            QualityPreset::Balanced => "balanced",
            QualityPreset::Quality => "quality",
        })
    }
}

impl fmt::Display for EdgeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EdgeMode::Blur => "blur",
            EdgeMode::Bilateral => "bilateral",
            EdgeMode::Guided => "guided",
        })
    }
}

/// Resolved options for [`NativeExtractor`](super::NativeExtractor).
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Segmentation rounds (1-20)
    pub iterations: u32,

    /// Border inset in pixels; `None` picks 2% of each dimension (at least 5 px)
    pub margin: Option<u32>,

    pub edge_mode: EdgeMode,

    /// Multiplier applied to the morphology kernel size
    pub kernel_scale: f32,
}

impl ExtractOptions {
    /// Options for a named preset.
    pub fn from_preset(preset: QualityPreset) -> Self {
        match preset {
            QualityPreset::Fast => Self {
                iterations: 5,
                margin: None,
                edge_mode: EdgeMode::Blur,
                kernel_scale: 0.5,
            },
            QualityPreset::Balanced => Self {
                iterations: 8,
                margin: None,
                edge_mode: EdgeMode::Guided,
                kernel_scale: 1.0,
            },
            QualityPreset::Quality => Self {
                iterations: 12,
                margin: None,
                edge_mode: EdgeMode::Guided,
                kernel_scale: 1.5,
            },
        }
    }

    /// Override the number of segmentation rounds.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Use a fixed border inset instead of the proportional default.
    pub fn with_margin(mut self, margin: u32) -> Self {
        self.margin = Some(margin);
        self
    }

    pub fn with_edge_mode(mut self, edge_mode: EdgeMode) -> Self {
        self.edge_mode = edge_mode;
        self
    }

    /// Check the options and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&self.iterations) {
            return Err(format!(
                "iterations must be between {} and {}",
                MIN_ITERATIONS, MAX_ITERATIONS
            ));
        }
        if !(self.kernel_scale.is_finite() && self.kernel_scale > 0.0) {
            return Err("kernel_scale must be a positive number".to_string());
        }
        Ok(())
    }

    /// Border inset for an image of the given size, as `(inset_x, inset_y)`.
    pub fn inset(&self, width: u32, height: u32) -> (u32, u32) {
        match self.margin {
            Some(margin) => (margin, margin),
            None => ((width / 50).max(5), (height / 50).max(5)),
        }
    }

    /// Odd morphology kernel size in 3..=15 for an image of the given size.
    pub fn kernel_size(&self, width: u32, height: u32) -> u32 {
        let base = (width.min(height) / 150) as f32;
        let size = ((base * self.kernel_scale) as u32).clamp(3, 15);
        if size % 2 == 0 {
            size + 1
        } else {
            size
        }
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::from_preset(QualityPreset::default())
    }
}
