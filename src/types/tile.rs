use image::RgbImage;
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::role::Tendency;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid image shape: expected a non-empty HxWx3 RGB array, got {height}x{width}x{channels}")]
    InvalidShape {
        height: usize,
        width: usize,
        channels: usize,
    },

    #[error("Coarse aggregation requires exactly {expected} tiles, got {got}")]
    TileCount { expected: usize, got: usize },
}

/// A decoded image normalized to float RGB in [0, 1].
///
/// This is the ONLY way pixel data enters the pipeline. Both constructors
/// enforce the shape invariant (non-empty, exactly 3 channels), so every
/// later phase can assume a well-formed frame.
#[derive(Debug, Clone)]
pub struct ImageFrame {
    pixels: Array3<f32>,
}

impl ImageFrame {
    /// Wrap a decoded 8-bit RGB image, scaling samples to [0, 1].
    pub fn from_rgb8(image: &RgbImage) -> Result<Self, AnalysisError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(AnalysisError::InvalidShape {
                height: height as usize,
                width: width as usize,
                channels: 3,
            });
        }

        let mut pixels = Array3::zeros((height as usize, width as usize, 3));
        for (x, y, p) in image.enumerate_pixels() {
            for c in 0..3 {
                pixels[(y as usize, x as usize, c)] = f32::from(p.0[c]) / 255.0;
            }
        }
        Ok(Self { pixels })
    }

    /// Wrap an HxWx3 float array. Values are clamped into [0, 1].
    pub fn from_array(array: Array3<f32>) -> Result<Self, AnalysisError> {
        let (height, width, channels) = array.dim();
        if height == 0 || width == 0 || channels != 3 {
            return Err(AnalysisError::InvalidShape {
                height,
                width,
                channels,
            });
        }

        let pixels = array.mapv(|v| v.clamp(0.0, 1.0));
        Ok(Self { pixels })
    }

    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    pub(crate) fn pixels(&self) -> &Array3<f32> {
        &self.pixels
    }
}

/// Normalized bounding box of a tile within the working square, in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileBounds {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

/// One cell of the fixed analysis grid over the resized working image.
///
/// Structural features are filled by extraction; the derived hint fields are
/// filled by hint composition, after which the tile is never mutated again.
/// Every feature and hint except `saliency` lives in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub bounds: TileBounds,

    pub brightness: f32,
    pub brightness_variance: f32,
    pub saturation: f32,
    pub hue_entropy: f32,
    pub warmth: f32,
    pub edge_density: f32,
    pub orientation_entropy: f32,
    pub vertical_edge_ratio: f32,
    pub hf_energy: f32,

    /// Sum of clipped z-scores; unbounded, typically in [-6, 6].
    pub saliency: f32,
    pub motion_hint: f32,
    pub object_hint: f32,
    pub bed_hint: f32,
}

/// A 2x2 block of tiles used to judge whether a tile's role agrees with its
/// neighborhood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoarseCell {
    pub index: usize,
    pub tile_indices: [usize; 4],
    pub motion_strength: f32,
    pub object_strength: f32,
    pub bed_strength: f32,
    pub dominant: Tendency,
}

impl CoarseCell {
    pub fn strength(&self, tendency: Tendency) -> f32 {
        match tendency {
            Tendency::Motion => self.motion_strength,
            Tendency::Object => self.object_strength,
            Tendency::Bed => self.bed_strength,
        }
    }

    pub fn max_strength(&self) -> f32 {
        self.motion_strength
            .max(self.object_strength)
            .max(self.bed_strength)
    }
}
