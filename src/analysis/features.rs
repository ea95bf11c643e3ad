//! Per-tile feature extraction over a deterministically resized working copy.
//!
//! The image is resized to a fixed square with nearest-neighbor sampling
//! (integer index mapping, no interpolation), converted to luminance, and run
//! through fixed Sobel and Laplacian kernels. The grid partition then reduces
//! each tile's pixels to the structural features of [`Tile`].

use ndarray::{Array2, Array3};

use crate::config::AnalysisConfig;
use crate::types::{ImageFrame, Tile, TileBounds};

/// Rec.601 luminance weights.
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Extract exactly `grid_rows * grid_cols` tiles from a validated frame.
///
/// Deterministic: identical frames and config always produce identical tiles.
/// Hint fields are left at zero; [`super::hints::compose_hints`] fills them.
pub fn extract_tiles(frame: &ImageFrame, config: &AnalysisConfig) -> Vec<Tile> {
    debug_assert!(config.grid_rows > 0 && config.grid_cols > 0);
    debug_assert!(config.working_size >= config.grid_rows.max(config.grid_cols));

    let size = config.working_size;
    let resized = resize_nearest(frame, size);
    let luma = luminance(&resized);
    let (gx, gy) = sobel(&luma);
    let lap = laplacian(&luma);

    let mut tiles = Vec::with_capacity(config.grid_rows * config.grid_cols);
    for row in 0..config.grid_rows {
        for col in 0..config.grid_cols {
            // Integer-division bounds; the last row/column absorb remainder
            // pixels because (n+1)*size/n lands exactly on size.
            let y0 = row * size / config.grid_rows;
            let y1 = (row + 1) * size / config.grid_rows;
            let x0 = col * size / config.grid_cols;
            let x1 = (col + 1) * size / config.grid_cols;

            let index = row * config.grid_cols + col;
            tiles.push(tile_features(
                index, row, col, y0, y1, x0, x1, size, &resized, &luma, &gx, &gy, &lap, config,
            ));
        }
    }
    tiles
}

/// Nearest-neighbor resize to a `size` x `size` square using the integer
/// source mapping `src = dst * extent / size`.
fn resize_nearest(frame: &ImageFrame, size: usize) -> Array3<f32> {
    let pixels = frame.pixels();
    let (height, width, _) = pixels.dim();

    let mut out = Array3::zeros((size, size, 3));
    for y in 0..size {
        let sy = y * height / size;
        for x in 0..size {
            let sx = x * width / size;
            for c in 0..3 {
                out[(y, x, c)] = pixels[(sy, sx, c)];
            }
        }
    }
    out
}

fn luminance(rgb: &Array3<f32>) -> Array2<f32> {
    let (h, w, _) = rgb.dim();
    let mut luma = Array2::zeros((h, w));
    for y in 0..h {
        for x in 0..w {
            luma[(y, x)] =
                LUMA_R * rgb[(y, x, 0)] + LUMA_G * rgb[(y, x, 1)] + LUMA_B * rgb[(y, x, 2)];
        }
    }
    luma
}

/// 3x3 Sobel gradients with replicate-clamped borders.
fn sobel(luma: &Array2<f32>) -> (Array2<f32>, Array2<f32>) {
    let (h, w) = luma.dim();
    let mut gx = Array2::zeros((h, w));
    let mut gy = Array2::zeros((h, w));

    let at = |y: isize, x: isize| -> f32 {
        let y = y.clamp(0, h as isize - 1) as usize;
        let x = x.clamp(0, w as isize - 1) as usize;
        luma[(y, x)]
    };

    for y in 0..h as isize {
        for x in 0..w as isize {
            let tl = at(y - 1, x - 1);
            let tc = at(y - 1, x);
            let tr = at(y - 1, x + 1);
            let ml = at(y, x - 1);
            let mr = at(y, x + 1);
            let bl = at(y + 1, x - 1);
            let bc = at(y + 1, x);
            let br = at(y + 1, x + 1);

            gx[(y as usize, x as usize)] = (tr + 2.0 * mr + br) - (tl + 2.0 * ml + bl);
            gy[(y as usize, x as usize)] = (bl + 2.0 * bc + br) - (tl + 2.0 * tc + tr);
        }
    }
    (gx, gy)
}

/// 3x3 Laplacian (4-neighbor) with replicate-clamped borders.
fn laplacian(luma: &Array2<f32>) -> Array2<f32> {
    let (h, w) = luma.dim();
    let mut lap = Array2::zeros((h, w));

    let at = |y: isize, x: isize| -> f32 {
        let y = y.clamp(0, h as isize - 1) as usize;
        let x = x.clamp(0, w as isize - 1) as usize;
        luma[(y, x)]
    };

    for y in 0..h as isize {
        for x in 0..w as isize {
            lap[(y as usize, x as usize)] =
                at(y - 1, x) + at(y + 1, x) + at(y, x - 1) + at(y, x + 1) - 4.0 * at(y, x);
        }
    }
    lap
}

#[allow(clippy::too_many_arguments)]
fn tile_features(
    index: usize,
    row: usize,
    col: usize,
    y0: usize,
    y1: usize,
    x0: usize,
    x1: usize,
    size: usize,
    rgb: &Array3<f32>,
    luma: &Array2<f32>,
    gx: &Array2<f32>,
    gy: &Array2<f32>,
    lap: &Array2<f32>,
    config: &AnalysisConfig,
) -> Tile {
    let pixel_count = ((y1 - y0) * (x1 - x0)) as f32;
    debug_assert!(pixel_count > 0.0);

    let mut luma_sum = 0.0f32;
    let mut luma_sq_sum = 0.0f32;
    let mut sat_sum = 0.0f32;
    let mut warmth_sum = 0.0f32;
    let mut hue_hist = vec![0.0f32; config.hue_bins];
    let mut orient_hist = vec![0.0f32; config.orientation_bins];
    let mut edge_count = 0.0f32;
    let mut abs_gx_sum = 0.0f32;
    let mut abs_gy_sum = 0.0f32;
    let mut lap_sum = 0.0f32;
    let mut lap_sq_sum = 0.0f32;

    for y in y0..y1 {
        for x in x0..x1 {
            let l = luma[(y, x)];
            luma_sum += l;
            luma_sq_sum += l * l;

            let r = rgb[(y, x, 0)];
            let g = rgb[(y, x, 1)];
            let b = rgb[(y, x, 2)];
            let (hue, sat) = hue_saturation(r, g, b);
            sat_sum += sat;
            warmth_sum += (r - b + 1.0) * 0.5;

            let hue_bin = ((hue * config.hue_bins as f32) as usize).min(config.hue_bins - 1);
            hue_hist[hue_bin] += 1.0;

            let dx = gx[(y, x)];
            let dy = gy[(y, x)];
            abs_gx_sum += dx.abs();
            abs_gy_sum += dy.abs();

            let magnitude = (dx * dx + dy * dy).sqrt();
            if magnitude > config.edge_threshold {
                edge_count += 1.0;
                // Gradient angle folded into [0, pi): edge orientation has no
                // sign.
                let mut angle = dy.atan2(dx);
                if angle < 0.0 {
                    angle += std::f32::consts::PI;
                }
                let bin = ((angle / std::f32::consts::PI * config.orientation_bins as f32)
                    as usize)
                    .min(config.orientation_bins - 1);
                orient_hist[bin] += 1.0;
            }

            let lp = lap[(y, x)];
            lap_sum += lp;
            lap_sq_sum += lp * lp;
        }
    }

    let brightness = luma_sum / pixel_count;
    let luma_var = (luma_sq_sum / pixel_count - brightness * brightness).max(0.0);
    let lap_mean = lap_sum / pixel_count;
    let lap_var = (lap_sq_sum / pixel_count - lap_mean * lap_mean).max(0.0);

    let gradient_energy = abs_gx_sum + abs_gy_sum;
    let vertical_edge_ratio = if gradient_energy > f32::EPSILON {
        abs_gx_sum / gradient_energy
    } else {
        0.0
    };

    Tile {
        index,
        row,
        col,
        bounds: TileBounds {
            x0: x0 as f32 / size as f32,
            y0: y0 as f32 / size as f32,
            x1: x1 as f32 / size as f32,
            y1: y1 as f32 / size as f32,
        },

        brightness: brightness.clamp(0.0, 1.0),
        brightness_variance: (luma_var * 3.0).clamp(0.0, 1.0),
        saturation: (sat_sum / pixel_count).clamp(0.0, 1.0),
        hue_entropy: normalized_entropy(&hue_hist),
        warmth: (warmth_sum / pixel_count).clamp(0.0, 1.0),
        edge_density: (edge_count / pixel_count).clamp(0.0, 1.0),
        orientation_entropy: normalized_entropy(&orient_hist),
        vertical_edge_ratio: vertical_edge_ratio.clamp(0.0, 1.0),
        hf_energy: ((1.0 + lap_var).ln() / config.hf_log_scale).clamp(0.0, 1.0),

        saliency: 0.0,
        motion_hint: 0.0,
        object_hint: 0.0,
        bed_hint: 0.0,
    }
}

/// HSV-style hue in [0, 1) and saturation in [0, 1].
fn hue_saturation(r: f32, g: f32, b: f32) -> (f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let saturation = if max > f32::EPSILON { delta / max } else { 0.0 };

    if delta <= f32::EPSILON {
        return (0.0, saturation);
    }

    let sector = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    let hue = sector / 6.0;

    (hue.clamp(0.0, 0.999_999), saturation)
}

/// Shannon entropy of a histogram, normalized by ln(bin count) into [0, 1].
/// Empty histograms report 0.
fn normalized_entropy(hist: &[f32]) -> f32 {
    let total: f32 = hist.iter().sum();
    if total <= 0.0 || hist.len() < 2 {
        return 0.0;
    }

    let mut entropy = 0.0f32;
    for &count in hist {
        if count > 0.0 {
            let p = count / total;
            entropy -= p * p.ln();
        }
    }
    (entropy / (hist.len() as f32).ln()).clamp(0.0, 1.0)
}
