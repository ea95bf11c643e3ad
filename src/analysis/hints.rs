//! Derivation of the four per-tile hints from the raw structural features.
//!
//! Saliency is relative to the image's own tiles (clipped z-scores), not an
//! absolute threshold: a tile is salient because it stands out from its
//! siblings, however flat or busy the image is overall.

use crate::types::Tile;

/// Z-scores are clipped to this band before summing, so a single extreme
/// tile cannot dominate saliency.
const Z_CLIP: f32 = 2.0;

/// Fill the derived hint fields of every tile in place. No-op on an empty
/// slice.
pub fn compose_hints(tiles: &mut [Tile]) {
    if tiles.is_empty() {
        return;
    }

    let edge_z = clipped_z_scores(tiles.iter().map(|t| t.edge_density));
    let variance_z = clipped_z_scores(tiles.iter().map(|t| t.brightness_variance));
    let hf_z = clipped_z_scores(tiles.iter().map(|t| t.hf_energy));

    for (i, tile) in tiles.iter_mut().enumerate() {
        tile.saliency = edge_z[i] + variance_z[i] + hf_z[i];

        tile.motion_hint = (tile.vertical_edge_ratio * tile.edge_density).clamp(0.0, 1.0);
        tile.object_hint = (tile.edge_density
            * (1.0 - tile.orientation_entropy)
            * (0.5 + 0.5 * tile.brightness_variance))
            .clamp(0.0, 1.0);
        tile.bed_hint = ((1.0 - tile.edge_density) * (1.0 - tile.hf_energy)).clamp(0.0, 1.0);
    }
}

/// Per-value z-score against the population mean/std of the input, each
/// clipped to [-Z_CLIP, Z_CLIP]. A zero-variance population yields all zeros.
fn clipped_z_scores(values: impl Iterator<Item = f32>) -> Vec<f32> {
    let values: Vec<f32> = values.collect();
    let n = values.len() as f32;

    let mean = values.iter().sum::<f32>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / n;
    let std = variance.sqrt();

    if std <= 1e-9 {
        return vec![0.0; values.len()];
    }

    values
        .into_iter()
        .map(|v| ((v - mean) / std).clamp(-Z_CLIP, Z_CLIP))
        .collect()
}
