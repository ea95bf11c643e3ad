//! Coarse-cell aggregation and agreement weighting.
//!
//! The 4x4 tile grid is grouped into four fixed 2x2 cells. A tile whose role
//! matches its cell's dominant tendency keeps full weight; an isolated
//! assignment is dampened toward the configured floor. Accent is exempt.

use crate::config::AnalysisConfig;
use crate::types::{
    AnalysisError, CoarseCell, LayerSet, LayerStats, Role, RoleMap, Tendency, Tile,
};

const COARSE_GRID: usize = 4;
const REQUIRED_TILES: usize = 16;

/// Build the four coarse cells and the per-tile agreement weights.
///
/// Fails with [`AnalysisError::TileCount`] unless exactly 16 tiles (a 4x4
/// grid) are supplied.
pub fn aggregate_coarse(
    tiles: &[Tile],
    roles: &RoleMap,
    config: &AnalysisConfig,
) -> Result<(Vec<CoarseCell>, Vec<f32>), AnalysisError> {
    if tiles.len() != REQUIRED_TILES {
        return Err(AnalysisError::TileCount {
            expected: REQUIRED_TILES,
            got: tiles.len(),
        });
    }

    let mut cells = Vec::with_capacity(4);
    for cell_row in 0..2 {
        for cell_col in 0..2 {
            let base_row = cell_row * 2;
            let base_col = cell_col * 2;
            let tile_indices = [
                base_row * COARSE_GRID + base_col,
                base_row * COARSE_GRID + base_col + 1,
                (base_row + 1) * COARSE_GRID + base_col,
                (base_row + 1) * COARSE_GRID + base_col + 1,
            ];

            let motion_strength = child_mean(&tile_indices, tiles, |t| t.motion_hint);
            let object_strength = child_mean(&tile_indices, tiles, |t| t.object_hint);
            let bed_strength = child_mean(&tile_indices, tiles, |t| t.bed_hint);

            // First strict maximum wins, in Motion, Object, Bed order.
            let mut dominant = Tendency::Motion;
            let mut best = motion_strength;
            if object_strength > best {
                dominant = Tendency::Object;
                best = object_strength;
            }
            if bed_strength > best {
                dominant = Tendency::Bed;
            }

            cells.push(CoarseCell {
                index: cell_row * 2 + cell_col,
                tile_indices,
                motion_strength,
                object_strength,
                bed_strength,
                dominant,
            });
        }
    }

    let weights = tile_weights(tiles, roles, &cells, config);
    Ok((cells, weights))
}

fn child_mean(indices: &[usize; 4], tiles: &[Tile], value: impl Fn(&Tile) -> f32) -> f32 {
    indices.iter().map(|&i| value(&tiles[i])).sum::<f32>() / indices.len() as f32
}

fn tile_weights(
    tiles: &[Tile],
    roles: &RoleMap,
    cells: &[CoarseCell],
    config: &AnalysisConfig,
) -> Vec<f32> {
    let mut weights = vec![config.weight_floor; tiles.len()];
    for tile in tiles {
        let cell = &cells[(tile.row / 2) * 2 + tile.col / 2];
        let role = roles.role_of(tile.index).unwrap_or(Role::Bed);

        weights[tile.index] = match Tendency::for_role(role) {
            // Accent tiles are exempt from neighborhood agreement.
            None => 1.0,
            Some(tendency) => {
                let max = cell.max_strength();
                if max <= f32::EPSILON {
                    config.weight_floor
                } else {
                    (cell.strength(tendency) / max).clamp(config.weight_floor, 1.0)
                }
            }
        };
    }
    weights
}

/// Weighted per-role feature means using the agreement weights.
pub fn layer_stats(tiles: &[Tile], roles: &RoleMap, weights: &[f32]) -> LayerSet {
    LayerSet {
        accent: stats_for(Role::Accent, tiles, roles, weights),
        foreground: stats_for(Role::Foreground, tiles, roles, weights),
        motion: stats_for(Role::Motion, tiles, roles, weights),
        bed: stats_for(Role::Bed, tiles, roles, weights),
    }
}

fn stats_for(role: Role, tiles: &[Tile], roles: &RoleMap, weights: &[f32]) -> LayerStats {
    let tile_indices = roles.indices(role).to_vec();
    let tile_weights: Vec<f32> = tile_indices.iter().map(|&i| weights[i]).collect();
    let weight_sum: f32 = tile_weights.iter().sum();

    let weighted = |value: fn(&Tile) -> f32| -> f32 {
        if weight_sum <= f32::EPSILON {
            return 0.0;
        }
        tile_indices
            .iter()
            .zip(&tile_weights)
            .map(|(&i, &w)| value(&tiles[i]) * w)
            .sum::<f32>()
            / weight_sum
    };

    LayerStats {
        role,
        count: tile_indices.len(),
        brightness: weighted(|t| t.brightness),
        brightness_variance: weighted(|t| t.brightness_variance),
        saturation: weighted(|t| t.saturation),
        edge_density: weighted(|t| t.edge_density),
        hf_energy: weighted(|t| t.hf_energy),
        vertical_edge_ratio: weighted(|t| t.vertical_edge_ratio),
        area_fraction: tile_indices.len() as f32 / tiles.len() as f32,
        tile_indices,
        tile_weights,
    }
}
