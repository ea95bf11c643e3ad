//! Quality gating, slot allocation, and spec-token construction.

use tracing::debug;

use crate::config::AnalysisConfig;
use crate::types::{LayerSet, QualityReport, Role, RoleMap, SlotAllocation, SpecToken, Tile};

/// Run the five fixed sanity checks over an analysis.
///
/// Each check passes by default when the role it inspects is empty; a low
/// score is a policy outcome (fallback), never an error.
pub fn assess_quality(
    tiles: &[Tile],
    roles: &RoleMap,
    layers: &LayerSet,
    weights: &[f32],
    config: &AnalysisConfig,
) -> QualityReport {
    let structure = population_variance(tiles.iter().map(|t| t.brightness))
        > config.structure_brightness_var
        || population_variance(tiles.iter().map(|t| t.edge_density)) > config.structure_edge_var;

    let accent = roles.accent_transient > config.accent_transient_min || roles.accent_saliency > 0.0;

    let motion_confident =
        roles.motion.is_empty() || layers.motion.edge_density > config.confidence_edge_min;
    let foreground_confident =
        roles.foreground.is_empty() || layers.foreground.edge_density > config.confidence_edge_min;
    let role_confidence = motion_confident && foreground_confident;

    let weight_coherence =
        roles.motion.is_empty() || mean_weight(&roles.motion, weights) > config.weight_coherence_min;

    let non_bed = roles.accent.len() + roles.foreground.len() + roles.motion.len();
    let layer_balance = non_bed <= config.non_bed_max;

    let checks = [
        structure,
        accent,
        role_confidence,
        weight_coherence,
        layer_balance,
    ];
    let passed = checks.iter().filter(|&&c| c).count();
    let score = passed as f32 / checks.len() as f32;
    let fallback = score < config.fallback_threshold;

    if fallback {
        debug!(score, "quality gate fell back to non-spatial strategy");
    }

    QualityReport {
        structure,
        accent,
        role_confidence,
        weight_coherence,
        layer_balance,
        score,
        fallback,
    }
}

/// Base allocation: accent 1, foreground and motion their tile counts, bed a
/// fixed floor plus whatever foreground/motion capacity went unused. Always
/// sums to the configured slot total.
pub fn allocate_slots(roles: &RoleMap, config: &AnalysisConfig) -> SlotAllocation {
    let foreground = roles.foreground.len().min(config.foreground_cap);
    let motion = roles.motion.len().min(config.motion_cap);
    let spare = (config.foreground_cap - foreground) + (config.motion_cap - motion);

    let allocation = SlotAllocation {
        accent: roles.accent.len(),
        foreground,
        motion,
        bed: config.bed_base_slots + spare,
    };
    debug_assert_eq!(allocation.total(), config.slot_total);
    allocation
}

/// One token per role that holds both tiles and slots. Empty when the
/// quality gate fell back — downstream must use a global strategy instead.
pub fn build_tokens(
    roles: &RoleMap,
    layers: &LayerSet,
    weights: &[f32],
    allocation: &SlotAllocation,
    quality: &QualityReport,
) -> Vec<SpecToken> {
    if quality.fallback {
        return Vec::new();
    }

    let mut tokens = Vec::new();
    for role in Role::PRIORITY {
        let stats = layers.get(role);
        let slots = allocation.get(role);
        if stats.count == 0 || slots == 0 {
            continue;
        }

        let confidence = match role {
            Role::Accent => roles.accent_transient,
            Role::Foreground => roles.foreground_confidence,
            Role::Motion => roles.motion_confidence,
            Role::Bed => mean_weight(&roles.bed, weights),
        };

        tokens.push(SpecToken {
            role,
            slots,
            brightness: stats.brightness,
            brightness_variance: stats.brightness_variance,
            saturation: stats.saturation,
            edge_density: stats.edge_density,
            hf_energy: stats.hf_energy,
            vertical_edge_ratio: stats.vertical_edge_ratio,
            confidence,
            area_fraction: stats.area_fraction,
        });
    }
    tokens
}

fn population_variance(values: impl Iterator<Item = f32>) -> f32 {
    let values: Vec<f32> = values.collect();
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / values.len() as f32
}

fn mean_weight(indices: &[usize], weights: &[f32]) -> f32 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| weights[i]).sum::<f32>() / indices.len() as f32
}
