//! Explicit configuration records for both pipeline halves.
//!
//! Every threshold, cap, and relaxation step is a field here and is threaded
//! into each component call, so tests can exercise alternate values without
//! touching shared state.

use serde::{Deserialize, Serialize};

/// Configuration for the image-analysis half (extraction through quality
/// gate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Analysis grid dimensions. Coarse aggregation requires 4x4.
    pub grid_rows: usize,
    pub grid_cols: usize,
    /// Side of the square working copy the image is resized to.
    pub working_size: usize,

    /// Sobel magnitude above which a pixel counts as an edge pixel.
    pub edge_threshold: f32,
    /// Histogram bins for hue entropy.
    pub hue_bins: usize,
    /// Histogram bins for gradient-orientation entropy.
    pub orientation_bins: usize,
    /// Divisor for log1p(variance of Laplacian) in the high-frequency proxy.
    pub hf_log_scale: f32,

    /// Minimum object hint for a foreground tile.
    pub object_threshold: f32,
    /// Minimum motion hint for a motion tile.
    pub motion_threshold: f32,
    /// Maximum foreground tiles.
    pub foreground_cap: usize,
    /// Maximum motion tiles.
    pub motion_cap: usize,

    /// Lower clamp for coarse-agreement tile weights.
    pub weight_floor: f32,

    /// Structure check: minimum variance of tile brightness...
    pub structure_brightness_var: f32,
    /// ...or of tile edge density.
    pub structure_edge_var: f32,
    /// Accent check: minimum accent-tile transient value.
    pub accent_transient_min: f32,
    /// Role-confidence check: minimum layer edge density for non-empty
    /// motion/foreground layers.
    pub confidence_edge_min: f32,
    /// Weight-coherence check: minimum mean weight over motion tiles.
    pub weight_coherence_min: f32,
    /// Layer-balance check: maximum non-bed tile count.
    pub non_bed_max: usize,
    /// Quality score below this triggers fallback.
    pub fallback_threshold: f32,

    /// Total slots handed to the selector.
    pub slot_total: usize,
    /// Fixed bed slot floor before redistribution.
    pub bed_base_slots: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            grid_rows: 4,
            grid_cols: 4,
            working_size: 512,

            edge_threshold: 0.25,
            hue_bins: 12,
            orientation_bins: 8,
            hf_log_scale: 2.0,

            object_threshold: 0.15,
            motion_threshold: 0.10,
            foreground_cap: 2,
            motion_cap: 2,

            weight_floor: 0.15,

            structure_brightness_var: 0.01,
            structure_edge_var: 0.005,
            accent_transient_min: 0.15,
            confidence_edge_min: 0.20,
            weight_coherence_min: 0.20,
            non_bed_max: 6,
            fallback_threshold: 0.7,

            slot_total: 8,
            bed_base_slots: 3,
        }
    }
}

/// Configuration for the candidate-selection half.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Expected allocation total; a mismatch is warned about, not fatal.
    pub slot_total: usize,
    /// Strictness multipliers tried in order until a role's need is met.
    pub relaxation: Vec<f32>,

    /// Accent floor gate: crest or onset density must reach this, relaxed.
    pub accent_min: f32,
    /// Motion floor gate: onset density band [lo, hi] at full strictness;
    /// relaxation widens the band toward [0, 1].
    pub motion_band: (f32, f32),
    /// Foreground floor gate bounds at full strictness.
    pub foreground_max_noise: f32,
    pub foreground_min_harmonicity: f32,

    /// Affinity bonus for a role-matching tag, capped so affinity stays <= 1.
    pub tag_bonus: f32,
    /// Penalty for the 2nd, 3rd, and 4th-or-later pick from one family.
    pub family_penalty_steps: [f32; 3],
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            slot_total: 8,
            relaxation: vec![1.0, 0.85, 0.70],

            accent_min: 0.55,
            motion_band: (0.25, 0.65),
            foreground_max_noise: 0.6,
            foreground_min_harmonicity: 0.35,

            tag_bonus: 0.2,
            family_penalty_steps: [0.08, 0.16, 0.25],
        }
    }
}
