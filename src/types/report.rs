use serde::{Deserialize, Serialize};

use super::role::Role;
use super::tile::{CoarseCell, Tile};

/// Exclusive role assignment over the tile grid, plus the confidence metrics
/// the assigner derives along the way.
///
/// The four index lists are sorted ascending and partition `0..tile_count`
/// exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleMap {
    pub accent: Vec<usize>,
    pub foreground: Vec<usize>,
    pub motion: Vec<usize>,
    pub bed: Vec<usize>,

    pub accent_saliency: f32,
    /// max(brightness variance, high-frequency energy) of the accent tile.
    pub accent_transient: f32,
    /// Mean object hint over the chosen foreground tiles (0 when empty).
    pub foreground_confidence: f32,
    /// Mean motion hint over the chosen motion tiles (0 when empty).
    pub motion_confidence: f32,
}

impl RoleMap {
    pub fn indices(&self, role: Role) -> &[usize] {
        match role {
            Role::Accent => &self.accent,
            Role::Foreground => &self.foreground,
            Role::Motion => &self.motion,
            Role::Bed => &self.bed,
        }
    }

    pub fn role_of(&self, tile_index: usize) -> Option<Role> {
        for role in Role::PRIORITY {
            if self.indices(role).contains(&tile_index) {
                return Some(role);
            }
        }
        None
    }
}

/// Weighted per-role aggregate over the tiles assigned to that role.
///
/// Means are weighted by the coarse-agreement tile weights; an empty role
/// reports zeroed means with `count == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStats {
    pub role: Role,
    pub count: usize,
    pub tile_indices: Vec<usize>,
    pub tile_weights: Vec<f32>,

    pub brightness: f32,
    pub brightness_variance: f32,
    pub saturation: f32,
    pub edge_density: f32,
    pub hf_energy: f32,
    pub vertical_edge_ratio: f32,

    /// count / total tiles.
    pub area_fraction: f32,
}

/// One `LayerStats` per role, always all four present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSet {
    pub accent: LayerStats,
    pub foreground: LayerStats,
    pub motion: LayerStats,
    pub bed: LayerStats,
}

impl LayerSet {
    pub fn get(&self, role: Role) -> &LayerStats {
        match role {
            Role::Accent => &self.accent,
            Role::Foreground => &self.foreground,
            Role::Motion => &self.motion,
            Role::Bed => &self.bed,
        }
    }
}

/// Outcome of the five fixed sanity checks over an analysis.
///
/// A failed gate is a policy signal, not an error: `fallback` tells the
/// downstream stage to use a global (non-spatial) strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub structure: bool,
    pub accent: bool,
    pub role_confidence: bool,
    pub weight_coherence: bool,
    pub layer_balance: bool,

    /// Checks passed / 5, in [0, 1].
    pub score: f32,
    /// True iff `score` is below the configured threshold.
    pub fallback: bool,
}

impl QualityReport {
    pub fn checks(&self) -> [bool; 5] {
        [
            self.structure,
            self.accent,
            self.role_confidence,
            self.weight_coherence,
            self.layer_balance,
        ]
    }
}

/// How many of the eight downstream slots each role receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAllocation {
    pub accent: usize,
    pub foreground: usize,
    pub motion: usize,
    pub bed: usize,
}

impl SlotAllocation {
    pub fn get(&self, role: Role) -> usize {
        match role {
            Role::Accent => self.accent,
            Role::Foreground => self.foreground,
            Role::Motion => self.motion,
            Role::Bed => self.bed,
        }
    }

    pub fn get_mut(&mut self, role: Role) -> &mut usize {
        match role {
            Role::Accent => &mut self.accent,
            Role::Foreground => &mut self.foreground,
            Role::Motion => &mut self.motion,
            Role::Bed => &mut self.bed,
        }
    }

    pub fn total(&self) -> usize {
        self.accent + self.foreground + self.motion + self.bed
    }

    pub const fn zero() -> Self {
        Self {
            accent: 0,
            foreground: 0,
            motion: 0,
            bed: 0,
        }
    }
}

/// Compact role-scoped summary handed to the downstream parameter-mapping
/// stage. Emitted only for roles that hold tiles and slots, and only when the
/// quality gate did not fall back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecToken {
    pub role: Role,
    pub slots: usize,

    pub brightness: f32,
    pub brightness_variance: f32,
    pub saturation: f32,
    pub edge_density: f32,
    pub hf_energy: f32,
    pub vertical_edge_ratio: f32,

    pub confidence: f32,
    pub area_fraction: f32,
}

/// The full structured output of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub tiles: Vec<Tile>,
    pub roles: RoleMap,
    pub coarse_cells: Vec<CoarseCell>,
    pub tile_weights: Vec<f32>,
    pub layers: LayerSet,
    pub quality: QualityReport,
    pub allocation: SlotAllocation,
    pub tokens: Vec<SpecToken>,
}
