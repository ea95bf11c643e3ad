use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::role::Role;

/// The audio feature vector exposed by every pool candidate, each component
/// in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub crest: f32,
    pub onset_density: f32,
    pub noisiness: f32,
    pub harmonicity: f32,
    pub brightness: f32,
}

/// An entry from the external candidate pool. Owned by the caller; the
/// selector only reads it and copies what it keeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    /// Global fitness in [0, 1], computed upstream.
    pub score: f32,
    pub features: AudioFeatures,
    pub tags: Vec<String>,
    /// Generator-family classification used for diversity penalties.
    pub family: String,
}

/// A candidate the selector kept, as a self-contained output copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedCandidate {
    pub id: String,
    pub family: String,
    pub role: Role,
    pub score: f32,
    /// Role affinity (tag bonus included) at the moment of the pick.
    pub affinity: f32,
    /// Family penalty that was in force at the moment of the pick.
    pub penalty: f32,
}

/// Bucket size observed for one role at one relaxation strictness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketProbe {
    pub role: Role,
    pub strictness: f32,
    pub size: usize,
}

/// A role whose floor gates could not fill its slots even after the full
/// relaxation ladder; the remainder came from the unconditional global fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderfillEvent {
    pub role: Role,
    pub requested: usize,
    pub gated: usize,
    pub fallback: usize,
}

/// A nonzero family penalty applied to a pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyEvent {
    pub id: String,
    pub family: String,
    pub prior_count: usize,
    pub penalty: f32,
}

/// Audit trail of one selection call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionDebug {
    pub bucket_probes: Vec<BucketProbe>,
    pub fills: super::report::SlotAllocation,
    pub underfills: Vec<UnderfillEvent>,
    pub family_counts: BTreeMap<String, usize>,
    pub penalties: Vec<PenaltyEvent>,
    /// Mean audio features over the final selection (zeros when empty).
    pub feature_means: AudioFeatures,
    pub selected_ids: Vec<String>,
}

/// Up to eight chosen candidates plus the audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    pub selected: Vec<SelectedCandidate>,
    pub debug: SelectionDebug,
}
