//! Role affinity scoring and the family-diversity penalty.
//!
//! Affinity ranks candidates inside an eligibility bucket; it is never a
//! gate. The family penalty grows with how many candidates from the same
//! family are already selected, pushing later picks toward variety.

use crate::config::SelectorConfig;
use crate::types::{Candidate, Role};

/// Tag fragments that mark a candidate as idiomatic for a role.
const ACCENT_TAGS: [&str; 6] = ["exciter", "pluck", "strike", "impulse", "attack", "transient"];
const MOTION_TAGS: [&str; 6] = ["lfo", "pulse", "rhythm", "scan", "motion", "arp"];
const FOREGROUND_TAGS: [&str; 6] = ["formant", "resonant", "voice", "lead", "tonal", "feedback"];
const BED_TAGS: [&str; 6] = ["drone", "pad", "wash", "sustain", "ambient", "bed"];

/// Affinity of `candidate` for `role`, in [0, 1]. Includes the tag bonus.
pub fn role_affinity(role: Role, candidate: &Candidate, config: &SelectorConfig) -> f32 {
    let f = &candidate.features;
    let base = match role {
        Role::Accent => f.crest.max(f.onset_density),
        // Triangular peak: strongest when onset density sits mid-range.
        Role::Motion => (1.0 - (f.onset_density - 0.45).abs() / 0.45).max(0.0),
        Role::Foreground => 0.6 * f.harmonicity + 0.4 * (1.0 - f.noisiness),
        Role::Bed => 1.0 - 0.5 * f.onset_density,
    };

    let bonus = if tag_matches(role, &candidate.tags) {
        config.tag_bonus
    } else {
        0.0
    };
    (base + bonus).clamp(0.0, 1.0)
}

/// Penalty for picking another member of a family that already has
/// `prior_count` selections: 0 up to one prior pick, then the configured
/// steps, saturating at the last step. Monotonically non-decreasing.
pub fn family_penalty(prior_count: usize, config: &SelectorConfig) -> f32 {
    let steps = &config.family_penalty_steps;
    match prior_count {
        0 | 1 => 0.0,
        2 => steps[0],
        3 => steps[1],
        _ => steps[2],
    }
}

fn tag_matches(role: Role, tags: &[String]) -> bool {
    let patterns: &[&str] = match role {
        Role::Accent => &ACCENT_TAGS,
        Role::Motion => &MOTION_TAGS,
        Role::Foreground => &FOREGROUND_TAGS,
        Role::Bed => &BED_TAGS,
    };
    tags.iter().any(|tag| {
        let tag = tag.to_lowercase();
        patterns.iter().any(|p| tag.contains(p))
    })
}
