use std::collections::BTreeSet;

use rolemap_core::selection::{family_penalty, passes_floor, role_affinity};
use rolemap_core::types::Role;
use rolemap_core::{AudioFeatures, Candidate, CandidateSelector, SelectorConfig, SlotAllocation};

fn make_candidate(
    id: &str,
    family: &str,
    score: f32,
    features: AudioFeatures,
    tags: &[&str],
) -> Candidate {
    Candidate {
        id: id.to_string(),
        score,
        features,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        family: family.to_string(),
    }
}

/// 20 candidates: 4 accent-like, 4 motion-like, 4 foreground-like, 8
/// bed-like, one family per group.
fn mixed_pool() -> Vec<Candidate> {
    let mut pool = Vec::new();
    for i in 0..4 {
        pool.push(make_candidate(
            &format!("acc-{i:02}"),
            "burst",
            0.90 - i as f32 * 0.01,
            AudioFeatures {
                crest: 0.9,
                onset_density: 0.8,
                noisiness: 0.8,
                harmonicity: 0.2,
                brightness: 0.7,
            },
            &["strike"],
        ));
    }
    for i in 0..4 {
        pool.push(make_candidate(
            &format!("mot-{i:02}"),
            "wobble",
            0.80 - i as f32 * 0.01,
            AudioFeatures {
                crest: 0.2,
                onset_density: 0.45,
                noisiness: 0.5,
                harmonicity: 0.3,
                brightness: 0.5,
            },
            &["lfo"],
        ));
    }
    for i in 0..4 {
        pool.push(make_candidate(
            &format!("fg-{i:02}"),
            "reed",
            0.70 - i as f32 * 0.01,
            AudioFeatures {
                crest: 0.3,
                onset_density: 0.2,
                noisiness: 0.2,
                harmonicity: 0.8,
                brightness: 0.4,
            },
            &["tonal"],
        ));
    }
    for i in 0..8 {
        pool.push(make_candidate(
            &format!("bed-{i:02}"),
            "texture",
            0.60 - i as f32 * 0.01,
            AudioFeatures {
                crest: 0.1,
                onset_density: 0.1,
                noisiness: 0.65,
                harmonicity: 0.3,
                brightness: 0.3,
            },
            &["drone"],
        ));
    }
    pool
}

fn standard_allocation() -> SlotAllocation {
    SlotAllocation {
        accent: 1,
        foreground: 2,
        motion: 2,
        bed: 3,
    }
}

#[test]
fn mixed_pool_fills_exactly_per_allocation() {
    let selector = CandidateSelector::default();
    let result = selector.select(&mixed_pool(), &standard_allocation());

    assert_eq!(result.selected.len(), 8);
    assert_eq!(result.debug.fills, standard_allocation());

    let ids: BTreeSet<&str> = result.selected.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids.len(), 8, "selected ids must be unique");
    assert_eq!(result.debug.selected_ids.len(), 8);
    assert!(result.debug.underfills.is_empty());

    // Each gated role filled from its own group.
    for pick in &result.selected {
        match pick.role {
            Role::Accent => assert!(pick.id.starts_with("acc-")),
            Role::Motion => assert!(pick.id.starts_with("mot-")),
            Role::Foreground => assert!(pick.id.starts_with("fg-")),
            Role::Bed => {}
        }
    }
}

#[test]
fn gateless_pool_underfills_accent_via_global_fill() {
    // Nobody clears the accent floor even at the loosest relaxation
    // (0.55 * 0.70 = 0.385).
    let mut pool = Vec::new();
    for i in 0..20 {
        pool.push(make_candidate(
            &format!("cand-{i:02}"),
            &format!("fam-{}", i % 5),
            0.5 + (i % 7) as f32 * 0.05,
            AudioFeatures {
                crest: 0.1,
                onset_density: 0.3,
                noisiness: 0.3,
                harmonicity: 0.5,
                brightness: 0.4,
            },
            &[],
        ));
    }

    let selector = CandidateSelector::default();
    let result = selector.select(&pool, &standard_allocation());

    assert_eq!(result.selected.len(), 8);
    assert_eq!(result.debug.fills.accent, 1);

    let accent_probes: Vec<_> = result
        .debug
        .bucket_probes
        .iter()
        .filter(|p| p.role == Role::Accent)
        .collect();
    assert_eq!(accent_probes.len(), 3, "all relaxation levels must be probed");
    assert!(accent_probes.iter().all(|p| p.size == 0));

    let underfill = result
        .debug
        .underfills
        .iter()
        .find(|u| u.role == Role::Accent)
        .expect("accent underfill must be recorded");
    assert_eq!(underfill.requested, 1);
    assert_eq!(underfill.gated, 0);
    assert_eq!(underfill.fallback, 1);
}

#[test]
fn family_penalty_is_monotone_and_stepped() {
    let config = SelectorConfig::default();

    assert_eq!(family_penalty(0, &config), 0.0);
    assert_eq!(family_penalty(1, &config), 0.0);
    assert_eq!(family_penalty(2, &config), 0.08);
    assert_eq!(family_penalty(3, &config), 0.16);
    assert_eq!(family_penalty(4, &config), 0.25);
    assert_eq!(family_penalty(9, &config), 0.25);

    let mut previous = 0.0;
    for prior in 0..12 {
        let penalty = family_penalty(prior, &config);
        assert!(penalty >= previous, "penalty must never decrease");
        previous = penalty;
    }
}

#[test]
fn repeated_family_picks_record_penalties() {
    let selector = CandidateSelector::default();
    let result = selector.select(&mixed_pool(), &standard_allocation());

    // Three bed slots come from the single "texture" family; the third pick
    // carries the first penalty step.
    assert_eq!(result.debug.family_counts.get("texture"), Some(&3));
    let penalized: Vec<_> = result
        .debug
        .penalties
        .iter()
        .filter(|p| p.family == "texture")
        .collect();
    assert_eq!(penalized.len(), 1);
    assert_eq!(penalized[0].prior_count, 2);
    assert!((penalized[0].penalty - 0.08).abs() < f32::EPSILON);
}

#[test]
fn mismatched_allocation_proceeds_with_warning_semantics() {
    let selector = CandidateSelector::default();

    let short = SlotAllocation {
        accent: 1,
        foreground: 1,
        motion: 1,
        bed: 1,
    };
    let result = selector.select(&mixed_pool(), &short);
    assert_eq!(result.selected.len(), 4);

    let over = SlotAllocation {
        accent: 4,
        foreground: 4,
        motion: 4,
        bed: 4,
    };
    let result = selector.select(&mixed_pool(), &over);
    assert_eq!(
        result.selected.len(),
        8,
        "over-allocation must trim to the slot total"
    );
    assert_eq!(result.debug.fills.total(), 8);
    let ids: BTreeSet<&str> = result.selected.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids.len(), 8);
}

#[test]
fn small_pool_selects_everything_without_duplicates() {
    let pool: Vec<Candidate> = mixed_pool().into_iter().take(5).collect();
    let selector = CandidateSelector::default();
    let result = selector.select(&pool, &standard_allocation());

    assert_eq!(result.selected.len(), 5, "cannot select more than the pool holds");
    let ids: BTreeSet<&str> = result.selected.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids.len(), 5);
}

#[test]
fn floor_gates_relax_in_order() {
    let config = SelectorConfig::default();
    let borderline = make_candidate(
        "edge",
        "fam",
        0.5,
        AudioFeatures {
            crest: 0.50,
            onset_density: 0.0,
            noisiness: 0.0,
            harmonicity: 1.0,
            brightness: 0.5,
        },
        &[],
    );

    // crest 0.50 misses the strict accent floor (0.55) but clears the
    // relaxed ones (0.4675, 0.385).
    assert!(!passes_floor(Role::Accent, &borderline, 1.0, &config));
    assert!(passes_floor(Role::Accent, &borderline, 0.85, &config));
    assert!(passes_floor(Role::Accent, &borderline, 0.70, &config));

    // Bed admits anything.
    assert!(passes_floor(Role::Bed, &borderline, 1.0, &config));
}

#[test]
fn affinities_stay_in_unit_range_and_reward_tags() {
    let config = SelectorConfig::default();
    let plain = make_candidate(
        "plain",
        "fam",
        0.5,
        AudioFeatures {
            crest: 0.9,
            onset_density: 0.45,
            noisiness: 0.1,
            harmonicity: 0.9,
            brightness: 0.5,
        },
        &[],
    );
    let tagged = Candidate {
        tags: vec!["granular drone".to_string()],
        ..plain.clone()
    };

    for role in Role::PRIORITY {
        let a = role_affinity(role, &plain, &config);
        assert!((0.0..=1.0).contains(&a), "{role} affinity {a}");
    }

    let plain_bed = role_affinity(Role::Bed, &plain, &config);
    let tagged_bed = role_affinity(Role::Bed, &tagged, &config);
    assert!(tagged_bed > plain_bed);
    assert!(tagged_bed <= 1.0);

    // Motion affinity peaks at the band center.
    let mid = make_candidate(
        "mid",
        "fam",
        0.5,
        AudioFeatures {
            onset_density: 0.45,
            ..AudioFeatures::default()
        },
        &[],
    );
    let off = make_candidate(
        "off",
        "fam",
        0.5,
        AudioFeatures {
            onset_density: 0.9,
            ..AudioFeatures::default()
        },
        &[],
    );
    assert!(
        role_affinity(Role::Motion, &mid, &config) > role_affinity(Role::Motion, &off, &config)
    );
}
