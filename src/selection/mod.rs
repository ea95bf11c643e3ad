pub mod affinity;
pub mod gates;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::config::SelectorConfig;
use crate::types::{
    AudioFeatures, BucketProbe, Candidate, PenaltyEvent, Role, SelectedCandidate, SelectionDebug,
    SelectionResult, SlotAllocation, UnderfillEvent,
};

pub use affinity::{family_penalty, role_affinity};
pub use gates::passes_floor;

/// The selection half of the pipeline: fills the allocated slots from an
/// externally supplied candidate pool.
///
/// Stateless apart from its configuration; scratch state (remaining pool,
/// family counters) is owned by each call, so concurrent selections never
/// interfere.
pub struct CandidateSelector {
    config: SelectorConfig,
}

impl Default for CandidateSelector {
    fn default() -> Self {
        Self::new(SelectorConfig::default())
    }
}

impl CandidateSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Fill the allocation from the pool.
    ///
    /// An allocation that does not sum to the configured total is a warning,
    /// not an error: the selector proceeds and trims or underfills as needed.
    /// Shortfalls resolve through the relaxation ladder, then through an
    /// unconditional global-score fill recorded as an underfill.
    pub fn select(&self, pool: &[Candidate], allocation: &SlotAllocation) -> SelectionResult {
        if allocation.total() != self.config.slot_total {
            warn!(
                total = allocation.total(),
                expected = self.config.slot_total,
                "slot allocation does not sum to expected total; proceeding"
            );
        }

        let mut remaining: Vec<usize> = (0..pool.len()).collect();
        let mut family_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut selected: Vec<SelectedCandidate> = Vec::with_capacity(self.config.slot_total);
        let mut fills = SlotAllocation::zero();
        let mut bucket_probes = Vec::new();
        let mut underfills = Vec::new();
        let mut penalties = Vec::new();

        for role in Role::PRIORITY {
            let need = allocation.get(role);
            if need == 0 {
                continue;
            }

            let mut filled = 0;
            for &strictness in &self.config.relaxation {
                if filled >= need {
                    break;
                }

                let mut bucket: Vec<usize> = remaining
                    .iter()
                    .copied()
                    .filter(|&i| passes_floor(role, &pool[i], strictness, &self.config))
                    .collect();
                bucket_probes.push(BucketProbe {
                    role,
                    strictness,
                    size: bucket.len(),
                });

                // Greedy: re-rank after every pick, because each pick moves
                // the family-penalty landscape under the rest of the bucket.
                while filled < need {
                    let Some(position) = best_position(&bucket, pool, |candidate| {
                        let prior = family_count(&family_counts, &candidate.family);
                        role_affinity(role, candidate, &self.config)
                            - family_penalty(prior, &self.config)
                    }) else {
                        break;
                    };

                    let index = bucket.remove(position);
                    remaining.retain(|&i| i != index);
                    self.record_pick(
                        role,
                        &pool[index],
                        &mut family_counts,
                        &mut penalties,
                        &mut selected,
                    );
                    filled += 1;
                }
            }

            // Unconditional fill: floor gates are ignored, ranking falls back
            // to the penalized global score.
            if filled < need {
                let gated = filled;
                while filled < need {
                    let Some(position) = best_position(&remaining, pool, |candidate| {
                        let prior = family_count(&family_counts, &candidate.family);
                        candidate.score - family_penalty(prior, &self.config)
                    }) else {
                        break;
                    };

                    let index = remaining.remove(position);
                    self.record_pick(
                        role,
                        &pool[index],
                        &mut family_counts,
                        &mut penalties,
                        &mut selected,
                    );
                    filled += 1;
                }

                warn!(
                    role = %role,
                    requested = need,
                    gated,
                    "floor gates could not fill role; used global-score fill"
                );
                underfills.push(UnderfillEvent {
                    role,
                    requested: need,
                    gated,
                    fallback: filled - gated,
                });
            }

            *fills.get_mut(role) += filled;
        }

        // Over-selection should not happen with a well-formed allocation, but
        // a caller-supplied one can overshoot: keep the strongest.
        if selected.len() > self.config.slot_total {
            debug!(
                selected = selected.len(),
                "trimming over-full selection to slot total"
            );
            trim_selection(&mut selected, self.config.slot_total);
            fills = recount_fills(&selected);
        }

        let family_counts = recount_families(&selected);
        let feature_means = mean_features(&selected, pool);
        let selected_ids: Vec<String> = selected.iter().map(|s| s.id.clone()).collect();

        SelectionResult {
            selected,
            debug: SelectionDebug {
                bucket_probes,
                fills,
                underfills,
                family_counts,
                penalties,
                feature_means,
                selected_ids,
            },
        }
    }

    fn record_pick(
        &self,
        role: Role,
        candidate: &Candidate,
        family_counts: &mut BTreeMap<String, usize>,
        penalties: &mut Vec<PenaltyEvent>,
        selected: &mut Vec<SelectedCandidate>,
    ) {
        let prior = family_count(family_counts, &candidate.family);
        let penalty = family_penalty(prior, &self.config);
        if penalty > 0.0 {
            penalties.push(PenaltyEvent {
                id: candidate.id.clone(),
                family: candidate.family.clone(),
                prior_count: prior,
                penalty,
            });
        }

        selected.push(SelectedCandidate {
            id: candidate.id.clone(),
            family: candidate.family.clone(),
            role,
            score: candidate.score,
            affinity: role_affinity(role, candidate, &self.config),
            penalty,
        });
        *family_counts.entry(candidate.family.clone()).or_insert(0) += 1;
    }
}

/// Position of the best entry by (key desc, global score desc, id asc).
fn best_position(
    bucket: &[usize],
    pool: &[Candidate],
    key: impl Fn(&Candidate) -> f32,
) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (position, &index) in bucket.iter().enumerate() {
        let candidate = &pool[index];
        let k = key(candidate);
        let better = match best {
            None => true,
            Some((best_position, best_key)) => {
                let current = &pool[bucket[best_position]];
                k.partial_cmp(&best_key)
                    .unwrap_or(Ordering::Equal)
                    .then(
                        candidate
                            .score
                            .partial_cmp(&current.score)
                            .unwrap_or(Ordering::Equal),
                    )
                    .then(current.id.cmp(&candidate.id))
                    == Ordering::Greater
            }
        };
        if better {
            best = Some((position, k));
        }
    }
    best.map(|(position, _)| position)
}

fn family_count(counts: &BTreeMap<String, usize>, family: &str) -> usize {
    counts.get(family).copied().unwrap_or(0)
}

/// Keep the `total` strongest picks by (global score desc, id asc),
/// preserving the original pick order of the survivors.
fn trim_selection(selected: &mut Vec<SelectedCandidate>, total: usize) {
    let mut ranked: Vec<usize> = (0..selected.len()).collect();
    ranked.sort_by(|&a, &b| {
        selected[b]
            .score
            .partial_cmp(&selected[a].score)
            .unwrap_or(Ordering::Equal)
            .then(selected[a].id.cmp(&selected[b].id))
    });
    ranked.truncate(total);
    ranked.sort_unstable();

    let mut position = 0;
    selected.retain(|_| {
        let keep = ranked.binary_search(&position).is_ok();
        position += 1;
        keep
    });
}

fn recount_fills(selected: &[SelectedCandidate]) -> SlotAllocation {
    let mut fills = SlotAllocation::zero();
    for pick in selected {
        *fills.get_mut(pick.role) += 1;
    }
    fills
}

fn recount_families(selected: &[SelectedCandidate]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for pick in selected {
        *counts.entry(pick.family.clone()).or_insert(0) += 1;
    }
    counts
}

fn mean_features(selected: &[SelectedCandidate], pool: &[Candidate]) -> AudioFeatures {
    let mut sum = AudioFeatures::default();
    let mut counted = 0usize;
    for pick in selected {
        if let Some(candidate) = pool.iter().find(|c| c.id == pick.id) {
            sum.crest += candidate.features.crest;
            sum.onset_density += candidate.features.onset_density;
            sum.noisiness += candidate.features.noisiness;
            sum.harmonicity += candidate.features.harmonicity;
            sum.brightness += candidate.features.brightness;
            counted += 1;
        }
    }
    if counted == 0 {
        return AudioFeatures::default();
    }

    let n = counted as f32;
    AudioFeatures {
        crest: sum.crest / n,
        onset_density: sum.onset_density / n,
        noisiness: sum.noisiness / n,
        harmonicity: sum.harmonicity / n,
        brightness: sum.brightness / n,
    }
}
