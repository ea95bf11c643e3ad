//! Role floor gates and their relaxation.
//!
//! A floor gate is a hard eligibility requirement; `strictness` is the
//! relaxation multiplier from the backoff ladder (1.0 = strict, lower values
//! loosen every bound toward admitting more of the pool).

use crate::config::SelectorConfig;
use crate::types::{Candidate, Role};

/// Does `candidate` clear `role`'s floor gate at the given strictness?
pub fn passes_floor(
    role: Role,
    candidate: &Candidate,
    strictness: f32,
    config: &SelectorConfig,
) -> bool {
    let f = &candidate.features;
    match role {
        Role::Accent => {
            let min = config.accent_min * strictness;
            f.crest >= min || f.onset_density >= min
        }
        Role::Motion => {
            // The band widens as strictness drops: lo shrinks toward 0 and
            // hi grows toward 1.
            let (lo, hi) = config.motion_band;
            let lo = lo * strictness;
            let hi = 1.0 - (1.0 - hi) * strictness;
            f.onset_density >= lo && f.onset_density <= hi
        }
        Role::Foreground => {
            let max_noise = config.foreground_max_noise / strictness;
            let min_harmonicity = config.foreground_min_harmonicity * strictness;
            f.noisiness <= max_noise && f.harmonicity >= min_harmonicity
        }
        Role::Bed => true,
    }
}
