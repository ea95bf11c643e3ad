//! Deterministic image role-map analysis and slot-allocated candidate
//! selection.
//!
//! `rolemap-core` looks at a single decoded image, derives a spatial role
//! map (which tile regions are accented, foregrounded, in motion, or
//! background bed), gates it for reliability, and allocates eight downstream
//! slots across the roles. A separate selector then fills those slots from
//! an externally supplied audio-generator candidate pool using floor gates,
//! a relaxation ladder, and family-diversity penalties. All operations are
//! deterministic — identical inputs always produce identical outputs,
//! byte-for-byte.
//!
//! Image decoding, candidate generation, and everything downstream of the
//! selection result live outside this crate.

pub mod analysis;
pub mod config;
pub mod selection;
pub mod types;

pub use analysis::SceneAnalyzer;
pub use config::{AnalysisConfig, SelectorConfig};
pub use selection::CandidateSelector;
pub use types::{
    AnalysisError, AnalysisRecord, AudioFeatures, Candidate, ImageFrame, Role, SelectionResult,
    SlotAllocation,
};
