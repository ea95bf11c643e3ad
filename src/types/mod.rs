pub mod candidate;
pub mod report;
pub mod role;
pub mod tile;

pub use candidate::{
    AudioFeatures, BucketProbe, Candidate, PenaltyEvent, SelectedCandidate, SelectionDebug,
    SelectionResult, UnderfillEvent,
};
pub use report::{
    AnalysisRecord, LayerSet, LayerStats, QualityReport, RoleMap, SlotAllocation, SpecToken,
};
pub use role::{Role, Tendency};
pub use tile::{AnalysisError, CoarseCell, ImageFrame, Tile, TileBounds};
