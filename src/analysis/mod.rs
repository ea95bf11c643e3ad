pub mod coarse;
pub mod features;
pub mod hints;
pub mod quality;
pub mod roles;

use tracing::debug;

use crate::config::AnalysisConfig;
use crate::types::{AnalysisError, AnalysisRecord, ImageFrame};

pub use coarse::{aggregate_coarse, layer_stats};
pub use features::extract_tiles;
pub use hints::compose_hints;
pub use quality::{allocate_slots, assess_quality, build_tokens};
pub use roles::assign_roles;

/// The image-understanding half of the pipeline: feature extraction through
/// quality gating and slot allocation.
///
/// Stateless apart from its configuration; every call is a pure function of
/// the frame and the config.
pub struct SceneAnalyzer {
    config: AnalysisConfig,
}

impl Default for SceneAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl SceneAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the full analysis over one frame.
    pub fn analyze(&self, frame: &ImageFrame) -> Result<AnalysisRecord, AnalysisError> {
        // 1. Extraction Phase
        let mut tiles = extract_tiles(frame, &self.config);
        debug!(tiles = tiles.len(), "extracted tile features");

        // 2. Hint Phase
        compose_hints(&mut tiles);

        // 3. Assignment Phase
        let roles = assign_roles(&tiles, &self.config);
        debug!(
            foreground = roles.foreground.len(),
            motion = roles.motion.len(),
            "assigned roles"
        );

        // 4. Aggregation Phase
        let (coarse_cells, tile_weights) = aggregate_coarse(&tiles, &roles, &self.config)?;
        let layers = layer_stats(&tiles, &roles, &tile_weights);

        // 5. Gating Phase
        let quality = assess_quality(&tiles, &roles, &layers, &tile_weights, &self.config);
        let allocation = allocate_slots(&roles, &self.config);
        let tokens = build_tokens(&roles, &layers, &tile_weights, &allocation, &quality);

        Ok(AnalysisRecord {
            tiles,
            roles,
            coarse_cells,
            tile_weights,
            layers,
            quality,
            allocation,
            tokens,
        })
    }
}
