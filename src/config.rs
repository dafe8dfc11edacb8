//! Agent configuration.
//!
//! The historical player variants differ only in these knobs: search depth
//! or time budget, feature set, and learning constants.

use std::path::PathBuf;

use crate::constants::{MAX_DEPTH, SHRINK_FACTOR};
use crate::eval::FeatureSet;
use crate::search::SearchLimits;
use crate::tdleaf::TdLeaf;

#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub limits: SearchLimits,
    pub feature_set: FeatureSet,
    /// Multiplier applied to the weighted sum before `tanh`.
    pub shrink: f64,
    pub learning: TdLeaf,
    /// Run TD-Leaf at game end.
    pub learn: bool,
    /// Where weights are loaded from and saved to. Without a path the
    /// feature set's default weights are used and nothing is saved.
    pub weights_path: Option<PathBuf>,
    /// Save learned weights. When off, updates are computed and logged but
    /// the weights file is left alone.
    pub commit_weights: bool,
    /// Log every search node at `trace` level.
    pub trace: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            limits: SearchLimits::Fixed { depth: MAX_DEPTH },
            feature_set: FeatureSet::default(),
            shrink: SHRINK_FACTOR,
            learning: TdLeaf::default(),
            learn: true,
            weights_path: None,
            commit_weights: true,
            trace: false,
        }
    }
}

impl AgentConfig {
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.limits = SearchLimits::Fixed { depth };
        self
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_feature_set(mut self, feature_set: FeatureSet) -> Self {
        self.feature_set = feature_set;
        self
    }

    pub fn with_weights_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.weights_path = Some(path.into());
        self
    }
}
