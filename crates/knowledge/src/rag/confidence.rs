//! Confidence classification over ranked sources.

use handbook_core::RetrievalConfig;

use crate::types::{ConfidenceTier, ScoredSource};

/// Maps a ranked source list to a trust tier.
///
/// `High` requires corroboration: the top score must clear the high threshold
/// and at least two sources must be present.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceClassifier {
    high_threshold: f32,
    medium_threshold: f32,
}

impl ConfidenceClassifier {
    pub fn new(config: &RetrievalConfig) -> Self {
        Self {
            high_threshold: config.high_threshold,
            medium_threshold: config.medium_threshold,
        }
    }

    pub fn classify(&self, sources: &[ScoredSource]) -> ConfidenceTier {
        let Some(top) = sources
            .iter()
            .map(|s| s.relevance_score)
            .reduce(f32::max)
        else {
            return ConfidenceTier::Low;
        };

        if top >= self.high_threshold && sources.len() >= 2 {
            ConfidenceTier::High
        } else if top >= self.medium_threshold {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}
