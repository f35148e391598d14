//! The retrieval-and-trust engine: one validated configuration and the
//! components built from it.

use handbook_core::{AppResult, RetrievalConfig};

use crate::freshness::FreshnessMonitor;
use crate::rag::confidence::ConfidenceClassifier;
use crate::rag::followup::FollowUpGenerator;
use crate::rag::score::RelevanceScorer;

#[derive(Debug, Clone)]
pub struct RetrievalEngine {
    config: RetrievalConfig,
    scorer: RelevanceScorer,
    classifier: ConfidenceClassifier,
    follow_ups: FollowUpGenerator,
    freshness: FreshnessMonitor,
}

impl RetrievalEngine {
    /// Validate `config` and build every component from it.
    ///
    /// Out-of-range or inverted thresholds fail here with
    /// `InvalidConfiguration`; nothing is clamped.
    pub fn new(config: RetrievalConfig) -> AppResult<Self> {
        config.validate()?;

        Ok(Self {
            scorer: RelevanceScorer::new(&config),
            classifier: ConfidenceClassifier::new(&config),
            follow_ups: FollowUpGenerator::new(&config),
            freshness: FreshnessMonitor::new(&config),
            config,
        })
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn scorer(&self) -> &RelevanceScorer {
        &self.scorer
    }

    pub fn classifier(&self) -> &ConfidenceClassifier {
        &self.classifier
    }

    pub fn follow_ups(&self) -> &FollowUpGenerator {
        &self.follow_ups
    }

    pub fn freshness(&self) -> FreshnessMonitor {
        self.freshness
    }
}
