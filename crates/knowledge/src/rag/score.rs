//! Relevance scoring.
//!
//! Scores are keyword overlap between the query and each document's keyword
//! index, weighted by inverse document frequency across the store and then
//! discounted by document age.

use chrono::{DateTime, Utc};
use handbook_core::RetrievalConfig;
use std::collections::BTreeSet;

use crate::freshness::age_days;
use crate::text;
use crate::types::{Document, ScoredSource};

/// Ranks documents against a query. Holds configuration only.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    min_relevance_threshold: f32,
    max_sources_per_response: usize,
    recency_horizon_days: u32,
    min_recency_weight: f32,
}

impl RelevanceScorer {
    pub fn new(config: &RetrievalConfig) -> Self {
        Self {
            min_relevance_threshold: config.min_relevance_threshold,
            max_sources_per_response: config.max_sources_per_response,
            recency_horizon_days: config.recency_horizon_days,
            min_recency_weight: config.min_recency_weight,
        }
    }

    /// Rank `documents` against `query` as of `now`.
    ///
    /// Returns at most `max_sources_per_response` entries, each strictly above
    /// the relevance floor, sorted by descending score. Ties go to the most
    /// recently updated document, then to the smaller id. An empty result
    /// means no grounding is available.
    pub fn score(&self, query: &str, documents: &[Document], now: DateTime<Utc>) -> Vec<ScoredSource> {
        let terms = text::normalize_terms(query);
        if terms.is_empty() || documents.is_empty() {
            tracing::debug!(
                terms = terms.len(),
                documents = documents.len(),
                "Nothing to score"
            );
            return Vec::new();
        }

        let weights = term_weights(&terms, documents);
        let total_weight: f32 = weights.iter().map(|(_, w)| w).sum();

        let mut ranked: Vec<(&Document, ScoredSource)> = documents
            .iter()
            .filter_map(|doc| {
                let matched: f32 = weights
                    .iter()
                    .filter(|(term, _)| doc.keyword_index.contains(*term))
                    .map(|(_, w)| w)
                    .sum();
                let base = matched / total_weight;

                let staleness_days = age_days(doc.last_updated, now);
                let score = (base * self.recency_multiplier(staleness_days)).clamp(0.0, 1.0);

                (score > self.min_relevance_threshold).then(|| {
                    (
                        doc,
                        ScoredSource {
                            document_id: doc.id.clone(),
                            relevance_score: score,
                            staleness_days,
                        },
                    )
                })
            })
            .collect();

        ranked.sort_by(|(doc_a, a), (doc_b, b)| {
            b.relevance_score
                .total_cmp(&a.relevance_score)
                .then_with(|| doc_b.last_updated.cmp(&doc_a.last_updated))
                .then_with(|| doc_a.id.cmp(&doc_b.id))
        });
        ranked.truncate(self.max_sources_per_response);

        tracing::debug!(
            query_terms = terms.len(),
            matched = ranked.len(),
            top = ranked.first().map(|(_, s)| s.relevance_score).unwrap_or(0.0),
            "Scored documents"
        );

        ranked.into_iter().map(|(_, source)| source).collect()
    }

    /// Age discount in `[min_recency_weight, 1.0]`.
    pub fn recency_multiplier(&self, staleness_days: u32) -> f32 {
        let decay = 1.0 - staleness_days as f32 / self.recency_horizon_days as f32;
        decay.max(self.min_recency_weight).min(1.0)
    }
}

/// Inverse document frequency for each query term.
///
/// Terms no document contains get the largest weight, so an unmatched but
/// specific query term pulls every score down.
fn term_weights<'a>(terms: &'a BTreeSet<String>, documents: &[Document]) -> Vec<(&'a str, f32)> {
    let n = documents.len() as f32;
    terms
        .iter()
        .map(|term| {
            let df = documents
                .iter()
                .filter(|doc| doc.keyword_index.contains(term))
                .count() as f32;
            (term.as_str(), 1.0 + ((n + 1.0) / (df + 1.0)).ln())
        })
        .collect()
}
