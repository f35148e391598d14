//! Property tests for ranking and classification over generated stores.

use crate::rag::confidence::ConfidenceClassifier;
use crate::rag::followup::{FollowUpGenerator, TurnContext};
use crate::rag::score::RelevanceScorer;
use crate::text::normalize_phrase;
use crate::types::{ConfidenceTier, Document, ScoredSource, SourceKind, Topic, Turn};
use chrono::{DateTime, Duration, Utc};
use handbook_core::RetrievalConfig;
use proptest::prelude::*;
use proptest::sample::Index;
use std::collections::BTreeSet;

const VOCABULARY: &[&str] = &[
    "onboarding", "buddy", "values", "transparency", "remote", "async", "review",
    "feedback", "promotion", "roadmap", "platform", "security", "training", "timezone",
    "mentorship", "iteration",
];

/// Topic, body words and age in days for one generated document.
type DocumentShape = (Topic, Vec<&'static str>, i64);

fn topic() -> impl Strategy<Value = Topic> {
    prop::sample::select(Topic::ALL.to_vec())
}

fn phrase(max_words: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(VOCABULARY), 0..=max_words)
        .prop_map(|words| words.join(" "))
}

fn store_shape() -> impl Strategy<Value = Vec<DocumentShape>> {
    prop::collection::vec(
        (
            topic(),
            prop::collection::vec(prop::sample::select(VOCABULARY), 1..7),
            0i64..400,
        ),
        0..12,
    )
}

fn build_store(shape: &[DocumentShape], now: DateTime<Utc>) -> Vec<Document> {
    shape
        .iter()
        .enumerate()
        .map(|(i, (topic, words, age))| {
            Document::new(
                format!("doc-{}", i),
                *topic,
                "",
                words.join(" "),
                format!("https://handbook.example.com/doc-{}", i),
                SourceKind::Curated,
                now - Duration::days(*age),
                &[],
            )
        })
        .collect()
}

fn empty_turn(query: &str) -> Turn {
    Turn {
        turn_id: "t".to_string(),
        timestamp: Utc::now(),
        query_text: query.to_string(),
        answer_text: String::new(),
        sources: Vec::new(),
        confidence: ConfidenceTier::Low,
        follow_ups: Vec::new(),
        topics_touched: BTreeSet::new(),
    }
}

/// Suggestions the generator makes for each topic with no history.
fn suggestion_pool(generator: &FollowUpGenerator) -> Vec<String> {
    Topic::ALL
        .iter()
        .flat_map(|topic| {
            generator.generate(&TurnContext {
                query: "",
                answer: "",
                topics: std::slice::from_ref(topic),
                history: &[],
            })
        })
        .collect()
}

proptest! {
    #[test]
    fn test_score_output_is_sorted_bounded_and_above_floor(
        shape in store_shape(),
        query in phrase(3),
    ) {
        let config = RetrievalConfig::default();
        let scorer = RelevanceScorer::new(&config);
        let now = Utc::now();
        let docs = build_store(&shape, now);

        let sources = scorer.score(&query, &docs, now);

        prop_assert!(sources.len() <= config.max_sources_per_response);
        for pair in sources.windows(2) {
            prop_assert!(pair[0].relevance_score >= pair[1].relevance_score);
        }
        for source in &sources {
            prop_assert!(source.relevance_score > config.min_relevance_threshold);
            prop_assert!(source.relevance_score <= 1.0);
        }
    }

    #[test]
    fn test_classification_is_monotonic_in_any_source(
        scores in prop::collection::vec(0u32..=100, 1..4),
        bumped in any::<Index>(),
        raise in 0u32..50,
    ) {
        let classifier = ConfidenceClassifier::new(&RetrievalConfig::default());
        let mut sources: Vec<ScoredSource> = scores
            .iter()
            .enumerate()
            .map(|(i, score)| ScoredSource {
                document_id: format!("doc-{}", i),
                relevance_score: *score as f32 / 100.0,
                staleness_days: 0,
            })
            .collect();

        let before = classifier.classify(&sources);
        let source = &mut sources[bumped.index(scores.len())];
        source.relevance_score = (source.relevance_score + raise as f32 / 100.0).min(1.0);
        let after = classifier.classify(&sources);

        prop_assert!(after.rank() >= before.rank());
    }

    #[test]
    fn test_follow_ups_never_repeat_recent_queries(
        asked in prop::collection::vec(any::<Index>(), 0..8),
        topics in prop::collection::vec(topic(), 0..3),
    ) {
        let config = RetrievalConfig::default();
        let generator = FollowUpGenerator::new(&config);
        let pool = suggestion_pool(&generator);

        // Earlier queries repeat the generator's own suggestions in another case.
        let history: Vec<Turn> = asked
            .iter()
            .map(|index| empty_turn(&index.get(&pool).to_uppercase()))
            .collect();

        let out = generator.generate(&TurnContext {
            query: "tell me more",
            answer: "",
            topics: &topics,
            history: &history,
        });

        prop_assert!(out.len() <= config.max_follow_ups);
        let recent: BTreeSet<String> = history
            .iter()
            .rev()
            .take(config.history_window)
            .map(|t| normalize_phrase(&t.query_text))
            .collect();
        for suggestion in &out {
            prop_assert!(!recent.contains(&normalize_phrase(suggestion)));
        }
    }
}
