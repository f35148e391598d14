//! One conversation turn, end to end.
//!
//! Scores the store snapshot, asks the generation service for prose,
//! classifies confidence, derives follow-ups and appends the turn to the
//! ledger. Collaborator failures degrade the turn; they never abort it.

use chrono::{DateTime, Utc};
use handbook_core::AppError;
use std::collections::BTreeSet;
use std::time::Duration;

use crate::engine::RetrievalEngine;
use crate::ledger::ConversationLedger;
use crate::rag::followup::TurnContext;
use crate::rag::generation::{ContextDocument, GenerationService};
use crate::rag::types::{no_grounding_answer, AskOutcome};
use crate::store::DocumentStore;
use crate::types::{Document, Notice, ScoredSource, Topic, Turn};

/// Answer `query` against the current store snapshot and record the turn.
pub async fn ask(
    engine: &RetrievalEngine,
    store: &DocumentStore,
    ledger: &ConversationLedger,
    generator: &dyn GenerationService,
    query: &str,
    now: DateTime<Utc>,
) -> AskOutcome {
    let config = engine.config();
    let documents = store.snapshot();
    let history = ledger.recent(config.history_window);
    let mut notices = Vec::new();

    let sources = engine.scorer().score(query, &documents, now);
    let cited: Vec<&Document> = sources
        .iter()
        .filter_map(|source| documents.iter().find(|doc| doc.id == source.document_id))
        .collect();

    let answer_text = if sources.is_empty() {
        tracing::info!("No grounding available for query");
        notices.push(Notice::NoGroundingAvailable);
        no_grounding_answer(query)
    } else {
        let context = context_documents(&sources, &cited);
        let timeout = Duration::from_secs(config.generation_timeout_secs);

        let generated = match tokio::time::timeout(
            timeout,
            generator.generate_answer(query, &context, &history),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(AppError::GenerationUnavailable(format!(
                "timed out after {}s",
                config.generation_timeout_secs
            ))),
        };

        match generated {
            Ok(text) => text,
            Err(e) => {
                let reason = match e {
                    AppError::GenerationUnavailable(reason) => reason,
                    other => other.to_string(),
                };
                tracing::warn!("Answer generation unavailable: {}", reason);
                notices.push(Notice::GenerationUnavailable { reason });
                String::new()
            }
        }
    };

    let freshness = engine.freshness();
    let stale: Vec<String> = sources
        .iter()
        .filter(|source| freshness.is_stale_age(source.staleness_days))
        .map(|source| source.document_id.clone())
        .collect();
    if !stale.is_empty() {
        notices.push(Notice::StaleSources {
            document_ids: stale,
        });
    }

    let confidence = engine.classifier().classify(&sources);

    let mut topics: Vec<Topic> = Vec::new();
    for doc in &cited {
        if !topics.contains(&doc.topic) {
            topics.push(doc.topic);
        }
    }
    let topics_touched: BTreeSet<Topic> = topics.iter().copied().collect();

    let follow_ups = engine.follow_ups().generate(&TurnContext {
        query,
        answer: &answer_text,
        topics: &topics,
        history: &history,
    });

    let turn = Turn {
        turn_id: uuid::Uuid::new_v4().to_string(),
        timestamp: now,
        query_text: query.to_string(),
        answer_text,
        sources,
        confidence,
        follow_ups,
        topics_touched,
    };

    tracing::info!(
        turn_id = %turn.turn_id,
        sources = turn.sources.len(),
        confidence = %turn.confidence,
        notices = notices.len(),
        "Turn recorded"
    );

    ledger.append(turn.clone());
    AskOutcome { turn, notices }
}

fn context_documents(sources: &[ScoredSource], cited: &[&Document]) -> Vec<ContextDocument> {
    sources
        .iter()
        .zip(cited)
        .map(|(source, doc)| ContextDocument {
            document_id: doc.id.clone(),
            title: doc.title.clone(),
            topic: doc.topic,
            url: doc.url.clone(),
            body_text: doc.body_text.clone(),
            relevance_score: source.relevance_score,
            staleness_days: source.staleness_days,
        })
        .collect()
}
