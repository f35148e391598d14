//! Session wiring shared by the commands.

use handbook_core::{config::AppConfig, AppResult};
use handbook_knowledge::{
    AskOutcome, DocumentStore, LlmAnswerGenerator, Notice, RefreshReport, RetrievalEngine, Session,
};
use handbook_llm::create_client;
use handbook_prompt::{load_prompt_or_default, ANSWER_PROMPT_ID};
use std::sync::Arc;
use std::time::Duration;

/// Shown in place of an answer the generation service could not produce.
const ANSWER_PLACEHOLDER: &str =
    "(The answer could not be generated right now. The sources below may still help.)";

/// Load the document store and build a session around it.
///
/// A workspace without a store gets the curated corpus, which is persisted
/// right away so document ages accumulate across runs.
pub fn open_session(config: &AppConfig) -> AppResult<Session> {
    let engine = RetrievalEngine::new(config.retrieval.clone())?;

    let path = config.documents_path();
    let store = DocumentStore::load_or_default(&path)?;
    if !path.exists() {
        store.save(&path)?;
    }

    tracing::debug!("Document store has {} documents", store.len());
    Ok(Session::new(engine, Arc::new(store)))
}

/// Persist the session's store back to the workspace.
pub fn save_store(config: &AppConfig, session: &Session) -> AppResult<()> {
    session.store().save(&config.documents_path())
}

/// Build the LLM-backed answer generator for the configured provider.
pub fn answer_generator(config: &AppConfig) -> AppResult<LlmAnswerGenerator> {
    let provider = config.get_provider_config(&config.provider);
    let endpoint = provider.as_ref().map(|p| p.endpoint.clone());
    let timeout = provider
        .and_then(|p| p.timeout)
        .unwrap_or(config.retrieval.generation_timeout_secs);

    let client = create_client(
        &config.provider,
        endpoint.as_deref(),
        Some(Duration::from_secs(timeout)),
    )?;
    let prompt = load_prompt_or_default(&config.workspace, ANSWER_PROMPT_ID)?;

    tracing::debug!(
        "Answer generator: provider={}, model={}, prompt={}",
        config.provider,
        config.model,
        prompt.id
    );

    Ok(LlmAnswerGenerator::new(
        client,
        config.model.clone(),
        prompt,
        config.retrieval.history_window,
    ))
}

/// Print a turn for a human reader.
pub fn print_outcome(session: &Session, outcome: &AskOutcome) {
    let turn = &outcome.turn;

    if turn.answer_text.is_empty() {
        println!("{}", ANSWER_PLACEHOLDER);
    } else {
        println!("{}", turn.answer_text);
    }
    println!();
    println!("Confidence: {}", turn.confidence.label());

    if turn.sources.is_empty() {
        println!("Sources: (no sources available)");
    } else {
        println!("Sources:");
        for source in &turn.sources {
            match session.store().get(&source.document_id) {
                Some(doc) => println!(
                    "- {} <{}> relevance {:.2}, updated {} days ago",
                    doc.title, doc.url, source.relevance_score, source.staleness_days
                ),
                None => println!(
                    "- {} relevance {:.2}",
                    source.document_id, source.relevance_score
                ),
            }
        }
    }

    if !turn.follow_ups.is_empty() {
        println!();
        println!("You might also ask:");
        for follow_up in &turn.follow_ups {
            println!("- {}", follow_up);
        }
    }

    print_notices(&outcome.notices);
}

pub fn print_refresh_report(report: &RefreshReport) {
    println!(
        "Checked {} documents: {} stale, {} refreshed",
        report.checked,
        report.stale.len(),
        report.refreshed.len()
    );
    for id in &report.refreshed {
        println!("  refreshed {}", id);
    }
    print_notices(&report.notices);
}

/// Notices go to stderr so answers and exports stay clean on stdout.
fn print_notices(notices: &[Notice]) {
    for notice in notices {
        // No grounding is already visible in the answer itself.
        if matches!(notice, Notice::NoGroundingAvailable) {
            continue;
        }
        eprintln!("note: {}", notice);
    }
}
