//! One user session: the engine, a shared document store and the session's
//! own conversation ledger.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::engine::RetrievalEngine;
use crate::ledger::{AnalyticsSnapshot, ConversationLedger, ExportFormat};
use crate::rag::ask;
use crate::rag::generation::GenerationService;
use crate::rag::types::AskOutcome;
use crate::scrape::ScraperService;
use crate::store::DocumentStore;
use crate::types::{Notice, Turn};
use handbook_core::{AppError, AppResult};

/// Result of one refresh pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshReport {
    /// Documents examined
    pub checked: usize,

    /// Ids found stale
    pub stale: BTreeSet<String>,

    /// Ids successfully refreshed
    pub refreshed: Vec<String>,

    pub notices: Vec<Notice>,
}

pub struct Session {
    engine: RetrievalEngine,
    store: Arc<DocumentStore>,
    ledger: ConversationLedger,
    // Held for the whole of a turn so turns never overlap.
    turn_gate: Mutex<()>,
}

impl Session {
    pub fn new(engine: RetrievalEngine, store: Arc<DocumentStore>) -> Self {
        Self {
            engine,
            store,
            ledger: ConversationLedger::new(),
            turn_gate: Mutex::new(()),
        }
    }

    pub fn engine(&self) -> &RetrievalEngine {
        &self.engine
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    pub fn turns(&self) -> Vec<Turn> {
        self.ledger.turns()
    }

    pub async fn ask(&self, generator: &dyn GenerationService, query: &str) -> AskOutcome {
        self.ask_at(generator, query, Utc::now()).await
    }

    /// Run one turn as of `now`. Concurrent calls queue behind each other.
    pub async fn ask_at(
        &self,
        generator: &dyn GenerationService,
        query: &str,
        now: DateTime<Utc>,
    ) -> AskOutcome {
        let _turn = self.turn_gate.lock().await;
        ask::ask(&self.engine, &self.store, &self.ledger, generator, query, now).await
    }

    pub fn analytics(&self) -> AnalyticsSnapshot {
        self.ledger.snapshot()
    }

    pub fn export(&self, format: ExportFormat) -> AppResult<Vec<u8>> {
        self.ledger.export(format)
    }

    /// Forget the conversation. The document store is untouched.
    pub async fn reset(&self) {
        let _turn = self.turn_gate.lock().await;
        self.ledger.reset();
        tracing::info!("Conversation reset");
    }

    pub fn stale_documents(&self, now: DateTime<Utc>) -> BTreeSet<String> {
        self.engine
            .freshness()
            .check_staleness(&self.store.snapshot(), now)
    }

    /// Re-fetch every stale document through `scraper`.
    ///
    /// Successful fetches replace the document with a scraped copy stamped at
    /// its fetch time. Failed or timed-out fetches leave the document as it was
    /// and add a `FetchFailed` notice.
    pub async fn refresh_stale(
        &self,
        scraper: &dyn ScraperService,
        now: DateTime<Utc>,
    ) -> RefreshReport {
        let snapshot = self.store.snapshot();
        let stale = self.engine.freshness().check_staleness(&snapshot, now);
        let timeout = Duration::from_secs(self.engine.config().fetch_timeout_secs);

        let mut report = RefreshReport {
            checked: snapshot.len(),
            stale: stale.clone(),
            ..RefreshReport::default()
        };

        for doc in snapshot.iter().filter(|doc| stale.contains(&doc.id)) {
            let fetched = match tokio::time::timeout(timeout, scraper.fetch(&doc.url)).await {
                Ok(result) => result,
                Err(_) => Err(AppError::fetch_failed(
                    &doc.url,
                    format!("timed out after {}s", timeout.as_secs()),
                )),
            };

            match fetched {
                Ok(page) => {
                    self.store
                        .upsert_at(doc.refreshed(page.body_text, page.fetched_at), page.fetched_at);
                    report.refreshed.push(doc.id.clone());
                }
                Err(e) => {
                    let reason = match e {
                        AppError::FetchFailed { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    tracing::warn!("Could not refresh {} from {}: {}", doc.id, doc.url, reason);
                    report.notices.push(Notice::FetchFailed {
                        document_id: doc.id.clone(),
                        url: doc.url.clone(),
                        reason,
                    });
                }
            }
        }

        tracing::info!(
            checked = report.checked,
            stale = report.stale.len(),
            refreshed = report.refreshed.len(),
            failed = report.notices.len(),
            "Refresh complete"
        );

        report
    }
}
