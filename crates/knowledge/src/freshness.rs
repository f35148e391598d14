//! Staleness detection.
//!
//! The monitor only decides which documents are stale. Refreshing them is the
//! caller's job (see [`crate::session::Session::refresh_stale`]).

use chrono::{DateTime, Utc};
use handbook_core::RetrievalConfig;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::store::DocumentStore;
use crate::types::Document;

/// Whole days between `last_updated` and `now`.
///
/// This is the single age function used by both the scorer and the monitor.
/// Timestamps in the future count as age zero.
pub fn age_days(last_updated: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let days = (now - last_updated).num_days().max(0);
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// Flags documents whose age has reached the update interval.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessMonitor {
    update_interval_days: u32,
}

impl FreshnessMonitor {
    pub fn new(config: &RetrievalConfig) -> Self {
        Self {
            update_interval_days: config.update_interval_days,
        }
    }

    pub fn update_interval_days(&self) -> u32 {
        self.update_interval_days
    }

    /// Whether a given age counts as stale. The interval itself is stale.
    pub fn is_stale_age(&self, staleness_days: u32) -> bool {
        staleness_days >= self.update_interval_days
    }

    pub fn is_stale(&self, document: &Document, now: DateTime<Utc>) -> bool {
        self.is_stale_age(age_days(document.last_updated, now))
    }

    /// Ids of every stale document.
    pub fn check_staleness(&self, documents: &[Document], now: DateTime<Utc>) -> BTreeSet<String> {
        let stale: BTreeSet<String> = documents
            .iter()
            .filter(|doc| self.is_stale(doc, now))
            .map(|doc| doc.id.clone())
            .collect();

        tracing::debug!(
            checked = documents.len(),
            stale = stale.len(),
            interval_days = self.update_interval_days,
            "Staleness scan complete"
        );

        stale
    }

    /// Scan the store every `period` and send non-empty stale sets to `tx`.
    ///
    /// The task reads snapshots only and stops once the receiver is dropped.
    pub fn watch(
        self,
        store: Arc<DocumentStore>,
        period: Duration,
        tx: mpsc::Sender<BTreeSet<String>>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let stale = self.check_staleness(&store.snapshot(), Utc::now());
                if stale.is_empty() {
                    continue;
                }
                if tx.send(stale).await.is_err() {
                    tracing::debug!("Freshness watch receiver dropped, stopping");
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SourceKind, Topic};
    use chrono::Duration as ChronoDuration;

    fn doc_aged(id: &str, now: DateTime<Utc>, days: i64) -> Document {
        Document::new(
            id,
            Topic::Culture,
            "Values",
            "Transparency and collaboration.",
            format!("https://handbook.example.com/{}", id),
            SourceKind::Curated,
            now - ChronoDuration::days(days),
            &[],
        )
    }

    fn monitor() -> FreshnessMonitor {
        FreshnessMonitor::new(&RetrievalConfig::default())
    }

    #[test]
    fn test_age_days_floors_and_clamps() {
        let now = Utc::now();
        assert_eq!(age_days(now, now), 0);
        assert_eq!(age_days(now - ChronoDuration::hours(47), now), 1);
        assert_eq!(age_days(now + ChronoDuration::days(3), now), 0);
    }

    #[test]
    fn test_staleness_boundary() {
        let now = Utc::now();
        let interval = monitor().update_interval_days() as i64;
        let docs = vec![
            doc_aged("exactly", now, interval),
            doc_aged("younger", now, interval - 1),
            doc_aged("older", now, interval + 30),
        ];

        let stale = monitor().check_staleness(&docs, now);
        assert!(stale.contains("exactly"));
        assert!(!stale.contains("younger"));
        assert!(stale.contains("older"));
        assert_eq!(stale.len(), 2);
    }

    #[test]
    fn test_empty_store_has_nothing_stale() {
        assert!(monitor().check_staleness(&[], Utc::now()).is_empty());
    }

    #[tokio::test]
    async fn test_watch_reports_stale_documents() {
        let now = Utc::now();
        let store = Arc::new(
            DocumentStore::with_documents(vec![
                doc_aged("old", now, 60),
                doc_aged("new", now, 0),
            ])
            .unwrap(),
        );

        let (tx, mut rx) = mpsc::channel(1);
        let handle = monitor().watch(store, Duration::from_millis(10), tx);

        let stale = rx.recv().await.unwrap();
        assert_eq!(stale.into_iter().collect::<Vec<_>>(), vec!["old"]);

        drop(rx);
        handle.await.unwrap();
    }
}
