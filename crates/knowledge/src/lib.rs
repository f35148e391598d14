//! Handbook retrieval-and-trust engine.
//!
//! Selects handbook documents relevant to a question, rates how far the
//! answer can be trusted, tracks document freshness, suggests follow-up
//! questions and keeps per-session conversation analytics.
//!
//! Answer prose and page scraping are external collaborators reached through
//! [`rag::GenerationService`] and [`scrape::ScraperService`].

pub mod corpus;
pub mod engine;
pub mod freshness;
pub mod ledger;
pub mod rag;
pub mod scrape;
pub mod session;
pub mod store;
pub mod text;
pub mod types;

#[cfg(test)]
mod tests;

pub use engine::RetrievalEngine;
pub use freshness::{age_days, FreshnessMonitor};
pub use ledger::{AnalyticsSnapshot, ConversationExport, ConversationLedger, ExportFormat};
pub use rag::{AskOutcome, GenerationService, LlmAnswerGenerator};
pub use scrape::{FetchedPage, HttpScraper, ScraperService};
pub use session::{RefreshReport, Session};
pub use store::{DocumentStore, UpsertOutcome};
pub use types::{ConfidenceTier, Document, Notice, ScoredSource, SourceKind, Topic, Turn};
