//! Knowledge command handler.
//!
//! Inspects and refreshes the workspace document store.

use chrono::Utc;
use clap::{Args, Subcommand};
use handbook_core::{config::AppConfig, AppError, AppResult};
use handbook_knowledge::{age_days, HttpScraper, SourceKind, Topic};
use std::time::Duration;

use super::session::{open_session, print_refresh_report, save_store};

/// Handbook document store management
#[derive(Args, Debug)]
pub struct KnowledgeCommand {
    #[command(subcommand)]
    pub action: KnowledgeAction,
}

#[derive(Subcommand, Debug)]
pub enum KnowledgeAction {
    /// List stored documents
    List(KnowledgeListCommand),
    /// Show documents due for a refresh
    Stale(KnowledgeStaleCommand),
    /// Re-fetch stale documents from their source pages
    Refresh(KnowledgeRefreshCommand),
}

/// List stored documents
#[derive(Args, Debug)]
pub struct KnowledgeListCommand {
    /// Only show documents in this topic
    #[arg(long)]
    pub topic: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl KnowledgeListCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing knowledge list command");

        let session = open_session(config)?;
        let now = Utc::now();

        let documents = match &self.topic {
            Some(name) => {
                let topic: Topic = name.parse().map_err(AppError::Config)?;
                session.store().get_by_topic(topic)
            }
            None => session.store().get_all(),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&documents)?);
            return Ok(());
        }

        if documents.is_empty() {
            println!("No documents stored.");
            return Ok(());
        }

        let freshness = session.engine().freshness();
        for doc in &documents {
            let age = age_days(doc.last_updated, now);
            let kind = match doc.source_kind {
                SourceKind::Curated => "curated",
                SourceKind::Scraped => "scraped",
            };
            let marker = if freshness.is_stale_age(age) { " (stale)" } else { "" };
            println!(
                "{:<18} {:<17} {} [{}, {} days]{}",
                doc.id, doc.topic, doc.title, kind, age, marker
            );
        }

        Ok(())
    }
}

/// Show stale documents
#[derive(Args, Debug)]
pub struct KnowledgeStaleCommand {}

impl KnowledgeStaleCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing knowledge stale command");

        let session = open_session(config)?;
        let stale = session.stale_documents(Utc::now());

        if stale.is_empty() {
            println!(
                "All documents were updated within the last {} days.",
                session.engine().freshness().update_interval_days()
            );
        } else {
            println!("{} stale documents:", stale.len());
            for id in &stale {
                println!("- {}", id);
            }
        }

        Ok(())
    }
}

/// Refresh stale documents
#[derive(Args, Debug)]
pub struct KnowledgeRefreshCommand {}

impl KnowledgeRefreshCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing knowledge refresh command");

        let session = open_session(config)?;
        let scraper = HttpScraper::new(Duration::from_secs(config.retrieval.fetch_timeout_secs))?;

        let report = session.refresh_stale(&scraper, Utc::now()).await;
        print_refresh_report(&report);

        if !report.refreshed.is_empty() {
            save_store(config, &session)?;
            tracing::debug!("Saved store to {:?}", config.documents_path());
        }

        Ok(())
    }
}

impl KnowledgeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.action {
            KnowledgeAction::List(cmd) => cmd.execute(config).await,
            KnowledgeAction::Stale(cmd) => cmd.execute(config).await,
            KnowledgeAction::Refresh(cmd) => cmd.execute(config).await,
        }
    }
}
