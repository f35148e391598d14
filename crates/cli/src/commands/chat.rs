//! Interactive chat command.
//!
//! Reads questions from stdin, one per line, and keeps the conversation for
//! the lifetime of the process. Lines starting with `/` are session commands.

use chrono::Utc;
use clap::Args;
use handbook_core::{config::AppConfig, AppError, AppResult};
use handbook_knowledge::{ExportFormat, HttpScraper, ScraperService, Session};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::session::{
    answer_generator, open_session, print_outcome, print_refresh_report, save_store,
};

const HELP: &str = "\
Commands:
  /stats                      conversation analytics
  /export <json|text> <path>  write the conversation to a file
  /reset                      start a new conversation
  /refresh                    re-fetch stale handbook documents
  /help                       show this help
  /quit                       leave the chat";

/// Start an interactive conversation
#[derive(Args, Debug)]
pub struct ChatCommand {}

/// One line of user input.
#[derive(Debug, PartialEq)]
enum ChatInput {
    Question(String),
    Stats,
    Export { format: ExportFormat, path: PathBuf },
    Reset,
    Refresh,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

impl ChatInput {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ChatInput::Empty;
        }
        if !line.starts_with('/') {
            return ChatInput::Question(line.to_string());
        }

        let mut parts = line.split_whitespace();
        match parts.next().unwrap_or_default() {
            "/stats" => ChatInput::Stats,
            "/reset" => ChatInput::Reset,
            "/refresh" => ChatInput::Refresh,
            "/help" => ChatInput::Help,
            "/quit" | "/exit" => ChatInput::Quit,
            "/export" => match (parts.next(), parts.next()) {
                (Some(format), Some(path)) => match format.parse::<ExportFormat>() {
                    Ok(format) => ChatInput::Export {
                        format,
                        path: PathBuf::from(path),
                    },
                    Err(e) => ChatInput::Invalid(e.to_string()),
                },
                _ => ChatInput::Invalid("Usage: /export <json|text> <path>".to_string()),
            },
            other => ChatInput::Invalid(format!("Unknown command {}. Type /help.", other)),
        }
    }
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting chat session");

        let session = open_session(config)?;
        let generator = answer_generator(config)?;

        println!("Handbook assistant. Ask a question, or /help for commands.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match ChatInput::parse(&line) {
                ChatInput::Empty => {}
                ChatInput::Question(question) => {
                    let outcome = session.ask(&generator, &question).await;
                    println!();
                    print_outcome(&session, &outcome);
                    println!();
                }
                ChatInput::Stats => print_stats(&session)?,
                ChatInput::Export { format, path } => {
                    if let Err(e) = export(&session, format, &path) {
                        eprintln!("Export failed: {}", e);
                    }
                }
                ChatInput::Reset => {
                    session.reset().await;
                    println!("Conversation cleared.");
                }
                ChatInput::Refresh => {
                    if let Err(e) = refresh_over_http(config, &session).await {
                        eprintln!("Refresh failed: {}", e);
                    }
                }
                ChatInput::Help => println!("{}", HELP),
                ChatInput::Quit => break,
                ChatInput::Invalid(message) => eprintln!("{}", message),
            }
        }

        tracing::info!("Chat session ended after {} turns", session.analytics().turn_count);
        Ok(())
    }
}

fn print_stats(session: &Session) -> AppResult<()> {
    let snapshot = session.analytics();

    println!("Turns: {}", snapshot.turn_count);
    println!("Confidence:");
    for (tier, count) in &snapshot.confidence_distribution {
        println!("  {}: {}", tier.label(), count);
    }

    if snapshot.most_discussed_topics.is_empty() {
        println!("Topics: none yet");
    } else {
        println!("Most discussed topics:");
        for topic in &snapshot.most_discussed_topics {
            let count = snapshot.topic_distribution.get(topic).copied().unwrap_or(0);
            println!("  {}: {}", topic, count);
        }
    }

    Ok(())
}

async fn refresh_over_http(config: &AppConfig, session: &Session) -> AppResult<()> {
    let scraper = HttpScraper::new(Duration::from_secs(config.retrieval.fetch_timeout_secs))?;
    refresh(config, session, &scraper).await
}

/// Refresh stale documents and persist the store if anything changed.
async fn refresh(
    config: &AppConfig,
    session: &Session,
    scraper: &dyn ScraperService,
) -> AppResult<()> {
    let report = session.refresh_stale(scraper, Utc::now()).await;
    print_refresh_report(&report);
    if !report.refreshed.is_empty() {
        save_store(config, session)?;
    }
    Ok(())
}

fn export(session: &Session, format: ExportFormat, path: &std::path::Path) -> AppResult<()> {
    let bytes = session.export(format)?;
    std::fs::write(path, bytes).map_err(|e| {
        AppError::Other(format!("Failed to write {}: {}", path.display(), e))
    })?;
    println!("Conversation exported to {}", path.display());
    Ok(())
}
