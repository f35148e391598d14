//! Conversation ledger and analytics.
//!
//! The ledger is append-only for the lifetime of a session. Analytics are
//! recomputed from the turns on every call and never stored.
//!
//! Two export formats exist:
//! - `json`: every turn with all of its fields, plus the analytics snapshot.
//! - `text`: a transcript of query/answer pairs, each answer labelled with its
//!   confidence marker. Per-turn sources are left out and the analytics follow
//!   as a trailer.

use chrono::{DateTime, Utc};
use handbook_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

use crate::types::{ConfidenceTier, Topic, Turn};

/// Derived conversation statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub turn_count: usize,

    pub topic_distribution: BTreeMap<Topic, usize>,

    /// Always holds every tier, zero when unused
    pub confidence_distribution: BTreeMap<ConfidenceTier, usize>,

    /// Topics by descending count; ties in declaration order
    pub most_discussed_topics: Vec<Topic>,
}

/// Compute analytics over `turns` in a single pass.
pub fn snapshot_of(turns: &[Turn]) -> AnalyticsSnapshot {
    let mut topic_distribution: BTreeMap<Topic, usize> = BTreeMap::new();
    let mut confidence_distribution: BTreeMap<ConfidenceTier, usize> =
        ConfidenceTier::ALL.iter().map(|tier| (*tier, 0)).collect();

    for turn in turns {
        for topic in &turn.topics_touched {
            *topic_distribution.entry(*topic).or_insert(0) += 1;
        }
        *confidence_distribution.entry(turn.confidence).or_insert(0) += 1;
    }

    let mut most_discussed_topics: Vec<Topic> = topic_distribution.keys().copied().collect();
    most_discussed_topics.sort_by(|a, b| topic_distribution[b].cmp(&topic_distribution[a]).then(a.cmp(b)));

    AnalyticsSnapshot {
        turn_count: turns.len(),
        topic_distribution,
        confidence_distribution,
        most_discussed_topics,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Text,
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            other => Err(AppError::Other(format!(
                "Unknown export format '{}'. Use 'json' or 'text'.",
                other
            ))),
        }
    }
}

/// The JSON export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationExport {
    pub exported_at: DateTime<Utc>,
    pub turns: Vec<Turn>,
    pub analytics: AnalyticsSnapshot,
}

/// Append-only list of turns owned by one session.
#[derive(Debug, Default)]
pub struct ConversationLedger {
    turns: RwLock<Vec<Turn>>,
}

impl ConversationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, turn: Turn) {
        self.turns
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every turn, oldest first.
    pub fn turns(&self) -> Vec<Turn> {
        self.turns.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// The last `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> Vec<Turn> {
        let turns = self.turns.read().unwrap_or_else(PoisonError::into_inner);
        let start = turns.len().saturating_sub(n);
        turns[start..].to_vec()
    }

    pub fn snapshot(&self) -> AnalyticsSnapshot {
        let turns = self.turns.read().unwrap_or_else(PoisonError::into_inner);
        snapshot_of(&turns)
    }

    /// Drop every turn. Used when the user resets the session.
    pub fn reset(&self) {
        self.turns
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn export(&self, format: ExportFormat) -> AppResult<Vec<u8>> {
        self.export_at(format, Utc::now())
    }

    /// Serialize the conversation. An empty ledger still yields a
    /// well-formed document.
    pub fn export_at(&self, format: ExportFormat, now: DateTime<Utc>) -> AppResult<Vec<u8>> {
        let turns = self.turns();
        let analytics = snapshot_of(&turns);

        match format {
            ExportFormat::Json => {
                let export = ConversationExport {
                    exported_at: now,
                    turns,
                    analytics,
                };
                Ok(serde_json::to_vec_pretty(&export)?)
            }
            ExportFormat::Text => {
                let transcript = render_transcript(&turns, &analytics, now).map_err(|e| {
                    AppError::Knowledge(format!("Failed to render transcript: {}", e))
                })?;
                Ok(transcript.into_bytes())
            }
        }
    }
}

fn render_transcript(
    turns: &[Turn],
    analytics: &AnalyticsSnapshot,
    now: DateTime<Utc>,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "Handbook conversation")?;
    writeln!(out, "Exported: {}", now.to_rfc3339())?;
    writeln!(out)?;

    if turns.is_empty() {
        writeln!(out, "No turns recorded.")?;
    }

    for (i, turn) in turns.iter().enumerate() {
        let n = i + 1;
        writeln!(out, "[{}] You", n)?;
        writeln!(out, "{}", turn.query_text)?;
        writeln!(out)?;
        writeln!(out, "[{}] Assistant · {} confidence", n, turn.confidence.label())?;
        if turn.answer_text.is_empty() {
            writeln!(out, "(no answer available)")?;
        } else {
            writeln!(out, "{}", turn.answer_text)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "---")?;
    writeln!(out, "Turns: {}", analytics.turn_count)?;

    let confidence: Vec<String> = analytics
        .confidence_distribution
        .iter()
        .map(|(tier, count)| format!("{} {}", tier, count))
        .collect();
    writeln!(out, "Confidence: {}", confidence.join(", "))?;

    if !analytics.most_discussed_topics.is_empty() {
        let topics: Vec<String> = analytics
            .most_discussed_topics
            .iter()
            .map(|topic| {
                let count = analytics.topic_distribution.get(topic).copied().unwrap_or(0);
                format!("{} ({})", topic, count)
            })
            .collect();
        writeln!(out, "Topics: {}", topics.join(", "))?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScoredSource;
    use std::collections::BTreeSet;

    fn turn(query: &str, confidence: ConfidenceTier, topics: &[Topic]) -> Turn {
        Turn {
            turn_id: format!("turn-{}", query),
            timestamp: Utc::now(),
            query_text: query.to_string(),
            answer_text: format!("Answer to {}", query),
            sources: vec![ScoredSource {
                document_id: "culture".to_string(),
                relevance_score: 0.6,
                staleness_days: 2,
            }],
            confidence,
            follow_ups: vec!["What next?".to_string()],
            topics_touched: topics.iter().copied().collect::<BTreeSet<_>>(),
        }
    }

    fn three_turn_ledger() -> ConversationLedger {
        let ledger = ConversationLedger::new();
        ledger.append(turn("values", ConfidenceTier::High, &[Topic::Culture]));
        ledger.append(turn(
            "async work",
            ConfidenceTier::Medium,
            &[Topic::RemoteWork, Topic::Culture],
        ));
        ledger.append(turn("reviews", ConfidenceTier::Low, &[Topic::Performance]));
        ledger
    }

    #[test]
    fn test_snapshot_counts() {
        let snapshot = three_turn_ledger().snapshot();

        assert_eq!(snapshot.turn_count, 3);
        assert_eq!(snapshot.topic_distribution[&Topic::Culture], 2);
        assert_eq!(snapshot.topic_distribution[&Topic::RemoteWork], 1);
        assert_eq!(snapshot.confidence_distribution[&ConfidenceTier::High], 1);
        assert_eq!(snapshot.confidence_distribution[&ConfidenceTier::Low], 1);
        assert_eq!(
            snapshot.most_discussed_topics,
            vec![Topic::Culture, Topic::RemoteWork, Topic::Performance]
        );
    }

    #[test]
    fn test_empty_snapshot_has_every_tier() {
        let snapshot = ConversationLedger::new().snapshot();
        assert_eq!(snapshot.turn_count, 0);
        assert_eq!(snapshot.confidence_distribution.len(), 3);
        assert!(snapshot.confidence_distribution.values().all(|c| *c == 0));
        assert!(snapshot.most_discussed_topics.is_empty());
    }

    #[test]
    fn test_recent_and_reset() {
        let ledger = three_turn_ledger();
        let recent = ledger.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[1].query_text, "reviews");
        assert_eq!(ledger.recent(10).len(), 3);

        ledger.reset();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_json_export_round_trip() {
        let ledger = three_turn_ledger();
        let bytes = ledger.export(ExportFormat::Json).unwrap();

        let parsed: ConversationExport = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.analytics.turn_count, 3);
        assert_eq!(parsed.turns.len(), 3);
        assert_eq!(
            parsed.analytics.topic_distribution,
            ledger.snapshot().topic_distribution
        );
        assert_eq!(parsed.turns, ledger.turns());
    }

    #[test]
    fn test_empty_exports_are_well_formed() {
        let ledger = ConversationLedger::new();

        let json = ledger.export(ExportFormat::Json).unwrap();
        let parsed: ConversationExport = serde_json::from_slice(&json).unwrap();
        assert!(parsed.turns.is_empty());

        let text = String::from_utf8(ledger.export(ExportFormat::Text).unwrap()).unwrap();
        assert!(text.contains("No turns recorded."));
        assert!(text.contains("Turns: 0"));
    }

    #[test]
    fn test_text_export_transcript() {
        let text = String::from_utf8(three_turn_ledger().export(ExportFormat::Text).unwrap())
            .unwrap();

        assert!(text.contains("[1] You\nvalues"));
        assert!(text.contains("[1] Assistant · 🎯 High confidence\nAnswer to values"));
        assert!(text.contains("[3] Assistant · ⚠️ Low confidence"));
        assert!(text.contains("Topics: culture (2)"));
    }

    #[test]
    fn test_render_transcript_marks_missing_answers() {
        let mut unanswered = turn("parental leave", ConfidenceTier::Low, &[]);
        unanswered.answer_text.clear();
        let turns = vec![unanswered];
        let now = Utc::now();

        let text = render_transcript(&turns, &snapshot_of(&turns), now).unwrap();

        assert!(text.starts_with(&format!(
            "Handbook conversation\nExported: {}\n",
            now.to_rfc3339()
        )));
        assert!(text.contains("[1] Assistant · ⚠️ Low confidence\n(no answer available)"));
        assert!(!text.contains("Topics:"));
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }
}
