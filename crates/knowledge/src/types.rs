//! Knowledge system type definitions.
//!
//! These are the records exchanged between the store, the scorer, the
//! classifier and the conversation ledger. Field names are part of the
//! persisted JSON format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::text;

/// Handbook area a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Topic {
    Onboarding,
    Culture,
    RemoteWork,
    Performance,
    ProductStrategy,
    Other,
}

impl Topic {
    /// Every topic, in declaration order.
    pub const ALL: [Topic; 6] = [
        Topic::Onboarding,
        Topic::Culture,
        Topic::RemoteWork,
        Topic::Performance,
        Topic::ProductStrategy,
        Topic::Other,
    ];

    /// Human-readable label used in prompts and follow-up questions.
    pub fn label(&self) -> &'static str {
        match self {
            Topic::Onboarding => "onboarding",
            Topic::Culture => "culture",
            Topic::RemoteWork => "remote work",
            Topic::Performance => "performance",
            Topic::ProductStrategy => "product strategy",
            Topic::Other => "general",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Topic {
    type Err = String;

    /// Accepts labels, snake_case, kebab-case and variant names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match key.as_str() {
            "onboarding" => Ok(Topic::Onboarding),
            "culture" | "values" => Ok(Topic::Culture),
            "remotework" | "remote" => Ok(Topic::RemoteWork),
            "performance" => Ok(Topic::Performance),
            "productstrategy" | "product" | "direction" => Ok(Topic::ProductStrategy),
            "other" | "general" => Ok(Topic::Other),
            _ => Err(format!("Unknown topic: {}", s)),
        }
    }
}

/// Where a document's current body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Curated,
    Scraped,
}

/// A handbook document held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier within the store
    pub id: String,

    pub topic: Topic,

    pub title: String,

    pub body_text: String,

    /// Canonical location, used for attribution and refresh
    pub url: String,

    /// When the body was last written
    pub last_updated: DateTime<Utc>,

    pub source_kind: SourceKind,

    /// Normalized terms the scorer matches query terms against
    pub keyword_index: BTreeSet<String>,
}

impl Document {
    /// Create a document, building its keyword index from the title, body,
    /// topic label and any extra keywords.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        topic: Topic,
        title: impl Into<String>,
        body_text: impl Into<String>,
        url: impl Into<String>,
        source_kind: SourceKind,
        last_updated: DateTime<Utc>,
        keywords: &[&str],
    ) -> Self {
        let title = title.into();
        let body_text = body_text.into();
        let keyword_index = build_keyword_index(topic, &title, &body_text, keywords);

        Self {
            id: id.into(),
            topic,
            title,
            body_text,
            url: url.into(),
            last_updated,
            source_kind,
            keyword_index,
        }
    }

    /// Copy of this document carrying freshly scraped content.
    ///
    /// The keyword index is rebuilt from the title, topic and new body.
    pub fn refreshed(&self, body_text: impl Into<String>, fetched_at: DateTime<Utc>) -> Self {
        let body_text = body_text.into();
        Self {
            keyword_index: build_keyword_index(self.topic, &self.title, &body_text, &[]),
            body_text,
            last_updated: fetched_at,
            source_kind: SourceKind::Scraped,
            ..self.clone()
        }
    }
}

fn build_keyword_index(
    topic: Topic,
    title: &str,
    body_text: &str,
    keywords: &[&str],
) -> BTreeSet<String> {
    let mut index = text::normalize_terms(title);
    index.extend(text::normalize_terms(body_text));
    index.extend(text::normalize_terms(topic.label()));
    for keyword in keywords {
        index.extend(text::normalize_terms(keyword));
    }
    index
}

/// A document ranked against one query. Lives only as long as its turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSource {
    pub document_id: String,

    /// Final score in [0, 1]
    pub relevance_score: f32,

    /// Whole days since the document was last updated
    pub staleness_days: u32,
}

/// Trust tier attached to an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// Every tier, strongest first.
    pub const ALL: [ConfidenceTier; 3] =
        [ConfidenceTier::High, ConfidenceTier::Medium, ConfidenceTier::Low];

    /// Ordinal strength: Low < Medium < High.
    pub fn rank(&self) -> u8 {
        match self {
            ConfidenceTier::High => 2,
            ConfidenceTier::Medium => 1,
            ConfidenceTier::Low => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "High",
            ConfidenceTier::Medium => "Medium",
            ConfidenceTier::Low => "Low",
        }
    }

    /// Emoji marker shown next to the tier in transcripts.
    pub fn marker(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "🎯",
            ConfidenceTier::Medium => "⚖️",
            ConfidenceTier::Low => "⚠️",
        }
    }

    /// Marker plus tier name, e.g. "🎯 High".
    pub fn label(&self) -> String {
        format!("{} {}", self.marker(), self.as_str())
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One query/answer exchange. Immutable once appended to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub turn_id: String,

    pub timestamp: DateTime<Utc>,

    pub query_text: String,

    /// Empty when the generation service was unavailable
    pub answer_text: String,

    /// Sorted by descending relevance
    pub sources: Vec<ScoredSource>,

    pub confidence: ConfidenceTier,

    pub follow_ups: Vec<String>,

    pub topics_touched: BTreeSet<Topic>,
}

/// Condition surfaced to the caller alongside a turn or refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// No document cleared the relevance floor
    NoGroundingAvailable,

    /// The answer could not be generated; the turn carries an empty answer
    GenerationUnavailable { reason: String },

    /// Some cited sources are older than the update interval
    StaleSources { document_ids: Vec<String> },

    /// A stale document could not be refreshed and was left unchanged
    FetchFailed {
        document_id: String,
        url: String,
        reason: String,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoGroundingAvailable => {
                f.write_str("No handbook documents matched this question")
            }
            Notice::GenerationUnavailable { reason } => {
                write!(f, "Answer generation unavailable: {}", reason)
            }
            Notice::StaleSources { document_ids } => write!(
                f,
                "Some sources may be out of date: {}",
                document_ids.join(", ")
            ),
            Notice::FetchFailed {
                document_id,
                url,
                reason,
            } => write!(f, "Could not refresh {} from {}: {}", document_id, url, reason),
        }
    }
}
