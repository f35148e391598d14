//! Retrieval-augmented answering: scoring, confidence, follow-ups and the
//! generation seam, tied together by [`ask::ask`].

pub mod ask;
pub mod confidence;
pub mod followup;
pub mod generation;
pub mod score;
pub mod types;

pub use confidence::ConfidenceClassifier;
pub use followup::{FollowUpGenerator, TurnContext};
pub use generation::{ContextDocument, GenerationService, LlmAnswerGenerator};
pub use score::RelevanceScorer;
pub use types::AskOutcome;
