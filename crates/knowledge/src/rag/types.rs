//! Ask pipeline result types.

use serde::Serialize;

use crate::types::{Notice, Turn};

/// Result of one ask: the turn as recorded in the ledger plus any notices.
#[derive(Debug, Clone, Serialize)]
pub struct AskOutcome {
    pub turn: Turn,
    pub notices: Vec<Notice>,
}

impl AskOutcome {
    /// Whether answer generation failed for this turn.
    pub fn is_degraded(&self) -> bool {
        self.notices
            .iter()
            .any(|n| matches!(n, Notice::GenerationUnavailable { .. }))
    }
}

/// Answer recorded when no document cleared the relevance floor.
pub fn no_grounding_answer(query: &str) -> String {
    format!(
        "I could not find information about \"{}\" in the handbook documents.",
        query.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_grounding_answer_quotes_query() {
        let answer = no_grounding_answer("  parking policy ");
        assert!(answer.contains("\"parking policy\""));
        assert!(answer.contains("could not find"));
    }
}
