//! Ask command handler.
//!
//! Answers one question against the handbook and exits.

use clap::Args;
use handbook_core::{config::AppConfig, AppError, AppResult};

use super::session::{answer_generator, open_session, print_outcome};

/// Ask a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,

    /// Output the turn and notices as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let question = self.question.join(" ");
        if question.trim().is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        tracing::info!("Executing ask command");
        tracing::debug!("Question: {}", question);

        let session = open_session(config)?;
        let generator = answer_generator(config)?;

        let outcome = session.ask(&generator, &question).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        } else {
            print_outcome(&session, &outcome);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        ask: AskCommand,
    }

    #[test]
    fn test_question_words_are_joined() {
        let harness = Harness::parse_from(["handbook", "how", "do", "I", "onboard?", "--json"]);
        assert_eq!(harness.ask.question.join(" "), "how do I onboard?");
        assert!(harness.ask.json);
    }

    #[test]
    fn test_question_is_required() {
        assert!(Harness::try_parse_from(["handbook"]).is_err());
    }
}
