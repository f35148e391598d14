//! Answer generation seam.
//!
//! The engine never produces prose itself. It hands the ranked documents to a
//! [`GenerationService`]; the default one renders the answer prompt and calls
//! an LLM.

use async_trait::async_trait;
use handbook_core::{AppError, AppResult};
use handbook_llm::{LlmClient, LlmRequest};
use handbook_prompt::{build_prompt, PromptDefinition};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{Topic, Turn};

/// Characters of a previous answer kept in the conversation history block.
const HISTORY_ANSWER_CHARS: usize = 200;

/// A ranked document as seen by the generation service.
#[derive(Debug, Clone, Serialize)]
pub struct ContextDocument {
    pub document_id: String,
    pub title: String,
    pub topic: Topic,
    pub url: String,
    pub body_text: String,
    pub relevance_score: f32,
    pub staleness_days: u32,
}

/// Produces answer prose from a query and its grounding documents.
///
/// Failures must be reported as [`AppError::GenerationUnavailable`]; the
/// caller degrades to an empty answer.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate_answer(
        &self,
        query: &str,
        context: &[ContextDocument],
        history: &[Turn],
    ) -> AppResult<String>;
}

/// Generation backed by an [`LlmClient`] and the answer prompt.
pub struct LlmAnswerGenerator {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    history_window: usize,
}

impl LlmAnswerGenerator {
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompt: PromptDefinition,
        history_window: usize,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
            history_window,
        }
    }

    fn build_request(
        &self,
        query: &str,
        context: &[ContextDocument],
        history: &[Turn],
    ) -> AppResult<LlmRequest> {
        let mut variables = HashMap::new();
        variables.insert("prompt".to_string(), query.to_string());
        variables.insert("knowledgeContext".to_string(), format_context(context));
        variables.insert(
            "conversationHistory".to_string(),
            format_history(history, self.history_window),
        );

        let built = build_prompt(&self.prompt, variables)?;

        let behavior = &self.prompt.behavior;
        let mut request = LlmRequest::new(built.user, self.model.clone())
            .with_temperature(behavior.temperature)
            .with_max_tokens(behavior.max_tokens);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }
        Ok(request)
    }
}

#[async_trait]
impl GenerationService for LlmAnswerGenerator {
    async fn generate_answer(
        &self,
        query: &str,
        context: &[ContextDocument],
        history: &[Turn],
    ) -> AppResult<String> {
        let request = self
            .build_request(query, context, history)
            .map_err(|e| AppError::GenerationUnavailable(e.to_string()))?;

        tracing::debug!(
            provider = self.client.provider_name(),
            model = %self.model,
            documents = context.len(),
            "Requesting answer"
        );

        let response = self
            .client
            .complete(&request)
            .await
            .map_err(|e| AppError::GenerationUnavailable(e.to_string()))?;

        let answer = response.content.trim();
        if answer.is_empty() {
            return Err(AppError::GenerationUnavailable(
                "model returned an empty answer".to_string(),
            ));
        }

        Ok(answer.to_string())
    }
}

fn format_context(context: &[ContextDocument]) -> String {
    context
        .iter()
        .map(|doc| {
            format!(
                "Source: {} (Relevance: {:.2})\nTopic: {}\nTitle: {}\nContent: {}",
                doc.url, doc.relevance_score, doc.topic, doc.title, doc.body_text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

fn format_history(history: &[Turn], window: usize) -> String {
    let start = history.len().saturating_sub(window);
    history[start..]
        .iter()
        .map(|turn| {
            let answer: String = turn.answer_text.chars().take(HISTORY_ANSWER_CHARS).collect();
            format!("User: {}\nAssistant: {}", turn.query_text, answer)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConfidenceTier;
    use chrono::Utc;
    use handbook_llm::{LlmResponse, LlmUsage};
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    struct RecordingClient {
        reply: AppResult<String>,
        seen: Mutex<Option<LlmRequest>>,
    }

    impl RecordingClient {
        fn replying(reply: AppResult<String>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl LlmClient for RecordingClient {
        fn provider_name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            *self.seen.lock().unwrap() = Some(request.clone());
            match &self.reply {
                Ok(content) => Ok(LlmResponse {
                    content: content.clone(),
                    model: request.model.clone(),
                    usage: LlmUsage::default(),
                }),
                Err(e) => Err(AppError::Llm(e.to_string())),
            }
        }
    }

    fn context() -> Vec<ContextDocument> {
        vec![ContextDocument {
            document_id: "onboarding".to_string(),
            title: "Onboarding Guide".to_string(),
            topic: Topic::Onboarding,
            url: "https://handbook.example.com/onboarding/".to_string(),
            body_text: "New hires get an onboarding buddy.".to_string(),
            relevance_score: 0.87,
            staleness_days: 0,
        }]
    }

    fn turn(query: &str, answer: &str) -> Turn {
        Turn {
            turn_id: "t".to_string(),
            timestamp: Utc::now(),
            query_text: query.to_string(),
            answer_text: answer.to_string(),
            sources: Vec::new(),
            confidence: ConfidenceTier::Medium,
            follow_ups: Vec::new(),
            topics_touched: BTreeSet::new(),
        }
    }

    fn generator(client: Arc<RecordingClient>) -> LlmAnswerGenerator {
        let prompt = handbook_prompt::builtin_prompt(handbook_prompt::ANSWER_PROMPT_ID).unwrap();
        LlmAnswerGenerator::new(client, "llama3", prompt, 2)
    }

    #[tokio::test]
    async fn test_prompt_carries_context_and_history() {
        let client = RecordingClient::replying(Ok("  Meet your buddy.  ".to_string()));
        let generator = generator(client.clone());
        let history = vec![
            turn("oldest question", "dropped"),
            turn("what about culture", "Transparency."),
            turn("and remote work", "Fully remote."),
        ];

        let answer = generator
            .generate_answer("Who is my buddy?", &context(), &history)
            .await
            .unwrap();
        assert_eq!(answer, "Meet your buddy.");

        let request = client.seen.lock().unwrap().clone().unwrap();
        assert!(request.prompt.contains("Source: https://handbook.example.com/onboarding/ (Relevance: 0.87)"));
        assert!(request.prompt.contains("Topic: onboarding"));
        assert!(request.prompt.contains("Current question: Who is my buddy?"));
        assert!(request.prompt.contains("User: what about culture"));
        assert!(!request.prompt.contains("oldest question"));
        assert!(request.system.unwrap().contains("professional"));
        assert_eq!(request.model, "llama3");
    }

    #[tokio::test]
    async fn test_llm_failure_is_generation_unavailable() {
        let client = RecordingClient::replying(Err(AppError::Llm("connection refused".into())));
        let result = generator(client).generate_answer("q", &context(), &[]).await;

        assert!(matches!(result, Err(AppError::GenerationUnavailable(_))));
    }

    #[tokio::test]
    async fn test_empty_reply_is_generation_unavailable() {
        let client = RecordingClient::replying(Ok("   ".to_string()));
        let result = generator(client).generate_answer("q", &context(), &[]).await;

        assert!(matches!(result, Err(AppError::GenerationUnavailable(_))));
    }

    #[test]
    fn test_history_answers_are_truncated() {
        let long = "x".repeat(500);
        let formatted = format_history(&[turn("q", &long)], 5);
        assert_eq!(formatted.matches('x').count(), HISTORY_ANSWER_CHARS);
    }
}
