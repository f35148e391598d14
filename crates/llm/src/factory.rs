//! LLM provider factory.
//!
//! Creates LLM clients from the resolved provider name and endpoint.

use crate::client::LlmClient;
use crate::providers::OllamaClient;
use handbook_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier, case-insensitive. Only "ollama" is accepted.
/// * `endpoint` - Optional custom endpoint URL
/// * `timeout` - Optional per-request timeout
///
/// # Errors
/// Returns `AppError::Config` if the provider is not Ollama.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    timeout: Option<Duration>,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "ollama" => {
            let base_url = endpoint.unwrap_or(DEFAULT_OLLAMA_URL);
            let client = OllamaClient::with_base_url(base_url, timeout)?;
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!(
            "Unknown provider: {}. Supported: ollama",
            provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_provider_name_is_case_insensitive() {
        assert!(create_client("Ollama", None, None).is_ok());
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client(
            "ollama",
            Some("http://localhost:8080"),
            Some(Duration::from_secs(5)),
        );
        assert!(client.is_ok());
    }

    #[test]
    fn test_hosted_providers_are_rejected() {
        for provider in ["openai", "claude"] {
            match create_client(provider, None, None) {
                Err(err) => assert!(err.to_string().contains("Supported: ollama")),
                Ok(_) => panic!("Expected error for provider {}", provider),
            }
        }
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
