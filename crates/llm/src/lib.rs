//! LLM integration crate for the Handbook Assistant.
//!
//! This crate provides the `LlmClient` abstraction used to talk to a local
//! Large Language Model (LLM) runtime. The knowledge crate wraps it into the answer
//! generation service; nothing in the retrieval engine depends on it directly.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime, the only supported provider
//!
//! # Example
//! ```no_run
//! use handbook_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new()?;
//! let request = LlmRequest::new("Hello, world!", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::OllamaClient;
