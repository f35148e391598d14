//! Prompt system for the Handbook Assistant.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions, overridable per workspace
//! - Handlebars template rendering, shared with the follow-up generator

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{build_prompt, render_template};
pub use loader::{builtin_prompt, load_prompt, load_prompt_or_default, ANSWER_PROMPT_ID};
pub use types::{BuiltPrompt, PromptBehavior, PromptDefinition};
