//! Prompt loader for YAML prompt definitions.
//!
//! Workspace files under `.handbook/prompts/<id>.yml` take precedence over the
//! definitions compiled into the binary.

use crate::types::PromptDefinition;
use handbook_core::{AppError, AppResult};
use std::path::Path;

/// Identifier of the built-in answer prompt.
pub const ANSWER_PROMPT_ID: &str = "handbook.answer.default";

const ANSWER_PROMPT_YAML: &str = r#"
id: handbook.answer.default
title: Grounded handbook answer
apiVersion: "1.0"
behavior:
  tone: professional
  style: detailed
  temperature: 0.3
  maxTokens: 1000
system: >-
  You are a helpful assistant for an organization's handbook. Answer only from
  the supplied handbook context and keep a {{tone}}, {{style}} voice.
template: |
  Answer the user's question using the provided context.

  Context from handbook documents (with relevance scores):
  {{knowledgeContext}}
  {{#if conversationHistory}}
  Recent conversation:
  {{conversationHistory}}
  {{/if}}
  Current question: {{prompt}}

  Guidelines:
  1. Provide specific answers based on the handbook context
  2. Reference the conversation history if this is a follow-up question
  3. If the context has low relevance scores, acknowledge uncertainty
  4. Organize your response clearly with proper formatting

  Answer:
"#;

/// Load a prompt definition by ID from the workspace.
///
/// This function searches for a prompt file named `<id>.yml` in the
/// `.handbook/prompts/` directory.
///
/// # Example
/// ```no_run
/// use handbook_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "handbook.answer.default")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = workspace_path
        .join(".handbook/prompts")
        .join(format!("{}.yml", prompt_id));

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition = parse_prompt(&contents)
        .map_err(|e| AppError::Prompt(format!("{:?}: {}", prompt_file, e)))?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Load a workspace override if present, otherwise the built-in definition.
pub fn load_prompt_or_default(
    workspace_path: &Path,
    prompt_id: &str,
) -> AppResult<PromptDefinition> {
    let override_file = workspace_path
        .join(".handbook/prompts")
        .join(format!("{}.yml", prompt_id));

    if override_file.exists() {
        return load_prompt(workspace_path, prompt_id);
    }

    builtin_prompt(prompt_id)
}

/// Look up a prompt compiled into the binary.
pub fn builtin_prompt(prompt_id: &str) -> AppResult<PromptDefinition> {
    match prompt_id {
        ANSWER_PROMPT_ID => parse_prompt(ANSWER_PROMPT_YAML),
        other => Err(AppError::Prompt(format!("No built-in prompt named {}", other))),
    }
}

fn parse_prompt(contents: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents)
        .map_err(|e| AppError::Prompt(format!("Failed to parse prompt YAML: {}", e)))?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}
