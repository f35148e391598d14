//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use handbook_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde::Serialize;
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Renders the user template and the optional system template with the same
/// variables. `tone` and `style` from the definition's behavior block are
/// injected unless the caller already supplied them.
///
/// # Example
/// ```no_run
/// use handbook_prompt::{build_prompt, PromptDefinition};
/// use std::collections::HashMap;
///
/// # fn example(def: PromptDefinition) -> Result<(), Box<dyn std::error::Error>> {
/// let mut vars = HashMap::new();
/// vars.insert("prompt".to_string(), "How does onboarding work?".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    mut variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    variables
        .entry("tone".to_string())
        .or_insert_with(|| definition.behavior.tone.clone());
    variables
        .entry("style".to_string())
        .or_insert_with(|| definition.behavior.style.clone());

    let user = render_template(&definition.template, &variables)?;
    let system = definition
        .system
        .as_deref()
        .map(|template| render_template(template, &variables))
        .transpose()?;

    Ok(BuiltPrompt {
        prompt_id: definition.id.clone(),
        system,
        user,
    })
}

/// Render a Handlebars template with any serializable data.
///
/// HTML escaping is disabled since every consumer is plain text. Missing
/// variables render as empty strings.
pub fn render_template<T: Serialize>(template: &str, data: &T) -> AppResult<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", data)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
