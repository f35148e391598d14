//! Prompt definitions and rendered prompts.

use serde::{Deserialize, Serialize};

/// An answer prompt as written in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    pub id: String,

    pub title: String,

    /// Schema version, `major.minor`
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    #[serde(default)]
    pub behavior: PromptBehavior,

    /// System message template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// User message template (Handlebars)
    pub template: String,
}

/// Voice and sampling settings for a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PromptBehavior {
    /// e.g. "professional", "friendly"
    pub tone: String,

    /// e.g. "concise", "detailed"
    pub style: String,

    /// Sampling temperature. Kept low so answers stay close to the context.
    pub temperature: f32,

    pub max_tokens: u32,
}

impl Default for PromptBehavior {
    fn default() -> Self {
        Self {
            tone: "professional".to_string(),
            style: "detailed".to_string(),
            temperature: 0.3,
            max_tokens: 1000,
        }
    }
}

/// A prompt rendered for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltPrompt {
    pub prompt_id: String,
    pub system: Option<String>,
    pub user: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_behavior_defaults_fill_missing_fields() {
        let yaml = r#"
id: handbook.answer.short
title: Short answers
apiVersion: "1.1"
behavior:
  style: concise
  maxTokens: 200
template: "{{prompt}}"
"#;

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.behavior.tone, "professional");
        assert_eq!(def.behavior.style, "concise");
        assert_eq!(def.behavior.max_tokens, 200);
        assert_eq!(def.behavior.temperature, 0.3);
        assert!(def.system.is_none());
    }

    #[test]
    fn test_behavior_block_is_optional() {
        let yaml = "id: a.b\ntitle: T\napiVersion: \"1.0\"\ntemplate: x\n";
        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.behavior, PromptBehavior::default());
    }
}
