//! Configuration management for the Handbook Assistant.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Environment variables
//! - Command-line flags
//! - Config files (.handbook/config.yaml)
//!
//! The configuration is workspace-centric, with most state stored in `.handbook/`.
//! Retrieval tuning lives in [`RetrievalConfig`], which is validated once at
//! startup and then handed to each engine component.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Main application configuration.
///
/// This struct holds all global configuration options that affect
/// CLI behavior across commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .handbook/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// LLM provider used for answer generation (only "ollama")
    pub provider: String,

    /// Default model identifier
    pub model: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Retrieval, confidence and freshness tuning
    pub retrieval: RetrievalConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Settings for one Ollama endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub endpoint: String,

    pub model: String,

    /// Per-request timeout in seconds. Falls back to `generationTimeoutSecs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// The only provider this build can talk to.
pub const SUPPORTED_PROVIDER: &str = "ollama";

/// Tuning knobs for the retrieval-and-trust engine.
///
/// Every field can be set in the `retrieval:` section of `config.yaml`
/// (camelCase keys) or through a `HANDBOOK_<UPPER_SNAKE>` environment
/// variable. Values are checked by [`RetrievalConfig::validate`] and never
/// clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetrievalConfig {
    /// Scores must be strictly greater than this to be returned. Default 0.10.
    pub min_relevance_threshold: f32,

    /// Upper bound on sources attached to a turn. Default 3.
    pub max_sources_per_response: usize,

    /// Documents this many days old (or older) are stale. Default 7.
    pub update_interval_days: u32,

    /// Top score needed (with corroboration) for `High`. Default 0.75.
    pub high_threshold: f32,

    /// Top score needed for `Medium`. Default 0.40.
    pub medium_threshold: f32,

    /// Age at which the recency multiplier bottoms out. Default 180.
    pub recency_horizon_days: u32,

    /// Floor of the recency multiplier. Default 0.50.
    pub min_recency_weight: f32,

    /// Follow-up suggestions per turn. Default 3.
    pub max_follow_ups: usize,

    /// Recent turns considered for follow-up dedup and prompt history. Default 5.
    pub history_window: usize,

    /// Upper bound on one generation call, in seconds. Default 60.
    pub generation_timeout_secs: u64,

    /// Upper bound on one scraper fetch, in seconds. Default 10.
    pub fetch_timeout_secs: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            min_relevance_threshold: 0.10,
            max_sources_per_response: 3,
            update_interval_days: 7,
            high_threshold: 0.75,
            medium_threshold: 0.40,
            recency_horizon_days: 180,
            min_recency_weight: 0.50,
            max_follow_ups: 3,
            history_window: 5,
            generation_timeout_secs: 60,
            fetch_timeout_secs: 10,
        }
    }
}

impl RetrievalConfig {
    /// Check ranges and ordering of every threshold.
    pub fn validate(&self) -> AppResult<()> {
        let unit_fields = [
            ("minRelevanceThreshold", self.min_relevance_threshold),
            ("highThreshold", self.high_threshold),
            ("mediumThreshold", self.medium_threshold),
            ("minRecencyWeight", self.min_recency_weight),
        ];

        for (name, value) in unit_fields {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(AppError::InvalidConfiguration(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.medium_threshold > self.high_threshold {
            return Err(AppError::InvalidConfiguration(format!(
                "mediumThreshold ({}) must not exceed highThreshold ({})",
                self.medium_threshold, self.high_threshold
            )));
        }

        let positive_fields = [
            ("maxSourcesPerResponse", self.max_sources_per_response as u64),
            ("updateIntervalDays", self.update_interval_days as u64),
            ("recencyHorizonDays", self.recency_horizon_days as u64),
            ("maxFollowUps", self.max_follow_ups as u64),
            ("generationTimeoutSecs", self.generation_timeout_secs),
            ("fetchTimeoutSecs", self.fetch_timeout_secs),
        ];

        for (name, value) in positive_fields {
            if value == 0 {
                return Err(AppError::InvalidConfiguration(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Apply `HANDBOOK_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> AppResult<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Unparseable values are reported as `InvalidConfiguration` rather than
    /// being ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        override_value(&lookup, "HANDBOOK_MIN_RELEVANCE_THRESHOLD", &mut self.min_relevance_threshold)?;
        override_value(&lookup, "HANDBOOK_MAX_SOURCES_PER_RESPONSE", &mut self.max_sources_per_response)?;
        override_value(&lookup, "HANDBOOK_UPDATE_INTERVAL_DAYS", &mut self.update_interval_days)?;
        override_value(&lookup, "HANDBOOK_HIGH_THRESHOLD", &mut self.high_threshold)?;
        override_value(&lookup, "HANDBOOK_MEDIUM_THRESHOLD", &mut self.medium_threshold)?;
        override_value(&lookup, "HANDBOOK_RECENCY_HORIZON_DAYS", &mut self.recency_horizon_days)?;
        override_value(&lookup, "HANDBOOK_MIN_RECENCY_WEIGHT", &mut self.min_recency_weight)?;
        override_value(&lookup, "HANDBOOK_MAX_FOLLOW_UPS", &mut self.max_follow_ups)?;
        override_value(&lookup, "HANDBOOK_HISTORY_WINDOW", &mut self.history_window)?;
        override_value(&lookup, "HANDBOOK_GENERATION_TIMEOUT_SECS", &mut self.generation_timeout_secs)?;
        override_value(&lookup, "HANDBOOK_FETCH_TIMEOUT_SECS", &mut self.fetch_timeout_secs)?;
        Ok(())
    }
}

fn override_value<F, T>(lookup: &F, key: &str, slot: &mut T) -> AppResult<()>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(raw) = lookup(key) {
        *slot = raw.trim().parse().map_err(|_| {
            AppError::InvalidConfiguration(format!("{} has an unparseable value: {:?}", key, raw))
        })?;
    }
    Ok(())
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    retrieval: Option<RetrievalConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment, YAML and defaults.
    ///
    /// Equivalent to [`AppConfig::load_with`] without CLI paths.
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Load configuration for a workspace and config file named on the
    /// command line.
    ///
    /// Paths given here win over `HANDBOOK_WORKSPACE` and `HANDBOOK_CONFIG`.
    /// The YAML file is `config_file` when given, otherwise
    /// `<workspace>/.handbook/config.yaml` if it exists. An explicit config
    /// file that does not exist is an error.
    ///
    /// Environment variables:
    /// - `HANDBOOK_WORKSPACE`: Override workspace path
    /// - `HANDBOOK_CONFIG`: Path to config file
    /// - `HANDBOOK_PROVIDER`: LLM provider
    /// - `HANDBOOK_MODEL`: Model identifier
    /// - `HANDBOOK_<RETRIEVAL_FIELD>`: Retrieval tuning (see [`RetrievalConfig`])
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// Returns `InvalidConfiguration` when the resulting retrieval settings
    /// do not validate.
    ///
    /// # Example
    /// ```no_run
    /// use handbook_core::config::AppConfig;
    ///
    /// let config = AppConfig::load_with(None, None).expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        Self::load_from(workspace, config_file, |key| std::env::var(key).ok())
    }

    fn load_from<F>(
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        env: F,
    ) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let workspace = workspace.or_else(|| env("HANDBOOK_WORKSPACE").map(PathBuf::from));
        if let Some(workspace) = &workspace {
            config.workspace = workspace.clone();
        }
        config.config_file = config_file.or_else(|| env("HANDBOOK_CONFIG").map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        match config.config_file.clone() {
            Some(path) if !path.exists() => {
                return Err(AppError::Config(format!(
                    "Config file does not exist: {:?}",
                    path
                )));
            }
            Some(path) => config = config.merge_yaml(&path)?,
            None => {
                let default_path = config.handbook_dir().join("config.yaml");
                if default_path.exists() {
                    config = config.merge_yaml(&default_path)?;
                }
            }
        }

        // A workspace named on the command line or in the environment beats
        // the one in the YAML file.
        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        if let Some(provider) = env("HANDBOOK_PROVIDER") {
            config.provider = provider;
        }

        if let Some(model) = env("HANDBOOK_MODEL") {
            config.model = model;
        }

        if let Some(level) = env("RUST_LOG") {
            config.log_level = Some(level);
        }

        if env("NO_COLOR").is_some() {
            config.no_color = true;
        }

        config.retrieval.apply_overrides_from(&env)?;
        config.retrieval.validate()?;

        Ok(config)
    }

    /// Merge a YAML configuration file into a copy of this config.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model.clone();
            }

            result.llm = Some(llm);
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Flags win over environment variables and the config file.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .handbook directory.
    pub fn handbook_dir(&self) -> PathBuf {
        self.workspace.join(".handbook")
    }

    /// Path of the persisted document store.
    pub fn documents_path(&self) -> PathBuf {
        self.handbook_dir().join("knowledge").join("documents.json")
    }

    /// Ensure the .handbook directory exists.
    pub fn ensure_handbook_dir(&self) -> AppResult<()> {
        let handbook_dir = self.handbook_dir();
        if !handbook_dir.exists() {
            std::fs::create_dir_all(&handbook_dir).map_err(|e| {
                AppError::Config(format!("Failed to create .handbook directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Get the provider configuration for `provider`, if one is declared.
    pub fn get_provider_config(&self, provider: &str) -> Option<ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider).cloned())
    }

    /// Validate the provider and retrieval settings.
    pub fn validate(&self) -> AppResult<()> {
        if self.provider != SUPPORTED_PROVIDER {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider, SUPPORTED_PROVIDER
            )));
        }

        self.retrieval.validate()
    }
}
