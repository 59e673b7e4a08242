use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, anyhow};
use jsonschema::{JSONSchema, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    diagnosis::{DiagnosisSettings, GatingPolicy},
    llm::types::LlmConfig,
    scoring::ScoringSettings,
    services::ServicesConfig,
    session::MemoryLimits,
};

pub const DEFAULT_CONFIG_FILE: &str = "nutrisense.jsonc";
pub const SCHEMA_FILE: &str = "nutrisense.schema.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: Option<LlmConfig>,
    #[serde(default)]
    pub services: ServicesConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_enabled_true() -> bool {
    true
}

fn default_logging_dir() -> PathBuf {
    PathBuf::from("./logs")
}

fn default_logging_filter() -> String {
    "info".to_string()
}

fn default_logging_rotation() -> LoggingRotation {
    LoggingRotation::Daily
}

fn default_logging_retention_days() -> usize {
    14
}

fn default_collaborator_timeout_ms() -> u64 {
    30_000
}

fn default_max_history() -> usize {
    10
}

fn default_max_intent_history() -> usize {
    5
}

fn default_max_question_repeats() -> u32 {
    2
}

fn default_min_symptoms() -> usize {
    3
}

fn default_similarity_threshold() -> f64 {
    0.45
}

fn default_top_k() -> usize {
    3
}

fn default_continue_to_nutrition_below_confidence() -> f64 {
    0.7
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LoggingRotation {
    Daily,
    Hourly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_logging_filter")]
    pub filter: String,
    #[serde(default = "default_logging_rotation")]
    pub rotation: LoggingRotation,
    #[serde(default = "default_logging_retention_days")]
    pub retention_days: usize,
    #[serde(default = "default_enabled_true")]
    pub stderr_warn_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_logging_dir(),
            filter: default_logging_filter(),
            rotation: default_logging_rotation(),
            retention_days: default_logging_retention_days(),
            stderr_warn_enabled: true,
        }
    }
}

/// Tunables of the conversation engine itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default = "default_collaborator_timeout_ms")]
    pub collaborator_timeout_ms: u64,
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    #[serde(default = "default_max_intent_history")]
    pub max_intent_history: usize,
    #[serde(default = "default_max_question_repeats")]
    pub max_question_repeats: u32,
    #[serde(default = "default_min_symptoms")]
    pub min_symptoms: usize,
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_continue_to_nutrition_below_confidence")]
    pub continue_to_nutrition_below_confidence: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            collaborator_timeout_ms: default_collaborator_timeout_ms(),
            max_history: default_max_history(),
            max_intent_history: default_max_intent_history(),
            max_question_repeats: default_max_question_repeats(),
            min_symptoms: default_min_symptoms(),
            similarity_threshold: default_similarity_threshold(),
            top_k: default_top_k(),
            continue_to_nutrition_below_confidence:
                default_continue_to_nutrition_below_confidence(),
        }
    }
}

impl EngineConfig {
    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }

    pub fn memory_limits(&self) -> MemoryLimits {
        MemoryLimits {
            max_history: self.max_history,
            max_intent_history: self.max_intent_history,
        }
    }

    pub fn diagnosis_settings(&self) -> DiagnosisSettings {
        DiagnosisSettings {
            policy: GatingPolicy {
                max_question_repeats: self.max_question_repeats,
                min_symptoms: self.min_symptoms,
            },
            scoring: ScoringSettings {
                top_k: self.top_k,
                similarity_threshold: self.similarity_threshold,
                timeout: self.collaborator_timeout(),
            },
            collaborator_timeout: self.collaborator_timeout(),
        }
    }
}

impl Config {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config_value: Value = json5::from_str(&config_content)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        let config_base = config_path.parent().unwrap_or_else(|| Path::new("."));
        let schema_path = resolve_schema_path(config_base, &config_value)?;
        validate_against_schema(&config_value, &schema_path)?;

        let mut config: Config =
            serde_json::from_value(config_value).context("failed to deserialize config")?;

        if let Some(llm) = &config.llm {
            llm.validate()
                .map_err(|err| anyhow!("invalid llm section: {err}"))?;
        }
        if !config.logging.dir.is_absolute() {
            config.logging.dir = config_base.join(&config.logging.dir);
        }

        Ok(config)
    }

    /// Loads `explicit` when given, else `nutrisense.jsonc` in the working
    /// directory when present, else built-in defaults with no language model.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.exists() {
            return Self::load(fallback);
        }
        Ok(Self::default())
    }
}

fn resolve_schema_path(config_base: &Path, config_value: &Value) -> Result<PathBuf> {
    if let Some(path_text) = config_value.get("$schema").and_then(|value| value.as_str()) {
        let configured = PathBuf::from(path_text);
        if configured.is_absolute() {
            return Ok(configured);
        }
        return Ok(config_base.join(&configured));
    }

    let local_default = config_base.join(SCHEMA_FILE);
    if local_default.exists() {
        return Ok(local_default);
    }

    Err(anyhow!(
        "unable to resolve schema path: expected $schema in config or {SCHEMA_FILE} next to it"
    ))
}

fn validate_against_schema(config_value: &Value, schema_path: &Path) -> Result<()> {
    let schema_content = fs::read_to_string(schema_path)
        .with_context(|| format!("failed to read schema {}", schema_path.display()))?;
    let schema: Value = serde_json::from_str(&schema_content)
        .with_context(|| format!("failed to parse schema {}", schema_path.display()))?;

    let compiled =
        JSONSchema::compile(&schema).map_err(|e| anyhow!("failed to compile schema: {e}"))?;

    match compiled.validate(config_value) {
        Ok(()) => Ok(()),
        Err(errors_iter) => {
            let validation_errors: Vec<ValidationError> = errors_iter.collect();
            let messages: Vec<String> = validation_errors
                .into_iter()
                .map(|error| error.to_string())
                .collect();
            Err(anyhow!("config validation failed: {}", messages.join("; ")))
        }
    }
}
