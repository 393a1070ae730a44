use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ModlingoError;
use crate::evaluator::SourceLanguagePolicy;

/// Top-level modlingo configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Batch translation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Target language code (e.g. `zh`, `ja`, `pt-BR`).
    #[serde(default = "default_target_language")]
    pub target_language: String,
    /// Maximum number of simultaneous translation calls per file.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Completed entries between forced partial saves.
    #[serde(default = "default_autosave_interval")]
    pub autosave_interval: usize,
    /// Per-call timeout enforced by the orchestrator.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
    /// Pause before moving on to the next file in the queue.
    #[serde(default = "default_advance_delay_ms")]
    pub advance_delay_ms: u64,
    /// Share of ASCII letters above which a value counts as untranslated.
    #[serde(default = "default_source_threshold")]
    pub source_threshold: f64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_language: default_target_language(),
            batch_size: default_batch_size(),
            autosave_interval: default_autosave_interval(),
            call_timeout_secs: default_call_timeout_secs(),
            advance_delay_ms: default_advance_delay_ms(),
            source_threshold: default_source_threshold(),
        }
    }
}

impl TranslationConfig {
    /// Concurrency limit, never below one.
    pub fn concurrency(&self) -> usize {
        self.batch_size.max(1)
    }

    /// Autosave interval, never below one.
    pub fn autosave_every(&self) -> usize {
        self.autosave_interval.max(1)
    }

    /// Per-call timeout, never below one second.
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs.max(1))
    }

    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }

    pub fn source_policy(&self) -> SourceLanguagePolicy {
        SourceLanguagePolicy {
            threshold: self.source_threshold,
        }
    }
}

/// Ollama local server config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,
    /// Model name. Empty = first model reported by the server.
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
            model: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

// --- Default value functions ---

fn default_data_dir() -> String {
    "~/.modlingo".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_target_language() -> String {
    "zh".to_string()
}
fn default_batch_size() -> usize {
    5
}
fn default_autosave_interval() -> usize {
    20
}
fn default_call_timeout_secs() -> u64 {
    30
}
fn default_advance_delay_ms() -> u64 {
    2000
}
fn default_source_threshold() -> f64 {
    0.7
}
fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_request_timeout_secs() -> u64 {
    30
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, ModlingoError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ModlingoError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| ModlingoError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
