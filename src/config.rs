//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.surveyscope.toml` files.

use crate::analysis::demographic::CHART_MAX_DISTINCT;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".surveyscope.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Survey store settings.
    #[serde(default)]
    pub store: StoreSettings,

    /// Sentiment classifier settings.
    #[serde(default)]
    pub classifier: ClassifierSettings,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Public URL of the survey form, used for share links.
    #[serde(default = "default_form_base_url")]
    pub form_base_url: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
            form_base_url: default_form_base_url(),
        }
    }
}

fn default_output() -> String {
    "survey_report.md".to_string()
}

fn default_form_base_url() -> String {
    "http://localhost:8501/public_form".to_string()
}

/// Survey store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Project URL of the store.
    #[serde(default = "default_store_url")]
    pub url: String,

    /// Environment variable holding the store API key.
    #[serde(default = "default_store_key_env")]
    pub api_key_env: String,

    /// Table of question definitions.
    #[serde(default = "default_questions_table")]
    pub questions_table: String,

    /// Table of submitted responses.
    #[serde(default = "default_responses_table")]
    pub responses_table: String,

    /// Request timeout in seconds.
    #[serde(default = "default_store_timeout")]
    pub timeout_seconds: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            api_key_env: default_store_key_env(),
            questions_table: default_questions_table(),
            responses_table: default_responses_table(),
            timeout_seconds: default_store_timeout(),
        }
    }
}

fn default_store_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_store_key_env() -> String {
    "SUPABASE_KEY".to_string()
}

fn default_questions_table() -> String {
    "form_questions".to_string()
}

fn default_responses_table() -> String {
    "form_responses".to_string()
}

fn default_store_timeout() -> u64 {
    30
}

/// Sentiment classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierSettings {
    /// Inference endpoint base URL.
    #[serde(default = "default_classifier_url")]
    pub url: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the inference token (optional).
    #[serde(default = "default_classifier_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds.
    #[serde(default = "default_classifier_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            url: default_classifier_url(),
            model: default_model(),
            api_key_env: default_classifier_key_env(),
            timeout_seconds: default_classifier_timeout(),
        }
    }
}

fn default_classifier_url() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_model() -> String {
    "distilbert/distilbert-base-uncased-finetuned-sst-2-english".to_string()
}

fn default_classifier_key_env() -> String {
    "HF_TOKEN".to_string()
}

fn default_classifier_timeout() -> u64 {
    60
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Demographic questions with this many distinct values are not charted.
    #[serde(default = "default_chart_max_distinct")]
    pub chart_max_distinct: usize,

    /// Width of the longest text bar in Markdown charts.
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,

    /// Include the per-answer sentiment table.
    #[serde(default = "default_true")]
    pub include_raw_results: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            chart_max_distinct: default_chart_max_distinct(),
            bar_width: default_bar_width(),
            include_raw_results: true,
        }
    }
}

fn default_chart_max_distinct() -> usize {
    CHART_MAX_DISTINCT
}

fn default_bar_width() -> usize {
    30
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.surveyscope.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.store_url {
            self.store.url = url.clone();
        }
        if let Some(ref url) = args.classifier_url {
            self.classifier.url = url.clone();
        }
        if let Some(ref model) = args.model {
            self.classifier.model = model.clone();
        }

        // Timeout - applies to both remote services
        if let Some(timeout) = args.timeout {
            self.store.timeout_seconds = timeout;
            self.classifier.timeout_seconds = timeout;
        }

        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
