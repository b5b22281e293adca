use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::{Path, PathBuf}};
use tracing::debug;

use crate::{
    llm::{ModelSettings, ProviderConfig, ProviderFactory},
    tui::ThemeMode,
};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Data directory for the interactive log file
    pub data_dir: PathBuf,

    /// Directory that catalog exports are written to
    pub export_dir: PathBuf,

    /// AI provider type
    pub provider: String,

    /// API key
    pub api_key: Option<String>,

    /// Base URL for the API
    pub base_url: Option<String>,

    /// Fast model used by default
    pub model: String,

    /// Model used when extended reasoning is on
    pub reasoning_model: String,

    /// Thinking budget granted to the reasoning model
    pub thinking_budget: u32,

    /// Maximum tokens for responses
    pub max_tokens: Option<u32>,

    /// Temperature for sampling
    pub temperature: Option<f32>,

    /// System instruction sent with every request
    pub system_message: Option<String>,

    /// Request timeout
    pub timeout_seconds: u64,

    /// Retries for one-shot requests
    pub max_retries: u32,

    /// Latency of the simulated provider
    pub simulated_delay_ms: u64,

    /// Start with extended reasoning enabled
    pub extended_reasoning: bool,

    /// Initial theme: light, dark, high-contrast or neon
    pub theme: String,

    /// Extra headers for API requests
    pub extra_headers: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let models = ModelSettings::default();
        let provider = ProviderConfig::default();
        Self {
            data_dir: dirs::data_dir()
                .map(|dir| dir.join("pm-genius"))
                .unwrap_or_else(|| PathBuf::from("./data")),
            export_dir: PathBuf::from("."),
            provider: provider.provider_type,
            api_key: None,
            base_url: None,
            model: models.model,
            reasoning_model: models.reasoning_model,
            thinking_budget: models.thinking_budget,
            max_tokens: None,
            temperature: None,
            system_message: None,
            timeout_seconds: provider.timeout_seconds,
            max_retries: provider.max_retries,
            simulated_delay_ms: provider.simulated_delay_ms,
            extended_reasoning: false,
            theme: ThemeMode::default().name().to_string(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Subset of [`Config`] read from a JSON file; absent fields keep their value
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ConfigFile {
    pub data_dir: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub provider: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub reasoning_model: Option<String>,
    pub thinking_budget: Option<u32>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub system_message: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_retries: Option<u32>,
    pub simulated_delay_ms: Option<u64>,
    pub extended_reasoning: Option<bool>,
    pub theme: Option<String>,
    pub extra_headers: HashMap<String, String>,
}

impl Config {
    /// Initialize configuration from defaults, a config file and the environment
    pub async fn init(config_path: Option<&Path>) -> Result<Self> {
        debug!("Initializing configuration");

        let mut config = Self::default();

        let file_config = match config_path {
            Some(path) => Some(Self::read_file(path).await?),
            None => Self::load_from_file().await?,
        };
        if let Some(file_config) = file_config {
            config.merge_with(file_config);
        }

        config.load_from_env();

        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(&mut self) {
        self.load_from_vars(|key| std::env::var(key).ok());
    }

    fn load_from_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(provider) = var("PM_GENIUS_PROVIDER") {
            self.provider = provider;
        }

        // Later names win
        for key in ["GEMINI_API_KEY", "API_KEY", "PM_GENIUS_API_KEY"] {
            if let Some(api_key) = var(key).filter(|k| !k.trim().is_empty()) {
                self.api_key = Some(api_key);
            }
        }

        if let Some(base_url) = var("PM_GENIUS_BASE_URL") {
            self.base_url = Some(base_url);
        }

        if let Some(model) = var("PM_GENIUS_MODEL") {
            self.model = model;
        }

        if let Some(model) = var("PM_GENIUS_REASONING_MODEL") {
            self.reasoning_model = model;
        }

        if let Some(budget) = var("PM_GENIUS_THINKING_BUDGET").and_then(|v| v.parse().ok()) {
            self.thinking_budget = budget;
        }

        if let Some(max_tokens) = var("PM_GENIUS_MAX_TOKENS").and_then(|v| v.parse().ok()) {
            self.max_tokens = Some(max_tokens);
        }

        if let Some(temperature) = var("PM_GENIUS_TEMPERATURE").and_then(|v| v.parse().ok()) {
            self.temperature = Some(temperature);
        }

        if let Some(system_message) = var("PM_GENIUS_SYSTEM_MESSAGE") {
            self.system_message = Some(system_message);
        }

        if let Some(timeout) = var("PM_GENIUS_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.timeout_seconds = timeout;
        }

        if let Some(extended) = var("PM_GENIUS_EXTENDED") {
            self.extended_reasoning = matches!(extended.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Some(theme) = var("PM_GENIUS_THEME") {
            self.theme = theme;
        }

        if let Some(export_dir) = var("PM_GENIUS_EXPORT_DIR") {
            self.export_dir = PathBuf::from(export_dir);
        }

        if let Some(data_dir) = var("PM_GENIUS_DATA_DIR") {
            self.data_dir = PathBuf::from(data_dir);
        }
    }

    /// Candidate configuration files, highest priority first
    pub fn config_paths() -> Vec<PathBuf> {
        let mut config_paths = vec![
            PathBuf::from("./.pm-genius.json"),
            PathBuf::from("./pm-genius.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            config_paths.push(config_dir.join("pm-genius").join("config.json"));
        }
        config_paths
    }

    /// Load the first configuration file that exists
    pub async fn load_from_file() -> Result<Option<ConfigFile>> {
        for path in Self::config_paths() {
            if path.exists() {
                return Self::read_file(&path).await.map(Some);
            }
        }
        Ok(None)
    }

    async fn read_file(path: &Path) -> Result<ConfigFile> {
        debug!("Loading configuration from: {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Merge values present in a configuration file into this one
    pub fn merge_with(&mut self, other: ConfigFile) {
        if let Some(data_dir) = other.data_dir {
            self.data_dir = data_dir;
        }
        if let Some(export_dir) = other.export_dir {
            self.export_dir = export_dir;
        }
        if let Some(provider) = other.provider {
            self.provider = provider;
        }
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if let Some(model) = other.model {
            self.model = model;
        }
        if let Some(model) = other.reasoning_model {
            self.reasoning_model = model;
        }
        if let Some(budget) = other.thinking_budget {
            self.thinking_budget = budget;
        }
        if other.max_tokens.is_some() {
            self.max_tokens = other.max_tokens;
        }
        if other.temperature.is_some() {
            self.temperature = other.temperature;
        }
        if other.system_message.is_some() {
            self.system_message = other.system_message;
        }
        if let Some(timeout) = other.timeout_seconds {
            self.timeout_seconds = timeout;
        }
        if let Some(retries) = other.max_retries {
            self.max_retries = retries;
        }
        if let Some(delay) = other.simulated_delay_ms {
            self.simulated_delay_ms = delay;
        }
        if let Some(extended) = other.extended_reasoning {
            self.extended_reasoning = extended;
        }
        if let Some(theme) = other.theme {
            self.theme = theme;
        }
        if !other.extra_headers.is_empty() {
            self.extra_headers.extend(other.extra_headers);
        }
    }

    /// Theme selected by configuration
    pub fn theme_mode(&self) -> ThemeMode {
        ThemeMode::from_name(&self.theme).unwrap_or_default()
    }

    /// Validate the configuration. A missing API key is allowed.
    pub fn validate(&self) -> Result<()> {
        if !ProviderFactory::available_providers().contains(&self.provider.as_str()) {
            return Err(anyhow::anyhow!(
                "Unknown provider '{}'; expected one of: {}",
                self.provider,
                ProviderFactory::available_providers().join(", ")
            ));
        }

        if self.model.trim().is_empty() || self.reasoning_model.trim().is_empty() {
            return Err(anyhow::anyhow!("Model is required"));
        }

        if let Some(max_tokens) = self.max_tokens {
            if max_tokens == 0 {
                return Err(anyhow::anyhow!("max_tokens must be greater than 0"));
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(anyhow::anyhow!("temperature must be between 0.0 and 2.0"));
            }
        }

        if ThemeMode::from_name(&self.theme).is_none() {
            return Err(anyhow::anyhow!(
                "Unknown theme '{}'; expected light, dark, high-contrast or neon",
                self.theme
            ));
        }

        Ok(())
    }

    /// Settings for the provider factory
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider_type: self.provider.clone(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            timeout_seconds: self.timeout_seconds,
            max_retries: self.max_retries,
            simulated_delay_ms: self.simulated_delay_ms,
            extra_headers: self.extra_headers.clone(),
        }
    }

    /// Model variants and generation parameters
    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings {
            model: self.model.clone(),
            reasoning_model: self.reasoning_model.clone(),
            thinking_budget: self.thinking_budget,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system_message: self.system_message.clone(),
        }
    }

    /// Path of the interactive UI log file
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("pm-genius.log")
    }
}
