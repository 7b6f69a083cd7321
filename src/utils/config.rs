//! Service settings
//!
//! Settings are layered with the `config` crate:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file (`devtel.toml` unless `--config` names another)
//! 3. Environment variables using flat names (`OPENAI_API_KEY`, `OLLAMA_URL`, ...)
//!
//! A `.env` file is loaded into the environment first via `dotenvy`.

use crate::types::{AppError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default TOML file looked up when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "devtel.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Server
    pub host: String,
    pub chat_port: u16,
    pub workflow_port: u16,
    pub log_level: String,
    /// `pretty` or `json`
    pub log_format: String,

    // Provider selection: `auto` or a provider id
    pub ai_provider: String,

    // Ollama (local)
    pub ollama_enabled: bool,
    pub ollama_url: String,
    pub ollama_model: String,

    // Cloud providers
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_base: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub google_ai_api_key: Option<String>,
    pub google_ai_model: String,
    pub google_ai_api_base: String,
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub together_api_key: Option<String>,
    pub together_model: String,
    pub deepseek_api_key: Option<String>,
    pub deepseek_model: String,

    // Backend agent bridge
    pub backend_url: String,
    /// Shared secret sent to the backend and required on workflow routes
    pub service_token: String,

    // Agent execution
    pub agent_timeout: u64,
    pub max_iterations: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            chat_port: 8000,
            workflow_port: 8001,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            ai_provider: "auto".to_string(),
            ollama_enabled: true,
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2:3b".to_string(),
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            openai_api_base: "https://api.openai.com/v1".to_string(),
            anthropic_api_key: None,
            anthropic_model: "claude-3-5-sonnet-20241022".to_string(),
            google_ai_api_key: None,
            google_ai_model: "gemini-2.0-flash-exp".to_string(),
            google_ai_api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            groq_api_key: None,
            groq_model: "llama-3.3-70b-versatile".to_string(),
            together_api_key: None,
            together_model: "meta-llama/Llama-3.3-70B-Instruct-Turbo".to_string(),
            deepseek_api_key: None,
            deepseek_model: "deepseek-chat".to_string(),
            backend_url: "http://localhost:8080".to_string(),
            service_token: "dev-token".to_string(),
            agent_timeout: 120,
            max_iterations: 5,
        }
    }
}

impl Settings {
    /// Load settings from `.env`, an optional TOML file, and the environment.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let file_source = match config_path {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE)
                .format(FileFormat::Toml)
                .required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file_source)
            .add_source(Environment::default().try_parsing(true))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build settings: {}", e)))?
            .try_deserialize()
            .map_err(|e| AppError::Configuration(format!("Invalid settings: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from TOML text alone, without touching the environment.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build settings: {}", e)))?
            .try_deserialize()
            .map_err(|e| AppError::Configuration(format!("Invalid settings: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(AppError::Configuration(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.agent_timeout == 0 {
            return Err(AppError::Configuration(
                "agent_timeout must be at least 1 second".to_string(),
            ));
        }
        if !matches!(self.log_format.as_str(), "pretty" | "json") {
            return Err(AppError::Configuration(format!(
                "log_format must be 'pretty' or 'json', got '{}'",
                self.log_format
            )));
        }
        Ok(())
    }

    pub fn agent_timeout(&self) -> Duration {
        Duration::from_secs(self.agent_timeout)
    }

    /// Base URL for every backend tool call
    pub fn agent_bridge_url(&self) -> String {
        format!("{}/agent-bridge", self.backend_url.trim_end_matches('/'))
    }
}

/// Treat blank credentials as absent
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
