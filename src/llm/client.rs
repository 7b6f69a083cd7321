//! LLM client abstractions and provider definitions
//!
//! Seven interchangeable backends sit behind one [`LLMClient`] trait:
//! - **Ollama**: local inference (preferred when reachable)
//! - **OpenAI**: chat completions
//! - **Anthropic**: Claude messages API
//! - **Google**: Gemini `generateContent` over plain HTTP
//! - **Groq**, **Together**, **DeepSeek**: OpenAI-compatible endpoints

use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Generic LLM client trait for provider abstraction
///
/// Implementors only have to provide [`generate_with_history`](LLMClient::generate_with_history);
/// the single-prompt helpers are expressed in terms of it.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_history(&[("user".to_string(), prompt.to_string())])
            .await
    }

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.generate_with_history(&[
            ("system".to_string(), system.to_string()),
            ("user".to_string(), prompt.to_string()),
        ])
        .await
    }

    /// Generate with conversation history
    async fn generate_with_history(
        &self,
        messages: &[(String, String)], // (role, content) pairs
    ) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Inference parameters applied per request
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModelParams {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ModelParams {
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            max_tokens: None,
        }
    }
}

/// Provider identities in cascade order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Ollama,
    OpenAI,
    Anthropic,
    Google,
    Groq,
    Together,
    DeepSeek,
}

impl ProviderKind {
    /// Preference order: local first, then cloud providers in declaration order
    pub const ALL: [ProviderKind; 7] = [
        ProviderKind::Ollama,
        ProviderKind::OpenAI,
        ProviderKind::Anthropic,
        ProviderKind::Google,
        ProviderKind::Groq,
        ProviderKind::Together,
        ProviderKind::DeepSeek,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ProviderKind::Ollama => "ollama",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Google => "google",
            ProviderKind::Groq => "groq",
            ProviderKind::Together => "together",
            ProviderKind::DeepSeek => "deepseek",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Ollama => "Ollama (Local)",
            ProviderKind::OpenAI => "OpenAI",
            ProviderKind::Anthropic => "Anthropic (Claude)",
            ProviderKind::Google => "Google AI (Gemini)",
            ProviderKind::Groq => "Groq",
            ProviderKind::Together => "Together AI",
            ProviderKind::DeepSeek => "DeepSeek",
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, ProviderKind::Ollama)
    }

    /// Environment variable holding the credential (Ollama has none)
    pub fn key_env(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Ollama => None,
            ProviderKind::OpenAI => Some("OPENAI_API_KEY"),
            ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderKind::Google => Some("GOOGLE_AI_API_KEY"),
            ProviderKind::Groq => Some("GROQ_API_KEY"),
            ProviderKind::Together => Some("TOGETHER_API_KEY"),
            ProviderKind::DeepSeek => Some("DEEPSEEK_API_KEY"),
        }
    }

    /// Where to obtain a key
    pub fn key_url(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Ollama => None,
            ProviderKind::OpenAI => Some("https://platform.openai.com/api-keys"),
            ProviderKind::Anthropic => Some("https://console.anthropic.com/"),
            ProviderKind::Google => Some("https://makersuite.google.com/app/apikey"),
            ProviderKind::Groq => Some("https://console.groq.com/keys"),
            ProviderKind::Together => Some("https://api.together.xyz/settings/api-keys"),
            ProviderKind::DeepSeek => Some("https://platform.deepseek.com/api_keys"),
        }
    }

    /// Per-request timeout for generation calls
    pub fn request_timeout(&self) -> Duration {
        match self {
            ProviderKind::Ollama | ProviderKind::DeepSeek => Duration::from_secs(120),
            ProviderKind::Groq => Duration::from_secs(30),
            _ => Duration::from_secs(60),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(ProviderKind::Ollama),
            "openai" => Ok(ProviderKind::OpenAI),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "google" | "gemini" => Ok(ProviderKind::Google),
            "groq" => Ok(ProviderKind::Groq),
            "together" => Ok(ProviderKind::Together),
            "deepseek" => Ok(ProviderKind::DeepSeek),
            other => Err(AppError::Configuration(format!(
                "Unknown AI provider '{}'",
                other
            ))),
        }
    }
}

/// A fully resolved provider, ready to build a client
#[derive(Debug, Clone)]
pub enum Provider {
    /// Local Ollama server
    Ollama {
        base_url: String,
        model: String,
        params: ModelParams,
    },
    /// OpenAI chat completions
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
        params: ModelParams,
    },
    /// Anthropic Claude messages API
    Anthropic {
        api_key: String,
        model: String,
        params: ModelParams,
    },
    /// Google Gemini
    Google {
        api_key: String,
        api_base: String,
        model: String,
        params: ModelParams,
    },
    /// Groq (OpenAI-compatible)
    Groq {
        api_key: String,
        model: String,
        params: ModelParams,
    },
    /// Together AI (OpenAI-compatible)
    Together {
        api_key: String,
        model: String,
        params: ModelParams,
    },
    /// DeepSeek (OpenAI-compatible)
    DeepSeek {
        api_key: String,
        model: String,
        params: ModelParams,
    },
}

pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const TOGETHER_API_BASE: &str = "https://api.together.xyz/v1";
pub const DEEPSEEK_API_BASE: &str = "https://api.deepseek.com/v1";

impl Provider {
    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the backing feature was compiled out.
    ///
    /// `http` is the shared client; providers that talk plain HTTP reuse its pool.
    pub async fn create_client(&self, http: &reqwest::Client) -> Result<Box<dyn LLMClient>> {
        let timeout = self.kind().request_timeout();

        match self {
            #[cfg(feature = "ollama")]
            Provider::Ollama {
                base_url,
                model,
                params,
            } => Ok(Box::new(super::ollama::OllamaClient::new(
                base_url, model.clone(), *params, timeout,
            )?)),

            #[cfg(feature = "openai")]
            Provider::OpenAI {
                api_key,
                api_base,
                model,
                params,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
                *params,
                timeout,
            ))),

            #[cfg(feature = "anthropic")]
            Provider::Anthropic {
                api_key,
                model,
                params,
            } => Ok(Box::new(super::anthropic::AnthropicClient::new(
                api_key.clone(),
                model.clone(),
                *params,
                timeout,
            ))),

            Provider::Google {
                api_key,
                api_base,
                model,
                params,
            } => Ok(Box::new(super::google::GoogleClient::new(
                http.clone(),
                api_key.clone(),
                api_base.clone(),
                model.clone(),
                *params,
                timeout,
            ))),

            #[cfg(feature = "openai")]
            Provider::Groq {
                api_key,
                model,
                params,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                GROQ_API_BASE.to_string(),
                model.clone(),
                *params,
                timeout,
            ))),

            #[cfg(feature = "openai")]
            Provider::Together {
                api_key,
                model,
                params,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                TOGETHER_API_BASE.to_string(),
                model.clone(),
                *params,
                timeout,
            ))),

            #[cfg(feature = "openai")]
            Provider::DeepSeek {
                api_key,
                model,
                params,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                DEEPSEEK_API_BASE.to_string(),
                model.clone(),
                *params,
                timeout,
            ))),

            #[allow(unreachable_patterns)]
            other => Err(AppError::Configuration(format!(
                "{} support is not compiled into this build",
                other.kind().display_name()
            ))),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::Ollama { .. } => ProviderKind::Ollama,
            Provider::OpenAI { .. } => ProviderKind::OpenAI,
            Provider::Anthropic { .. } => ProviderKind::Anthropic,
            Provider::Google { .. } => ProviderKind::Google,
            Provider::Groq { .. } => ProviderKind::Groq,
            Provider::Together { .. } => ProviderKind::Together,
            Provider::DeepSeek { .. } => ProviderKind::DeepSeek,
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        self.kind().display_name()
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::Ollama { model, .. }
            | Provider::OpenAI { model, .. }
            | Provider::Anthropic { model, .. }
            | Provider::Google { model, .. }
            | Provider::Groq { model, .. }
            | Provider::Together { model, .. }
            | Provider::DeepSeek { model, .. } => model,
        }
    }
}

/// Anything that can hand out a ready LLM client
///
/// The provider manager implements this against live settings; tests swap
/// in a mock.
#[async_trait]
pub trait LLMClientFactoryTrait: Send + Sync {
    /// Create a client with the provider's default parameters
    async fn create_default(&self) -> Result<Box<dyn LLMClient>> {
        self.create_with_params(ModelParams::default()).await
    }

    /// Create a client tuned with the given parameters
    async fn create_with_params(&self, params: ModelParams) -> Result<Box<dyn LLMClient>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cascade_order_starts_local() {
        assert_eq!(ProviderKind::ALL[0], ProviderKind::Ollama);
        assert!(ProviderKind::ALL[0].is_local());
        assert!(ProviderKind::ALL[1..].iter().all(|k| !k.is_local()));
        let ids: Vec<_> = ProviderKind::ALL.iter().map(|k| k.id()).collect();
        assert_eq!(
            ids,
            ["ollama", "openai", "anthropic", "google", "groq", "together", "deepseek"]
        );
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAI);
        assert_eq!("gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Google);
        assert_eq!(" deepseek ".parse::<ProviderKind>().unwrap(), ProviderKind::DeepSeek);
        assert!(matches!(
            "mistral".parse::<ProviderKind>(),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_provider_metadata() {
        let groq = Provider::Groq {
            api_key: "k".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            params: ModelParams::default(),
        };
        assert_eq!(groq.kind(), ProviderKind::Groq);
        assert_eq!(groq.name(), "Groq");
        assert_eq!(groq.model(), "llama-3.3-70b-versatile");
        assert_eq!(groq.kind().request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_every_cloud_provider_documents_its_key() {
        for kind in ProviderKind::ALL.iter().filter(|k| !k.is_local()) {
            assert!(kind.key_env().is_some(), "{} has no key env", kind);
            assert!(kind.key_url().is_some(), "{} has no key url", kind);
        }
    }

    #[cfg(feature = "openai")]
    #[tokio::test]
    async fn test_create_openai_compatible_client() {
        let provider = Provider::Together {
            api_key: "test".to_string(),
            model: "meta-llama/Llama-3.3-70B-Instruct-Turbo".to_string(),
            params: ModelParams::with_temperature(0.2),
        };
        let client = provider.create_client(&reqwest::Client::new()).await.unwrap();
        assert_eq!(client.model_name(), "meta-llama/Llama-3.3-70B-Instruct-Turbo");
    }
}
