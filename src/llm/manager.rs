//! Provider selection cascade
//!
//! Decides which backend serves a request. In `auto` mode the local Ollama
//! server wins when it answers a quick probe; otherwise the first cloud
//! provider with a credential is used. When nothing is usable the error
//! carries setup instructions meant to be shown to the user verbatim.

use crate::llm::client::{LLMClient, LLMClientFactoryTrait, ModelParams, Provider, ProviderKind};
use crate::types::{AppError, ProviderStatus, Result};
use crate::utils::config::{non_empty, Settings};
use async_trait::async_trait;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

const OLLAMA_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

pub struct ProviderManager {
    settings: Arc<Settings>,
    http: reqwest::Client,
}

impl ProviderManager {
    pub fn new(settings: Arc<Settings>, http: reqwest::Client) -> Self {
        Self { settings, http }
    }

    /// Probe the Ollama server; only a 200 counts. Disabled counts as unreachable.
    pub async fn ollama_available(&self) -> bool {
        if !self.settings.ollama_enabled {
            return false;
        }

        let url = format!("{}/api/tags", self.settings.ollama_url.trim_end_matches('/'));
        match self.http.get(&url).timeout(OLLAMA_PROBE_TIMEOUT).send().await {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(e) => {
                tracing::debug!("Ollama probe failed: {}", e);
                false
            }
        }
    }

    fn api_key(&self, kind: ProviderKind) -> Option<&str> {
        let s = &self.settings;
        match kind {
            ProviderKind::Ollama => None,
            ProviderKind::OpenAI => non_empty(&s.openai_api_key),
            ProviderKind::Anthropic => non_empty(&s.anthropic_api_key),
            ProviderKind::Google => non_empty(&s.google_ai_api_key),
            ProviderKind::Groq => non_empty(&s.groq_api_key),
            ProviderKind::Together => non_empty(&s.together_api_key),
            ProviderKind::DeepSeek => non_empty(&s.deepseek_api_key),
        }
    }

    pub fn model_for(&self, kind: ProviderKind) -> &str {
        let s = &self.settings;
        match kind {
            ProviderKind::Ollama => &s.ollama_model,
            ProviderKind::OpenAI => &s.openai_model,
            ProviderKind::Anthropic => &s.anthropic_model,
            ProviderKind::Google => &s.google_ai_model,
            ProviderKind::Groq => &s.groq_model,
            ProviderKind::Together => &s.together_model,
            ProviderKind::DeepSeek => &s.deepseek_model,
        }
    }

    /// Build the provider if its credentials are present. Ollama only needs
    /// to be enabled; reachability is the caller's concern.
    pub fn provider_for(&self, kind: ProviderKind, params: ModelParams) -> Option<Provider> {
        let model = self.model_for(kind).to_string();
        if kind == ProviderKind::Ollama {
            return self.settings.ollama_enabled.then(|| Provider::Ollama {
                base_url: self.settings.ollama_url.clone(),
                model,
                params,
            });
        }

        let api_key = self.api_key(kind)?.to_string();
        let provider = match kind {
            ProviderKind::OpenAI => Provider::OpenAI {
                api_key,
                api_base: self.settings.openai_api_base.clone(),
                model,
                params,
            },
            ProviderKind::Anthropic => Provider::Anthropic {
                api_key,
                model,
                params,
            },
            ProviderKind::Google => Provider::Google {
                api_key,
                api_base: self.settings.google_ai_api_base.clone(),
                model,
                params,
            },
            ProviderKind::Groq => Provider::Groq {
                api_key,
                model,
                params,
            },
            ProviderKind::Together => Provider::Together {
                api_key,
                model,
                params,
            },
            ProviderKind::DeepSeek => Provider::DeepSeek {
                api_key,
                model,
                params,
            },
            ProviderKind::Ollama => return None,
        };
        Some(provider)
    }

    fn statuses_with(&self, ollama_up: bool) -> Vec<ProviderStatus> {
        ProviderKind::ALL
            .iter()
            .map(|&kind| ProviderStatus {
                id: kind.id().to_string(),
                name: kind.display_name().to_string(),
                model: self.model_for(kind).to_string(),
                configured: if kind.is_local() {
                    ollama_up
                } else {
                    self.api_key(kind).is_some()
                },
                local: kind.is_local(),
            })
            .collect()
    }

    /// Status of every provider in cascade order
    pub async fn statuses(&self) -> Vec<ProviderStatus> {
        let ollama_up = self.ollama_available().await;
        self.statuses_with(ollama_up)
    }

    /// Pick the provider for the next request.
    ///
    /// # Errors
    ///
    /// - `Configuration` when `ai_provider` names no known provider
    /// - `ProviderUnavailable` when nothing usable is configured
    pub async fn resolve(&self, params: ModelParams) -> Result<Provider> {
        let choice = self.settings.ai_provider.trim();

        if choice.is_empty() || choice.eq_ignore_ascii_case("auto") {
            let ollama_up = self.ollama_available().await;
            for kind in ProviderKind::ALL {
                if kind.is_local() && !ollama_up {
                    continue;
                }
                if let Some(provider) = self.provider_for(kind, params) {
                    tracing::debug!(provider = kind.id(), "Provider selected by cascade");
                    return Ok(provider);
                }
            }
            let statuses = self.statuses_with(ollama_up);
            return Err(AppError::ProviderUnavailable(
                self.build_error_message(&statuses),
            ));
        }

        let kind: ProviderKind = choice.parse()?;
        self.provider_for(kind, params).ok_or_else(|| {
            AppError::ProviderUnavailable(match kind {
                ProviderKind::Ollama => {
                    "Ollama is disabled. Set OLLAMA_ENABLED=true to use it.".to_string()
                }
                _ => format!("{} API key not configured", kind.display_name()),
            })
        })
    }

    /// The provider the cascade would pick right now, if any
    pub async fn active_provider(&self) -> Option<Provider> {
        self.resolve(ModelParams::default()).await.ok()
    }

    /// Setup instructions shown when no provider can serve a request
    pub fn build_error_message(&self, statuses: &[ProviderStatus]) -> String {
        let mut msg = String::from("No LLM provider is configured or available.\n\n");
        msg.push_str("To use the AI assistant, configure at least one provider:\n\n");

        msg.push_str("🏠 Local (free, private):\n");
        msg.push_str("  1. Install Ollama from https://ollama.com\n");
        let _ = writeln!(msg, "  2. Run: ollama pull {}", self.settings.ollama_model);
        let _ = writeln!(
            msg,
            "  3. Make sure Ollama is running at {}",
            self.settings.ollama_url
        );
        msg.push_str("  4. Set OLLAMA_ENABLED=true\n\n");

        msg.push_str("☁️ Cloud providers (set one of these API keys):\n");
        for kind in ProviderKind::ALL.iter().filter(|k| !k.is_local()) {
            if let (Some(env), Some(url)) = (kind.key_env(), kind.key_url()) {
                let _ = writeln!(msg, "  • {} ({})", env, url);
            }
        }

        msg.push_str("\nCurrent Configuration Status:\n");
        for status in statuses {
            let (mark, label) = if status.configured {
                ("✅", "Available")
            } else {
                ("❌", "Not configured")
            };
            let _ = writeln!(msg, "  {} {}: {}", mark, status.name, label);
        }

        msg
    }
}

#[async_trait]
impl LLMClientFactoryTrait for ProviderManager {
    async fn create_with_params(&self, params: ModelParams) -> Result<Box<dyn LLMClient>> {
        let provider = self.resolve(params).await?;
        tracing::info!(
            provider = provider.kind().id(),
            model = provider.model(),
            "Using LLM provider"
        );
        provider.create_client(&self.http).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(settings: Settings) -> ProviderManager {
        ProviderManager::new(Arc::new(settings), reqwest::Client::new())
    }

    fn offline_settings() -> Settings {
        Settings {
            ollama_enabled: false,
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_auto_skips_providers_without_keys() {
        let m = manager(Settings {
            groq_api_key: Some("gsk".to_string()),
            together_api_key: Some("tg".to_string()),
            ..offline_settings()
        });

        let provider = m.resolve(ModelParams::default()).await.unwrap();
        assert_eq!(provider.kind(), ProviderKind::Groq);
        assert_eq!(provider.model(), "llama-3.3-70b-versatile");
    }

    #[tokio::test]
    async fn test_auto_prefers_declaration_order() {
        let m = manager(Settings {
            openai_api_key: Some("sk".to_string()),
            deepseek_api_key: Some("ds".to_string()),
            ..offline_settings()
        });
        let provider = m.resolve(ModelParams::with_temperature(0.2)).await.unwrap();
        assert_eq!(provider.kind(), ProviderKind::OpenAI);
        match provider {
            Provider::OpenAI { params, .. } => assert_eq!(params.temperature, Some(0.2)),
            other => panic!("unexpected provider {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_blank_keys_do_not_count() {
        let m = manager(Settings {
            openai_api_key: Some("  ".to_string()),
            ..offline_settings()
        });
        assert!(matches!(
            m.resolve(ModelParams::default()).await,
            Err(AppError::ProviderUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_nothing_configured_lists_setup_steps() {
        let m = manager(offline_settings());
        let err = m.resolve(ModelParams::default()).await.unwrap_err();
        let msg = err.to_string();

        assert!(msg.contains("No LLM provider is configured or available."));
        assert!(msg.contains("ollama pull llama3.2:3b"));
        assert!(msg.contains("OPENAI_API_KEY (https://platform.openai.com/api-keys)"));
        assert!(msg.contains("GROQ_API_KEY"));
        assert!(msg.contains("Current Configuration Status:"));
        assert!(msg.contains("❌ OpenAI: Not configured"));
    }

    #[tokio::test]
    async fn test_explicit_provider_requires_key() {
        let m = manager(Settings {
            ai_provider: "anthropic".to_string(),
            openai_api_key: Some("sk".to_string()),
            ..offline_settings()
        });
        let err = m.resolve(ModelParams::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "Anthropic (Claude) API key not configured");
    }

    #[tokio::test]
    async fn test_explicit_ollama_skips_probe() {
        let m = manager(Settings {
            ai_provider: "ollama".to_string(),
            ollama_enabled: true,
            ollama_url: "http://127.0.0.1:1".to_string(),
            ..Settings::default()
        });
        let provider = m.resolve(ModelParams::default()).await.unwrap();
        assert_eq!(provider.kind(), ProviderKind::Ollama);
    }

    #[tokio::test]
    async fn test_unknown_provider_is_configuration_error() {
        let m = manager(Settings {
            ai_provider: "mistral".to_string(),
            ..offline_settings()
        });
        assert!(matches!(
            m.resolve(ModelParams::default()).await,
            Err(AppError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_statuses_cover_all_providers() {
        let m = manager(Settings {
            google_ai_api_key: Some("g".to_string()),
            ..offline_settings()
        });
        let statuses = m.statuses().await;
        assert_eq!(statuses.len(), 7);
        assert_eq!(statuses[0].id, "ollama");
        assert!(statuses[0].local);
        assert!(!statuses[0].configured);
        let google = statuses.iter().find(|s| s.id == "google").unwrap();
        assert!(google.configured);
        assert_eq!(google.model, "gemini-2.0-flash-exp");
    }
}
