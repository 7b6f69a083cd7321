//! LLM Provider Clients and Abstractions
//!
//! Every provider sits behind the [`LLMClient`] trait. The rest of the crate
//! never names a vendor: it asks an [`LLMClientFactoryTrait`] for a client and
//! the [`ProviderManager`] answers through its cascade.
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `ollama` - Local Ollama server
//! - `openai` - OpenAI plus the OpenAI-compatible Groq, Together and DeepSeek
//! - `anthropic` - Claude
//!
//! Google Gemini is always available; it only needs `reqwest`.
//!
//! # Example
//!
//! ```ignore
//! use devtel::llm::{LLMClientFactoryTrait, ModelParams, ProviderManager};
//!
//! let manager = ProviderManager::new(settings, reqwest::Client::new());
//! let client = manager.create_with_params(ModelParams::with_temperature(0.3)).await?;
//! let reply = client.generate("What should we focus on this sprint?").await?;
//! ```

/// Core LLM client trait, provider enum and factory trait.
pub mod client;
/// Google Gemini over plain HTTP.
pub mod google;
/// Provider selection cascade and setup diagnostics.
pub mod manager;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "anthropic")]
pub mod anthropic;

pub use client::{LLMClient, LLMClientFactoryTrait, ModelParams, Provider, ProviderKind};
pub use manager::ProviderManager;
