//! # DevTel Agents
//!
//! AI services for the DevTel project-management platform:
//!
//! 1. **Chat orchestrator** - routes a user's message to one of five agent
//!    personas by keyword intent, runs the persona against an LLM with
//!    backend tools, and extracts suggested actions from the answer.
//! 2. **Workflow service** - structured single-shot workflows (prioritize,
//!    suggest-sprint, breakdown, suggest-assignee, generate-spec), each
//!    with a deterministic fallback.
//!
//! Both services pick their model through one provider cascade: a reachable
//! local Ollama first, then the first cloud provider with an API key.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use devtel::{AppState, Settings, api::routes::chat_router};
//! use std::sync::Arc;
//!
//! let settings = Arc::new(Settings::load(None)?);
//! let state = AppState::new(settings)?;
//! let app = chat_router(state);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Local Ollama inference (default) |
//! | `openai` | OpenAI and compatible APIs: Groq, Together, DeepSeek (default) |
//! | `anthropic` | Claude (default) |
//! | `swagger-ui` | Interactive API docs at `/swagger-ui` |
//!
//! ## Modules
//!
//! - [`agents`] - Personas, intent routing and the tool-using executor
//! - [`api`] - REST handlers and routers for both services
//! - [`auth`] - Service token middleware
//! - [`backend`] - Client for the DevTel agent bridge
//! - [`llm`] - Provider clients and the selection cascade
//! - [`services`] - Chat processing, titles, summaries, insights, telemetry
//! - [`tools`] - Backend tools exposed to agents
//! - [`workflows`] - Structured workflows and their fallbacks
//! - [`types`] - Request/response types and error handling

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Agent personas, intent routing and execution.
pub mod agents;
/// HTTP API handlers and routes.
pub mod api;
/// Service token authentication.
pub mod auth;
/// DevTel backend agent bridge client.
pub mod backend;
/// Command-line interface.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Request-level services.
pub mod services;
/// Backend tools for agents.
pub mod tools;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration and JSON utilities.
pub mod utils;
/// Structured AI workflows.
pub mod workflows;

// Re-export commonly used types
pub use llm::{LLMClient, LLMClientFactoryTrait, Provider, ProviderManager};
pub use tools::registry::ToolRegistry;
pub use types::{AppError, Result};
pub use utils::config::Settings;
pub use workflows::{Workflow, WorkflowService};

use std::sync::Arc;

/// Application state shared across handlers of both services
#[derive(Clone)]
pub struct AppState {
    /// Environment-driven settings
    pub settings: Arc<Settings>,
    /// Provider cascade, used for status endpoints
    pub provider_manager: Arc<ProviderManager>,
    /// Where handlers get LLM clients from. The provider manager in production.
    pub llm_factory: Arc<dyn LLMClientFactoryTrait>,
    /// Shared HTTP client for the backend and cloud providers
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(settings: Arc<Settings>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("devtel-agents/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        let provider_manager = Arc::new(ProviderManager::new(settings.clone(), http.clone()));

        Ok(Self {
            settings,
            llm_factory: provider_manager.clone(),
            provider_manager,
            http,
        })
    }

    /// Replace the LLM source, e.g. with a mock in tests
    pub fn with_llm_factory(mut self, llm_factory: Arc<dyn LLMClientFactoryTrait>) -> Self {
        self.llm_factory = llm_factory;
        self
    }
}
