#![allow(dead_code)]

pub mod mocks;

use devtel::{AppState, LLMClientFactoryTrait, Settings};
use std::sync::Arc;

/// Settings that never reach a real provider or backend
pub fn test_settings() -> Settings {
    Settings {
        ollama_enabled: false,
        backend_url: "http://127.0.0.1:9".to_string(),
        agent_timeout: 5,
        ..Settings::default()
    }
}

pub fn test_state(settings: Settings, factory: Arc<dyn LLMClientFactoryTrait>) -> AppState {
    AppState::new(Arc::new(settings))
        .expect("Failed to build app state")
        .with_llm_factory(factory)
}
