//! Mock LLM clients and factories shared by the integration tests.

use async_trait::async_trait;
use devtel::llm::{LLMClient, LLMClientFactoryTrait, ModelParams};
use devtel::types::{AppError, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock LLM client with canned replies.
///
/// Scripted replies are handed out in order; once they run out the last one
/// repeats. Every message list the client receives is recorded.
#[derive(Clone)]
pub struct MockLLMClient {
    replies: Arc<Mutex<VecDeque<String>>>,
    last: Arc<Mutex<String>>,
    should_fail: bool,
    delay: Option<Duration>,
    pub seen: Arc<Mutex<Vec<Vec<(String, String)>>>>,
}

impl MockLLMClient {
    /// A client that always answers `response`
    pub fn new(response: &str) -> Self {
        Self::scripted(&[response])
    }

    pub fn scripted(replies: &[&str]) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.iter().map(|r| r.to_string()).collect())),
            last: Arc::new(Mutex::new(String::new())),
            should_fail: false,
            delay: None,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A client whose every call fails with an LLM error
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::scripted(&[])
        }
    }

    /// Answer like `self`, but only after `delay`
    pub fn delayed(self, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..self
        }
    }

    pub fn call_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String> {
        self.seen.lock().unwrap().push(messages.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }

        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.replies.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(last.clone())
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Factory handing out clones of one mock client and recording the params
pub struct MockLLMFactory {
    client: MockLLMClient,
    pub params: Mutex<Vec<ModelParams>>,
}

impl MockLLMFactory {
    pub fn new(client: MockLLMClient) -> Arc<Self> {
        Arc::new(Self {
            client,
            params: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LLMClientFactoryTrait for MockLLMFactory {
    async fn create_with_params(&self, params: ModelParams) -> Result<Box<dyn LLMClient>> {
        self.params.lock().unwrap().push(params);
        Ok(Box::new(self.client.clone()))
    }
}

/// Factory behaving like an empty cascade
pub struct UnavailableFactory;

pub const SETUP_MESSAGE: &str = "No LLM provider is configured or available.\n\nInstall Ollama.";

#[async_trait]
impl LLMClientFactoryTrait for UnavailableFactory {
    async fn create_with_params(&self, _params: ModelParams) -> Result<Box<dyn LLMClient>> {
        Err(AppError::ProviderUnavailable(SETUP_MESSAGE.to_string()))
    }
}
