use crate::llm::client::{LLMClient, ModelParams};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use ollama_rs::{
    generation::chat::{request::ChatMessageRequest, ChatMessage},
    models::ModelOptions,
    Ollama,
};
use std::time::Duration;

pub struct OllamaClient {
    client: Ollama,
    model: String,
    params: ModelParams,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: String, params: ModelParams, timeout: Duration) -> Result<Self> {
        let client = Ollama::try_new(normalize_base_url(base_url)).map_err(|e| {
            AppError::Configuration(format!("Invalid Ollama URL '{}': {}", base_url, e))
        })?;

        Ok(Self {
            client,
            model,
            params,
            timeout,
        })
    }
}

/// `gpu-box:11434` is accepted as shorthand for `http://gpu-box:11434`
fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String> {
        let chat_messages: Vec<ChatMessage> = messages
            .iter()
            .map(|(role, content)| match role.as_str() {
                "system" => ChatMessage::system(content.clone()),
                "assistant" => ChatMessage::assistant(content.clone()),
                _ => ChatMessage::user(content.clone()),
            })
            .collect();

        let mut request = ChatMessageRequest::new(self.model.clone(), chat_messages);
        if let Some(temperature) = self.params.temperature {
            request = request.options(ModelOptions::default().temperature(temperature));
        }

        let response = tokio::time::timeout(self.timeout, self.client.send_chat_messages(request))
            .await
            .map_err(|_| {
                AppError::LLM(format!(
                    "Ollama request timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| AppError::LLM(format!("Ollama error: {}", e)))?;

        Ok(response.message.content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
