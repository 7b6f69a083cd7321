//! Anthropic Claude LLM client implementation
//!
//! Enable with the `anthropic` feature flag.

use crate::llm::client::{LLMClient, ModelParams};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use claude_sdk::{ClaudeClient, ContentBlock, Message, MessagesRequest};
use std::time::Duration;

/// Messages API requires an explicit output budget
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anthropic Claude client for API-based inference
pub struct AnthropicClient {
    client: ClaudeClient,
    model: String,
    params: ModelParams,
    timeout: Duration,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String, params: ModelParams, timeout: Duration) -> Self {
        Self {
            client: ClaudeClient::anthropic(api_key),
            model,
            params,
            timeout,
        }
    }

    fn extract_text_content(content: &[ContentBlock]) -> String {
        content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    fn build_request(&self, messages: Vec<Message>, system: Option<String>) -> MessagesRequest {
        let max_tokens = self.params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
        let mut request = MessagesRequest::new(self.model.clone(), max_tokens, messages);

        if let Some(temp) = self.params.temperature {
            request = request.with_temperature(temp);
        }
        if let Some(sys) = system {
            request = request.with_system(sys);
        }

        request
    }
}

#[async_trait]
impl LLMClient for AnthropicClient {
    async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String> {
        // Claude takes system prompts out-of-band; multiple ones are concatenated
        let mut system_parts: Vec<&str> = Vec::new();
        let claude_messages: Vec<Message> = messages
            .iter()
            .filter_map(|(role, content)| match role.as_str() {
                "system" => {
                    system_parts.push(content);
                    None
                }
                "assistant" => Some(Message::assistant(content.clone())),
                _ => Some(Message::user(content.clone())),
            })
            .collect();

        let system = (!system_parts.is_empty()).then(|| system_parts.join("\n\n"));
        let request = self.build_request(claude_messages, system);

        let response = tokio::time::timeout(self.timeout, self.client.send_message(request))
            .await
            .map_err(|_| {
                AppError::LLM(format!(
                    "Anthropic request timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| AppError::LLM(format!("Anthropic API error: {}", e)))?;

        Ok(Self::extract_text_content(&response.content))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_name() {
        let client = AnthropicClient::new(
            "sk-ant-test".to_string(),
            "claude-3-5-sonnet-20241022".to_string(),
            ModelParams::with_temperature(0.3),
            Duration::from_secs(60),
        );
        assert_eq!(client.model_name(), "claude-3-5-sonnet-20241022");
    }
}
