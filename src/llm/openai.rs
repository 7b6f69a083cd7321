//! OpenAI chat-completions client
//!
//! Also serves Groq, Together and DeepSeek, which expose the same API under a
//! different base URL.

use crate::llm::client::{LLMClient, ModelParams};
use crate::types::{AppError, Result};
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;

pub struct OpenAIClient {
    client: Client<OpenAIConfig>,
    model: String,
    params: ModelParams,
    timeout: Duration,
}

impl OpenAIClient {
    pub fn new(
        api_key: String,
        api_base: String,
        model: String,
        params: ModelParams,
        timeout: Duration,
    ) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);

        Self {
            client: Client::with_config(config),
            model,
            params,
            timeout,
        }
    }

    fn convert_message(role: &str, content: &str) -> ChatCompletionRequestMessage {
        match role {
            "system" => ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(content.to_string()),
                name: None,
            }
            .into(),
            "assistant" =>
            {
                #[allow(deprecated)]
                ChatCompletionRequestAssistantMessage {
                    content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                        content.to_string(),
                    )),
                    name: None,
                    tool_calls: None,
                    function_call: None,
                    refusal: None,
                    audio: None,
                }
                .into()
            }
            _ => ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(content.to_string()),
                name: None,
            }
            .into(),
        }
    }
}

/// Strip key material and provider internals from API errors
fn sanitize_api_error(error: &str) -> String {
    let lower = error.to_lowercase();

    if lower.contains("api key")
        || lower.contains("unauthorized")
        || lower.contains("authentication")
    {
        return "API authentication error. Please check your API key configuration.".to_string();
    }
    if lower.contains("rate limit") || lower.contains("quota") {
        return "API rate limit exceeded. Please try again later.".to_string();
    }

    error.chars().take(300).collect()
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = messages
            .iter()
            .map(|(role, content)| Self::convert_message(role, content))
            .collect();

        let request = CreateChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.params.temperature,
            max_completion_tokens: self.params.max_tokens,
            ..Default::default()
        };

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                AppError::LLM(format!(
                    "Request to {} timed out after {}s",
                    self.model,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| AppError::LLM(sanitize_api_error(&e.to_string())))?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::LLM("No content in completion response".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
