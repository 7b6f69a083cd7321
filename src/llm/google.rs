//! Google Gemini client over the public `generateContent` REST endpoint

use crate::llm::client::{LLMClient, ModelParams};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct GoogleClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    params: ModelParams,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: GeminiContent,
}

impl GoogleClient {
    pub fn new(
        http: reqwest::Client,
        api_key: String,
        api_base: String,
        model: String,
        params: ModelParams,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
            params,
            timeout,
        }
    }

    fn build_request(&self, messages: &[(String, String)]) -> GeminiRequest {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for (role, content) in messages {
            let part = GeminiPart {
                text: Some(content.clone()),
            };
            match role.as_str() {
                "system" => system_parts.push(part),
                "assistant" => contents.push(GeminiContent {
                    role: Some("model".to_string()),
                    parts: vec![part],
                }),
                _ => contents.push(GeminiContent {
                    role: Some("user".to_string()),
                    parts: vec![part],
                }),
            }
        }

        let generation_config = (self.params.temperature.is_some()
            || self.params.max_tokens.is_some())
        .then(|| GenerationConfig {
            temperature: self.params.temperature,
            max_output_tokens: self.params.max_tokens,
        });

        GeminiRequest {
            contents,
            system_instruction: (!system_parts.is_empty()).then(|| GeminiContent {
                role: None,
                parts: system_parts,
            }),
            generation_config,
        }
    }
}

#[async_trait]
impl LLMClient for GoogleClient {
    async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String> {
        // Don't log this URL, it carries the key
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .json(&self.build_request(messages))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::LLM("Gemini request timed out".to_string())
                } else {
                    AppError::LLM("Gemini request failed to connect".to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Gemini API error response");
            return Err(AppError::LLM(format!("Gemini API error: HTTP {}", status)));
        }

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Invalid Gemini response: {}", e)))?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| AppError::LLM("Gemini returned no candidates".to_string()))?;

        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(params: ModelParams) -> GoogleClient {
        GoogleClient::new(
            reqwest::Client::new(),
            "key".to_string(),
            "https://example.test/v1beta/".to_string(),
            "gemini-2.0-flash-exp".to_string(),
            params,
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_request_maps_roles() {
        let request = client(ModelParams::with_temperature(0.4)).build_request(&[
            ("system".to_string(), "be brief".to_string()),
            ("user".to_string(), "hi".to_string()),
            ("assistant".to_string(), "hello".to_string()),
        ]);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert!((json["generationConfig"]["temperature"].as_f64().unwrap() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_request_omits_empty_config() {
        let request =
            client(ModelParams::default()).build_request(&[("user".to_string(), "hi".to_string())]);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("generationConfig").is_none());
        assert!(json.get("systemInstruction").is_none());
    }
}
