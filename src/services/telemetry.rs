use crate::types::{AppError, Result};
use crate::utils::config::Settings;
use serde::Serialize;
use std::time::Duration;

const TELEMETRY_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of one chat response, as the backend records it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    pub tenant_id: String,
    pub agent_name: String,
    pub task_type: String,
    pub duration_ms: u64,
    pub tokens_used: u32,
    pub success: bool,
    pub error_message: Option<String>,
}

impl TelemetryEvent {
    pub fn chat_response(tenant_id: &str, agent_name: &str, duration: Duration) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            agent_name: agent_name.to_string(),
            task_type: "chat_response".to_string(),
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            tokens_used: 0,
            success: true,
            error_message: None,
        }
    }

    pub fn with_tokens(mut self, tokens_used: u32) -> Self {
        self.tokens_used = tokens_used;
        self
    }

    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error_message = Some(error.into());
        self
    }
}

/// Fire-and-forget reporter for agent run telemetry
#[derive(Clone)]
pub struct TelemetryReporter {
    http: reqwest::Client,
    url: String,
    service_token: String,
}

impl TelemetryReporter {
    pub fn new(http: reqwest::Client, settings: &Settings) -> Self {
        Self {
            http,
            url: format!(
                "{}/api/telemetry/crewai",
                settings.backend_url.trim_end_matches('/')
            ),
            service_token: settings.service_token.clone(),
        }
    }

    pub async fn send(&self, event: &TelemetryEvent) -> Result<()> {
        let response = self
            .http
            .post(&self.url)
            .header("X-Service-Token", &self.service_token)
            .timeout(TELEMETRY_TIMEOUT)
            .json(event)
            .send()
            .await
            .map_err(|e| AppError::Backend {
                message: format!("Telemetry request failed: {}", e),
                status: None,
            })?;

        if !response.status().is_success() {
            return Err(AppError::Backend {
                message: format!("Telemetry rejected with status {}", response.status()),
                status: Some(response.status().as_u16()),
            });
        }
        Ok(())
    }

    /// Send in the background; failures are only logged
    pub fn spawn(&self, event: TelemetryEvent) {
        let reporter = self.clone();
        tokio::spawn(async move {
            if let Err(e) = reporter.send(&event).await {
                tracing::warn!(error = %e, agent = %event.agent_name, "Telemetry logging failed");
            }
        });
    }
}
