use crate::types::{AppError, Result};
use crate::utils::config::Settings;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

const BACKEND_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Who a backend call is made on behalf of
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestScope {
    pub tenant_id: String,
    pub user_id: String,
    pub conversation_id: Option<String>,
    pub agent_id: Option<String>,
}

impl RequestScope {
    pub fn new(tenant_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            conversation_id: None,
            agent_id: None,
        }
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    fn to_body(&self) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("tenantId".to_string(), Value::from(self.tenant_id.clone()));
        body.insert("userId".to_string(), Value::from(self.user_id.clone()));
        body.insert(
            "conversationId".to_string(),
            self.conversation_id.clone().map_or(Value::Null, Value::from),
        );
        body.insert(
            "agentId".to_string(),
            self.agent_id.clone().map_or(Value::Null, Value::from),
        );
        body
    }
}

/// Exponential backoff for transient transport failures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Same attempt budget, no waiting between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay after the given failed attempt (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// A write the backend should hold for human approval
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDraft {
    pub action_type: String,
    pub parameters: Value,
    pub reasoning: String,
    pub affected_entities: Vec<Value>,
    pub confidence_score: f32,
}

impl ProposalDraft {
    pub fn new(action_type: &str, parameters: Value, reasoning: impl Into<String>) -> Self {
        Self {
            action_type: action_type.to_string(),
            parameters,
            reasoning: reasoning.into(),
            affected_entities: Vec::new(),
            confidence_score: 0.9,
        }
    }
}

enum CallFailure {
    Transient(AppError),
    Fatal(AppError),
}

/// Client for the backend's agent bridge
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    service_token: String,
    scope: RequestScope,
    retry: RetryPolicy,
    timeout: Duration,
}

impl BackendClient {
    pub fn new(http: reqwest::Client, settings: &Settings, scope: RequestScope) -> Self {
        Self {
            http,
            base_url: settings.agent_bridge_url(),
            service_token: settings.service_token.clone(),
            scope,
            retry: RetryPolicy::default(),
            timeout: BACKEND_REQUEST_TIMEOUT,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn scope(&self) -> &RequestScope {
        &self.scope
    }

    /// POST `params` to `endpoint`, merged over the request scope.
    ///
    /// Connection failures and timeouts are retried per the retry policy;
    /// HTTP error statuses are not.
    pub async fn call_tool(&self, endpoint: &str, params: Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut body = self.scope.to_body();
        if let Value::Object(extra) = params {
            body.extend(extra);
        }
        let body = Value::Object(body);

        let attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.call_once(&url, &body).await {
                Ok(value) => return Ok(value),
                Err(CallFailure::Fatal(e)) => return Err(e),
                Err(CallFailure::Transient(e)) if attempt < attempts => {
                    let delay = self.retry.backoff(attempt);
                    tracing::warn!(
                        endpoint,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Backend call failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(CallFailure::Transient(e)) => return Err(e),
            }
        }
    }

    async fn call_once(&self, url: &str, body: &Value) -> std::result::Result<Value, CallFailure> {
        let response = self
            .http
            .post(url)
            .header("X-Service-Token", &self.service_token)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CallFailure::Transient(backend_error("Backend request timed out", None))
                } else if e.is_connect() {
                    CallFailure::Transient(backend_error(
                        "Unable to connect to backend service",
                        None,
                    ))
                } else {
                    CallFailure::Fatal(backend_error(&format!("Backend request failed: {}", e), None))
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                CallFailure::Transient(backend_error("Backend request timed out", None))
            } else {
                CallFailure::Fatal(backend_error(&format!("Backend read failed: {}", e), None))
            }
        })?;

        let code = Some(status.as_u16());
        match status.as_u16() {
            200..=299 => {
                let value: Value = serde_json::from_str(&text).map_err(|_| {
                    CallFailure::Fatal(backend_error("Backend returned invalid JSON", code))
                })?;
                Ok(match value {
                    Value::Object(mut map) if map.contains_key("data") => {
                        map.remove("data").unwrap_or(Value::Null)
                    }
                    other => other,
                })
            }
            400 => {
                let message = serde_json::from_str::<Value>(&text)
                    .ok()
                    .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                    .unwrap_or_else(|| "Invalid request".to_string());
                Err(CallFailure::Fatal(backend_error(&message, code)))
            }
            401 => Err(CallFailure::Fatal(backend_error(
                "Authentication failed - invalid service token",
                code,
            ))),
            404 => Err(CallFailure::Fatal(backend_error("Resource not found", code))),
            _ => Err(CallFailure::Fatal(backend_error(
                &format!("Backend error: {}", text),
                code,
            ))),
        }
    }

    /// Record a proposal instead of performing the write.
    pub async fn propose(&self, draft: ProposalDraft) -> Result<String> {
        let params = serde_json::to_value(&draft)
            .map_err(|e| AppError::Internal(format!("Unserializable proposal: {}", e)))?;
        let created = self.call_tool("/proposals/create", params).await?;

        let proposal_id = created
            .get("id")
            .or_else(|| created.get("proposalId"))
            .and_then(|id| match id {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| "unknown".to_string());

        Ok(format!(
            "Action proposed: {}. [PROPOSAL_ID:{}]",
            draft.action_type, proposal_id
        ))
    }
}

fn backend_error(message: &str, status: Option<u16>) -> AppError {
    AppError::Backend {
        message: message.to_string(),
        status,
    }
}
