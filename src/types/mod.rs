use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use utoipa::ToSchema;

/// Missing and explicit `null` both mean "empty"
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============= Chat Orchestrator Types =============

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMessageRequest {
    pub conversation_id: String,
    pub message_id: String,
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub context: MessageContext,
    pub user_id: String,
    pub tenant_id: String,
    /// Extra tool groups per agent id, e.g. `{"product-manager": ["git"]}`
    #[serde(default, deserialize_with = "null_as_default")]
    pub agent_tool_sets: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMessageResponse {
    pub content: String,
    pub agent_id: Option<String>,
    pub proposals: Vec<ActionProposal>,
    pub tokens_used: u32,
}

/// Everything the caller knows about the conversation's surroundings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageContext {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub conversation: Value,
    #[serde(default)]
    pub project: Option<ProjectContext>,
    #[serde(default)]
    pub cycle: Option<CycleContext>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub team: Vec<TeamMemberContext>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recent_messages: Vec<RecentMessage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mentioned_entities: Vec<MentionedEntity>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub user: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContext {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CycleContext {
    pub id: Option<String>,
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub metrics: Option<CycleMetrics>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CycleMetrics {
    pub progress_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberContext {
    pub id: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecentMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MentionedEntity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A suggested write action that waits for human approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionProposal {
    pub agent_id: String,
    pub action_type: String,
    #[schema(value_type = Object)]
    pub parameters: Value,
    pub reasoning: String,
    #[schema(value_type = Vec<Object>)]
    pub affected_entities: Vec<Value>,
    pub confidence_score: f32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateTitleRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateTitleResponse {
    pub title: String,
}

// ============= Agent Types =============

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AgentInfo {
    pub id: String,
    pub name: String,
    pub role: String,
    pub description: String,
    pub tools: Vec<String>,
    pub temperature: f32,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub tenant_id: String,
    pub project_id: Option<String>,
    #[serde(rename = "type", default)]
    pub analysis_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeResponse {
    pub insights: Vec<Insight>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InsightSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: String,
    pub category: String,
    pub severity: InsightSeverity,
    pub title: String,
    pub description: String,
    #[schema(value_type = Vec<Object>)]
    pub affected_entities: Vec<Value>,
    pub suggested_actions: Vec<SuggestedAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuggestedAction {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    pub messages: Vec<RecentMessage>,
    #[serde(default = "default_summary_length")]
    pub max_length: usize,
}

fn default_summary_length() -> usize {
    500
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SummarizeResponse {
    pub summary: String,
}

// ============= Provider Types =============

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProviderStatus {
    pub id: String,
    pub name: String,
    pub model: String,
    pub configured: bool,
    pub local: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProvidersResponse {
    pub active: Option<String>,
    pub providers: Vec<ProviderStatus>,
}

// ============= Workflow Types =============

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRequest {
    pub workspace_id: String,
    #[schema(value_type = Object)]
    pub input: Value,
    pub user_id: String,
    #[serde(default)]
    pub job_id: Option<String>,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("LLM error: {0}")]
    LLM(String),

    /// No provider can serve the request; the message carries setup instructions
    #[error("{0}")]
    ProviderUnavailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{message}")]
    Backend { message: String, status: Option<u16> },

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let (status, message) = match self {
            AppError::LLM(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::ProviderUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Configuration(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Backend { message, .. } => (StatusCode::BAD_GATEWAY, message),
            AppError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_process_request_accepts_sparse_context() {
        let raw = serde_json::json!({
            "conversationId": "c1",
            "messageId": "m1",
            "content": "hello",
            "userId": "u1",
            "tenantId": "t1",
            "context": {
                "project": {"name": "Apollo"},
                "mentionedEntities": [{"type": "user", "id": "u2"}]
            }
        });

        let request: ProcessMessageRequest = serde_json::from_value(raw).unwrap();
        assert_eq!(request.context.project.unwrap().name.as_deref(), Some("Apollo"));
        assert_eq!(request.context.mentioned_entities[0].entity_type, "user");
        assert!(request.context.team.is_empty());
        assert!(request.agent_tool_sets.is_empty());
    }

    #[test]
    fn test_process_request_treats_null_as_empty() {
        let raw = serde_json::json!({
            "conversationId": "c1",
            "messageId": "m1",
            "content": "hello",
            "userId": "u1",
            "tenantId": "t1",
            "agentToolSets": null,
            "context": {
                "team": null,
                "recentMessages": null,
                "mentionedEntities": null
            }
        });

        let request: ProcessMessageRequest = serde_json::from_value(raw).unwrap();
        assert!(request.agent_tool_sets.is_empty());
        assert!(request.context.team.is_empty());
        assert!(request.context.recent_messages.is_empty());
        assert!(request.context.mentioned_entities.is_empty());

        let bare = serde_json::json!({
            "conversationId": "c1",
            "messageId": "m1",
            "content": "hello",
            "userId": "u1",
            "tenantId": "t1",
            "context": null
        });
        let request: ProcessMessageRequest = serde_json::from_value(bare).unwrap();
        assert!(request.context.project.is_none());
    }

    #[test]
    fn test_proposal_serializes_camel_case() {
        let proposal = ActionProposal {
            agent_id: "product-manager".to_string(),
            action_type: "create_issue".to_string(),
            parameters: serde_json::json!({}),
            reasoning: "r".to_string(),
            affected_entities: vec![],
            confidence_score: 0.7,
        };
        let value = serde_json::to_value(&proposal).unwrap();
        assert_eq!(value["agentId"], "product-manager");
        assert_eq!(value["actionType"], "create_issue");
        assert!(value.get("confidenceScore").is_some());
    }

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), 404),
            (AppError::InvalidInput("x".into()), 400),
            (AppError::Auth("x".into()), 401),
            (AppError::ProviderUnavailable("x".into()), 503),
            (AppError::Timeout("x".into()), 504),
            (
                AppError::Backend {
                    message: "x".into(),
                    status: Some(500),
                },
                502,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status().as_u16(), expected);
        }
    }
}
