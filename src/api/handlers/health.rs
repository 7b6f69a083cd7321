use crate::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// Workflow service health, including what the cascade resolves to right now
#[derive(Debug, Serialize, ToSchema)]
pub struct WorkflowHealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub configured_provider: String,
    pub active_provider: Option<String>,
    pub model: Option<String>,
    pub ollama_connected: bool,
}

/// Chat orchestrator health check
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "health"
)]
pub async fn chat_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "chat-orchestrator",
    })
}

pub async fn workflow_health(State(state): State<AppState>) -> Json<WorkflowHealthResponse> {
    let manager = &state.provider_manager;
    let (active, ollama_connected) =
        tokio::join!(manager.active_provider(), manager.ollama_available());

    Json(WorkflowHealthResponse {
        status: "healthy",
        service: "devtel-ai",
        configured_provider: state.settings.ai_provider.clone(),
        active_provider: active.as_ref().map(|p| p.kind().id().to_string()),
        model: active.as_ref().map(|p| p.model().to_string()),
        ollama_connected,
    })
}
