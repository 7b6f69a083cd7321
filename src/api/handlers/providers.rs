use crate::{
    llm::{ModelParams, ProviderKind},
    types::ProvidersResponse,
    AppState,
};
use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

/// Cascade status for the chat orchestrator
#[utoipa::path(
    get,
    path = "/api/providers",
    responses((status = 200, description = "Provider cascade status", body = ProvidersResponse)),
    tag = "providers"
)]
pub async fn list_providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
    let manager = &state.provider_manager;
    let (active, providers) = tokio::join!(manager.active_provider(), manager.statuses());

    Json(ProvidersResponse {
        active: active.map(|p| p.kind().id().to_string()),
        providers,
    })
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailableProvider {
    pub name: String,
    pub model: String,
    #[serde(rename = "type")]
    pub provider_type: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WorkflowProvidersResponse {
    pub configured: String,
    pub active: Option<String>,
    pub ollama_enabled: bool,
    pub available: Vec<AvailableProvider>,
}

/// Providers the workflow service could use: enabled Ollama and keyed clouds
pub async fn workflow_providers(State(state): State<AppState>) -> Json<WorkflowProvidersResponse> {
    let manager = &state.provider_manager;
    let available = ProviderKind::ALL
        .iter()
        .filter_map(|&kind| manager.provider_for(kind, ModelParams::default()))
        .map(|provider| AvailableProvider {
            name: provider.kind().id().to_string(),
            model: provider.model().to_string(),
            provider_type: if provider.kind().is_local() { "local" } else { "cloud" },
        })
        .collect();

    let active = manager.active_provider().await;

    Json(WorkflowProvidersResponse {
        configured: state.settings.ai_provider.clone(),
        active: active.map(|p| p.kind().id().to_string()),
        ollama_enabled: state.settings.ollama_enabled,
        available,
    })
}
