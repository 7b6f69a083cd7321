use crate::{
    agents::definitions,
    backend::{BackendClient, RequestScope},
    services::{InsightGenerator, Summarizer},
    types::{
        AgentInfo, AnalyzeRequest, AnalyzeResponse, AppError, Result, SummarizeRequest,
        SummarizeResponse,
    },
    AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};

/// Insight runs act on behalf of the service, not a user
const INSIGHT_USER_ID: &str = "system";

/// List the agent personas
#[utoipa::path(
    get,
    path = "/api/agents",
    responses((status = 200, description = "Agent catalog", body = Vec<AgentInfo>)),
    tag = "agents"
)]
pub async fn list_agents() -> Json<Vec<AgentInfo>> {
    Json(definitions::agent_infos())
}

#[utoipa::path(
    get,
    path = "/api/agents/{id}",
    params(("id" = String, Path, description = "Agent id, e.g. product-manager")),
    responses(
        (status = 200, description = "Agent details", body = AgentInfo),
        (status = 404, description = "Unknown agent")
    ),
    tag = "agents"
)]
pub async fn get_agent(Path(id): Path<String>) -> Result<Json<AgentInfo>> {
    definitions::get_agent(&id)
        .map(|agent| Json(agent.info()))
        .map_err(|_| AppError::NotFound(format!("Agent '{}' not found", id)))
}

/// Proactive insights for a project
///
/// Without a project there is nothing to analyze and the list is empty.
#[utoipa::path(
    post,
    path = "/api/agents/analyze",
    request_body = AnalyzeRequest,
    responses((status = 200, description = "Insights found", body = AnalyzeResponse)),
    tag = "agents"
)]
pub async fn analyze(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzeRequest>,
) -> Json<AnalyzeResponse> {
    let Some(project_id) = payload.project_id.as_deref().filter(|p| !p.is_empty()) else {
        return Json(AnalyzeResponse {
            insights: Vec::new(),
        });
    };

    tracing::debug!(
        tenant_id = %payload.tenant_id,
        analysis_type = payload.analysis_type.as_deref().unwrap_or("all"),
        "Analyze request"
    );

    let scope = RequestScope::new(&payload.tenant_id, INSIGHT_USER_ID);
    let backend = BackendClient::new(state.http.clone(), &state.settings, scope);
    let insights = InsightGenerator::new(backend).generate(project_id).await;

    Json(AnalyzeResponse { insights })
}

#[utoipa::path(
    post,
    path = "/api/agents/summarize",
    request_body = SummarizeRequest,
    responses(
        (status = 200, description = "Conversation summary", body = SummarizeResponse),
        (status = 503, description = "No LLM provider available")
    ),
    tag = "agents"
)]
pub async fn summarize(
    State(state): State<AppState>,
    Json(payload): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>> {
    let summary = Summarizer::new(state.llm_factory.clone())
        .summarize(&payload.messages, payload.max_length)
        .await?;
    Ok(Json(SummarizeResponse { summary }))
}
