//! HTTP API Handlers and Routes
//!
//! Two routers share one [`AppState`](crate::AppState):
//!
//! ## Chat orchestrator
//! - `GET /health` - Liveness
//! - `POST /api/chat/process` - Route a message to an agent and answer it
//! - `POST /api/chat/generate-title` - Short conversation title
//! - `GET /api/agents` - Agent catalog
//! - `GET /api/agents/{id}` - One agent
//! - `POST /api/agents/analyze` - Proactive project insights
//! - `POST /api/agents/summarize` - Conversation summary
//! - `GET /api/providers` - Provider cascade status
//!
//! ## Workflow service
//! - `GET /health` and `GET /providers` - Public status
//! - `POST /workflows/{prioritize,suggest-sprint,breakdown,suggest-assignee,generate-spec}`
//!   - Requires the `X-Service-Token` header
//!
//! # OpenAPI Documentation
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/` on the chat service.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "DevTel Agents", description = "Chat orchestrator and AI workflow service"),
    paths(
        handlers::health::chat_health,
        handlers::chat::process_message,
        handlers::chat::generate_title,
        handlers::agents::list_agents,
        handlers::agents::get_agent,
        handlers::agents::analyze,
        handlers::agents::summarize,
        handlers::providers::list_providers,
        handlers::workflows::prioritize,
        handlers::workflows::suggest_sprint,
        handlers::workflows::breakdown,
        handlers::workflows::suggest_assignee,
        handlers::workflows::generate_spec,
    ),
    components(schemas(
        crate::types::ProcessMessageRequest,
        crate::types::ProcessMessageResponse,
        crate::types::GenerateTitleRequest,
        crate::types::GenerateTitleResponse,
        crate::types::AgentInfo,
        crate::types::AnalyzeRequest,
        crate::types::AnalyzeResponse,
        crate::types::SummarizeRequest,
        crate::types::SummarizeResponse,
        crate::types::ProvidersResponse,
        crate::types::WorkflowRequest,
        handlers::health::HealthResponse,
    )),
    tags(
        (name = "chat", description = "Chat processing"),
        (name = "agents", description = "Agent catalog, insights and summaries"),
        (name = "providers", description = "LLM provider status"),
        (name = "workflows", description = "Structured AI workflows"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;
