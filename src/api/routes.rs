use crate::api::handlers::{agents, chat, health, providers, workflows};
use crate::auth::require_service_token;
use crate::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Chat payloads carry the conversation context; keep them bounded
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Body limit, request tracing and permissive CORS, shared by both services
fn with_common_layers(router: Router<AppState>) -> Router<AppState> {
    router.layer(
        ServiceBuilder::new()
            // Outermost: CORS needs a `Default` inner body, which the limit body lacks
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(TraceLayer::new_for_http())
            .layer(cors()),
    )
}

pub fn chat_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health::chat_health))
        .route("/api/chat/process", post(chat::process_message))
        .route("/api/chat/generate-title", post(chat::generate_title))
        .route("/api/agents", get(agents::list_agents))
        .route("/api/agents/analyze", post(agents::analyze))
        .route("/api/agents/summarize", post(agents::summarize))
        .route("/api/agents/{id}", get(agents::get_agent))
        .route("/api/providers", get(providers::list_providers));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", crate::api::ApiDoc::openapi()),
        )
    };

    with_common_layers(router).with_state(state)
}

pub fn workflow_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/workflows/prioritize", post(workflows::prioritize))
        .route("/workflows/suggest-sprint", post(workflows::suggest_sprint))
        .route("/workflows/breakdown", post(workflows::breakdown))
        .route("/workflows/suggest-assignee", post(workflows::suggest_assignee))
        .route("/workflows/generate-spec", post(workflows::generate_spec))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_service_token,
        ));

    let router = Router::new()
        .route("/health", get(health::workflow_health))
        .route("/providers", get(providers::workflow_providers))
        .merge(protected);

    with_common_layers(router).with_state(state)
}
