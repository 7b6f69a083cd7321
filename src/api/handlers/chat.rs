use crate::{
    services::{ChatProcessor, TelemetryEvent, TelemetryReporter, TitleGenerator},
    types::{GenerateTitleRequest, GenerateTitleResponse, ProcessMessageRequest, ProcessMessageResponse},
    AppState,
};
use axum::{extract::State, Json};
use std::time::Instant;

/// Agent name recorded for runs that failed before a persona answered
const FAILED_AGENT_NAME: &str = "chat-agent";

/// Process a chat message through the agent pipeline
///
/// Always answers 200. Failures are reported to the user as a reply so the
/// conversation UI never has to handle an error status.
#[utoipa::path(
    post,
    path = "/api/chat/process",
    request_body = ProcessMessageRequest,
    responses(
        (status = 200, description = "Agent reply", body = ProcessMessageResponse),
        (status = 422, description = "Malformed request body")
    ),
    tag = "chat"
)]
pub async fn process_message(
    State(state): State<AppState>,
    Json(payload): Json<ProcessMessageRequest>,
) -> Json<ProcessMessageResponse> {
    let started = Instant::now();
    let telemetry = TelemetryReporter::new(state.http.clone(), &state.settings);
    let processor = ChatProcessor::from_state(&state);

    match processor.process(&payload).await {
        Ok(response) => {
            let agent = response.agent_id.as_deref().unwrap_or(FAILED_AGENT_NAME);
            telemetry.spawn(
                TelemetryEvent::chat_response(&payload.tenant_id, agent, started.elapsed())
                    .with_tokens(response.tokens_used),
            );
            Json(response)
        }
        Err(e) => {
            tracing::error!(
                conversation_id = %payload.conversation_id,
                error = %e,
                "Chat processing failed"
            );
            telemetry.spawn(
                TelemetryEvent::chat_response(&payload.tenant_id, FAILED_AGENT_NAME, started.elapsed())
                    .failed(e.to_string()),
            );
            Json(ProcessMessageResponse {
                content: format!(
                    "I encountered an error while processing your request: {}\n\nPlease try rephrasing your question.",
                    e
                ),
                agent_id: None,
                proposals: Vec::new(),
                tokens_used: 0,
            })
        }
    }
}

/// Generate a short conversation title from the first message
#[utoipa::path(
    post,
    path = "/api/chat/generate-title",
    request_body = GenerateTitleRequest,
    responses((status = 200, description = "Conversation title", body = GenerateTitleResponse)),
    tag = "chat"
)]
pub async fn generate_title(
    State(state): State<AppState>,
    Json(payload): Json<GenerateTitleRequest>,
) -> Json<GenerateTitleResponse> {
    let title = TitleGenerator::new(state.llm_factory.clone())
        .generate(&payload.message)
        .await;
    Json(GenerateTitleResponse { title })
}
