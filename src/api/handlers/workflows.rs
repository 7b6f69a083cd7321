//! DevTel AI workflow endpoints
//!
//! Every route takes `{workspaceId, input, userId, jobId?}` and answers 200
//! with the workflow result. Model failures are absorbed by the fallbacks.

use crate::{
    types::WorkflowRequest,
    workflows::{Workflow, WorkflowService},
    AppState,
};
use axum::{extract::State, Json};
use serde_json::Value;
use std::time::Instant;

async fn run(state: &AppState, workflow: Workflow, payload: &WorkflowRequest) -> Json<Value> {
    let started = Instant::now();
    tracing::info!(
        workflow = %workflow,
        workspace_id = %payload.workspace_id,
        job_id = payload.job_id.as_deref().unwrap_or("-"),
        "Running workflow"
    );

    let result = WorkflowService::new(state.llm_factory.clone())
        .run(workflow, &payload.input)
        .await;

    tracing::info!(
        workflow = %workflow,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Workflow finished"
    );
    Json(result)
}

#[utoipa::path(
    post,
    path = "/workflows/prioritize",
    request_body = WorkflowRequest,
    responses(
        (status = 200, description = "Issues in priority order"),
        (status = 401, description = "Invalid service token")
    ),
    tag = "workflows"
)]
pub async fn prioritize(State(state): State<AppState>, Json(payload): Json<WorkflowRequest>) -> Json<Value> {
    run(&state, Workflow::Prioritize, &payload).await
}

#[utoipa::path(
    post,
    path = "/workflows/suggest-sprint",
    request_body = WorkflowRequest,
    responses(
        (status = 200, description = "Backlog items that fit the sprint"),
        (status = 401, description = "Invalid service token")
    ),
    tag = "workflows"
)]
pub async fn suggest_sprint(State(state): State<AppState>, Json(payload): Json<WorkflowRequest>) -> Json<Value> {
    run(&state, Workflow::SuggestSprint, &payload).await
}

#[utoipa::path(
    post,
    path = "/workflows/breakdown",
    request_body = WorkflowRequest,
    responses(
        (status = 200, description = "Subtasks for the issue"),
        (status = 401, description = "Invalid service token")
    ),
    tag = "workflows"
)]
pub async fn breakdown(State(state): State<AppState>, Json(payload): Json<WorkflowRequest>) -> Json<Value> {
    run(&state, Workflow::Breakdown, &payload).await
}

#[utoipa::path(
    post,
    path = "/workflows/suggest-assignee",
    request_body = WorkflowRequest,
    responses(
        (status = 200, description = "Ranked assignee suggestions"),
        (status = 401, description = "Invalid service token")
    ),
    tag = "workflows"
)]
pub async fn suggest_assignee(State(state): State<AppState>, Json(payload): Json<WorkflowRequest>) -> Json<Value> {
    run(&state, Workflow::SuggestAssignee, &payload).await
}

#[utoipa::path(
    post,
    path = "/workflows/generate-spec",
    request_body = WorkflowRequest,
    responses(
        (status = 200, description = "PRD document"),
        (status = 401, description = "Invalid service token")
    ),
    tag = "workflows"
)]
pub async fn generate_spec(State(state): State<AppState>, Json(payload): Json<WorkflowRequest>) -> Json<Value> {
    run(&state, Workflow::GenerateSpec, &payload).await
}
