//! Chat orchestrator HTTP tests
//!
//! The router runs in-process through `axum-test`; LLM calls go to mocks and
//! backend calls to a `wiremock` server.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::mocks::{MockLLMClient, MockLLMFactory, UnavailableFactory, SETUP_MESSAGE};
use common::{test_settings, test_state};
use devtel::api::routes::chat_router;
use devtel::{LLMClientFactoryTrait, Settings};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn server_with(settings: Settings, factory: Arc<dyn LLMClientFactoryTrait>) -> TestServer {
    TestServer::new(chat_router(test_state(settings, factory))).expect("Failed to create test server")
}

fn server(factory: Arc<dyn LLMClientFactoryTrait>) -> TestServer {
    server_with(test_settings(), factory)
}

fn chat_request(content: &str) -> Value {
    json!({
        "conversationId": "conv-1",
        "messageId": "msg-1",
        "content": content,
        "userId": "user-1",
        "tenantId": "tenant-1",
        "context": {
            "project": { "id": "proj-1", "name": "Apollo", "key": "APL" },
            "recentMessages": [
                { "role": "user", "content": "Hi" },
                { "role": "assistant", "content": "Hello! How can I help?" }
            ]
        }
    })
}

// ============= Health =============

#[tokio::test]
async fn test_health_check() {
    let server = server(Arc::new(UnavailableFactory));

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "healthy", "service": "chat-orchestrator" }));
}

#[tokio::test]
async fn test_cors_headers_are_sent() {
    let server = server(Arc::new(UnavailableFactory));

    let response = server
        .get("/health")
        .add_header("Origin", "http://localhost:3000")
        .await;
    response.assert_status_ok();
    assert_eq!(response.header("access-control-allow-origin"), "*");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let server = server(MockLLMFactory::new(MockLLMClient::new("Final Answer: unused")));

    let response = server
        .post("/api/chat/process")
        .json(&chat_request(&"x".repeat(3 * 1024 * 1024)))
        .await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

// ============= Agents =============

#[tokio::test]
async fn test_list_agents() {
    let server = server(Arc::new(UnavailableFactory));

    let response = server.get("/api/agents").await;
    response.assert_status_ok();
    let agents: Vec<Value> = response.json();
    assert_eq!(agents.len(), 5);
    let ids: Vec<&str> = agents.iter().map(|a| a["id"].as_str().unwrap()).collect();
    for id in [
        "product-manager",
        "spec-writer",
        "standup-assistant",
        "capacity-planner",
        "issue-breakdown",
    ] {
        assert!(ids.contains(&id), "missing agent {}", id);
    }
    assert!(agents.iter().all(|a| a["status"] == "idle"));
}

#[tokio::test]
async fn test_get_agent() {
    let server = server(Arc::new(UnavailableFactory));

    let response = server.get("/api/agents/capacity-planner").await;
    response.assert_status_ok();
    let agent: Value = response.json();
    assert_eq!(agent["name"], "Capacity Planner");
    assert!(agent["tools"]
        .as_array()
        .unwrap()
        .iter()
        .any(|t| t == "check_overallocation"));
}

#[tokio::test]
async fn test_get_unknown_agent_is_404() {
    let server = server(Arc::new(UnavailableFactory));

    let response = server.get("/api/agents/accountant").await;
    response.assert_status_not_found();
    response.assert_json(&json!({ "error": "Agent 'accountant' not found" }));
}

// ============= Chat processing =============

#[tokio::test]
async fn test_process_message_returns_agent_answer() {
    let client = MockLLMClient::new(
        "Thought: I know enough.\nFinal Answer: The sprint is on track. I recommend creating a follow-up issue for the flaky login test.",
    );
    let factory = MockLLMFactory::new(client.clone());
    let server = server(factory.clone());

    let response = server
        .post("/api/chat/process")
        .json(&chat_request("How is the current sprint going?"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["agentId"], "product-manager");
    assert!(body["content"]
        .as_str()
        .unwrap()
        .starts_with("The sprint is on track."));
    assert_eq!(body["proposals"][0]["actionType"], "create_issue");
    assert_eq!(body["proposals"][0]["agentId"], "product-manager");
    assert!(body["tokensUsed"].as_u64().unwrap() > 0);

    // The product manager runs at its own temperature
    let params = factory.params.lock().unwrap();
    assert_eq!(params[0].temperature, Some(0.3));

    // Recent messages reach the model
    let seen = client.seen.lock().unwrap();
    let task = &seen[0][1].1;
    assert!(task.contains("How is the current sprint going?"));
    assert!(task.contains("Hello! How can I help?"));
}

#[tokio::test]
async fn test_capacity_question_routes_to_capacity_planner() {
    let server = server(MockLLMFactory::new(MockLLMClient::new("Final Answer: Ana has room.")));

    let response = server
        .post("/api/chat/process")
        .json(&chat_request("Who has capacity for more work?"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["agentId"], "capacity-planner");
    assert_eq!(body["content"], "Ana has room.");
    assert_eq!(body["proposals"], json!([]));
}

#[tokio::test]
async fn test_process_accepts_null_collections() {
    let server = server(MockLLMFactory::new(MockLLMClient::new("Final Answer: Done.")));

    let mut request = chat_request("Who has capacity for more work?");
    request["agentToolSets"] = Value::Null;
    request["context"]["recentMessages"] = Value::Null;

    let response = server.post("/api/chat/process").json(&request).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["content"], "Done.");
}

#[tokio::test]
async fn test_process_without_provider_returns_setup_instructions() {
    let server = server(Arc::new(UnavailableFactory));

    let response = server
        .post("/api/chat/process")
        .json(&chat_request("What should I work on?"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["agentId"], "system");
    assert_eq!(body["content"], SETUP_MESSAGE);
    assert_eq!(body["tokensUsed"], 0);
}

#[tokio::test]
async fn test_process_failure_becomes_apology() {
    let server = server(MockLLMFactory::new(MockLLMClient::failing()));

    let response = server
        .post("/api/chat/process")
        .json(&chat_request("Break down the login feature"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let content = body["content"].as_str().unwrap();
    assert!(content.starts_with("I encountered an error while processing your request:"));
    assert!(content.contains("Mock LLM failure"));
    assert!(content.ends_with("Please try rephrasing your question."));
    assert!(body["agentId"].is_null());
    assert_eq!(body["tokensUsed"], 0);
}

#[tokio::test]
async fn test_process_slow_agent_times_out_with_apology() {
    let settings = Settings {
        agent_timeout: 1,
        ..test_settings()
    };
    let slow = MockLLMClient::new("Final Answer: too late").delayed(Duration::from_secs(3));
    let server = server_with(settings, MockLLMFactory::new(slow));

    let started = Instant::now();
    let response = server
        .post("/api/chat/process")
        .json(&chat_request("Break down the login feature"))
        .await;

    assert!(started.elapsed() < Duration::from_secs(3));
    response.assert_status_ok();
    let body: Value = response.json();
    let content = body["content"].as_str().unwrap();
    assert!(content.starts_with("I encountered an error while processing your request:"));
    assert!(content.contains("Agent took too long (>1s)"));
    assert!(body["agentId"].is_null());
    assert_eq!(body["tokensUsed"], 0);
}

#[tokio::test]
async fn test_process_runs_backend_tool() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/agent-bridge/issues/search"))
        .and(header("X-Service-Token", "dev-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "issues": [
                { "id": "issue-123456789", "title": "Fix login", "priority": "high", "status": "todo" }
            ]}
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let client = MockLLMClient::scripted(&[
        "Thought: I should look at the open issues.\nAction: search_issues\nAction Input: {\"status\": \"todo\"}",
        "Final Answer: Start with Fix login.",
    ]);
    let settings = Settings {
        backend_url: backend.uri(),
        ..test_settings()
    };
    let server = server_with(settings, MockLLMFactory::new(client.clone()));

    let response = server
        .post("/api/chat/process")
        .json(&chat_request("Which issues are open?"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["content"], "Start with Fix login.");

    let seen = client.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    let observation = &seen[1].last().unwrap().1;
    assert!(observation.starts_with("Observation: Found 1 issues:"));
    assert!(observation.contains("[HIGH] Fix login"));
}

#[tokio::test]
async fn test_malformed_process_request_is_rejected() {
    let server = server(Arc::new(UnavailableFactory));

    let response = server
        .post("/api/chat/process")
        .json(&json!({ "content": "missing ids" }))
        .await;

    assert!(response.status_code().is_client_error());
}

// ============= Titles =============

#[tokio::test]
async fn test_generate_title() {
    let factory = MockLLMFactory::new(MockLLMClient::new("Title: \"Sprint Capacity Review\""));
    let server = server(factory.clone());

    let response = server
        .post("/api/chat/generate-title")
        .json(&json!({ "message": "Can you check whether the team can take on more work this sprint?" }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "title": "Sprint Capacity Review" }));
    assert_eq!(factory.params.lock().unwrap()[0].temperature, Some(0.3));
}

#[tokio::test]
async fn test_generate_title_falls_back_to_message() {
    let server = server(Arc::new(UnavailableFactory));
    let message = "Please help me plan the next sprint for the mobile team and the web team";

    let response = server
        .post("/api/chat/generate-title")
        .json(&json!({ "message": message }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["title"], format!("{}...", &message[..50]));
}

// ============= Summaries =============

#[tokio::test]
async fn test_summarize() {
    let client = MockLLMClient::new("  The team agreed to ship on Friday.  ");
    let server = server(MockLLMFactory::new(client.clone()));

    let response = server
        .post("/api/agents/summarize")
        .json(&json!({
            "messages": [
                { "role": "user", "content": "Can we ship Friday?" },
                { "role": "assistant", "content": "Yes, if QA finishes Thursday." }
            ],
            "maxLength": 200
        }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "summary": "The team agreed to ship on Friday." }));

    let seen = client.seen.lock().unwrap();
    let prompt = &seen[0][1].1;
    assert!(prompt.contains("under 200 characters"));
    assert!(prompt.contains("USER: Can we ship Friday?"));
}

#[tokio::test]
async fn test_summarize_without_provider_is_503() {
    let server = server(Arc::new(UnavailableFactory));

    let response = server
        .post("/api/agents/summarize")
        .json(&json!({ "messages": [] }))
        .await;

    response.assert_status_service_unavailable();
    let body: Value = response.json();
    assert_eq!(body["error"], SETUP_MESSAGE);
}

// ============= Insights =============

#[tokio::test]
async fn test_analyze_without_project_is_empty() {
    let server = server(Arc::new(UnavailableFactory));

    let response = server
        .post("/api/agents/analyze")
        .json(&json!({ "tenantId": "tenant-1" }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "insights": [] }));
}

#[tokio::test]
async fn test_analyze_reports_capacity_and_survives_sprint_failure() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/agent-bridge/capacity/overview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "team": { "utilizationPercent": 96 },
                "warnings": [
                    { "severity": "critical", "message": "Ana is at 150% capacity", "userId": "u-ana" }
                ]
            }
        })))
        .mount(&backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/agent-bridge/cycles/get-active"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&backend)
        .await;

    let settings = Settings {
        backend_url: backend.uri(),
        ..test_settings()
    };
    let server = server_with(settings, Arc::new(UnavailableFactory));

    let response = server
        .post("/api/agents/analyze")
        .json(&json!({ "tenantId": "tenant-1", "projectId": "proj-1" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let insights = body["insights"].as_array().unwrap();
    assert_eq!(insights.len(), 2);
    assert_eq!(insights[0]["title"], "Team nearing capacity limit");
    assert_eq!(insights[0]["severity"], "high");
    assert_eq!(insights[1]["severity"], "critical");
    assert_eq!(insights[1]["affectedEntities"][0]["id"], "u-ana");
    assert!(insights[0]["suggestedActions"].as_array().is_some());
}

// ============= Providers =============

#[tokio::test]
async fn test_providers_with_nothing_configured() {
    let server = server(Arc::new(UnavailableFactory));

    let response = server.get("/api/providers").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["active"].is_null());
    let providers = body["providers"].as_array().unwrap();
    assert_eq!(providers.len(), 7);
    assert_eq!(providers[0]["id"], "ollama");
    assert!(providers.iter().all(|p| p["configured"] == false));
}

#[tokio::test]
async fn test_providers_reports_keyed_cloud_provider() {
    let settings = Settings {
        groq_api_key: Some("gsk-test".to_string()),
        ..test_settings()
    };
    let server = server_with(settings, Arc::new(UnavailableFactory));

    let response = server.get("/api/providers").await;
    let body: Value = response.json();
    assert_eq!(body["active"], "groq");
    let groq = body["providers"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == "groq")
        .unwrap();
    assert_eq!(groq["configured"], true);
    assert_eq!(groq["local"], false);
}
