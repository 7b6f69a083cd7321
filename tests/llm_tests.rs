//! Provider cascade and HTTP provider clients against a mock server

use devtel::llm::{LLMClientFactoryTrait, ModelParams, ProviderKind, ProviderManager};
use devtel::{AppError, Settings};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use reqwest::header::{HeaderMap, HeaderValue};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn manager(settings: Settings) -> ProviderManager {
    ProviderManager::new(Arc::new(settings), reqwest::Client::new())
}

async fn ollama_server(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "models": [] })))
        .mount(&server)
        .await;
    server
}

// ============= Cascade =============

#[tokio::test]
async fn test_reachable_ollama_wins_over_cloud() {
    let ollama = ollama_server(200).await;
    let m = manager(Settings {
        ollama_enabled: true,
        ollama_url: ollama.uri(),
        openai_api_key: Some("sk-test".to_string()),
        ..Settings::default()
    });

    assert!(m.ollama_available().await);
    let provider = m.resolve(ModelParams::default()).await.unwrap();
    assert_eq!(provider.kind(), ProviderKind::Ollama);
    assert_eq!(provider.model(), "llama3.2:3b");

    let statuses = m.statuses().await;
    assert!(statuses[0].configured);
}

#[tokio::test]
async fn test_unhealthy_ollama_falls_through_to_cloud() {
    let ollama = ollama_server(500).await;
    let m = manager(Settings {
        ollama_enabled: true,
        ollama_url: ollama.uri(),
        openai_api_key: Some("sk-test".to_string()),
        ..Settings::default()
    });

    assert!(!m.ollama_available().await);
    let provider = m.resolve(ModelParams::default()).await.unwrap();
    assert_eq!(provider.kind(), ProviderKind::OpenAI);
}

#[tokio::test]
async fn test_ollama_probe_requires_200() {
    let ollama = ollama_server(204).await;
    let m = manager(Settings {
        ollama_enabled: true,
        ollama_url: ollama.uri(),
        anthropic_api_key: Some("sk-ant".to_string()),
        ..Settings::default()
    });

    assert!(!m.ollama_available().await);
    let provider = m.resolve(ModelParams::default()).await.unwrap();
    assert_eq!(provider.kind(), ProviderKind::Anthropic);
}

#[tokio::test]
async fn test_slow_ollama_probe_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(4)))
        .mount(&server)
        .await;

    let m = manager(Settings {
        ollama_enabled: true,
        ollama_url: server.uri(),
        deepseek_api_key: Some("ds-test".to_string()),
        ..Settings::default()
    });

    let provider = m.resolve(ModelParams::default()).await.unwrap();
    assert_eq!(provider.kind(), ProviderKind::DeepSeek);
}

#[tokio::test]
async fn test_disabled_ollama_is_never_probed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let m = manager(Settings {
        ollama_enabled: false,
        ollama_url: server.uri(),
        ..Settings::default()
    });

    assert!(!m.ollama_available().await);
    let err = m.resolve(ModelParams::default()).await.unwrap_err();
    assert!(matches!(err, AppError::ProviderUnavailable(_)));
    assert!(err.to_string().contains("❌ Ollama (Local): Not configured"));
}

// ============= Gemini =============

fn gemini_settings(server: &MockServer) -> Settings {
    Settings {
        ollama_enabled: false,
        google_ai_api_key: Some("g-key".to_string()),
        google_ai_api_base: server.uri(),
        ..Settings::default()
    }
}

#[tokio::test]
async fn test_gemini_generate_through_cascade() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash-exp:generateContent"))
        .and(query_param("key", "g-key"))
        .and(body_partial_json(json!({
            "systemInstruction": { "parts": [{ "text": "Be brief." }] },
            "contents": [{ "role": "user", "parts": [{ "text": "Status?" }] }],
            "generationConfig": { "temperature": 0.5 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "All " }, { "text": "green." }] }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let m = manager(gemini_settings(&server));
    let client = m
        .create_with_params(ModelParams::with_temperature(0.5))
        .await
        .unwrap();
    assert_eq!(client.model_name(), "gemini-2.0-flash-exp");

    let reply = client.generate_with_system("Be brief.", "Status?").await.unwrap();
    assert_eq!(reply, "All green.");
}

#[tokio::test]
async fn test_gemini_http_error_is_llm_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = manager(gemini_settings(&server)).create_default().await.unwrap();
    let err = client.generate("hi").await.unwrap_err();
    assert!(matches!(err, AppError::LLM(ref msg) if msg.contains("429")));
}

#[tokio::test]
async fn test_gemini_without_candidates_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let client = manager(gemini_settings(&server)).create_default().await.unwrap();
    assert!(client.generate("hi").await.is_err());
}

#[tokio::test]
async fn test_gemini_uses_shared_http_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash-exp:generateContent"))
        .and(header("x-devtel-client", "shared"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut headers = HeaderMap::new();
    headers.insert("x-devtel-client", HeaderValue::from_static("shared"));
    let http = reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .unwrap();
    let m = ProviderManager::new(Arc::new(gemini_settings(&server)), http);

    let client = m.create_default().await.unwrap();
    assert_eq!(client.generate("ping").await.unwrap(), "ok");
}
