//! HTTP surface integration tests
//!
//! Spins up the real axum app on an ephemeral port, backed by a mock LLM
//! server, and drives it with a plain reqwest client.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aftercare_engine::config::{GeminiConfig, SearchConfig};
use aftercare_engine::llm::gemini::GeminiProvider;
use aftercare_engine::records::{DischargeRecord, RecordStore};
use aftercare_engine::reference::ReferenceClient;
use aftercare_engine::router::ConversationRouter;
use aftercare_engine::search::SearchClient;
use aftercare_engine::secrets::SecretString;
use aftercare_engine::server::{app, AppState, ChatResponse};
use aftercare_engine::session::InMemorySessionStore;

fn sample_record() -> DischargeRecord {
    DischargeRecord {
        patient_name: "Maria Garcia".to_string(),
        discharge_date: "2024-05-12".to_string(),
        primary_diagnosis: "Acute kidney injury, resolved".to_string(),
        medications: vec!["Amlodipine 5mg".to_string()],
        dietary_restrictions: "Low potassium".to_string(),
    }
}

/// Start the app against a mock LLM and return its base URL.
async fn spawn_app(gemini: &MockServer) -> String {
    let provider = Arc::new(GeminiProvider::new(
        GeminiConfig {
            base_url: gemini.uri(),
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.7,
        },
        SecretString::from("test-key"),
    ));

    let router = Arc::new(ConversationRouter::new(
        provider,
        Arc::new(RecordStore::from_records(vec![sample_record()])),
        Arc::new(ReferenceClient::disabled()),
        Arc::new(SearchClient::new(&SearchConfig {
            base_url: gemini.uri(),
        })),
    ));

    let state = AppState {
        router,
        sessions: Arc::new(InMemorySessionStore::new(Duration::from_secs(3600))),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr: SocketAddr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.expect("server run");
    });

    format!("http://{addr}")
}

async fn post_chat(client: &reqwest::Client, base: &str, session: &str, message: &str) -> ChatResponse {
    client
        .post(format!("{base}/chat"))
        .json(&json!({"message": message, "session_id": session}))
        .send()
        .await
        .expect("chat request")
        .json()
        .await
        .expect("chat response body")
}

#[tokio::test]
async fn test_chat_flow_from_name_to_answer() {
    let gemini = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Front-desk answer."}]}}
            ]
        })))
        .mount(&gemini)
        .await;

    let base = spawn_app(&gemini).await;
    let client = reqwest::Client::new();

    let greeting = post_chat(&client, &base, "s1", "Maria Garcia").await;
    assert!(greeting.response.contains("Hi Maria Garcia!"));
    assert_eq!(greeting.patient_name, "Maria Garcia");
    assert!(greeting.has_discharge_report);

    let answer = post_chat(&client, &base, "s1", "Please mail me a copy of my records.").await;
    assert_eq!(answer.response, "Front-desk answer.");
    assert!(answer.has_discharge_report);
    assert!(!answer.timestamp.is_empty());
}

#[tokio::test]
async fn test_sessions_are_isolated_by_id() {
    let gemini = MockServer::start().await;
    let base = spawn_app(&gemini).await;
    let client = reqwest::Client::new();

    let first = post_chat(&client, &base, "alpha", "Maria Garcia").await;
    assert!(first.has_discharge_report);

    // A fresh session starts back at the name prompt.
    let second = post_chat(&client, &base, "beta", "hello").await;
    assert!(!second.has_discharge_report);
    assert!(second.response.contains("full name"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let gemini = MockServer::start().await;
    let base = spawn_app(&gemini).await;

    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .expect("health request")
        .json()
        .await
        .expect("health body");

    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_logs_endpoint_reports_session_activity() {
    let gemini = MockServer::start().await;
    let base = spawn_app(&gemini).await;
    let client = reqwest::Client::new();

    post_chat(&client, &base, "audit", "Maria Garcia").await;

    let body: Value = client
        .get(format!("{base}/logs/audit"))
        .send()
        .await
        .expect("logs request")
        .json()
        .await
        .expect("logs body");

    let logs = body["logs"].as_array().expect("logs array");
    assert_eq!(logs[0]["action"], "Retrieved discharge report");
    assert_eq!(logs[0]["patient"], "Maria Garcia");

    let history = body["conversation_history"].as_array().expect("history array");
    assert_eq!(history[0]["user"], "Maria Garcia");
    assert_eq!(history[0]["type"], "user_input");
}

#[tokio::test]
async fn test_logs_endpoint_for_unknown_session_is_empty() {
    let gemini = MockServer::start().await;
    let base = spawn_app(&gemini).await;

    let body: Value = reqwest::get(format!("{base}/logs/never-seen"))
        .await
        .expect("logs request")
        .json()
        .await
        .expect("logs body");

    assert_eq!(body["logs"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["conversation_history"].as_array().map(Vec::len), Some(0));
}
