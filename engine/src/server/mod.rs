//! HTTP server
//!
//! Exposes the assistant over a small REST surface:
//!
//! - POST /chat - Submit one message for a session
//! - GET /logs/:session_id - Interaction log and conversation history
//! - GET /health - Liveness probe
//! - GET / - Embedded chat page
//!
//! All turn processing is synchronous within the request that carried the
//! message; the handler locks the session for the duration of the turn so
//! concurrent requests for the same session identifier are serialized.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::ServerConfig;
use crate::errors::EngineError;
use crate::router::ConversationRouter;
use crate::session::SessionStore;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ConversationRouter>,
    pub sessions: Arc<dyn SessionStore>,
}

/// Inbound chat message.
#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    pub message: String,
    pub session_id: String,
}

/// Outbound chat response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub patient_name: String,
    pub has_discharge_report: bool,
    pub timestamp: String,
}

/// Build the axum application.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/chat", post(chat_handler))
        .route("/logs/:session_id", get(logs_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

/// Bind the configured address and serve until ctrl-c.
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<(), EngineError> {
    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .map_err(|e| EngineError::Network(format!("Failed to bind {}: {}", config.listen, e)))?;

    let addr = listener
        .local_addr()
        .map_err(|e| EngineError::Network(format!("Failed to get local address: {}", e)))?;

    info!("Aftercare service listening on http://{}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down gracefully");
        })
        .await
        .map_err(|e| EngineError::Network(format!("Server error: {}", e)))
}

/// Chat endpoint: advance the session by one turn.
async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatMessage>,
) -> Json<ChatResponse> {
    info!(
        "Chat request from session {}: {}",
        payload.session_id, payload.message
    );

    let session = state.sessions.get_or_create(&payload.session_id).await;
    let mut session = session.lock().await;

    state.router.step(&mut session, &payload.message).await;

    Json(ChatResponse {
        response: session.agent_response.clone(),
        patient_name: session.patient_name().to_string(),
        has_discharge_report: session.has_discharge_report(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Session log endpoint. Unknown sessions return empty collections rather
/// than an error.
async fn logs_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<serde_json::Value> {
    match state.sessions.get(&session_id).await {
        Some(session) => {
            let session = session.lock().await;
            Json(json!({
                "logs": &session.interaction_log,
                "conversation_history": &session.conversation_history,
            }))
        }
        None => Json(json!({
            "logs": [],
            "conversation_history": [],
        })),
    }
}

/// Liveness endpoint.
async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Minimal embedded chat page.
async fn index_handler() -> Response {
    let html = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Aftercare Assistant</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 700px;
            margin: 40px auto;
            padding: 20px;
            background: #f5f5f5;
        }
        #log {
            background: white;
            border-radius: 8px;
            padding: 16px;
            min-height: 300px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
            white-space: pre-wrap;
        }
        .user { color: #007bff; margin: 8px 0; }
        .agent { color: #333; margin: 8px 0; }
        form { display: flex; gap: 8px; margin-top: 12px; }
        input { flex: 1; padding: 10px; border: 1px solid #ccc; border-radius: 6px; }
        button { padding: 10px 20px; border: none; border-radius: 6px; background: #007bff; color: white; }
    </style>
</head>
<body>
    <h1>Post-Discharge Assistant</h1>
    <div id="log"><div class="agent">Hello! Welcome to the nephrology clinic. Could you please provide your full name so I can look up your discharge information?</div></div>
    <form id="chat-form">
        <input id="message" autocomplete="off" placeholder="Type a message..." required>
        <button type="submit">Send</button>
    </form>
    <script>
        const sessionId = crypto.randomUUID();
        const log = document.getElementById('log');
        const input = document.getElementById('message');

        function append(cls, text) {
            const div = document.createElement('div');
            div.className = cls;
            div.textContent = (cls === 'user' ? 'You: ' : 'Assistant: ') + text;
            log.appendChild(div);
            log.scrollTop = log.scrollHeight;
        }

        document.getElementById('chat-form').addEventListener('submit', async (e) => {
            e.preventDefault();
            const message = input.value;
            input.value = '';
            append('user', message);
            try {
                const res = await fetch('/chat', {
                    method: 'POST',
                    headers: {'Content-Type': 'application/json'},
                    body: JSON.stringify({message, session_id: sessionId}),
                });
                const data = await res.json();
                append('agent', data.response);
            } catch (err) {
                append('agent', 'Sorry, I encountered an error. Please try again.');
            }
        });
    </script>
</body>
</html>"#;

    (StatusCode::OK, [("content-type", "text/html")], html).into_response()
}
