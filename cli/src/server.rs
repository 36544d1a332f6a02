//! Mock advice backend for local development.
//!
//! Serves the three advice endpoints with canned advice echoing the
//! prompt. No real score or secret validation happens here; the only
//! simulated behavior is the low-score escalation, which fires for the
//! first `escalate_first` invisible submissions so the full tier flow
//! can be exercised end to end.

use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub struct DevBackend {
    /// Invisible submissions seen so far, for the escalation window.
    invisible_calls: AtomicU32,
    /// How many leading invisible submissions report a low score.
    escalate_first: u32,
}

#[derive(Deserialize)]
struct InvisibleRequest {
    prompt: String,
    invisible_token: String,
}

#[derive(Deserialize)]
struct InteractiveRequest {
    prompt: String,
    interactive_token: String,
}

#[derive(Deserialize)]
struct BypassRequest {
    prompt: String,
}

impl DevBackend {
    pub fn new(escalate_first: u32) -> Self {
        Self {
            invisible_calls: AtomicU32::new(0),
            escalate_first,
        }
    }

    pub fn router(self, allow_origin: &str) -> Router {
        let cors = match allow_origin.parse::<HeaderValue>() {
            Ok(origin) => CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any),
            Err(_) => CorsLayer::permissive(),
        };

        Router::new()
            .route("/", get(health))
            .route("/get-advice", post(invisible))
            .route("/get-advice/interactive", post(interactive))
            .route("/get-advice/bypass", post(bypass))
            .layer(cors)
            .with_state(Arc::new(self))
    }
}

/// Serve the dev backend until the process is stopped.
pub async fn run(port: u16, escalate_first: u32, allow_origin: &str) -> anyhow::Result<()> {
    let app = DevBackend::new(escalate_first).router(allow_origin);
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("dev backend listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "Advisor dev backend is running" }))
}

async fn invisible(
    State(backend): State<Arc<DevBackend>>,
    Json(request): Json<InvisibleRequest>,
) -> (StatusCode, Json<Value>) {
    if request.invisible_token.is_empty() {
        return rejection("verification failed");
    }

    let n = backend.invisible_calls.fetch_add(1, Ordering::SeqCst);
    if n < backend.escalate_first {
        info!(call = n, "simulating a low verification score");
        return rejection("verification score too low. Score: 0.30");
    }

    advice(&request.prompt)
}

async fn interactive(
    Json(request): Json<InteractiveRequest>,
) -> (StatusCode, Json<Value>) {
    if request.interactive_token.is_empty() {
        return rejection("challenge response rejected");
    }
    advice(&request.prompt)
}

async fn bypass(Json(request): Json<BypassRequest>) -> (StatusCode, Json<Value>) {
    advice(&request.prompt)
}

fn advice(prompt: &str) -> (StatusCode, Json<Value>) {
    info!(prompt, "serving mock advice");
    let text = format!(
        "Mock advice for: '{prompt}'. Wire a real model behind this endpoint to generate advice."
    );
    (StatusCode::OK, Json(json!({ "advice": text })))
}

fn rejection(detail: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail })))
}
