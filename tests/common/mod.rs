#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use fenduan::config::OpenRouterSettings;
use fenduan::routes::{AppState, create_router};
use fenduan::services::backend::{ChunkBackend, LocalBackend};
use fenduan::services::llm::OpenRouterClient;
use fenduan::services::session::SessionController;

pub const TEST_API_KEY: &str = "sk-or-test";

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[derive(Clone, Default)]
pub struct FakeOpenRouter {
    pub calls: Arc<AtomicUsize>,
}

impl FakeOpenRouter {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Answers chat completions with an echo of the user message. Any key
    /// other than `TEST_API_KEY` is refused.
    pub async fn start(&self) -> String {
        let router = Router::new()
            .route("/chat/completions", post(fake_completion))
            .with_state(self.clone())
            .layer(DefaultBodyLimit::disable());
        spawn_server(router).await
    }
}

async fn fake_completion(
    State(fake): State<FakeOpenRouter>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    fake.calls.fetch_add(1, Ordering::SeqCst);

    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TEST_API_KEY));
    if !authorized {
        return Err((StatusCode::UNAUTHORIZED, "invalid key".to_string()));
    }

    let content = body["messages"][0]["content"].as_str().unwrap_or_default();
    let first_line = content.lines().next().unwrap_or_default();
    let chapter = content.lines().nth(1).unwrap_or_default();

    Ok(Json(json!({
        "choices": [{ "message": { "role": "assistant", "content": format!("[{}] {}", first_line, chapter) } }]
    })))
}

pub fn llm_client(api_url: &str) -> Arc<OpenRouterClient> {
    let settings = OpenRouterSettings {
        api_url: api_url.to_string(),
        referer: "http://localhost:3000".to_string(),
        timeout: Duration::from_secs(10),
    };
    Arc::new(OpenRouterClient::new(&settings).unwrap())
}

pub fn app_state(llm_client: Arc<OpenRouterClient>, backend: Arc<dyn ChunkBackend>) -> AppState {
    AppState {
        llm_client,
        sessions: Arc::new(SessionController::new(backend, Duration::ZERO)),
        models: Arc::new(vec!["deepseek/deepseek-r1:free".to_string()]),
        max_body_bytes: 64 * 1024 * 1024,
    }
}

pub fn local_app(llm_client: Arc<OpenRouterClient>) -> (Router, AppState) {
    let backend = Arc::new(LocalBackend::new(Arc::clone(&llm_client)));
    let state = app_state(llm_client, backend);
    (create_router(state.clone()), state)
}

pub fn form(text: &str) -> Value {
    json!({
        "apiKey": TEST_API_KEY,
        "model": "deepseek/deepseek-r1:free",
        "language": "中文",
        "splitMethod": "chapter",
        "splitLength": "1000",
        "prompt": "Translate",
        "additionalText": text,
    })
}
