use crate::error::{ChapterizeError, LlmError, SessionError};
use crate::models::{
    FormState, ProcessRequest, ProcessResponse, RequestConfig, SaveResultsRequest,
    SaveResultsResponse, SplitResponse,
};
use crate::page;
use crate::services::chapterizer;
use crate::services::llm::OpenRouterClient;
use crate::services::session::{SessionController, SessionStatus};
use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
};
use http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub llm_client: Arc<OpenRouterClient>,
    pub sessions: Arc<SessionController>,
    pub models: Arc<Vec<String>>,
    pub max_body_bytes: usize,
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/split-text", post(split_text))
        .route("/api/process-text", post(process_text))
        .route("/api/save-results", post(save_results))
        .route("/api/session", get(session_status).post(submit_session))
        .route("/api/session/stop", post(stop_session))
        .route("/api/session/load-results", post(load_results))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(AllowMethods::any())
                .allow_headers(AllowHeaders::any()),
        )
        .layer(TraceLayer::new_for_http())
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(page::render_index(&state.models))
}

async fn health_check() -> &'static str {
    "OK"
}

async fn split_text(Json(config): Json<RequestConfig>) -> Result<Json<SplitResponse>, (StatusCode, String)> {
    let chapters = chapterizer::split_text(&config).map_err(|e: ChapterizeError| {
        tracing::warn!(error = %e, "Split rejected");
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    })?;

    tracing::info!(parts = chapters.len(), method = ?config.split_method, "Text split");
    Ok(Json(SplitResponse { chapters }))
}

async fn process_text(
    State(state): State<AppState>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, (StatusCode, String)> {
    let result = state
        .llm_client
        .process_chapter(&request)
        .await
        .map_err(|e| {
            let status = match &e {
                LlmError::MissingField(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            };
            tracing::warn!(error = %e, part = request.part_number, "Chunk processing failed");
            (status, e.to_string())
        })?;

    Ok(Json(ProcessResponse {
        result,
        part_number: request.part_number,
        total_parts: request.total_parts,
        timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    }))
}

async fn save_results(
    Json(request): Json<SaveResultsRequest>,
) -> Result<Json<SaveResultsResponse>, (StatusCode, String)> {
    if request.results.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "No results to save".to_string()));
    }

    let timestamp = chrono::Local::now().format("%Y-%m-%d-%H-%M-%S").to_string();

    Ok(Json(SaveResultsResponse {
        content: request.results.join("\n\n"),
        filename: format!("openrouter_result_{}.txt", timestamp),
        timestamp,
    }))
}

async fn submit_session(
    State(state): State<AppState>,
    Json(form): Json<FormState>,
) -> Result<impl IntoResponse, SessionError> {
    let session_id = state.sessions.submit(form).await?;
    Ok((StatusCode::ACCEPTED, Json(json!({ "sessionId": session_id }))))
}

async fn session_status(State(state): State<AppState>) -> Json<SessionStatus> {
    Json(state.sessions.status().await)
}

async fn stop_session(State(state): State<AppState>) -> Json<serde_json::Value> {
    let stopping = state.sessions.stop().await;
    Json(json!({ "stopping": stopping }))
}

async fn load_results(State(state): State<AppState>) -> Result<Json<serde_json::Value>, SessionError> {
    let final_result = state.sessions.load_results().await?;
    Ok(Json(json!({ "finalResult": final_result })))
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let status = match &self {
            SessionError::AlreadyProcessing => StatusCode::CONFLICT,
            SessionError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SessionError::NoResults => StatusCode::NOT_FOUND,
            SessionError::Split(_) | SessionError::EmptyChunkSet | SessionError::Process { .. } => {
                StatusCode::BAD_GATEWAY
            }
        };

        let errors = match &self {
            SessionError::Validation(errors) => errors.clone(),
            _ => Vec::new(),
        };

        (status, Json(json!({ "error": self.to_string(), "errors": errors }))).into_response()
    }
}
