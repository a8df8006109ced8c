mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::post;

use fenduan::error::{ProcessError, SplitError};
use fenduan::models::{FormState, ProcessRequest, RequestConfig, SplitMethod};
use fenduan::services::backend::{ChunkBackend, HttpBackend};
use fenduan::services::session::SessionController;

use common::{FakeOpenRouter, TEST_API_KEY, llm_client, local_app, spawn_server};

fn config(text: &str) -> RequestConfig {
    FormState {
        api_key: TEST_API_KEY.to_string(),
        model: "deepseek/deepseek-r1:free".to_string(),
        split_method: SplitMethod::ByChapterMarker,
        prompt: "Summarise".to_string(),
        additional_text: text.to_string(),
        ..FormState::default()
    }
    .to_config()
}

async fn pipeline() -> (String, FakeOpenRouter) {
    let fake = FakeOpenRouter::default();
    let api_url = fake.start().await;
    let (router, _) = local_app(llm_client(&api_url));
    (spawn_server(router).await, fake)
}

#[tokio::test]
async fn splits_and_processes_over_http() {
    let (base_url, fake) = pipeline().await;
    let backend = HttpBackend::new(base_url, Duration::from_secs(10)).unwrap();

    let config = config("Chương 1 mở đầu\nChương 2 kết thúc");
    let chunks = backend.split(&config).await.unwrap();
    assert_eq!(chunks, vec!["Chương 1 mở đầu", "Chương 2 kết thúc"]);

    let result = backend
        .process(&ProcessRequest {
            config,
            chapter: chunks[1].clone(),
            part_number: 2,
            total_parts: 2,
        })
        .await
        .unwrap();
    assert_eq!(result, "[Summarise] Chương 2 kết thúc");
    assert_eq!(fake.calls(), 1);
}

#[tokio::test]
async fn server_messages_become_errors() {
    let (base_url, _fake) = pipeline().await;
    let backend = HttpBackend::new(format!("{}/", base_url), Duration::from_secs(10)).unwrap();

    match backend.split(&config("nothing to split")).await {
        Err(SplitError::Rejected(message)) => {
            assert_eq!(message, "No chapter format found (第X章 or Chương + number)")
        }
        other => panic!("unexpected split outcome: {other:?}"),
    }

    let request = ProcessRequest {
        config: RequestConfig {
            api_key: "sk-wrong".to_string(),
            ..config("第一章")
        },
        chapter: "第一章".to_string(),
        part_number: 1,
        total_parts: 1,
    };
    match backend.process(&request).await {
        Err(ProcessError::Rejected(message)) => assert_eq!(message, "API Error: invalid key"),
        other => panic!("unexpected process outcome: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_pipeline_is_a_transport_error() {
    let backend = HttpBackend::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();

    assert!(matches!(
        backend.split(&config("第一章")).await,
        Err(SplitError::Transport(_))
    ));
}

#[tokio::test]
async fn session_over_http_stops_at_first_failing_part() {
    let failing = Router::new()
        .route(
            "/api/split-text",
            post(|| async { axum::Json(serde_json::json!({ "chapters": ["a", "b", "c"] })) }),
        )
        .route(
            "/api/process-text",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream overloaded") }),
        );
    let base_url = spawn_server(failing).await;

    let backend = Arc::new(HttpBackend::new(base_url, Duration::from_secs(10)).unwrap());
    let sessions = SessionController::new(backend, Duration::ZERO);

    sessions
        .submit(FormState {
            api_key: TEST_API_KEY.to_string(),
            prompt: "Summarise".to_string(),
            additional_text: "a b c".to_string(),
            ..FormState::default()
        })
        .await
        .unwrap();
    sessions.join().await;

    let status = sessions.status().await;
    assert_eq!(
        status.view.notice.as_deref(),
        Some("Error: Error processing part 1: upstream overloaded")
    );
    assert_eq!(status.results_available, 0);
    assert!(!status.view.processing);
}
