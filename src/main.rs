use fenduan::config::Config;
use fenduan::routes::{AppState, create_router};
use fenduan::services::backend::{ChunkBackend, HttpBackend, LocalBackend};
use fenduan::services::llm::OpenRouterClient;
use fenduan::services::session::SessionController;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let llm_client = Arc::new(OpenRouterClient::new(&config.openrouter)?);

    let backend: Arc<dyn ChunkBackend> = match &config.pipeline_base_url {
        Some(base_url) => {
            tracing::info!(%base_url, "Processing chunks through remote pipeline");
            Arc::new(HttpBackend::new(base_url.as_str(), config.request_timeout)?)
        }
        None => Arc::new(LocalBackend::new(Arc::clone(&llm_client))),
    };

    let sessions = Arc::new(SessionController::new(backend, config.chunk_delay));

    let app_state = AppState {
        llm_client,
        sessions: Arc::clone(&sessions),
        models: Arc::new(config.models.clone()),
        max_body_bytes: config.max_body_bytes,
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        chunk_delay_secs = config.chunk_delay.as_secs(),
        "Listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let an in-flight chunk finish, skip the rest.
    sessions.stop().await;
    sessions.join().await;
    tracing::info!("Shut down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
