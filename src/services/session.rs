//! Single-flight processing sessions.
//!
//! A session splits the submitted text once, then sends the chunks to the
//! backend strictly one after another with a pause in between. Stopping is
//! cooperative: a chunk already in flight always finishes, the pause is cut
//! short and no further chunk is started.

use crate::error::SessionError;
use crate::models::{FormState, ProcessRequest, RequestConfig};
use crate::services::backend::ChunkBackend;
use crate::services::presentation::{ResultLog, SessionView};
use crate::services::validator;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Debug, Default)]
struct SessionState {
    view: SessionView,
    results: ResultLog,
    /// Present while a session is active.
    cancel: Option<CancellationToken>,
}

/// Rendered view plus how many part results can be loaded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    #[serde(flatten)]
    pub view: SessionView,
    pub results_available: usize,
}

pub struct SessionController {
    backend: Arc<dyn ChunkBackend>,
    chunk_delay: Duration,
    state: Arc<Mutex<SessionState>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionController {
    pub fn new(backend: Arc<dyn ChunkBackend>, chunk_delay: Duration) -> Self {
        Self {
            backend,
            chunk_delay,
            state: Arc::new(Mutex::new(SessionState::default())),
            task: Mutex::new(None),
        }
    }

    /// Starts a session for the form unless one is already running or the
    /// form is invalid.
    pub async fn submit(&self, form: FormState) -> Result<Uuid, SessionError> {
        let mut state = self.state.lock().await;

        if state.cancel.is_some() {
            tracing::warn!("Rejected submission while a session is active");
            return Err(SessionError::AlreadyProcessing);
        }

        let errors = validator::validate(&form);
        if !errors.is_empty() {
            return Err(SessionError::Validation(errors));
        }

        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();

        state.view.begin(id);
        state.results.clear();
        state.cancel = Some(cancel.clone());

        let run = SessionRun {
            config: form.to_config(),
            backend: Arc::clone(&self.backend),
            state: Arc::clone(&self.state),
            cancel,
            chunk_delay: self.chunk_delay,
        };

        let span = tracing::info_span!("session", session_id = %id, model = %run.config.model);
        let handle = tokio::spawn(run.execute().instrument(span));
        *self.task.lock().await = Some(handle);

        tracing::info!(session_id = %id, "Session started");
        Ok(id)
    }

    /// Requests a stop. Returns `false` when there is nothing to stop or a
    /// stop was already requested.
    pub async fn stop(&self) -> bool {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        match &state.cancel {
            Some(cancel) if !cancel.is_cancelled() => {
                cancel.cancel();
                state.view.show_stopping();
                tracing::info!("Stop requested");
                true
            }
            _ => false,
        }
    }

    /// Renders all accumulated part results into the final result region.
    pub async fn load_results(&self) -> Result<String, SessionError> {
        let mut state = self.state.lock().await;

        let joined = state.results.joined().ok_or(SessionError::NoResults)?;
        state.view.show_loaded_results(joined.clone());
        Ok(joined)
    }

    pub async fn status(&self) -> SessionStatus {
        let state = self.state.lock().await;
        SessionStatus {
            view: state.view.clone(),
            results_available: state.results.len(),
        }
    }

    #[cfg(test)]
    async fn is_processing(&self) -> bool {
        self.state.lock().await.cancel.is_some()
    }

    /// Waits for the most recently started session task to end.
    pub async fn join(&self) {
        let handle = self.task.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Session task failed");
            }
        }
    }
}

struct SessionRun {
    config: RequestConfig,
    backend: Arc<dyn ChunkBackend>,
    state: Arc<Mutex<SessionState>>,
    cancel: CancellationToken,
    chunk_delay: Duration,
}

enum Outcome {
    Completed { total: usize },
    Stopped { total: usize },
}

impl SessionRun {
    async fn execute(self) {
        let outcome = self.drive().await;

        let mut state = self.state.lock().await;
        self.settle(&mut state, outcome);
    }

    /// Renders the outcome and frees the controller. Runs under the state
    /// lock, so a stop acknowledged after the last part reports as stopped.
    fn settle(&self, state: &mut SessionState, outcome: Result<Outcome, SessionError>) {
        let outcome = match outcome {
            Ok(Outcome::Completed { total }) if self.cancel.is_cancelled() => Ok(Outcome::Stopped { total }),
            other => other,
        };

        match outcome {
            Ok(Outcome::Completed { total }) => {
                tracing::info!(parts = total, "Session completed");
                state.view.show_finished(false, total);
            }
            Ok(Outcome::Stopped { total }) => {
                tracing::info!(parts = total, processed = state.results.len(), "Session stopped by user");
                state.view.show_finished(true, total);
            }
            Err(e) => {
                tracing::error!(error = %e, "Session aborted");
                state.view.show_error(&e.to_string());
            }
        }

        state.view.finish();
        state.cancel = None;
    }

    async fn drive(&self) -> Result<Outcome, SessionError> {
        tracing::info!(method = ?self.config.split_method, language = ?self.config.language, "Splitting text");

        let chunks = self.backend.split(&self.config).await?;
        if chunks.is_empty() {
            return Err(SessionError::EmptyChunkSet);
        }

        let total = chunks.len();
        self.state.lock().await.view.show_split(total);

        for (index, chunk) in chunks.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Ok(Outcome::Stopped { total });
            }

            let part = index + 1;
            self.state.lock().await.view.show_part_started(index, total, &chunk);

            let request = ProcessRequest {
                config: self.config.clone(),
                chapter: chunk,
                part_number: part,
                total_parts: total,
            };

            let result = self
                .backend
                .process(&request)
                .await
                .map_err(|source| SessionError::Process { part, source })?;

            {
                let mut state = self.state.lock().await;
                state.results.push(part, &result);
                state.view.show_part_result(part, total, &result);
            }
            tracing::debug!(part, total, "Part processed");

            // No pause after the last part.
            if part < total {
                tokio::select! {
                    _ = tokio::time::sleep(self.chunk_delay) => {}
                    _ = self.cancel.cancelled() => {
                        tracing::debug!(part, "Pause cut short by stop request");
                    }
                }
            }
        }

        if self.cancel.is_cancelled() {
            Ok(Outcome::Stopped { total })
        } else {
            Ok(Outcome::Completed { total })
        }
    }
}
