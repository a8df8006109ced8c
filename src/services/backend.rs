//! Where the processing loop gets its chunks split and processed.

use crate::error::{ProcessError, SplitError};
use crate::models::{ProcessRequest, ProcessResponse, RequestConfig, SplitResponse};
use crate::services::chapterizer;
use crate::services::llm::OpenRouterClient;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait ChunkBackend: Send + Sync {
    /// Splits the configured text into ordered chunks. May return an empty list.
    async fn split(&self, config: &RequestConfig) -> Result<Vec<String>, SplitError>;

    /// Processes one chunk and returns the model's result text.
    async fn process(&self, request: &ProcessRequest) -> Result<String, ProcessError>;
}

/// Talks to the `split-text` / `process-text` endpoints over HTTP.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }
}

#[async_trait]
impl ChunkBackend for HttpBackend {
    async fn split(&self, config: &RequestConfig) -> Result<Vec<String>, SplitError> {
        let response = self
            .client
            .post(self.endpoint("split-text"))
            .json(config)
            .send()
            .await?;

        if !response.status().is_success() {
            let message = response.text().await?;
            return Err(SplitError::Rejected(message));
        }

        let body: SplitResponse = response.json().await?;
        Ok(body.chapters)
    }

    async fn process(&self, request: &ProcessRequest) -> Result<String, ProcessError> {
        let response = self
            .client
            .post(self.endpoint("process-text"))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let message = response.text().await?;
            return Err(ProcessError::Rejected(message));
        }

        let body: ProcessResponse = response.json().await?;
        Ok(body.result)
    }
}

/// Splits and processes in-process, without the HTTP hop.
pub struct LocalBackend {
    llm_client: Arc<OpenRouterClient>,
}

impl LocalBackend {
    pub fn new(llm_client: Arc<OpenRouterClient>) -> Self {
        Self { llm_client }
    }
}

#[async_trait]
impl ChunkBackend for LocalBackend {
    async fn split(&self, config: &RequestConfig) -> Result<Vec<String>, SplitError> {
        chapterizer::split_text(config).map_err(|e| SplitError::Rejected(e.to_string()))
    }

    async fn process(&self, request: &ProcessRequest) -> Result<String, ProcessError> {
        self.llm_client
            .process_chapter(request)
            .await
            .map_err(|e| ProcessError::Rejected(e.to_string()))
    }
}
