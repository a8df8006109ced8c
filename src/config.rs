use crate::models::DEFAULT_MODELS;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_OPENROUTER_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_REFERER: &str = "http://localhost:3000";
const DEFAULT_CHUNK_DELAY_SECS: u64 = 45;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub openrouter: OpenRouterSettings,
    /// When set, chunks are split and processed through the HTTP endpoints at
    /// this base URL instead of in-process.
    pub pipeline_base_url: Option<String>,
    /// Pause between two chunk requests, to stay under the API rate limit.
    pub chunk_delay: Duration,
    pub request_timeout: Duration,
    /// Largest request body accepted; whole novels arrive in one JSON form.
    pub max_body_bytes: usize,
    pub models: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct OpenRouterSettings {
    pub api_url: String,
    pub referer: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_addr: SocketAddr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address like 0.0.0.0:3000")?;

        let chunk_delay = parse_secs(var("CHUNK_DELAY_SECS"), DEFAULT_CHUNK_DELAY_SECS)
            .context("CHUNK_DELAY_SECS must be a whole number of seconds")?;

        let request_timeout = parse_secs(var("REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS)
            .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?;

        let max_body_bytes = match var("MAX_BODY_BYTES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .context("MAX_BODY_BYTES must be a whole number of bytes")?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        let models = match var("OPENROUTER_MODELS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|model| !model.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_MODELS.iter().map(|model| model.to_string()).collect(),
        };

        Ok(Config {
            bind_addr,
            openrouter: OpenRouterSettings {
                api_url: var("OPENROUTER_API_URL").unwrap_or_else(|| DEFAULT_OPENROUTER_URL.to_string()),
                referer: var("OPENROUTER_REFERER").unwrap_or_else(|| DEFAULT_REFERER.to_string()),
                timeout: request_timeout,
            },
            pipeline_base_url: var("PIPELINE_BASE_URL"),
            chunk_delay,
            request_timeout,
            max_body_bytes,
            models,
        })
    }
}

fn parse_secs(value: Option<String>, default: u64) -> Result<Duration> {
    let secs = match value {
        Some(raw) => raw.trim().parse::<u64>()?,
        None => default,
    };
    Ok(Duration::from_secs(secs))
}
