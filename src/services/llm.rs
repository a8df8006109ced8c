use crate::config::OpenRouterSettings;
use crate::error::LlmError;
use crate::models::ProcessRequest;
use serde::{Deserialize, Serialize};

pub struct OpenRouterClient {
    client: reqwest::Client,
    api_url: String,
    referer: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenRouterClient {
    pub fn new(settings: &OpenRouterSettings) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;

        Ok(OpenRouterClient {
            client,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            referer: settings.referer.clone(),
        })
    }

    /// Sends the chunk with its prompt and returns the model's answer.
    ///
    /// The API key travels with the request; the client holds none of its own.
    pub async fn process_chapter(&self, request: &ProcessRequest) -> Result<String, LlmError> {
        let config = &request.config;

        if config.api_key.is_empty() {
            return Err(LlmError::MissingField("API Key is required"));
        }
        if config.prompt.is_empty() {
            return Err(LlmError::MissingField("Prompt is required"));
        }
        if request.chapter.is_empty() {
            return Err(LlmError::MissingField("Chapter content is required"));
        }

        let full_prompt = format!("{}\n{}", config.prompt, request.chapter);

        tracing::debug!(
            model = %config.model,
            part = request.part_number,
            total = request.total_parts,
            prompt_chars = full_prompt.chars().count(),
            "Sending chunk to OpenRouter"
        );

        self.complete(&config.api_key, &config.model, &full_prompt).await
    }

    pub async fn complete(&self, api_key: &str, model: &str, prompt: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", api_key))
            .header("HTTP-Referer", self.referer.as_str())
            .json(&body)
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            let response_text = response.text().await?;
            return Err(LlmError::Api(response_text));
        }

        let chat: ChatResponse = response.json().await?;

        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or(LlmError::EmptyResponse)
    }
}
