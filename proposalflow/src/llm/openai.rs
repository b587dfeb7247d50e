//! OpenAI-compatible chat completions client.

use super::{GenerationRequest, GenerationResponse, TextGenerator};
use crate::config::AppConfig;
use crate::errors::{ConfigError, GenerationError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct OpenAiRequestBody<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessageOut {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessageOut,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

/// Client for `POST {base_url}/chat/completions`.
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Creates a client from the application config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| ConfigError::invalid("OPENAI_BASE_URL", &config.base_url, e.to_string()))?;
        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    /// The model identifier requests are sent with.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_body<'a>(&'a self, req: &'a GenerationRequest) -> OpenAiRequestBody<'a> {
        OpenAiRequestBody {
            model: &self.model,
            messages: req
                .messages
                .iter()
                .map(|m| OpenAiMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: req.temperature.unwrap_or(self.temperature),
            max_tokens: req.max_tokens.or(self.max_tokens),
        }
    }
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

/// Maps a non-success status to the matching error.
fn status_error(status: u16, body: String) -> GenerationError {
    match status {
        401 | 403 => GenerationError::Auth(body),
        429 => GenerationError::RateLimited(body),
        400..=499 => GenerationError::InvalidRequest(body),
        _ => GenerationError::Api(body),
    }
}

fn parse_response(text: &str, fallback_model: &str) -> Result<GenerationResponse, GenerationError> {
    let parsed: OpenAiResponse =
        serde_json::from_str(text).map_err(|e| GenerationError::Parse(format!("{e}: {text}")))?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::Parse("response has no choices".to_string()))?;

    Ok(GenerationResponse {
        content: choice.message.content.unwrap_or_default(),
        model: parsed.model.unwrap_or_else(|| fallback_model.to_string()),
        input_tokens: parsed.usage.as_ref().map(|u| u.prompt_tokens),
        output_tokens: parsed.usage.as_ref().map(|u| u.completion_tokens),
        latency_ms: None,
        finish_reason: choice.finish_reason,
    })
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);
        let start = Instant::now();

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(status_error(status.as_u16(), text));
        }

        let mut response = parse_response(&text, &self.model)?;
        response.latency_ms = Some(start.elapsed().as_secs_f64() * 1000.0);
        Ok(response)
    }
}
