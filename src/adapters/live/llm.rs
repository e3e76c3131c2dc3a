//! Live adapter for the `LlmClient` port using an OpenAI-style chat-completions API.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Settings;
use crate::error::BoxError;
use crate::ports::llm::{CompletionFuture, CompletionRequest, CompletionResponse, LlmClient};

/// Live LLM client that calls a chat-completions endpoint.
pub struct LiveLlmClient {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl LiveLlmClient {
    /// Creates a client for the endpoint and key in `settings`.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.llm_timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, url: settings.llm_url.clone(), api_key: settings.api_key.clone() }
    }
}

/// Request body sent to the chat-completions API.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

/// A single message in the request.
#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Top-level response from the chat-completions API.
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Token usage reported by the API.
#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Error response from the API.
#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl LlmClient for LiveLlmClient {
    fn complete(&self, request: &CompletionRequest) -> CompletionFuture<'_> {
        let request = request.clone();

        Box::pin(async move {
            let api_key = self
                .api_key
                .as_deref()
                .ok_or_else(|| BoxError::from("OPENAI_API_KEY environment variable not set"))?;

            let body = ChatRequest {
                model: &request.model,
                messages: vec![
                    ChatMessage { role: "system", content: &request.system },
                    ChatMessage { role: "user", content: &request.prompt },
                ],
                temperature: request.temperature,
                response_format: request.json_mode.then_some(ResponseFormat { kind: "json_object" }),
            };

            let response = self
                .client
                .post(&self.url)
                .bearer_auth(api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| -> BoxError { format!("chat completion request failed: {e}").into() })?;

            let status = response.status();
            let response_text = response
                .text()
                .await
                .map_err(|e| -> BoxError { format!("failed to read completion response: {e}").into() })?;

            if !status.is_success() {
                let msg = serde_json::from_str::<ApiError>(&response_text)
                    .map(|e| e.error.message)
                    .unwrap_or(response_text);
                return Err(format!("completion API error ({}): {msg}", status.as_u16()).into());
            }

            let api_response: ChatResponse = serde_json::from_str(&response_text)
                .map_err(|e| -> BoxError { format!("failed to parse completion response: {e}").into() })?;

            let text = api_response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .unwrap_or_default();
            let (prompt_tokens, completion_tokens) =
                api_response.usage.map_or((0, 0), |u| (u.prompt_tokens, u.completion_tokens));
            debug!(prompt_tokens, completion_tokens, "completion received");

            Ok(CompletionResponse { text, prompt_tokens, completion_tokens })
        })
    }
}
