//! LLM Client: the single point of entry for completion-service calls.
//!
//! Speaks the OpenAI-compatible chat completions protocol exposed by Groq.
//! One single-turn user message per call, provider defaults for everything
//! else. No retries: a failed call is surfaced to the caller immediately.
//!
//! Model: llama-3.3-70b-versatile (hardcoded)

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
/// The model used for every analysis.
pub const MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text content of the first choice, untouched.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Shared, read-only completion-service client. Built once at startup.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: GROQ_API_URL.to_string(),
        }
    }

    /// Sends `prompt` as a single user message and returns the full response.
    pub async fn call(&self, prompt: &str) -> Result<ChatResponse, LlmError> {
        let request_body = build_request(prompt);

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(body),
            });
        }

        let body = response.text().await?;
        let chat_response: ChatResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat_response)
    }

    /// Calls the model and returns the first completion's text unmodified.
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(prompt).await?;
        response
            .text()
            .map(String::from)
            .ok_or(LlmError::EmptyContent)
    }
}

fn build_request(prompt: &str) -> ChatRequest<'_> {
    ChatRequest {
        model: MODEL,
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
    }
}

/// Pulls `error.message` out of a provider error body, falling back to the raw body.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{header, HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};

    /// Serves `app` on an ephemeral local port and returns a client aimed at it.
    async fn client_for(app: Router) -> LlmClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        LlmClient {
            client: Client::builder().no_proxy().build().unwrap(),
            api_key: "gsk_test".to_string(),
            base_url: format!("http://{addr}/openai/v1/chat/completions"),
        }
    }

    async fn client_replying(status: StatusCode, body: &'static str) -> LlmClient {
        let app = Router::new().route(
            "/openai/v1/chat/completions",
            post(move || async move { (status, body) }),
        );
        client_for(app).await
    }

    #[test]
    fn test_request_is_single_user_message_with_fixed_model() {
        let value = serde_json::to_value(build_request("Analyze this")).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "llama-3.3-70b-versatile",
                "messages": [{ "role": "user", "content": "Analyze this" }]
            })
        );
    }

    #[test]
    fn test_text_returns_first_choice_verbatim() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  ATS Score: 82\n" } },
                { "message": { "role": "assistant", "content": "second" } }
            ],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        }))
        .unwrap();
        assert_eq!(response.text(), Some("  ATS Score: 82\n"));
    }

    #[test]
    fn test_text_is_none_without_choices_or_content() {
        let empty: ChatResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert_eq!(empty.text(), None);

        let null_content: ChatResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "role": "assistant", "content": null } }]
        }))
        .unwrap();
        assert_eq!(null_content.text(), None);
    }

    #[test]
    fn test_api_error_message_prefers_structured_body() {
        let body = json!({ "error": { "message": "Rate limit reached", "type": "tokens" } });
        assert_eq!(api_error_message(body.to_string()), "Rate limit reached");
        assert_eq!(
            api_error_message("<html>bad gateway</html>".into()),
            "<html>bad gateway</html>"
        );
    }

    #[tokio::test]
    async fn test_complete_sends_key_and_prompt_and_returns_text() {
        let app = Router::new().route(
            "/openai/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let auth = headers[header::AUTHORIZATION].to_str().unwrap().to_string();
                let prompt = body["messages"][0]["content"].as_str().unwrap().to_string();
                Json(json!({
                    "choices": [{ "message": { "content": format!("{auth} | {prompt}") } }],
                    "usage": { "prompt_tokens": 3, "completion_tokens": 4 }
                }))
            }),
        );
        let client = client_for(app).await;

        let text = client.complete("Analyze this").await.unwrap();
        assert_eq!(text, "Bearer gsk_test | Analyze this");
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error_with_provider_message() {
        let client = client_replying(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error"}}"#,
        )
        .await;

        match client.call("prompt").await.unwrap_err() {
            LlmError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API Key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparseable_success_body_is_parse_error() {
        let client = client_replying(StatusCode::OK, "<html>gateway</html>").await;
        let err = client.call("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[tokio::test]
    async fn test_complete_without_choices_is_empty_content() {
        let client = client_replying(StatusCode::OK, r#"{"choices":[]}"#).await;
        let err = client.complete("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }
}
