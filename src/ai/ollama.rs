//! Ollama HTTP client for structured chat completion.
//!
//! Every request goes to `POST {base}/api/chat` with streaming disabled and
//! the flow's output schema passed as `format`, which makes Ollama constrain
//! the reply to a matching JSON object.

use super::flow::{GenerationRequest, TextGenerator};
use crate::errors::{AIError, AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// System message sent ahead of every flow prompt.
const STRUCTURED_OUTPUT_INSTRUCTION: &str = "You are a supportive mental wellness assistant. \
Answer with a single JSON object that matches the requested format and nothing else.";

/// A message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender (system, user, assistant)
    pub role: String,
    /// The content of the message
    pub content: String,
}

impl Message {
    /// Creates a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for chat completion.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a Value>,
}

/// Response from chat completion.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Message,
}

/// Client for interacting with the Ollama API.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: Client,
}

impl OllamaClient {
    /// Creates a new Ollama client with a per-request timeout.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the Ollama API (e.g., "http://127.0.0.1:11434")
    /// * `model` - Chat model used for every request (e.g., "llama3.2:3b")
    /// * `timeout` - Upper bound on a single request
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
        })
    }

    /// Model this client sends requests to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends a chat completion request.
    ///
    /// # Arguments
    ///
    /// * `messages` - Conversation messages
    /// * `format` - Optional JSON schema the reply must follow
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Ollama API is not reachable or the request times out
    /// - Model is not found
    /// - API returns an error response
    /// - The response envelope cannot be decoded
    pub async fn chat(&self, messages: &[Message], format: Option<&Value>) -> Result<String, AIError> {
        debug!("Sending chat request with model: {}", self.model);

        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            format,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(AIError::OllamaOffline)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 404 {
                return Err(AIError::ModelNotFound(self.model.clone()));
            }

            return Err(AIError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            AIError::InvalidResponse(format!("Failed to parse chat response: {}", e))
        })?;

        debug!(
            "Received chat response ({} chars)",
            chat_response.message.content.len()
        );
        Ok(chat_response.message.content)
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AIError> {
        let messages = [
            Message::system(STRUCTURED_OUTPUT_INSTRUCTION),
            Message::user(request.prompt.clone()),
        ];
        self.chat(&messages, Some(&request.schema)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(url: &str) -> OllamaClient {
        OllamaClient::new(url, "llama3.2:3b", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_message_constructors() {
        let system = Message::system("System prompt");
        assert_eq!(system.role, "system");
        assert_eq!(system.content, "System prompt");

        let user = Message::user("User message");
        assert_eq!(user.role, "user");
    }

    #[test]
    fn test_ollama_client_creation() {
        let client = client("http://127.0.0.1:11434/");
        assert_eq!(client.base_url, "http://127.0.0.1:11434");
        assert_eq!(client.model(), "llama3.2:3b");
    }

    #[test]
    fn test_chat_request_serialization() {
        let schema = json!({"type": "object"});
        let messages = [Message::user("hi")];
        let request = ChatRequest {
            model: "m",
            messages: &messages,
            stream: false,
            format: Some(&schema),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["stream"], json!(false));
        assert_eq!(body["format"], schema);

        let request = ChatRequest {
            model: "m",
            messages: &messages,
            stream: false,
            format: None,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("format").is_none());
    }

    #[tokio::test]
    async fn test_generate_sends_schema_and_returns_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(mockito::Matcher::PartialJson(json!({
                "model": "llama3.2:3b",
                "stream": false,
                "format": {"type": "object"}
            })))
            .with_status(200)
            .with_body(r#"{"message":{"role":"assistant","content":"{\"advice\":\"Rest.\"}"},"done":true}"#)
            .create_async()
            .await;

        let reply = client(&server.url())
            .generate(&GenerationRequest {
                prompt: "Level 3".to_string(),
                schema: json!({"type": "object"}),
            })
            .await
            .unwrap();

        assert_eq!(reply, r#"{"advice":"Rest."}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_chat_maps_error_statuses() {
        let mut server = mockito::Server::new_async().await;
        let _missing = server
            .mock("POST", "/api/chat")
            .with_status(404)
            .with_body("model not found")
            .create_async()
            .await;

        let err = client(&server.url()).chat(&[Message::user("hi")], None).await.unwrap_err();
        assert!(matches!(err, AIError::ModelNotFound(model) if model == "llama3.2:3b"));
    }

    #[tokio::test]
    async fn test_chat_rejects_malformed_envelope() {
        let mut server = mockito::Server::new_async().await;
        let _garbled = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client(&server.url()).chat(&[Message::user("hi")], None).await.unwrap_err();
        assert!(matches!(err, AIError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_chat_reports_unreachable_server() {
        let err = client("http://127.0.0.1:9")
            .chat(&[Message::user("hi")], None)
            .await
            .unwrap_err();
        assert!(matches!(err, AIError::OllamaOffline(_)));
    }
}
