use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::types::{ChatMessage, ChatRequest, ChatResponse, ErrorEnvelope};
use crate::config::{ApiKey, Config};

/// Reasoning models routinely take tens of seconds per completion.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("SCHOLAR_API_KEY not set (OPENAI_API_KEY is also accepted)")]
    ApiKeyNotSet,

    #[error("LLM API rate limit exceeded")]
    RateLimited,

    #[error("LLM API rejected credentials: {0}")]
    Unauthorized(String),

    #[error("LLM API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("LLM returned an empty response")]
    EmptyResponse,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Single-prompt text completion.
/// Implemented by `ChatClient` for production; mock implementations used in tests.
pub trait TextGenerator {
    fn complete(
        &self,
        prompt: &str,
        temperature: f32,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

#[derive(Clone)]
pub struct ChatClient {
    http: Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
}

impl ChatClient {
    pub fn from_config(http: Client, config: &Config) -> Result<Self, GenerationError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(GenerationError::ApiKeyNotSet)?;
        Ok(Self {
            http,
            api_key,
            model: config.model_name.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TextGenerator for ChatClient {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage::user(prompt)],
            temperature,
            stream: false,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = classify_status(status, &text);
            warn!(error = %err, "LLM API error");
            return Err(err);
        }

        let body: ChatResponse = response.json().await?;
        if let Some(err) = body.error {
            let message = err.message.unwrap_or_else(|| "Unknown error".to_string());
            warn!(%message, "LLM API error in 200 response");
            return Err(GenerationError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        debug!(model = %self.model, empty = content.is_none(), "chat completion finished");
        content.ok_or(GenerationError::EmptyResponse)
    }
}

fn classify_status(status: StatusCode, body: &str) -> GenerationError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| {
            let end = body.floor_char_boundary(200);
            format!("HTTP {status}: {}", &body[..end])
        });

    match status {
        StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::Unauthorized(message),
        _ => GenerationError::Api {
            code: status.as_u16(),
            message,
        },
    }
}


#[cfg(test)]
mod http_tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ChatClient {
        let config = Config {
            api_key: Some(ApiKey::new("test-key")),
            base_url: server.uri(),
            model_name: "test-model".into(),
            ..Config::default()
        };
        ChatClient::from_config(Client::new(), &config).unwrap()
    }

    #[tokio::test]
    async fn complete_sends_single_user_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "stream": false,
                "messages": [{"role": "user", "content": "write a query"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "  \"graph neural networks\"\n"}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server)
            .complete("write a query", 0.2)
            .await
            .unwrap();
        assert_eq!(text, "\"graph neural networks\"");
    }

    #[tokio::test]
    async fn blank_content_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "   "}}]
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).complete("prompt", 0.2).await;
        assert!(matches!(result, Err(GenerationError::EmptyResponse)));
    }

    #[tokio::test]
    async fn missing_choices_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": []
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).complete("prompt", 0.2).await;
        assert!(matches!(result, Err(GenerationError::EmptyResponse)));
    }

    #[tokio::test]
    async fn status_429_returns_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let result = client_for(&server).complete("prompt", 0.2).await;
        assert!(matches!(result, Err(GenerationError::RateLimited)));
    }

    #[tokio::test]
    async fn status_500_with_error_body_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": {"message": "model overloaded", "code": 500}
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).complete("prompt", 0.2).await;
        match &result {
            Err(GenerationError::Api { code: 500, message }) => {
                assert_eq!(message, "model overloaded");
            }
            other => panic!("expected Api(500), got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_field_in_200_response_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": {"message": "model not found"}
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).complete("prompt", 0.2).await;
        assert!(matches!(result, Err(GenerationError::Api { .. })));
    }
}
