//! Google Gemini provider
//!
//! Calls the generateContent REST endpoint with an API key.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::core::config::GeminiConfig;
use crate::core::{AuraError, Config, Result};
use crate::llm::envelope::{GenerateContentResponse, RequestEnvelope};
use crate::llm::traits::{Completion, CompletionService, TokenUsage};

/// Header carrying the API key, so it never appears in a request URL
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API client
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.gemini.timeout_secs))
            .build()
            .map_err(|e| AuraError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.gemini.clone(),
        })
    }

    /// Model this client talks to
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl CompletionService for GeminiClient {
    async fn complete(&self, envelope: &RequestEnvelope) -> Result<Completion> {
        if !self.config.has_valid_key() {
            return Err(AuraError::config(
                "API key not configured. Set GOOGLE_AI_API_KEY or gemini.api_key in the config file.",
            ));
        }

        let url = self.config.endpoint_url()?;
        debug!(
            endpoint = %url,
            contents = envelope.contents.len(),
            image = envelope.has_image(),
            "sending generateContent request"
        );

        let resp = self
            .client
            .post(url)
            .header(API_KEY_HEADER, self.config.api_key.trim())
            .header("Content-Type", "application/json")
            .json(envelope)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(AuraError::transport(status.as_u16(), error_text));
        }

        let response: GenerateContentResponse = resp.json().await?;
        let usage = response.usage_metadata.as_ref().map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });
        let content = response.into_text()?;

        info!(
            model = %self.config.model,
            chars = content.len(),
            total_tokens = usage.as_ref().map(|u| u.total_tokens).unwrap_or_default(),
            "completion received"
        );

        Ok(Completion {
            content,
            usage,
            model: self.config.model.clone(),
        })
    }

    fn name(&self) -> &str {
        "google_gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Turn;
    use crate::llm::envelope::build_request;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL_PATH: &str = "/v1beta/models/gemini-2.0-flash-exp:generateContent";

    fn config_for(server: &MockServer, key: &str) -> Config {
        let mut config = Config::default();
        config.gemini.base_url = format!("{}/v1beta", server.uri());
        config.gemini.model = "gemini-2.0-flash-exp".to_string();
        config.gemini.api_key = key.to_string();
        config
    }

    fn envelope(config: &Config) -> RequestEnvelope {
        build_request(config, std::iter::empty::<&Turn>(), "How do I compost?", None)
    }

    #[tokio::test]
    async fn test_complete_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(header(API_KEY_HEADER, "test-key"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(json!({
                "generationConfig": {"topK": 40, "maxOutputTokens": 2048}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "Start with a bin..."}]}}],
                "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = config_for(&server, "test-key");
        let client = GeminiClient::from_config(&config).unwrap();
        let completion = client.complete(&envelope(&config)).await.unwrap();

        assert_eq!(completion.content, "Start with a bin...");
        assert_eq!(completion.model, "gemini-2.0-flash-exp");
        assert_eq!(completion.usage.unwrap().total_tokens, 15);
    }

    #[tokio::test]
    async fn test_complete_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let config = config_for(&server, "bad-key");
        let client = GeminiClient::from_config(&config).unwrap();
        let err = client.complete(&envelope(&config)).await.unwrap_err();

        match err {
            AuraError::Transport { status, body } => {
                assert_eq!(status, Some(400));
                assert_eq!(body, "API key not valid");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_no_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let config = config_for(&server, "test-key");
        let client = GeminiClient::from_config(&config).unwrap();
        let err = client.complete(&envelope(&config)).await.unwrap_err();
        assert!(matches!(err, AuraError::EmptyResponse(_)));
    }

    #[tokio::test]
    async fn test_missing_key_never_hits_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = config_for(&server, crate::core::config::API_KEY_PLACEHOLDER);
        let client = GeminiClient::from_config(&config).unwrap();
        let err = client.complete(&envelope(&config)).await.unwrap_err();
        assert!(matches!(err, AuraError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let mut config = Config::default();
        config.gemini.base_url = "http://127.0.0.1:9/v1beta".to_string();
        config.gemini.api_key = "test-key".to_string();
        config.gemini.timeout_secs = 2;

        let client = GeminiClient::from_config(&config).unwrap();
        let err = client.complete(&envelope(&config)).await.unwrap_err();
        assert!(matches!(err, AuraError::Transport { status: None, .. }));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_key() {
        let key = "SECRET-KEY-123";
        let mut config = Config::default();
        config.gemini.base_url = "http://127.0.0.1:9/v1beta".to_string();
        config.gemini.api_key = key.to_string();
        config.gemini.timeout_secs = 2;

        let client = GeminiClient::from_config(&config).unwrap();
        let err = client.complete(&envelope(&config)).await.unwrap_err();

        assert!(!err.to_string().contains(key));
        assert!(!format!("{:?}", err).contains(key));
        match err {
            AuraError::Transport { body, .. } => assert!(!body.contains(key)),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_key_is_not_sent_in_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
            })))
            .mount(&server)
            .await;

        let config = config_for(&server, "test-key");
        let client = GeminiClient::from_config(&config).unwrap();
        client.complete(&envelope(&config)).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.query().is_none());
        assert_eq!(
            requests[0].headers.get(API_KEY_HEADER).unwrap().to_str().unwrap(),
            "test-key"
        );
    }
}
