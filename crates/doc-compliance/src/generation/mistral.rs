//! Mistral HTTP client with retry and endpoint fallback
//!
//! Each call first tries the model generate endpoint. A 404 there means the
//! model is chat-only, so the call moves to the chat completions endpoint.

use rand::Rng;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::providers::GenerationOptions;

/// Mistral API client with automatic retry
pub struct MistralClient {
    /// HTTP client
    client: Client,
    /// Configuration
    config: LlmConfig,
}

impl MistralClient {
    /// Create a new Mistral client
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Whether an API key is configured
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Generate text for a prompt
    pub async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("Mistral API key not configured".to_string()))?;

        let generate_url = format!("{}/v1/models/{}/generate", self.base_url(), options.model);
        let generate_body = json!({
            "input": prompt,
            "temperature": options.temperature,
            "max_new_tokens": options.max_tokens,
        });

        tracing::debug!("Generating text with model: {}", options.model);

        let data = match self.post_with_retry(&generate_url, api_key, &generate_body).await {
            Err(Error::LlmStatus { status: 404, .. }) => {
                tracing::debug!(
                    "Generate endpoint not found for model {}, trying chat completions",
                    options.model
                );
                let chat_url = format!("{}/v1/chat/completions", self.base_url());
                let chat_body = json!({
                    "model": options.model,
                    "messages": [{ "role": "user", "content": prompt }],
                    "temperature": options.temperature,
                    "max_tokens": options.max_tokens,
                });
                self.post_with_retry(&chat_url, api_key, &chat_body).await?
            }
            other => other?,
        };

        Ok(extract_text_from_response(&data).unwrap_or_else(|| data.to_string()))
    }

    /// POST JSON, retrying rate limits, server errors, and transport failures
    async fn post_with_retry(&self, url: &str, api_key: &str, body: &Value) -> Result<Value> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.post_once(url, api_key, body).await {
                Ok(data) => return Ok(data),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = self.backoff_delay(attempt);
                    tracing::warn!(
                        "Request to {} failed ({}), retrying in {:?} (attempt {}/{})",
                        url,
                        e,
                        delay,
                        attempt,
                        max_attempts
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_transient() {
                        tracing::error!("Request to {} failed after {} attempts: {}", url, attempt, e);
                    }
                    return Err(e);
                }
            }
        }
    }

    async fn post_once(&self, url: &str, api_key: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::LlmStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    /// `backoff_base_ms * 2^(attempt-1)` plus up to `max_jitter_ms` of jitter
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = self
            .config
            .backoff_base_ms
            .saturating_mul(1u64 << (attempt - 1).min(16));
        let jitter = if self.config.max_jitter_ms > 0 {
            rand::thread_rng().gen_range(0..=self.config.max_jitter_ms)
        } else {
            0
        };
        Duration::from_millis(exp.saturating_add(jitter))
    }
}

/// Pull generated text out of the response shapes the API is known to return
pub fn extract_text_from_response(data: &Value) -> Option<String> {
    let out = data
        .get("output")
        .filter(|v| is_truthy(v))
        .or_else(|| data.get("outputs").filter(|v| is_truthy(v)));
    if let Some(out) = out {
        let mut parts = Vec::new();
        match out {
            Value::String(s) => parts.push(s.clone()),
            Value::Array(items) => {
                for item in items {
                    collect_output_item(item, &mut parts);
                }
            }
            _ => {}
        }
        if !parts.is_empty() {
            return Some(parts.join("\n").trim().to_string());
        }
    }

    if let Some(first) = data.get("choices").and_then(|c| c.as_array()).and_then(|c| c.first()) {
        if let Some(content) = first
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
        {
            return Some(content.trim().to_string());
        }
        if let Some(text) = first.get("text").and_then(|t| t.as_str()) {
            return Some(text.trim().to_string());
        }
        if let Some(message) = first.get("message").and_then(|m| m.as_str()) {
            return Some(message.trim().to_string());
        }
    }

    data.get("text")
        .and_then(|t| t.as_str())
        .map(|t| t.trim().to_string())
}

fn collect_output_item(item: &Value, parts: &mut Vec<String>) {
    match item {
        Value::String(s) => parts.push(s.clone()),
        Value::Object(obj) => match obj.get("content") {
            Some(Value::Array(content)) => {
                for c in content {
                    match c {
                        Value::String(s) => parts.push(s.clone()),
                        Value::Object(inner) => {
                            if let Some(text) = inner.get("text").and_then(|t| t.as_str()) {
                                parts.push(text.to_string());
                            }
                        }
                        _ => {}
                    }
                }
            }
            Some(Value::String(s)) => parts.push(s.clone()),
            _ => {
                if let Some(text) = obj.get("text").and_then(|t| t.as_str()) {
                    parts.push(text.to_string());
                }
            }
        },
        _ => {}
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn test_config(base_url: String) -> LlmConfig {
        LlmConfig {
            base_url,
            api_key: Some("test-key".to_string()),
            timeout_secs: 5,
            max_attempts: 3,
            backoff_base_ms: 1,
            max_jitter_ms: 0,
            ..LlmConfig::default()
        }
    }

    fn options() -> GenerationOptions {
        GenerationOptions::new("mistral-medium", 100, 0.0)
    }

    #[test]
    fn test_extract_output_shapes() {
        let data = json!({"output": [{"content": [{"text": "Hello"}, "world"]}]});
        assert_eq!(extract_text_from_response(&data).as_deref(), Some("Hello\nworld"));

        let data = json!({"outputs": "  plain  "});
        assert_eq!(extract_text_from_response(&data).as_deref(), Some("plain"));

        let data = json!({"output": [{"text": "item text"}]});
        assert_eq!(extract_text_from_response(&data).as_deref(), Some("item text"));
    }

    #[test]
    fn test_extract_choices_and_text() {
        let data = json!({"choices": [{"message": {"role": "assistant", "content": " fixed "}}]});
        assert_eq!(extract_text_from_response(&data).as_deref(), Some("fixed"));

        let data = json!({"choices": [{"text": "legacy"}]});
        assert_eq!(extract_text_from_response(&data).as_deref(), Some("legacy"));

        let data = json!({"text": "top"});
        assert_eq!(extract_text_from_response(&data).as_deref(), Some("top"));

        assert!(extract_text_from_response(&json!({"id": 1})).is_none());
    }

    #[tokio::test]
    async fn test_missing_key_is_config_error() {
        let config = LlmConfig {
            api_key: None,
            ..LlmConfig::default()
        };
        let client = MistralClient::new(&config).unwrap();
        assert!(!client.is_configured());

        let err = client.generate("hi", &options()).await.unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg == "Mistral API key not configured"));
    }

    #[tokio::test]
    async fn test_falls_back_to_chat_on_404() {
        let router = Router::new()
            .route(
                "/v1/models/:model/generate",
                post(|| async { (StatusCode::NOT_FOUND, "no such endpoint") }),
            )
            .route(
                "/v1/chat/completions",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["messages"][0]["role"], "user");
                    Json(json!({"choices": [{"message": {"content": "from chat"}}]}))
                }),
            );
        let base = spawn_backend(router).await;

        let client = MistralClient::new(&test_config(base)).unwrap();
        let text = client.generate("fix this", &options()).await.unwrap();
        assert_eq!(text, "from chat");
    }

    #[tokio::test]
    async fn test_retries_server_errors() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/v1/models/:model/generate",
                post(|State(calls): State<Arc<AtomicUsize>>| async move {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({})))
                    } else {
                        (StatusCode::OK, Json(json!({"output": "second try"})))
                    }
                }),
            )
            .with_state(calls.clone());
        let base = spawn_backend(router).await;

        let client = MistralClient::new(&test_config(base)).unwrap();
        let text = client.generate("fix this", &options()).await.unwrap();
        assert_eq!(text, "second try");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/v1/models/:model/generate",
                post(|State(calls): State<Arc<AtomicUsize>>| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::BAD_REQUEST, "bad input")
                }),
            )
            .with_state(calls.clone());
        let base = spawn_backend(router).await;

        let client = MistralClient::new(&test_config(base)).unwrap();
        let err = client.generate("fix this", &options()).await.unwrap_err();
        assert!(matches!(err, Error::LlmStatus { status: 400, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/v1/models/:model/generate",
                post(|State(calls): State<Arc<AtomicUsize>>| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::TOO_MANY_REQUESTS, "slow down")
                }),
            )
            .with_state(calls.clone());
        let base = spawn_backend(router).await;

        let client = MistralClient::new(&test_config(base)).unwrap();
        let err = client.generate("fix this", &options()).await.unwrap_err();
        assert!(matches!(err, Error::LlmStatus { status: 429, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
