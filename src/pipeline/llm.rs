//! Claude API access for the extraction and narrative stages, plus the
//! process-wide token/cost accounting.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Extraction replies can take minutes on long documents.
const REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("ANTHROPIC_API_KEY is not set")]
    MissingApiKey,
    #[error("Cannot reach the Claude API at {0}")]
    Connection(String),
    #[error("HTTP client error: {0}")]
    Http(String),
    #[error("Claude API returned an error (HTTP {status}): {body}")]
    Api { status: u16, body: String },
    #[error("Failed to parse Claude API response: {0}")]
    ResponseParsing(String),
}

/// Token counts reported by the API for a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

/// One model reply with its usage accounting.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

/// Chat-completion abstraction over the Claude API (allows mocking).
/// The model is fixed per client instance; extraction and narrative
/// generation hold differently configured clients.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        system: Option<&str>,
    ) -> Result<Completion, LlmError>;
}

/// Anthropic Messages API client.
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl ClaudeClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_key: api_key.to_string(),
            base_url: ANTHROPIC_BASE_URL.to_string(),
            model: model.to_string(),
        }
    }

    /// Build a client from ANTHROPIC_API_KEY.
    pub fn from_env(model: &str) -> Result<Self, LlmError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;
        Ok(Self::new(&api_key, model))
    }

    /// Point the client at a different endpoint (tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Request body for the Messages API.
#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Response body from the Messages API.
#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl CompletionClient for ClaudeClient {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        system: Option<&str>,
    ) -> Result<Completion, LlmError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest {
            model: &self.model,
            max_tokens,
            system,
            messages: vec![ApiMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    LlmError::Http(format!("Request timed out after {REQUEST_TIMEOUT_SECS}s"))
                } else {
                    LlmError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        let text = parsed
            .content
            .iter()
            .find_map(|block| block.text.clone())
            .ok_or_else(|| {
                LlmError::ResponseParsing("reply contained no text content".to_string())
            })?;

        Ok(Completion {
            text,
            usage: parsed.usage,
        })
    }
}

/// Mock completion client for testing — returns a configurable reply.
pub struct MockCompletionClient {
    reply: String,
    usage: TokenUsage,
}

impl MockCompletionClient {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            usage: TokenUsage {
                input_tokens: 1_000,
                output_tokens: 500,
            },
        }
    }

    pub fn with_usage(mut self, input_tokens: u64, output_tokens: u64) -> Self {
        self.usage = TokenUsage {
            input_tokens,
            output_tokens,
        };
        self
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(
        &self,
        _prompt: &str,
        _max_tokens: u32,
        _system: Option<&str>,
    ) -> Result<Completion, LlmError> {
        Ok(Completion {
            text: self.reply.clone(),
            usage: self.usage,
        })
    }
}

/// Mock client whose calls always fail (fallback-path tests).
pub struct FailingCompletionClient;

#[async_trait]
impl CompletionClient for FailingCompletionClient {
    async fn complete(
        &self,
        _prompt: &str,
        _max_tokens: u32,
        _system: Option<&str>,
    ) -> Result<Completion, LlmError> {
        Err(LlmError::Api {
            status: 529,
            body: "overloaded".to_string(),
        })
    }
}

/// Running totals across every API call made by this process. Counters are
/// atomic; cost is derived from the token counters at read time, so
/// concurrent recording never needs a lock.
#[derive(Debug, Default)]
pub struct UsageTracker {
    calls: AtomicU64,
    input_tokens: AtomicU64,
    output_tokens: AtomicU64,
}

/// Point-in-time view of the tracker, in API-response form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageSnapshot {
    pub total_calls: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_cost: f64,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, usage: &TokenUsage) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.input_tokens
            .fetch_add(usage.input_tokens, Ordering::Relaxed);
        self.output_tokens
            .fetch_add(usage.output_tokens, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        let input_tokens = self.input_tokens.load(Ordering::Relaxed);
        let output_tokens = self.output_tokens.load(Ordering::Relaxed);
        UsageSnapshot {
            total_calls: self.calls.load(Ordering::Relaxed),
            input_tokens,
            output_tokens,
            total_cost: round_cost(
                input_tokens as f64 * config::INPUT_COST_PER_MTOK / 1e6
                    + output_tokens as f64 * config::OUTPUT_COST_PER_MTOK / 1e6,
            ),
        }
    }
}

/// Costs are reported to four decimal places, fractions of a cent.
fn round_cost(cost: f64) -> f64 {
    (cost * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn mock_client_returns_configured_reply() {
        let client = MockCompletionClient::new("שלום");
        let completion = client.complete("prompt", 100, None).await.unwrap();
        assert_eq!(completion.text, "שלום");
        assert_eq!(completion.usage.input_tokens, 1_000);
    }

    #[tokio::test]
    async fn failing_client_returns_api_error() {
        let result = FailingCompletionClient.complete("prompt", 100, None).await;
        assert!(matches!(result, Err(LlmError::Api { status: 529, .. })));
    }

    #[test]
    fn claude_client_constructor() {
        let client = ClaudeClient::new("sk-test", config::EXTRACTION_MODEL);
        assert_eq!(client.base_url, ANTHROPIC_BASE_URL);
        assert_eq!(client.model(), config::EXTRACTION_MODEL);
    }

    #[test]
    fn base_url_override_trims_trailing_slash() {
        let client =
            ClaudeClient::new("sk-test", "model").with_base_url("http://localhost:9999/");
        assert_eq!(client.base_url, "http://localhost:9999");
    }

    #[test]
    fn system_prompt_omitted_from_request_when_absent() {
        let body = MessagesRequest {
            model: "m",
            max_tokens: 10,
            system: None,
            messages: vec![ApiMessage {
                role: "user",
                content: "hi",
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("system").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn tracker_accumulates_usage() {
        let tracker = UsageTracker::new();
        tracker.record(&TokenUsage {
            input_tokens: 1_000,
            output_tokens: 500,
        });
        tracker.record(&TokenUsage {
            input_tokens: 2_000,
            output_tokens: 100,
        });

        let snap = tracker.snapshot();
        assert_eq!(snap.total_calls, 2);
        assert_eq!(snap.input_tokens, 3_000);
        assert_eq!(snap.output_tokens, 600);
    }

    #[test]
    fn cost_uses_sonnet_pricing() {
        let tracker = UsageTracker::new();
        tracker.record(&TokenUsage {
            input_tokens: 1_000_000,
            output_tokens: 1_000_000,
        });
        // $3/MTok in + $15/MTok out
        assert!((tracker.snapshot().total_cost - 18.0).abs() < 1e-9);
    }

    #[test]
    fn cost_rounds_to_four_decimals() {
        let tracker = UsageTracker::new();
        tracker.record(&TokenUsage {
            input_tokens: 1_234,
            output_tokens: 567,
        });
        // 1234 * 3/1M + 567 * 15/1M = 0.012207 → 0.0122
        assert!((tracker.snapshot().total_cost - 0.0122).abs() < 1e-9);
    }

    #[test]
    fn tracker_is_safe_under_concurrent_recording() {
        let tracker = Arc::new(UsageTracker::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let tracker = Arc::clone(&tracker);
            handles.push(std::thread::spawn(move || {
                for _ in 0..1_000 {
                    tracker.record(&TokenUsage {
                        input_tokens: 10,
                        output_tokens: 1,
                    });
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let snap = tracker.snapshot();
        assert_eq!(snap.total_calls, 8_000);
        assert_eq!(snap.input_tokens, 80_000);
        assert_eq!(snap.output_tokens, 8_000);
    }
}
