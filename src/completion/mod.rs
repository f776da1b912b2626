//! Completion capability: system prompt + user message in, raw text out.
//!
//! The orchestrator only sees `CompletionClient`. Which backend sits behind
//! it (local llama.cpp, the Anthropic API, or the passphrase-gated proxy)
//! is a configuration choice. Cancellation is the caller's job: dropping
//! the future aborts the HTTP request.

pub mod anthropic;
pub mod local;
pub mod proxy;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::CompletionError;
use crate::types::{LlmConfig, LlmMode};

pub use anthropic::AnthropicClient;
pub use local::LocalClient;
pub use proxy::ProxyClient;

/// One completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_message: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Raw model text, unparsed.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;

    /// Short backend label for logs and the console banner.
    fn name(&self) -> &'static str;
}

/// Build the backend selected by `config.mode`.
pub fn client_from_config(config: &LlmConfig) -> Result<Arc<dyn CompletionClient>, CompletionError> {
    let http = http_client(config.request_timeout_secs)?;
    let client: Arc<dyn CompletionClient> = match config.mode {
        LlmMode::Local => Arc::new(LocalClient::new(http, &config.local_url, &config.local_model)),
        LlmMode::Anthropic => {
            let key = config.anthropic_api_key.as_deref().ok_or_else(|| {
                CompletionError::Configuration("anthropic mode needs ANTHROPIC_API_KEY".to_string())
            })?;
            Arc::new(AnthropicClient::new(http, key, &config.anthropic_model))
        }
        LlmMode::Proxy => {
            let passphrase = config.passphrase.as_deref().ok_or_else(|| {
                CompletionError::Configuration(
                    "proxy mode needs a passphrase (AMBIENTDESK_PASSPHRASE)".to_string(),
                )
            })?;
            Arc::new(ProxyClient::new(http, &config.proxy_url, passphrase))
        }
    };
    log::info!("Completion backend: {}", client.name());
    Ok(client)
}

fn http_client(timeout_secs: u64) -> Result<reqwest::Client, CompletionError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| CompletionError::Configuration(format!("HTTP client: {}", e)))
}

/// Turn a non-2xx response into `CompletionError::Http`, keeping the body
/// (or its `error` field) as the message.
pub(crate) async fn error_for_status(
    resp: reqwest::Response,
) -> Result<reqwest::Response, CompletionError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| error_message(&v))
        .unwrap_or(text);
    Err(CompletionError::Http {
        status: status.as_u16(),
        message,
    })
}

/// `{"error": "..."}` or `{"error": {"message": "..."}}`.
fn error_message(body: &serde_json::Value) -> Option<String> {
    let error = body.get("error")?;
    error
        .as_str()
        .or_else(|| error.get("message").and_then(|m| m.as_str()))
        .map(str::to_string)
}
