//! Client side of the passphrase-gated proxy (`ambientdesk-proxy`).
//!
//! Only the SHA-256 hex of the passphrase is sent; the server compares it
//! with its own `PASSPHRASE_HASH`.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{error_for_status, CompletionClient, CompletionRequest};
use crate::error::CompletionError;
use crate::proxy_server::hash_passphrase;

pub struct ProxyClient {
    client: reqwest::Client,
    url: String,
    passphrase_hash: String,
}

impl ProxyClient {
    pub fn new(client: reqwest::Client, url: &str, passphrase: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            passphrase_hash: hash_passphrase(passphrase),
        }
    }

    fn body(&self, request: &CompletionRequest) -> Value {
        json!({
            "passphraseHash": self.passphrase_hash,
            "systemPrompt": request.system_prompt,
            "userMsg": request.user_message,
            "maxTokens": request.max_tokens,
        })
    }
}

#[async_trait]
impl CompletionClient for ProxyClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let resp = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&self.body(request))
            .send()
            .await?;
        let resp = error_for_status(resp).await?;

        let json: Value = resp
            .json()
            .await
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;
        json.get("content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| CompletionError::InvalidResponse("proxy reply has no content".to_string()))
    }

    fn name(&self) -> &'static str {
        "proxy"
    }
}
