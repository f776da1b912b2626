//! OpenAI-compatible chat completions endpoint (llama.cpp, LM Studio, ...).

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{error_for_status, CompletionClient, CompletionRequest};
use crate::error::CompletionError;

pub struct LocalClient {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl LocalClient {
    pub fn new(client: reqwest::Client, url: &str, model: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            model: model.to_string(),
        }
    }

    fn body(&self, request: &CompletionRequest) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.user_message },
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "response_format": { "type": "json_object" },
        })
    }
}

#[async_trait]
impl CompletionClient for LocalClient {
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
        Ok(extract_content(&json))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// `choices[0].message.content`, or `"{}"` when absent or empty.
fn extract_content(json: &Value) -> String {
    json.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or("{}")
        .to_string()
}
