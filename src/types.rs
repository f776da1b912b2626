//! Configuration types
//!
//! Mirrors `~/.ambientdesk/config.json`. Every field has a serde default so
//! a partial (or absent) file still yields a usable configuration.

use serde::{Deserialize, Serialize};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

// =============================================================================
// Language model backend
// =============================================================================

/// Which backend serves completions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmMode {
    /// OpenAI-compatible endpoint, usually llama.cpp on localhost.
    #[default]
    Local,
    /// Hosted Anthropic Messages API.
    Anthropic,
    /// The passphrase-gated proxy (`ambientdesk-proxy`).
    Proxy,
}

impl LlmMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "local" => Some(Self::Local),
            "anthropic" | "api" => Some(Self::Anthropic),
            "proxy" => Some(Self::Proxy),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Local => "local LLM",
            Self::Anthropic => "API",
            Self::Proxy => "proxy",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    #[serde(default)]
    pub mode: LlmMode,
    #[serde(default = "default_local_url")]
    pub local_url: String,
    #[serde(default = "default_local_model")]
    pub local_model: String,
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
    /// Prefer the `ANTHROPIC_API_KEY` environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic_api_key: Option<String>,
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,
    /// Plaintext passphrase; only its SHA-256 hex leaves the process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_chat_max_tokens")]
    pub chat_max_tokens: u32,
    #[serde(default = "default_ambient_max_tokens")]
    pub ambient_max_tokens: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            mode: LlmMode::default(),
            local_url: default_local_url(),
            local_model: default_local_model(),
            anthropic_model: default_anthropic_model(),
            anthropic_api_key: None,
            proxy_url: default_proxy_url(),
            passphrase: None,
            temperature: default_temperature(),
            chat_max_tokens: default_chat_max_tokens(),
            ambient_max_tokens: default_ambient_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_local_url() -> String {
    "http://localhost:8080/v1/chat/completions".to_string()
}

fn default_local_model() -> String {
    "phi-3.5-mini-instruct".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-sonnet-20240620".to_string()
}

fn default_proxy_url() -> String {
    "http://localhost:8888/api/llm".to_string()
}

fn default_temperature() -> f64 {
    0.3
}

fn default_chat_max_tokens() -> u32 {
    500
}

fn default_ambient_max_tokens() -> u32 {
    200
}

fn default_request_timeout_secs() -> u64 {
    60
}

// =============================================================================
// Session workspace
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    /// Start with the example tasks, events and expenses.
    #[serde(default = "default_true")]
    pub seed: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self { seed: true }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.llm.mode, LlmMode::Local);
        assert_eq!(config.llm.local_url, "http://localhost:8080/v1/chat/completions");
        assert_eq!(config.llm.chat_max_tokens, 500);
        assert_eq!(config.llm.ambient_max_tokens, 200);
        assert!((config.llm.temperature - 0.3).abs() < f64::EPSILON);
        assert!(config.workspace.seed);
    }

    #[test]
    fn test_partial_llm_section() {
        let config: Config =
            serde_json::from_str(r#"{"llm": {"mode": "proxy", "passphrase": "open sesame"}}"#)
                .unwrap();
        assert_eq!(config.llm.mode, LlmMode::Proxy);
        assert_eq!(config.llm.passphrase.as_deref(), Some("open sesame"));
        assert_eq!(config.llm.proxy_url, "http://localhost:8888/api/llm");
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(serde_json::from_str::<Config>(r#"{"llm": {"mode": "carrier-pigeon"}}"#).is_err());
    }

    #[test]
    fn test_mode_parse_accepts_api_alias() {
        assert_eq!(LlmMode::parse("API"), Some(LlmMode::Anthropic));
        assert_eq!(LlmMode::parse("nope"), None);
    }
}
