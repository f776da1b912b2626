//! Passphrase-gated completion proxy.
//!
//! Keeps the provider API key off the client: callers send the SHA-256 hex
//! of a shared passphrase, the proxy compares it with `PASSPHRASE_HASH`
//! and forwards the prompt to Gemini. One route, `/api/llm`.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::error::{ConfigError, ProxyError};

pub const ROUTE: &str = "/api/llm";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_PROXY_ADDR: &str = "127.0.0.1:8888";
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const PROXY_TEMPERATURE: f64 = 0.3;

/// Lowercase hex SHA-256, the form stored in `PASSPHRASE_HASH`.
pub fn hash_passphrase(passphrase: &str) -> String {
    hex::encode(Sha256::digest(passphrase.as_bytes()))
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub passphrase_hash: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub addr: SocketAddr,
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Missing secrets are allowed here; requests fail with 403/500 instead.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let addr_raw = get("PROXY_ADDR").unwrap_or_else(|| DEFAULT_PROXY_ADDR.to_string());
        let addr = addr_raw
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("PROXY_ADDR {:?}: {}", addr_raw, e)))?;

        Ok(Self {
            passphrase_hash: get("PASSPHRASE_HASH").map(|h| h.trim().to_lowercase()),
            api_key: get("GEMINI_API_KEY"),
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            addr,
        })
    }
}

// =============================================================================
// Upstream provider
// =============================================================================

/// The hosted model behind the proxy. Returns the provider's JSON body
/// as-is; error objects are interpreted by the handler.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn generate(&self, api_key: &str, model: &str, body: &Value) -> Result<Value, ProxyError>;
}

pub struct GeminiUpstream {
    client: reqwest::Client,
}

impl GeminiUpstream {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for GeminiUpstream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Upstream for GeminiUpstream {
    async fn generate(&self, api_key: &str, model: &str, body: &Value) -> Result<Value, ProxyError> {
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, model);
        let resp = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| ProxyError::Internal(format!("Gemini request failed: {}", e)))?;

        resp.json()
            .await
            .map_err(|e| ProxyError::Internal(format!("Failed to parse Gemini response: {}", e)))
    }
}

// =============================================================================
// Request handling
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmRequest {
    #[serde(default)]
    pub passphrase_hash: Option<String>,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub user_msg: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_max_tokens() -> u32 {
    500
}

pub fn gemini_body(request: &LlmRequest) -> Value {
    json!({
        "system_instruction": { "parts": [{ "text": request.system_prompt }] },
        "contents": [{ "role": "user", "parts": [{ "text": request.user_msg }] }],
        "generationConfig": {
            "temperature": PROXY_TEMPERATURE,
            "maxOutputTokens": request.max_tokens,
            "responseMimeType": "application/json",
        },
    })
}

/// Last part of the first candidate that carries text. Thinking models put
/// their reasoning parts first, so the answer is at the end.
pub fn extract_gemini_text(data: &Value) -> String {
    data.pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .and_then(|parts| {
            parts
                .iter()
                .rev()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .find(|text| !text.is_empty())
        })
        .unwrap_or("{}")
        .to_string()
}

pub struct ProxyState {
    pub config: ProxyConfig,
    pub upstream: Arc<dyn Upstream>,
}

/// Validate, forward, and shape the `{content}` reply.
pub async fn handle_llm_request(state: &ProxyState, request: LlmRequest) -> Result<Value, ProxyError> {
    let expected = state
        .config
        .passphrase_hash
        .as_deref()
        .ok_or(ProxyError::InvalidPassphrase)?;
    match request.passphrase_hash.as_deref() {
        Some(given) if hashes_match(given, expected) => {}
        _ => {
            log::warn!("Proxy: rejected request with bad passphrase hash");
            return Err(ProxyError::InvalidPassphrase);
        }
    }

    let api_key = state
        .config
        .api_key
        .as_deref()
        .ok_or(ProxyError::MissingApiKey)?;

    let data = state
        .upstream
        .generate(api_key, &state.config.model, &gemini_body(&request))
        .await?;

    if let Some(error) = data.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Gemini API error")
            .to_string();
        log::error!("Proxy: Gemini API error: {}", error);
        return Err(ProxyError::Upstream(message));
    }

    Ok(json!({ "content": extract_gemini_text(&data) }))
}

/// Compare hex digests without an early exit on the first differing byte.
fn hashes_match(given: &str, expected: &str) -> bool {
    let (Ok(given), Ok(expected)) = (hex::decode(given.trim()), hex::decode(expected)) else {
        return false;
    };
    if given.len() != expected.len() {
        return false;
    }
    given
        .iter()
        .zip(&expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

// =============================================================================
// HTTP surface
// =============================================================================

fn cors_headers() -> [(header::HeaderName, &'static str); 3] {
    [
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
    ]
}

fn error_response(err: &ProxyError) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, cors_headers(), Json(json!({ "error": err.to_string() }))).into_response()
}

async fn llm_handler(State(state): State<Arc<ProxyState>>, body: Bytes) -> Response {
    let request: LlmRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return error_response(&ProxyError::BadRequest(e.to_string())),
    };

    match handle_llm_request(&state, request).await {
        Ok(reply) => (StatusCode::OK, cors_headers(), Json(reply)).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn preflight_handler() -> Response {
    (StatusCode::NO_CONTENT, cors_headers()).into_response()
}

async fn method_not_allowed_handler() -> Response {
    error_response(&ProxyError::MethodNotAllowed)
}

pub fn router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route(
            ROUTE,
            post(llm_handler)
                .options(preflight_handler)
                .fallback(method_not_allowed_handler),
        )
        .with_state(state)
}

/// Bind and serve until the process exits.
pub async fn serve(state: ProxyState) -> std::io::Result<()> {
    let addr = state.config.addr;
    if state.config.passphrase_hash.is_none() {
        log::warn!("Proxy: PASSPHRASE_HASH is not set, every request will be rejected");
    }
    if state.config.api_key.is_none() {
        log::warn!("Proxy: GEMINI_API_KEY is not set");
    }
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Proxy: listening on http://{}{}", addr, ROUTE);
    axum::serve(listener, router(Arc::new(state))).await
}
