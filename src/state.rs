//! Configuration loading
//!
//! `~/.ambientdesk/config.json` first, then environment overrides, then
//! validation. A missing file is not an error; the defaults point at a
//! local llama.cpp server.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::{Config, LlmMode};

pub const ENV_LLM_MODE: &str = "AMBIENTDESK_LLM_MODE";
pub const ENV_LOCAL_URL: &str = "AMBIENTDESK_LOCAL_URL";
pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_PROXY_URL: &str = "AMBIENTDESK_PROXY_URL";
pub const ENV_PASSPHRASE: &str = "AMBIENTDESK_PASSPHRASE";

/// `~/.ambientdesk`
pub fn get_state_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir()
        .ok_or_else(|| ConfigError::Invalid("Could not find home directory".to_string()))?;
    Ok(home.join(".ambientdesk"))
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(get_state_dir()?.join("config.json"))
}

/// Load configuration from ~/.ambientdesk/config.json plus the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path()?;
    let mut config = load_config_from(&path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;
    Ok(config)
}

/// Read a config file. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        log::info!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Overlay environment variables. `lookup` is `std::env::var` outside tests.
pub fn apply_env_overrides(
    config: &mut Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(mode) = get(ENV_LLM_MODE) {
        config.llm.mode = LlmMode::parse(&mode).ok_or_else(|| {
            ConfigError::Invalid(format!("{} must be local, anthropic or proxy", ENV_LLM_MODE))
        })?;
    }
    if let Some(url) = get(ENV_LOCAL_URL) {
        config.llm.local_url = url;
    }
    if let Some(key) = get(ENV_ANTHROPIC_API_KEY) {
        config.llm.anthropic_api_key = Some(key);
    }
    if let Some(url) = get(ENV_PROXY_URL) {
        config.llm.proxy_url = url;
    }
    if let Some(passphrase) = get(ENV_PASSPHRASE) {
        config.llm.passphrase = Some(passphrase);
    }
    Ok(())
}

/// Reject endpoint URLs that don't parse and nonsensical limits.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    for (name, raw) in [
        ("localUrl", &config.llm.local_url),
        ("proxyUrl", &config.llm.proxy_url),
    ] {
        url::Url::parse(raw)
            .map_err(|e| ConfigError::Invalid(format!("{} {:?}: {}", name, raw, e)))?;
    }
    if config.llm.chat_max_tokens == 0 || config.llm.ambient_max_tokens == 0 {
        return Err(ConfigError::Invalid(
            "max token limits must be positive".to_string(),
        ));
    }
    if config.llm.request_timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "requestTimeoutSecs must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.llm.mode, LlmMode::Local);
    }

    #[test]
    fn test_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"llm": {"mode": "anthropic", "chatMaxTokens": 300}}"#).unwrap();
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.llm.mode, LlmMode::Anthropic);
        assert_eq!(config.llm.chat_max_tokens, 300);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[
                (ENV_LLM_MODE, "proxy"),
                (ENV_PROXY_URL, "https://desk.example.com/api/llm"),
                (ENV_PASSPHRASE, "open sesame"),
                (ENV_LOCAL_URL, "   "),
            ]),
        )
        .unwrap();
        assert_eq!(config.llm.mode, LlmMode::Proxy);
        assert_eq!(config.llm.proxy_url, "https://desk.example.com/api/llm");
        assert_eq!(config.llm.passphrase.as_deref(), Some("open sesame"));
        assert_eq!(config.llm.local_url, Config::default().llm.local_url);
    }

    #[test]
    fn test_env_bad_mode() {
        let mut config = Config::default();
        let result = apply_env_overrides(&mut config, env(&[(ENV_LLM_MODE, "telepathy")]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        assert!(validate(&config).is_ok());
        config.llm.local_url = "not a url".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::Invalid(_))));
    }
}
