//! Process configuration.
//!
//! [`AppConfig`] is built once at startup from the environment and handed to
//! everything that needs it. A missing credential fails here, before any
//! request can be served.

use crate::errors::ConfigError;
use serde::Serialize;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

/// Env var holding the generative backend credential.
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
/// Env var holding the model identifier.
pub const ENV_MODEL_NAME: &str = "OPENAI_MODEL_NAME";
/// Env var overriding the backend base URL.
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
/// Env var overriding the sampling temperature.
pub const ENV_TEMPERATURE: &str = "OPENAI_TEMPERATURE";
/// Env var capping the completion length of every stage.
pub const ENV_MAX_TOKENS: &str = "OPENAI_MAX_TOKENS";
/// Env var pointing at the SearxNG instance.
pub const ENV_SEARCH_URL: &str = "SEARXNG_URL";
/// Env var with the listen address.
pub const ENV_BIND: &str = "PROPOSALFLOW_BIND";
/// Env var with the number of search hits kept per query.
pub const ENV_SEARCH_RESULTS: &str = "PROPOSALFLOW_SEARCH_RESULTS";
/// Env var with the scraped-text limit.
pub const ENV_SCRAPE_MAX_CHARS: &str = "PROPOSALFLOW_SCRAPE_MAX_CHARS";
/// Env var with the outbound HTTP timeout.
pub const ENV_HTTP_TIMEOUT_SECS: &str = "PROPOSALFLOW_HTTP_TIMEOUT_SECS";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default SearxNG instance.
pub const DEFAULT_SEARCH_URL: &str = "http://localhost:8888";
/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
/// Longest accepted outbound HTTP timeout, in seconds.
pub const MAX_HTTP_TIMEOUT_SECS: u64 = 3600;

/// Configuration shared by the Coordinator, the backend client and the tools.
#[derive(Clone, Serialize)]
pub struct AppConfig {
    /// Backend credential. Never serialized or printed.
    #[serde(skip)]
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// OpenAI-compatible base URL, without trailing slash.
    pub base_url: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion length cap, unset for the backend default.
    pub max_tokens: Option<u32>,
    /// SearxNG base URL.
    pub search_url: String,
    /// HTTP listen address.
    pub bind: SocketAddr,
    /// Search hits kept per query.
    pub search_results: usize,
    /// Scraped-text limit in characters.
    pub scrape_max_chars: usize,
    /// Timeout for every outbound HTTP call, in seconds.
    pub http_timeout_secs: u64,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] when the API key is absent
    /// or blank, and [`ConfigError::Invalid`] for unparsable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a key to its value.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get(ENV_API_KEY).ok_or_else(|| ConfigError::MissingCredential(ENV_API_KEY.to_string()))?;

        let config = Self {
            api_key,
            model: get(ENV_MODEL_NAME).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: get(ENV_BASE_URL)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            temperature: parse_or(ENV_TEMPERATURE, get(ENV_TEMPERATURE), 0.7)?,
            max_tokens: get(ENV_MAX_TOKENS)
                .map(|raw| parse_or(ENV_MAX_TOKENS, Some(raw), 0))
                .transpose()?,
            search_url: get(ENV_SEARCH_URL).unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
            bind: parse_or(ENV_BIND, get(ENV_BIND), default_bind())?,
            search_results: parse_or(ENV_SEARCH_RESULTS, get(ENV_SEARCH_RESULTS), 5)?,
            scrape_max_chars: parse_or(ENV_SCRAPE_MAX_CHARS, get(ENV_SCRAPE_MAX_CHARS), 20_000)?,
            http_timeout_secs: parse_or(ENV_HTTP_TIMEOUT_SECS, get(ENV_HTTP_TIMEOUT_SECS), 60)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges that parsing alone cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential(ENV_API_KEY.to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::invalid(
                ENV_TEMPERATURE,
                self.temperature.to_string(),
                "must be between 0 and 2",
            ));
        }
        if self.max_tokens == Some(0) {
            return Err(ConfigError::invalid(ENV_MAX_TOKENS, "0", "must be at least 1"));
        }
        if self.search_results == 0 {
            return Err(ConfigError::invalid(ENV_SEARCH_RESULTS, "0", "must be at least 1"));
        }
        if !(1..=MAX_HTTP_TIMEOUT_SECS).contains(&self.http_timeout_secs) {
            return Err(ConfigError::invalid(
                ENV_HTTP_TIMEOUT_SECS,
                self.http_timeout_secs.to_string(),
                format!("must be between 1 and {MAX_HTTP_TIMEOUT_SECS}"),
            ));
        }
        Ok(())
    }

    /// Returns a copy listening on `bind`.
    #[must_use]
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("search_url", &self.search_url)
            .field("bind", &self.bind)
            .field("search_results", &self.search_results)
            .field("scrape_max_chars", &self.scrape_max_chars)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(key, value.clone(), e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_credential_fails_fast() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingCredential(ENV_API_KEY.to_string()));
    }

    #[test]
    fn test_blank_credential_is_missing() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_API_KEY, "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential(_)));
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[(ENV_API_KEY, "sk-test")])).unwrap();

        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.search_url, DEFAULT_SEARCH_URL);
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
        assert_eq!(config.search_results, 5);
        assert_eq!(config.scrape_max_chars, 20_000);
        assert_eq!(config.http_timeout_secs, 60);
        assert_eq!(config.max_tokens, None);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_API_KEY, "sk-test"),
            (ENV_MODEL_NAME, "gpt-4o-mini"),
            (ENV_BASE_URL, "http://proxy.local/v1/"),
            (ENV_BIND, "0.0.0.0:8080"),
            (ENV_SEARCH_RESULTS, "8"),
            (ENV_MAX_TOKENS, "512"),
        ]))
        .unwrap();

        assert_eq!(config.max_tokens, Some(512));

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.base_url, "http://proxy.local/v1");
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.search_results, 8);
    }

    #[test]
    fn test_unparsable_value_names_key() {
        let err = AppConfig::from_lookup(lookup(&[
            (ENV_API_KEY, "sk-test"),
            (ENV_HTTP_TIMEOUT_SECS, "soon"),
        ]))
        .unwrap_err();

        match err {
            ConfigError::Invalid { key, value, .. } => {
                assert_eq!(key, ENV_HTTP_TIMEOUT_SECS);
                assert_eq!(value, "soon");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_temperature() {
        let err = AppConfig::from_lookup(lookup(&[
            (ENV_API_KEY, "sk-test"),
            (ENV_TEMPERATURE, "3.5"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_http_timeout_bounds() {
        let huge = u64::MAX.to_string();
        let err = AppConfig::from_lookup(lookup(&[(ENV_API_KEY, "sk-test"), (ENV_HTTP_TIMEOUT_SECS, huge.as_str())]))
            .unwrap_err();
        match err {
            ConfigError::Invalid { key, value, .. } => {
                assert_eq!(key, ENV_HTTP_TIMEOUT_SECS);
                assert_eq!(value, huge);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = AppConfig::from_lookup(lookup(&[(ENV_API_KEY, "sk-test"), (ENV_HTTP_TIMEOUT_SECS, "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let config = AppConfig::from_lookup(lookup(&[(ENV_API_KEY, "sk-test"), (ENV_HTTP_TIMEOUT_SECS, "3600")]))
            .unwrap();
        assert_eq!(config.http_timeout_secs, MAX_HTTP_TIMEOUT_SECS);
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = AppConfig::from_lookup(lookup(&[(ENV_API_KEY, "sk-secret")])).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
