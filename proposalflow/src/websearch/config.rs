//! Configuration types for fetching, searching and extraction.

use crate::config::AppConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for HTTP fetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum response size in bytes.
    #[serde(default = "default_max_size")]
    pub max_response_size: usize,
}

fn default_timeout() -> f64 {
    30.0
}

fn default_user_agent() -> String {
    concat!("proposalflow/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_max_size() -> usize {
    5 * 1024 * 1024 // 5MB
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
            max_response_size: default_max_size(),
        }
    }
}

impl FetchConfig {
    /// Creates a new fetch configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the response size limit.
    #[must_use]
    pub fn with_max_response_size(mut self, bytes: usize) -> Self {
        self.max_response_size = bytes;
        self
    }

    /// Gets timeout as Duration.
    ///
    /// Values that are negative, not finite or too large for a `Duration`
    /// fall back to the default timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_seconds)
            .unwrap_or_else(|_| Duration::from_secs_f64(default_timeout()))
    }

    /// Derives fetch settings from the application config.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_app(config: &AppConfig) -> Self {
        Self::default().with_timeout(config.http_timeout_secs as f64)
    }
}

/// Configuration for the SearxNG search backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the SearxNG instance.
    pub base_url: String,
    /// Number of hits to keep.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Shared fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,
}

fn default_max_results() -> usize {
    5
}

impl SearchConfig {
    /// Creates a search configuration for `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_results: default_max_results(),
            fetch: FetchConfig::default(),
        }
    }

    /// Sets the number of hits to keep.
    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Derives search settings from the application config.
    #[must_use]
    pub fn from_app(config: &AppConfig) -> Self {
        let mut search = Self::new(&config.search_url).with_max_results(config.search_results);
        search.fetch = FetchConfig::from_app(config);
        search
    }

    /// The JSON search endpoint.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

/// Configuration for readable-text extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// CSS selectors whose contents are never extracted.
    #[serde(default = "default_remove_selectors")]
    pub remove_selectors: Vec<String>,
    /// CSS selectors tried in order to find the main content.
    #[serde(default = "default_content_selectors")]
    pub main_content_selectors: Vec<String>,
    /// CSS selector for the text-bearing elements inside the content root.
    #[serde(default = "default_text_selector")]
    pub text_selector: String,
    /// Maximum length of extracted text in characters.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

fn default_remove_selectors() -> Vec<String> {
    vec![
        "script".to_string(),
        "style".to_string(),
        "noscript".to_string(),
        "nav".to_string(),
        "footer".to_string(),
        "aside".to_string(),
        ".cookie-banner".to_string(),
        "#cookie-banner".to_string(),
    ]
}

fn default_content_selectors() -> Vec<String> {
    vec![
        "main".to_string(),
        "article".to_string(),
        "[role=\"main\"]".to_string(),
        "#content".to_string(),
        "body".to_string(),
    ]
}

fn default_text_selector() -> String {
    "h1, h2, h3, h4, h5, h6, p, li".to_string()
}

fn default_max_chars() -> usize {
    20_000
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            remove_selectors: default_remove_selectors(),
            main_content_selectors: default_content_selectors(),
            text_selector: default_text_selector(),
            max_chars: default_max_chars(),
        }
    }
}

impl ExtractionConfig {
    /// Creates a new extraction configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the extracted text limit.
    #[must_use]
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Adds a selector to remove.
    #[must_use]
    pub fn with_remove_selector(mut self, selector: impl Into<String>) -> Self {
        self.remove_selectors.push(selector.into());
        self
    }
}
