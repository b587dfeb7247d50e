//! Web search backed by a SearxNG instance's JSON API.

use super::config::SearchConfig;
use crate::errors::{ConfigError, ToolError};
use crate::tools::{SearchHit, SearchTool, ToolKind};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct SearxResponse {
    #[serde(default)]
    results: Vec<SearxResult>,
}

#[derive(Debug, Deserialize)]
struct SearxResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

impl From<SearxResult> for SearchHit {
    fn from(r: SearxResult) -> Self {
        Self::new(r.title, r.url, r.content)
    }
}

/// Search adapter for SearxNG.
#[derive(Debug, Clone)]
pub struct SearxSearch {
    config: SearchConfig,
    client: reqwest::Client,
}

impl SearxSearch {
    /// Creates a search adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: SearchConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch.timeout())
            .user_agent(config.fetch.user_agent.clone())
            .build()
            .map_err(|e| ConfigError::invalid("SEARXNG_URL", &config.base_url, e.to_string()))?;
        Ok(Self { config, client })
    }

    /// Gets the configuration.
    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn error(message: impl ToString) -> ToolError {
        ToolError::Http {
            tool: ToolKind::WebSearch,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl SearchTool for SearxSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ToolError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ToolError::InvalidArgument {
                tool: ToolKind::WebSearch,
                message: "search query is empty".to_string(),
            });
        }

        let start = Instant::now();
        let response = self
            .client
            .get(self.config.endpoint())
            .query(&[("q", query), ("format", "json")])
            .send()
            .await
            .map_err(Self::error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Status {
                tool: ToolKind::WebSearch,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(Self::error)?;
        let parsed: SearxResponse = serde_json::from_str(&body).map_err(|e| ToolError::Parse {
            tool: ToolKind::WebSearch,
            message: e.to_string(),
        })?;

        let hits: Vec<SearchHit> = parsed
            .results
            .into_iter()
            .take(self.config.max_results)
            .map(SearchHit::from)
            .collect();

        debug!(
            query = %query,
            hits = hits.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "web search complete"
        );
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_searx_response() {
        let body = r#"{
            "query": "acme",
            "results": [
                {"title": "Acme", "url": "https://acme.test", "content": "Widgets", "score": 3.0},
                {"url": "https://acme.test/about"}
            ]
        }"#;
        let parsed: SearxResponse = serde_json::from_str(body).unwrap();
        let hits: Vec<SearchHit> = parsed.results.into_iter().map(SearchHit::from).collect();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0], SearchHit::new("Acme", "https://acme.test", "Widgets"));
        assert_eq!(hits[1].title, "");
    }

    #[test]
    fn test_parse_searx_response_without_results() {
        let parsed: SearxResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.results.is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_rejected_without_request() {
        let search = SearxSearch::new(SearchConfig::new("http://127.0.0.1:9")).unwrap();
        let err = search.search("   ").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { tool: ToolKind::WebSearch, .. }));
    }
}
