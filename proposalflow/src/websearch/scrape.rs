//! Page scraping over HTTP.

use super::config::FetchConfig;
use super::extract::TextExtractor;
use crate::errors::{ConfigError, ToolError};
use crate::tools::{ScrapeTool, ToolKind};
use async_trait::async_trait;
use reqwest::Url;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Scrape adapter that fetches a page and extracts its readable text.
#[derive(Debug, Clone)]
pub struct HttpScraper {
    config: FetchConfig,
    extractor: Arc<TextExtractor>,
    client: reqwest::Client,
}

impl HttpScraper {
    /// Creates a scraper.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: FetchConfig, extractor: TextExtractor) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ConfigError::invalid("user agent", &config.user_agent, e.to_string()))?;
        Ok(Self {
            config,
            extractor: Arc::new(extractor),
            client,
        })
    }

    /// Gets the configuration.
    #[must_use]
    pub const fn config(&self) -> &FetchConfig {
        &self.config
    }
}

/// Parses `raw` as an absolute http(s) URL.
fn parse_target(raw: &str) -> Result<Url, ToolError> {
    let invalid = |message: String| ToolError::InvalidArgument {
        tool: ToolKind::Scrape,
        message,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(format!("'{raw}' is not a URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

/// Reads at most `limit` body bytes, then stops pulling from the socket.
async fn read_limited(response: &mut reqwest::Response, limit: usize) -> Result<Vec<u8>, ToolError> {
    let mut body = Vec::with_capacity(limit.min(64 * 1024));
    while body.len() < limit {
        let chunk = response.chunk().await.map_err(|e| ToolError::Http {
            tool: ToolKind::Scrape,
            message: e.to_string(),
        })?;
        let Some(chunk) = chunk else { break };
        let take = chunk.len().min(limit - body.len());
        body.extend_from_slice(&chunk[..take]);
    }
    Ok(body)
}

#[async_trait]
impl ScrapeTool for HttpScraper {
    async fn scrape(&self, url: &str) -> Result<String, ToolError> {
        let target = parse_target(url)?;
        let start = Instant::now();

        let mut response = self
            .client
            .get(target.clone())
            .send()
            .await
            .map_err(|e| ToolError::Http {
                tool: ToolKind::Scrape,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Status {
                tool: ToolKind::Scrape,
                status: status.as_u16(),
            });
        }

        let limit = self.config.max_response_size;
        if let Some(length) = response.content_length() {
            if length > u64::try_from(limit).unwrap_or(u64::MAX) {
                return Err(ToolError::Http {
                    tool: ToolKind::Scrape,
                    message: format!("response of {length} bytes exceeds the {limit} byte limit"),
                });
            }
        }

        let body = read_limited(&mut response, limit).await?;
        let html = String::from_utf8_lossy(&body);

        let extracted = self.extractor.extract(&html);
        debug!(
            url = %target,
            words = extracted.word_count,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "scrape complete"
        );
        Ok(extracted.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websearch::ExtractionConfig;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const CHUNK: usize = 64 * 1024;
    const CHUNKS: usize = 1024;

    fn scraper(max_response_size: usize) -> HttpScraper {
        HttpScraper::new(
            FetchConfig::new().with_timeout(10.0).with_max_response_size(max_response_size),
            TextExtractor::new(ExtractionConfig::default()).unwrap(),
        )
        .unwrap()
    }

    /// Serves one connection: writes `head`, then up to 64 MiB of page body.
    /// Resolves to the number of body bytes the socket accepted.
    async fn serve_large_page(head: &'static str) -> (SocketAddr, JoinHandle<usize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            if socket.write_all(head.as_bytes()).await.is_err() {
                return 0;
            }
            let _ = socket.write_all(b"<html><body><main><p>").await;
            let chunk: Vec<u8> = b"lorem ipsum ".iter().copied().cycle().take(CHUNK).collect();
            let mut written = 0;
            for _ in 0..CHUNKS {
                if socket.write_all(&chunk).await.is_err() {
                    break;
                }
                written += chunk.len();
            }
            written
        });
        (addr, handle)
    }

    #[test]
    fn test_parse_target_accepts_http() {
        let url = parse_target(" https://example.com/about ").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_parse_target_rejects_garbage() {
        assert!(matches!(
            parse_target("not a url"),
            Err(ToolError::InvalidArgument { tool: ToolKind::Scrape, .. })
        ));
        assert!(parse_target("").is_err());
        assert!(parse_target("ftp://example.com").is_err());
    }

    #[tokio::test]
    async fn test_scrape_empty_input_fails_before_fetch() {
        let scraper = HttpScraper::new(
            FetchConfig::default(),
            TextExtractor::new(ExtractionConfig::default()).unwrap(),
        )
        .unwrap();

        let err = scraper.scrape("").await.unwrap_err();
        assert_eq!(err.tool(), ToolKind::Scrape);
    }

    #[tokio::test]
    async fn test_scrape_stops_reading_at_size_limit() {
        let (addr, server) =
            serve_large_page("HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n").await;

        let text = scraper(1024).scrape(&format!("http://{addr}/")).await.unwrap();
        assert!(text.contains("lorem ipsum"));
        assert!(text.len() <= 1024);

        let written = tokio::time::timeout(Duration::from_secs(10), server)
            .await
            .unwrap()
            .unwrap();
        assert!(written < CHUNK * CHUNKS, "server delivered the whole body");
    }

    #[tokio::test]
    async fn test_scrape_rejects_oversized_content_length() {
        let (addr, _server) = serve_large_page(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 67108864\r\n\r\n",
        )
        .await;

        let err = scraper(1024).scrape(&format!("http://{addr}/")).await.unwrap_err();
        match err {
            ToolError::Http { tool, message } => {
                assert_eq!(tool, ToolKind::Scrape);
                assert!(message.contains("exceeds the 1024 byte limit"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
