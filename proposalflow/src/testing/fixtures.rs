//! Ready-made configuration and coordinators for tests.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use super::{ScriptedGenerator, StaticScraper, StaticSearch};
use crate::config::{AppConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_SEARCH_URL};
use crate::pipeline::Coordinator;
use crate::stages::stage_table;
use crate::tools::{SearchHit, Toolbox};

/// A valid configuration that never touches the environment.
#[must_use]
pub fn test_config() -> AppConfig {
    AppConfig {
        api_key: "sk-test".to_string(),
        model: DEFAULT_MODEL.to_string(),
        base_url: DEFAULT_BASE_URL.to_string(),
        temperature: 0.5,
        max_tokens: None,
        search_url: DEFAULT_SEARCH_URL.to_string(),
        bind: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
        search_results: 5,
        scrape_max_chars: 20_000,
        http_timeout_secs: 10,
    }
}

/// A toolbox whose search returns one hit and whose scraper returns `page`.
#[must_use]
pub fn static_toolbox(page: &str) -> Toolbox {
    Toolbox::new(
        Arc::new(StaticSearch::new(vec![SearchHit::new(
            "Example Domain",
            "https://example.com",
            "This domain is for use in illustrative examples.",
        )])),
        Arc::new(StaticScraper::new(page)),
    )
}

/// A coordinator over the canonical table, `generator` and a static toolbox.
///
/// # Panics
///
/// Panics if the canonical table is invalid.
#[must_use]
#[allow(clippy::expect_used)]
pub fn scripted_coordinator(generator: Arc<ScriptedGenerator>) -> Coordinator {
    Coordinator::new(stage_table(), generator, static_toolbox("Example Domain"))
        .expect("canonical stage table is valid")
}
