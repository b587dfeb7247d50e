//! HTTP-backed tool adapters.
//!
//! This module provides:
//! - Configuration for fetching, searching and extraction
//! - Readable-text extraction from HTML
//! - A SearxNG search adapter and an HTTP page scraper

mod config;
mod extract;
mod scrape;
mod searx;

pub use config::{ExtractionConfig, FetchConfig, SearchConfig};
pub use extract::{ExtractedText, TextExtractor};
pub use scrape::HttpScraper;
pub use searx::SearxSearch;

use crate::config::AppConfig;
use crate::errors::ConfigError;
use crate::tools::Toolbox;
use std::sync::Arc;

/// Builds the production toolbox from the application config.
///
/// # Errors
///
/// Returns an error if an HTTP client or extraction selector cannot be built.
pub fn toolbox_from_config(config: &AppConfig) -> Result<Toolbox, ConfigError> {
    let search = SearxSearch::new(SearchConfig::from_app(config))?;
    let extractor = TextExtractor::new(ExtractionConfig::new().with_max_chars(config.scrape_max_chars))?;
    let scraper = HttpScraper::new(FetchConfig::from_app(config), extractor)?;
    Ok(Toolbox::new(Arc::new(search), Arc::new(scraper)))
}
