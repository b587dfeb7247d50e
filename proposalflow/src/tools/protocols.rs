//! Adapter traits for the external tools.
//!
//! Each tool kind has one trait so a stage's capability set maps directly
//! onto a concrete implementation held by the [`Toolbox`](super::Toolbox).

use super::SearchHit;
use crate::errors::ToolError;
use async_trait::async_trait;

/// Free-text web search.
#[async_trait]
pub trait SearchTool: Send + Sync {
    /// Runs `query` and returns hits in ranking order.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ToolError>;
}

/// Page fetch plus readable-text extraction.
#[async_trait]
pub trait ScrapeTool: Send + Sync {
    /// Fetches `url` and returns its extracted text.
    async fn scrape(&self, url: &str) -> Result<String, ToolError>;
}
