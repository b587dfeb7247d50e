//! Dispatch from tool kind to adapter.

use super::{ScrapeTool, SearchTool, ToolKind, ToolOutput};
use crate::errors::ToolError;
use std::fmt;
use std::sync::Arc;

/// Holds one adapter per tool kind.
///
/// Cloning is cheap; adapters are shared behind `Arc`.
#[derive(Clone)]
pub struct Toolbox {
    search: Arc<dyn SearchTool>,
    scrape: Arc<dyn ScrapeTool>,
}

impl Toolbox {
    /// Creates a toolbox from the two adapters.
    #[must_use]
    pub fn new(search: Arc<dyn SearchTool>, scrape: Arc<dyn ScrapeTool>) -> Self {
        Self { search, scrape }
    }

    /// Invokes the adapter for `kind` with `argument`.
    pub async fn invoke(&self, kind: ToolKind, argument: &str) -> Result<ToolOutput, ToolError> {
        match kind {
            ToolKind::WebSearch => {
                let hits = self.search.search(argument).await?;
                Ok(ToolOutput::from_hits(argument, &hits))
            }
            ToolKind::Scrape => {
                let text = self.scrape.scrape(argument).await?;
                Ok(ToolOutput::scraped(argument, text))
            }
        }
    }
}

impl fmt::Debug for Toolbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toolbox").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingScraper, StaticScraper, StaticSearch};
    use crate::tools::SearchHit;

    #[tokio::test]
    async fn test_invoke_search() {
        let toolbox = Toolbox::new(
            Arc::new(StaticSearch::new(vec![SearchHit::new("Acme", "https://acme.test", "Widgets")])),
            Arc::new(StaticScraper::new("page")),
        );

        let output = toolbox.invoke(ToolKind::WebSearch, "acme widgets").await.unwrap();
        assert_eq!(output.kind, ToolKind::WebSearch);
        assert_eq!(output.argument, "acme widgets");
        assert!(output.text.contains("Widgets"));
    }

    #[tokio::test]
    async fn test_invoke_scrape_error_propagates() {
        let toolbox = Toolbox::new(
            Arc::new(StaticSearch::default()),
            Arc::new(FailingScraper::new(404)),
        );

        let err = toolbox.invoke(ToolKind::Scrape, "https://acme.test").await.unwrap_err();
        assert_eq!(err.tool(), ToolKind::Scrape);
    }
}
