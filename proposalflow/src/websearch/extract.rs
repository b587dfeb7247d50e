//! Readable-text extraction from HTML.

use super::config::ExtractionConfig;
use crate::errors::ConfigError;
use scraper::{ElementRef, Html, Selector};

/// Text pulled out of one HTML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    /// Contents of `<title>`, if present.
    pub title: Option<String>,
    /// Whitespace-collapsed body text, one block per line.
    pub text: String,
    /// Number of whitespace-separated words in `text`.
    pub word_count: usize,
}

impl ExtractedText {
    /// Renders title and body as a single prompt-ready string.
    #[must_use]
    pub fn render(&self) -> String {
        match &self.title {
            Some(title) if !self.text.is_empty() => format!("Title: {title}\n\n{}", self.text),
            Some(title) => format!("Title: {title}"),
            None => self.text.clone(),
        }
    }
}

/// Extracts headings, paragraphs and list items from the main content of a page.
#[derive(Debug)]
pub struct TextExtractor {
    config: ExtractionConfig,
    title: Selector,
    text: Selector,
    remove: Vec<Selector>,
    content: Vec<Selector>,
}

fn parse_selector(raw: &str) -> Result<Selector, ConfigError> {
    Selector::parse(raw)
        .map_err(|e| ConfigError::invalid("extraction selector", raw, format!("{e:?}")))
}

impl TextExtractor {
    /// Compiles the selectors in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if any selector is not valid CSS.
    pub fn new(config: ExtractionConfig) -> Result<Self, ConfigError> {
        let title = parse_selector("title")?;
        let text = parse_selector(&config.text_selector)?;
        let remove = config
            .remove_selectors
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>, _>>()?;
        let content = config
            .main_content_selectors
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config,
            title,
            text,
            remove,
            content,
        })
    }

    /// Gets the configuration.
    #[must_use]
    pub const fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extracts readable text from `html`.
    #[must_use]
    pub fn extract(&self, html: &str) -> ExtractedText {
        let document = Html::parse_document(html);

        let title = document
            .select(&self.title)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty());

        let root = self
            .content
            .iter()
            .find_map(|sel| document.select(sel).next())
            .unwrap_or_else(|| document.root_element());

        let mut blocks = Vec::new();
        let mut budget = self.config.max_chars;
        for el in root.select(&self.text) {
            if budget == 0 {
                break;
            }
            if self.is_removed(el) || self.has_text_ancestor(el, root) {
                continue;
            }
            let block = collapse_whitespace(&el.text().collect::<String>());
            if block.is_empty() {
                continue;
            }
            let block = truncate_chars(&block, budget);
            budget = budget.saturating_sub(block.chars().count() + 1);
            blocks.push(block);
        }

        let text = blocks.join("\n");
        let word_count = text.split_whitespace().count();
        ExtractedText {
            title,
            text,
            word_count,
        }
    }

    fn is_removed(&self, el: ElementRef<'_>) -> bool {
        std::iter::once(el)
            .chain(el.ancestors().filter_map(ElementRef::wrap))
            .any(|node| self.remove.iter().any(|sel| sel.matches(&node)))
    }

    // Nested matches (a <p> inside an <li>) are already covered by the outer element.
    fn has_text_ancestor(&self, el: ElementRef<'_>, root: ElementRef<'_>) -> bool {
        el.ancestors()
            .take_while(|node| node.id() != root.id())
            .filter_map(ElementRef::wrap)
            .any(|node| self.text.matches(&node))
    }
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(raw: &str, max: usize) -> String {
    raw.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"
        <html>
          <head><title> Acme  Corp </title><style>p { color: red; }</style></head>
          <body>
            <nav><ul><li>Home</li><li>About</li></ul></nav>
            <main>
              <h1>Industrial   widgets</h1>
              <p>We build widgets
                 for logistics.</p>
              <ul><li><p>Warehouse robots</p></li><li>Route planning</li></ul>
              <script>var tracking = true;</script>
            </main>
            <footer><p>Copyright Acme</p></footer>
          </body>
        </html>
    "#;

    fn extractor() -> TextExtractor {
        TextExtractor::new(ExtractionConfig::default()).unwrap()
    }

    #[test]
    fn test_extracts_main_content_blocks() {
        let extracted = extractor().extract(PAGE);

        assert_eq!(extracted.title.as_deref(), Some("Acme Corp"));
        assert_eq!(
            extracted.text,
            "Industrial widgets\nWe build widgets for logistics.\nWarehouse robots\nRoute planning"
        );
        assert_eq!(extracted.word_count, 11);
    }

    #[test]
    fn test_skips_navigation_and_footer() {
        let extracted = extractor().extract(PAGE);
        assert!(!extracted.text.contains("Home"));
        assert!(!extracted.text.contains("Copyright"));
        assert!(!extracted.text.contains("tracking"));
    }

    #[test]
    fn test_falls_back_to_body() {
        let html = "<html><body><p>Only a paragraph</p></body></html>";
        let extracted = extractor().extract(html);
        assert_eq!(extracted.text, "Only a paragraph");
        assert_eq!(extracted.title, None);
    }

    #[test]
    fn test_respects_max_chars() {
        let config = ExtractionConfig::new().with_max_chars(12);
        let extracted = TextExtractor::new(config).unwrap().extract(PAGE);
        assert!(extracted.text.chars().count() <= 12);
        assert!(extracted.text.starts_with("Industrial"));
    }

    #[test]
    fn test_render_with_title() {
        let extracted = ExtractedText {
            title: Some("Acme".to_string()),
            text: "Widgets".to_string(),
            word_count: 1,
        };
        assert_eq!(extracted.render(), "Title: Acme\n\nWidgets");
    }

    #[test]
    fn test_invalid_selector_is_config_error() {
        let config = ExtractionConfig::new().with_remove_selector("div[");
        let err = TextExtractor::new(config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
