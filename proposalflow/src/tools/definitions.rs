//! Tool kinds, capability sets and tool I/O types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// An external capability a stage may invoke.
///
/// The declaration order is the order in which a stage's tools are run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Free-text web search returning ranked snippets.
    WebSearch,
    /// Fetch a page and extract its readable text.
    Scrape,
}

impl ToolKind {
    /// Stable machine name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WebSearch => "web_search",
            Self::Scrape => "scrape",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of tools a stage is allowed to call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolSet(BTreeSet<ToolKind>);

impl ToolSet {
    /// A set granting no tools.
    #[must_use]
    pub const fn none() -> Self {
        Self(BTreeSet::new())
    }

    /// Builds a set from the given kinds.
    #[must_use]
    pub fn of(kinds: impl IntoIterator<Item = ToolKind>) -> Self {
        Self(kinds.into_iter().collect())
    }

    /// Returns true if `kind` is granted.
    #[must_use]
    pub fn allows(&self, kind: ToolKind) -> bool {
        self.0.contains(&kind)
    }

    /// Returns true if no tool is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of granted tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Granted tools in invocation order.
    pub fn iter(&self) -> impl Iterator<Item = ToolKind> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<ToolKind> for ToolSet {
    fn from_iter<I: IntoIterator<Item = ToolKind>>(iter: I) -> Self {
        Self::of(iter)
    }
}

/// One ranked web search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Result title.
    #[serde(default)]
    pub title: String,
    /// Result URL.
    #[serde(default)]
    pub url: String,
    /// Short text snippet.
    #[serde(default)]
    pub snippet: String,
}

impl SearchHit {
    /// Creates a search hit.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }
}

/// Text returned by a tool, ready to be placed into a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Which tool produced the text.
    pub kind: ToolKind,
    /// The query or URL the tool was given.
    pub argument: String,
    /// Rendered result text.
    pub text: String,
}

impl ToolOutput {
    /// Wraps scraped page text.
    #[must_use]
    pub fn scraped(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: ToolKind::Scrape,
            argument: url.into(),
            text: text.into(),
        }
    }

    /// Renders search hits as a numbered list, best first.
    #[must_use]
    pub fn from_hits(query: impl Into<String>, hits: &[SearchHit]) -> Self {
        let text = if hits.is_empty() {
            "No results.".to_string()
        } else {
            hits.iter()
                .enumerate()
                .map(|(i, hit)| format!("{}. {} ({})\n   {}", i + 1, hit.title, hit.url, hit.snippet))
                .collect::<Vec<_>>()
                .join("\n")
        };
        Self {
            kind: ToolKind::WebSearch,
            argument: query.into(),
            text,
        }
    }
}
