//! Test doubles for the generative backend and the tool adapters.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::core::StageId;
use crate::errors::{GenerationError, ToolError};
use crate::llm::{GenerationRequest, GenerationResponse, TextGenerator};
use crate::stages::{stage_table, StageSpec};
use crate::tools::{ScrapeTool, SearchHit, SearchTool, ToolKind};

/// Model name reported by [`ScriptedGenerator`].
pub const SCRIPTED_MODEL: &str = "scripted";

#[derive(Debug, Clone)]
enum Script {
    Answer(String),
    Empty,
    Fail(GenerationError),
}

/// A generator that answers per stage and records every request.
///
/// The stage is recognised by the role named in the system message, so the
/// generator must be built from the same table the Coordinator runs. Stages
/// without a scripted answer reply with `"<label> notes for <input>"`.
#[derive(Debug)]
pub struct ScriptedGenerator {
    roles: Vec<(StageId, String)>,
    scripts: Mutex<HashMap<StageId, Script>>,
    requests: Mutex<Vec<(StageId, GenerationRequest)>>,
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::for_table(&stage_table())
    }
}

impl ScriptedGenerator {
    /// Creates a generator for the canonical table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator recognising the roles of `stages`.
    #[must_use]
    pub fn for_table(stages: &[StageSpec]) -> Self {
        Self {
            roles: stages.iter().map(|s| (s.id, s.role.clone())).collect(),
            scripts: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers `stage` with `text`.
    #[must_use]
    pub fn with_answer(self, stage: StageId, text: impl Into<String>) -> Self {
        self.scripts.lock().insert(stage, Script::Answer(text.into()));
        self
    }

    /// Fails `stage` with `error`.
    #[must_use]
    pub fn failing_on(self, stage: StageId, error: GenerationError) -> Self {
        self.scripts.lock().insert(stage, Script::Fail(error));
        self
    }

    /// Answers `stage` with blank content.
    #[must_use]
    pub fn empty_on(self, stage: StageId) -> Self {
        self.scripts.lock().insert(stage, Script::Empty);
        self
    }

    /// Every request received, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<(StageId, GenerationRequest)> {
        self.requests.lock().clone()
    }

    /// Stages called, in arrival order.
    #[must_use]
    pub fn called_stages(&self) -> Vec<StageId> {
        self.requests.lock().iter().map(|(s, _)| *s).collect()
    }

    /// Number of requests received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn stage_of(&self, request: &GenerationRequest) -> Option<StageId> {
        let system = request.system_text()?;
        self.roles
            .iter()
            .find(|(_, role)| system.contains(role.as_str()))
            .map(|(id, _)| *id)
    }
}

fn input_of(request: &GenerationRequest) -> &str {
    request
        .user_text()
        .and_then(|text| text.lines().find_map(|l| l.strip_prefix("Company URL: ")))
        .unwrap_or_default()
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, GenerationError> {
        let stage = self
            .stage_of(request)
            .ok_or_else(|| GenerationError::InvalidRequest("no scripted stage matches this request".to_string()))?;
        self.requests.lock().push((stage, request.clone()));

        let script = self.scripts.lock().get(&stage).cloned();
        match script {
            Some(Script::Answer(text)) => Ok(GenerationResponse::text(text, SCRIPTED_MODEL)),
            Some(Script::Empty) => Ok(GenerationResponse::text("   ", SCRIPTED_MODEL)),
            Some(Script::Fail(err)) => Err(err),
            None => Ok(GenerationResponse::text(
                format!("{} notes for {}", stage.label(), input_of(request)),
                SCRIPTED_MODEL,
            )),
        }
    }
}

/// A search tool returning fixed hits and recording queries.
#[derive(Debug, Default)]
pub struct StaticSearch {
    hits: Vec<SearchHit>,
    queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    /// Creates a search tool returning `hits` for every query.
    #[must_use]
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queries received, in order.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl SearchTool for StaticSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ToolError> {
        if query.trim().is_empty() {
            return Err(ToolError::InvalidArgument {
                tool: ToolKind::WebSearch,
                message: "empty query".to_string(),
            });
        }
        self.queries.lock().push(query.to_string());
        Ok(self.hits.clone())
    }
}

/// A scrape tool returning fixed text and recording URLs.
///
/// Like the HTTP scraper, it rejects arguments without an http(s) scheme.
#[derive(Debug, Default)]
pub struct StaticScraper {
    text: String,
    urls: Mutex<Vec<String>>,
}

impl StaticScraper {
    /// Creates a scraper returning `text` for every URL.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            urls: Mutex::new(Vec::new()),
        }
    }

    /// URLs received, in order.
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

#[async_trait]
impl ScrapeTool for StaticScraper {
    async fn scrape(&self, url: &str) -> Result<String, ToolError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ToolError::InvalidArgument {
                tool: ToolKind::Scrape,
                message: format!("not an http(s) URL: '{url}'"),
            });
        }
        self.urls.lock().push(url.to_string());
        Ok(self.text.clone())
    }
}

/// A search tool that fails with a transport error.
///
/// By default every call fails; [`FailingSearch::after`] lets the first
/// calls through with no hits.
#[derive(Debug, Default)]
pub struct FailingSearch {
    successes: usize,
    calls: Mutex<usize>,
}

impl FailingSearch {
    /// Creates a search tool failing on every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a search tool answering the first `successes` calls.
    #[must_use]
    pub fn after(successes: usize) -> Self {
        Self {
            successes,
            calls: Mutex::new(0),
        }
    }

    /// Number of calls received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl SearchTool for FailingSearch {
    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>, ToolError> {
        let call = {
            let mut calls = self.calls.lock();
            *calls += 1;
            *calls
        };
        if call <= self.successes {
            return Ok(Vec::new());
        }
        Err(ToolError::Http {
            tool: ToolKind::WebSearch,
            message: "connection refused".to_string(),
        })
    }
}

/// A scrape tool that always fails with an HTTP status.
#[derive(Debug)]
pub struct FailingScraper {
    status: u16,
}

impl FailingScraper {
    /// Creates a scraper answering every URL with `status`.
    #[must_use]
    pub const fn new(status: u16) -> Self {
        Self { status }
    }
}

#[async_trait]
impl ScrapeTool for FailingScraper {
    async fn scrape(&self, _url: &str) -> Result<String, ToolError> {
        Err(ToolError::Status {
            tool: ToolKind::Scrape,
            status: self.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request_for(stage: usize, input: &str) -> GenerationRequest {
        let table = stage_table();
        crate::prompt::build_request(&table[stage], input, &[], &[])
    }

    #[tokio::test]
    async fn test_scripted_default_answer() {
        let gen = ScriptedGenerator::new();
        let resp = gen.generate(&request_for(1, "https://acme.io")).await.unwrap();

        assert_eq!(resp.content, "Use-Case notes for https://acme.io");
        assert_eq!(gen.called_stages(), vec![StageId::UseCase]);
    }

    #[tokio::test]
    async fn test_scripted_overrides() {
        let gen = ScriptedGenerator::new()
            .with_answer(StageId::Research, "profile")
            .empty_on(StageId::Resource)
            .failing_on(StageId::Proposal, GenerationError::Api("down".to_string()));

        assert_eq!(gen.generate(&request_for(0, "x")).await.unwrap().content, "profile");
        assert!(gen.generate(&request_for(2, "x")).await.unwrap().content.trim().is_empty());
        assert!(gen.generate(&request_for(3, "x")).await.is_err());
        assert_eq!(gen.call_count(), 3);
    }

    #[tokio::test]
    async fn test_unknown_role_rejected() {
        let gen = ScriptedGenerator::new();
        let req = GenerationRequest::new("You are nobody.", "task");
        assert!(gen.generate(&req).await.is_err());
        assert_eq!(gen.call_count(), 0);
    }

    #[tokio::test]
    async fn test_static_scraper_rejects_non_url() {
        let scraper = StaticScraper::new("page");
        assert!(scraper.scrape("").await.is_err());
        assert_eq!(scraper.scrape("https://acme.io").await.unwrap(), "page");
        assert_eq!(scraper.urls(), vec!["https://acme.io".to_string()]);
    }

    #[tokio::test]
    async fn test_failing_tools() {
        let err = FailingSearch::new().search("q").await.unwrap_err();
        assert_eq!(err.tool(), ToolKind::WebSearch);

        let err = FailingScraper::new(503).scrape("https://acme.io").await.unwrap_err();
        assert_eq!(err, ToolError::Status { tool: ToolKind::Scrape, status: 503 });
    }

    #[tokio::test]
    async fn test_failing_search_after_successes() {
        let search = FailingSearch::after(1);
        assert_eq!(search.search("q").await.unwrap(), Vec::new());
        assert!(search.search("q").await.is_err());
        assert_eq!(search.call_count(), 2);
    }
}
