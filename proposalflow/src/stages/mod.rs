//! Stage specifications.
//!
//! A stage is plain configuration: the persona guiding one generative call,
//! the task it performs, and the tools it may use. Nothing here executes;
//! the [`Coordinator`](crate::pipeline::Coordinator) does that.

mod table;

pub use table::{stage_table, validate_stage_table};

use crate::core::StageId;
use crate::tools::{ToolKind, ToolSet};
use serde::{Deserialize, Serialize};

/// Specification for a single pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    /// Which stage this is.
    pub id: StageId,
    /// Short human-readable label.
    pub role: String,
    /// One-sentence objective guiding the generative call.
    pub goal: String,
    /// Context establishing the persona.
    pub backstory: String,
    /// Instructions for this stage's unit of work.
    pub description: String,
    /// Free-text description of the desired output shape.
    pub expected_output: String,
    /// Tools this stage may invoke.
    #[serde(default)]
    pub tools: ToolSet,
    /// Whether this stage may hand work to another stage.
    #[serde(default)]
    pub allow_delegation: bool,
    /// Query template for the web search tool.
    ///
    /// Supports `{input}`, `{host}` and `{previous}` placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    /// Log prompt and output at debug level.
    #[serde(default)]
    pub verbose: bool,
}

impl StageSpec {
    /// Creates a stage with no tools.
    #[must_use]
    pub fn new(id: StageId, role: impl Into<String>) -> Self {
        Self {
            id,
            role: role.into(),
            goal: String::new(),
            backstory: String::new(),
            description: String::new(),
            expected_output: String::new(),
            tools: ToolSet::none(),
            allow_delegation: false,
            search_query: None,
            verbose: false,
        }
    }

    /// Sets the goal.
    #[must_use]
    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = goal.into();
        self
    }

    /// Sets the backstory.
    #[must_use]
    pub fn with_backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = backstory.into();
        self
    }

    /// Sets the task description and expected output.
    #[must_use]
    pub fn with_task(mut self, description: impl Into<String>, expected_output: impl Into<String>) -> Self {
        self.description = description.into();
        self.expected_output = expected_output.into();
        self
    }

    /// Grants tools.
    #[must_use]
    pub fn with_tools(mut self, tools: impl IntoIterator<Item = ToolKind>) -> Self {
        self.tools = ToolSet::of(tools);
        self
    }

    /// Sets the search query template.
    #[must_use]
    pub fn with_search_query(mut self, template: impl Into<String>) -> Self {
        self.search_query = Some(template.into());
        self
    }

    /// Enables or disables verbose logging.
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Returns true if this stage may call `kind`.
    #[must_use]
    pub fn can_use(&self, kind: ToolKind) -> bool {
        self.tools.allows(kind)
    }
}
