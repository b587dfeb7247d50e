//! Error types for the proposalflow pipeline.
//!
//! Startup problems surface as [`ConfigError`]. Everything that goes wrong
//! while a run is in flight is reported as a [`PipelineError`] naming the
//! stage that failed and wrapping the first underlying cause.

use crate::core::{RunState, StageId};
use crate::tools::ToolKind;
use thiserror::Error;

/// Errors raised while loading configuration or assembling the pipeline.
///
/// These are fatal: the server refuses to start serving when one occurs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required credential is absent or blank.
    #[error("missing credential: {0} must be set to a non-empty value")]
    MissingCredential(String),

    /// A configuration value could not be interpreted.
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        /// The configuration key.
        key: String,
        /// The raw value that was rejected.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The stage table violates its ordering or delegation rules.
    #[error("invalid stage table: {0}")]
    InvalidStageTable(String),
}

impl ConfigError {
    /// Creates an invalid-value error.
    #[must_use]
    pub fn invalid(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by a tool adapter call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    /// The query or URL handed to the tool is unusable.
    #[error("{tool}: invalid argument: {message}")]
    InvalidArgument {
        /// The tool that rejected the argument.
        tool: ToolKind,
        /// Details.
        message: String,
    },

    /// The underlying HTTP request failed before a response arrived.
    #[error("{tool}: request failed: {message}")]
    Http {
        /// The failing tool.
        tool: ToolKind,
        /// Transport error text.
        message: String,
    },

    /// The remote side answered with a non-success status.
    #[error("{tool}: unexpected HTTP status {status}")]
    Status {
        /// The failing tool.
        tool: ToolKind,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body could not be interpreted.
    #[error("{tool}: could not parse response: {message}")]
    Parse {
        /// The failing tool.
        tool: ToolKind,
        /// Parser error text.
        message: String,
    },
}

impl ToolError {
    /// Returns the tool that produced this error.
    #[must_use]
    pub const fn tool(&self) -> ToolKind {
        match self {
            Self::InvalidArgument { tool, .. }
            | Self::Http { tool, .. }
            | Self::Status { tool, .. }
            | Self::Parse { tool, .. } => *tool,
        }
    }
}

/// Errors raised by the generative-text backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The credential was rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The backend is throttling us.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The backend refused the request as malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The backend reported a server-side failure.
    #[error("backend error: {0}")]
    Api(String),

    /// The request never completed.
    #[error("network error: {0}")]
    Network(String),

    /// The response body was not the expected shape.
    #[error("could not parse backend response: {0}")]
    Parse(String),

    /// The backend answered, but with no usable text.
    #[error("backend returned an empty completion")]
    EmptyResponse,
}

/// The cause of a single stage failing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StageFailure {
    /// A tool the stage depends on failed.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// The generative call failed or produced nothing usable.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The run state machine was driven out of order.
    #[error(transparent)]
    Internal(#[from] InvalidTransition),
}

/// A pipeline run aborted at `stage`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("stage '{stage}' failed: {source}")]
pub struct PipelineError {
    /// The stage that failed.
    pub stage: StageId,
    /// The first failure encountered.
    #[source]
    pub source: StageFailure,
}

impl PipelineError {
    /// Creates a pipeline error for `stage`.
    #[must_use]
    pub fn new(stage: StageId, source: impl Into<StageFailure>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }

    /// Returns the stage that failed.
    #[must_use]
    pub const fn stage(&self) -> StageId {
        self.stage
    }

    /// Returns true if the failure came from a tool adapter.
    #[must_use]
    pub const fn is_tool_failure(&self) -> bool {
        matches!(self.source, StageFailure::Tool(_))
    }

    /// Returns true if the failure came from the generative backend.
    #[must_use]
    pub const fn is_generation_failure(&self) -> bool {
        matches!(self.source, StageFailure::Generation(_))
    }
}

/// Raised when [`RunState`] is asked to make a transition it does not allow.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("illegal run state transition from {from} to {to}")]
pub struct InvalidTransition {
    /// The state the run was in.
    pub from: RunState,
    /// The state that was requested.
    pub to: RunState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_display_names_stage() {
        let err = PipelineError::new(
            StageId::Resource,
            ToolError::Status {
                tool: ToolKind::WebSearch,
                status: 503,
            },
        );

        assert_eq!(err.stage(), StageId::Resource);
        assert!(err.is_tool_failure());
        assert!(!err.is_generation_failure());
        let text = err.to_string();
        assert!(text.contains("resource"));
        assert!(text.contains("503"));
    }

    #[test]
    fn test_pipeline_error_source_chain() {
        use std::error::Error as _;

        let err = PipelineError::new(
            StageId::Research,
            GenerationError::Auth("bad key".to_string()),
        );
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("authentication failed: bad key"));
    }

    #[test]
    fn test_tool_error_reports_tool() {
        let err = ToolError::InvalidArgument {
            tool: ToolKind::Scrape,
            message: "empty URL".to_string(),
        };
        assert_eq!(err.tool(), ToolKind::Scrape);
        assert!(err.to_string().starts_with("scrape"));
    }

    #[test]
    fn test_config_error_invalid() {
        let err = ConfigError::invalid("PROPOSALFLOW_BIND", "nowhere", "not a socket address");
        assert_eq!(
            err.to_string(),
            "invalid value for PROPOSALFLOW_BIND: 'nowhere' (not a socket address)"
        );
    }
}
