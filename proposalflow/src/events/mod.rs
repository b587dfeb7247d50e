//! Pipeline events.
//!
//! The [`Coordinator`](crate::pipeline::Coordinator) reports progress as
//! [`PipelineEvent`]s handed to an [`EventSink`]. Sinks observe only; they
//! cannot influence a run.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use crate::core::StageId;
use crate::tools::ToolKind;
use serde_json::{json, Value};
use uuid::Uuid;

/// Something that happened during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// A run began.
    PipelineStarted {
        /// Run identifier.
        run_id: Uuid,
        /// Caller input, unchanged.
        input: String,
    },
    /// A stage began.
    StageStarted {
        /// Run identifier.
        run_id: Uuid,
        /// The stage.
        stage: StageId,
    },
    /// A stage called a tool successfully.
    ToolInvoked {
        /// Run identifier.
        run_id: Uuid,
        /// The calling stage.
        stage: StageId,
        /// The tool.
        tool: ToolKind,
        /// Query or URL.
        argument: String,
        /// Length of the returned text in characters.
        chars: usize,
    },
    /// A stage produced its output.
    StageCompleted {
        /// Run identifier.
        run_id: Uuid,
        /// The stage.
        stage: StageId,
        /// Wall time spent in the stage.
        duration_ms: f64,
        /// Length of the output in characters.
        chars: usize,
    },
    /// A stage failed.
    StageFailed {
        /// Run identifier.
        run_id: Uuid,
        /// The stage.
        stage: StageId,
        /// Error message.
        error: String,
    },
    /// All stages completed.
    PipelineCompleted {
        /// Run identifier.
        run_id: Uuid,
        /// Wall time for the whole run.
        duration_ms: f64,
    },
    /// The run stopped at a failing stage.
    PipelineFailed {
        /// Run identifier.
        run_id: Uuid,
        /// The failing stage.
        stage: StageId,
        /// Error message.
        error: String,
    },
}

impl PipelineEvent {
    /// Dotted event type, e.g. `stage.completed`.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::PipelineStarted { .. } => "pipeline.started",
            Self::StageStarted { .. } => "stage.started",
            Self::ToolInvoked { .. } => "tool.invoked",
            Self::StageCompleted { .. } => "stage.completed",
            Self::StageFailed { .. } => "stage.failed",
            Self::PipelineCompleted { .. } => "pipeline.completed",
            Self::PipelineFailed { .. } => "pipeline.failed",
        }
    }

    /// The run this event belongs to.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        match self {
            Self::PipelineStarted { run_id, .. }
            | Self::StageStarted { run_id, .. }
            | Self::ToolInvoked { run_id, .. }
            | Self::StageCompleted { run_id, .. }
            | Self::StageFailed { run_id, .. }
            | Self::PipelineCompleted { run_id, .. }
            | Self::PipelineFailed { run_id, .. } => *run_id,
        }
    }

    /// The stage this event concerns, if any.
    #[must_use]
    pub const fn stage(&self) -> Option<StageId> {
        match self {
            Self::StageStarted { stage, .. }
            | Self::ToolInvoked { stage, .. }
            | Self::StageCompleted { stage, .. }
            | Self::StageFailed { stage, .. }
            | Self::PipelineFailed { stage, .. } => Some(*stage),
            Self::PipelineStarted { .. } | Self::PipelineCompleted { .. } => None,
        }
    }

    /// JSON payload carrying `run_id`, `stage` where applicable, and the
    /// event-specific fields.
    #[must_use]
    pub fn payload(&self) -> Value {
        let mut payload = match self {
            Self::PipelineStarted { input, .. } => json!({ "input": input }),
            Self::StageStarted { .. } => json!({}),
            Self::ToolInvoked { tool, argument, chars, .. } => {
                json!({ "tool": tool, "argument": argument, "chars": chars })
            }
            Self::StageCompleted { duration_ms, chars, .. } => {
                json!({ "duration_ms": duration_ms, "chars": chars })
            }
            Self::PipelineCompleted { duration_ms, .. } => json!({ "duration_ms": duration_ms }),
            Self::StageFailed { error, .. } | Self::PipelineFailed { error, .. } => json!({ "error": error }),
        };
        payload["run_id"] = json!(self.run_id().to_string());
        if let Some(stage) = self.stage() {
            payload["stage"] = json!(stage);
        }
        payload
    }
}
