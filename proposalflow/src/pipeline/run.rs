//! Per-request run state.

use crate::core::{RunState, StageId, StageRecord};
use crate::errors::InvalidTransition;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One execution of the pipeline for one caller input.
///
/// Created by [`Coordinator::execute`](super::Coordinator::execute) and
/// owned by that call; never shared between runs.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// Caller input, unchanged.
    pub input: String,
    /// Where the run is in its lifecycle.
    pub state: RunState,
    /// Outputs of completed stages, in execution order.
    pub stage_outputs: Vec<StageRecord>,
    /// The Proposal stage's text, set once every stage succeeded.
    pub final_output: Option<String>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run reached a terminal state.
    pub finished_at: Option<DateTime<Utc>>,
}

impl PipelineRun {
    /// Creates an idle run for `input`.
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            input: input.into(),
            state: RunState::Idle,
            stage_outputs: Vec::new(),
            final_output: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Moves the run to `Running(stage)`.
    pub fn begin(&mut self, stage: StageId) -> Result<(), InvalidTransition> {
        self.state.advance(RunState::Running(stage))
    }

    /// Appends the output of the stage currently running.
    pub fn record(&mut self, record: StageRecord) {
        self.stage_outputs.push(record);
    }

    /// Marks the run complete and publishes the last stage output.
    pub fn complete(&mut self) -> Result<(), InvalidTransition> {
        self.state.advance(RunState::Complete)?;
        self.final_output = self.stage_outputs.last().map(|r| r.output.clone());
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Marks the run failed at `stage`.
    pub fn fail(&mut self, stage: StageId) -> Result<(), InvalidTransition> {
        self.state.advance(RunState::Failed(stage))?;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Output of `stage`, if it has completed.
    #[must_use]
    pub fn output_of(&self, stage: StageId) -> Option<&str> {
        self.stage_outputs
            .iter()
            .find(|r| r.stage == stage)
            .map(|r| r.output.as_str())
    }

    /// Returns true once every stage has succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == RunState::Complete
    }

    /// Wall time from start to the terminal state, or to now if running.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_ms(&self) -> f64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds() as f64
    }
}
