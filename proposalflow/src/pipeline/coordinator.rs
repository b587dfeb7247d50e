//! Sequential pipeline runner.

use super::PipelineRun;
use crate::core::{StageId, StageRecord, ToolCallRecord};
use crate::errors::{ConfigError, GenerationError, PipelineError, StageFailure};
use crate::events::{EventSink, NoOpEventSink, PipelineEvent};
use crate::llm::TextGenerator;
use crate::prompt;
use crate::stages::{validate_stage_table, StageSpec};
use crate::tools::{ToolKind, Toolbox};
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};

/// Runs the stage table in order for each caller input.
///
/// A `Coordinator` holds no per-run state; one instance is shared by every
/// request and runs may proceed concurrently.
#[derive(Clone)]
pub struct Coordinator {
    stages: Arc<[StageSpec]>,
    generator: Arc<dyn TextGenerator>,
    toolbox: Toolbox,
    sink: Arc<dyn EventSink>,
}

impl Coordinator {
    /// Creates a coordinator over `stages`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidStageTable`] if `stages` is not a valid
    /// four-stage table.
    pub fn new(
        stages: Vec<StageSpec>,
        generator: Arc<dyn TextGenerator>,
        toolbox: Toolbox,
    ) -> Result<Self, ConfigError> {
        validate_stage_table(&stages)?;
        Ok(Self {
            stages: stages.into(),
            generator,
            toolbox,
            sink: Arc::new(NoOpEventSink),
        })
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The stage table, in execution order.
    #[must_use]
    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// Runs every stage for `input` and returns the proposal text.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] naming the first stage that failed.
    pub async fn run(&self, input: &str) -> Result<String, PipelineError> {
        let run = self.execute(input).await?;
        Ok(run.final_output.unwrap_or_default())
    }

    /// Runs every stage for `input` and returns the completed run.
    ///
    /// The input is not validated; whatever the caller sent reaches the
    /// first stage unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] naming the first stage that failed. Later
    /// stages are not started.
    pub async fn execute(&self, input: &str) -> Result<PipelineRun, PipelineError> {
        let run = PipelineRun::new(input);
        let span = info_span!("pipeline.run", run_id = %run.run_id);
        self.drive(run).instrument(span).await
    }

    async fn drive(&self, mut run: PipelineRun) -> Result<PipelineRun, PipelineError> {
        let started = Instant::now();
        info!(input = %run.input, stages = self.stages.len(), "Pipeline run started");
        self.sink
            .emit(&PipelineEvent::PipelineStarted {
                run_id: run.run_id,
                input: run.input.clone(),
            })
            .await;

        for spec in self.stages.iter() {
            run.begin(spec.id).map_err(|e| PipelineError::new(spec.id, e))?;
            self.sink
                .emit(&PipelineEvent::StageStarted {
                    run_id: run.run_id,
                    stage: spec.id,
                })
                .await;

            let span = info_span!("stage", stage = %spec.id);
            let outcome = self.run_stage(&run, spec).instrument(span).await;
            match outcome {
                Ok(record) => {
                    self.sink
                        .emit(&PipelineEvent::StageCompleted {
                            run_id: run.run_id,
                            stage: spec.id,
                            duration_ms: record.duration_ms(),
                            chars: record.output.chars().count(),
                        })
                        .await;
                    run.record(record);
                }
                Err(failure) => return Err(self.abort(&mut run, spec.id, failure).await),
            }
        }

        run.complete().map_err(|e| PipelineError::new(StageId::Proposal, e))?;
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        info!(duration_ms, "Pipeline run completed");
        self.sink
            .emit(&PipelineEvent::PipelineCompleted {
                run_id: run.run_id,
                duration_ms,
            })
            .await;
        Ok(run)
    }

    async fn abort(&self, run: &mut PipelineRun, stage: StageId, failure: StageFailure) -> PipelineError {
        let error = PipelineError::new(stage, failure);
        warn!(stage = %stage, error = %error.source, "Pipeline run failed");

        if let Err(e) = run.fail(stage) {
            return PipelineError::new(stage, e);
        }
        let message = error.source.to_string();
        self.sink
            .emit(&PipelineEvent::StageFailed {
                run_id: run.run_id,
                stage,
                error: message.clone(),
            })
            .await;
        self.sink
            .emit(&PipelineEvent::PipelineFailed {
                run_id: run.run_id,
                stage,
                error: message,
            })
            .await;
        error
    }

    async fn run_stage(&self, run: &PipelineRun, spec: &StageSpec) -> Result<StageRecord, StageFailure> {
        let started_at = Utc::now();
        let prior = run.stage_outputs.as_slice();

        let mut tool_outputs = Vec::with_capacity(spec.tools.len());
        let mut tool_calls = Vec::with_capacity(spec.tools.len());
        for kind in spec.tools.iter() {
            let argument = match kind {
                ToolKind::WebSearch => prompt::stage_query(spec, &run.input, prior),
                ToolKind::Scrape => run.input.clone(),
            };
            let output = self.toolbox.invoke(kind, &argument).await?;
            let chars = output.text.chars().count();
            debug!(tool = %kind, argument = %argument, chars, "Tool invoked");
            self.sink
                .emit(&PipelineEvent::ToolInvoked {
                    run_id: run.run_id,
                    stage: spec.id,
                    tool: kind,
                    argument: argument.clone(),
                    chars,
                })
                .await;
            tool_calls.push(ToolCallRecord { tool: kind, argument, chars });
            tool_outputs.push(output);
        }

        let request = prompt::build_request(spec, &run.input, prior, &tool_outputs);
        if spec.verbose {
            debug!(
                system = request.system_text().unwrap_or_default(),
                user = request.user_text().unwrap_or_default(),
                "Stage prompt"
            );
        }

        let response = self.generator.generate(&request).await?;
        if response.content.trim().is_empty() {
            return Err(GenerationError::EmptyResponse.into());
        }
        if spec.verbose {
            debug!(
                attributes = ?response.to_attributes(),
                output = %response.content,
                "Stage output"
            );
        }

        Ok(StageRecord::completed(spec.id, response.content, tool_calls, started_at))
    }
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("stages", &self.stages.iter().map(|s| s.id).collect::<Vec<_>>())
            .field("toolbox", &self.toolbox)
            .finish_non_exhaustive()
    }
}
