//! Pipeline execution.
//!
//! This module provides:
//! - The [`Coordinator`], which runs the stage table in order
//! - [`PipelineRun`], the record of one execution

mod coordinator;
mod run;

pub use coordinator::Coordinator;
pub use run::PipelineRun;
