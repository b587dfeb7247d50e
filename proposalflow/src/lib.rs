//! # Proposalflow
//!
//! Turns a company URL into an AI/ML adoption proposal by running four
//! generative stages in a fixed order.
//!
//! - **Research**: profiles the company from a web search and its own page
//! - **Use-Case**: proposes AI/ML and generative AI use cases
//! - **Resource**: collects datasets, models and papers for those use cases
//! - **Proposal**: compiles everything into a prioritized proposal
//!
//! Each stage is a [`StageSpec`](stages::StageSpec): a persona, a task and
//! the set of tools it may call. The [`Coordinator`](pipeline::Coordinator)
//! runs the table for each input, threading every prior output into the next
//! stage's prompt and stopping at the first failure.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use proposalflow::prelude::*;
//! use std::sync::Arc;
//!
//! let config = AppConfig::from_env()?;
//! let generator = Arc::new(OpenAiClient::new(&config)?);
//! let toolbox = toolbox_from_config(&config)?;
//! let coordinator = Coordinator::new(stage_table(), generator, toolbox)?;
//!
//! let proposal = coordinator.run("https://example.com").await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod stages;
pub mod testing;
pub mod tools;

#[cfg(feature = "http")]
pub mod websearch;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::core::{RunState, StageId, StageRecord, ToolCallRecord};
    pub use crate::errors::{
        ConfigError, GenerationError, PipelineError, StageFailure, ToolError,
    };
    pub use crate::events::{
        CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, PipelineEvent,
    };
    #[cfg(feature = "http")]
    pub use crate::llm::OpenAiClient;
    pub use crate::llm::{GenerationRequest, GenerationResponse, TextGenerator};
    pub use crate::pipeline::{Coordinator, PipelineRun};
    pub use crate::stages::{stage_table, validate_stage_table, StageSpec};
    pub use crate::tools::{
        ScrapeTool, SearchHit, SearchTool, ToolKind, ToolOutput, ToolSet, Toolbox,
    };
    #[cfg(feature = "http")]
    pub use crate::websearch::toolbox_from_config;
}
