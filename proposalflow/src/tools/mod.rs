//! Tool adapters a stage may call for grounding text.
//!
//! This module provides:
//! - Tool kinds and per-stage capability sets
//! - Adapter traits for search and scrape
//! - The toolbox that dispatches a kind to its adapter

mod definitions;
mod protocols;
mod toolbox;

pub use definitions::{SearchHit, ToolKind, ToolOutput, ToolSet};
pub use protocols::{ScrapeTool, SearchTool};
pub use toolbox::Toolbox;
