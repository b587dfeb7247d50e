//! Testing utilities for proposalflow.
//!
//! This module provides:
//! - A scripted text generator that answers per stage
//! - Static and failing tool adapters
//! - Configuration and coordinator fixtures

mod fixtures;
mod mocks;

pub use fixtures::{scripted_coordinator, static_toolbox, test_config};
pub use mocks::{
    FailingScraper, FailingSearch, ScriptedGenerator, StaticScraper, StaticSearch, SCRIPTED_MODEL,
};
