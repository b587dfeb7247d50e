//! The canonical four-stage table.

use super::StageSpec;
use crate::core::StageId;
use crate::errors::ConfigError;
use crate::tools::ToolKind;

/// Returns the four stages in execution order.
#[must_use]
pub fn stage_table() -> Vec<StageSpec> {
    vec![
        StageSpec::new(StageId::Research, "Industry/Company Researcher")
            .with_goal("Analyze the company's industry and segment, identifying key offerings and focus areas.")
            .with_backstory("Research the company's website and industry-specific sources to gather insights.")
            .with_task(
                "Analyze the company's industry, products, and strategic focus areas.",
                "Company profile and industry insights document.",
            )
            .with_tools([ToolKind::WebSearch, ToolKind::Scrape])
            .with_search_query("{host} company industry products services")
            .verbose(true),
        StageSpec::new(StageId::UseCase, "Market Standards & Use Case Generator")
            .with_goal("Propose AI/ML and Generative AI use cases for the company.")
            .with_backstory("Analyze market trends and propose actionable AI use cases for the company.")
            .with_task(
                "Propose relevant AI/ML use cases based on industry trends and standards.",
                "A list of AI/ML use cases for the company.",
            )
            .verbose(true),
        StageSpec::new(StageId::Resource, "Resource Asset Collector")
            .with_goal("Curate resources and datasets for proposed AI/ML use cases.")
            .with_backstory("Collect relevant datasets, pre-trained models, and papers for implementation.")
            .with_task(
                "Collect datasets and resources for implementing the proposed use cases.",
                "A curated list of resources and datasets for the use cases.",
            )
            .with_tools([ToolKind::WebSearch])
            .with_search_query("datasets pre-trained models papers {previous}")
            .verbose(true),
        StageSpec::new(StageId::Proposal, "Proposal Finalizer")
            .with_goal("Deliver a professional proposal with prioritized use cases and supporting resources.")
            .with_backstory("Compile and refine outputs from all agents into a clear, actionable proposal.")
            .with_task(
                "Compile and prioritize the most impactful AI/ML use cases into a polished proposal.",
                "A professional proposal document with use cases and references.",
            )
            .verbose(true),
    ]
}

/// Checks the structural rules every stage table must follow.
///
/// Exactly one entry per [`StageId`], listed in execution order, none of
/// them delegating.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidStageTable`] describing the first violation.
pub fn validate_stage_table(stages: &[StageSpec]) -> Result<(), ConfigError> {
    if stages.len() != StageId::ALL.len() {
        return Err(ConfigError::InvalidStageTable(format!(
            "expected {} stages, found {}",
            StageId::ALL.len(),
            stages.len()
        )));
    }

    for (spec, expected) in stages.iter().zip(StageId::ALL) {
        if spec.id != expected {
            return Err(ConfigError::InvalidStageTable(format!(
                "position {} holds '{}', expected '{}'",
                expected.index(),
                spec.id,
                expected
            )));
        }
        if spec.allow_delegation {
            return Err(ConfigError::InvalidStageTable(format!(
                "stage '{}' allows delegation",
                spec.id
            )));
        }
        if spec.search_query.is_some() && !spec.can_use(ToolKind::WebSearch) {
            return Err(ConfigError::InvalidStageTable(format!(
                "stage '{}' has a search query but no web search tool",
                spec.id
            )));
        }
    }
    Ok(())
}
