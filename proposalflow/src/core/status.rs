//! Stage identifiers and the run state machine.

use crate::errors::InvalidTransition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one of the four pipeline stages.
///
/// The derived ordering is the execution order: a stage may read the output
/// of every stage that compares less than it, never one that compares greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    /// Company and industry research.
    Research,
    /// AI/ML use-case generation.
    UseCase,
    /// Dataset and resource collection.
    Resource,
    /// Final proposal writing.
    Proposal,
}

impl StageId {
    /// All stages in execution order.
    pub const ALL: [Self; 4] = [Self::Research, Self::UseCase, Self::Resource, Self::Proposal];

    /// Zero-based position in the execution order.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Research => 0,
            Self::UseCase => 1,
            Self::Resource => 2,
            Self::Proposal => 3,
        }
    }

    /// Stable machine name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::UseCase => "use_case",
            Self::Resource => "resource",
            Self::Proposal => "proposal",
        }
    }

    /// Human-readable label used in prompts and pages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Research => "Research",
            Self::UseCase => "Use-Case",
            Self::Resource => "Resource",
            Self::Proposal => "Proposal",
        }
    }

    /// The stage that runs after this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Research => Some(Self::UseCase),
            Self::UseCase => Some(Self::Resource),
            Self::Resource => Some(Self::Proposal),
            Self::Proposal => None,
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a single pipeline run.
///
/// `Idle -> Running(Research) -> ... -> Running(Proposal) -> Complete`, with
/// any running state allowed to move to `Failed` for the same stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "state", content = "stage")]
pub enum RunState {
    /// Created but not started.
    #[default]
    Idle,
    /// The given stage is executing.
    Running(StageId),
    /// All stages succeeded.
    Complete,
    /// The given stage failed and the run was aborted.
    Failed(StageId),
}

impl RunState {
    /// Returns true for `Complete` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed(_))
    }

    /// The stage currently executing, if any.
    #[must_use]
    pub const fn current_stage(self) -> Option<StageId> {
        match self {
            Self::Running(stage) => Some(stage),
            _ => None,
        }
    }

    /// Checks whether moving to `to` is a legal transition.
    #[must_use]
    pub fn can_advance(self, to: Self) -> bool {
        match (self, to) {
            (Self::Idle, Self::Running(StageId::Research))
            | (Self::Running(StageId::Proposal), Self::Complete) => true,
            (Self::Running(from), Self::Running(next)) => from.next() == Some(next),
            (Self::Running(from), Self::Failed(failed)) => from == failed,
            _ => false,
        }
    }

    /// Moves to `to`, rejecting transitions the state machine does not allow.
    pub fn advance(&mut self, to: Self) -> Result<(), InvalidTransition> {
        if !self.can_advance(to) {
            return Err(InvalidTransition { from: *self, to });
        }
        *self = to;
        Ok(())
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running(stage) => write!(f, "running({stage})"),
            Self::Complete => write!(f, "complete"),
            Self::Failed(stage) => write!(f, "failed({stage})"),
        }
    }
}
