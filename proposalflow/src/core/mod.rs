//! Core domain model types.
//!
//! - Stage identifiers and the run state machine
//! - Records of completed stages and their tool calls

mod record;
mod status;

pub use record::{StageRecord, ToolCallRecord};
pub use status::{RunState, StageId};
