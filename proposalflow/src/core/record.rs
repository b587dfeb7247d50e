//! Records of completed stages and the tool calls they made.

use super::StageId;
use crate::tools::ToolKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One tool invocation made on behalf of a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Which tool ran.
    pub tool: ToolKind,
    /// The query or URL it was given.
    pub argument: String,
    /// Length of the text it returned, in characters.
    pub chars: usize,
}

/// The output of one successfully completed stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    /// Stage that produced the output.
    pub stage: StageId,
    /// Generated text.
    pub output: String,
    /// Tool calls made before generation, in call order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRecord>,
    /// When the stage started.
    pub started_at: DateTime<Utc>,
    /// When the stage ended.
    pub ended_at: DateTime<Utc>,
}

impl StageRecord {
    /// Creates a record ending now.
    #[must_use]
    pub fn completed(
        stage: StageId,
        output: impl Into<String>,
        tool_calls: Vec<ToolCallRecord>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            stage,
            output: output.into(),
            tool_calls,
            started_at,
            ended_at: Utc::now(),
        }
    }

    /// Returns the duration in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_ms(&self) -> f64 {
        (self.ended_at - self.started_at).num_milliseconds() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_record_completed() {
        let started = Utc::now();
        let record = StageRecord::completed(
            StageId::Research,
            "profile",
            vec![ToolCallRecord {
                tool: ToolKind::Scrape,
                argument: "https://example.com".to_string(),
                chars: 42,
            }],
            started,
        );

        assert_eq!(record.stage, StageId::Research);
        assert_eq!(record.output, "profile");
        assert_eq!(record.tool_calls.len(), 1);
        assert!(record.ended_at >= record.started_at);
    }

    #[test]
    fn test_stage_record_duration() {
        let started = Utc::now();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let record = StageRecord::completed(StageId::Proposal, "done", Vec::new(), started);

        assert!(record.duration_ms() >= 10.0);
    }

    #[test]
    fn test_stage_record_serialization_skips_empty_tool_calls() {
        let record = StageRecord::completed(StageId::UseCase, "ideas", Vec::new(), Utc::now());
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["stage"], "use_case");
        assert!(json.get("tool_calls").is_none());

        let back: StageRecord = serde_json::from_value(json).unwrap();
        assert!(back.tool_calls.is_empty());
    }
}
