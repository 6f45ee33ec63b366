use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const HISTORY_VERSION: &str = "1.0";

pub const HISTORY_FILE_PREFIX: &str = "tag-renamer-history-";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryFile {
    /// Schema version for compatibility
    pub version: String,

    /// When the operation was executed
    pub executed_at: DateTime<Utc>,

    /// Type of operation performed
    pub operation: OperationType,

    /// Project id the batch was named for
    pub project: String,

    /// Tool version that created this history
    pub tool_version: String,

    /// Renames in the order they were applied
    pub changes: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Rename,
    Undo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Position of the item in its batch
    pub position: usize,

    /// Path before the rename
    pub source: PathBuf,

    /// Path after the rename
    pub destination: PathBuf,
}

impl HistoryFile {
    /// Generate the filename for this history file
    pub fn generate_filename(&self) -> String {
        let timestamp = self.executed_at.format("%Y%m%d-%H%M%S");
        format!("{}{}.json", HISTORY_FILE_PREFIX, timestamp)
    }
}

impl OperationType {
    pub fn description(&self) -> &'static str {
        match self {
            OperationType::Rename => "rename",
            OperationType::Undo => "undo",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_filename() {
        let history = HistoryFile {
            version: HISTORY_VERSION.to_string(),
            executed_at: DateTime::parse_from_rfc3339("2026-01-15T10:30:45Z")
                .unwrap()
                .with_timezone(&Utc),
            operation: OperationType::Rename,
            project: "C123".to_string(),
            tool_version: "1.0.0".to_string(),
            changes: vec![],
        };

        assert_eq!(
            history.generate_filename(),
            "tag-renamer-history-20260115-103045.json"
        );
    }

    #[test]
    fn test_operation_type_serialization() {
        assert_eq!(
            serde_json::to_string(&OperationType::Rename).unwrap(),
            "\"rename\""
        );
        assert_eq!(
            serde_json::to_string(&OperationType::Undo).unwrap(),
            "\"undo\""
        );
    }
}
