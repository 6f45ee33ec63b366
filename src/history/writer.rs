use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn};

use crate::undo::{UndoEntry, UndoLog, UndoReport, UndoStatus};

use super::types::*;

/// Error types for history operations
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Failed to write history file: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("Failed to serialize history: {0}")]
    SerializeError(#[from] serde_json::Error),

    #[error("Failed to read history file: {0}")]
    ReadError(String),

    #[error("History file version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },
}

/// Write the renames recorded in `log` to a new history file in `dir`
pub fn write_history(log: &UndoLog, project: &str, dir: &Path) -> Result<PathBuf, HistoryError> {
    let history = create_history(OperationType::Rename, project, log.entries());
    write_history_file(&history, dir)
}

/// Write the renames an undo performed, so that the undo itself can be undone
pub fn write_undo_history(
    report: &UndoReport,
    project: &str,
    dir: &Path,
) -> Result<PathBuf, HistoryError> {
    // Reverted entries moved new_path back to original_path, in report order
    let reversed: Vec<UndoEntry> = report
        .outcomes
        .iter()
        .filter(|o| o.status == UndoStatus::Reverted)
        .map(|o| UndoEntry {
            position: o.entry.position,
            item: o.entry.item,
            original_path: o.entry.new_path.clone(),
            new_path: o.entry.original_path.clone(),
        })
        .collect();

    let history = create_history(OperationType::Undo, project, &reversed);
    write_history_file(&history, dir)
}

fn create_history(operation: OperationType, project: &str, entries: &[UndoEntry]) -> HistoryFile {
    let changes = entries
        .iter()
        .map(|entry| HistoryEntry {
            position: entry.position,
            source: entry.original_path.clone(),
            destination: entry.new_path.clone(),
        })
        .collect();

    HistoryFile {
        version: HISTORY_VERSION.to_string(),
        executed_at: Utc::now(),
        operation,
        project: project.to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        changes,
    }
}

pub fn write_history_file(history: &HistoryFile, dir: &Path) -> Result<PathBuf, HistoryError> {
    let filename = history.generate_filename();
    let file_path = dir.join(&filename);

    if file_path.exists() {
        warn!("History file already exists: {:?}", file_path);
        let unique_filename = format!(
            "{}{}-{}.json",
            HISTORY_FILE_PREFIX,
            history.executed_at.format("%Y%m%d-%H%M%S"),
            history.executed_at.timestamp_subsec_millis()
        );
        let unique_path = dir.join(unique_filename);
        return write_to_path(history, &unique_path);
    }

    write_to_path(history, &file_path)
}

fn write_to_path(history: &HistoryFile, path: &Path) -> Result<PathBuf, HistoryError> {
    let temp_path = path.with_extension("json.tmp");

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, history)?;
        writer.flush()?;
    }

    fs::rename(&temp_path, path)?;

    info!("History written to: {:?}", path);

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemId;
    use crate::undo::UndoOutcome;
    use tempfile::tempdir;

    fn create_test_log() -> UndoLog {
        let mut log = UndoLog::new();
        log.record(
            0,
            ItemId(0),
            PathBuf::from("/photos/a.jpg"),
            PathBuf::from("/photos/P_X_240101_001.jpg"),
        );
        log.record(
            1,
            ItemId(1),
            PathBuf::from("/photos/b.jpg"),
            PathBuf::from("/photos/P_240101_002.jpg"),
        );
        log
    }

    #[test]
    fn test_write_history() {
        let dir = tempdir().unwrap();

        let path = write_history(&create_test_log(), "P", dir.path()).unwrap();

        assert!(path.exists());
        assert!(path.to_string_lossy().contains(HISTORY_FILE_PREFIX));
        assert!(path.to_string_lossy().ends_with(".json"));
    }

    #[test]
    fn test_history_content() {
        let dir = tempdir().unwrap();

        let path = write_history(&create_test_log(), "P", dir.path()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let history: HistoryFile = serde_json::from_str(&content).unwrap();

        assert_eq!(history.version, HISTORY_VERSION);
        assert_eq!(history.operation, OperationType::Rename);
        assert_eq!(history.project, "P");
        assert_eq!(history.changes.len(), 2);
        assert_eq!(history.changes[0].source, PathBuf::from("/photos/a.jpg"));
        assert_eq!(history.changes[1].position, 1);
    }

    #[test]
    fn test_atomic_write() {
        let dir = tempdir().unwrap();

        let path = write_history(&create_test_log(), "P", dir.path()).unwrap();

        let temp_path = path.with_extension("json.tmp");
        assert!(!temp_path.exists());
    }

    #[test]
    fn test_large_history_is_complete_on_disk() {
        let dir = tempdir().unwrap();
        let mut log = UndoLog::new();
        for i in 0..500 {
            log.record(
                i,
                ItemId(i as u64),
                PathBuf::from(format!("/photos/IMG_{:04}.jpg", i)),
                PathBuf::from(format!("/photos/P_240101_{:03}.jpg", i + 1)),
            );
        }

        let path = write_history(&log, "P", dir.path()).unwrap();

        let history: HistoryFile =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(history.changes.len(), 500);
        assert_eq!(history.changes[499].destination, PathBuf::from("/photos/P_240101_500.jpg"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_second_write_gets_unique_name() {
        let dir = tempdir().unwrap();
        let history = create_history(OperationType::Rename, "P", create_test_log().entries());

        let first = write_history_file(&history, dir.path()).unwrap();
        let second = write_history_file(&history, dir.path()).unwrap();

        assert_ne!(first, second);
        assert!(second.exists());
    }

    #[test]
    fn test_undo_history_only_lists_reverted() {
        let dir = tempdir().unwrap();
        let log = create_test_log();
        let report = UndoReport {
            outcomes: vec![
                UndoOutcome {
                    entry: log.entries()[1].clone(),
                    status: UndoStatus::Reverted,
                },
                UndoOutcome {
                    entry: log.entries()[0].clone(),
                    status: UndoStatus::Missing,
                },
            ],
        };

        let path = write_undo_history(&report, "P", dir.path()).unwrap();
        let history: HistoryFile =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(history.operation, OperationType::Undo);
        assert_eq!(history.changes.len(), 1);
        assert_eq!(
            history.changes[0].source,
            PathBuf::from("/photos/P_240101_002.jpg")
        );
        assert_eq!(history.changes[0].destination, PathBuf::from("/photos/b.jpg"));
    }
}
