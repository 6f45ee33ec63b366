//! Record of executed renames and their reversal.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::fs::FileSystem;
use crate::history::HistoryFile;
use crate::item::ItemId;

/// One rename that actually happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoEntry {
    pub position: usize,
    pub item: ItemId,
    pub original_path: PathBuf,
    pub new_path: PathBuf,
}

/// What undo did with one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoStatus {
    Reverted,
    /// The entry never moved the file
    AlreadyConsistent,
    /// The renamed file is gone
    Missing,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoOutcome {
    pub entry: UndoEntry,
    pub status: UndoStatus,
}

/// Per-entry result of [`UndoLog::undo_all`], in the order entries were processed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoReport {
    pub outcomes: Vec<UndoOutcome>,
}

impl UndoReport {
    /// Items that are back at their original path
    pub fn reverted(&self) -> Vec<(ItemId, PathBuf)> {
        self.outcomes
            .iter()
            .filter(|o| o.status == UndoStatus::Reverted)
            .map(|o| (o.entry.item, o.entry.original_path.clone()))
            .collect()
    }

    pub fn reverted_count(&self) -> usize {
        self.count(|s| matches!(s, UndoStatus::Reverted))
    }

    pub fn missing_count(&self) -> usize {
        self.count(|s| matches!(s, UndoStatus::Missing))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|s| matches!(s, UndoStatus::Failed { .. }))
    }

    pub fn is_complete(&self) -> bool {
        self.failed_count() == 0
    }

    fn count(&self, pred: impl Fn(&UndoStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Ordered log of successful renames, reversed last-in first-out
#[derive(Debug, Clone, Default)]
pub struct UndoLog {
    entries: Vec<UndoEntry>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rename; call only after the rename succeeded
    pub fn record(
        &mut self,
        position: usize,
        item: ItemId,
        original_path: PathBuf,
        new_path: PathBuf,
    ) {
        debug!(item = %item, from = ?original_path, to = ?new_path, "Recorded for undo");
        self.entries.push(UndoEntry {
            position,
            item,
            original_path,
            new_path,
        });
    }

    pub fn has_history(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[UndoEntry] {
        &self.entries
    }

    /// Rebuild a log from a history file written by an earlier session.
    ///
    /// Item ids are not persisted; each entry gets its position as id.
    pub fn from_history(history: &HistoryFile) -> Self {
        let entries = history
            .changes
            .iter()
            .map(|change| UndoEntry {
                position: change.position,
                item: ItemId(change.position as u64),
                original_path: change.source.clone(),
                new_path: change.destination.clone(),
            })
            .collect();
        Self { entries }
    }

    /// Reverse every entry, newest first.
    ///
    /// Failed entries stay in the log so the undo can be retried; every
    /// other entry is consumed.
    pub fn undo_all(&mut self, fs: &dyn FileSystem) -> UndoReport {
        info!("Undoing {} renames", self.entries.len());

        let mut report = UndoReport::default();
        let mut retained = Vec::new();

        while let Some(entry) = self.entries.pop() {
            let status = undo_one(&entry, fs);
            if let UndoStatus::Failed { .. } = status {
                retained.push(entry.clone());
            }
            report.outcomes.push(UndoOutcome { entry, status });
        }

        retained.reverse();
        self.entries = retained;

        info!(
            reverted = report.reverted_count(),
            missing = report.missing_count(),
            failed = report.failed_count(),
            "Undo complete"
        );

        report
    }
}

fn undo_one(entry: &UndoEntry, fs: &dyn FileSystem) -> UndoStatus {
    if fs.same_location(&entry.new_path, &entry.original_path) {
        return UndoStatus::AlreadyConsistent;
    }

    if !fs.exists(&entry.new_path) {
        debug!(path = ?entry.new_path, "Renamed file is gone, skipping");
        return UndoStatus::Missing;
    }

    if fs.exists(&entry.original_path) {
        warn!(path = ?entry.original_path, "Original path is occupied");
        return UndoStatus::Failed {
            error: format!("{} already exists", entry.original_path.display()),
        };
    }

    match fs.rename(&entry.new_path, &entry.original_path) {
        Ok(()) => {
            debug!(from = ?entry.new_path, to = ?entry.original_path, "Reverted");
            UndoStatus::Reverted
        }
        Err(e) => {
            warn!(from = ?entry.new_path, to = ?entry.original_path, "Undo failed: {}", e);
            UndoStatus::Failed {
                error: e.to_string(),
            }
        }
    }
}
