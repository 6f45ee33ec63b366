use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::item::ItemId;

/// Naming scheme applied to a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RenameMode {
    /// `project_tags_date[_suffix]_index`
    #[default]
    Normal,
    /// `project_pos[_suffix][_index]`
    Position,
    /// `project_PA_MAT<key>[_index][_suffix]`
    PaMat,
}

impl RenameMode {
    pub fn description(&self) -> &'static str {
        match self {
            RenameMode::Normal => "tags and date",
            RenameMode::Position => "position",
            RenameMode::PaMat => "PA_MAT",
        }
    }
}

/// Options for a single planning pass
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    pub mode: RenameMode,
    /// Put every planned file into this directory instead of its own
    pub dest_dir: Option<PathBuf>,
}

/// State of one planned rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStatus {
    Ready,
    /// The planned path is where the file already is
    Unchanged,
    /// No free name could be found; this item is skipped
    Unresolved { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub item: ItemId,
    /// Zero-based position in the batch
    pub position: usize,
    pub old_path: PathBuf,
    pub new_path: PathBuf,
    pub status: PlanStatus,
}

impl MappingEntry {
    pub fn old_name(&self) -> String {
        file_name_of(&self.old_path)
    }

    pub fn new_name(&self) -> String {
        file_name_of(&self.new_path)
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self.status, PlanStatus::Unresolved { .. })
    }
}

/// Ordered result of a planning pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameMapping {
    pub project: String,
    pub mode: RenameMode,
    pub entries: Vec<MappingEntry>,
}

impl RenameMapping {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unresolved_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_resolved()).count()
    }

    pub fn unchanged_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == PlanStatus::Unchanged)
            .count()
    }
}

/// What happened to one entry during execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Renamed,
    /// Source and target were the same location
    AlreadyInPlace,
    Failed(String),
    /// Not attempted because the batch was cancelled
    Skipped,
}

/// A rename that did not happen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameFailure {
    pub item: ItemId,
    pub old_path: PathBuf,
    pub new_path: PathBuf,
    pub error: String,
}

impl fmt::Display for RenameFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}: {}",
            self.old_path.display(),
            self.new_path.display(),
            self.error
        )
    }
}

/// Summary of an execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cancelled: bool,
    /// One outcome per mapping entry, in mapping order
    pub outcomes: Vec<(ItemId, ItemOutcome)>,
    pub failures: Vec<RenameFailure>,
}

impl ExecutionReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed == 0 && self.skipped == 0 && !self.cancelled
    }
}

fn file_name_of(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
