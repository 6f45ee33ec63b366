//! Progress output for user-facing status updates.
//!
//! In verbose mode output is suppressed since tracing covers the same
//! ground. Otherwise each rename and undo step is shown on stderr.

use colored::Colorize;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

use crate::rename::{ExecutionEvent, ItemOutcome};
use crate::undo::{UndoOutcome, UndoStatus};

/// Progress reporter for user-facing output
pub struct Progress {
    writer: Box<dyn Write>,
    /// When true, all output is suppressed (verbose mode uses tracing instead)
    silent: bool,
    colors_enabled: bool,
}

/// Check if we should use colors in output
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }
    io::stderr().is_terminal()
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    /// Create a new progress reporter writing to stderr
    pub fn new() -> Self {
        Self::new_with_ui(false, should_use_colors())
    }

    /// When `verbose` is set, output is suppressed (tracing handles it)
    pub fn new_with_ui(verbose: bool, colors_enabled: bool) -> Self {
        Self {
            writer: Box::new(io::stderr()),
            silent: verbose,
            colors_enabled,
        }
    }

    #[cfg(test)]
    pub fn with_writer(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            silent: false,
            colors_enabled: false,
        }
    }

    pub fn scan_complete(&mut self, count: usize) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(
                self.writer,
                "{}",
                format!("Found {} files", count).dimmed()
            );
        } else {
            let _ = writeln!(self.writer, "Found {} files", count);
        }
    }

    /// Report one handled entry of a running batch
    pub fn execution_event(&mut self, event: &ExecutionEvent) {
        if self.silent {
            return;
        }
        if let ExecutionEvent::Item {
            done,
            total,
            old_path,
            new_path,
            outcome,
            ..
        } = event
        {
            let from = file_name(old_path);
            let to = file_name(new_path);
            match outcome {
                ItemOutcome::Renamed | ItemOutcome::AlreadyInPlace => {
                    self.step(*done, *total, &from, &to)
                }
                ItemOutcome::Failed(error) => {
                    self.step_failed(*done, *total, &from, error);
                }
                ItemOutcome::Skipped => self.step_failed(*done, *total, &from, "skipped"),
            }
        }
    }

    /// Report starting an undo
    pub fn undo_start(&mut self, total: usize, from_timestamp: &str) {
        if self.silent {
            return;
        }
        let _ = writeln!(self.writer);
        if self.colors_enabled {
            let _ = writeln!(
                self.writer,
                "{}",
                format!("Undoing {} renames from history ({})", total, from_timestamp).bold()
            );
        } else {
            let _ = writeln!(
                self.writer,
                "Undoing {} renames from history ({})",
                total, from_timestamp
            );
        }
    }

    /// Report each processed undo entry
    pub fn undo_outcomes(&mut self, outcomes: &[UndoOutcome]) {
        if self.silent {
            return;
        }
        let total = outcomes.len();
        for (i, outcome) in outcomes.iter().enumerate() {
            let from = file_name(&outcome.entry.new_path);
            let to = file_name(&outcome.entry.original_path);
            match &outcome.status {
                UndoStatus::Reverted => self.step(i + 1, total, &from, &to),
                UndoStatus::AlreadyConsistent => self.step(i + 1, total, &from, &to),
                UndoStatus::Missing => self.step_failed(i + 1, total, &from, "missing"),
                UndoStatus::Failed { error } => self.step_failed(i + 1, total, &from, error),
            }
        }
    }

    /// Report an error during operation (non-fatal)
    pub fn warn(&mut self, message: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(self.writer, "{} {}", "!".yellow().bold(), message.yellow());
        } else {
            let _ = writeln!(self.writer, "Warning: {}", message);
        }
    }

    /// Report history file written
    pub fn history_written(&mut self, path: &Path) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(
                self.writer,
                "{}",
                format!("History saved to: {}", path.display()).dimmed()
            );
        } else {
            let _ = writeln!(self.writer, "History saved to: {}", path.display());
        }
    }

    fn step(&mut self, current: usize, total: usize, from: &str, to: &str) {
        if self.colors_enabled {
            let counter = format!("[{}/{}]", current, total);
            let _ = writeln!(
                self.writer,
                "{} {} {} {}",
                counter.cyan(),
                from.dimmed(),
                "→".cyan(),
                to
            );
        } else {
            let _ = writeln!(self.writer, "[{}/{}] {} -> {}", current, total, from, to);
        }
    }

    fn step_failed(&mut self, current: usize, total: usize, from: &str, reason: &str) {
        if self.colors_enabled {
            let counter = format!("[{}/{}]", current, total);
            let _ = writeln!(
                self.writer,
                "{} {} {}",
                counter.cyan(),
                from.dimmed(),
                format!("({})", reason).red()
            );
        } else {
            let _ = writeln!(self.writer, "[{}/{}] {} ({})", current, total, from, reason);
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemId;
    use crate::undo::UndoEntry;
    use std::path::PathBuf;

    fn create_test_progress() -> (Progress, std::sync::Arc<std::sync::Mutex<Vec<u8>>>) {
        let buffer = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let writer = TestWriter(buffer.clone());
        let progress = Progress::with_writer(Box::new(writer));
        (progress, buffer)
    }

    struct TestWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn item_event(done: usize, outcome: ItemOutcome) -> ExecutionEvent {
        ExecutionEvent::Item {
            done,
            total: 3,
            item: ItemId(0),
            old_path: PathBuf::from("/p/a.jpg"),
            new_path: PathBuf::from("/p/P_240101_001.jpg"),
            outcome,
        }
    }

    #[test]
    fn test_execution_events() {
        let (mut progress, buffer) = create_test_progress();

        progress.execution_event(&ExecutionEvent::Started { total: 3 });
        progress.execution_event(&item_event(1, ItemOutcome::Renamed));
        progress.execution_event(&item_event(2, ItemOutcome::Failed("denied".to_string())));
        progress.execution_event(&item_event(3, ItemOutcome::Skipped));

        let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(output.contains("[1/3] a.jpg -> P_240101_001.jpg"));
        assert!(output.contains("[2/3] a.jpg (denied)"));
        assert!(output.contains("[3/3] a.jpg (skipped)"));
    }

    #[test]
    fn test_undo_outcomes() {
        let (mut progress, buffer) = create_test_progress();
        let entry = UndoEntry {
            position: 0,
            item: ItemId(0),
            original_path: PathBuf::from("/p/a.jpg"),
            new_path: PathBuf::from("/p/P_240101_001.jpg"),
        };

        progress.undo_outcomes(&[
            UndoOutcome {
                entry: entry.clone(),
                status: UndoStatus::Reverted,
            },
            UndoOutcome {
                entry,
                status: UndoStatus::Missing,
            },
        ]);

        let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(output.contains("[1/2] P_240101_001.jpg -> a.jpg"));
        assert!(output.contains("[2/2] P_240101_001.jpg (missing)"));
    }

    #[test]
    fn test_silent_writes_nothing() {
        let buffer = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut progress = Progress {
            writer: Box::new(TestWriter(buffer.clone())),
            silent: true,
            colors_enabled: false,
        };

        progress.warn("ignored");
        progress.scan_complete(3);

        assert!(buffer.lock().unwrap().is_empty());
    }
}
