use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::fs::FileSystem;
use crate::item::{ItemId, RenameItem};
use crate::undo::UndoLog;

use super::types::{
    ExecutionReport, ItemOutcome, MappingEntry, PlanStatus, RenameFailure, RenameMapping,
};

/// Shared flag polled between items
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress reported while a mapping is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionEvent {
    Started {
        total: usize,
    },
    Item {
        /// 1-based count of entries handled so far
        done: usize,
        total: usize,
        item: ItemId,
        old_path: PathBuf,
        new_path: PathBuf,
        outcome: ItemOutcome,
    },
    Finished {
        succeeded: usize,
        failed: usize,
        skipped: usize,
        cancelled: bool,
    },
}

/// Apply `mapping` in order.
///
/// Every entry is attempted on its own; a failure never stops the batch.
/// Successful renames update the matching item in `items` and are appended
/// to `undo_log`. Once `cancel` is set, the remaining entries are skipped.
pub fn execute(
    mapping: &RenameMapping,
    items: &mut [RenameItem],
    undo_log: &mut UndoLog,
    fs: &dyn FileSystem,
    cancel: &CancelFlag,
    mut on_event: impl FnMut(ExecutionEvent),
) -> ExecutionReport {
    let total = mapping.len();
    let index_of: HashMap<ItemId, usize> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| (item.id, idx))
        .collect();

    info!(project = %mapping.project, "Executing {} renames", total);
    on_event(ExecutionEvent::Started { total });

    let mut report = ExecutionReport::default();

    for (done, entry) in mapping.entries.iter().enumerate() {
        if !report.cancelled && cancel.is_cancelled() {
            info!(remaining = total - done, "Execution cancelled");
            report.cancelled = true;
        }

        let outcome = if report.cancelled {
            ItemOutcome::Skipped
        } else {
            apply_entry(entry, fs)
        };

        match &outcome {
            ItemOutcome::Renamed => {
                report.succeeded += 1;
                if let Some(&idx) = index_of.get(&entry.item) {
                    items[idx].original_path = entry.new_path.clone();
                } else {
                    warn!(item = %entry.item, "Renamed entry has no matching item");
                }
                undo_log.record(
                    entry.position,
                    entry.item,
                    entry.old_path.clone(),
                    entry.new_path.clone(),
                );
            }
            ItemOutcome::AlreadyInPlace => report.succeeded += 1,
            ItemOutcome::Failed(error) => {
                report.failed += 1;
                report.failures.push(RenameFailure {
                    item: entry.item,
                    old_path: entry.old_path.clone(),
                    new_path: entry.new_path.clone(),
                    error: error.clone(),
                });
            }
            ItemOutcome::Skipped => report.skipped += 1,
        }

        on_event(ExecutionEvent::Item {
            done: done + 1,
            total,
            item: entry.item,
            old_path: entry.old_path.clone(),
            new_path: entry.new_path.clone(),
            outcome: outcome.clone(),
        });
        report.outcomes.push((entry.item, outcome));
    }

    info!(
        succeeded = report.succeeded,
        failed = report.failed,
        skipped = report.skipped,
        "Execution complete"
    );

    on_event(ExecutionEvent::Finished {
        succeeded: report.succeeded,
        failed: report.failed,
        skipped: report.skipped,
        cancelled: report.cancelled,
    });

    report
}

fn apply_entry(entry: &MappingEntry, fs: &dyn FileSystem) -> ItemOutcome {
    if let PlanStatus::Unresolved { reason } = &entry.status {
        return ItemOutcome::Failed(reason.clone());
    }

    if fs.same_location(&entry.old_path, &entry.new_path) {
        debug!(path = ?entry.old_path, "Already in place");
        return ItemOutcome::AlreadyInPlace;
    }

    // std::fs::rename replaces an existing target on most platforms
    if fs.exists(&entry.new_path) {
        warn!(path = ?entry.new_path, "Target appeared since planning");
        return ItemOutcome::Failed(format!("{} already exists", entry.new_path.display()));
    }

    match fs.rename(&entry.old_path, &entry.new_path) {
        Ok(()) => {
            debug!(from = ?entry.old_path, to = ?entry.new_path, "Renamed");
            ItemOutcome::Renamed
        }
        Err(e) => {
            warn!(from = ?entry.old_path, to = ?entry.new_path, "Rename failed: {}", e);
            ItemOutcome::Failed(e.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Rename worker panicked")]
    WorkerPanicked,
}

/// Everything handed back by a worker once it is done
#[derive(Debug)]
pub struct ExecutionResult {
    pub report: ExecutionReport,
    pub items: Vec<RenameItem>,
    pub undo_log: UndoLog,
}

/// A batch running on a worker thread
pub struct ExecutionHandle {
    events: Receiver<ExecutionEvent>,
    cancel: CancelFlag,
    worker: JoinHandle<ExecutionResult>,
}

impl ExecutionHandle {
    pub fn events(&self) -> &Receiver<ExecutionEvent> {
        &self.events
    }

    /// Ask the worker to stop before its next item
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn join(self) -> Result<ExecutionResult, ExecutorError> {
        self.worker.join().map_err(|_| ExecutorError::WorkerPanicked)
    }
}

/// Run [`execute`] on a worker thread, streaming events over a channel
pub fn spawn_execution<F>(
    mapping: RenameMapping,
    mut items: Vec<RenameItem>,
    mut undo_log: UndoLog,
    fs: F,
    cancel: CancelFlag,
) -> ExecutionHandle
where
    F: FileSystem + Send + 'static,
{
    let (sender, receiver): (Sender<ExecutionEvent>, Receiver<ExecutionEvent>) = unbounded();
    let worker_cancel = cancel.clone();

    let worker = thread::spawn(move || {
        let report = execute(&mapping, &mut items, &mut undo_log, &fs, &worker_cancel, |event| {
            // The receiver may already be gone; progress is optional
            let _ = sender.send(event);
        });
        ExecutionResult {
            report,
            items,
            undo_log,
        }
    });

    ExecutionHandle {
        events: receiver,
        cancel,
        worker,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::testing::MemoryFileSystem;
    use crate::fs::StdFileSystem;
    use crate::rename::RenameMode;
    use std::fs;
    use tempfile::tempdir;

    fn entry(id: u64, from: &str, to: &str, status: PlanStatus) -> MappingEntry {
        MappingEntry {
            item: ItemId(id),
            position: id as usize,
            old_path: PathBuf::from(from),
            new_path: PathBuf::from(to),
            status,
        }
    }

    fn mapping(entries: Vec<MappingEntry>) -> RenameMapping {
        RenameMapping {
            project: "P".to_string(),
            mode: RenameMode::Normal,
            entries,
        }
    }

    fn items_for(mapping: &RenameMapping) -> Vec<RenameItem> {
        mapping
            .entries
            .iter()
            .map(|e| RenameItem::new(e.item, e.old_path.clone()))
            .collect()
    }

    fn run(
        mapping: &RenameMapping,
        fs: &MemoryFileSystem,
    ) -> (ExecutionReport, Vec<RenameItem>, UndoLog) {
        let mut items = items_for(mapping);
        let mut log = UndoLog::new();
        let report = execute(mapping, &mut items, &mut log, fs, &CancelFlag::new(), |_| {});
        (report, items, log)
    }

    #[test]
    fn test_renames_in_order_and_records_undo() {
        let fs = MemoryFileSystem::with_files(["/p/a.jpg", "/p/b.jpg"]);
        let mapping = mapping(vec![
            entry(0, "/p/a.jpg", "/p/P_1.jpg", PlanStatus::Ready),
            entry(1, "/p/b.jpg", "/p/P_2.jpg", PlanStatus::Ready),
        ]);

        let (report, items, log) = run(&mapping, &fs);

        assert_eq!(report.succeeded, 2);
        assert!(report.is_complete_success());
        assert!(fs.contains("/p/P_1.jpg"));
        assert!(fs.contains("/p/P_2.jpg"));
        assert_eq!(items[0].original_path, PathBuf::from("/p/P_1.jpg"));
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].original_path, PathBuf::from("/p/a.jpg"));
    }

    #[test]
    fn test_same_location_skips_rename_call() {
        let fs = MemoryFileSystem::with_files(["/p/P_1.jpg"]);
        let mapping = mapping(vec![entry(
            0,
            "/p/P_1.jpg",
            "/p/./P_1.jpg",
            PlanStatus::Unchanged,
        )]);

        let (report, _, log) = run(&mapping, &fs);

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.outcomes[0].1, ItemOutcome::AlreadyInPlace);
        assert!(fs.rename_calls().is_empty());
        assert!(!log.has_history());
    }

    #[test]
    fn test_existing_target_is_not_overwritten() {
        let fs = MemoryFileSystem::with_files(["/p/a.jpg", "/p/P_1.jpg", "/p/b.jpg"]);
        let mapping = mapping(vec![
            entry(0, "/p/a.jpg", "/p/P_1.jpg", PlanStatus::Ready),
            entry(1, "/p/b.jpg", "/p/P_2.jpg", PlanStatus::Ready),
        ]);

        let (report, items, log) = run(&mapping, &fs);

        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded, 1);
        assert!(fs.contains("/p/a.jpg"));
        assert_eq!(items[0].original_path, PathBuf::from("/p/a.jpg"));
        assert_eq!(log.len(), 1);
        assert_eq!(report.failures[0].item, ItemId(0));
    }

    #[test]
    fn test_failure_does_not_stop_batch() {
        let fs = MemoryFileSystem::with_files(["/p/a.jpg", "/p/b.jpg", "/p/c.jpg"]);
        fs.fail_renames_to("/p/P_2.jpg");
        let mapping = mapping(vec![
            entry(0, "/p/a.jpg", "/p/P_1.jpg", PlanStatus::Ready),
            entry(1, "/p/b.jpg", "/p/P_2.jpg", PlanStatus::Ready),
            entry(2, "/p/c.jpg", "/p/P_3.jpg", PlanStatus::Ready),
        ]);

        let (report, items, log) = run(&mapping, &fs);

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].old_path, PathBuf::from("/p/b.jpg"));
        assert_eq!(items[1].original_path, PathBuf::from("/p/b.jpg"));
        let recorded: Vec<ItemId> = log.entries().iter().map(|e| e.item).collect();
        assert_eq!(recorded, vec![ItemId(0), ItemId(2)]);
    }

    #[test]
    fn test_unresolved_entry_fails_without_io() {
        let fs = MemoryFileSystem::with_files(["/p/a.jpg"]);
        let mapping = mapping(vec![entry(
            0,
            "/p/a.jpg",
            "/p/P_1.jpg",
            PlanStatus::Unresolved {
                reason: "exhausted".to_string(),
            },
        )]);

        let (report, _, _) = run(&mapping, &fs);

        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].error, "exhausted");
        assert!(fs.rename_calls().is_empty());
    }

    #[test]
    fn test_cancel_leaves_completed_prefix() {
        let fs = MemoryFileSystem::with_files(["/p/a.jpg", "/p/b.jpg", "/p/c.jpg"]);
        let mapping = mapping(vec![
            entry(0, "/p/a.jpg", "/p/P_1.jpg", PlanStatus::Ready),
            entry(1, "/p/b.jpg", "/p/P_2.jpg", PlanStatus::Ready),
            entry(2, "/p/c.jpg", "/p/P_3.jpg", PlanStatus::Ready),
        ]);
        let mut items = items_for(&mapping);
        let mut log = UndoLog::new();
        let cancel = CancelFlag::new();

        let report = execute(&mapping, &mut items, &mut log, &fs, &cancel, |event| {
            if let ExecutionEvent::Item { done: 1, .. } = event {
                cancel.cancel();
            }
        });

        assert!(report.cancelled);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.total(), 3);
        assert!(fs.contains("/p/P_1.jpg"));
        assert!(fs.contains("/p/b.jpg"));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_one_event_per_item() {
        let fs = MemoryFileSystem::with_files(["/p/a.jpg", "/p/b.jpg"]);
        let mapping = mapping(vec![
            entry(0, "/p/a.jpg", "/p/P_1.jpg", PlanStatus::Ready),
            entry(1, "/p/b.jpg", "/p/P_2.jpg", PlanStatus::Ready),
        ]);
        let mut items = items_for(&mapping);
        let mut log = UndoLog::new();
        let mut events = Vec::new();

        execute(&mapping, &mut items, &mut log, &fs, &CancelFlag::new(), |e| events.push(e));

        assert_eq!(events.len(), 4);
        assert_eq!(events[0], ExecutionEvent::Started { total: 2 });
        assert!(matches!(events[2], ExecutionEvent::Item { done: 2, total: 2, .. }));
        assert!(matches!(events[3], ExecutionEvent::Finished { succeeded: 2, .. }));
    }

    #[test]
    fn test_spawn_execution_on_disk() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();

        let mapping = RenameMapping {
            project: "P".to_string(),
            mode: RenameMode::Normal,
            entries: vec![
                MappingEntry {
                    item: ItemId(0),
                    position: 0,
                    old_path: a.clone(),
                    new_path: dir.path().join("P_001.jpg"),
                    status: PlanStatus::Ready,
                },
                MappingEntry {
                    item: ItemId(1),
                    position: 1,
                    old_path: b.clone(),
                    new_path: dir.path().join("P_002.jpg"),
                    status: PlanStatus::Ready,
                },
            ],
        };
        let items = items_for(&mapping);

        let handle =
            spawn_execution(mapping, items, UndoLog::new(), StdFileSystem, CancelFlag::new());
        let events: Vec<ExecutionEvent> = handle.events().iter().collect();
        let result = handle.join().unwrap();

        assert_eq!(events.len(), 4);
        assert_eq!(result.report.succeeded, 2);
        assert_eq!(result.undo_log.len(), 2);
        assert_eq!(result.items[1].original_path, dir.path().join("P_002.jpg"));
        assert_eq!(fs::read(dir.path().join("P_001.jpg")).unwrap(), b"a");
        assert!(!a.exists());
    }
}
