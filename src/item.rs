//! Per-file rename settings and the working set that owns them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

use crate::fs::FileSystem;

/// Stable identifier of an item within a [`WorkingSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything the planner needs to know about one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameItem {
    pub id: ItemId,
    /// Current location, updated after a successful rename
    pub original_path: PathBuf,
    pub tags: HashSet<String>,
    pub suffix: String,
    /// Overrides the batch date when it is exactly six digits
    pub explicit_date: Option<String>,
    pub pa_mat: String,
}

impl RenameItem {
    pub fn new(id: ItemId, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            original_path: path.into(),
            tags: HashSet::new(),
            suffix: String::new(),
            explicit_date: None,
            pa_mat: String::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags.extend(tags.into_iter().map(|t| t.as_ref().to_string()));
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.explicit_date = Some(date.into());
        self
    }

    pub fn with_pa_mat(mut self, pa_mat: impl Into<String>) -> Self {
        self.pa_mat = pa_mat.into();
        self
    }

    /// Tags in lexicographic order
    pub fn sorted_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.tags.iter().cloned().collect();
        tags.sort();
        tags
    }

    /// The explicit date if it is well formed
    pub fn valid_explicit_date(&self) -> Option<&str> {
        self.explicit_date
            .as_deref()
            .filter(|d| d.len() == 6 && d.bytes().all(|b| b.is_ascii_digit()))
    }

    pub fn file_name(&self) -> String {
        self.original_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Normalize a user-entered tag code
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_uppercase()
}

/// Ordered set of items keyed by [`ItemId`]
#[derive(Debug, Default)]
pub struct WorkingSet {
    next_id: u64,
    items: Vec<RenameItem>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, returning `None` when the path is already present
    pub fn add_path(&mut self, path: impl Into<PathBuf>) -> Option<ItemId> {
        let path = path.into();
        if self.items.iter().any(|item| item.original_path == path) {
            debug!(path = ?path, "Skipping duplicate path");
            return None;
        }

        let id = ItemId(self.next_id);
        self.next_id += 1;
        self.items.push(RenameItem::new(id, path));
        Some(id)
    }

    pub fn get(&self, id: ItemId) -> Option<&RenameItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut RenameItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn remove(&mut self, id: ItemId) -> Option<RenameItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn items(&self) -> &[RenameItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [RenameItem] {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop items whose file no longer exists and return them
    pub fn retain_existing(&mut self, fs: &dyn FileSystem) -> Vec<RenameItem> {
        let (kept, missing): (Vec<_>, Vec<_>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| fs.exists(&item.original_path));
        self.items = kept;
        missing
    }

    /// Point items back at the paths an undo restored
    pub fn restore_paths(&mut self, reverted: &[(ItemId, PathBuf)]) {
        for (id, path) in reverted {
            if let Some(item) = self.get_mut(*id) {
                item.original_path = path.clone();
            }
        }
    }
}
