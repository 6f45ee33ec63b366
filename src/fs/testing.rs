//! In-memory [`FileSystem`] for tests that need to count or fail renames.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use super::{absolute_path, FileSystem};

#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RefCell<BTreeSet<PathBuf>>,
    fail_targets: RefCell<HashSet<PathBuf>>,
    renames: RefCell<Vec<(PathBuf, PathBuf)>>,
}

impl MemoryFileSystem {
    pub fn with_files<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let fs = Self::default();
        for file in files {
            fs.add(file);
        }
        fs
    }

    pub fn add(&self, path: impl AsRef<Path>) {
        self.files.borrow_mut().insert(absolute_path(path.as_ref()));
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        self.files.borrow_mut().remove(&absolute_path(path.as_ref()));
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.files.borrow().contains(&absolute_path(path.as_ref()))
    }

    /// Make every rename into `path` fail with `PermissionDenied`
    pub fn fail_renames_to(&self, path: impl AsRef<Path>) {
        self.fail_targets
            .borrow_mut()
            .insert(absolute_path(path.as_ref()));
    }

    pub fn rename_calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.renames.borrow().clone()
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.contains(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let from = absolute_path(from);
        let to = absolute_path(to);
        self.renames.borrow_mut().push((from.clone(), to.clone()));

        if self.fail_targets.borrow().contains(&to) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only target"));
        }

        let mut files = self.files.borrow_mut();
        if !files.remove(&from) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "source missing"));
        }
        files.insert(to);
        Ok(())
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        absolute_path(path)
    }
}
