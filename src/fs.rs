//! Filesystem access used by the rename engine.
//!
//! The planner and executor only ever talk to the filesystem through the
//! [`FileSystem`] trait so that existence checks, renames and path
//! comparisons all go through one place.

#[cfg(test)]
pub(crate) mod testing;

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// The filesystem operations the rename engine depends on
pub trait FileSystem {
    /// Whether anything (file, directory, dangling symlink) occupies `path`
    fn exists(&self, path: &Path) -> bool;

    /// Move `from` to `to`
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Absolute, lexically normalized form of `path`
    fn absolute(&self, path: &Path) -> PathBuf;

    /// Whether both paths point at the same location
    fn same_location(&self, a: &Path, b: &Path) -> bool {
        self.absolute(a) == self.absolute(b)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.exists(path)
    }
}

/// [`FileSystem`] backed by `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(e) if is_cross_device(&e) => {
                debug!(from = ?from, to = ?to, "Cross-device rename, falling back to copy");
                move_across_devices(from, to)
            }
            Err(e) => Err(e),
        }
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        absolute_path(path)
    }

    fn same_location(&self, a: &Path, b: &Path) -> bool {
        // canonicalize resolves symlinks when both sides exist
        match (fs::canonicalize(a), fs::canonicalize(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => absolute_path(a) == absolute_path(b),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// Join `path` onto the current directory if needed and drop `.`/`..`
/// components without touching the filesystem.
pub fn absolute_path(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn is_cross_device(err: &io::Error) -> bool {
    #[cfg(windows)]
    const EXDEV: i32 = 17;
    #[cfg(not(windows))]
    const EXDEV: i32 = 18;

    err.raw_os_error() == Some(EXDEV)
}

fn move_across_devices(from: &Path, to: &Path) -> io::Result<()> {
    copy_then_remove(from, to, |path| fs::remove_file(path))
}

/// Copy `from` to `to`, verify the size, then remove `from`.
///
/// On any failure after the copy started `to` is removed again, so the
/// source stays the only copy.
fn copy_then_remove<R>(from: &Path, to: &Path, remove_source: R) -> io::Result<()>
where
    R: FnOnce(&Path) -> io::Result<()>,
{
    let source_size = fs::metadata(from)?.len();

    let result = fs::copy(from, to)
        .and_then(|_| verify_size(to, source_size))
        .and_then(|()| remove_source(from));

    if let Err(e) = result {
        warn!(from = ?from, to = ?to, "Cross-device move failed: {}", e);
        if let Err(cleanup) = fs::remove_file(to) {
            if cleanup.kind() != io::ErrorKind::NotFound {
                warn!(path = ?to, "Could not remove partial copy: {}", cleanup);
            }
        }
        return Err(e);
    }

    Ok(())
}

fn verify_size(path: &Path, expected: u64) -> io::Result<()> {
    let copied = fs::metadata(path)?.len();
    if copied != expected {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!(
                "copy verification failed: source {} bytes, destination {} bytes",
                expected, copied
            ),
        ));
    }
    Ok(())
}
