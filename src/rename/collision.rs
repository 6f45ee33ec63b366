use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::fs::FileSystem;

use super::name_builder::extension_of;

/// Upper bound on the `_001`, `_002`, ... probes for one candidate
pub const MAX_COLLISION_ATTEMPTS: usize = 9999;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollisionError {
    #[error("No free name for {candidate:?} after {attempts} attempts")]
    Exhausted { candidate: PathBuf, attempts: usize },
}

/// Return a path for `candidate` that is neither occupied on disk nor
/// claimed earlier in the same batch.
///
/// `original` is the file being renamed; landing on it is not a collision.
/// `claimed` holds absolute paths already handed out in this planning pass.
pub fn ensure_unique(
    candidate: &Path,
    original: &Path,
    claimed: &HashSet<PathBuf>,
    separator: &str,
    fs: &dyn FileSystem,
) -> Result<PathBuf, CollisionError> {
    if is_free(candidate, original, claimed, fs) {
        debug!(path = ?candidate, "Candidate is free");
        return Ok(candidate.to_path_buf());
    }

    let stem = candidate
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = extension_of(candidate);
    let parent = candidate.parent().unwrap_or_else(|| Path::new(""));

    info!(path = ?candidate, "Candidate collides, probing for a free name");

    for counter in 1..=MAX_COLLISION_ATTEMPTS {
        let probe = parent.join(format!("{}{}{:03}{}", stem, separator, counter, ext));
        if is_free(&probe, original, claimed, fs) {
            debug!(path = ?probe, counter, "Found free name");
            return Ok(probe);
        }
    }

    warn!(path = ?candidate, "Collision counter exhausted");
    Err(CollisionError::Exhausted {
        candidate: candidate.to_path_buf(),
        attempts: MAX_COLLISION_ATTEMPTS,
    })
}

fn is_free(path: &Path, original: &Path, claimed: &HashSet<PathBuf>, fs: &dyn FileSystem) -> bool {
    if claimed.contains(&fs.absolute(path)) {
        return false;
    }
    !fs.exists(path) || fs.same_location(path, original)
}
