mod types;

pub use types::*;

use crate::config::RenameConfig;
use crate::fs::FileSystem;
use crate::item::RenameItem;
use crate::rename::PlanOptions;
use tracing::{debug, info, warn};

/// Check everything a planning pass needs before any name is built
pub fn validate_batch(
    project: &str,
    items: &[RenameItem],
    config: &RenameConfig,
    options: &PlanOptions,
    fs: &dyn FileSystem,
) -> Result<(), ValidationError> {
    if project.trim().is_empty() {
        return Err(ValidationError::MissingProject);
    }

    if items.is_empty() {
        return Err(ValidationError::NoItems);
    }

    config.validate()?;

    if config.start_index.checked_add(items.len()).is_none() {
        return Err(ValidationError::IndexOutOfRange {
            start_index: config.start_index,
            count: items.len(),
        });
    }

    info!("Validating {} files", items.len());

    let missing: Vec<_> = items
        .iter()
        .filter(|item| !fs.exists(&item.original_path))
        .map(|item| item.original_path.clone())
        .collect();

    if !missing.is_empty() {
        warn!(count = missing.len(), "Source files missing");
        return Err(ValidationError::MissingSources { paths: missing });
    }

    if let Some(dest) = &options.dest_dir {
        if !fs.is_dir(dest) {
            return Err(ValidationError::DestinationNotFound(dest.clone()));
        }
        debug!(dest = ?dest, "Destination directory present");
    }

    Ok(())
}
