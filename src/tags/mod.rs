//! Tag codes: the catalog of known codes, detection from existing file
//! names, and usage counts.

mod catalog;
mod extract;
mod usage;

pub use catalog::{TagCatalog, TagDescription, TagSource, ENV_TAGS_FILE, TAGS_FILE_NAME};
pub use extract::{extract_suffix_from_name, extract_tags_from_name};
pub use usage::TagUsage;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TagError {
    #[error("Cannot read tag file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid tag file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot serialize {path:?}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
