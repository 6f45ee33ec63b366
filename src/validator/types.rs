use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Project id is missing")]
    MissingProject,

    #[error("No files to rename")]
    NoItems,

    #[error("Invalid rename settings: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("{} source file(s) not found", paths.len())]
    MissingSources { paths: Vec<PathBuf> },

    #[error("Destination directory not found: {0}")]
    DestinationNotFound(PathBuf),

    #[error("Start index {start_index} leaves no room for {count} files")]
    IndexOutOfRange { start_index: usize, count: usize },
}

impl ValidationError {
    pub fn format_error_message(&self) -> String {
        match self {
            ValidationError::MissingProject => String::from(
                "A project id is required to build file names.\n\
                 Pass one with --project <ID>.",
            ),
            ValidationError::NoItems => {
                String::from("No files were selected. Pass files or directories to rename.")
            }
            ValidationError::InvalidConfig(e) => {
                format!("The rename settings are invalid:\n  {}\n", e)
            }
            ValidationError::MissingSources { paths } => {
                let mut msg = String::from("The following files no longer exist:\n");
                for path in paths.iter().take(10) {
                    msg.push_str(&format!("  - {}\n", path.display()));
                }
                if paths.len() > 10 {
                    msg.push_str(&format!("  ... and {} more\n", paths.len() - 10));
                }
                msg
            }
            ValidationError::DestinationNotFound(path) => format!(
                "The destination directory does not exist:\n  {}\n",
                path.display()
            ),
            ValidationError::IndexOutOfRange { start_index, count } => format!(
                "Numbering {} files from {} overflows the sequence index.\n\
                 Pass a smaller --start-index.",
                count, start_index
            ),
        }
    }
}
