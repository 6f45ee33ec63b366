mod codes;

pub use codes::ExitCode;

use crate::config::ConfigError;
use crate::history::HistoryError;
use crate::scanner::ScannerError;
use crate::tags::TagError;
use crate::validator::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Path not found: {path}")]
    PathNotFound { path: PathBuf },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("{0}")]
    InvalidArguments(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Tag catalog error: {0}")]
    Tags(#[from] TagError),

    #[error("History file error: {message}")]
    HistoryError {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("{failed} of {total} renames failed")]
    PartialFailure { failed: usize, total: usize },

    #[error("{failed} renames could not be undone")]
    UndoIncomplete { failed: usize },

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            AppError::PathNotFound { .. } => ExitCode::PathNotFound,
            AppError::PermissionDenied { .. } => ExitCode::PermissionError,
            AppError::InvalidArguments(_) => ExitCode::InvalidArguments,
            AppError::Validation(_) => ExitCode::ValidationFailed,
            AppError::Config(_) => ExitCode::ConfigError,
            AppError::Tags(_) => ExitCode::TagCatalogError,
            AppError::HistoryError { .. } => ExitCode::HistoryError,
            AppError::PartialFailure { .. } => ExitCode::PartialFailure,
            AppError::UndoIncomplete { .. } => ExitCode::UndoIncomplete,
            AppError::Other(_) => ExitCode::GeneralError,
        }
    }

    pub fn detailed_message(&self) -> String {
        match self {
            AppError::PathNotFound { path } => {
                format!(
                    "The specified path does not exist:\n  {}\n\n\
                     Please verify the path and try again.",
                    path.display()
                )
            }

            AppError::PermissionDenied { path } => {
                format!(
                    "Permission denied when accessing:\n  {}\n\n\
                     Please check file permissions or run with appropriate privileges.",
                    path.display()
                )
            }

            AppError::InvalidArguments(message) => {
                format!("{}\n\nRun with --help for usage.", message)
            }

            AppError::Validation(err) => err.format_error_message(),

            AppError::Config(err) => {
                format!(
                    "{}\n\n\
                     Fix or remove the config file, or point --config at a valid one.",
                    err
                )
            }

            AppError::Tags(err) => {
                format!(
                    "{}\n\n\
                     Tag files map codes to a description or to per-language descriptions.",
                    err
                )
            }

            AppError::HistoryError { path, message } => {
                let path_info = path
                    .as_ref()
                    .map(|p| format!("File: {}\n", p.display()))
                    .unwrap_or_default();

                format!(
                    "History file error:\n  {}\n{}\n\
                     Ensure the history file exists and is valid JSON.",
                    message, path_info
                )
            }

            AppError::PartialFailure { failed, total } => {
                format!(
                    "{} of {} renames failed. The files listed above were left unchanged.\n\
                     Successful renames can be reverted with --undo.",
                    failed, total
                )
            }

            AppError::UndoIncomplete { failed } => {
                format!(
                    "{} renames could not be undone. Resolve the errors listed above \
                     and run --undo again with the same history file.",
                    failed
                )
            }

            AppError::Other(message) => message.clone(),
        }
    }
}

impl From<ScannerError> for AppError {
    fn from(err: ScannerError) -> Self {
        match err {
            ScannerError::PathNotFound(path) => AppError::PathNotFound { path },
            ScannerError::PermissionDenied(path) => AppError::PermissionDenied { path },
            ScannerError::IoError(e) => AppError::Other(format!("I/O error: {}", e)),
        }
    }
}

impl From<HistoryError> for AppError {
    fn from(err: HistoryError) -> Self {
        AppError::HistoryError {
            path: None,
            message: err.to_string(),
        }
    }
}
