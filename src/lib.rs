pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod history;
pub mod item;
pub mod logging;
pub mod output;
pub mod progress;
pub mod rename;
pub mod scanner;
pub mod tags;
pub mod undo;
pub mod validator;

pub use config::{load_config, AppConfig, ConfigError, RenameConfig};
pub use error::{AppError, ExitCode};
pub use fs::{FileSystem, StdFileSystem};
pub use item::{ItemId, RenameItem, WorkingSet};
pub use rename::{
    build_mapping, execute, spawn_execution, CancelFlag, ExecutionReport, PlanOptions,
    RenameMapping, RenameMode,
};
pub use scanner::{collect_files, ScannerError};
pub use tags::{TagCatalog, TagUsage};
pub use undo::{UndoLog, UndoReport};
pub use validator::{validate_batch, ValidationError};
