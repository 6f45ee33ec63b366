mod reader;
mod types;
mod writer;

pub use reader::read_history;
pub use types::*;
pub use writer::{write_history, write_history_file, write_undo_history, HistoryError};
