#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidArguments = 2,
    PathNotFound = 3,
    ValidationFailed = 4,
    ConfigError = 5,
    PermissionError = 6,
    HistoryError = 7,
    PartialFailure = 8,
    UndoIncomplete = 9,
    TagCatalogError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}
