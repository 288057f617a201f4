use std::path::PathBuf;

/// Errors at the process edge.  The engine itself never fails.
#[derive(thiserror::Error, Debug)]
pub enum RunnerError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidSetting {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("cannot open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
