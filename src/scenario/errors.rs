use thiserror::Error;

use crate::client::ClientError;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Run output has no 'logs' field")]
    LogsAbsent,

    #[error("Expected at least {expected} log records, got {actual}")]
    TooFewLogs { expected: usize, actual: usize },

    #[error("Log record {index}: expected {expected:?}, got {actual:?}")]
    Mismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("Log record {index} has no text in 'c': {record}")]
    MissingText { index: usize, record: serde_json::Value },

    #[error("Script raised: {message}")]
    ScriptFailed { message: String },

    #[error("Failed to render expected log text: {0}")]
    Render(#[from] serde_json::Error),
}
