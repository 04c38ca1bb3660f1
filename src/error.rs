use thiserror::Error;

use crate::scanner::ProbeKind;

#[derive(Error, Debug)]
pub enum StepError {
    #[error("No more input: no token remains in the buffer")]
    NoMoreInput,
    #[error("Input mismatch: expected {expected}, found {found:?}")]
    InputMismatch { expected: ProbeKind, found: String },
    #[error("Session cancelled")]
    SessionCancelled,
    #[error("Malformed delimiter {pattern:?}: no forward progress at offset {offset}")]
    MalformedDelimiter { pattern: String, offset: usize },
    #[error("Invalid delimiter {pattern:?}: {source}")]
    InvalidDelimiter {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Invalid radix: {0} (expected 2..=36)")]
    InvalidRadix(u32),
    #[error("Invalid span: start {start}, length {length}")]
    InvalidSpan { start: usize, length: usize },
    #[error("Config error: {0}")]
    Config(String),
}

pub type StepResult<T> = Result<T, StepError>;

impl StepError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        StepError::Config(message.into())
    }
}
