use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::ValueKind;

/// Failure reported by the remote service for an otherwise successful round-trip
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Illegal argument: {0}")]
    IllegalArgument(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Operation `{0}` is not implemented by the server")]
    Unimplemented(String),

    #[error("Application error: {0}")]
    Application(String),
}

impl RemoteError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn illegal_argument(msg: impl Into<String>) -> Self {
        Self::IllegalArgument(msg.into())
    }

    pub fn application(msg: impl Into<String>) -> Self {
        Self::Application(msg.into())
    }
}

/// A list of values that does not match the shape an operation declares
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeError {
    #[error("expected {expected} values, got {got}")]
    Count { expected: usize, got: usize },

    #[error("value {index} should be {expected}, got {got}")]
    Kind {
        index: usize,
        expected: ValueKind,
        got: ValueKind,
    },
}
