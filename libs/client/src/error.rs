use tablewire_core::{RemoteError, ShapeError, ValueKind};
use thiserror::Error;

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The session could not be established
    Connection,
    /// The call does not fit the operation catalog; a programming error
    Resolution,
    /// The remote operation ran and reported a failure
    Remote,
    /// The connection was already closed
    Usability,
    /// The session failed mid-call
    Transport,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: tablewire_fabric::Error,
    },

    #[error("Handshake with {addr} failed: {reason}")]
    Handshake { addr: String, reason: String },

    #[error("Connection is closed")]
    Closed,

    #[error("No operation named `{0}`")]
    UnknownOperation(String),

    #[error("Operation `{operation}` takes {expected} arguments, got {got}")]
    ArityMismatch {
        operation: String,
        expected: usize,
        got: usize,
    },

    #[error("Argument {index} of `{operation}` should be {expected}, got {got}")]
    ArgumentMismatch {
        operation: String,
        index: usize,
        expected: ValueKind,
        got: ValueKind,
    },

    #[error("Reply to `{operation}` does not match its declared results: {source}")]
    ResultShape {
        operation: String,
        #[source]
        source: ShapeError,
    },

    #[error("Remote failure: {0}")]
    Remote(#[from] RemoteError),

    #[error("Transport error: {0}")]
    Transport(#[from] tablewire_fabric::Error),

    #[error("Protocol violation: {0}")]
    Protocol(String),

    #[error("Session lost track of its replies; recycle the connection")]
    Desynchronized,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connect { .. } | Self::Handshake { .. } => ErrorKind::Connection,
            Self::UnknownOperation(_)
            | Self::ArityMismatch { .. }
            | Self::ArgumentMismatch { .. }
            | Self::ResultShape { .. } => ErrorKind::Resolution,
            Self::Remote(_) => ErrorKind::Remote,
            Self::Closed => ErrorKind::Usability,
            Self::Transport(_) | Self::Protocol(_) | Self::Desynchronized => ErrorKind::Transport,
        }
    }

    /// The failure reported by the remote operation, if that is what this is
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            Self::Remote(e) => Some(e),
            _ => None,
        }
    }

    pub(crate) fn arguments(operation: &str, shape: ShapeError) -> Self {
        match shape {
            ShapeError::Count { expected, got } => Self::ArityMismatch {
                operation: operation.to_string(),
                expected,
                got,
            },
            ShapeError::Kind {
                index,
                expected,
                got,
            } => Self::ArgumentMismatch {
                operation: operation.to_string(),
                index,
                expected,
                got,
            },
        }
    }

    pub(crate) fn results(operation: &str, source: ShapeError) -> Self {
        Self::ResultShape {
            operation: operation.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
