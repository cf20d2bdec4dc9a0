//! Tablewire Core - shared vocabulary of the storage client and its servers
//!
//! Defines the records the storage service trades in, the [`Value`] they are
//! marshaled into, the catalog of remote operations with their declared
//! shapes, the server-side [`TableService`] trait and the wire frames of a
//! session.

pub mod error;
pub mod operation;
pub mod protocol;
pub mod service;
pub mod types;
pub mod value;

pub use error::{RemoteError, ShapeError};
pub use operation::{OperationDescriptor, OPERATIONS};
pub use protocol::{Call, ClientFrame, Outcome, Reply, ServerFrame, PROTOCOL_VERSION};
pub use service::{dispatch, Handler, TableService};
pub use types::*;
pub use value::{Marshal, Returns, Value, ValueKind};
