//! Frames exchanged on a session.
//!
//! A session opens with `Hello` → `Welcome` (or `Rejected`), after which the
//! client sends one `Call` at a time and the server answers each with a
//! `Reply` carrying the same sequence number.

use serde::{Deserialize, Serialize};

use crate::error::RemoteError;
use crate::value::Value;

/// Version spoken by this build; peers must match exactly
pub const PROTOCOL_VERSION: u16 = 1;

/// Result of one remote operation: its success values or the failure it reported
pub type Outcome = Result<Vec<Value>, RemoteError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientFrame {
    Hello { version: u16 },
    Call(Call),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerFrame {
    Welcome { version: u16 },
    Rejected { reason: String },
    Reply(Reply),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub seq: u32,
    pub operation: String,
    pub args: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub seq: u32,
    pub outcome: Outcome,
}
