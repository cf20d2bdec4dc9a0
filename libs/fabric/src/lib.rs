//! Tablewire Fabric - Low-level transport and codec layer
//!
//! Provides a length-prefix framed TCP transport over buffered I/O and a
//! bincode codec, combined into a [`Channel`] that carries the storage
//! client's handshake and call/reply frames.
//!
//! # Example
//!
//! ```no_run
//! use tablewire_fabric::{Channel, codec::BincodeCodec, transport::TcpTransport};
//! use serde::{Serialize, Deserialize};
//! use std::time::Duration;
//!
//! #[derive(Serialize, Deserialize)]
//! struct Ping { seq: u32 }
//!
//! #[derive(Serialize, Deserialize)]
//! struct Pong { seq: u32 }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let builder = TcpTransport::builder()
//!     .address("127.0.0.1:9090")
//!     .connect_timeout(Duration::from_secs(30))
//!     .buffer_size(8192);
//!
//! let mut channel = Channel::tcp(builder, BincodeCodec).await?;
//! let pong: Pong = channel.request(&Ping { seq: 1 }).await?;
//! channel.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod codec;
pub mod error;
pub mod transport;

// Re-exports for convenience
pub use channel::Channel;
pub use error::{Error, Result};
