use crate::error::Result;

pub mod tcp;

pub use self::tcp::{TcpTransport, TcpTransportBuilder, TcpTransportListener};

/// Default read/write buffer capacity for buffered transports
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Largest frame a transport accepts unless configured otherwise (100MB)
pub const DEFAULT_MAX_FRAME_LEN: usize = 100 * 1024 * 1024;

/// Transport trait for sending and receiving raw bytes
///
/// Each transport instance represents a single connection.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send bytes over the transport
    async fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Receive bytes from the transport
    ///
    /// Cancel safe: dropping the future before it completes loses no part
    /// of the next message.
    async fn receive(&mut self) -> Result<Vec<u8>>;

    /// Close the transport connection
    async fn close(&mut self) -> Result<()>;
}

/// Listener side of a transport, yielding one transport per accepted peer
#[async_trait::async_trait]
pub trait TransportListener: Send + Sync {
    type Transport: Transport;

    /// Wait for the next incoming connection
    async fn accept(&self) -> Result<Self::Transport>;

    /// Stop accepting connections
    async fn close(&mut self) -> Result<()>;
}
