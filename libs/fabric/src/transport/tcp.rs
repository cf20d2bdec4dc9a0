use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufStream};
use tokio::net::{TcpListener, TcpStream};

use crate::error::{Error, Result};
use crate::transport::{Transport, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_FRAME_LEN};

const MAX_FRAME_LEN_LIMIT: usize = u32::MAX as usize;

/// TCP transport with length-prefix framing over a buffered stream
///
/// Messages are sent with a 4-byte big-endian length prefix. Bytes of a
/// frame that is still arriving are kept across calls, so a `receive`
/// dropped or timed out halfway resumes where it stopped on the next call.
pub struct TcpTransport {
    stream: BufStream<TcpStream>,
    partial: Vec<u8>,
    send_timeout: Option<Duration>,
    receive_timeout: Option<Duration>,
    max_frame_len: usize,
}

impl TcpTransport {
    /// Connect to a remote TCP address with no timeouts
    pub async fn connect(addr: impl Into<String>) -> Result<Self> {
        Self::builder().address(addr).connect().await
    }

    /// Connect with a connect timeout
    pub async fn connect_timeout(addr: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::builder()
            .address(addr)
            .connect_timeout(timeout)
            .connect()
            .await
    }

    /// Create a builder for configuring the transport
    pub fn builder() -> TcpTransportBuilder {
        TcpTransportBuilder::new()
    }

    /// Create from an existing TcpStream
    pub fn from_stream(stream: TcpStream) -> Self {
        Self {
            stream: BufStream::with_capacity(DEFAULT_BUFFER_SIZE, DEFAULT_BUFFER_SIZE, stream),
            partial: Vec::new(),
            send_timeout: None,
            receive_timeout: None,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }

    /// Get the remote address of this connection
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        self.stream.get_ref().peer_addr().map_err(Into::into)
    }

    /// Get the local address of this connection
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.stream.get_ref().local_addr().map_err(Into::into)
    }

    /// Largest frame accepted in either direction
    pub fn max_frame_len(&self) -> usize {
        self.max_frame_len
    }

    async fn read_frame(&mut self) -> Result<Vec<u8>> {
        loop {
            if let Some(frame) = split_frame(&mut self.partial, self.max_frame_len)? {
                return Ok(frame);
            }

            // fill_buf consumes nothing, so cancelling here loses no bytes
            let chunk = self.stream.fill_buf().await?;
            if chunk.is_empty() {
                return Err(Error::ConnectionClosed);
            }
            let n = chunk.len();
            self.partial.extend_from_slice(chunk);
            self.stream.consume(n);
        }
    }
}

/// Take one complete frame off the front of `buf`, if it holds one
fn split_frame(buf: &mut Vec<u8>, max_frame_len: usize) -> Result<Option<Vec<u8>>> {
    let Some(header) = buf.get(..4) else {
        return Ok(None);
    };
    let len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;

    if len > max_frame_len {
        return Err(Error::InvalidFrame(format!(
            "Message too large: {} bytes",
            len
        )));
    }
    let end = len.saturating_add(4);
    if buf.len() < end {
        buf.reserve(end - buf.len());
        return Ok(None);
    }

    let frame = buf[4..end].to_vec();
    buf.drain(..end);
    Ok(Some(frame))
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.max_frame_len {
            return Err(Error::InvalidFrame(format!(
                "Message too large: {} bytes",
                bytes.len()
            )));
        }

        let len = u32::try_from(bytes.len()).map_err(|_| {
            Error::InvalidFrame(format!("Message too large: {} bytes", bytes.len()))
        })?;

        let timeout = self.send_timeout;
        let send_op = async {
            // Write length prefix (4 bytes, big-endian)
            self.stream.write_u32(len).await?;

            // Write data, then push the buffer onto the socket
            self.stream.write_all(bytes).await?;
            self.stream.flush().await?;

            Ok::<(), Error>(())
        };

        if let Some(timeout) = timeout {
            tokio::time::timeout(timeout, send_op)
                .await
                .map_err(|_| Error::Timeout("Send"))?
        } else {
            send_op.await
        }
    }

    async fn receive(&mut self) -> Result<Vec<u8>> {
        if let Some(timeout) = self.receive_timeout {
            tokio::time::timeout(timeout, self.read_frame())
                .await
                .map_err(|_| Error::Timeout("Receive"))?
        } else {
            self.read_frame().await
        }
    }

    /// Flush and shut the write half down, bounded by the send timeout
    async fn close(&mut self) -> Result<()> {
        if let Some(timeout) = self.send_timeout {
            tokio::time::timeout(timeout, self.stream.shutdown())
                .await
                .map_err(|_| Error::Timeout("Close"))??;
        } else {
            self.stream.shutdown().await?;
        }
        Ok(())
    }
}

/// TCP listener for accepting incoming connections
pub struct TcpTransportListener {
    listener: TcpListener,
}

impl TcpTransportListener {
    /// Bind to a local address
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    /// Accept an incoming connection
    pub async fn accept(&self) -> Result<(TcpTransport, SocketAddr)> {
        let (stream, addr) = self.listener.accept().await?;
        Ok((TcpTransport::from_stream(stream), addr))
    }

    /// Get the local address this listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(Into::into)
    }

    /// Close the listener
    ///
    /// Tokio's TcpListener is released on drop, so this only exists to
    /// satisfy [`TransportListener`](crate::transport::TransportListener).
    pub async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl crate::transport::TransportListener for TcpTransportListener {
    type Transport = TcpTransport;

    async fn accept(&self) -> Result<Self::Transport> {
        let (stream, _) = self.listener.accept().await?;
        Ok(TcpTransport::from_stream(stream))
    }

    async fn close(&mut self) -> Result<()> {
        TcpTransportListener::close(self).await
    }
}

/// Builder for configuring TCP transport
pub struct TcpTransportBuilder {
    address: Option<String>,
    connect_timeout: Option<Duration>,
    send_timeout: Option<Duration>,
    receive_timeout: Option<Duration>,
    buffer_size: usize,
    max_frame_len: usize,
}

impl Default for TcpTransportBuilder {
    fn default() -> Self {
        Self {
            address: None,
            connect_timeout: None,
            send_timeout: None,
            receive_timeout: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

impl TcpTransportBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the address to connect to (`host:port`, resolved on connect)
    pub fn address(mut self, addr: impl Into<String>) -> Self {
        self.address = Some(addr.into());
        self
    }

    /// Set the connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the send timeout
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(timeout);
        self
    }

    /// Set the receive timeout
    pub fn receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = Some(timeout);
        self
    }

    /// Set the capacity of both the read and the write buffer
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Set the largest frame accepted in either direction
    ///
    /// Capped at `u32::MAX`, the largest length the prefix can carry.
    pub fn max_frame_len(mut self, len: usize) -> Self {
        self.max_frame_len = len.min(MAX_FRAME_LEN_LIMIT);
        self
    }

    /// Connect with the configured settings
    pub async fn connect(self) -> Result<TcpTransport> {
        let addr = self
            .address
            .ok_or_else(|| Error::Custom("Address not set".to_string()))?;

        let connect_op = TcpStream::connect(addr.as_str());

        let stream = if let Some(timeout) = self.connect_timeout {
            tokio::time::timeout(timeout, connect_op)
                .await
                .map_err(|_| Error::Timeout("Connect"))??
        } else {
            connect_op.await?
        };
        stream.set_nodelay(true)?;
        tracing::trace!(%addr, buffer_size = self.buffer_size, "tcp transport connected");

        Ok(TcpTransport {
            stream: BufStream::with_capacity(self.buffer_size, self.buffer_size, stream),
            partial: Vec::new(),
            send_timeout: self.send_timeout,
            receive_timeout: self.receive_timeout,
            max_frame_len: self.max_frame_len,
        })
    }
}
