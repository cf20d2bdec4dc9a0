use std::time::Duration;

use serde::{Deserialize, Serialize};
use tablewire_fabric::transport::{TcpTransportBuilder, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_FRAME_LEN};

/// Connection settings applied by [`ConnectionFactory`](crate::ConnectionFactory)
///
/// # Default Configuration
///
/// - `connect_timeout_ms`: 30000
/// - `io_timeout_ms`: 30000 (each send and each receive; `0` disables it)
/// - `buffer_size`: 8192
/// - `max_frame_len`: 100MB
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Maximum time to establish the TCP connection, in milliseconds
    pub connect_timeout_ms: u64,
    /// Maximum time for a single send or receive, in milliseconds
    pub io_timeout_ms: u64,
    /// Capacity of the read buffer and of the write buffer
    pub buffer_size: usize,
    /// Largest frame accepted in either direction
    pub max_frame_len: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 30_000,
            io_timeout_ms: 30_000,
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

impl ClientConfig {
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = millis_rounded_up(timeout);
        self
    }

    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout_ms = millis_rounded_up(timeout);
        self
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    pub fn with_max_frame_len(mut self, len: usize) -> Self {
        self.max_frame_len = len;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn io_timeout(&self) -> Option<Duration> {
        (self.io_timeout_ms > 0).then(|| Duration::from_millis(self.io_timeout_ms))
    }

    /// Transport builder for `addr` carrying these settings
    pub(crate) fn transport(&self, addr: &str) -> TcpTransportBuilder {
        let mut builder = TcpTransportBuilder::new()
            .address(addr)
            .connect_timeout(self.connect_timeout())
            .buffer_size(self.buffer_size)
            .max_frame_len(self.max_frame_len);
        if let Some(timeout) = self.io_timeout() {
            builder = builder.send_timeout(timeout).receive_timeout(timeout);
        }
        builder
    }
}

/// Whole milliseconds, rounded up so a nonzero timeout never becomes `0`
fn millis_rounded_up(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ClientConfig::default();
        assert_eq!(config.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.io_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.buffer_size, 8192);
    }

    #[test]
    fn zero_io_timeout_disables_it() {
        let config = ClientConfig::default().with_io_timeout(Duration::ZERO);
        assert_eq!(config.io_timeout(), None);
    }

    #[test]
    fn sub_millisecond_timeouts_round_up() {
        let config = ClientConfig::default()
            .with_io_timeout(Duration::from_micros(300))
            .with_connect_timeout(Duration::from_micros(1500));
        assert_eq!(config.io_timeout(), Some(Duration::from_millis(1)));
        assert_eq!(config.connect_timeout(), Duration::from_millis(2));
    }
}
