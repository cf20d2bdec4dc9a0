use tablewire_core::{ClientFrame, ServerFrame, PROTOCOL_VERSION};
use tablewire_fabric::codec::BincodeCodec;
use tablewire_fabric::Channel;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::session::Session;

/// Opens sessions to one fixed storage server address
#[derive(Debug, Clone)]
pub struct ConnectionFactory {
    addr: String,
    config: ClientConfig,
}

impl ConnectionFactory {
    pub fn new(addr: impl Into<String>, config: ClientConfig) -> Self {
        Self {
            addr: addr.into(),
            config,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Connect, negotiate the protocol version and return the open session
    ///
    /// Either a fully negotiated session is returned or nothing: a socket
    /// opened before a failed handshake is shut down again.
    pub async fn connect(&self) -> Result<Session> {
        let builder = self.config.transport(&self.addr);
        let mut channel = Channel::tcp(builder, BincodeCodec)
            .await
            .map_err(|source| Error::Connect {
                addr: self.addr.clone(),
                source,
            })?;

        match handshake(&mut channel).await {
            Ok(version) => {
                debug!(addr = %self.addr, version, "session opened");
                Ok(Session::new(channel, self.clone()))
            }
            Err(reason) => {
                warn!(addr = %self.addr, %reason, "handshake failed");
                if let Err(e) = channel.close().await {
                    debug!(addr = %self.addr, error = %e, "shutdown after failed handshake");
                }
                Err(Error::Handshake {
                    addr: self.addr.clone(),
                    reason,
                })
            }
        }
    }
}

async fn handshake(channel: &mut Channel<BincodeCodec>) -> std::result::Result<u16, String> {
    let hello = ClientFrame::Hello {
        version: PROTOCOL_VERSION,
    };
    let frame: ServerFrame = channel.request(&hello).await.map_err(|e| e.to_string())?;

    match frame {
        ServerFrame::Welcome { version } if version == PROTOCOL_VERSION => Ok(version),
        ServerFrame::Welcome { version } => Err(format!(
            "server speaks protocol version {}, client speaks {}",
            version, PROTOCOL_VERSION
        )),
        ServerFrame::Rejected { reason } => Err(reason),
        ServerFrame::Reply(_) => Err("unexpected reply during handshake".to_string()),
    }
}
