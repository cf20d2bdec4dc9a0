//! In-process storage server for exercising the client end to end.

use std::net::SocketAddr;
use std::sync::Arc;

use tablewire_core::{ClientFrame, Handler, Reply, ServerFrame, PROTOCOL_VERSION};
use tablewire_fabric::codec::BincodeCodec;
use tablewire_fabric::transport::{TcpTransport, TcpTransportListener};
use tablewire_fabric::Channel;
use tokio::sync::oneshot;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::error::Result;

/// A server bound to an ephemeral local port, answering calls with a [`Handler`]
///
/// Each accepted connection is served on its own task. [`stop`](Self::stop)
/// (or dropping the server) ends the accept loop and every connection task.
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(handler: Arc<dyn Handler>) -> Result<Self> {
        let listener = TcpTransportListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let (shutdown, stopped) = oneshot::channel();
        let task = tokio::spawn(accept_loop(listener, handler, stopped));
        info!(%addr, "test server listening");

        Ok(Self {
            addr,
            shutdown: Some(shutdown),
            task,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting, drop every open connection and wait for the loop to exit
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            // The loop may already be gone; nothing to signal then.
            let _ = shutdown.send(());
        }
        if let Err(e) = (&mut self.task).await {
            debug!(error = %e, "test server task ended abnormally");
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn accept_loop(
    listener: TcpTransportListener,
    handler: Arc<dyn Handler>,
    mut stopped: oneshot::Receiver<()>,
) {
    let mut connections = JoinSet::new();
    loop {
        tokio::select! {
            _ = &mut stopped => break,
            accepted = listener.accept() => match accepted {
                Ok((transport, peer)) => {
                    info!(%peer, "accepted connection");
                    let handler = Arc::clone(&handler);
                    connections.spawn(async move {
                        if let Err(e) = serve(transport, handler).await {
                            warn!(%peer, error = %e, "connection dropped");
                        }
                    });
                }
                Err(e) => warn!(error = %e, "accept failed"),
            },
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }
    connections.shutdown().await;
    info!("test server stopped");
}

async fn serve(transport: TcpTransport, handler: Arc<dyn Handler>) -> tablewire_fabric::Result<()> {
    let mut channel = Channel::from_transport(transport, BincodeCodec);

    let reason = match channel.receive::<ClientFrame>().await? {
        ClientFrame::Hello { version } if version == PROTOCOL_VERSION => None,
        ClientFrame::Hello { version } => Some(format!("unsupported protocol version {}", version)),
        ClientFrame::Call(_) => Some("expected hello before the first call".to_string()),
    };
    if let Some(reason) = reason {
        channel.send(&ServerFrame::Rejected { reason }).await?;
        return channel.close().await;
    }
    channel
        .send(&ServerFrame::Welcome {
            version: PROTOCOL_VERSION,
        })
        .await?;

    loop {
        let call = match channel.receive::<ClientFrame>().await {
            Ok(ClientFrame::Call(call)) => call,
            Ok(ClientFrame::Hello { .. }) => {
                return Err(tablewire_fabric::Error::Custom(
                    "hello received on an open session".to_string(),
                ))
            }
            Err(tablewire_fabric::Error::ConnectionClosed) => return Ok(()),
            Err(e) => return Err(e),
        };

        debug!(operation = %call.operation, seq = call.seq, "serving call");
        let outcome = handler.handle(&call.operation, call.args).await;
        let reply = ServerFrame::Reply(Reply {
            seq: call.seq,
            outcome,
        });
        channel.send(&reply).await?;
    }
}
