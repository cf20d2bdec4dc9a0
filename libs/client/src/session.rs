use tablewire_core::{
    Call, ClientFrame, Marshal, OperationDescriptor, Outcome, Returns, ServerFrame, Value,
};
use tablewire_fabric::codec::BincodeCodec;
use tablewire_fabric::{Channel, Error as FabricError};
use tracing::debug;

use crate::error::{Error, Result};
use crate::factory::ConnectionFactory;

/// One open session with the storage server
///
/// A session runs one call at a time; every method takes `&mut self`. Wrap
/// it in a [`Connection`](crate::Connection) to share it between tasks.
///
/// A call abandoned after its request went out, by a receive timeout or by
/// dropping its future, leaves a reply behind. The next call reads and
/// discards it before its own. A call abandoned while its request was still
/// being written, or a reply stream that no longer lines up with the calls
/// sent, leaves the session [`Desynchronized`](Error::Desynchronized) until
/// it is recycled.
pub struct Session {
    channel: Channel<BincodeCodec>,
    factory: ConnectionFactory,
    next_seq: u32,
    /// Calls whose request was sent and whose reply has not been read
    unanswered: u32,
    /// Set while a request is being written; still set means the stream is lost
    desynchronized: bool,
}

impl Session {
    pub(crate) fn new(channel: Channel<BincodeCodec>, factory: ConnectionFactory) -> Self {
        Self {
            channel,
            factory,
            next_seq: 0,
            unanswered: 0,
            desynchronized: false,
        }
    }

    /// Address this session was opened to
    pub fn peer(&self) -> &str {
        self.factory.addr()
    }

    /// Call an operation by name with already marshaled arguments
    ///
    /// The name and the arguments are checked against the operation catalog
    /// before anything is sent, and the reply against the operation's
    /// declared results.
    pub async fn invoke(&mut self, operation: &str, args: Vec<Value>) -> Result<Vec<Value>> {
        let descriptor = OperationDescriptor::lookup(operation)
            .ok_or_else(|| Error::UnknownOperation(operation.to_string()))?;
        descriptor
            .check_args(&args)
            .map_err(|shape| Error::arguments(operation, shape))?;

        if self.desynchronized {
            return Err(Error::Desynchronized);
        }

        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        debug!(operation, seq, peer = %self.factory.addr(), "calling");

        let call = ClientFrame::Call(Call {
            seq,
            operation: operation.to_string(),
            args,
        });
        self.desynchronized = true;
        match self.channel.send(&call).await {
            Ok(()) => {}
            // Rejected before any byte was written
            Err(e @ (FabricError::Codec(_) | FabricError::InvalidFrame(_))) => {
                self.desynchronized = false;
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        }
        self.desynchronized = false;
        self.unanswered += 1;

        let reply = self.await_reply(operation, seq).await?;
        let values = reply?;
        descriptor
            .check_results(&values)
            .map_err(|shape| Error::results(operation, shape))?;
        Ok(values)
    }

    /// Read replies until the one answering `seq`, dropping those left by abandoned calls
    async fn await_reply(&mut self, operation: &str, seq: u32) -> Result<Outcome> {
        loop {
            let frame = match self.channel.receive::<ServerFrame>().await {
                Ok(frame) => frame,
                Err(e) if e.is_timeout() => return Err(e.into()),
                Err(e) => {
                    self.desynchronized = true;
                    return Err(e.into());
                }
            };

            let expected = self.next_seq.wrapping_sub(self.unanswered);
            let reply = match frame {
                ServerFrame::Reply(reply) if reply.seq == expected => reply,
                ServerFrame::Reply(reply) => {
                    self.desynchronized = true;
                    return Err(Error::Protocol(format!(
                        "reply sequence {} does not match call {}",
                        reply.seq, expected
                    )));
                }
                other => {
                    self.desynchronized = true;
                    return Err(Error::Protocol(format!(
                        "expected a reply to `{}`, got {:?}",
                        operation, other
                    )));
                }
            };
            self.unanswered -= 1;

            if reply.seq == seq {
                return Ok(reply.outcome);
            }
            debug!(seq = reply.seq, "discarding reply to an abandoned call");
        }
    }

    /// Shut the session's transport down
    pub async fn close(self) -> Result<()> {
        debug!(peer = %self.factory.addr(), "closing session");
        self.channel.close().await?;
        Ok(())
    }

    /// Close this session and open a fresh one to the same address
    pub(crate) async fn reopen(self) -> Result<Session> {
        let factory = self.factory.clone();
        if let Err(e) = self.close().await {
            debug!(peer = %factory.addr(), error = %e, "closing stale session");
        }
        factory.connect().await
    }
}

macro_rules! session_methods {
    ($($(#[$meta:meta])* fn $fn:ident = $name:literal ($($arg:ident : $ty:ty),*) -> $ret:ty;)*) => {
        impl Session {
            $(
                $(#[$meta])*
                pub async fn $fn(&mut self, $($arg: $ty),*) -> Result<$ret> {
                    let values = self.invoke($name, vec![$(Marshal::into_value($arg)),*]).await?;
                    <$ret as Returns>::from_values(values).map_err(|shape| Error::results($name, shape))
                }
            )*
        }
    };
}

tablewire_core::for_each_operation!(session_methods);
