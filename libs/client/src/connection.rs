use std::future::Future;
use std::pin::Pin;

use tablewire_core::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::factory::ConnectionFactory;
use crate::session::Session;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A [`Session`] that can be shared between tasks
///
/// Every call takes the session's lock for the full round-trip, so calls
/// from concurrent tasks reach the server strictly one after another. The
/// lock is the only place a call waits besides the round-trip itself; a
/// caller that needs a bounded wait wraps the call in its own timeout.
/// Abandoning a call that way does not disturb the calls after it: its
/// reply is discarded when it arrives.
///
/// # Lifecycle
///
/// `Open → (Locked ⇄ Open) → Closed`. [`close`](Self::close) waits for the
/// call in flight to finish; every call after it fails with
/// [`Error::Closed`] without touching the network.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tablewire_client::{ClientConfig, Connection, ConnectionFactory};
///
/// # async fn example() -> tablewire_client::Result<()> {
/// let factory = ConnectionFactory::new("127.0.0.1:9090", ClientConfig::default());
/// let conn = Arc::new(Connection::connect(&factory).await?);
///
/// let enabled = conn.is_table_enabled(b"users".to_vec()).await?;
/// conn.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct Connection {
    session: Mutex<Option<Session>>,
    peer: String,
}

impl Connection {
    /// Take exclusive ownership of an open session
    pub fn new(session: Session) -> Self {
        Self {
            peer: session.peer().to_string(),
            session: Mutex::new(Some(session)),
        }
    }

    /// Open a session with `factory` and wrap it
    pub async fn connect(factory: &ConnectionFactory) -> Result<Self> {
        let session = factory.connect().await?;
        Ok(Self::new(session))
    }

    /// Address of the server this connection talks to
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Whether the connection is closed; waits for the call in flight, if any
    pub async fn is_closed(&self) -> bool {
        self.session.lock().await.is_none()
    }

    /// Run `f` against the session while holding its lock
    ///
    /// This is how every typed operation is called:
    ///
    /// ```no_run
    /// # async fn example(conn: &tablewire_client::Connection) -> tablewire_client::Result<()> {
    /// let enabled = conn
    ///     .call(|session| Box::pin(session.is_table_enabled(b"users".to_vec())))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn call<T, F>(&self, f: F) -> Result<T>
    where
        F: for<'s> FnOnce(&'s mut Session) -> BoxFuture<'s, Result<T>> + Send,
    {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(Error::Closed)?;
        f(session).await
    }

    /// Call an operation by its wire name with marshaled arguments
    ///
    /// On success the values match the operation's declared results in
    /// number and order.
    pub async fn invoke(&self, operation: &str, args: Vec<Value>) -> Result<Vec<Value>> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(Error::Closed)?;
        session.invoke(operation, args).await
    }

    /// Close the session once the call in flight, if any, has finished
    pub async fn close(&self) -> Result<()> {
        let session = self.session.lock().await.take().ok_or(Error::Closed)?;
        debug!(peer = %self.peer, "closing connection");
        session.close().await
    }

    /// Replace the session with a freshly opened one to the same address
    ///
    /// If the new session cannot be opened the connection ends up closed.
    pub async fn recycle(&self) -> Result<()> {
        let mut guard = self.session.lock().await;
        let session = guard.take().ok_or(Error::Closed)?;
        debug!(peer = %self.peer, "recycling connection");
        *guard = Some(session.reopen().await?);
        Ok(())
    }
}

macro_rules! connection_methods {
    ($($(#[$meta:meta])* fn $fn:ident = $name:literal ($($arg:ident : $ty:ty),*) -> $ret:ty;)*) => {
        impl Connection {
            $(
                $(#[$meta])*
                pub async fn $fn(&self, $($arg: $ty),*) -> Result<$ret> {
                    self.call(move |session| Box::pin(session.$fn($($arg),*))).await
                }
            )*
        }
    };
}

tablewire_core::for_each_operation!(connection_methods);
