//! Tablewire Client - concurrency-safe access to a remote table store
//!
//! A [`ConnectionFactory`] opens one [`Session`] to a fixed address. A
//! session runs one call at a time; [`Connection`] wraps it so any number of
//! tasks can share it, serializing their calls on the session's lock.
//!
//! Every remote operation is available three ways, all backed by the same
//! checks against the operation catalog:
//!
//! - a typed method, e.g. [`Connection::is_table_enabled`];
//! - [`Connection::call`], running any typed session method under the lock;
//! - [`Connection::invoke`], by wire name with [`Value`](tablewire_core::Value) arguments.
//!
//! # Example
//!
//! ```no_run
//! use tablewire_client::{ClientConfig, Connection, ConnectionFactory};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let factory = ConnectionFactory::new("127.0.0.1:9090", ClientConfig::default());
//! let conn = Connection::connect(&factory).await?;
//!
//! if conn.is_table_enabled(b"existTable".to_vec()).await? {
//!     let names = conn.get_table_names().await?;
//!     println!("{} tables", names.len());
//! }
//!
//! conn.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod factory;
pub mod server;
pub mod session;
pub mod stub;

pub use config::ClientConfig;
pub use connection::{BoxFuture, Connection};
pub use error::{Error, ErrorKind, Result};
pub use factory::ConnectionFactory;
pub use server::TestServer;
pub use session::Session;
pub use stub::StubService;
