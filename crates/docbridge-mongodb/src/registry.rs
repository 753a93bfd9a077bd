//! Process-wide connection registry
//!
//! The registry lazily creates one [`Connection`] on first access and hands out
//! clones of it for the life of the process. Concurrent first callers wait on a
//! single initialization; a failed initialization is not cached, so the next
//! call tries again.
//!
//! Code that owns its startup sequence should prefer building a
//! [`Connection`] explicitly and passing it to models.

use docbridge_common::Result;
use std::future::Future;
use tokio::sync::OnceCell;
use tracing::info;

use crate::{Connection, ConnectionConfig};

/// A value initialized at most once, retrying after failed attempts
#[derive(Debug)]
pub struct Registry<T> {
    cell: OnceCell<T>,
}

impl<T> Registry<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// Return the stored value, running `init` if there is none yet
    pub async fn get_or_try_init<F, Fut>(&self, init: F) -> Result<&T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.cell.get_or_try_init(init).await
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

static INSTANCE: Registry<Connection> = Registry::new();

/// Access point for the shared [`Connection`]
pub struct ConnectionRegistry;

impl ConnectionRegistry {
    /// Return the shared connection, creating it from the environment on first use
    ///
    /// See [`ConnectionConfig::from_env`] for the variables consulted.
    pub async fn get_instance() -> Result<Connection> {
        Self::get_or_connect(ConnectionConfig::from_env).await
    }

    /// Return the shared connection, creating it from `config` on first use
    ///
    /// `config` is only evaluated when no connection exists yet.
    pub async fn get_or_connect<F>(config: F) -> Result<Connection>
    where
        F: FnOnce() -> Result<ConnectionConfig>,
    {
        let connection = INSTANCE
            .get_or_try_init(|| async move {
                let config = config()?;
                info!(uri_scheme = scheme(&config.uri), "Initializing shared MongoDB connection");
                Connection::connect(config).await
            })
            .await?;
        Ok(connection.clone())
    }

    pub fn is_initialized() -> bool {
        INSTANCE.is_initialized()
    }
}

fn scheme(uri: &str) -> &str {
    uri.split("://").next().unwrap_or("")
}
