//! # Connection Factory
//!
//! Purpose: Hand out `Connection`s according to a `ClientConfiguration`,
//! either borrowed from a pool or opened directly.
//!
//! ## Design Principles
//! 1. **Strategy by Configuration**: `use_pool` picks pooled or direct
//!    sessions; both share the same connect parameters.
//! 2. **Explicit Lifecycle**: `init()` builds the pool, `shutdown()` tears it
//!    down. Asking for a pooled connection before `init()` is an error, not a
//!    lazy initialization.
//! 3. **No Retries**: Connect failures propagate to the caller unchanged.

use tracing::debug;

use crate::config::ClientConfiguration;
use crate::connection::Connection;
use crate::error::{ClientError, ClientResult};
use crate::pool::ConnectionPool;
use crate::session::Session;

/// Produces connections to the store.
pub struct ConnectionFactory {
    config: ClientConfiguration,
    pool: Option<ConnectionPool>,
}

impl ConnectionFactory {
    /// Creates an uninitialized factory that owns `config`.
    pub fn new(config: ClientConfiguration) -> Self {
        ConnectionFactory { config, pool: None }
    }

    /// Builds the pool when pooling is configured. Calling it again keeps the
    /// existing pool.
    pub fn init(&mut self) -> ClientResult<()> {
        if self.config.use_pool && self.pool.is_none() {
            self.pool = Some(ConnectionPool::new(self.config.clone())?);
        }
        debug!(
            address = %self.config.address(),
            pooled = self.config.use_pool,
            "connection factory initialized"
        );
        Ok(())
    }

    pub fn config(&self) -> &ClientConfiguration {
        &self.config
    }

    /// The pool, when pooling is configured and `init()` has run.
    pub fn pool(&self) -> Option<&ConnectionPool> {
        self.pool.as_ref()
    }

    /// Returns a connection the caller owns and must close (or drop).
    pub fn get_connection(&self) -> ClientResult<Connection> {
        let database = self.config.database;
        let client_name = self.config.client_name.clone();
        if self.config.use_pool {
            let pool = self.pool.as_ref().ok_or(ClientError::NotInitialized)?;
            return Ok(Connection::pooled(pool.acquire()?, database, client_name));
        }
        let session = Session::connect(&self.config)?;
        Ok(Connection::direct(session, database, client_name))
    }

    /// Closes the pool, if any. Pooled requests then fail with
    /// `NotInitialized` until `init()` runs again. Connections still borrowed
    /// keep working and are discarded when they come back.
    pub fn shutdown(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close();
        }
    }
}
