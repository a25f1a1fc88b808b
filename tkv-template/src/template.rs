//! # Command Template
//!
//! Purpose: Run one command against one connection and turn every failure
//! into an explicit, caller-chosen default.
//!
//! ## Design Principles
//! 1. **Template Method**: `execute` owns acquire / run / release; callers
//!    only supply the command body.
//! 2. **Scoped Release**: The connection is closed explicitly on the normal
//!    path and by `Drop` when the command panics.
//! 3. **Visible Fallbacks**: A defaulted result records why it defaulted, so
//!    "store said nothing" and "store was unreachable" stay distinguishable.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use tkv_client::{ClientError, ClientResult, Connection, ConnectionFactory};

/// Why a result is the caller's default rather than a store reply.
#[derive(Debug)]
pub enum Fallback {
    /// The command ran but produced no result.
    NoResult,
    /// Acquiring the connection or running the command failed.
    Failed(ClientError),
}

/// Outcome of [`Template::execute`].
#[derive(Debug)]
pub enum Executed<T> {
    Value(T),
    Defaulted { value: T, reason: Fallback },
}

impl<T> Executed<T> {
    /// The result, whether it came from the store or from the default.
    pub fn into_value(self) -> T {
        match self {
            Executed::Value(value) | Executed::Defaulted { value, .. } => value,
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Executed::Value(value) | Executed::Defaulted { value, .. } => value,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Executed::Defaulted { .. })
    }

    pub fn fallback(&self) -> Option<&Fallback> {
        match self {
            Executed::Value(_) => None,
            Executed::Defaulted { reason, .. } => Some(reason),
        }
    }

    /// The failure behind a default, if there was one.
    pub fn error(&self) -> Option<&ClientError> {
        match self.fallback() {
            Some(Fallback::Failed(err)) => Some(err),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Executed<U> {
        match self {
            Executed::Value(value) => Executed::Value(f(value)),
            Executed::Defaulted { value, reason } => Executed::Defaulted {
                value: f(value),
                reason,
            },
        }
    }

    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Executed<U>, E> {
        Ok(match self {
            Executed::Value(value) => Executed::Value(f(value)?),
            Executed::Defaulted { value, reason } => Executed::Defaulted {
                value: f(value)?,
                reason,
            },
        })
    }
}

/// Command executor shared by every typed operation.
#[derive(Clone)]
pub struct Template {
    factory: Arc<ConnectionFactory>,
}

impl Template {
    /// Wraps an initialized factory.
    pub fn new(factory: ConnectionFactory) -> Self {
        Template {
            factory: Arc::new(factory),
        }
    }

    pub fn factory(&self) -> &ConnectionFactory {
        &self.factory
    }

    /// Runs `command` on a fresh connection.
    ///
    /// `Ok(Some(v))` yields `Executed::Value(v)`. `Ok(None)` and any error,
    /// including failing to get a connection, yield `default` tagged with the
    /// reason. Errors are logged, never returned.
    pub fn execute<T, F>(&self, command: F, default: T) -> Executed<T>
    where
        F: FnOnce(&mut Connection) -> ClientResult<Option<T>>,
    {
        let mut conn = match self.factory.get_connection() {
            Ok(conn) => conn,
            Err(err) => {
                warn!(error = %err, "could not acquire connection; using default");
                return Executed::Defaulted {
                    value: default,
                    reason: Fallback::Failed(err),
                };
            }
        };

        let outcome = command(&mut conn);
        conn.close();

        match outcome {
            Ok(Some(value)) => Executed::Value(value),
            Ok(None) => Executed::Defaulted {
                value: default,
                reason: Fallback::NoResult,
            },
            Err(err) => {
                warn!(error = %err, "command failed; using default");
                Executed::Defaulted {
                    value: default,
                    reason: Fallback::Failed(err),
                }
            }
        }
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.factory.config();
        f.debug_struct("Template")
            .field("address", &config.address())
            .field("pooled", &self.factory.pool().is_some())
            .finish()
    }
}
