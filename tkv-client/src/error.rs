//! # Client Errors
//!
//! Everything that can go wrong between acquiring a connection and reading
//! a reply. The typed layer above turns these into fallback values.

use thiserror::Error;

use tkv_common::TkvError;

/// Result type for the sync client.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the sync client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or IO failure while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// RESP2 framing or parse error.
    #[error("protocol error")]
    Protocol,

    /// Server returned an error reply.
    #[error("server error: {}", String::from_utf8_lossy(.message))]
    Server { message: Vec<u8> },

    /// Response type did not match the expected command response.
    #[error("unexpected response")]
    UnexpectedResponse,

    /// Pool is at capacity and the wait policy does not allow blocking.
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Pool stayed at capacity for the whole configured wait.
    #[error("timed out waiting for a pooled connection")]
    PoolTimeout,

    /// Address could not be resolved into a socket address.
    #[error("invalid address")]
    InvalidAddress,

    /// The factory is configured for pooling but `init()` was not called.
    #[error("connection factory not initialized")]
    NotInitialized,

    /// The connection was already closed.
    #[error("connection closed")]
    Closed,

    /// TLS setup or handshake failure.
    #[error("tls error: {0}")]
    Tls(String),

    /// Command arguments violated a contract before any I/O.
    #[error(transparent)]
    Argument(#[from] TkvError),
}

impl ClientError {
    /// True when the session can no longer be trusted for further commands.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ClientError::Io(_) | ClientError::Protocol | ClientError::Tls(_)
        )
    }
}
