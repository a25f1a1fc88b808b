//! # Connection
//!
//! Purpose: The single handle command families run against. A connection
//! wraps either a session borrowed from the pool or a direct session opened
//! for this one use; callers do not see the difference.
//!
//! ## Design Principles
//! 1. **Facade Pattern**: One type implements every command family trait on
//!    top of one `exec` primitive.
//! 2. **Idempotent Close**: `close()` may be called any number of times;
//!    `Drop` calls it too, so release happens on every exit path.
//! 3. **No Hidden Retries**: A failed command surfaces as-is.

use tracing::trace;

use crate::commands::RawCommands;
use crate::error::{ClientError, ClientResult};
use crate::pool::PooledSession;
use crate::resp::RespValue;
use crate::session::Session;

enum Handle {
    Pooled(PooledSession),
    Direct(Option<Session>),
}

/// One logical session to the store.
pub struct Connection {
    handle: Handle,
    database: u32,
    client_name: Option<String>,
}

impl Connection {
    pub(crate) fn pooled(session: PooledSession, database: u32, client_name: Option<String>) -> Self {
        Connection {
            handle: Handle::Pooled(session),
            database,
            client_name,
        }
    }

    pub(crate) fn direct(session: Session, database: u32, client_name: Option<String>) -> Self {
        Connection {
            handle: Handle::Direct(Some(session)),
            database,
            client_name,
        }
    }

    /// Database index selected on this connection.
    pub fn database(&self) -> u32 {
        self.database
    }

    pub fn client_name(&self) -> Option<&str> {
        self.client_name.as_deref()
    }

    /// True when the connection came from a pool.
    pub fn is_pooled(&self) -> bool {
        matches!(self.handle, Handle::Pooled(_))
    }

    /// Releases the connection: pooled sessions go back to the pool, direct
    /// sessions are dropped (closing the socket).
    pub fn close(&mut self) {
        match &mut self.handle {
            Handle::Pooled(session) => session.release(),
            Handle::Direct(session) => {
                session.take();
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        match &self.handle {
            Handle::Pooled(session) => session.session().is_none(),
            Handle::Direct(session) => session.is_none(),
        }
    }

    fn session_mut(&mut self) -> ClientResult<&mut Session> {
        let session = match &mut self.handle {
            Handle::Pooled(session) => session.session_mut(),
            Handle::Direct(session) => session.as_mut(),
        };
        session.ok_or(ClientError::Closed)
    }
}

impl RawCommands for Connection {
    fn exec<A: AsRef<[u8]>>(&mut self, args: &[A]) -> ClientResult<RespValue> {
        if let Some(name) = args.first() {
            trace!(command = %String::from_utf8_lossy(name.as_ref()), "exec");
        }
        self.session_mut()?.exec(args)?.into_result()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}
