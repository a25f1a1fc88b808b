//! # Session Pool
//!
//! Purpose: Reuse store sessions across commands to avoid repeated TCP
//! handshakes, with a bounded size and a configurable wait policy.
//!
//! ## Design Principles
//! 1. **Object Pool Pattern**: Keep a bounded set of reusable sessions.
//! 2. **Minimal Locking**: Hold the mutex only while moving idle sessions or
//!    adjusting counters; connecting happens outside the lock.
//! 3. **Explicit Wait Policy**: Exhaustion either fails fast or waits on a
//!    condition variable, optionally bounded by `max_wait`.
//! 4. **Single Owner**: A borrowed session lives in exactly one
//!    `PooledSession` until it is returned or discarded.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::config::{ClientConfiguration, PoolSettings};
use crate::error::{ClientError, ClientResult};
use crate::session::Session;

struct PoolState {
    idle: VecDeque<Session>,
    total: usize,
    closed: bool,
}

struct PoolInner {
    config: ClientConfiguration,
    state: Mutex<PoolState>,
    available: Condvar,
}

impl PoolInner {
    fn settings(&self) -> &PoolSettings {
        &self.config.pool
    }

    fn release_slot(&self) {
        let mut state = self.state.lock();
        state.total = state.total.saturating_sub(1);
        drop(state);
        self.available.notify_one();
    }

    fn return_session(&self, session: Session) {
        let mut state = self.state.lock();
        if !state.closed && state.idle.len() < self.settings().max_idle {
            state.idle.push_back(session);
        } else {
            state.total = state.total.saturating_sub(1);
        }
        drop(state);
        self.available.notify_one();
    }
}

/// Outcome of one pass over the pool state.
enum Checkout {
    Idle(Session),
    Reserved,
}

/// Session pool handle.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl ConnectionPool {
    /// Creates an empty pool; sessions are opened lazily on first borrow.
    pub fn new(config: ClientConfiguration) -> ClientResult<Self> {
        if config.pool.max_total == 0 {
            return Err(ClientError::Argument(tkv_common::TkvError::invalid(
                "pool max_total must be at least 1",
            )));
        }
        debug!(
            address = %config.address(),
            max_total = config.pool.max_total,
            max_idle = config.pool.max_idle,
            "creating connection pool"
        );
        let state = PoolState {
            idle: VecDeque::with_capacity(config.pool.max_idle),
            total: 0,
            closed: false,
        };
        Ok(ConnectionPool {
            inner: Arc::new(PoolInner {
                config,
                state: Mutex::new(state),
                available: Condvar::new(),
            }),
        })
    }

    /// Borrows a session, waiting per the pool's policy when exhausted.
    ///
    /// `max_wait` bounds the whole call, including retries after idle
    /// sessions fail `test_on_borrow`.
    pub fn acquire(&self) -> ClientResult<PooledSession> {
        let deadline = self.inner.settings().max_wait.map(|wait| Instant::now() + wait);
        loop {
            match self.checkout(deadline)? {
                Checkout::Idle(mut session) => {
                    if self.inner.settings().test_on_borrow && !session.ping() {
                        debug!("discarding idle session that failed validation");
                        self.inner.release_slot();
                        continue;
                    }
                    return Ok(PooledSession::new(self.inner.clone(), session));
                }
                Checkout::Reserved => {
                    return match Session::connect(&self.inner.config) {
                        Ok(session) => Ok(PooledSession::new(self.inner.clone(), session)),
                        Err(err) => {
                            self.inner.release_slot();
                            Err(err)
                        }
                    };
                }
            }
        }
    }

    fn checkout(&self, deadline: Option<Instant>) -> ClientResult<Checkout> {
        let settings = self.inner.settings();
        let mut state = self.inner.state.lock();
        loop {
            if state.closed {
                return Err(ClientError::Closed);
            }
            if let Some(session) = state.idle.pop_front() {
                return Ok(Checkout::Idle(session));
            }
            if state.total < settings.max_total {
                state.total += 1;
                return Ok(Checkout::Reserved);
            }
            if !settings.block_when_exhausted {
                return Err(ClientError::PoolExhausted);
            }
            match deadline {
                Some(deadline) => {
                    if self.inner.available.wait_until(&mut state, deadline).timed_out() {
                        return Err(ClientError::PoolTimeout);
                    }
                }
                None => self.inner.available.wait(&mut state),
            }
        }
    }

    /// Number of sessions sitting idle.
    pub fn idle_count(&self) -> usize {
        self.inner.state.lock().idle.len()
    }

    /// Number of sessions owned by the pool, idle or borrowed.
    pub fn total_count(&self) -> usize {
        self.inner.state.lock().total
    }

    /// Drops idle sessions and refuses further borrows. Borrowed sessions
    /// are discarded when they come back.
    pub fn close(&self) {
        let mut state = self.inner.state.lock();
        state.closed = true;
        let dropped = state.idle.len();
        state.total = state.total.saturating_sub(dropped);
        state.idle.clear();
        drop(state);
        self.inner.available.notify_all();
        debug!(dropped, "connection pool closed");
    }
}

/// RAII wrapper returning a session to the pool on drop.
pub struct PooledSession {
    pool: Arc<PoolInner>,
    session: Option<Session>,
}

impl PooledSession {
    fn new(pool: Arc<PoolInner>, session: Session) -> Self {
        PooledSession {
            pool,
            session: Some(session),
        }
    }

    /// The borrowed session, or `None` once released.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /// Returns the session to the pool now; later calls are no-ops.
    pub fn release(&mut self) {
        let session = match self.session.take() {
            Some(session) => session,
            None => return,
        };
        // A broken session must not be handed to the next borrower.
        if session.is_broken() {
            self.pool.release_slot();
        } else {
            self.pool.return_session(session);
        }
    }
}

impl Drop for PooledSession {
    fn drop(&mut self) {
        self.release();
    }
}
