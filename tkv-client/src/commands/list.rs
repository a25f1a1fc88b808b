use super::{reply_bulk, reply_bytes_list, reply_integer, reply_status, Cmd, RawCommands};
use crate::connection::Connection;
use crate::error::ClientResult;

/// Where `LINSERT` places the new element relative to the pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPosition {
    Before,
    After,
}

impl ListPosition {
    const fn token(self) -> &'static [u8] {
        match self {
            ListPosition::Before => b"BEFORE",
            ListPosition::After => b"AFTER",
        }
    }
}

/// List commands.
pub trait ListCommands: RawCommands {
    /// Appends values; returns the new length.
    fn rpush<V: AsRef<[u8]>>(&mut self, key: &[u8], values: &[V]) -> ClientResult<i64> {
        reply_integer(Cmd::new(b"RPUSH").arg(key).args(values).run(self)?)
    }

    /// Appends only when the list exists; returns the length (0 if missing).
    fn rpushx(&mut self, key: &[u8], value: &[u8]) -> ClientResult<i64> {
        reply_integer(self.exec(&[b"RPUSHX".as_slice(), key, value])?)
    }

    fn lpush<V: AsRef<[u8]>>(&mut self, key: &[u8], values: &[V]) -> ClientResult<i64> {
        reply_integer(Cmd::new(b"LPUSH").arg(key).args(values).run(self)?)
    }

    fn lpushx(&mut self, key: &[u8], value: &[u8]) -> ClientResult<i64> {
        reply_integer(self.exec(&[b"LPUSHX".as_slice(), key, value])?)
    }

    fn lpop(&mut self, key: &[u8]) -> ClientResult<Option<Vec<u8>>> {
        reply_bulk(self.exec(&[b"LPOP".as_slice(), key])?)
    }

    fn rpop(&mut self, key: &[u8]) -> ClientResult<Option<Vec<u8>>> {
        reply_bulk(self.exec(&[b"RPOP".as_slice(), key])?)
    }

    fn rpoplpush(&mut self, source: &[u8], destination: &[u8]) -> ClientResult<Option<Vec<u8>>> {
        reply_bulk(self.exec(&[b"RPOPLPUSH".as_slice(), source, destination])?)
    }

    /// Blocking pop. Returns `[key, value]`, or an empty vector on timeout.
    /// The session read timeout must exceed `timeout_secs`.
    fn blpop<K: AsRef<[u8]>>(&mut self, timeout_secs: i64, keys: &[K]) -> ClientResult<Vec<Vec<u8>>> {
        reply_bytes_list(Cmd::new(b"BLPOP").args(keys).int(timeout_secs).run(self)?)
    }

    fn brpop<K: AsRef<[u8]>>(&mut self, timeout_secs: i64, keys: &[K]) -> ClientResult<Vec<Vec<u8>>> {
        reply_bytes_list(Cmd::new(b"BRPOP").args(keys).int(timeout_secs).run(self)?)
    }

    fn brpoplpush(
        &mut self,
        timeout_secs: i64,
        source: &[u8],
        destination: &[u8],
    ) -> ClientResult<Option<Vec<u8>>> {
        let cmd = Cmd::new(b"BRPOPLPUSH")
            .arg(source)
            .arg(destination)
            .int(timeout_secs);
        reply_bulk(cmd.run(self)?)
    }

    fn lindex(&mut self, key: &[u8], index: i64) -> ClientResult<Option<Vec<u8>>> {
        reply_bulk(Cmd::new(b"LINDEX").arg(key).int(index).run(self)?)
    }

    /// Returns the new length, `-1` when the pivot is missing, `0` when the
    /// list is missing.
    fn linsert(
        &mut self,
        key: &[u8],
        position: ListPosition,
        pivot: &[u8],
        value: &[u8],
    ) -> ClientResult<i64> {
        reply_integer(self.exec(&[b"LINSERT".as_slice(), key, position.token(), pivot, value])?)
    }

    fn llen(&mut self, key: &[u8]) -> ClientResult<i64> {
        reply_integer(self.exec(&[b"LLEN".as_slice(), key])?)
    }

    fn lrange(&mut self, key: &[u8], start: i64, end: i64) -> ClientResult<Vec<Vec<u8>>> {
        reply_bytes_list(Cmd::new(b"LRANGE").arg(key).int(start).int(end).run(self)?)
    }

    fn lrem(&mut self, key: &[u8], count: i64, value: &[u8]) -> ClientResult<i64> {
        reply_integer(Cmd::new(b"LREM").arg(key).int(count).arg(value).run(self)?)
    }

    fn lset(&mut self, key: &[u8], index: i64, value: &[u8]) -> ClientResult<()> {
        reply_status(Cmd::new(b"LSET").arg(key).int(index).arg(value).run(self)?)
    }

    fn ltrim(&mut self, key: &[u8], start: i64, end: i64) -> ClientResult<()> {
        reply_status(Cmd::new(b"LTRIM").arg(key).int(start).int(end).run(self)?)
    }
}

impl ListCommands for Connection {}
