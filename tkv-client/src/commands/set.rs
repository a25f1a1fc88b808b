use super::{reply_bulk, reply_bytes_list, reply_flag, reply_integer, Cmd, RawCommands};
use crate::connection::Connection;
use crate::error::ClientResult;

/// Unordered set commands.
pub trait SetCommands: RawCommands {
    /// Number of members actually added.
    fn sadd<M: AsRef<[u8]>>(&mut self, key: &[u8], members: &[M]) -> ClientResult<i64> {
        reply_integer(Cmd::new(b"SADD").arg(key).args(members).run(self)?)
    }

    fn smembers(&mut self, key: &[u8]) -> ClientResult<Vec<Vec<u8>>> {
        reply_bytes_list(self.exec(&[b"SMEMBERS".as_slice(), key])?)
    }

    fn sismember(&mut self, key: &[u8], member: &[u8]) -> ClientResult<bool> {
        reply_flag(self.exec(&[b"SISMEMBER".as_slice(), key, member])?)
    }

    fn scard(&mut self, key: &[u8]) -> ClientResult<i64> {
        reply_integer(self.exec(&[b"SCARD".as_slice(), key])?)
    }

    fn sunion<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> ClientResult<Vec<Vec<u8>>> {
        reply_bytes_list(Cmd::new(b"SUNION").args(keys).run(self)?)
    }

    fn sunionstore<K: AsRef<[u8]>>(&mut self, destination: &[u8], keys: &[K]) -> ClientResult<i64> {
        reply_integer(Cmd::new(b"SUNIONSTORE").arg(destination).args(keys).run(self)?)
    }

    fn sinter<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> ClientResult<Vec<Vec<u8>>> {
        reply_bytes_list(Cmd::new(b"SINTER").args(keys).run(self)?)
    }

    fn sinterstore<K: AsRef<[u8]>>(&mut self, destination: &[u8], keys: &[K]) -> ClientResult<i64> {
        reply_integer(Cmd::new(b"SINTERSTORE").arg(destination).args(keys).run(self)?)
    }

    fn sdiff<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> ClientResult<Vec<Vec<u8>>> {
        reply_bytes_list(Cmd::new(b"SDIFF").args(keys).run(self)?)
    }

    fn sdiffstore<K: AsRef<[u8]>>(&mut self, destination: &[u8], keys: &[K]) -> ClientResult<i64> {
        reply_integer(Cmd::new(b"SDIFFSTORE").arg(destination).args(keys).run(self)?)
    }

    fn smove(&mut self, source: &[u8], destination: &[u8], member: &[u8]) -> ClientResult<bool> {
        reply_flag(self.exec(&[b"SMOVE".as_slice(), source, destination, member])?)
    }

    /// Removes and returns up to `count` random members.
    fn spop(&mut self, key: &[u8], count: i64) -> ClientResult<Vec<Vec<u8>>> {
        reply_bytes_list(Cmd::new(b"SPOP").arg(key).int(count).run(self)?)
    }

    fn srandmember(&mut self, key: &[u8]) -> ClientResult<Option<Vec<u8>>> {
        reply_bulk(self.exec(&[b"SRANDMEMBER".as_slice(), key])?)
    }

    /// Negative `count` allows repeated members.
    fn srandmember_count(&mut self, key: &[u8], count: i64) -> ClientResult<Vec<Vec<u8>>> {
        reply_bytes_list(Cmd::new(b"SRANDMEMBER").arg(key).int(count).run(self)?)
    }

    fn srem<M: AsRef<[u8]>>(&mut self, key: &[u8], members: &[M]) -> ClientResult<i64> {
        reply_integer(Cmd::new(b"SREM").arg(key).args(members).run(self)?)
    }
}

impl SetCommands for Connection {}
