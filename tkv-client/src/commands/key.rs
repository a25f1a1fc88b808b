use tkv_common::{DataType, KeyTtl};

use super::{
    reply_bulk, reply_bytes_list, reply_flag, reply_integer, reply_status, Cmd, RawCommands,
};
use crate::connection::Connection;
use crate::error::{ClientError, ClientResult};
use crate::resp::RespValue;

/// Generic key commands.
pub trait KeyCommands: RawCommands {
    /// Keys matching a glob-style `pattern`.
    fn keys(&mut self, pattern: &[u8]) -> ClientResult<Vec<Vec<u8>>> {
        reply_bytes_list(self.exec(&[b"KEYS".as_slice(), pattern])?)
    }

    /// Number of the given keys that exist.
    fn exists<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> ClientResult<i64> {
        reply_integer(Cmd::new(b"EXISTS").args(keys).run(self)?)
    }

    /// Number of keys removed.
    fn del<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> ClientResult<i64> {
        reply_integer(Cmd::new(b"DEL").args(keys).run(self)?)
    }

    /// Like `del`, with the memory reclaimed in the background.
    fn unlink<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> ClientResult<i64> {
        reply_integer(Cmd::new(b"UNLINK").args(keys).run(self)?)
    }

    fn key_type(&mut self, key: &[u8]) -> ClientResult<DataType> {
        match self.exec(&[b"TYPE".as_slice(), key])? {
            RespValue::Simple(name) => {
                let name = String::from_utf8_lossy(&name);
                Ok(name.parse::<DataType>()?)
            }
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    fn expire(&mut self, key: &[u8], seconds: i64) -> ClientResult<bool> {
        reply_flag(Cmd::new(b"EXPIRE").arg(key).int(seconds).run(self)?)
    }

    /// `timestamp` is a Unix time in seconds.
    fn expire_at(&mut self, key: &[u8], timestamp: i64) -> ClientResult<bool> {
        reply_flag(Cmd::new(b"EXPIREAT").arg(key).int(timestamp).run(self)?)
    }

    fn p_expire(&mut self, key: &[u8], millis: i64) -> ClientResult<bool> {
        reply_flag(Cmd::new(b"PEXPIRE").arg(key).int(millis).run(self)?)
    }

    /// `timestamp` is a Unix time in milliseconds.
    fn p_expire_at(&mut self, key: &[u8], timestamp: i64) -> ClientResult<bool> {
        reply_flag(Cmd::new(b"PEXPIREAT").arg(key).int(timestamp).run(self)?)
    }

    /// Remaining time to live in seconds (`-2` missing, `-1` no expiry).
    fn ttl(&mut self, key: &[u8]) -> ClientResult<i64> {
        reply_integer(self.exec(&[b"TTL".as_slice(), key])?)
    }

    /// Remaining time to live in milliseconds (`-2` missing, `-1` no expiry).
    fn p_ttl(&mut self, key: &[u8]) -> ClientResult<i64> {
        reply_integer(self.exec(&[b"PTTL".as_slice(), key])?)
    }

    /// `ttl` decoded into a [`KeyTtl`].
    fn ttl_state(&mut self, key: &[u8]) -> ClientResult<KeyTtl> {
        KeyTtl::from_seconds(self.ttl(key)?).ok_or(ClientError::UnexpectedResponse)
    }

    /// `p_ttl` decoded into a [`KeyTtl`].
    fn p_ttl_state(&mut self, key: &[u8]) -> ClientResult<KeyTtl> {
        KeyTtl::from_millis(self.p_ttl(key)?).ok_or(ClientError::UnexpectedResponse)
    }

    /// A random key, or `None` when the database is empty.
    fn random_key(&mut self) -> ClientResult<Option<Vec<u8>>> {
        reply_bulk(self.exec(&[b"RANDOMKEY"])?)
    }

    /// Removes the expiry; false when the key had none or does not exist.
    fn persist(&mut self, key: &[u8]) -> ClientResult<bool> {
        reply_flag(self.exec(&[b"PERSIST".as_slice(), key])?)
    }

    fn flush_db(&mut self) -> ClientResult<()> {
        reply_status(self.exec(&[b"FLUSHDB"])?)
    }
}

impl KeyCommands for Connection {}
