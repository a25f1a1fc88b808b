use tkv_common::convert::parse_f64;
use tkv_common::{Expiration, SetOption};

use super::{reply_bulk, reply_bulk_list, reply_flag, reply_integer, reply_ok, Cmd, RawCommands};
use crate::connection::Connection;
use crate::error::{ClientError, ClientResult};

/// String (plain value) commands.
pub trait StringCommands: RawCommands {
    fn get(&mut self, key: &[u8]) -> ClientResult<Option<Vec<u8>>> {
        reply_bulk(self.exec(&[b"GET".as_slice(), key])?)
    }

    /// Sets `value` and returns the previous one.
    fn get_set(&mut self, key: &[u8], value: &[u8]) -> ClientResult<Option<Vec<u8>>> {
        reply_bulk(self.exec(&[b"GETSET".as_slice(), key, value])?)
    }

    /// Values in key order; missing keys map to `None`.
    fn m_get<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> ClientResult<Vec<Option<Vec<u8>>>> {
        reply_bulk_list(Cmd::new(b"MGET").args(keys).run(self)?)
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> ClientResult<bool> {
        reply_ok(self.exec(&[b"SET".as_slice(), key, value])?)
    }

    /// `SET` with optional expiry and `NX`/`XX`. Returns false when the
    /// condition prevented the write.
    fn set_with(
        &mut self,
        key: &[u8],
        value: &[u8],
        expiration: Expiration,
        option: SetOption,
    ) -> ClientResult<bool> {
        let mut cmd = Cmd::new(b"SET").arg(key).arg(value);
        expiration.push_args(cmd.args_mut());
        if let Some(token) = option.token() {
            cmd = cmd.arg(token);
        }
        reply_ok(cmd.run(self)?)
    }

    fn setnx(&mut self, key: &[u8], value: &[u8]) -> ClientResult<bool> {
        reply_flag(self.exec(&[b"SETNX".as_slice(), key, value])?)
    }

    fn setex(&mut self, key: &[u8], seconds: i64, value: &[u8]) -> ClientResult<bool> {
        reply_ok(Cmd::new(b"SETEX").arg(key).int(seconds).arg(value).run(self)?)
    }

    fn psetex(&mut self, key: &[u8], millis: i64, value: &[u8]) -> ClientResult<bool> {
        reply_ok(Cmd::new(b"PSETEX").arg(key).int(millis).arg(value).run(self)?)
    }

    fn m_set<K: AsRef<[u8]>, V: AsRef<[u8]>>(&mut self, pairs: &[(K, V)]) -> ClientResult<bool> {
        let mut cmd = Cmd::new(b"MSET");
        for (key, value) in pairs {
            cmd = cmd.arg(key).arg(value);
        }
        reply_ok(cmd.run(self)?)
    }

    /// All-or-nothing: true only when none of the keys existed.
    fn m_set_nx<K: AsRef<[u8]>, V: AsRef<[u8]>>(&mut self, pairs: &[(K, V)]) -> ClientResult<bool> {
        let mut cmd = Cmd::new(b"MSETNX");
        for (key, value) in pairs {
            cmd = cmd.arg(key).arg(value);
        }
        reply_flag(cmd.run(self)?)
    }

    fn incr(&mut self, key: &[u8]) -> ClientResult<i64> {
        reply_integer(self.exec(&[b"INCR".as_slice(), key])?)
    }

    fn incr_by(&mut self, key: &[u8], delta: i64) -> ClientResult<i64> {
        reply_integer(Cmd::new(b"INCRBY").arg(key).int(delta).run(self)?)
    }

    fn incr_by_float(&mut self, key: &[u8], delta: f64) -> ClientResult<f64> {
        let reply = reply_bulk(Cmd::new(b"INCRBYFLOAT").arg(key).float(delta)?.run(self)?)?;
        reply
            .as_deref()
            .and_then(parse_f64)
            .ok_or(ClientError::UnexpectedResponse)
    }

    fn decr(&mut self, key: &[u8]) -> ClientResult<i64> {
        reply_integer(self.exec(&[b"DECR".as_slice(), key])?)
    }

    fn decr_by(&mut self, key: &[u8], delta: i64) -> ClientResult<i64> {
        reply_integer(Cmd::new(b"DECRBY").arg(key).int(delta).run(self)?)
    }

    /// Length of the value after appending.
    fn append(&mut self, key: &[u8], value: &[u8]) -> ClientResult<i64> {
        reply_integer(self.exec(&[b"APPEND".as_slice(), key, value])?)
    }

    /// Substring between inclusive offsets; negative offsets count from the end.
    fn get_range(&mut self, key: &[u8], start: i64, end: i64) -> ClientResult<Vec<u8>> {
        let reply = reply_bulk(Cmd::new(b"GETRANGE").arg(key).int(start).int(end).run(self)?)?;
        Ok(reply.unwrap_or_default())
    }

    /// Overwrites part of the value at `offset`; returns the new length.
    fn set_range(&mut self, key: &[u8], value: &[u8], offset: i64) -> ClientResult<i64> {
        reply_integer(Cmd::new(b"SETRANGE").arg(key).int(offset).arg(value).run(self)?)
    }

    fn strlen(&mut self, key: &[u8]) -> ClientResult<i64> {
        reply_integer(self.exec(&[b"STRLEN".as_slice(), key])?)
    }
}

impl StringCommands for Connection {}
