use tkv_common::convert::parse_f64;

use super::{
    reply_bulk, reply_bulk_list, reply_bytes_list, reply_flag, reply_integer, reply_status, Cmd,
    RawCommands,
};
use crate::connection::Connection;
use crate::error::{ClientError, ClientResult};

/// Hash (field map) commands.
pub trait HashCommands: RawCommands {
    /// True when the field is new.
    fn hset(&mut self, key: &[u8], field: &[u8], value: &[u8]) -> ClientResult<bool> {
        reply_flag(self.exec(&[b"HSET".as_slice(), key, field, value])?)
    }

    fn hsetnx(&mut self, key: &[u8], field: &[u8], value: &[u8]) -> ClientResult<bool> {
        reply_flag(self.exec(&[b"HSETNX".as_slice(), key, field, value])?)
    }

    fn hmset<F: AsRef<[u8]>, V: AsRef<[u8]>>(&mut self, key: &[u8], entries: &[(F, V)]) -> ClientResult<()> {
        let mut cmd = Cmd::new(b"HMSET").arg(key);
        for (field, value) in entries {
            cmd = cmd.arg(field).arg(value);
        }
        reply_status(cmd.run(self)?)
    }

    fn hget(&mut self, key: &[u8], field: &[u8]) -> ClientResult<Option<Vec<u8>>> {
        reply_bulk(self.exec(&[b"HGET".as_slice(), key, field])?)
    }

    fn hmget<F: AsRef<[u8]>>(&mut self, key: &[u8], fields: &[F]) -> ClientResult<Vec<Option<Vec<u8>>>> {
        reply_bulk_list(Cmd::new(b"HMGET").arg(key).args(fields).run(self)?)
    }

    fn hincr_by(&mut self, key: &[u8], field: &[u8], delta: i64) -> ClientResult<i64> {
        reply_integer(Cmd::new(b"HINCRBY").arg(key).arg(field).int(delta).run(self)?)
    }

    fn hincr_by_float(&mut self, key: &[u8], field: &[u8], delta: f64) -> ClientResult<f64> {
        let cmd = Cmd::new(b"HINCRBYFLOAT").arg(key).arg(field).float(delta)?;
        reply_bulk(cmd.run(self)?)?
            .as_deref()
            .and_then(parse_f64)
            .ok_or(ClientError::UnexpectedResponse)
    }

    fn hexists(&mut self, key: &[u8], field: &[u8]) -> ClientResult<bool> {
        reply_flag(self.exec(&[b"HEXISTS".as_slice(), key, field])?)
    }

    fn hdel<F: AsRef<[u8]>>(&mut self, key: &[u8], fields: &[F]) -> ClientResult<i64> {
        reply_integer(Cmd::new(b"HDEL").arg(key).args(fields).run(self)?)
    }

    fn hlen(&mut self, key: &[u8]) -> ClientResult<i64> {
        reply_integer(self.exec(&[b"HLEN".as_slice(), key])?)
    }

    fn hstrlen(&mut self, key: &[u8], field: &[u8]) -> ClientResult<i64> {
        reply_integer(self.exec(&[b"HSTRLEN".as_slice(), key, field])?)
    }

    fn hkeys(&mut self, key: &[u8]) -> ClientResult<Vec<Vec<u8>>> {
        reply_bytes_list(self.exec(&[b"HKEYS".as_slice(), key])?)
    }

    fn hvals(&mut self, key: &[u8]) -> ClientResult<Vec<Vec<u8>>> {
        reply_bytes_list(self.exec(&[b"HVALS".as_slice(), key])?)
    }

    /// Field/value pairs in reply order.
    fn hgetall(&mut self, key: &[u8]) -> ClientResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let flat = reply_bytes_list(self.exec(&[b"HGETALL".as_slice(), key])?)?;
        if flat.len() % 2 != 0 {
            return Err(ClientError::UnexpectedResponse);
        }
        let mut pairs = Vec::with_capacity(flat.len() / 2);
        let mut items = flat.into_iter();
        while let (Some(field), Some(value)) = (items.next(), items.next()) {
            pairs.push((field, value));
        }
        Ok(pairs)
    }
}

impl HashCommands for Connection {}
