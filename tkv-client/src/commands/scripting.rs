use tkv_common::ReturnType;

use super::{reply_array, reply_bulk, reply_status, Cmd, RawCommands};
use crate::connection::Connection;
use crate::error::{ClientError, ClientResult};
use crate::resp::RespValue;

/// Script reply shaped by the requested [`ReturnType`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptOutput {
    Boolean(bool),
    Integer(i64),
    Multi(Vec<RespValue>),
    Status(String),
    Value(Option<Vec<u8>>),
}

impl ScriptOutput {
    /// Shapes `reply` as `return_type`.
    pub fn from_reply(return_type: ReturnType, reply: RespValue) -> ClientResult<Self> {
        let output = match (return_type, reply) {
            (ReturnType::Boolean, RespValue::Integer(value)) => ScriptOutput::Boolean(value == 1),
            // Lua `false` comes back as a null bulk.
            (ReturnType::Boolean, RespValue::Bulk(None)) => ScriptOutput::Boolean(false),
            (ReturnType::Integer, RespValue::Integer(value)) => ScriptOutput::Integer(value),
            (ReturnType::Multi, reply) => ScriptOutput::Multi(reply_array(reply)?),
            (ReturnType::Status, RespValue::Simple(text)) => {
                ScriptOutput::Status(String::from_utf8_lossy(&text).into_owned())
            }
            (ReturnType::Value, RespValue::Integer(value)) => {
                ScriptOutput::Value(Some(value.to_string().into_bytes()))
            }
            (ReturnType::Value, RespValue::Simple(text)) => ScriptOutput::Value(Some(text)),
            (ReturnType::Value, reply) => ScriptOutput::Value(reply_bulk(reply)?),
            _ => return Err(ClientError::UnexpectedResponse),
        };
        Ok(output)
    }
}

/// Server-side Lua scripting.
pub trait ScriptingCommands: RawCommands {
    /// `keys_and_args` holds the `num_keys` keys first, then the arguments.
    fn eval<A: AsRef<[u8]>>(
        &mut self,
        script: &[u8],
        return_type: ReturnType,
        num_keys: usize,
        keys_and_args: &[A],
    ) -> ClientResult<ScriptOutput> {
        if num_keys > keys_and_args.len() {
            return Err(tkv_common::TkvError::invalid("num_keys exceeds the supplied keys").into());
        }
        let cmd = Cmd::new(b"EVAL")
            .arg(script)
            .int(num_keys as i64)
            .args(keys_and_args);
        ScriptOutput::from_reply(return_type, cmd.run(self)?)
    }

    fn eval_sha<A: AsRef<[u8]>>(
        &mut self,
        sha: &str,
        return_type: ReturnType,
        num_keys: usize,
        keys_and_args: &[A],
    ) -> ClientResult<ScriptOutput> {
        if num_keys > keys_and_args.len() {
            return Err(tkv_common::TkvError::invalid("num_keys exceeds the supplied keys").into());
        }
        let cmd = Cmd::new(b"EVALSHA")
            .arg(sha)
            .int(num_keys as i64)
            .args(keys_and_args);
        ScriptOutput::from_reply(return_type, cmd.run(self)?)
    }

    fn script_flush(&mut self) -> ClientResult<()> {
        reply_status(self.exec(&[b"SCRIPT".as_slice(), b"FLUSH"])?)
    }

    fn script_kill(&mut self) -> ClientResult<()> {
        reply_status(self.exec(&[b"SCRIPT".as_slice(), b"KILL"])?)
    }

    /// Caches `script` and returns its SHA1 digest.
    fn script_load(&mut self, script: &[u8]) -> ClientResult<String> {
        let sha = reply_bulk(self.exec(&[b"SCRIPT".as_slice(), b"LOAD", script])?)?
            .ok_or(ClientError::UnexpectedResponse)?;
        String::from_utf8(sha).map_err(|_| ClientError::UnexpectedResponse)
    }

    fn script_exists(&mut self, shas: &[&str]) -> ClientResult<Vec<bool>> {
        let cmd = Cmd::new(b"SCRIPT").arg(b"EXISTS").args(shas);
        reply_array(cmd.run(self)?)?
            .into_iter()
            .map(|item| match item {
                RespValue::Integer(flag) => Ok(flag == 1),
                _ => Err(ClientError::UnexpectedResponse),
            })
            .collect()
    }
}

impl ScriptingCommands for Connection {}
