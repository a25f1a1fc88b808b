//! # String Operations
//!
//! Purpose: Typed get/set/counter calls over plain store values.
//!
//! Every call follows the same three steps: encode the key (and value),
//! execute with an explicit default, decode the reply. Encoding problems are
//! returned as `Err` before any I/O; store problems come back as
//! `Executed::Defaulted`.

use std::fmt::{self, Display};
use std::time::Duration;

use tkv_client::StringCommands;
use tkv_common::{Expiration, SetOption};

use crate::error::{check_score, OpResult};
use crate::key_ops::KeyOperations;
use crate::operation::Operation;
use crate::serializer::{Serializer, TypedJsonSerializer};
use crate::template::{Executed, Fallback, Template};

/// Typed operations on string values under one key prefix.
pub struct StringOperation<K, V, S = TypedJsonSerializer> {
    base: Operation<K, V, S>,
}

impl<K, V, S> StringOperation<K, V, S>
where
    K: Display,
    V: 'static,
    S: Serializer<V>,
{
    pub fn new(prefix: impl Into<String>, template: Template) -> Self
    where
        S: Default,
    {
        Self::with_serializer(prefix, template, S::default())
    }

    pub fn with_serializer(prefix: impl Into<String>, template: Template, serializer: S) -> Self {
        StringOperation {
            base: Operation::new(prefix, template, serializer),
        }
    }

    pub fn base(&self) -> &Operation<K, V, S> {
        &self.base
    }

    pub fn prefix(&self) -> &str {
        self.base.prefix()
    }

    /// The value at `key`; missing keys default to `None`.
    pub fn get(&self, key: &K) -> OpResult<Executed<Option<V>>> {
        let raw_key = self.base.raw_key(key);
        let executed = self
            .base
            .template()
            .execute(|conn| Ok(conn.get(&raw_key)?.map(Some)), None);
        Ok(executed.try_map(|raw| self.base.decode_optional(raw))?)
    }

    /// Stores `value` and returns the previous value.
    pub fn get_set(&self, key: &K, value: &V) -> OpResult<Executed<Option<V>>> {
        let raw_key = self.base.raw_key(key);
        let raw_value = self.base.raw_value(value)?;
        let executed = self
            .base
            .template()
            .execute(|conn| Ok(conn.get_set(&raw_key, &raw_value)?.map(Some)), None);
        Ok(executed.try_map(|raw| self.base.decode_optional(raw))?)
    }

    /// Values in key order, `None` for missing keys. No keys, no I/O.
    pub fn m_get(&self, keys: &[K]) -> OpResult<Executed<Vec<Option<V>>>> {
        if keys.is_empty() {
            return Ok(Executed::Value(Vec::new()));
        }
        let raw_keys = self.base.raw_keys(keys);
        let executed = self
            .base
            .template()
            .execute(|conn| conn.m_get(&raw_keys).map(Some), Vec::new());
        Ok(executed.try_map(|raw| {
            raw.into_iter()
                .map(|value| self.base.decode_optional(value))
                .collect::<Result<Vec<_>, _>>()
        })?)
    }

    pub fn set(&self, key: &K, value: &V) -> OpResult<Executed<bool>> {
        let raw_key = self.base.raw_key(key);
        let raw_value = self.base.raw_value(value)?;
        Ok(self
            .base
            .template()
            .execute(|conn| conn.set(&raw_key, &raw_value).map(Some), false))
    }

    /// `SET` with explicit expiration and condition.
    pub fn set_with(
        &self,
        key: &K,
        value: &V,
        expiration: Expiration,
        option: SetOption,
    ) -> OpResult<Executed<bool>> {
        let raw_key = self.base.raw_key(key);
        let raw_value = self.base.raw_value(value)?;
        Ok(self.base.template().execute(
            |conn| {
                conn.set_with(&raw_key, &raw_value, expiration, option)
                    .map(Some)
            },
            false,
        ))
    }

    /// Stores `value` expiring after `timeout`.
    pub fn set_timeout(&self, key: &K, value: &V, timeout: Duration) -> OpResult<Executed<bool>> {
        self.set_with(key, value, Expiration::from_duration(timeout), SetOption::None)
    }

    pub fn set_if_absent(&self, key: &K, value: &V) -> OpResult<Executed<bool>> {
        let raw_key = self.base.raw_key(key);
        let raw_value = self.base.raw_value(value)?;
        Ok(self
            .base
            .template()
            .execute(|conn| conn.setnx(&raw_key, &raw_value).map(Some), false))
    }

    pub fn set_if_absent_timeout(&self, key: &K, value: &V, timeout: Duration) -> OpResult<Executed<bool>> {
        self.set_with(key, value, Expiration::from_duration(timeout), SetOption::IfAbsent)
    }

    pub fn set_if_present(&self, key: &K, value: &V) -> OpResult<Executed<bool>> {
        self.set_with(key, value, Expiration::persistent(), SetOption::IfPresent)
    }

    pub fn set_if_present_timeout(&self, key: &K, value: &V, timeout: Duration) -> OpResult<Executed<bool>> {
        self.set_with(key, value, Expiration::from_duration(timeout), SetOption::IfPresent)
    }

    pub fn set_ex(&self, key: &K, seconds: i64, value: &V) -> OpResult<Executed<bool>> {
        let raw_key = self.base.raw_key(key);
        let raw_value = self.base.raw_value(value)?;
        Ok(self
            .base
            .template()
            .execute(|conn| conn.setex(&raw_key, seconds, &raw_value).map(Some), false))
    }

    pub fn p_set_ex(&self, key: &K, millis: i64, value: &V) -> OpResult<Executed<bool>> {
        let raw_key = self.base.raw_key(key);
        let raw_value = self.base.raw_value(value)?;
        Ok(self
            .base
            .template()
            .execute(|conn| conn.psetex(&raw_key, millis, &raw_value).map(Some), false))
    }

    /// Writes every pair at once. An empty batch is not sent and defaults
    /// to `false`.
    pub fn m_set(&self, entries: &[(K, V)]) -> OpResult<Executed<bool>> {
        let Some(pairs) = self.raw_pairs(entries)? else {
            return Ok(nothing_sent(false));
        };
        Ok(self
            .base
            .template()
            .execute(|conn| conn.m_set(&pairs).map(Some), false))
    }

    /// Writes every pair only if none of the keys exist.
    pub fn m_set_if_absent(&self, entries: &[(K, V)]) -> OpResult<Executed<bool>> {
        let Some(pairs) = self.raw_pairs(entries)? else {
            return Ok(nothing_sent(false));
        };
        Ok(self
            .base
            .template()
            .execute(|conn| conn.m_set_nx(&pairs).map(Some), false))
    }

    fn raw_pairs(&self, entries: &[(K, V)]) -> OpResult<Option<Vec<(Vec<u8>, Vec<u8>)>>> {
        if entries.is_empty() {
            return Ok(None);
        }
        let mut pairs = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            pairs.push((self.base.raw_key(key), self.base.raw_value(value)?));
        }
        Ok(Some(pairs))
    }

    /// Counter calls default to `0`.
    pub fn incr(&self, key: &K) -> Executed<i64> {
        let raw_key = self.base.raw_key(key);
        self.base
            .template()
            .execute(|conn| conn.incr(&raw_key).map(Some), 0)
    }

    pub fn incr_by(&self, key: &K, delta: i64) -> Executed<i64> {
        let raw_key = self.base.raw_key(key);
        self.base
            .template()
            .execute(|conn| conn.incr_by(&raw_key, delta).map(Some), 0)
    }

    /// A NaN `delta` is an `Err` before any I/O. An infinite one is refused
    /// by the store and defaults to `0.0`.
    pub fn incr_by_float(&self, key: &K, delta: f64) -> OpResult<Executed<f64>> {
        check_score(delta)?;
        let raw_key = self.base.raw_key(key);
        Ok(self
            .base
            .template()
            .execute(|conn| conn.incr_by_float(&raw_key, delta).map(Some), 0.0))
    }

    pub fn decr(&self, key: &K) -> Executed<i64> {
        let raw_key = self.base.raw_key(key);
        self.base
            .template()
            .execute(|conn| conn.decr(&raw_key).map(Some), 0)
    }

    pub fn decr_by(&self, key: &K, delta: i64) -> Executed<i64> {
        let raw_key = self.base.raw_key(key);
        self.base
            .template()
            .execute(|conn| conn.decr_by(&raw_key, delta).map(Some), 0)
    }

    /// Appends the encoded `value`; returns the new length, `-1` on failure.
    pub fn append(&self, key: &K, value: &V) -> OpResult<Executed<i64>> {
        let raw_key = self.base.raw_key(key);
        let raw_value = self.base.raw_value(value)?;
        Ok(self
            .base
            .template()
            .execute(|conn| conn.append(&raw_key, &raw_value).map(Some), -1))
    }

    /// Substring of the stored bytes as UTF-8 text (lossy), `""` on failure.
    pub fn get_range(&self, key: &K, start: i64, end: i64) -> Executed<String> {
        let raw_key = self.base.raw_key(key);
        self.base.template().execute(
            |conn| {
                let raw = conn.get_range(&raw_key, start, end)?;
                Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
            },
            String::new(),
        )
    }

    /// Overwrites bytes from `offset`; returns the new length, `-1` on failure.
    pub fn set_range(&self, key: &K, value: &V, offset: i64) -> OpResult<Executed<i64>> {
        let raw_key = self.base.raw_key(key);
        let raw_value = self.base.raw_value(value)?;
        Ok(self
            .base
            .template()
            .execute(|conn| conn.set_range(&raw_key, &raw_value, offset).map(Some), -1))
    }

    /// Length of the stored bytes, `-1` on failure.
    pub fn str_len(&self, key: &K) -> Executed<i64> {
        let raw_key = self.base.raw_key(key);
        self.base
            .template()
            .execute(|conn| conn.strlen(&raw_key).map(Some), -1)
    }
}

fn nothing_sent<T>(value: T) -> Executed<T> {
    Executed::Defaulted {
        value,
        reason: Fallback::NoResult,
    }
}

impl<K, V, S> KeyOperations<K> for StringOperation<K, V, S>
where
    K: Display,
    V: 'static,
    S: Serializer<V>,
{
    fn executor(&self) -> &Template {
        self.base.template()
    }

    fn key_bytes(&self, key: &K) -> Vec<u8> {
        self.base.raw_key(key)
    }
}

impl<K, V, S: Clone> Clone for StringOperation<K, V, S> {
    fn clone(&self) -> Self {
        StringOperation {
            base: self.base.clone(),
        }
    }
}

impl<K, V, S> fmt::Debug for StringOperation<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StringOperation").field(&self.base).finish()
    }
}
