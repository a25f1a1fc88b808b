use std::fmt::Display;

use tkv_client::KeyCommands;
use tkv_common::{DataType, KeyTtl};

use crate::template::{Executed, Template};

/// Key-level commands shared by every typed family. Implementors only say
/// how to reach the template and how to namespace a key.
///
/// Key encoding cannot fail, so these return `Executed` directly.
pub trait KeyOperations<K: Display> {
    fn executor(&self) -> &Template;

    fn key_bytes(&self, key: &K) -> Vec<u8>;

    fn exists(&self, key: &K) -> Executed<bool> {
        let raw = self.key_bytes(key);
        self.executor()
            .execute(|conn| Ok(Some(conn.exists(&[raw])? > 0)), false)
    }

    /// True when the key existed and was removed.
    fn del(&self, key: &K) -> Executed<bool> {
        let raw = self.key_bytes(key);
        self.executor()
            .execute(|conn| Ok(Some(conn.del(&[raw])? > 0)), false)
    }

    fn expire(&self, key: &K, seconds: i64) -> Executed<bool> {
        let raw = self.key_bytes(key);
        self.executor()
            .execute(|conn| conn.expire(&raw, seconds).map(Some), false)
    }

    /// `timestamp` is a Unix time in seconds.
    fn expire_at(&self, key: &K, timestamp: i64) -> Executed<bool> {
        let raw = self.key_bytes(key);
        self.executor()
            .execute(|conn| conn.expire_at(&raw, timestamp).map(Some), false)
    }

    fn p_expire(&self, key: &K, millis: i64) -> Executed<bool> {
        let raw = self.key_bytes(key);
        self.executor()
            .execute(|conn| conn.p_expire(&raw, millis).map(Some), false)
    }

    /// `timestamp` is a Unix time in milliseconds.
    fn p_expire_at(&self, key: &K, timestamp: i64) -> Executed<bool> {
        let raw = self.key_bytes(key);
        self.executor()
            .execute(|conn| conn.p_expire_at(&raw, timestamp).map(Some), false)
    }

    /// Defaults to `KeyTtl::Missing` when the store cannot be asked.
    fn ttl(&self, key: &K) -> Executed<KeyTtl> {
        let raw = self.key_bytes(key);
        self.executor()
            .execute(|conn| conn.ttl_state(&raw).map(Some), KeyTtl::Missing)
    }

    fn p_ttl(&self, key: &K) -> Executed<KeyTtl> {
        let raw = self.key_bytes(key);
        self.executor()
            .execute(|conn| conn.p_ttl_state(&raw).map(Some), KeyTtl::Missing)
    }

    /// A random key of the whole database, prefix included. An empty
    /// database defaults to `None`.
    fn random_key(&self) -> Executed<Option<String>> {
        self.executor().execute(
            |conn| {
                let key = conn.random_key()?;
                Ok(key.map(|raw| Some(String::from_utf8_lossy(&raw).into_owned())))
            },
            None,
        )
    }

    fn persist(&self, key: &K) -> Executed<bool> {
        let raw = self.key_bytes(key);
        self.executor()
            .execute(|conn| conn.persist(&raw).map(Some), false)
    }

    fn key_type(&self, key: &K) -> Executed<DataType> {
        let raw = self.key_bytes(key);
        self.executor()
            .execute(|conn| conn.key_type(&raw).map(Some), DataType::None)
    }
}
