//! # Client Configuration
//!
//! Purpose: Describe where the store lives and how sessions to it are opened
//! and pooled. A configuration is built once at startup and then owned,
//! read-only, by the connection factory.
//!
//! ## Design Principles
//! 1. **Plain Data**: Public fields plus `Default`, so callers use struct
//!    update syntax instead of a builder.
//! 2. **Loadable**: serde support with millisecond timeouts so the same struct
//!    can come from a JSON file or environment-provided document.
//! 3. **One Source of Truth**: Pooled and direct sessions read the same
//!    connection parameters.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Default store port.
pub const DEFAULT_PORT: u16 = 6379;

/// Default connect/read/write timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Connection parameters and pooling policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfiguration {
    /// Store host name or IP address.
    pub host: String,
    /// Store port.
    pub port: u16,
    /// Optional ACL user name, sent with `AUTH` when a password is set.
    pub username: Option<String>,
    /// Optional password; when set every new session issues `AUTH`.
    pub password: Option<String>,
    /// Logical database selected after connecting.
    pub database: u32,
    /// Optional name announced with `CLIENT SETNAME`.
    pub client_name: Option<String>,
    /// Wrap sessions in TLS.
    pub use_tls: bool,
    /// TLS material, used only when `use_tls` is set.
    pub tls: TlsSettings,
    /// Optional TCP connect timeout.
    #[serde(with = "duration_ms")]
    pub connect_timeout: Option<Duration>,
    /// Optional TCP read timeout.
    #[serde(with = "duration_ms")]
    pub read_timeout: Option<Duration>,
    /// Optional TCP write timeout.
    #[serde(with = "duration_ms")]
    pub write_timeout: Option<Duration>,
    /// Borrow sessions from a pool instead of opening one per command.
    pub use_pool: bool,
    /// Pool tuning, used only when `use_pool` is set.
    pub pool: PoolSettings,
}

/// Pool tuning parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Maximum total sessions (idle + in-use).
    pub max_total: usize,
    /// Maximum number of idle sessions to keep.
    pub max_idle: usize,
    /// Wait for a returned session when the pool is at capacity.
    pub block_when_exhausted: bool,
    /// Upper bound for that wait; `None` waits indefinitely.
    #[serde(with = "duration_ms")]
    pub max_wait: Option<Duration>,
    /// Ping idle sessions before handing them out.
    pub test_on_borrow: bool,
}

/// TLS material for encrypted sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsSettings {
    /// PEM bundle of trusted root certificates.
    pub ca_cert_path: Option<PathBuf>,
    /// Name to verify the server certificate against; defaults to `host`.
    pub server_name: Option<String>,
}

impl Default for ClientConfiguration {
    fn default() -> Self {
        ClientConfiguration {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
            database: 0,
            client_name: None,
            use_tls: false,
            tls: TlsSettings::default(),
            connect_timeout: Some(DEFAULT_TIMEOUT),
            read_timeout: Some(DEFAULT_TIMEOUT),
            write_timeout: Some(DEFAULT_TIMEOUT),
            use_pool: true,
            pool: PoolSettings::default(),
        }
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        PoolSettings {
            max_total: 8,
            max_idle: 8,
            block_when_exhausted: true,
            max_wait: None,
            test_on_borrow: false,
        }
    }
}

impl ClientConfiguration {
    /// Configuration for `host:port` with every other field defaulted.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        ClientConfiguration {
            host: host.into(),
            port,
            ..ClientConfiguration::default()
        }
    }

    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> ClientResult<Self> {
        serde_json::from_str(json).map_err(|err| {
            ClientError::Argument(tkv_common::TkvError::invalid(format!(
                "invalid client configuration: {err}"
            )))
        })
    }

    /// `host:port` as used for address resolution.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Name the TLS layer verifies the server certificate against.
    pub fn tls_server_name(&self) -> &str {
        self.tls.server_name.as_deref().unwrap_or(&self.host)
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
