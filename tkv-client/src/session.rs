//! # Store Session
//!
//! Purpose: Own one TCP (optionally TLS) session to the store, run the
//! connect-time handshake, and execute single commands over it.
//!
//! ## Design Principles
//! 1. **Buffer Reuse**: Each session keeps its own read/write buffers.
//! 2. **Handshake Once**: `AUTH`, `SELECT` and `CLIENT SETNAME` run at connect
//!    time so pooled sessions are ready to use when borrowed.
//! 3. **Poison on Failure**: An I/O or protocol error marks the session
//!    broken; the pool then discards it instead of recycling it.

use std::io::{self, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use tracing::debug;

use tkv_common::convert::encode_i64;

use crate::config::ClientConfiguration;
use crate::error::{ClientError, ClientResult};
use crate::resp::{encode_command, read_response, RespValue};

/// Byte stream under a session.
enum Transport {
    Plain(TcpStream),
    #[cfg(feature = "tls")]
    Tls(Box<rustls::StreamOwned<rustls::ClientConnection, TcpStream>>),
}

impl Read for Transport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Transport::Plain(stream) => stream.read(buf),
            #[cfg(feature = "tls")]
            Transport::Tls(stream) => stream.read(buf),
        }
    }
}

impl Write for Transport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Transport::Plain(stream) => stream.write(buf),
            #[cfg(feature = "tls")]
            Transport::Tls(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Transport::Plain(stream) => stream.flush(),
            #[cfg(feature = "tls")]
            Transport::Tls(stream) => stream.flush(),
        }
    }
}

/// Single store session with reusable buffers.
pub struct Session {
    // Buffered reader reduces syscalls while still allowing direct writes.
    reader: BufReader<Transport>,
    line_buf: Vec<u8>,
    write_buf: Vec<u8>,
    broken: bool,
}

impl Session {
    /// Opens a session and performs the handshake described by `config`.
    pub fn connect(config: &ClientConfiguration) -> ClientResult<Self> {
        let stream = connect_stream(config)?;
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;
        // Disable Nagle to keep request latency low for small payloads.
        stream.set_nodelay(true)?;

        let transport = wrap_transport(stream, config)?;
        let mut session = Session {
            reader: BufReader::new(transport),
            line_buf: Vec::with_capacity(128),
            write_buf: Vec::with_capacity(256),
            broken: false,
        };
        session.handshake(config)?;
        debug!(address = %config.address(), db = config.database, "session established");
        Ok(session)
    }

    fn handshake(&mut self, config: &ClientConfiguration) -> ClientResult<()> {
        if let Some(password) = &config.password {
            let reply = match &config.username {
                Some(user) => self.exec(&[b"AUTH".as_slice(), user.as_bytes(), password.as_bytes()])?,
                None => self.exec(&[b"AUTH".as_slice(), password.as_bytes()])?,
            };
            expect_ok(reply)?;
        }
        if config.database != 0 {
            let db = encode_i64(i64::from(config.database));
            expect_ok(self.exec(&[b"SELECT".as_slice(), db.as_slice()])?)?;
        }
        if let Some(name) = &config.client_name {
            expect_ok(self.exec(&[b"CLIENT".as_slice(), b"SETNAME", name.as_bytes()])?)?;
        }
        Ok(())
    }

    /// Executes one command and returns the raw reply.
    ///
    /// Error replies are returned as `RespValue::Error`; only transport and
    /// framing failures are `Err`, and those mark the session broken.
    pub fn exec<A: AsRef<[u8]>>(&mut self, args: &[A]) -> ClientResult<RespValue> {
        if self.broken {
            return Err(ClientError::Closed);
        }
        let result = self.round_trip(args);
        if result.is_err() {
            self.broken = true;
        }
        result
    }

    fn round_trip<A: AsRef<[u8]>>(&mut self, args: &[A]) -> ClientResult<RespValue> {
        self.write_buf.clear();
        encode_command(args, &mut self.write_buf);

        let stream = self.reader.get_mut();
        stream.write_all(&self.write_buf)?;
        stream.flush()?;

        read_response(&mut self.reader, &mut self.line_buf)
    }

    /// True when `PING` gets its `PONG`.
    pub fn ping(&mut self) -> bool {
        matches!(self.exec(&[b"PING"]), Ok(RespValue::Simple(ref text)) if text == b"PONG")
    }

    /// True once an I/O or protocol failure has been observed.
    pub fn is_broken(&self) -> bool {
        self.broken
    }
}

fn expect_ok(reply: RespValue) -> ClientResult<()> {
    match reply.into_result()? {
        RespValue::Simple(_) => Ok(()),
        _ => Err(ClientError::UnexpectedResponse),
    }
}

fn connect_stream(config: &ClientConfiguration) -> ClientResult<TcpStream> {
    let addr: SocketAddr = (config.host.as_str(), config.port)
        .to_socket_addrs()
        .map_err(|_| ClientError::InvalidAddress)?
        .next()
        .ok_or(ClientError::InvalidAddress)?;
    let stream = match config.connect_timeout {
        Some(timeout) => TcpStream::connect_timeout(&addr, timeout)?,
        None => TcpStream::connect(addr)?,
    };
    Ok(stream)
}

#[cfg(not(feature = "tls"))]
fn wrap_transport(stream: TcpStream, config: &ClientConfiguration) -> ClientResult<Transport> {
    if config.use_tls {
        return Err(ClientError::Tls(
            "TLS requested but the `tls` feature is disabled".to_string(),
        ));
    }
    Ok(Transport::Plain(stream))
}

#[cfg(feature = "tls")]
fn wrap_transport(stream: TcpStream, config: &ClientConfiguration) -> ClientResult<Transport> {
    use std::sync::Arc;

    use rustls::pki_types::ServerName;

    if !config.use_tls {
        return Ok(Transport::Plain(stream));
    }

    let mut roots = rustls::RootCertStore::empty();
    if let Some(path) = &config.tls.ca_cert_path {
        let file = std::fs::File::open(path)?;
        let mut reader = io::BufReader::new(file);
        for cert in rustls_pemfile::certs(&mut reader) {
            roots
                .add(cert?)
                .map_err(|err| ClientError::Tls(err.to_string()))?;
        }
    }

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let tls_config = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|err| ClientError::Tls(err.to_string()))?
        .with_root_certificates(roots)
        .with_no_client_auth();

    let server_name = ServerName::try_from(config.tls_server_name().to_string())
        .map_err(|err| ClientError::Tls(err.to_string()))?;
    let conn = rustls::ClientConnection::new(Arc::new(tls_config), server_name)
        .map_err(|err| ClientError::Tls(err.to_string()))?;
    Ok(Transport::Tls(Box::new(rustls::StreamOwned::new(conn, stream))))
}
