#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tkv_client::ClientConfiguration;

/// Accepts one connection and feeds its first `expected_commands` commands to
/// `handler` together with their index.
pub fn spawn_server<F>(expected_commands: usize, handler: F) -> SocketAddr
where
    F: Fn(usize, Vec<Vec<u8>>, &mut TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        for idx in 0..expected_commands {
            let args = read_command(&mut reader).expect("read command");
            handler(idx, args, &mut stream);
        }
        // Keep the socket open until the client hangs up.
        let mut rest = Vec::new();
        let _ = reader.read_to_end(&mut rest);
    });

    addr
}

/// Accepts any number of connections, answering every command with
/// `handler`. The returned counter tracks accepted connections.
pub fn spawn_accepting_server<F>(handler: F) -> (SocketAddr, Arc<AtomicUsize>)
where
    F: Fn(Vec<Vec<u8>>, &mut TcpStream) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let accepted = Arc::new(AtomicUsize::new(0));
    let handler = Arc::new(handler);

    let counter = accepted.clone();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            counter.fetch_add(1, Ordering::SeqCst);
            let handler = handler.clone();
            thread::spawn(move || {
                let mut reader = BufReader::new(stream.try_clone().expect("clone"));
                while let Ok(args) = read_command(&mut reader) {
                    handler(args, &mut stream);
                }
            });
        }
    });

    (addr, accepted)
}

pub fn config_for(addr: SocketAddr) -> ClientConfiguration {
    let mut config = ClientConfiguration::new(addr.ip().to_string(), addr.port());
    config.read_timeout = Some(Duration::from_secs(1));
    config.write_timeout = Some(Duration::from_secs(1));
    config.connect_timeout = Some(Duration::from_secs(1));
    config
}

pub fn read_command(reader: &mut BufReader<TcpStream>) -> std::io::Result<Vec<Vec<u8>>> {
    let mut line = Vec::new();
    read_line(reader, &mut line)?.ok_or_else(|| std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"))?;
    if line.first() != Some(&b'*') {
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "expected array"));
    }
    let count = parse_usize(&line[1..])?;
    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        read_line(reader, &mut line)?.ok_or_else(|| std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"))?;
        if line.first() != Some(&b'$') {
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "expected bulk"));
        }
        let len = parse_usize(&line[1..])?;
        let mut data = vec![0u8; len];
        reader.read_exact(&mut data)?;
        let mut crlf = [0u8; 2];
        reader.read_exact(&mut crlf)?;
        if crlf != [b'\r', b'\n'] {
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "missing crlf"));
        }
        args.push(data);
    }
    Ok(args)
}

fn read_line(reader: &mut BufReader<TcpStream>, buf: &mut Vec<u8>) -> std::io::Result<Option<()>> {
    buf.clear();
    let bytes = reader.read_until(b'\n', buf)?;
    if bytes == 0 {
        return Ok(None);
    }
    if buf.len() < 2 || buf[buf.len() - 2] != b'\r' {
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "invalid line"));
    }
    buf.truncate(buf.len() - 2);
    Ok(Some(()))
}

fn parse_usize(data: &[u8]) -> std::io::Result<usize> {
    std::str::from_utf8(data)
        .ok()
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidData, "digit"))
}

pub fn write_simple(stream: &mut TcpStream, msg: &str) {
    let _ = write!(stream, "+{msg}\r\n");
    let _ = stream.flush();
}

pub fn write_error(stream: &mut TcpStream, msg: &str) {
    let _ = write!(stream, "-{msg}\r\n");
    let _ = stream.flush();
}

pub fn write_integer(stream: &mut TcpStream, value: i64) {
    let _ = write!(stream, ":{value}\r\n");
    let _ = stream.flush();
}

pub fn write_bulk(stream: &mut TcpStream, data: &[u8]) {
    let _ = write!(stream, "${}\r\n", data.len());
    let _ = stream.write_all(data);
    let _ = stream.write_all(b"\r\n");
    let _ = stream.flush();
}

pub fn write_null(stream: &mut TcpStream) {
    let _ = stream.write_all(b"$-1\r\n");
    let _ = stream.flush();
}

pub fn write_bulk_array<A: AsRef<[u8]>>(stream: &mut TcpStream, items: &[A]) {
    let _ = write!(stream, "*{}\r\n", items.len());
    for item in items {
        let item = item.as_ref();
        let _ = write!(stream, "${}\r\n", item.len());
        let _ = stream.write_all(item);
        let _ = stream.write_all(b"\r\n");
    }
    let _ = stream.flush();
}

pub fn args_as_text(args: &[Vec<u8>]) -> Vec<String> {
    args.iter()
        .map(|arg| String::from_utf8_lossy(arg).into_owned())
        .collect()
}

/// Routes client logs to the test output; `RUST_LOG` overrides the filter.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tkv_client=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
