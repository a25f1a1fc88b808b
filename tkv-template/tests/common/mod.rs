#![allow(dead_code)]

//! Miniature in-process store speaking RESP2, enough of the string, key and
//! sorted-set command set to drive the typed operations end to end.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tkv_template::ClientConfiguration;

enum Value {
    Str(Vec<u8>),
    /// Kept sorted by (score, member).
    ZSet(Vec<(Vec<u8>, f64)>),
}

struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

enum Reply {
    Simple(&'static str),
    Error(String),
    Int(i64),
    Bulk(Vec<u8>),
    Null,
    Array(Vec<Option<Vec<u8>>>),
}

#[derive(Default)]
struct State {
    data: HashMap<Vec<u8>, Entry>,
    log: Vec<Vec<String>>,
}

/// Handle to a running store. The listener thread lives until the test
/// process exits.
pub struct MiniStore {
    addr: SocketAddr,
    state: Arc<Mutex<State>>,
}

impl MiniStore {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        let state = Arc::new(Mutex::new(State::default()));

        let shared = state.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let state = shared.clone();
                thread::spawn(move || {
                    let mut reader = BufReader::new(stream.try_clone().expect("clone"));
                    while let Ok(args) = read_command(&mut reader) {
                        let reply = state.lock().expect("state").apply(&args);
                        write_reply(&mut stream, &reply);
                    }
                });
            }
        });

        MiniStore { addr, state }
    }

    pub fn config(&self) -> ClientConfiguration {
        let mut config = ClientConfiguration::new(self.addr.ip().to_string(), self.addr.port());
        config.connect_timeout = Some(Duration::from_secs(1));
        config.read_timeout = Some(Duration::from_secs(1));
        config.write_timeout = Some(Duration::from_secs(1));
        config
    }

    /// Every command received so far, as text.
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.state.lock().expect("state").log.clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.commands().iter().filter(|cmd| cmd[0] == name).count()
    }

    /// Raw string value stored under the full (prefixed) key.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        let state = self.state.lock().expect("state");
        match state.data.get(key.as_bytes()) {
            Some(Entry {
                value: Value::Str(data),
                ..
            }) => Some(data.clone()),
            _ => None,
        }
    }

    pub fn put_raw(&self, key: &str, value: &[u8]) {
        self.state.lock().expect("state").data.insert(
            key.as_bytes().to_vec(),
            Entry {
                value: Value::Str(value.to_vec()),
                expires_at: None,
            },
        );
    }
}

type Outcome = Result<Reply, String>;

const WRONG_TYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

impl State {
    fn apply(&mut self, args: &[Vec<u8>]) -> Reply {
        self.log.push(
            args.iter()
                .map(|arg| String::from_utf8_lossy(arg).into_owned())
                .collect(),
        );
        self.purge_expired();
        let name = String::from_utf8_lossy(&args[0]).to_ascii_uppercase();
        self.dispatch(&name, args).unwrap_or_else(Reply::Error)
    }

    fn dispatch(&mut self, name: &str, args: &[Vec<u8>]) -> Outcome {
        match name {
            "PING" => Ok(Reply::Simple("PONG")),
            "GET" => self.get(&args[1]),
            "SET" => self.set(args),
            "SETNX" => Ok(Reply::Int(self.put_if(&args[1], &args[2], None, Some(false)) as i64)),
            "SETEX" | "PSETEX" => {
                let amount = int(&args[2])?;
                let ttl = if name == "SETEX" { amount * 1000 } else { amount };
                self.put_if(&args[1], &args[3], Some(ttl), None);
                Ok(Reply::Simple("OK"))
            }
            "GETSET" => {
                let old = self.get(&args[1])?;
                self.put_if(&args[1], &args[2], None, None);
                Ok(old)
            }
            "MGET" => Ok(Reply::Array(
                args[1..]
                    .iter()
                    .map(|key| match self.data.get(key) {
                        Some(Entry {
                            value: Value::Str(data),
                            ..
                        }) => Some(data.clone()),
                        _ => None,
                    })
                    .collect(),
            )),
            "MSET" => {
                for pair in args[1..].chunks(2) {
                    self.put_if(&pair[0], &pair[1], None, None);
                }
                Ok(Reply::Simple("OK"))
            }
            "MSETNX" => {
                if args[1..].chunks(2).any(|pair| self.data.contains_key(&pair[0])) {
                    return Ok(Reply::Int(0));
                }
                for pair in args[1..].chunks(2) {
                    self.put_if(&pair[0], &pair[1], None, None);
                }
                Ok(Reply::Int(1))
            }
            "INCR" => self.incr(&args[1], 1),
            "DECR" => self.incr(&args[1], -1),
            "INCRBY" => int(&args[2]).and_then(|delta| self.incr(&args[1], delta)),
            "DECRBY" => int(&args[2]).and_then(|delta| self.incr(&args[1], -delta)),
            "INCRBYFLOAT" => self.incr_float(&args[1], &args[2]),
            "APPEND" => {
                let mut data = self.string(&args[1])?.unwrap_or_default();
                data.extend_from_slice(&args[2]);
                let len = data.len() as i64;
                self.put_keep_ttl(&args[1], data);
                Ok(Reply::Int(len))
            }
            "STRLEN" => Ok(Reply::Int(self.string(&args[1])?.map_or(0, |data| data.len() as i64))),
            "GETRANGE" => {
                let data = self.string(&args[1])?.unwrap_or_default();
                let window = slice_window(data.len(), int(&args[2])?, int(&args[3])?);
                Ok(Reply::Bulk(window.map_or_else(Vec::new, |(from, to)| data[from..=to].to_vec())))
            }
            "SETRANGE" => {
                let offset = usize::try_from(int(&args[2])?).map_err(|_| "ERR offset is out of range")?;
                let mut data = self.string(&args[1])?.unwrap_or_default();
                let end = offset + args[3].len();
                if data.len() < end {
                    data.resize(end, 0);
                }
                data[offset..end].copy_from_slice(&args[3]);
                let len = data.len() as i64;
                self.put_keep_ttl(&args[1], data);
                Ok(Reply::Int(len))
            }
            "DEL" => Ok(Reply::Int(
                args[1..].iter().filter(|key| self.data.remove(*key).is_some()).count() as i64,
            )),
            "EXISTS" => Ok(Reply::Int(
                args[1..].iter().filter(|key| self.data.contains_key(*key)).count() as i64,
            )),
            "EXPIRE" | "PEXPIRE" => {
                let amount = int(&args[2])?;
                let millis = if name == "EXPIRE" { amount * 1000 } else { amount };
                Ok(Reply::Int(match self.data.get_mut(&args[1]) {
                    Some(entry) => {
                        entry.expires_at = Some(deadline(millis));
                        1
                    }
                    None => 0,
                }))
            }
            "PERSIST" => Ok(Reply::Int(match self.data.get_mut(&args[1]) {
                Some(entry) if entry.expires_at.is_some() => {
                    entry.expires_at = None;
                    1
                }
                _ => 0,
            })),
            "TTL" | "PTTL" => Ok(Reply::Int(match self.data.get(&args[1]) {
                None => -2,
                Some(Entry { expires_at: None, .. }) => -1,
                Some(Entry {
                    expires_at: Some(at),
                    ..
                }) => {
                    let left = at.saturating_duration_since(Instant::now()).as_millis() as i64;
                    if name == "TTL" {
                        (left + 999) / 1000
                    } else {
                        left
                    }
                }
            })),
            "TYPE" => Ok(Reply::Simple(match self.data.get(&args[1]) {
                None => "none",
                Some(Entry {
                    value: Value::Str(_),
                    ..
                }) => "string",
                Some(Entry {
                    value: Value::ZSet(_),
                    ..
                }) => "zset",
            })),
            "RANDOMKEY" => Ok(self
                .data
                .keys()
                .next()
                .map_or(Reply::Null, |key| Reply::Bulk(key.clone()))),
            "ZADD" => self.zadd(args),
            "ZREM" => {
                let mut removed = 0;
                let set = self.zset_mut(&args[1])?;
                for member in &args[2..] {
                    if let Some(pos) = set.iter().position(|(m, _)| m == member) {
                        set.remove(pos);
                        removed += 1;
                    }
                }
                self.drop_if_empty(&args[1]);
                Ok(Reply::Int(removed))
            }
            "ZSCORE" => Ok(self
                .zset(&args[1])?
                .iter()
                .find(|(m, _)| *m == args[2])
                .map_or(Reply::Null, |(_, score)| Reply::Bulk(fmt_score(*score)))),
            "ZINCRBY" => {
                let increment = float(&args[2])?;
                let set = self.zset_mut(&args[1])?;
                let score = match set.iter_mut().find(|(m, _)| *m == args[3]) {
                    Some((_, score)) => {
                        *score += increment;
                        *score
                    }
                    None => {
                        set.push((args[3].clone(), increment));
                        increment
                    }
                };
                sort(set);
                Ok(Reply::Bulk(fmt_score(score)))
            }
            "ZCARD" => Ok(Reply::Int(self.zset(&args[1])?.len() as i64)),
            "ZCOUNT" => {
                let (min, max) = (score_bound(&args[2])?, score_bound(&args[3])?);
                Ok(Reply::Int(
                    self.zset(&args[1])?
                        .iter()
                        .filter(|(_, s)| within(*s, min, max))
                        .count() as i64,
                ))
            }
            "ZRANGE" | "ZREVRANGE" => {
                let mut set = self.zset(&args[1])?;
                if name == "ZREVRANGE" {
                    set.reverse();
                }
                let with_scores = args.len() > 4;
                let window = slice_window(set.len(), int(&args[2])?, int(&args[3])?);
                let picked = window.map_or(&[][..], |(from, to)| &set[from..=to]);
                Ok(members_reply(picked, with_scores))
            }
            "ZRANGEBYSCORE" | "ZREVRANGEBYSCORE" | "ZREMRANGEBYSCORE" => {
                let reverse = name == "ZREVRANGEBYSCORE";
                let (lo, hi) = if reverse { (&args[3], &args[2]) } else { (&args[2], &args[3]) };
                let (min, max) = (score_bound(lo)?, score_bound(hi)?);
                if name == "ZREMRANGEBYSCORE" {
                    let set = self.zset_mut(&args[1])?;
                    let before = set.len();
                    set.retain(|(_, s)| !within(*s, min, max));
                    let removed = (before - set.len()) as i64;
                    self.drop_if_empty(&args[1]);
                    return Ok(Reply::Int(removed));
                }
                let mut set = self.zset(&args[1])?;
                set.retain(|(_, s)| within(*s, min, max));
                if reverse {
                    set.reverse();
                }
                let (with_scores, limited) = range_options(&args[4..], set)?;
                Ok(members_reply(&limited, with_scores))
            }
            "ZREMRANGEBYRANK" => {
                let set = self.zset_mut(&args[1])?;
                let window = slice_window(set.len(), int(&args[2])?, int(&args[3])?);
                let removed = window.map_or(0, |(from, to)| {
                    set.drain(from..=to);
                    to - from + 1
                });
                self.drop_if_empty(&args[1]);
                Ok(Reply::Int(removed as i64))
            }
            "ZRANK" | "ZREVRANK" => {
                let mut set = self.zset(&args[1])?;
                if name == "ZREVRANK" {
                    set.reverse();
                }
                Ok(set
                    .iter()
                    .position(|(m, _)| *m == args[2])
                    .map_or(Reply::Null, |rank| Reply::Int(rank as i64)))
            }
            "ZUNIONSTORE" | "ZINTERSTORE" => self.aggregate_store(name == "ZUNIONSTORE", args),
            "ZPOPMIN" | "ZPOPMAX" => {
                let count = args.get(2).map_or(Ok(1), |arg| int(arg))?.max(0) as usize;
                let set = self.zset_mut(&args[1])?;
                let take = count.min(set.len());
                let popped: Vec<_> = if name == "ZPOPMIN" {
                    set.drain(..take).collect()
                } else {
                    let split = set.len() - take;
                    set.drain(split..).rev().collect()
                };
                self.drop_if_empty(&args[1]);
                Ok(members_reply(&popped, true))
            }
            "ZRANGEBYLEX" | "ZLEXCOUNT" => {
                let (min, max) = (lex_bound(&args[2])?, lex_bound(&args[3])?);
                let mut set = self.zset(&args[1])?;
                set.retain(|(m, _)| lex_within(m, &min, &max));
                if name == "ZLEXCOUNT" {
                    return Ok(Reply::Int(set.len() as i64));
                }
                let (_, limited) = range_options(&args[4..], set)?;
                Ok(members_reply(&limited, false))
            }
            _ => Err(format!("ERR unknown command '{name}'")),
        }
    }

    fn purge_expired(&mut self) {
        let now = Instant::now();
        self.data
            .retain(|_, entry| entry.expires_at.map_or(true, |at| at > now));
    }

    fn string(&self, key: &[u8]) -> Result<Option<Vec<u8>>, String> {
        match self.data.get(key) {
            None => Ok(None),
            Some(Entry {
                value: Value::Str(data),
                ..
            }) => Ok(Some(data.clone())),
            Some(_) => Err(WRONG_TYPE.to_string()),
        }
    }

    fn get(&self, key: &[u8]) -> Outcome {
        Ok(self.string(key)?.map_or(Reply::Null, Reply::Bulk))
    }

    /// `exists`: `Some(false)` writes only when absent, `Some(true)` only
    /// when present. Returns whether the write happened.
    fn put_if(&mut self, key: &[u8], value: &[u8], ttl_millis: Option<i64>, exists: Option<bool>) -> bool {
        if let Some(required) = exists {
            if self.data.contains_key(key) != required {
                return false;
            }
        }
        self.data.insert(
            key.to_vec(),
            Entry {
                value: Value::Str(value.to_vec()),
                expires_at: ttl_millis.map(deadline),
            },
        );
        true
    }

    fn put_keep_ttl(&mut self, key: &[u8], data: Vec<u8>) {
        let expires_at = self.data.get(key).and_then(|entry| entry.expires_at);
        self.data.insert(
            key.to_vec(),
            Entry {
                value: Value::Str(data),
                expires_at,
            },
        );
    }

    fn set(&mut self, args: &[Vec<u8>]) -> Outcome {
        let mut ttl = None;
        let mut exists = None;
        let mut idx = 3;
        while idx < args.len() {
            match args[idx].to_ascii_uppercase().as_slice() {
                b"EX" => {
                    ttl = Some(int(&args[idx + 1])? * 1000);
                    idx += 1;
                }
                b"PX" => {
                    ttl = Some(int(&args[idx + 1])?);
                    idx += 1;
                }
                b"NX" => exists = Some(false),
                b"XX" => exists = Some(true),
                _ => return Err("ERR syntax error".to_string()),
            }
            idx += 1;
        }
        if self.put_if(&args[1], &args[2], ttl, exists) {
            Ok(Reply::Simple("OK"))
        } else {
            Ok(Reply::Null)
        }
    }

    fn incr(&mut self, key: &[u8], delta: i64) -> Outcome {
        let current = match self.string(key)? {
            None => 0,
            Some(data) => int(&data).map_err(|_| "ERR value is not an integer or out of range")?,
        };
        let next = current + delta;
        self.put_keep_ttl(key, next.to_string().into_bytes());
        Ok(Reply::Int(next))
    }

    fn incr_float(&mut self, key: &[u8], delta: &[u8]) -> Outcome {
        let current = match self.string(key)? {
            None => 0.0,
            Some(data) => float(&data).map_err(|_| "ERR value is not a valid float")?,
        };
        let next = current + float(delta)?;
        let text = fmt_score(next);
        self.put_keep_ttl(key, text.clone());
        Ok(Reply::Bulk(text))
    }

    fn zset(&self, key: &[u8]) -> Result<Vec<(Vec<u8>, f64)>, String> {
        match self.data.get(key) {
            None => Ok(Vec::new()),
            Some(Entry {
                value: Value::ZSet(set),
                ..
            }) => Ok(set.clone()),
            Some(_) => Err(WRONG_TYPE.to_string()),
        }
    }

    fn zset_mut(&mut self, key: &[u8]) -> Result<&mut Vec<(Vec<u8>, f64)>, String> {
        let entry = self.data.entry(key.to_vec()).or_insert_with(|| Entry {
            value: Value::ZSet(Vec::new()),
            expires_at: None,
        });
        match &mut entry.value {
            Value::ZSet(set) => Ok(set),
            Value::Str(_) => Err(WRONG_TYPE.to_string()),
        }
    }

    fn drop_if_empty(&mut self, key: &[u8]) {
        if matches!(self.data.get(key), Some(Entry { value: Value::ZSet(set), .. }) if set.is_empty()) {
            self.data.remove(key);
        }
    }

    fn zadd(&mut self, args: &[Vec<u8>]) -> Outcome {
        let mut idx = 2;
        let (mut nx, mut xx, mut ch) = (false, false, false);
        loop {
            match args.get(idx).map(|arg| arg.to_ascii_uppercase()) {
                Some(flag) if flag == b"NX" => nx = true,
                Some(flag) if flag == b"XX" => xx = true,
                Some(flag) if flag == b"CH" => ch = true,
                _ => break,
            }
            idx += 1;
        }
        let pairs = &args[idx..];
        if pairs.is_empty() || pairs.len() % 2 != 0 {
            return Err("ERR syntax error".to_string());
        }
        let mut parsed = Vec::with_capacity(pairs.len() / 2);
        for pair in pairs.chunks(2) {
            parsed.push((float(&pair[0])?, pair[1].clone()));
        }

        let (mut added, mut changed) = (0, 0);
        let set = self.zset_mut(&args[1])?;
        for (score, member) in parsed {
            match set.iter_mut().find(|(m, _)| *m == member) {
                Some((_, current)) if !nx => {
                    if *current != score {
                        *current = score;
                        changed += 1;
                    }
                }
                Some(_) => {}
                None if !xx => {
                    set.push((member, score));
                    added += 1;
                }
                None => {}
            }
        }
        sort(set);
        self.drop_if_empty(&args[1]);
        Ok(Reply::Int(if ch { added + changed } else { added }))
    }

    fn aggregate_store(&mut self, union: bool, args: &[Vec<u8>]) -> Outcome {
        let count = usize::try_from(int(&args[2])?).map_err(|_| "ERR numkeys")?;
        let sources = &args[3..3 + count];
        let mut weights = vec![1.0; count];
        let mut aggregate = b"SUM".to_vec();
        let mut idx = 3 + count;
        while idx < args.len() {
            match args[idx].to_ascii_uppercase().as_slice() {
                b"WEIGHTS" => {
                    for (slot, raw) in weights.iter_mut().zip(&args[idx + 1..idx + 1 + count]) {
                        *slot = float(raw)?;
                    }
                    idx += 1 + count;
                }
                b"AGGREGATE" => {
                    aggregate = args[idx + 1].to_ascii_uppercase();
                    idx += 2;
                }
                _ => return Err("ERR syntax error".to_string()),
            }
        }

        let mut combined: Vec<(Vec<u8>, f64, usize)> = Vec::new();
        for (source, weight) in sources.iter().zip(&weights) {
            for (member, score) in self.zset(source)? {
                let weighted = score * weight;
                match combined.iter_mut().find(|(m, _, _)| *m == member) {
                    Some((_, total, seen)) => {
                        *total = match aggregate.as_slice() {
                            b"MIN" => total.min(weighted),
                            b"MAX" => total.max(weighted),
                            _ => *total + weighted,
                        };
                        *seen += 1;
                    }
                    None => combined.push((member, weighted, 1)),
                }
            }
        }
        let mut result: Vec<(Vec<u8>, f64)> = combined
            .into_iter()
            .filter(|(_, _, seen)| union || *seen == count)
            .map(|(member, score, _)| (member, score))
            .collect();
        sort(&mut result);
        let len = result.len() as i64;
        self.data.remove(&args[1]);
        if !result.is_empty() {
            self.data.insert(
                args[1].clone(),
                Entry {
                    value: Value::ZSet(result),
                    expires_at: None,
                },
            );
        }
        Ok(Reply::Int(len))
    }
}

fn sort(set: &mut [(Vec<u8>, f64)]) {
    set.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
}

fn deadline(millis: i64) -> Instant {
    Instant::now() + Duration::from_millis(millis.max(0) as u64)
}

fn int(arg: &[u8]) -> Result<i64, String> {
    std::str::from_utf8(arg)
        .ok()
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| "ERR value is not an integer or out of range".to_string())
}

fn float(arg: &[u8]) -> Result<f64, String> {
    std::str::from_utf8(arg)
        .ok()
        .and_then(|text| text.parse::<f64>().ok())
        .filter(|value| !value.is_nan())
        .ok_or_else(|| "ERR value is not a valid float".to_string())
}

fn fmt_score(score: f64) -> Vec<u8> {
    if score.is_infinite() {
        return if score > 0.0 { b"inf".to_vec() } else { b"-inf".to_vec() };
    }
    score.to_string().into_bytes()
}

/// `(value, exclusive)`.
fn score_bound(arg: &[u8]) -> Result<(f64, bool), String> {
    match arg {
        b"-inf" => Ok((f64::NEG_INFINITY, false)),
        b"+inf" | b"inf" => Ok((f64::INFINITY, false)),
        [b'(', rest @ ..] => Ok((float(rest)?, true)),
        _ => Ok((float(arg)?, false)),
    }
}

fn within(score: f64, (min, min_excl): (f64, bool), (max, max_excl): (f64, bool)) -> bool {
    let above = if min_excl { score > min } else { score >= min };
    let below = if max_excl { score < max } else { score <= max };
    above && below
}

enum Lex {
    Min,
    Max,
    Inclusive(Vec<u8>),
    Exclusive(Vec<u8>),
}

fn lex_bound(arg: &[u8]) -> Result<Lex, String> {
    match arg {
        b"-" => Ok(Lex::Min),
        b"+" => Ok(Lex::Max),
        [b'[', rest @ ..] => Ok(Lex::Inclusive(rest.to_vec())),
        [b'(', rest @ ..] => Ok(Lex::Exclusive(rest.to_vec())),
        _ => Err("ERR min or max not valid string range item".to_string()),
    }
}

fn lex_within(member: &[u8], min: &Lex, max: &Lex) -> bool {
    let above = match min {
        Lex::Min => true,
        Lex::Max => false,
        Lex::Inclusive(v) => member >= v.as_slice(),
        Lex::Exclusive(v) => member > v.as_slice(),
    };
    let below = match max {
        Lex::Max => true,
        Lex::Min => false,
        Lex::Inclusive(v) => member <= v.as_slice(),
        Lex::Exclusive(v) => member < v.as_slice(),
    };
    above && below
}

/// `[WITHSCORES] [LIMIT offset count]` applied to an already ordered set.
fn range_options(
    options: &[Vec<u8>],
    set: Vec<(Vec<u8>, f64)>,
) -> Result<(bool, Vec<(Vec<u8>, f64)>), String> {
    let mut with_scores = false;
    let (mut offset, mut count) = (0usize, -1i64);
    let mut idx = 0;
    while idx < options.len() {
        match options[idx].to_ascii_uppercase().as_slice() {
            b"WITHSCORES" => with_scores = true,
            b"LIMIT" => {
                offset = usize::try_from(int(&options[idx + 1])?).unwrap_or(0);
                count = int(&options[idx + 2])?;
                idx += 2;
            }
            _ => return Err("ERR syntax error".to_string()),
        }
        idx += 1;
    }
    let take = if count < 0 { usize::MAX } else { count as usize };
    Ok((with_scores, set.into_iter().skip(offset).take(take).collect()))
}

/// Inclusive `start..=end` window after resolving negative indexes.
fn slice_window(len: usize, start: i64, end: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let end = if end < 0 { len + end } else { end.min(len - 1) };
    if len == 0 || start > end || start >= len {
        return None;
    }
    Some((start as usize, end as usize))
}

fn members_reply(members: &[(Vec<u8>, f64)], with_scores: bool) -> Reply {
    let mut items = Vec::with_capacity(members.len() * 2);
    for (member, score) in members {
        items.push(Some(member.clone()));
        if with_scores {
            items.push(Some(fmt_score(*score)));
        }
    }
    Reply::Array(items)
}

fn write_reply(stream: &mut TcpStream, reply: &Reply) {
    let mut out = Vec::new();
    match reply {
        Reply::Simple(text) => out.extend_from_slice(format!("+{text}\r\n").as_bytes()),
        Reply::Error(text) => out.extend_from_slice(format!("-{text}\r\n").as_bytes()),
        Reply::Int(value) => out.extend_from_slice(format!(":{value}\r\n").as_bytes()),
        Reply::Bulk(data) => push_bulk(&mut out, Some(data)),
        Reply::Null => push_bulk(&mut out, None),
        Reply::Array(items) => {
            out.extend_from_slice(format!("*{}\r\n", items.len()).as_bytes());
            for item in items {
                push_bulk(&mut out, item.as_deref());
            }
        }
    }
    let _ = stream.write_all(&out);
    let _ = stream.flush();
}

fn push_bulk(out: &mut Vec<u8>, data: Option<&[u8]>) {
    match data {
        Some(data) => {
            out.extend_from_slice(format!("${}\r\n", data.len()).as_bytes());
            out.extend_from_slice(data);
            out.extend_from_slice(b"\r\n");
        }
        None => out.extend_from_slice(b"$-1\r\n"),
    }
}

fn read_command(reader: &mut BufReader<TcpStream>) -> std::io::Result<Vec<Vec<u8>>> {
    let invalid = |what: &str| std::io::Error::new(std::io::ErrorKind::InvalidData, what.to_string());
    let mut line = Vec::new();
    read_line(reader, &mut line)?;
    if line.first() != Some(&b'*') {
        return Err(invalid("expected array"));
    }
    let count = parse_len(&line[1..]).ok_or_else(|| invalid("array length"))?;
    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        read_line(reader, &mut line)?;
        if line.first() != Some(&b'$') {
            return Err(invalid("expected bulk"));
        }
        let len = parse_len(&line[1..]).ok_or_else(|| invalid("bulk length"))?;
        let mut data = vec![0u8; len + 2];
        reader.read_exact(&mut data)?;
        data.truncate(len);
        args.push(data);
    }
    Ok(args)
}

fn read_line(reader: &mut BufReader<TcpStream>, buf: &mut Vec<u8>) -> std::io::Result<()> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"));
    }
    if buf.ends_with(b"\r\n") {
        buf.truncate(buf.len() - 2);
    }
    Ok(())
}

fn parse_len(data: &[u8]) -> Option<usize> {
    std::str::from_utf8(data).ok()?.parse().ok()
}
