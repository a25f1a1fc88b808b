//! # Template Benchmark Harness
//!
//! Purpose: Drive typed string and sorted-set operations against a live
//! store so the per-call cost of encode / pool / decode can be compared over
//! time.
//!
//! Usage: `bench_template [host:port] [ops] [keys] [value_size]`
//!
//! ## Design Principles
//! 1. **Deterministic Workload**: Use a fixed PRNG seed for stable comparisons.
//! 2. **Allocation Control**: Pre-build values to keep setup costs off the hot path.
//! 3. **Count Fallbacks**: A defaulted call is reported, not hidden in the rate.

use std::env;
use std::error::Error;
use std::hint::black_box;
use std::time::{Duration, Instant};

use tkv_template::{
    ClientConfiguration, Executed, KeyOperations, KvContext, Limit, ScoreRange, TypedJsonSerializer,
};

const DEFAULT_ADDRESS: &str = "127.0.0.1:6379";
const DEFAULT_OP_COUNT: usize = 100_000;
const DEFAULT_KEY_COUNT: usize = 1 << 10;
const DEFAULT_VALUE_SIZE: usize = 128;

struct BenchConfig {
    host: String,
    port: u16,
    op_count: usize,
    key_count: usize,
    key_mask: usize,
    value_size: usize,
}

impl BenchConfig {
    fn from_args() -> Result<Self, Box<dyn Error>> {
        let mut args = env::args().skip(1);
        let address = args.next().unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
        let (host, port) = address
            .rsplit_once(':')
            .ok_or_else(|| format!("expected host:port, got {address}"))?;
        let op_count = parse_usize(args.next(), DEFAULT_OP_COUNT);
        let key_count = parse_usize(args.next(), DEFAULT_KEY_COUNT)
            .max(1)
            .next_power_of_two();
        let value_size = parse_usize(args.next(), DEFAULT_VALUE_SIZE);

        Ok(BenchConfig {
            host: host.to_string(),
            port: port.parse()?,
            op_count,
            key_count,
            key_mask: key_count - 1,
            value_size,
        })
    }
}

fn parse_usize(value: Option<String>, fallback: usize) -> usize {
    value.and_then(|raw| raw.parse().ok()).unwrap_or(fallback)
}

/// Tiny deterministic PRNG; keeps the workload reproducible.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    #[inline]
    fn next_index(&mut self, mask: usize) -> usize {
        (self.next_u64() as usize) & mask
    }
}

fn build_values(count: usize, size: usize, seed: u64) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| {
            let mut value = vec![0u8; size];
            let bytes = (seed ^ i as u64).to_le_bytes();
            let len = size.min(bytes.len());
            value[..len].copy_from_slice(&bytes[..len]);
            value
        })
        .collect()
}

#[derive(Default)]
struct Tally {
    defaulted: usize,
}

impl Tally {
    fn record<T>(&mut self, executed: Executed<T>) -> T {
        if executed.is_defaulted() {
            self.defaulted += 1;
        }
        executed.into_value()
    }
}

fn report(label: &str, ops: usize, elapsed: Duration, tally: &Tally) {
    let secs = elapsed.as_secs_f64();
    let ops_per_sec = (ops as f64) / secs;
    let micros_per_op = (secs * 1e6) / (ops as f64);
    println!(
        "{label}: {ops} ops in {secs:.3}s ({ops_per_sec:.0} ops/s, {micros_per_op:.1} us/op, {} defaulted)",
        tally.defaulted
    );
}

fn main() {
    if let Err(err) = run() {
        eprintln!("bench_template failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let bench = BenchConfig::from_args()?;
    let mut config = ClientConfiguration::new(bench.host.clone(), bench.port);
    config.pool.max_total = 4;
    config.pool.max_idle = 4;

    let mut context = KvContext::init(config)?;
    context.register_string::<u64, Vec<u8>, TypedJsonSerializer>("bench_str");
    context.register_zset::<u64, u64, TypedJsonSerializer>("bench_zset");
    let strings = context
        .string::<u64, Vec<u8>, TypedJsonSerializer>("bench_str")
        .ok_or("string operation missing")?;
    let board = context
        .zset::<u64, u64>("bench_zset")
        .ok_or("zset operation missing")?;

    let values = build_values(bench.key_count, bench.value_size, 0x5A5A_5A5A_5A5A_5A5A);
    println!(
        "target={}:{}, ops={}, keys={}, value_size={}",
        bench.host, bench.port, bench.op_count, bench.key_count, bench.value_size
    );

    let mut rng = XorShift64::new(0x0FED_CBA9_8765_4321);
    let mut tally = Tally::default();
    let start = Instant::now();
    for _ in 0..bench.op_count {
        let idx = rng.next_index(bench.key_mask);
        black_box(tally.record(strings.set(&(idx as u64), &values[idx])?));
    }
    report("SET", bench.op_count, start.elapsed(), &tally);

    let mut rng = XorShift64::new(0x1234_5678_9ABC_DEF0);
    let mut tally = Tally::default();
    let start = Instant::now();
    for _ in 0..bench.op_count {
        let idx = rng.next_index(bench.key_mask);
        black_box(tally.record(strings.get(&(idx as u64))?));
    }
    report("GET", bench.op_count, start.elapsed(), &tally);

    let mut rng = XorShift64::new(0xA5A5_A5A5_A5A5_A5A5);
    let mut tally = Tally::default();
    let start = Instant::now();
    for _ in 0..bench.op_count {
        let member = rng.next_index(bench.key_mask) as u64;
        black_box(tally.record(board.z_incr_by(&0, 1.0, &member)?));
    }
    report("ZINCRBY", bench.op_count, start.elapsed(), &tally);

    let mut tally = Tally::default();
    let start = Instant::now();
    for _ in 0..bench.op_count {
        let top = board.z_rev_range_by_score(&0, &ScoreRange::unbounded(), Limit::new(0, 10))?;
        black_box(tally.record(top));
    }
    report("ZREVRANGEBYSCORE", bench.op_count, start.elapsed(), &tally);

    for idx in 0..bench.key_count {
        strings.del(&(idx as u64));
    }
    board.del(&0);
    context.shutdown();
    Ok(())
}
