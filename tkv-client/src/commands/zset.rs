//! Sorted-set commands.
//!
//! Range arguments come from `tkv_common`: a [`ScoreRange`] encodes to
//! `-inf`/`+inf`/`(x` tokens for score queries and to `-`/`+`/`[x`/`(x` for
//! lexicographic ones, and a [`Limit`] appends `LIMIT offset count` only when
//! bounded.

use tkv_common::convert::{encode_i64, parse_f64};
use tkv_common::{Aggregate, Limit, ScoreRange, TkvError, Weights, ZAddOption};

use super::{
    reply_array, reply_bulk, reply_bytes_list, reply_double, reply_integer,
    reply_optional_integer, Cmd, RawCommands,
};
use crate::connection::Connection;
use crate::error::{ClientError, ClientResult};
use crate::resp::RespValue;

/// One `(member, score)` pair of a `WITHSCORES` reply.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTuple {
    pub member: Vec<u8>,
    pub score: f64,
}

impl RawTuple {
    pub fn new(member: impl Into<Vec<u8>>, score: f64) -> Self {
        RawTuple {
            member: member.into(),
            score,
        }
    }
}

fn reply_tuples(reply: RespValue) -> ClientResult<Vec<RawTuple>> {
    let flat = reply_array(reply)?;
    if flat.len() % 2 != 0 {
        return Err(ClientError::UnexpectedResponse);
    }
    let mut tuples = Vec::with_capacity(flat.len() / 2);
    let mut items = flat.into_iter();
    while let (Some(member), Some(score)) = (items.next(), items.next()) {
        let member = reply_bulk(member)?.ok_or(ClientError::UnexpectedResponse)?;
        let score = reply_double(score)?.ok_or(ClientError::UnexpectedResponse)?;
        tuples.push(RawTuple { member, score });
    }
    Ok(tuples)
}

/// `ZRANGEBYSCORE`-style command: key, bounds, optional scores, limit.
fn by_score(
    name: &[u8],
    key: &[u8],
    range: &ScoreRange,
    reverse: bool,
    with_scores: bool,
    limit: Limit,
) -> ClientResult<Cmd> {
    let (min, max) = range.to_score_bytes()?;
    let mut cmd = Cmd::new(name).arg(key);
    // Reverse variants take max before min.
    cmd = if reverse { cmd.arg(max).arg(min) } else { cmd.arg(min).arg(max) };
    if with_scores {
        cmd = cmd.arg(b"WITHSCORES");
    }
    limit.push_args(cmd.args_mut());
    Ok(cmd)
}

fn zadd_multi_cmd<M: AsRef<[u8]>>(
    key: &[u8],
    tuples: &[(f64, M)],
    option: Option<ZAddOption>,
) -> ClientResult<Cmd> {
    if tuples.is_empty() {
        return Err(TkvError::invalid("ZADD requires at least one member").into());
    }
    let mut cmd = Cmd::new(b"ZADD").arg(key);
    if let Some(option) = option {
        cmd = cmd.arg(option.token());
    }
    for (score, member) in tuples {
        cmd = cmd.float(*score)?.arg(member);
    }
    Ok(cmd)
}

fn aggregate_store<K: AsRef<[u8]>>(
    name: &[u8],
    destination: &[u8],
    aggregate: Aggregate,
    weights: &Weights,
    sets: &[K],
) -> ClientResult<Cmd> {
    weights.ensure_matches(sets.len())?;
    let mut cmd = Cmd::new(name)
        .arg(destination)
        .arg(encode_i64(sets.len() as i64))
        .args(sets);
    weights.push_args(cmd.args_mut())?;
    Ok(cmd.arg(b"AGGREGATE").arg(aggregate.as_bytes()))
}

/// Sorted-set commands.
pub trait ZSetCommands: RawCommands {
    /// Number of new members (0 when the member only had its score updated).
    fn zadd(&mut self, key: &[u8], score: f64, member: &[u8]) -> ClientResult<i64> {
        reply_integer(Cmd::new(b"ZADD").arg(key).float(score)?.arg(member).run(self)?)
    }

    fn zadd_with(&mut self, key: &[u8], score: f64, member: &[u8], option: ZAddOption) -> ClientResult<i64> {
        let cmd = Cmd::new(b"ZADD").arg(key).arg(option.token()).float(score)?.arg(member);
        reply_integer(cmd.run(self)?)
    }

    fn zadd_multi<M: AsRef<[u8]>>(&mut self, key: &[u8], tuples: &[(f64, M)]) -> ClientResult<i64> {
        reply_integer(zadd_multi_cmd(key, tuples, None)?.run(self)?)
    }

    fn zadd_multi_with<M: AsRef<[u8]>>(
        &mut self,
        key: &[u8],
        tuples: &[(f64, M)],
        option: ZAddOption,
    ) -> ClientResult<i64> {
        reply_integer(zadd_multi_cmd(key, tuples, Some(option))?.run(self)?)
    }

    /// Number of members removed.
    fn zrem<M: AsRef<[u8]>>(&mut self, key: &[u8], members: &[M]) -> ClientResult<i64> {
        reply_integer(Cmd::new(b"ZREM").arg(key).args(members).run(self)?)
    }

    fn zremrangebyscore(&mut self, key: &[u8], range: &ScoreRange) -> ClientResult<i64> {
        let (min, max) = range.to_score_bytes()?;
        reply_integer(self.exec(&[b"ZREMRANGEBYSCORE".as_slice(), key, min.as_slice(), max.as_slice()])?)
    }

    fn zremrangebyrank(&mut self, key: &[u8], start: i64, end: i64) -> ClientResult<i64> {
        reply_integer(Cmd::new(b"ZREMRANGEBYRANK").arg(key).int(start).int(end).run(self)?)
    }

    /// Removes and returns up to `count` lowest-scored members.
    fn zpopmin(&mut self, key: &[u8], count: i64) -> ClientResult<Vec<RawTuple>> {
        reply_tuples(Cmd::new(b"ZPOPMIN").arg(key).int(count).run(self)?)
    }

    /// Removes and returns up to `count` highest-scored members.
    fn zpopmax(&mut self, key: &[u8], count: i64) -> ClientResult<Vec<RawTuple>> {
        reply_tuples(Cmd::new(b"ZPOPMAX").arg(key).int(count).run(self)?)
    }

    fn zscore(&mut self, key: &[u8], member: &[u8]) -> ClientResult<Option<f64>> {
        reply_double(self.exec(&[b"ZSCORE".as_slice(), key, member])?)
    }

    /// New score of `member`.
    fn zincrby(&mut self, key: &[u8], increment: f64, member: &[u8]) -> ClientResult<f64> {
        let reply = Cmd::new(b"ZINCRBY").arg(key).float(increment)?.arg(member).run(self)?;
        reply_bulk(reply)?
            .as_deref()
            .and_then(parse_f64)
            .ok_or(ClientError::UnexpectedResponse)
    }

    fn zcard(&mut self, key: &[u8]) -> ClientResult<i64> {
        reply_integer(self.exec(&[b"ZCARD".as_slice(), key])?)
    }

    fn zcount(&mut self, key: &[u8], range: &ScoreRange) -> ClientResult<i64> {
        let (min, max) = range.to_score_bytes()?;
        reply_integer(self.exec(&[b"ZCOUNT".as_slice(), key, min.as_slice(), max.as_slice()])?)
    }

    /// Members between zero-based ranks, ascending by score.
    fn zrange(&mut self, key: &[u8], start: i64, end: i64) -> ClientResult<Vec<Vec<u8>>> {
        reply_bytes_list(Cmd::new(b"ZRANGE").arg(key).int(start).int(end).run(self)?)
    }

    fn zrange_with_scores(&mut self, key: &[u8], start: i64, end: i64) -> ClientResult<Vec<RawTuple>> {
        let cmd = Cmd::new(b"ZRANGE").arg(key).int(start).int(end).arg(b"WITHSCORES");
        reply_tuples(cmd.run(self)?)
    }

    /// Members between zero-based ranks, descending by score.
    fn zrevrange(&mut self, key: &[u8], start: i64, end: i64) -> ClientResult<Vec<Vec<u8>>> {
        reply_bytes_list(Cmd::new(b"ZREVRANGE").arg(key).int(start).int(end).run(self)?)
    }

    fn zrevrange_with_scores(&mut self, key: &[u8], start: i64, end: i64) -> ClientResult<Vec<RawTuple>> {
        let cmd = Cmd::new(b"ZREVRANGE").arg(key).int(start).int(end).arg(b"WITHSCORES");
        reply_tuples(cmd.run(self)?)
    }

    fn zrangebyscore(&mut self, key: &[u8], range: &ScoreRange, limit: Limit) -> ClientResult<Vec<Vec<u8>>> {
        let cmd = by_score(b"ZRANGEBYSCORE", key, range, false, false, limit)?;
        reply_bytes_list(cmd.run(self)?)
    }

    fn zrevrangebyscore(&mut self, key: &[u8], range: &ScoreRange, limit: Limit) -> ClientResult<Vec<Vec<u8>>> {
        let cmd = by_score(b"ZREVRANGEBYSCORE", key, range, true, false, limit)?;
        reply_bytes_list(cmd.run(self)?)
    }

    fn zrangebyscore_with_scores(
        &mut self,
        key: &[u8],
        range: &ScoreRange,
        limit: Limit,
    ) -> ClientResult<Vec<RawTuple>> {
        let cmd = by_score(b"ZRANGEBYSCORE", key, range, false, true, limit)?;
        reply_tuples(cmd.run(self)?)
    }

    fn zrevrangebyscore_with_scores(
        &mut self,
        key: &[u8],
        range: &ScoreRange,
        limit: Limit,
    ) -> ClientResult<Vec<RawTuple>> {
        let cmd = by_score(b"ZREVRANGEBYSCORE", key, range, true, true, limit)?;
        reply_tuples(cmd.run(self)?)
    }

    /// Zero-based rank, or `None` when the member is missing.
    fn zrank(&mut self, key: &[u8], member: &[u8]) -> ClientResult<Option<i64>> {
        reply_optional_integer(self.exec(&[b"ZRANK".as_slice(), key, member])?)
    }

    fn zrevrank(&mut self, key: &[u8], member: &[u8]) -> ClientResult<Option<i64>> {
        reply_optional_integer(self.exec(&[b"ZREVRANK".as_slice(), key, member])?)
    }

    /// Cardinality of the stored union.
    fn zunionstore<K: AsRef<[u8]>>(&mut self, destination: &[u8], sets: &[K]) -> ClientResult<i64> {
        let cmd = Cmd::new(b"ZUNIONSTORE")
            .arg(destination)
            .int(sets.len() as i64)
            .args(sets);
        reply_integer(cmd.run(self)?)
    }

    /// Fails with a `WeightsMismatch` argument error, before any I/O, unless
    /// there is exactly one weight per set.
    fn zunionstore_weighted<K: AsRef<[u8]>>(
        &mut self,
        destination: &[u8],
        aggregate: Aggregate,
        weights: &Weights,
        sets: &[K],
    ) -> ClientResult<i64> {
        let cmd = aggregate_store(b"ZUNIONSTORE", destination, aggregate, weights, sets)?;
        reply_integer(cmd.run(self)?)
    }

    fn zinterstore<K: AsRef<[u8]>>(&mut self, destination: &[u8], sets: &[K]) -> ClientResult<i64> {
        let cmd = Cmd::new(b"ZINTERSTORE")
            .arg(destination)
            .int(sets.len() as i64)
            .args(sets);
        reply_integer(cmd.run(self)?)
    }

    fn zinterstore_weighted<K: AsRef<[u8]>>(
        &mut self,
        destination: &[u8],
        aggregate: Aggregate,
        weights: &Weights,
        sets: &[K],
    ) -> ClientResult<i64> {
        let cmd = aggregate_store(b"ZINTERSTORE", destination, aggregate, weights, sets)?;
        reply_integer(cmd.run(self)?)
    }

    /// Members between lexicographic bounds; all members should share one score.
    fn zrangebylex(&mut self, key: &[u8], range: &ScoreRange, limit: Limit) -> ClientResult<Vec<Vec<u8>>> {
        let (min, max) = range.to_lex_bytes()?;
        let mut cmd = Cmd::new(b"ZRANGEBYLEX").arg(key).arg(min).arg(max);
        limit.push_args(cmd.args_mut());
        reply_bytes_list(cmd.run(self)?)
    }

    fn zlexcount(&mut self, key: &[u8], range: &ScoreRange) -> ClientResult<i64> {
        let (min, max) = range.to_lex_bytes()?;
        reply_integer(self.exec(&[b"ZLEXCOUNT".as_slice(), key, min.as_slice(), max.as_slice()])?)
    }
}

impl ZSetCommands for Connection {}
