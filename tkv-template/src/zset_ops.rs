//! # Sorted-Set Operations
//!
//! Purpose: Typed add/remove/score/rank/range calls over sorted sets.
//!
//! Range results keep the store's order: ascending score for `z_range*`,
//! descending for `z_rev_range*`. Ranks are reported 1-based.

use std::fmt::{self, Display};

use tkv_client::{RawTuple, ZSetCommands};
use tkv_common::{Aggregate, Limit, ScoreRange, TkvError, TypedTuple, Weights, ZAddOption};

use crate::error::{check_score, OpResult};
use crate::key_ops::KeyOperations;
use crate::operation::Operation;
use crate::serializer::{Serializer, TypedJsonSerializer};
use crate::template::{Executed, Fallback, Template};

/// Typed operations on sorted sets under one key prefix.
pub struct ZSetOperation<K, V, S = TypedJsonSerializer> {
    base: Operation<K, V, S>,
}

impl<K, V, S> ZSetOperation<K, V, S>
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
        ZSetOperation {
            base: Operation::new(prefix, template, serializer),
        }
    }

    pub fn base(&self) -> &Operation<K, V, S> {
        &self.base
    }

    pub fn prefix(&self) -> &str {
        self.base.prefix()
    }

    fn template(&self) -> &Template {
        self.base.template()
    }

    fn members(&self, executed: Executed<Vec<Vec<u8>>>) -> OpResult<Executed<Vec<V>>> {
        Ok(executed.try_map(|raw| self.base.decode_values(raw))?)
    }

    fn tuples(&self, executed: Executed<Vec<RawTuple>>) -> OpResult<Executed<Vec<TypedTuple<V>>>> {
        Ok(executed.try_map(|raw| {
            raw.into_iter()
                .map(|tuple| Ok(TypedTuple::new(self.base.decode_value(tuple.member)?, tuple.score)))
                .collect::<OpResult<Vec<_>>>()
        })?)
    }

    /// True when `member` was added, false when it only had its score
    /// updated (or on failure).
    pub fn z_add(&self, key: &K, score: f64, member: &V) -> OpResult<Executed<bool>> {
        check_score(score)?;
        let raw_key = self.base.raw_key(key);
        let raw_member = self.base.raw_value(member)?;
        Ok(self
            .template()
            .execute(|conn| Ok(Some(conn.zadd(&raw_key, score, &raw_member)? == 1)), false))
    }

    /// `ZADD` with `NX`, `XX` or `CH`.
    pub fn z_add_with(&self, key: &K, score: f64, member: &V, option: ZAddOption) -> OpResult<Executed<bool>> {
        check_score(score)?;
        let raw_key = self.base.raw_key(key);
        let raw_member = self.base.raw_value(member)?;
        Ok(self.template().execute(
            |conn| Ok(Some(conn.zadd_with(&raw_key, score, &raw_member, option)? == 1)),
            false,
        ))
    }

    /// Adds every `(member, score)`; returns how many were new, `-1` on
    /// failure. An empty batch is not sent and defaults to `-1`.
    pub fn z_add_all(&self, key: &K, tuples: &[(V, f64)]) -> OpResult<Executed<i64>> {
        if tuples.is_empty() {
            return Ok(nothing_sent(-1));
        }
        let raw_key = self.base.raw_key(key);
        let mut raw_tuples = Vec::with_capacity(tuples.len());
        for (member, score) in tuples {
            check_score(*score)?;
            raw_tuples.push((*score, self.base.raw_value(member)?));
        }
        Ok(self
            .template()
            .execute(|conn| conn.zadd_multi(&raw_key, &raw_tuples).map(Some), -1))
    }

    pub fn remove(&self, key: &K, member: &V) -> OpResult<Executed<bool>> {
        let raw_key = self.base.raw_key(key);
        let raw_member = self.base.raw_value(member)?;
        Ok(self
            .template()
            .execute(|conn| Ok(Some(conn.zrem(&raw_key, &[raw_member])? == 1)), false))
    }

    /// Number of members removed, `-1` on failure.
    pub fn remove_all(&self, key: &K, members: &[V]) -> OpResult<Executed<i64>> {
        if members.is_empty() {
            return Ok(nothing_sent(-1));
        }
        let raw_key = self.base.raw_key(key);
        let raw_members = self.base.raw_values(members)?;
        Ok(self
            .template()
            .execute(|conn| conn.zrem(&raw_key, &raw_members).map(Some), -1))
    }

    pub fn z_rem_range_by_score(&self, key: &K, range: &ScoreRange) -> OpResult<Executed<i64>> {
        range.to_score_bytes()?;
        let raw_key = self.base.raw_key(key);
        Ok(self
            .template()
            .execute(|conn| conn.zremrangebyscore(&raw_key, range).map(Some), -1))
    }

    /// Removes members between zero-based ranks `start..=end`.
    pub fn z_rem_range_by_rank(&self, key: &K, start: i64, end: i64) -> Executed<i64> {
        let raw_key = self.base.raw_key(key);
        self.template()
            .execute(|conn| conn.zremrangebyrank(&raw_key, start, end).map(Some), -1)
    }

    /// Score of `member`; `None` when absent.
    pub fn z_score(&self, key: &K, member: &V) -> OpResult<Executed<Option<f64>>> {
        let raw_key = self.base.raw_key(key);
        let raw_member = self.base.raw_value(member)?;
        Ok(self.template().execute(
            |conn| Ok(conn.zscore(&raw_key, &raw_member)?.map(Some)),
            None,
        ))
    }

    /// New score of `member`; `f64::MAX` on failure.
    pub fn z_incr_by(&self, key: &K, increment: f64, member: &V) -> OpResult<Executed<f64>> {
        check_score(increment)?;
        let raw_key = self.base.raw_key(key);
        let raw_member = self.base.raw_value(member)?;
        Ok(self.template().execute(
            |conn| conn.zincrby(&raw_key, increment, &raw_member).map(Some),
            f64::MAX,
        ))
    }

    pub fn z_card(&self, key: &K) -> Executed<i64> {
        let raw_key = self.base.raw_key(key);
        self.template()
            .execute(|conn| conn.zcard(&raw_key).map(Some), -1)
    }

    pub fn z_count(&self, key: &K, range: &ScoreRange) -> OpResult<Executed<i64>> {
        range.to_score_bytes()?;
        let raw_key = self.base.raw_key(key);
        Ok(self
            .template()
            .execute(|conn| conn.zcount(&raw_key, range).map(Some), -1))
    }

    /// Members between zero-based ranks, ascending by score.
    pub fn z_range(&self, key: &K, start: i64, end: i64) -> OpResult<Executed<Vec<V>>> {
        let raw_key = self.base.raw_key(key);
        self.members(
            self.template()
                .execute(|conn| conn.zrange(&raw_key, start, end).map(Some), Vec::new()),
        )
    }

    /// Members between zero-based ranks, descending by score.
    pub fn z_rev_range(&self, key: &K, start: i64, end: i64) -> OpResult<Executed<Vec<V>>> {
        let raw_key = self.base.raw_key(key);
        self.members(
            self.template()
                .execute(|conn| conn.zrevrange(&raw_key, start, end).map(Some), Vec::new()),
        )
    }

    pub fn z_range_by_score(&self, key: &K, range: &ScoreRange, limit: Limit) -> OpResult<Executed<Vec<V>>> {
        range.to_score_bytes()?;
        let raw_key = self.base.raw_key(key);
        self.members(self.template().execute(
            |conn| conn.zrangebyscore(&raw_key, range, limit).map(Some),
            Vec::new(),
        ))
    }

    pub fn z_rev_range_by_score(
        &self,
        key: &K,
        range: &ScoreRange,
        limit: Limit,
    ) -> OpResult<Executed<Vec<V>>> {
        range.to_score_bytes()?;
        let raw_key = self.base.raw_key(key);
        self.members(self.template().execute(
            |conn| conn.zrevrangebyscore(&raw_key, range, limit).map(Some),
            Vec::new(),
        ))
    }

    pub fn z_range_with_scores(&self, key: &K, start: i64, end: i64) -> OpResult<Executed<Vec<TypedTuple<V>>>> {
        let raw_key = self.base.raw_key(key);
        self.tuples(self.template().execute(
            |conn| conn.zrange_with_scores(&raw_key, start, end).map(Some),
            Vec::new(),
        ))
    }

    pub fn z_rev_range_with_scores(
        &self,
        key: &K,
        start: i64,
        end: i64,
    ) -> OpResult<Executed<Vec<TypedTuple<V>>>> {
        let raw_key = self.base.raw_key(key);
        self.tuples(self.template().execute(
            |conn| conn.zrevrange_with_scores(&raw_key, start, end).map(Some),
            Vec::new(),
        ))
    }

    pub fn z_range_by_score_with_scores(
        &self,
        key: &K,
        range: &ScoreRange,
        limit: Limit,
    ) -> OpResult<Executed<Vec<TypedTuple<V>>>> {
        range.to_score_bytes()?;
        let raw_key = self.base.raw_key(key);
        self.tuples(self.template().execute(
            |conn| conn.zrangebyscore_with_scores(&raw_key, range, limit).map(Some),
            Vec::new(),
        ))
    }

    pub fn z_rev_range_by_score_with_scores(
        &self,
        key: &K,
        range: &ScoreRange,
        limit: Limit,
    ) -> OpResult<Executed<Vec<TypedTuple<V>>>> {
        range.to_score_bytes()?;
        let raw_key = self.base.raw_key(key);
        self.tuples(self.template().execute(
            |conn| conn.zrevrangebyscore_with_scores(&raw_key, range, limit).map(Some),
            Vec::new(),
        ))
    }

    /// 1-based rank by ascending score; `None` when `member` is absent.
    pub fn z_rank(&self, key: &K, member: &V) -> OpResult<Executed<Option<i64>>> {
        let raw_key = self.base.raw_key(key);
        let raw_member = self.base.raw_value(member)?;
        Ok(self.template().execute(
            |conn| Ok(conn.zrank(&raw_key, &raw_member)?.map(|rank| Some(rank + 1))),
            None,
        ))
    }

    /// 1-based rank by descending score; `None` when `member` is absent.
    pub fn z_rev_rank(&self, key: &K, member: &V) -> OpResult<Executed<Option<i64>>> {
        let raw_key = self.base.raw_key(key);
        let raw_member = self.base.raw_value(member)?;
        Ok(self.template().execute(
            |conn| Ok(conn.zrevrank(&raw_key, &raw_member)?.map(|rank| Some(rank + 1))),
            None,
        ))
    }

    /// Stores the union of `keys` at `destination`; returns its size.
    pub fn z_union_store(&self, destination: &K, keys: &[K]) -> OpResult<Executed<i64>> {
        check_sets(keys)?;
        let raw_dest = self.base.raw_key(destination);
        let raw_keys = self.base.raw_keys(keys);
        Ok(self
            .template()
            .execute(|conn| conn.zunionstore(&raw_dest, &raw_keys).map(Some), -1))
    }

    /// Weighted union. `weights` must hold exactly one weight per key;
    /// otherwise nothing is sent and `WeightsMismatch` is returned.
    pub fn z_union_store_weighted(
        &self,
        destination: &K,
        keys: &[K],
        aggregate: Aggregate,
        weights: &Weights,
    ) -> OpResult<Executed<i64>> {
        check_sets(keys)?;
        weights.ensure_matches(keys.len())?;
        let raw_dest = self.base.raw_key(destination);
        let raw_keys = self.base.raw_keys(keys);
        Ok(self.template().execute(
            |conn| {
                conn.zunionstore_weighted(&raw_dest, aggregate, weights, &raw_keys)
                    .map(Some)
            },
            -1,
        ))
    }

    pub fn z_inter_store(&self, destination: &K, keys: &[K]) -> OpResult<Executed<i64>> {
        check_sets(keys)?;
        let raw_dest = self.base.raw_key(destination);
        let raw_keys = self.base.raw_keys(keys);
        Ok(self
            .template()
            .execute(|conn| conn.zinterstore(&raw_dest, &raw_keys).map(Some), -1))
    }

    pub fn z_inter_store_weighted(
        &self,
        destination: &K,
        keys: &[K],
        aggregate: Aggregate,
        weights: &Weights,
    ) -> OpResult<Executed<i64>> {
        check_sets(keys)?;
        weights.ensure_matches(keys.len())?;
        let raw_dest = self.base.raw_key(destination);
        let raw_keys = self.base.raw_keys(keys);
        Ok(self.template().execute(
            |conn| {
                conn.zinterstore_weighted(&raw_dest, aggregate, weights, &raw_keys)
                    .map(Some)
            },
            -1,
        ))
    }

    /// Members between lexicographic bounds. Bounds compare against the
    /// stored (encoded) member bytes.
    pub fn z_range_by_lex(&self, key: &K, range: &ScoreRange, limit: Limit) -> OpResult<Executed<Vec<V>>> {
        range.to_lex_bytes()?;
        let raw_key = self.base.raw_key(key);
        self.members(self.template().execute(
            |conn| conn.zrangebylex(&raw_key, range, limit).map(Some),
            Vec::new(),
        ))
    }

    pub fn z_lex_count(&self, key: &K, range: &ScoreRange) -> OpResult<Executed<i64>> {
        range.to_lex_bytes()?;
        let raw_key = self.base.raw_key(key);
        Ok(self
            .template()
            .execute(|conn| conn.zlexcount(&raw_key, range).map(Some), -1))
    }

    /// Removes and returns up to `count` lowest-scored members.
    pub fn z_pop_min(&self, key: &K, count: i64) -> OpResult<Executed<Vec<TypedTuple<V>>>> {
        let raw_key = self.base.raw_key(key);
        self.tuples(
            self.template()
                .execute(|conn| conn.zpopmin(&raw_key, count).map(Some), Vec::new()),
        )
    }

    /// Removes and returns up to `count` highest-scored members.
    pub fn z_pop_max(&self, key: &K, count: i64) -> OpResult<Executed<Vec<TypedTuple<V>>>> {
        let raw_key = self.base.raw_key(key);
        self.tuples(
            self.template()
                .execute(|conn| conn.zpopmax(&raw_key, count).map(Some), Vec::new()),
        )
    }
}

fn check_sets<K>(keys: &[K]) -> Result<(), TkvError> {
    if keys.is_empty() {
        return Err(TkvError::invalid("at least one source set is required"));
    }
    Ok(())
}

fn nothing_sent<T>(value: T) -> Executed<T> {
    Executed::Defaulted {
        value,
        reason: Fallback::NoResult,
    }
}

impl<K, V, S> KeyOperations<K> for ZSetOperation<K, V, S>
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

impl<K, V, S: Clone> Clone for ZSetOperation<K, V, S> {
    fn clone(&self) -> Self {
        ZSetOperation {
            base: self.base.clone(),
        }
    }
}

impl<K, V, S> fmt::Debug for ZSetOperation<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ZSetOperation").field(&self.base).finish()
    }
}
