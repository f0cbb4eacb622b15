//! Shard selection strategies
//!
//! A selector turns "who is calling" into a shard index. It has to be cheap
//! (no syscalls, no locks), spread concurrent callers across shards, and
//! ideally be sticky so that a `get` followed by a `put` on the same thread
//! lands on the same shard.
//!
//! Selection is a heuristic. Two threads may share a shard, and nothing
//! guarantees a caller keeps its shard under the non-sticky strategies.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Source of per-thread tokens. Threads draw sequential values, so the first
/// `N` threads touching any pool land on `N` distinct shards.
static NEXT_THREAD_TOKEN: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static THREAD_TOKEN: u64 = NEXT_THREAD_TOKEN.fetch_add(1, Ordering::Relaxed);
}

/// Strategy a pool uses to pick the shard for `get` and `put`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShardSelector {
    /// Token assigned once per thread and reused for every call.
    ///
    /// Fully sticky: a thread always maps to the same shard of a given pool.
    #[default]
    ThreadLocal,
    /// Per-pool monotonic counter, advanced on every call.
    ///
    /// Even distribution across shards, no stickiness.
    RoundRobin,
    /// Draw from the thread-local fast PRNG on every call.
    ///
    /// Approximately uniform, no stickiness.
    Random,
}

impl ShardSelector {
    /// Produce a raw selection value. The caller masks it into range.
    ///
    /// `tick` is the owning pool's counter; only [`ShardSelector::RoundRobin`]
    /// touches it.
    #[inline]
    pub(crate) fn next(self, tick: &AtomicU64) -> u64 {
        match self {
            Self::ThreadLocal => current_thread_token(),
            Self::RoundRobin => tick.fetch_add(1, Ordering::Relaxed),
            Self::Random => fastrand::u64(..),
        }
    }

    /// Whether repeated calls from one thread return the same shard.
    pub const fn is_sticky(self) -> bool {
        matches!(self, Self::ThreadLocal)
    }
}

impl fmt::Display for ShardSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThreadLocal => write!(f, "thread-local"),
            Self::RoundRobin => write!(f, "round-robin"),
            Self::Random => write!(f, "random"),
        }
    }
}

/// Token of the calling thread, stable for the thread's lifetime.
#[inline]
pub fn current_thread_token() -> u64 {
    THREAD_TOKEN.with(|token| *token)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use super::*;

    #[test]
    fn test_thread_local_is_stable() {
        let tick = AtomicU64::new(0);
        let first = ShardSelector::ThreadLocal.next(&tick);
        for _ in 0..100 {
            assert_eq!(ShardSelector::ThreadLocal.next(&tick), first);
        }
        // Thread-local selection never advances the pool counter
        assert_eq!(tick.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_thread_tokens_differ_across_threads() {
        let tokens: HashSet<u64> = (0..8)
            .map(|_| thread::spawn(current_thread_token))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();
        assert_eq!(tokens.len(), 8);
    }

    #[test]
    fn test_round_robin_advances_tick() {
        let tick = AtomicU64::new(0);
        let values: Vec<u64> = (0..4).map(|_| ShardSelector::RoundRobin.next(&tick)).collect();
        assert_eq!(values, vec![0, 1, 2, 3]);
        assert_eq!(tick.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn test_random_spreads() {
        let tick = AtomicU64::new(0);
        let shards: HashSet<u64> = (0..256)
            .map(|_| ShardSelector::Random.next(&tick) & 15)
            .collect();
        assert!(shards.len() > 1);
    }

    #[test]
    fn test_display_and_stickiness() {
        assert_eq!(ShardSelector::ThreadLocal.to_string(), "thread-local");
        assert_eq!(ShardSelector::RoundRobin.to_string(), "round-robin");
        assert_eq!(ShardSelector::Random.to_string(), "random");
        assert!(ShardSelector::ThreadLocal.is_sticky());
        assert!(!ShardSelector::RoundRobin.is_sticky());
        assert!(!ShardSelector::Random.is_sticky());
    }
}
