//! Pool configuration types

use serde::{Deserialize, Serialize};

use crate::error::{PoolError, PoolResult};
use crate::selector::ShardSelector;

/// Default number of shards
pub const DEFAULT_SHARD_COUNT: usize = 16;

/// Default number of objects each shard retains
pub const DEFAULT_SHARD_CAPACITY: usize = 128;

/// Default number of neighbouring shards probed when the preferred one is empty
pub const DEFAULT_STEAL_COUNT: usize = 4;

/// Largest accepted shard count
pub const MAX_SHARD_COUNT: usize = 1024;

/// Configuration for a [`ShardedPool`](crate::ShardedPool)
///
/// Fixed at construction. Missing fields fall back to their defaults when
/// deserializing, so `{"shard_count": 4}` is a complete document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of shards, a power of two
    pub shard_count: usize,
    /// Maximum objects retained per shard; returns beyond this are dropped
    pub shard_capacity: usize,
    /// Neighbouring shards probed by `get` before falling back to the factory
    pub steal_count: usize,
    /// How callers are mapped onto shards
    pub selector: ShardSelector,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            shard_capacity: DEFAULT_SHARD_CAPACITY,
            steal_count: DEFAULT_STEAL_COUNT,
            selector: ShardSelector::ThreadLocal,
        }
    }
}

impl PoolConfig {
    /// Set the number of shards
    #[must_use]
    pub const fn with_shard_count(mut self, shard_count: usize) -> Self {
        self.shard_count = shard_count;
        self
    }

    /// Set the per-shard capacity
    #[must_use]
    pub const fn with_shard_capacity(mut self, shard_capacity: usize) -> Self {
        self.shard_capacity = shard_capacity;
        self
    }

    /// Set the steal fan-out
    #[must_use]
    pub const fn with_steal_count(mut self, steal_count: usize) -> Self {
        self.steal_count = steal_count;
        self
    }

    /// Set the shard selection strategy
    #[must_use]
    pub const fn with_selector(mut self, selector: ShardSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Total objects the pool can retain across all shards
    pub const fn total_capacity(&self) -> usize {
        self.shard_count.saturating_mul(self.shard_capacity)
    }

    /// Steal fan-out actually used by the pool.
    ///
    /// Probing more than `shard_count - 1` neighbours would revisit shards
    /// already tried, so the configured value is clamped.
    pub const fn effective_steal_count(&self) -> usize {
        let neighbours = self.shard_count.saturating_sub(1);
        if self.steal_count < neighbours {
            self.steal_count
        } else {
            neighbours
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> PoolResult<()> {
        if !self.shard_count.is_power_of_two() || self.shard_count > MAX_SHARD_COUNT {
            return Err(PoolError::InvalidShardCount {
                count: self.shard_count,
                max: MAX_SHARD_COUNT,
            });
        }
        if self.shard_capacity == 0 {
            return Err(PoolError::ZeroShardCapacity);
        }
        Ok(())
    }
}
