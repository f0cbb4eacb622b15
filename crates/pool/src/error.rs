//! Error types for pool construction
use thiserror::Error;

/// Result type for pool operations
pub type PoolResult<T> = std::result::Result<T, PoolError>;

/// Errors raised while building a [`ShardedPool`](crate::ShardedPool).
///
/// Every variant is a configuration problem detected before the pool exists.
/// Runtime operations (`get`, `put`, `clear`) never fail: an empty shard is
/// normal operation and a full shard silently drops the returned object.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PoolError {
    /// The builder was finished without a factory
    #[error("pool factory is required: the pool cannot create objects without one")]
    MissingFactory,

    /// Shard count is zero, not a power of two, or above the supported maximum
    #[error("invalid shard count {count}: must be a power of two in 1..={max}")]
    InvalidShardCount {
        /// The rejected shard count
        count: usize,
        /// The largest supported shard count
        max: usize,
    },

    /// Per-shard capacity of zero would drop every returned object
    #[error("shard capacity must be greater than zero")]
    ZeroShardCapacity,
}

impl PoolError {
    /// Returns `true` for errors caused by [`PoolConfig`](crate::PoolConfig) values
    /// rather than by an incomplete builder.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidShardCount { .. } | Self::ZeroShardCapacity)
    }
}
