//! Sharded object pool with neighbour stealing
//!
//! # Retrieve path
//!
//! ```text
//! get():
//!   1. Pick the preferred shard with the configured selector
//!   2. Pop from it (fast path, no contention when callers stay on their shard)
//!   3. Probe the next `steal_count` shards, wrapping around
//!   4. Call the factory
//!
//! put(obj):
//!   1. Pick the preferred shard with the same selector
//!   2. Push; if the shard is full the object is dropped
//! ```
//!
//! `put` never spills into a neighbouring shard: the return path takes exactly
//! one lock, and a surplus object on a full shard is dropped.

use std::fmt;
use std::sync::atomic::AtomicU64;

use crossbeam::utils::CachePadded;
use tracing::{debug, trace};

use crate::config::PoolConfig;
use crate::error::{PoolError, PoolResult};
use crate::guard::Pooled;
use crate::selector::ShardSelector;
use crate::shard::Shard;

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

/// Concurrent object pool split into independently locked shards.
///
/// There is no global lock: contention is spread across `shard_count`
/// mutexes, each guarding a bounded LIFO stack. The pool never blocks beyond
/// one shard's critical section and never fails at runtime; when no pooled
/// object is reachable it calls the factory.
///
/// No ordering or fairness is guaranteed across shards. Within one shard the
/// most recently returned object is handed out first.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::thread;
///
/// use nebula_pool::ShardedPool;
///
/// let pool = Arc::new(ShardedPool::new(|| Vec::<u8>::with_capacity(1024)));
///
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let pool = Arc::clone(&pool);
///         thread::spawn(move || {
///             let mut buffer = pool.get();
///             buffer.clear();
///             buffer.extend_from_slice(b"hello");
///             pool.put(buffer);
///         })
///     })
///     .collect();
///
/// for h in handles {
///     h.join().unwrap();
/// }
/// assert!(pool.len() <= pool.capacity());
/// ```
pub struct ShardedPool<T> {
    shards: Box<[CachePadded<Shard<T>>]>,
    mask: usize,
    steal_count: usize,
    config: PoolConfig,
    tick: CachePadded<AtomicU64>,
    factory: Factory<T>,
}

impl<T> ShardedPool<T> {
    /// Create a pool with the default configuration.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::from_parts(PoolConfig::default(), Box::new(factory))
    }

    /// Create a pool with a custom configuration.
    pub fn with_config<F>(config: PoolConfig, factory: F) -> PoolResult<Self>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        config.validate()?;
        Ok(Self::from_parts(config, Box::new(factory)))
    }

    /// Start building a pool
    pub fn builder() -> PoolBuilder<T> {
        PoolBuilder::new()
    }

    fn from_parts(config: PoolConfig, factory: Factory<T>) -> Self {
        debug_assert!(config.validate().is_ok());

        let shards = (0..config.shard_count)
            .map(|_| CachePadded::new(Shard::new(config.shard_capacity)))
            .collect();

        debug!(
            shard_count = config.shard_count,
            shard_capacity = config.shard_capacity,
            steal_count = config.effective_steal_count(),
            selector = %config.selector,
            "created sharded pool"
        );

        Self {
            shards,
            mask: config.shard_count - 1,
            steal_count: config.effective_steal_count(),
            tick: CachePadded::new(AtomicU64::new(0)),
            factory,
            config,
        }
    }

    /// Take an object from the pool, creating one if none is reachable.
    ///
    /// Tries the caller's preferred shard, then up to `steal_count`
    /// neighbours, then the factory. A panic inside the factory propagates to
    /// the caller unchanged.
    #[inline]
    pub fn get(&self) -> T {
        self.get_with(|| (self.factory)())
    }

    /// Like [`get`](Self::get), but builds a missing object with `create`
    /// instead of the pool's factory.
    #[inline]
    pub fn get_with<F>(&self, create: F) -> T
    where
        F: FnOnce() -> T,
    {
        if let Some(obj) = self.try_get() {
            return obj;
        }
        trace!("no pooled object reachable, creating a new one");
        create()
    }

    /// Take a pooled object without ever calling the factory.
    ///
    /// Returns `None` when the preferred shard and every probed neighbour
    /// are empty. Shards beyond the steal window are not consulted, so `None`
    /// does not mean the whole pool is empty.
    pub fn try_get(&self) -> Option<T> {
        let mut index = self.preferred_index();
        if let Some(obj) = self.shards[index].pop() {
            return Some(obj);
        }

        for _ in 0..self.steal_count {
            index = (index + 1) & self.mask;
            if let Some(obj) = self.shards[index].pop() {
                trace!(shard = index, "stole object from neighbouring shard");
                return Some(obj);
            }
        }

        None
    }

    /// Take an object wrapped in a guard that returns it on drop.
    pub fn checkout(&self) -> Pooled<'_, T> {
        Pooled::new(self.get(), self)
    }

    /// Return an object to the pool.
    ///
    /// The object goes to the caller's preferred shard only. If that shard
    /// is full the object is dropped; it is not offered to other shards.
    #[inline]
    pub fn put(&self, obj: T) {
        let index = self.preferred_index();
        if self.shards[index].push(obj).is_err() {
            trace!(shard = index, "shard full, dropping returned object");
        }
    }

    /// Return an object if there is one; `None` is ignored.
    #[inline]
    pub fn put_opt(&self, obj: Option<T>) {
        if let Some(obj) = obj {
            self.put(obj);
        }
    }

    /// Drop every pooled object.
    ///
    /// Shards are emptied one at a time, so concurrent `get`/`put` calls may
    /// interleave. Objects currently checked out are not affected.
    pub fn clear(&self) {
        let dropped: usize = self.shards.iter().map(|shard| shard.clear()).sum();
        debug!(dropped, "cleared sharded pool");
    }

    /// Create up to `count` objects and store them, spreading them across
    /// shards in index order. Stops early once every shard is full.
    ///
    /// Returns the number of objects stored.
    pub fn prefill(&self, count: usize) -> usize {
        let mut placed = 0;
        while placed < count {
            let before = placed;
            for shard in &*self.shards {
                if placed == count {
                    break;
                }
                if shard.len() >= self.config.shard_capacity {
                    continue;
                }
                if shard.push((self.factory)()).is_ok() {
                    placed += 1;
                }
            }
            if placed == before {
                break;
            }
        }
        debug!(requested = count, placed, "prefilled sharded pool");
        placed
    }

    /// Index of the shard the calling context would use right now.
    ///
    /// Stable across calls only for [`ShardSelector::ThreadLocal`]; the other
    /// strategies advance their state on every call, including this one.
    pub fn preferred_shard(&self) -> usize {
        self.preferred_index()
    }

    #[inline]
    fn preferred_index(&self) -> usize {
        (self.config.selector.next(&self.tick) as usize) & self.mask
    }

    /// Number of pooled objects across all shards.
    ///
    /// Shards are read one after another, so under concurrent use the result
    /// is approximate.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.len()).sum()
    }

    /// Whether no shard currently holds an object
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of objects held by one shard, or `None` if `index` is out of range
    pub fn shard_len(&self, index: usize) -> Option<usize> {
        self.shards.get(index).map(|shard| shard.len())
    }

    /// Number of shards
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Maximum objects retained per shard
    pub fn shard_capacity(&self) -> usize {
        self.config.shard_capacity
    }

    /// Maximum objects retained across the whole pool
    pub fn capacity(&self) -> usize {
        self.config.total_capacity()
    }

    /// Neighbours probed by `get`, after clamping to `shard_count - 1`
    pub fn steal_count(&self) -> usize {
        self.steal_count
    }

    /// Shard selection strategy
    pub fn selector(&self) -> ShardSelector {
        self.config.selector
    }

    /// Configuration the pool was built with
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}

impl<T> fmt::Debug for ShardedPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedPool")
            .field("config", &self.config)
            .field("steal_count", &self.steal_count)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ShardedPool`]
///
/// # Example
/// ```
/// use nebula_pool::{ShardSelector, ShardedPool};
///
/// let pool = ShardedPool::builder()
///     .shard_count(4)
///     .shard_capacity(32)
///     .selector(ShardSelector::RoundRobin)
///     .factory(String::new)
///     .build()?;
///
/// assert_eq!(pool.capacity(), 128);
/// # Ok::<(), nebula_pool::PoolError>(())
/// ```
pub struct PoolBuilder<T> {
    config: PoolConfig,
    factory: Option<Factory<T>>,
}

impl<T> PoolBuilder<T> {
    /// Create a builder with the default configuration and no factory
    pub fn new() -> Self {
        Self {
            config: PoolConfig::default(),
            factory: None,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: PoolConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the number of shards (power of two)
    pub fn shard_count(mut self, shard_count: usize) -> Self {
        self.config.shard_count = shard_count;
        self
    }

    /// Set the per-shard capacity
    pub fn shard_capacity(mut self, shard_capacity: usize) -> Self {
        self.config.shard_capacity = shard_capacity;
        self
    }

    /// Set the steal fan-out
    pub fn steal_count(mut self, steal_count: usize) -> Self {
        self.config.steal_count = steal_count;
        self
    }

    /// Set the shard selection strategy
    pub fn selector(mut self, selector: ShardSelector) -> Self {
        self.config.selector = selector;
        self
    }

    /// Set the factory used when no pooled object is available
    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Build the pool.
    ///
    /// Fails with [`PoolError::MissingFactory`] if no factory was set, or
    /// with a configuration error if the configuration is invalid.
    pub fn build(self) -> PoolResult<ShardedPool<T>> {
        let factory = self.factory.ok_or(PoolError::MissingFactory)?;
        self.config.validate()?;
        Ok(ShardedPool::from_parts(self.config, factory))
    }
}

impl<T> Default for PoolBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for PoolBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolBuilder")
            .field("config", &self.config)
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}
