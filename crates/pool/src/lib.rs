//! # nebula-pool
//!
//! Sharded concurrent object pool for the Nebula workflow automation ecosystem.
//!
//! The pool amortizes allocation cost on hot paths by keeping returned objects
//! around for reuse. Instead of one lock around one free list it holds a fixed,
//! power-of-two number of shards, each a small mutex-protected LIFO stack:
//!
//! - `get` pops from the caller's preferred shard, probes a few neighbours,
//!   and only then calls the factory
//! - `put` pushes onto the caller's preferred shard and drops the object if
//!   that shard is full
//! - `clear` empties every shard
//!
//! Callers are mapped onto shards by a [`ShardSelector`]. The default,
//! [`ShardSelector::ThreadLocal`], pins each thread to one shard so a `get`
//! followed by a `put` on the same thread touches a single lock.
//!
//! ## Quick Start
//!
//! ```rust
//! use nebula_pool::prelude::*;
//!
//! let pool = ShardedPool::new(|| Vec::<u8>::with_capacity(4096));
//!
//! let mut buf = pool.get();
//! buf.extend_from_slice(b"payload");
//! buf.clear();
//! pool.put(buf);
//!
//! // Or let a guard hand it back
//! {
//!     let mut buf = pool.checkout();
//!     buf.push(1);
//! }
//! assert_eq!(pool.len(), 1);
//! ```
//!
//! ## What the pool does not do
//!
//! Objects are opaque: the pool never resets, validates or inspects them, and
//! never evicts idle objects. It gives no ordering or fairness guarantees
//! across shards.

pub mod config;
pub mod error;
mod guard;
mod pool;
pub mod selector;
mod shard;

pub use config::{
    DEFAULT_SHARD_CAPACITY, DEFAULT_SHARD_COUNT, DEFAULT_STEAL_COUNT, MAX_SHARD_COUNT, PoolConfig,
};
pub use error::{PoolError, PoolResult};
pub use guard::Pooled;
pub use pool::{PoolBuilder, ShardedPool};
pub use selector::ShardSelector;

pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::config::PoolConfig;
    pub use crate::error::{PoolError, PoolResult};
    pub use crate::guard::Pooled;
    pub use crate::pool::{PoolBuilder, ShardedPool};
    pub use crate::selector::ShardSelector;
}
