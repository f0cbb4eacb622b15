//! RAII checkout guard

use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::pool::ShardedPool;

/// Object checked out of a [`ShardedPool`], returned to it on drop.
///
/// The return goes through [`ShardedPool::put`], so it obeys the same rules:
/// if the caller's shard is full the object is dropped.
///
/// # Example
/// ```
/// use nebula_pool::ShardedPool;
///
/// let pool = ShardedPool::new(String::new);
/// {
///     let mut s = pool.checkout();
///     s.push_str("scratch");
/// }
/// assert_eq!(pool.len(), 1);
///
/// let kept: String = pool.checkout().detach();
/// assert_eq!(kept, "scratch");
/// assert!(pool.is_empty());
/// ```
pub struct Pooled<'a, T> {
    value: Option<T>,
    pool: &'a ShardedPool<T>,
}

impl<'a, T> Pooled<'a, T> {
    pub(crate) fn new(value: T, pool: &'a ShardedPool<T>) -> Self {
        Self {
            value: Some(value),
            pool,
        }
    }

    /// Take the object out of the guard so it is not returned to the pool
    pub fn detach(mut self) -> T {
        match self.value.take() {
            Some(value) => value,
            None => unreachable!("pooled value is only taken by detach or drop"),
        }
    }
}

impl<T> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        match &self.value {
            Some(value) => value,
            None => unreachable!("pooled value is only taken by detach or drop"),
        }
    }
}

impl<T> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut self.value {
            Some(value) => value,
            None => unreachable!("pooled value is only taken by detach or drop"),
        }
    }
}

impl<T> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        self.pool.put_opt(self.value.take());
    }
}

impl<T: fmt::Debug> fmt::Debug for Pooled<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pooled").field(&self.value).finish()
    }
}
