//! Bounded LIFO stack guarded by its own lock

use parking_lot::Mutex;

/// One independently locked slice of the pool.
///
/// Holds at most `capacity` objects. Every method takes the lock for a short,
/// bounded critical section; nothing user-supplied runs while it is held
/// except dropping objects in [`Shard::clear`].
#[derive(Debug)]
pub(crate) struct Shard<T> {
    objects: Mutex<Vec<T>>,
    capacity: usize,
}

impl<T> Shard<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            objects: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// Pop the most recently pushed object
    #[inline]
    pub(crate) fn pop(&self) -> Option<T> {
        self.objects.lock().pop()
    }

    /// Push an object, handing it back if the shard is full.
    #[inline]
    pub(crate) fn push(&self, obj: T) -> Result<(), T> {
        let mut objects = self.objects.lock();
        if objects.len() >= self.capacity {
            return Err(obj);
        }
        objects.push(obj);
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.objects.lock().len()
    }

    /// Remove every object, returning how many were held.
    ///
    /// The objects are dropped after the lock is released.
    pub(crate) fn clear(&self) -> usize {
        let drained = std::mem::take(&mut *self.objects.lock());
        drained.len()
    }
}
