//! Concurrent stress test for the sharded pool.
//!
//! Many threads run get -> mutate -> put cycles on shared buffers. Every
//! object carries an owner tag; claiming an object that is already owned, or
//! releasing one owned by someone else, fails the test.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use nebula_pool::{PoolConfig, ShardSelector, ShardedPool};
use parking_lot::Mutex;
use rstest::rstest;

const CYCLES_PER_THREAD: usize = 10_000;
const UNOWNED: usize = 0;

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct TaggedBuffer {
    owner: AtomicUsize,
    uses: AtomicUsize,
    data: Mutex<Vec<u8>>,
}

impl TaggedBuffer {
    fn new() -> Self {
        Self {
            owner: AtomicUsize::new(UNOWNED),
            uses: AtomicUsize::new(0),
            data: Mutex::new(Vec::with_capacity(64)),
        }
    }

    fn claim(&self, owner: usize) {
        let previous = self.owner.swap(owner, Ordering::AcqRel);
        assert_eq!(previous, UNOWNED, "object claimed by {owner} while owned by {previous}");
    }

    fn release(&self, owner: usize) {
        let previous = self.owner.swap(UNOWNED, Ordering::AcqRel);
        assert_eq!(previous, owner, "object released by {owner} but owned by {previous}");
    }
}

type Registry = Arc<Mutex<Vec<Arc<TaggedBuffer>>>>;

/// Pool of shared buffers plus a registry of every buffer the factory made.
fn tagged_pool(config: PoolConfig) -> (ShardedPool<Arc<TaggedBuffer>>, Registry) {
    let registry = Arc::new(Mutex::new(Vec::new()));
    let factory_registry = Arc::clone(&registry);
    let pool = ShardedPool::with_config(config, move || {
        let buffer = Arc::new(TaggedBuffer::new());
        factory_registry.lock().push(Arc::clone(&buffer));
        buffer
    })
    .unwrap();
    (pool, registry)
}

// ---------------------------------------------------------------------------
// No object is ever owned by two threads at once
// ---------------------------------------------------------------------------

#[rstest]
#[case::thread_local(ShardSelector::ThreadLocal)]
#[case::round_robin(ShardSelector::RoundRobin)]
#[case::random(ShardSelector::Random)]
fn stress_exclusive_ownership(#[case] selector: ShardSelector) {
    let threads = thread::available_parallelism().map_or(4, |n| n.get()).clamp(4, 16);
    let config = PoolConfig::default().with_selector(selector);
    let (pool, registry) = tagged_pool(config);

    thread::scope(|s| {
        for worker in 1..=threads {
            let pool = &pool;
            s.spawn(move || {
                for cycle in 0..CYCLES_PER_THREAD {
                    let buffer = pool.get();
                    buffer.claim(worker);
                    {
                        let mut data = buffer.data.lock();
                        data.clear();
                        data.extend_from_slice(&cycle.to_le_bytes());
                    }
                    buffer.uses.fetch_add(1, Ordering::Relaxed);
                    buffer.release(worker);
                    pool.put(buffer);
                }
            });
        }
    });

    let registry = registry.lock();
    let total_uses: usize = registry.iter().map(|b| b.uses.load(Ordering::Relaxed)).sum();
    assert_eq!(total_uses, threads * CYCLES_PER_THREAD);
    assert!(registry.iter().all(|b| b.owner.load(Ordering::Relaxed) == UNOWNED));
    assert!(pool.len() <= pool.capacity());
    assert!(pool.len() <= registry.len());
}

// ---------------------------------------------------------------------------
// Sticky selection keeps a get/put loop on one object
// ---------------------------------------------------------------------------

#[test]
fn sticky_selection_reuses_single_object_per_thread() {
    let created = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&created);
    let pool = ShardedPool::new(move || counter.fetch_add(1, Ordering::SeqCst));

    for _ in 0..1_000 {
        let obj = pool.get();
        pool.put(obj);
    }

    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert_eq!(pool.len(), 1);
}

// ---------------------------------------------------------------------------
// Clear racing with get/put neither deadlocks nor loses capacity bounds
// ---------------------------------------------------------------------------

#[test]
fn clear_interleaves_with_traffic() {
    let pool = ShardedPool::new(|| vec![0u8; 32]);

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..2_000 {
                    let mut buf = pool.checkout();
                    buf[0] = buf[0].wrapping_add(1);
                }
            });
        }
        s.spawn(|| {
            for _ in 0..200 {
                pool.clear();
                thread::yield_now();
            }
        });
    });

    assert!(pool.len() <= pool.capacity());
    pool.clear();
    assert!(pool.is_empty());
}
