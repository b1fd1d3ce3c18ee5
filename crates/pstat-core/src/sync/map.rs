/// A mutex-guarded hash map used as the backing store for resolution caches.
///
/// The important operation is [`ConcurrentMap::get_or_insert_with`]: the map
/// lock is held across the miss check, the computation, and the insert, so a
/// given key is computed at most once no matter how many threads ask for it
/// at the same moment.
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug)]
pub struct ConcurrentMap<K, V> {
    inner: Mutex<HashMap<K, V>>,
}

impl<K: Eq + Hash, V> ConcurrentMap<K, V> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Return a locked, mutable handle to the slot for `key`, inserting
    /// `V::default()` first if the key is absent.
    ///
    /// The whole map stays locked for as long as the guard lives; keep it short.
    pub fn get_or_insert_default(&self, key: K) -> MappedMutexGuard<'_, V>
    where
        V: Default,
    {
        MutexGuard::map(self.inner.lock(), |map| map.entry(key).or_default())
    }

    /// Return the cached value for `key`, computing and storing it with `f`
    /// if absent. Check, compute, and store form one critical section.
    pub fn get_or_insert_with<F>(&self, key: K, f: F) -> V
    where
        V: Clone,
        F: FnOnce() -> V,
    {
        self.inner.lock().entry(key).or_insert_with(f).clone()
    }

    /// `1` if `key` is present, `0` otherwise.
    pub fn count(&self, key: &K) -> usize {
        usize::from(self.inner.lock().contains_key(key))
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl<K: Eq + Hash, V> Default for ConcurrentMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn get_or_insert_default_creates_zeroed_slot() {
        let map: ConcurrentMap<u32, u64> = ConcurrentMap::new();
        assert_eq!(map.count(&7), 0);

        assert_eq!(*map.get_or_insert_default(7), 0);
        assert_eq!(map.count(&7), 1);

        *map.get_or_insert_default(7) += 5;
        assert_eq!(*map.get_or_insert_default(7), 5);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn get_or_insert_with_keeps_first_value() {
        let map: ConcurrentMap<&str, String> = ConcurrentMap::new();
        assert_eq!(map.get_or_insert_with("k", || "first".into()), "first");
        assert_eq!(map.get_or_insert_with("k", || "second".into()), "first");
    }

    /// Many threads racing on the same uncached key must run the
    /// computation exactly once.
    #[test]
    fn racing_threads_compute_each_key_once() {
        let map: Arc<ConcurrentMap<u32, String>> = Arc::new(ConcurrentMap::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(16));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let map = Arc::clone(&map);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    map.get_or_insert_with(42, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::yield_now();
                        "answer".to_string()
                    })
                })
            })
            .collect();

        for h in handles {
            assert_eq!(h.join().unwrap(), "answer");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(map.len(), 1);
    }
}
