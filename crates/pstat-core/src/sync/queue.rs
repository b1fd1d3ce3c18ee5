/// A mutex-guarded FIFO with non-blocking push and pop.
///
/// The walker and output pools never wait on this queue: `try_pop` returns
/// `None` immediately when the queue is empty and the caller decides how to
/// back off (the engine yields and polls again).
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Multi-producer / multi-consumer FIFO queue.
#[derive(Debug)]
pub struct ConcurrentQueue<T> {
    inner: Mutex<VecDeque<T>>,
}

impl<T> ConcurrentQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
        }
    }

    /// Append `item` to the back of the queue. Never fails.
    pub fn push(&self, item: T) {
        self.inner.lock().push_back(item);
    }

    /// Remove the front item, or return `None` at once if the queue is empty.
    pub fn try_pop(&self) -> Option<T> {
        self.inner.lock().pop_front()
    }

    /// Snapshot of the current length. Stale as soon as the lock is released.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl<T> Default for ConcurrentQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn pops_in_fifo_order() {
        let q = ConcurrentQueue::new();
        q.push(1);
        q.push(2);
        q.push(3);
        assert_eq!(q.len(), 3);
        assert_eq!(q.try_pop(), Some(1));
        assert_eq!(q.try_pop(), Some(2));
        assert_eq!(q.try_pop(), Some(3));
        assert_eq!(q.try_pop(), None);
        assert!(q.is_empty());
    }

    /// Hammering an empty queue from many threads must return `None` every
    /// time and finish promptly (no thread may park waiting for data).
    #[test]
    fn concurrent_try_pop_on_empty_never_blocks() {
        let q: Arc<ConcurrentQueue<u64>> = Arc::new(ConcurrentQueue::new());
        let start = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let q = Arc::clone(&q);
                thread::spawn(move || (0..10_000).filter(|_| q.try_pop().is_some()).count())
            })
            .collect();

        for h in handles {
            assert_eq!(h.join().unwrap(), 0, "empty queue produced an item");
        }
        assert!(
            start.elapsed() < Duration::from_secs(10),
            "try_pop on an empty queue appears to block"
        );
    }

    /// Every item pushed by concurrent producers is popped exactly once by
    /// concurrent consumers.
    #[test]
    fn concurrent_producers_and_consumers_lose_nothing() {
        const PRODUCERS: u64 = 4;
        const PER_PRODUCER: u64 = 5_000;

        let q: Arc<ConcurrentQueue<u64>> = Arc::new(ConcurrentQueue::new());

        let producers: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let q = Arc::clone(&q);
                thread::spawn(move || {
                    for i in 0..PER_PRODUCER {
                        q.push(p * PER_PRODUCER + i);
                    }
                })
            })
            .collect();
        for h in producers {
            h.join().unwrap();
        }

        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let q = Arc::clone(&q);
                thread::spawn(move || {
                    let mut seen = Vec::new();
                    while let Some(v) = q.try_pop() {
                        seen.push(v);
                    }
                    seen
                })
            })
            .collect();

        let mut all: Vec<u64> = consumers
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();

        let expected: Vec<u64> = (0..PRODUCERS * PER_PRODUCER).collect();
        assert_eq!(all, expected);
    }
}
