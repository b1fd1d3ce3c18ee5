/// Concurrency primitives shared by the walker pools and the resolution cache.
///
/// Both types wrap a standard collection in a single `parking_lot::Mutex`.
/// Critical sections are a handful of instructions long, so contention stays
/// bounded even with dozens of walker threads hammering the same queue.
pub mod map;
pub mod queue;

pub use map::ConcurrentMap;
pub use queue::ConcurrentQueue;
