/// pstat Core: parallel traversal engine, resolution caches, and data model.
///
/// This crate contains all of the stat-collection logic with zero CLI
/// dependencies. Frontends (the `pstat` binary, tests, other tools) construct
/// a [`walker::Walker`], watch its progress counter, and halt it.
///
/// # Modules
///
/// - [`sync`]: Lock-guarded concurrent queue and map primitives.
/// - [`resolve`]: Memoising translation of uid/gid/mode/timestamps to display strings.
/// - [`model`]: Stat records and the hash-based skip set.
/// - [`walker`]: Walker/output thread pools, CSV record sink, and the halt protocol.
/// - [`stopwatch`]: Elapsed-time measurement for throughput reporting.
pub mod error;
pub mod model;
pub mod resolve;
pub mod stopwatch;
pub mod sync;
pub mod walker;

pub use error::{PstatError, Result};
