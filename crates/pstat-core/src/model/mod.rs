/// Data model for the traversal pipeline.
///
/// - [`StatRecord`]: one per filesystem entry, produced by a walker thread.
/// - [`SkipSet`]: hash-based denylist consulted before an entry is recorded.
pub mod record;
pub mod skip;

pub use record::StatRecord;
pub use skip::SkipSet;
