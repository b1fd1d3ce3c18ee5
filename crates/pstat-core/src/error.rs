/// Error types for the pstat core engine.
///
/// Per-entry and per-directory failures are never errors: they are logged,
/// counted, and the traversal carries on. Only configuration problems, thread
/// start-up failures, and a broken output sink reach the caller.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PstatError {
    /// The output sink rejected a write or flush.
    #[error("output sink error: {0}")]
    Sink(#[from] csv::Error),

    /// Invalid walker configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The OS refused to start a worker thread.
    #[error("failed to spawn {role} thread: {source}")]
    ThreadSpawn {
        role: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked before it could be joined cleanly.
    #[error("{0} thread panicked")]
    WorkerPanicked(&'static str),
}

pub type Result<T> = std::result::Result<T, PstatError>;
