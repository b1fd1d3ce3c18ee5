/// Walker: the parallel traversal engine.
///
/// A `Walker` owns a directory queue, a stat-record queue, a pool of walker
/// threads, a pool of output threads, and the CSV sink. Construction stats the
/// root, seeds the directory queue, and starts both pools; from then on the
/// caller only watches [`Walker::total_records`] (and optionally
/// [`Walker::is_walk_complete`]) and eventually calls [`Walker::halt`].
///
/// # Halt protocol
///
/// 1. Raise the halt flag; walker threads exit at their next queue poll.
///    Directories still queued are abandoned.
/// 2. Join every walker thread.
/// 3. Raise the drain flag; output threads write everything left in the
///    record queue, then exit.
/// 4. Join every output thread and flush the sink.
///
/// Dropping an un-halted walker runs the same protocol.
pub mod output;
mod worker;

pub use output::{OutputFormat, RecordWriter, HUMAN_HEADER, RAW_HEADER};

use crate::model::SkipSet;
use crate::resolve::ResolutionCache;
use crate::{PstatError, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};
use worker::Shared;

/// Walker threads used when the caller does not choose.
pub const DEFAULT_WALKER_THREADS: usize = 4;

/// More than one output thread rarely helps: the sink is serialised anyway.
pub const DEFAULT_OUTPUT_THREADS: usize = 1;

/// Everything a walker needs besides its output sink.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Directory (or file) to inventory. Existence is the caller's concern.
    pub root: PathBuf,
    pub skip: SkipSet,
    pub format: OutputFormat,
    pub walker_threads: usize,
    pub output_threads: usize,
    pub cache: Arc<ResolutionCache>,
}

impl WalkerConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            skip: SkipSet::default(),
            format: OutputFormat::Raw,
            walker_threads: DEFAULT_WALKER_THREADS,
            output_threads: DEFAULT_OUTPUT_THREADS,
            cache: ResolutionCache::global(),
        }
    }

    /// Skip these absolute paths (and everything below them).
    pub fn with_skip_list<I, P>(self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.with_skip_set(SkipSet::new(paths))
    }

    pub fn with_skip_set(mut self, skip: SkipSet) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_walker_threads(mut self, n: usize) -> Self {
        self.walker_threads = n;
        self
    }

    pub fn with_output_threads(mut self, n: usize) -> Self {
        self.output_threads = n;
        self
    }

    pub fn with_cache(mut self, cache: Arc<ResolutionCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.walker_threads == 0 {
            return Err(PstatError::Config("walker thread count must be at least 1".into()));
        }
        if self.output_threads == 0 {
            return Err(PstatError::Config("output thread count must be at least 1".into()));
        }
        if self.root.as_os_str().is_empty() {
            return Err(PstatError::Config("root path is empty".into()));
        }
        Ok(())
    }
}

/// Final counters, returned by [`Walker::halt`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WalkSummary {
    /// Entries stated (the final progress counter).
    pub records_stated: u64,
    /// Data rows that reached the sink.
    pub records_written: u64,
    /// Entries whose `lstat` failed; each still produced a zeroed row.
    pub failed_stats: u64,
    /// Directories that could not be opened; their subtrees are missing.
    pub failed_dirs: u64,
    /// Directories still queued when the walk was halted.
    pub abandoned_dirs: u64,
}

pub struct Walker {
    shared: Arc<Shared>,
    walkers: Vec<JoinHandle<()>>,
    outputs: Vec<JoinHandle<Result<u64>>>,
    summary: Option<WalkSummary>,
}

impl Walker {
    /// Write the header to `sink`, stat and queue the root, and start both pools.
    pub fn new<W>(config: WalkerConfig, sink: W) -> Result<Self>
    where
        W: Write + Send + 'static,
    {
        config.validate()?;
        let writer = RecordWriter::new(sink, config.format, Arc::clone(&config.cache))?;
        let shared = Arc::new(Shared::new(config.skip, writer));

        info!(
            root = %config.root.display(),
            walker_threads = config.walker_threads,
            output_threads = config.output_threads,
            format = ?config.format,
            "starting walk"
        );

        // The root is recorded once and seeded before any thread runs.
        shared.stat_entry(config.root.clone());
        if config.root.is_dir() {
            shared.enqueue_dir(config.root.clone());
        }

        let mut walker = Self {
            shared,
            walkers: Vec::with_capacity(config.walker_threads),
            outputs: Vec::with_capacity(config.output_threads),
            summary: None,
        };

        // On a spawn failure, dropping `walker` halts whatever did start.
        for id in 0..config.walker_threads {
            let shared = Arc::clone(&walker.shared);
            let handle = thread::Builder::new()
                .name(format!("pstat-walker-{id}"))
                .spawn(move || worker::walker_loop(&shared, id))
                .map_err(|source| PstatError::ThreadSpawn {
                    role: "walker",
                    source,
                })?;
            walker.walkers.push(handle);
        }

        for id in 0..config.output_threads {
            let shared = Arc::clone(&walker.shared);
            let handle = thread::Builder::new()
                .name(format!("pstat-output-{id}"))
                .spawn(move || worker::output_loop(&shared, id))
                .map_err(|source| PstatError::ThreadSpawn {
                    role: "output",
                    source,
                })?;
            walker.outputs.push(handle);
        }

        Ok(walker)
    }

    /// Entries stated so far. Monotonically non-decreasing; never blocks.
    pub fn total_records(&self) -> u64 {
        self.shared.total_stated.load(Ordering::Relaxed)
    }

    /// `true` once no directory is queued or being enumerated, i.e. the walk
    /// has run out of work on its own. Records may still be waiting to be
    /// written; `halt()` takes care of those.
    pub fn is_walk_complete(&self) -> bool {
        self.shared.pending_dirs.load(Ordering::Acquire) == 0
    }

    /// Directories waiting in the queue right now.
    pub fn queued_dirs(&self) -> usize {
        self.shared.directories.len()
    }

    pub fn is_halted(&self) -> bool {
        self.summary.is_some()
    }

    /// Stop both pools, write every pending record, and flush the sink.
    ///
    /// Blocks until shutdown is complete. A second call returns the stored
    /// summary without doing anything.
    pub fn halt(&mut self) -> Result<WalkSummary> {
        if let Some(summary) = &self.summary {
            return Ok(summary.clone());
        }

        let mut first_err: Option<PstatError> = None;

        self.shared.halt_walkers();
        for handle in self.walkers.drain(..) {
            if handle.join().is_err() {
                error!("walker thread panicked");
                first_err.get_or_insert(PstatError::WorkerPanicked("walker"));
            }
        }

        self.shared.drain_outputs();
        for handle in self.outputs.drain(..) {
            match handle.join() {
                Ok(Ok(rows)) => debug!("output thread wrote {rows} rows"),
                Ok(Err(err)) => {
                    first_err.get_or_insert(err);
                }
                Err(_) => {
                    error!("output thread panicked");
                    first_err.get_or_insert(PstatError::WorkerPanicked("output"));
                }
            }
        }

        let records_written = {
            let mut sink = self.shared.sink.lock();
            if let Err(err) = sink.flush() {
                error!(error = %err, "failed to flush output");
                first_err.get_or_insert(err);
            }
            sink.rows_written()
        };

        let summary = WalkSummary {
            records_stated: self.total_records(),
            records_written,
            failed_stats: self.shared.failed_stats.load(Ordering::Relaxed),
            failed_dirs: self.shared.failed_dirs.load(Ordering::Relaxed),
            abandoned_dirs: self.shared.directories.len() as u64,
        };
        info!(
            stated = summary.records_stated,
            written = summary.records_written,
            failed_stats = summary.failed_stats,
            failed_dirs = summary.failed_dirs,
            abandoned_dirs = summary.abandoned_dirs,
            "walk halted"
        );
        self.summary = Some(summary.clone());

        match first_err {
            Some(err) => Err(err),
            None => Ok(summary),
        }
    }
}

impl Drop for Walker {
    fn drop(&mut self) {
        if self.summary.is_none() {
            if let Err(err) = self.halt() {
                error!(error = %err, "halt on drop failed");
            }
        }
    }
}
