/// Thread bodies for the two pools and the state they share.
///
/// Walker threads pop directories, enumerate them, and push stat records.
/// Output threads pop stat records and write them to the sink. Neither pool
/// ever blocks on a queue: a miss is followed by `yield_now` and another poll.
use crate::model::{SkipSet, StatRecord};
use crate::sync::ConcurrentQueue;
use crate::walker::output::RecordWriter;
use crate::Result;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::thread;
use tracing::{debug, error, warn};

/// Everything the walker and output threads touch, owned by one `Arc`.
pub(crate) struct Shared {
    pub(crate) directories: ConcurrentQueue<PathBuf>,
    pub(crate) records: ConcurrentQueue<StatRecord>,
    skip: SkipSet,
    pub(crate) sink: Mutex<RecordWriter>,

    /// Walker threads exit when this is set.
    halted: AtomicBool,
    /// Output threads drain and exit when this is set. Raised only after every
    /// walker has been joined, so no record can arrive after the final drain.
    draining: AtomicBool,
    /// Set by an output thread whose write failed. Walkers stop queueing
    /// records that could never be written.
    sink_failed: AtomicBool,

    pub(crate) total_stated: AtomicU64,
    pub(crate) failed_stats: AtomicU64,
    pub(crate) failed_dirs: AtomicU64,
    /// Directories queued or being enumerated.
    pub(crate) pending_dirs: AtomicUsize,
}

impl Shared {
    pub(crate) fn new(skip: SkipSet, sink: RecordWriter) -> Self {
        Self {
            directories: ConcurrentQueue::new(),
            records: ConcurrentQueue::new(),
            skip,
            sink: Mutex::new(sink),
            halted: AtomicBool::new(false),
            draining: AtomicBool::new(false),
            sink_failed: AtomicBool::new(false),
            total_stated: AtomicU64::new(0),
            failed_stats: AtomicU64::new(0),
            failed_dirs: AtomicU64::new(0),
            pending_dirs: AtomicUsize::new(0),
        }
    }

    pub(crate) fn halt_walkers(&self) {
        self.halted.store(true, Ordering::Release);
    }

    pub(crate) fn drain_outputs(&self) {
        self.draining.store(true, Ordering::Release);
    }

    pub(crate) fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    /// Queue `dir` for enumeration.
    pub(crate) fn enqueue_dir(&self, dir: PathBuf) {
        self.pending_dirs.fetch_add(1, Ordering::AcqRel);
        self.directories.push(dir);
    }

    /// `lstat` one entry and queue its record, failed or not.
    pub(crate) fn stat_entry(&self, path: PathBuf) {
        let record = match fs::symlink_metadata(&path) {
            Ok(meta) => StatRecord::from_metadata(path, &meta),
            Err(err) => {
                self.failed_stats.fetch_add(1, Ordering::Relaxed);
                warn!(path = %path.display(), error = %err, "stat failed; recording zeroed entry");
                StatRecord::failed(path)
            }
        };

        self.total_stated.fetch_add(1, Ordering::Relaxed);
        if !self.sink_failed.load(Ordering::Relaxed) {
            self.records.push(record);
        }
    }

    /// Stat every entry of `dir`, queueing sub-directories as they are found.
    fn enumerate(&self, dir: &Path) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                self.failed_dirs.fetch_add(1, Ordering::Relaxed);
                warn!(path = %dir.display(), error = %err, "cannot open directory; subtree skipped");
                return;
            }
        };

        // read_dir never yields "." or "..".
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(path = %dir.display(), error = %err, "error while reading directory");
                    continue;
                }
            };

            let path = entry.path();
            if self.skip.contains(&path) {
                continue;
            }

            // Type as reported by readdir; symlinks to directories are not followed.
            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                self.enqueue_dir(path.clone());
            }

            self.stat_entry(path);
        }
    }

    fn write_record(&self, record: &StatRecord) -> Result<()> {
        self.sink.lock().write(record)
    }

    fn fail_sink(&self) {
        self.sink_failed.store(true, Ordering::Release);
    }

    fn is_sink_failed(&self) -> bool {
        self.sink_failed.load(Ordering::Acquire)
    }
}

/// Walker thread: POLLING → (HALTED | HAS_TASK). Abandons queued work on halt.
pub(crate) fn walker_loop(shared: &Shared, id: usize) {
    debug!("walker {id} started");
    loop {
        let dir = loop {
            if shared.is_halted() {
                debug!("walker {id} halted");
                return;
            }
            match shared.directories.try_pop() {
                Some(dir) => break dir,
                None => thread::yield_now(),
            }
        };

        shared.enumerate(&dir);
        shared.pending_dirs.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Output thread: writes records until draining is requested, then empties
/// the record queue and exits. Returns the number of rows it wrote.
///
/// A write failure ends this thread and is returned to `halt()`. The other
/// output threads then stop too, leaving the broken writer untouched.
pub(crate) fn output_loop(shared: &Shared, id: usize) -> Result<u64> {
    debug!("output {id} started");
    let mut written: u64 = 0;

    loop {
        // Sample the flag before draining: once it is seen set, one more full
        // pass is guaranteed to see every record that will ever be queued.
        let draining = shared.draining.load(Ordering::Acquire);

        loop {
            if shared.is_sink_failed() {
                debug!("output {id} stopping: sink failed elsewhere");
                return Ok(written);
            }
            let Some(record) = shared.records.try_pop() else {
                break;
            };
            if let Err(err) = shared.write_record(&record) {
                shared.fail_sink();
                error!(error = %err, "output {id}: write failed; stopping");
                return Err(err);
            }
            written += 1;
        }

        if draining {
            debug!("output {id} drained after {written} rows");
            return Ok(written);
        }
        thread::yield_now();
    }
}
