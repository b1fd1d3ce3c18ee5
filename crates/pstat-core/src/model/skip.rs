/// Hash-based skip set: the denylist of paths excluded from traversal.
///
/// Only the 64-bit hash of each normalised path is stored, so a lookup is a
/// single hash plus a set probe regardless of how long the skip list is. The
/// price is a ~1/2^64 chance that an unrelated path collides with a listed one
/// and is skipped too. That trade-off is deliberate; do not "fix" it by
/// storing the paths.
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::Hasher;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Hash function applied to the normalised path bytes.
pub type PathHashFn = fn(&[u8]) -> u64;

/// SipHash with fixed keys: the same path hashes identically in every run.
pub fn default_path_hash(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    hasher.write(bytes);
    hasher.finish()
}

#[derive(Debug, Clone)]
pub struct SkipSet {
    hashes: HashSet<u64>,
    hash_fn: PathHashFn,
}

impl SkipSet {
    /// Build a skip set from absolute paths using [`default_path_hash`].
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self::with_hash_fn(paths, default_path_hash)
    }

    /// Build a skip set with a caller-supplied hash function.
    pub fn with_hash_fn<I, P>(paths: I, hash_fn: PathHashFn) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let hashes = paths
            .into_iter()
            .map(|p| hash_fn(normalise(p.as_ref())))
            .collect();
        Self { hashes, hash_fn }
    }

    /// `true` if the hash of `path` matches a listed path's hash.
    #[inline]
    pub fn contains(&self, path: &Path) -> bool {
        !self.hashes.is_empty() && self.hashes.contains(&(self.hash_fn)(normalise(path)))
    }

    /// Number of distinct hashes (not paths: colliding paths count once).
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

impl Default for SkipSet {
    fn default() -> Self {
        Self::new(std::iter::empty::<&Path>())
    }
}

/// Path bytes with trailing separators removed (the root `/` is kept).
fn normalise(path: &Path) -> &[u8] {
    let mut bytes = path.as_os_str().as_bytes();
    while bytes.len() > 1 && bytes.ends_with(b"/") {
        bytes = &bytes[..bytes.len() - 1];
    }
    bytes
}
