/// Resolution cache: memoised translation of raw stat fields into the
/// display strings used by the human-readable output layout.
///
/// Three tables fill lazily (users, groups, dates) through
/// [`ConcurrentMap::get_or_insert_with`], so an id or a calendar day is
/// resolved at most once per cache. Two tables are built eagerly at
/// construction because their key space is tiny: the seven file-type
/// constants and the 512 permission combinations.
///
/// The cache is an ordinary value: construct one and share it with an
/// `Arc`, or use [`ResolutionCache::global`] for the lazily-built
/// process-wide instance.
pub mod identity;

pub use identity::{IdentityResolver, SystemIdentity};

use crate::sync::ConcurrentMap;
use chrono::{Local, NaiveTime, TimeZone};
use compact_str::{format_compact, CompactString};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Display string for anything that cannot be resolved.
pub const UNKNOWN: &str = "UNKNOWN";

/// Mask applied by default in [`ResolutionCache::permission_string`].
pub const FULL_PERMISSION_MASK: u32 = 0o777;

const FILE_TYPES: [(libc::mode_t, &str); 7] = [
    (libc::S_IFBLK, "BDEV"),
    (libc::S_IFCHR, "CDEV"),
    (libc::S_IFDIR, "DIR"),
    (libc::S_IFIFO, "PIPE"),
    (libc::S_IFLNK, "LINK"),
    (libc::S_IFREG, "FILE"),
    (libc::S_IFSOCK, "SOCK"),
];

static GLOBAL: OnceLock<Arc<ResolutionCache>> = OnceLock::new();

pub struct ResolutionCache {
    users: ConcurrentMap<u32, CompactString>,
    groups: ConcurrentMap<u32, CompactString>,
    /// Keyed by the local calendar day's midnight, as a naive timestamp.
    dates: ConcurrentMap<i64, CompactString>,
    file_types: HashMap<u32, &'static str>,
    /// Index = permission bits (0..=0o777).
    permissions: Vec<CompactString>,
    resolver: Box<dyn IdentityResolver>,
}

impl ResolutionCache {
    /// Create a cache that resolves names through the system databases.
    pub fn new() -> Self {
        Self::with_resolver(SystemIdentity)
    }

    /// Create a cache with a custom identity resolver.
    pub fn with_resolver<R: IdentityResolver + 'static>(resolver: R) -> Self {
        let file_types = FILE_TYPES
            .iter()
            .map(|&(bits, label)| (bits as u32, label))
            .collect();

        let permissions = (0..=FULL_PERMISSION_MASK)
            .map(|bits| {
                let user = (bits & 0o700) >> 6;
                let group = (bits & 0o070) >> 3;
                let other = bits & 0o007;
                format_compact!("{user}{group}{other}")
            })
            .collect();

        Self {
            users: ConcurrentMap::new(),
            groups: ConcurrentMap::new(),
            dates: ConcurrentMap::new(),
            file_types,
            permissions,
            resolver: Box::new(resolver),
        }
    }

    /// The process-wide cache, built on first use and never torn down.
    pub fn global() -> Arc<Self> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::new())))
    }

    /// Format `epoch_secs` as the local date `YYYY-MM-DD`.
    ///
    /// All timestamps falling on the same local day share one cache entry.
    pub fn date_string(&self, epoch_secs: i64) -> CompactString {
        let Some(local) = Local.timestamp_opt(epoch_secs, 0).earliest() else {
            return CompactString::const_new(UNKNOWN);
        };
        let day = local.date_naive();
        let midnight = day.and_time(NaiveTime::MIN).and_utc().timestamp();

        self.dates
            .get_or_insert_with(midnight, || format_compact!("{}", day.format("%Y-%m-%d")))
    }

    /// Resolve `uid` to a user name, or `"UNKNOWN"`. Failures are cached too.
    pub fn username(&self, uid: u32) -> CompactString {
        self.users.get_or_insert_with(uid, || {
            self.resolver
                .user_name(uid)
                .map(CompactString::from)
                .unwrap_or(CompactString::const_new(UNKNOWN))
        })
    }

    /// Resolve `gid` to a group name, or `"UNKNOWN"`. Failures are cached too.
    pub fn groupname(&self, gid: u32) -> CompactString {
        self.groups.get_or_insert_with(gid, || {
            self.resolver
                .group_name(gid)
                .map(CompactString::from)
                .unwrap_or(CompactString::const_new(UNKNOWN))
        })
    }

    /// Label for the file-type bits of `mode`: one of `BDEV`, `CDEV`, `DIR`,
    /// `PIPE`, `LINK`, `FILE`, `SOCK`, or `UNKNOWN`.
    pub fn file_type(&self, mode: u32) -> &'static str {
        let bits = mode & (libc::S_IFMT as u32);
        self.file_types.get(&bits).copied().unwrap_or(UNKNOWN)
    }

    /// Three octal digits (owner, group, other) of `mode & parent_mask`.
    pub fn permission_string(&self, mode: u32, parent_mask: u32) -> &str {
        let bits = mode & parent_mask & FULL_PERMISSION_MASK;
        &self.permissions[bits as usize]
    }

    pub fn cached_users(&self) -> usize {
        self.users.len()
    }

    pub fn cached_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn cached_dates(&self) -> usize {
        self.dates.len()
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionCache")
            .field("users", &self.users.len())
            .field("groups", &self.groups.len())
            .field("dates", &self.dates.len())
            .finish_non_exhaustive()
    }
}
