/// A single stat record: the path of an entry plus the raw `lstat` fields
/// the output layouts need.
///
/// Records are created by walker threads, moved through the record queue,
/// and consumed by exactly one output thread. They are never mutated.
use std::fs::Metadata;
use std::os::unix::fs::MetadataExt;
use std::path::PathBuf;

/// Size of the unit `st_blocks` is counted in, regardless of filesystem.
pub const BLOCK_SIZE: u64 = 512;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatRecord {
    /// Full path of the entry as discovered (not canonicalised).
    pub path: PathBuf,
    pub device_id: u64,
    pub inode: u64,
    pub link_count: u64,
    /// Last access time, seconds since the Unix epoch.
    pub access_time: i64,
    /// Last modification time, seconds since the Unix epoch.
    pub modify_time: i64,
    pub uid: u32,
    pub gid: u32,
    /// Full `st_mode`: file-type bits plus permission bits.
    pub mode: u32,
    /// Logical size in bytes.
    pub size: u64,
    /// Allocated 512-byte blocks.
    pub blocks: u64,
    /// `false` if the `lstat` call failed; every numeric field is then zero.
    pub stat_ok: bool,
}

impl StatRecord {
    /// Build a record from `lstat` metadata (`fs::symlink_metadata`).
    pub fn from_metadata(path: PathBuf, meta: &Metadata) -> Self {
        Self {
            path,
            device_id: meta.dev(),
            inode: meta.ino(),
            link_count: meta.nlink(),
            access_time: meta.atime(),
            modify_time: meta.mtime(),
            uid: meta.uid(),
            gid: meta.gid(),
            mode: meta.mode(),
            size: meta.size(),
            blocks: meta.blocks(),
            stat_ok: true,
        }
    }

    /// Placeholder for an entry that was discovered but could not be stated.
    ///
    /// The entry still produces a row so the inventory never silently shrinks.
    pub fn failed(path: PathBuf) -> Self {
        Self {
            path,
            ..Self::default()
        }
    }

    /// Bytes actually allocated on disk.
    pub fn disk_bytes(&self) -> u64 {
        self.blocks.saturating_mul(BLOCK_SIZE)
    }

    /// The `INODE` column: `device_id-inode`.
    pub fn inode_key(&self) -> String {
        format!("{}-{}", self.device_id, self.inode)
    }
}
