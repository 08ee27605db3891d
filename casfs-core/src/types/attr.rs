//! Backend attribute records and their kernel-facing translation targets.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Mode bits reported for regular files (`-rw-r--r--`).
pub const MODE_FILE: u32 = 0o100_644;

/// Mode bits reported for directories (`drwxr-xr-x`).
pub const MODE_DIR: u32 = 0o040_755;

/// Classification the backend assigns to a path's target.
///
/// This is a closed set on purpose: the translator matches exhaustively, so
/// a backend that grows a new kind forces a compile error here instead of
/// silently falling through at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// A regular file stored in the network.
    File,
    /// An opaque container with no interpreted structure.
    OpaqueContainer,
    /// A container holding filesystem entries.
    FsContainer,
    /// The container listing a user's published services.
    ServicesContainer,
    /// A user's default root container.
    DefaultContainer,
    /// A directory synthesized by the overlay; never stored in the network.
    VirtualDirectory,
    /// The backend has no entry for this path.
    NotFound,
}

impl EntryKind {
    /// True for every kind that maps to a live filesystem entry.
    pub fn is_content_bearing(&self) -> bool {
        !matches!(self, EntryKind::NotFound)
    }
}

/// The backend-neutral metadata record computed by a container.
///
/// This is what `Container::item_attributes_ref` exposes through a
/// [`ResultRef`](crate::backend::ResultRef); the translator turns it into a
/// [`FileAttr`] for the kernel interface.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemAttributes {
    /// Last modification time.
    pub modified: SystemTime,
    /// Last access time.
    pub accessed: SystemTime,
    /// Creation time.
    pub created: SystemTime,
    /// Size in bytes.
    pub size: u64,
    /// Backend content version, `-1` when the record was synthesized locally.
    pub version: i64,
    /// Whether the entry is a regular file.
    pub is_file: bool,
    /// The backend's classification of the entry.
    pub entry_kind: EntryKind,
}

impl ItemAttributes {
    /// The record synthesized for an overlay directory: current time on all
    /// three timestamps, size zero, directory-shaped.
    pub fn virtual_directory() -> Self {
        let now = SystemTime::now();
        Self {
            modified: now,
            accessed: now,
            created: now,
            size: 0,
            version: -1,
            is_file: false,
            entry_kind: EntryKind::VirtualDirectory,
        }
    }

    /// The record for a path the backend knows nothing about.
    pub fn not_found() -> Self {
        let now = SystemTime::now();
        Self {
            modified: now,
            accessed: now,
            created: now,
            size: 0,
            version: -1,
            is_file: false,
            entry_kind: EntryKind::NotFound,
        }
    }
}

/// Attributes in the shape the kernel filesystem interface expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FileAttr {
    /// Last modification time.
    pub mtime: SystemTime,
    /// Last access time.
    pub atime: SystemTime,
    /// Creation time.
    pub ctime: SystemTime,
    /// Size in bytes.
    pub size: u64,
    /// Hard link count, always 1 for network-backed entries.
    pub nlink: u32,
    /// File mode bits ([`MODE_FILE`] or [`MODE_DIR`]).
    pub mode: u32,
    /// Owning user id.
    pub uid: u32,
    /// Owning group id.
    pub gid: u32,
}

impl FileAttr {
    /// True if the mode bits mark a directory.
    pub fn is_dir(&self) -> bool {
        self.mode & 0o170_000 == 0o040_000
    }
}

/// The identity reported as owner of every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    /// Owning user id.
    pub uid: u32,
    /// Owning group id.
    pub gid: u32,
}

impl Ownership {
    /// The current process identity, or 0/0 where the platform has none.
    pub fn current() -> Self {
        #[cfg(unix)]
        {
            Self {
                uid: unsafe { libc::getuid() },
                gid: unsafe { libc::getgid() },
            }
        }
        #[cfg(not(unix))]
        {
            Self { uid: 0, gid: 0 }
        }
    }
}
