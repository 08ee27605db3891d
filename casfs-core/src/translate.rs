//! Translation from backend attribute records to kernel-facing replies.

use tracing::debug;

use crate::types::{
    EntryKind, FileAttr, FuseReply, ItemAttributes, Ownership, VfsPath, MODE_DIR, MODE_FILE,
};

/// Converts a backend attribute record into a getattr reply.
///
/// Pure and synchronous. Every content-bearing kind maps to success with
/// timestamps and size copied through, a link count of 1, fixed mode bits
/// chosen by `is_file`, and the given owner identity. `NotFound` maps to the
/// default not-found envelope. The match is exhaustive over [`EntryKind`],
/// so a new backend kind cannot fall through silently.
pub fn translate(path: &VfsPath, record: &ItemAttributes, owner: Ownership) -> FuseReply {
    match record.entry_kind {
        EntryKind::File
        | EntryKind::OpaqueContainer
        | EntryKind::FsContainer
        | EntryKind::ServicesContainer
        | EntryKind::DefaultContainer
        | EntryKind::VirtualDirectory => {
            debug!(path = %path, kind = ?record.entry_kind, "translated attributes");
            FuseReply::ok_attr(FileAttr {
                mtime: record.modified,
                atime: record.accessed,
                ctime: record.created,
                size: record.size,
                nlink: 1,
                mode: if record.is_file { MODE_FILE } else { MODE_DIR },
                uid: owner.uid,
                gid: owner.gid,
            })
        }
        EntryKind::NotFound => {
            debug!(path = %path, "no backend entry");
            FuseReply::default()
        }
    }
}
