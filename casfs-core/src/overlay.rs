//! Virtual directories overlaid on the container-backed filesystem.
//!
//! The network store discards a directory the moment its last entry is
//! removed, so an empty directory cannot exist on the backend at all. This
//! overlay keeps session-scoped markers for such directories and intercepts
//! the operations that would otherwise hit the backend and find nothing.
//!
//! Every check is a cheap in-memory decision; the overlay never suspends.

use dashmap::DashMap;

use crate::translate::translate;
use crate::types::{FuseReply, ItemAttributes, Ownership, VfsPath, MAX_ANCESTOR_WALK};

/// Marker state for one synthesized directory.
///
/// Deliberately a one-variant enum rather than a bare `bool`: the map's
/// value answers "what do we know about this directory", and today the only
/// answer is that it exists with unknown content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualDirState {
    /// The directory exists; nothing is cached about its contents.
    ExistsUnknownContent,
}

/// Session-scoped map of synthesized directories.
///
/// Removing the last child of a real directory makes the directory itself
/// vanish from the backend, propagating upward. The ancestor walks here
/// mirror that: clearing a marker also clears any contiguous run of marked
/// ancestors.
#[derive(Debug)]
pub struct DirectoryOverlay {
    directories: DashMap<VfsPath, VirtualDirState>,
    max_walk_depth: usize,
}

impl Default for DirectoryOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryOverlay {
    /// Creates an empty overlay with the default walk bound.
    pub fn new() -> Self {
        Self::with_max_depth(MAX_ANCESTOR_WALK)
    }

    /// Creates an empty overlay with an explicit ancestor-walk bound.
    pub fn with_max_depth(max_walk_depth: usize) -> Self {
        Self {
            directories: DashMap::new(),
            max_walk_depth,
        }
    }

    /// True if `path` currently has a virtual marker.
    pub fn is_virtual(&self, path: &VfsPath) -> bool {
        self.directories.contains_key(path)
    }

    /// Number of marked directories.
    pub fn len(&self) -> usize {
        self.directories.len()
    }

    /// True if no directories are marked.
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }

    /// Marks `path` as an existing directory with unknown content.
    ///
    /// Always succeeds; the callback layer only issues mkdir for a path that
    /// does not exist yet.
    pub fn mkdir(&self, path: &VfsPath) -> FuseReply {
        self.directories
            .insert(path.clone(), VirtualDirState::ExistsUnknownContent);
        FuseReply::ok()
    }

    /// Clears the marker at `path` and any contiguous run of marked
    /// ancestors above it.
    ///
    /// Always succeeds; the callback layer only issues rmdir for an empty
    /// directory.
    pub fn rmdir(&self, path: &VfsPath) -> FuseReply {
        self.clear_upward(path);
        FuseReply::ok()
    }

    /// Empty listing if `path` is marked, otherwise not handled.
    pub fn readdir(&self, path: &VfsPath) -> Option<FuseReply> {
        if self.is_virtual(path) {
            Some(FuseReply::ok_entries(Vec::new()))
        } else {
            None
        }
    }

    /// Synthesized directory attributes if `path` is marked, otherwise not
    /// handled.
    pub fn getattr(&self, path: &VfsPath, owner: Ownership) -> Option<FuseReply> {
        if self.is_virtual(path) {
            Some(translate(path, &ItemAttributes::virtual_directory(), owner))
        } else {
            None
        }
    }

    /// Moves the marker from `old_path` to `new_path` if present, otherwise
    /// not handled.
    ///
    /// Virtual descendants are not renamed along: virtual directories carry
    /// no children with identity of their own beyond the ancestor-walk
    /// relationship.
    pub fn rename(&self, old_path: &VfsPath, new_path: &VfsPath) -> Option<FuseReply> {
        match self.directories.remove(old_path) {
            Some((_, state)) => {
                self.directories.insert(new_path.clone(), state);
                Some(FuseReply::ok())
            }
            None => None,
        }
    }

    /// Called when a file is being created at `path`: the parent directory
    /// is about to gain real backend-visible content, so its marker (and any
    /// marked ancestors) must stop being synthesized.
    ///
    /// The open itself is never handled here; it always goes to the backend.
    ///
    /// Assumes the kernel will not query attributes or listings for the
    /// parent between the create call and its completion. That ordering is
    /// not enforced.
    pub fn open_for_create(&self, path: &VfsPath) -> Option<FuseReply> {
        if let Some(parent) = path.parent() {
            self.clear_upward(&parent);
        }
        None
    }

    /// Clears markers from `start` upward while each path is marked,
    /// stopping at the mount root or the walk bound.
    fn clear_upward(&self, start: &VfsPath) {
        let mut current = start.clone();
        for _ in 0..self.max_walk_depth {
            if self.directories.remove(&current).is_none() {
                break;
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
    }
}
