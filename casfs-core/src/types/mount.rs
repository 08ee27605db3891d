//! Mount-session options and handles.

use uuid::Uuid;

use crate::types::path::MAX_ANCESTOR_WALK;
use crate::types::{Ownership, VfsPath};

/// Options controlling one mount session's cache and overlay.
#[derive(Debug, Clone)]
pub struct MountOptions {
    /// Whether the mount rejects mutating operations.
    pub read_only: bool,

    /// Identity reported as owner of every entry.
    /// `None` means use the current process identity.
    pub ownership: Option<Ownership>,

    /// Bound on upward ancestor walks in the overlay.
    pub max_walk_depth: usize,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            read_only: false,
            ownership: None,
            max_walk_depth: MAX_ANCESTOR_WALK,
        }
    }
}

impl MountOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new builder.
    pub fn builder() -> MountOptionsBuilder {
        MountOptionsBuilder::new()
    }
}

/// Builder for [`MountOptions`] with a fluent interface.
pub struct MountOptionsBuilder {
    options: MountOptions,
}

impl MountOptionsBuilder {
    /// Creates a builder with default options.
    pub fn new() -> Self {
        Self {
            options: MountOptions::default(),
        }
    }

    /// Sets the read-only flag.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.options.read_only = read_only;
        self
    }

    /// Overrides the reported owner identity.
    pub fn ownership(mut self, ownership: Ownership) -> Self {
        self.options.ownership = Some(ownership);
        self
    }

    /// Overrides the ancestor-walk bound.
    pub fn max_walk_depth(mut self, depth: usize) -> Self {
        self.options.max_walk_depth = depth;
        self
    }

    /// Builds the final options.
    pub fn build(self) -> MountOptions {
        self.options
    }
}

impl Default for MountOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifies one live mount session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountHandle {
    id: Uuid,
    mount_point: VfsPath,
}

impl MountHandle {
    /// Creates a handle for a mount at the given point.
    pub fn new(mount_point: VfsPath) -> Self {
        Self {
            id: Uuid::new_v4(),
            mount_point,
        }
    }

    /// The unique id of this mount session.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Where the session is mounted.
    pub fn mount_point(&self) -> &VfsPath {
        &self.mount_point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let options = MountOptions::builder()
            .read_only(true)
            .ownership(Ownership { uid: 1000, gid: 100 })
            .max_walk_depth(16)
            .build();
        assert!(options.read_only);
        assert_eq!(options.ownership.unwrap().uid, 1000);
        assert_eq!(options.max_walk_depth, 16);
    }

    #[test]
    fn test_defaults() {
        let options = MountOptions::new();
        assert!(!options.read_only);
        assert!(options.ownership.is_none());
        assert_eq!(options.max_walk_depth, MAX_ANCESTOR_WALK);
    }

    #[test]
    fn test_mount_handle_identity() {
        let a = MountHandle::new(VfsPath::from("/mnt/store"));
        let b = MountHandle::new(VfsPath::from("/mnt/store"));
        assert_ne!(a.id(), b.id());
        assert_eq!(a.mount_point().as_str(), "/mnt/store");
    }
}
