//! Path keys for the cache and overlay maps.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Upper bound on any upward ancestor walk.
///
/// The walks in the overlay terminate when they run out of markers or reach
/// the mount root; the bound keeps them finite even on malformed input.
pub const MAX_ANCESTOR_WALK: usize = 128;

/// A normalized absolute path used as the key into every per-mount map.
///
/// Uniqueness is exact string equality. No `.`/`..` canonicalization happens
/// here: the callback layer hands us paths the kernel already resolved.
/// Construction only guarantees a leading `/` and no trailing `/` (except
/// for the root itself).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VfsPath(String);

impl VfsPath {
    /// Creates a path, enforcing the leading-slash / no-trailing-slash form.
    pub fn new(path: impl Into<String>) -> Self {
        let raw = path.into();
        let mut normalized = if raw.starts_with('/') {
            raw
        } else {
            format!("/{}", raw)
        };
        while normalized.len() > 1 && normalized.ends_with('/') {
            normalized.pop();
        }
        Self(normalized)
    }

    /// The mount root.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the mount root.
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// The parent path, or `None` at the mount root.
    pub fn parent(&self) -> Option<VfsPath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(VfsPath::root()),
            Some(idx) => Some(VfsPath(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// The final path component, empty only for the root.
    pub fn file_name(&self) -> &str {
        self.0.rfind('/').map_or("", |idx| &self.0[idx + 1..])
    }

    /// Appends a single component.
    pub fn join(&self, name: &str) -> VfsPath {
        let name = name.trim_matches('/');
        if self.is_root() {
            VfsPath(format!("/{}", name))
        } else {
            VfsPath(format!("{}/{}", self.0, name))
        }
    }

    /// Number of components below the root.
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.0.matches('/').count()
        }
    }
}

impl From<&str> for VfsPath {
    fn from(path: &str) -> Self {
        VfsPath::new(path)
    }
}

impl From<String> for VfsPath {
    fn from(path: String) -> Self {
        VfsPath::new(path)
    }
}

impl fmt::Display for VfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
