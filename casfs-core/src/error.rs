//! Error types for the casfs core.

use thiserror::Error;

use crate::types::VfsPath;

/// `ENOENT`: no such entry.
pub const ENOENT: i32 = 2;

/// `EIO`: generic I/O error, used for internal inconsistencies.
pub const EIO: i32 = 5;

/// `EREMOTEIO`: the network store failed to complete a call.
pub const EREMOTEIO: i32 = 121;

/// Errors raised inside the cache/overlay core.
///
/// None of these escape a public entry point: each operation catches at its
/// boundary and replies with an error envelope instead.
#[derive(Debug, Error)]
pub enum VfsError {
    /// The path has no backend entry and no virtual marker.
    #[error("path not found: {path}")]
    NotFound {
        path: VfsPath,
    },

    /// A backend call failed; the cause is opaque to this core.
    #[error("backend call failed for {path}: {reason}")]
    Backend {
        path: VfsPath,
        reason: String,
    },

    /// A result reference pointed at a cache slot the backend has dropped.
    #[error("stale result reference for {path}")]
    StaleRef {
        path: VfsPath,
    },

    /// The caller supplied a path this core cannot key on.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        path: String,
        reason: String,
    },
}

impl VfsError {
    /// The POSIX error number reported to the kernel interface.
    pub fn errno(&self) -> i32 {
        match self {
            VfsError::NotFound { .. } => ENOENT,
            VfsError::Backend { .. } => EREMOTEIO,
            VfsError::StaleRef { .. } => EIO,
            VfsError::InvalidPath { .. } => ENOENT,
        }
    }
}

/// Result type alias for casfs core operations.
pub type Result<T> = std::result::Result<T, VfsError>;
