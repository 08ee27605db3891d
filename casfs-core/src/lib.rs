//! # casfs Core
//!
//! The core library for casfs - a POSIX-like view of a remote,
//! content-addressed network store, mounted through a userspace filesystem
//! interface.
//!
//! ## Overview
//!
//! This crate holds the layer between the filesystem callback dispatch and
//! the network backend. It exists for three reasons:
//!
//! - Attribute lookups happen on almost every path resolution, and each one
//!   is a high-latency network round-trip when served naively. The
//!   result-reference cache answers repeats without touching the network.
//! - The backend invalidates metadata out-of-band whenever a write, delete
//!   or rename goes through any path. The cache holds references into the
//!   backend's own result slots instead of copies, so those invalidations
//!   take effect here automatically.
//! - The store cannot represent an empty directory. The overlay synthesizes
//!   them for the life of a mount session, and dissolves each one the
//!   moment real content appears beneath it.
//!
//! ## Basic Usage
//!
//! ```rust,ignore
//! use casfs_core::{VfsCache, VfsPath};
//!
//! async fn example(cache: &VfsCache<impl casfs_core::StoreBackend>) {
//!     let path = VfsPath::from("/docs/report.txt");
//!     cache.getattr(&path, |code, attr| {
//!         // forward (code, attr) to the kernel interface
//!         let _ = (code, attr);
//!     }).await;
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`cache`]: the per-mount [`VfsCache`] orchestrating every operation
//! - [`overlay`]: session-scoped virtual directories
//! - [`translate`]: backend record to kernel attribute translation
//! - [`backend`]: the store collaborator traits and shared result slots
//! - [`types`]: paths, attribute records, reply envelopes, mount options
//! - [`error`]: error types and errno mapping
//! - [`stats`]: cache counters
//!
//! Network I/O, file content transfer and mount lifecycle live with the
//! collaborators behind [`backend::StoreBackend`]; nothing in this crate
//! opens a socket.

pub mod backend;
pub mod cache;
pub mod error;
pub mod overlay;
pub mod stats;
pub mod translate;
pub mod types;

pub use backend::{Container, ResultHolder, ResultRef, ResultsMap, StoreBackend};
pub use cache::VfsCache;
pub use error::{Result, VfsError};
pub use overlay::DirectoryOverlay;
pub use types::{FileAttr, FuseReply, MountOptions, VfsPath};
