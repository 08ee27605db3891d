//! The per-mount result-reference cache and its operation entry points.
//!
//! [`VfsCache`] is what the callback layer talks to. For each operation it
//! consults the [`DirectoryOverlay`] first, a synchronous in-memory check,
//! and only when the overlay does not complete the operation does it touch
//! the result-reference cache and, on a miss, the backend.
//!
//! The cache itself stores no metadata. Per path it keeps a [`ResultRef`]
//! into the owning container's result cache and writes translated replies
//! back into the container's own [`ResultHolder`]. Invalidation therefore
//! has exactly one authority: when the container drops a slot, the reply
//! this cache derived from it is gone too, and the next lookup misses.
//!
//! Two concurrent lookups for the same path may both miss and both fetch;
//! the last stored reference wins. That race is benign (both references
//! point at equivalent backend state) and is the price of keeping the maps
//! lock-free from the caller's perspective.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::backend::{ResultRef, StoreBackend};
use crate::error::Result;
use crate::overlay::DirectoryOverlay;
use crate::stats::{CacheStats, StatsSnapshot};
use crate::translate::translate;
use crate::types::{
    FileAttr, FuseOp, FuseReply, MountOptions, OpenFlags, Ownership, ReplyPayload, VfsPath,
};

/// The result-reference cache and virtual-directory overlay for one mount.
pub struct VfsCache<B> {
    backend: Arc<B>,
    overlay: DirectoryOverlay,
    results: DashMap<VfsPath, ResultRef>,
    owner: Ownership,
    stats: CacheStats,
}

impl<B: StoreBackend> VfsCache<B> {
    /// Creates a cache over `backend` with default options.
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_options(backend, MountOptions::default())
    }

    /// Creates a cache over `backend` with explicit mount options.
    pub fn with_options(backend: Arc<B>, options: MountOptions) -> Self {
        Self {
            backend,
            overlay: DirectoryOverlay::with_max_depth(options.max_walk_depth),
            results: DashMap::new(),
            owner: options.ownership.unwrap_or_else(Ownership::current),
            stats: CacheStats::new(),
        }
    }

    /// The overlay, for callers that need direct marker queries.
    pub fn overlay(&self) -> &DirectoryOverlay {
        &self.overlay
    }

    /// Counters for this mount session.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// getattr entry point.
    ///
    /// `reply` is invoked exactly once, on success and on every failure
    /// path; failures surface as `(errno, None)`, never as a fault.
    pub async fn getattr<R>(&self, path: &VfsPath, reply: R)
    where
        R: FnOnce(i32, Option<FileAttr>),
    {
        let result = self.getattr_reply(path).await;
        let attr = match result.payload {
            Some(ReplyPayload::Attr(attr)) => Some(attr),
            _ => None,
        };
        reply(result.code, attr);
    }

    /// getattr as an envelope, shared by the callback wrapper and tests.
    pub async fn getattr_reply(&self, path: &VfsPath) -> FuseReply {
        if let Some(reply) = self.overlay.getattr(path, self.owner) {
            self.stats.record_overlay_hit();
            return reply;
        }

        if let Some(cached) = self.cached_reply(path, FuseOp::GetAttr) {
            debug!(path = %path, "getattr served from result reference");
            self.stats.record_hit();
            return cached;
        }

        self.stats.record_miss();
        match self.fetch_attributes(path).await {
            Ok(reply) => reply,
            Err(err) => {
                self.stats.record_error();
                warn!(path = %path, error = %err, "getattr failed, replying not-found");
                FuseReply::default()
            }
        }
    }

    /// mkdir, completed entirely by the overlay.
    ///
    /// The backend cannot represent an empty directory, so a new directory
    /// starts life as a virtual marker.
    pub fn mkdir_virtual(&self, path: &VfsPath) -> FuseReply {
        debug!(path = %path, "mkdir virtual");
        self.overlay.mkdir(path)
    }

    /// rmdir, completed entirely by the overlay.
    pub fn rmdir_virtual(&self, path: &VfsPath) -> FuseReply {
        debug!(path = %path, "rmdir virtual");
        self.overlay.rmdir(path)
    }

    /// readdir check; `None` means delegate to the backend.
    pub fn readdir_virtual(&self, path: &VfsPath) -> Option<FuseReply> {
        self.overlay.readdir(path)
    }

    /// rename check; `None` means delegate to the backend.
    pub fn rename_virtual(&self, old_path: &VfsPath, new_path: &VfsPath) -> Option<FuseReply> {
        self.overlay.rename(old_path, new_path)
    }

    /// open check, consulted before the backend creates or opens the file.
    ///
    /// A creating open dissolves the virtual markers above `path`; the open
    /// itself is never completed here, so this always returns `None`.
    pub fn open_virtual(&self, path: &VfsPath, flags: OpenFlags) -> Option<FuseReply> {
        if flags.contains(OpenFlags::CREATE) {
            debug!(path = %path, "create dissolves virtual parents");
            self.overlay.open_for_create(path)
        } else {
            None
        }
    }

    /// The fast path: dereference the stored reference and look for a reply
    /// already derived for `op`.
    fn cached_reply(&self, path: &VfsPath, op: FuseOp) -> Option<FuseReply> {
        let result_ref = self.results.get(path)?;
        let holder = result_ref.value().holder()?;
        holder.reply(op)
    }

    /// The miss path: fetch a fresh result reference, translate the record,
    /// and store the reply in the backend's own holder.
    async fn fetch_attributes(&self, path: &VfsPath) -> Result<FuseReply> {
        let container_path = self.backend.prune_mount_path(path);
        let container = self.backend.container(path).await?;

        self.stats.record_backend_call();
        let result_ref = container.item_attributes_ref(&container_path).await?;
        self.results.insert(path.clone(), result_ref.clone());

        let holder = result_ref.holder();
        let reply = match &holder {
            Some(holder) => translate(path, holder.attributes(), self.owner),
            // Invalidated between the fetch and this read; the next lookup
            // will miss and retry.
            None => FuseReply::default(),
        };

        if let Some(holder) = holder {
            holder.store_reply(FuseOp::GetAttr, reply.clone());
        }

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Container, ResultHolder, ResultsMap};
    use crate::error::{VfsError, ENOENT};
    use crate::types::{EntryKind, ItemAttributes, MODE_DIR, MODE_FILE};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Mutex;
    use std::time::SystemTime;

    /// Container double backed by a real ResultsMap, so tests can exercise
    /// backend-side invalidation by mutating the map directly.
    struct StubContainer {
        results: ResultsMap,
        attrs: Mutex<HashMap<String, ItemAttributes>>,
        calls: AtomicU64,
        fail: AtomicBool,
    }

    impl StubContainer {
        fn new() -> Self {
            Self {
                results: ResultsMap::default(),
                attrs: Mutex::new(HashMap::new()),
                calls: AtomicU64::new(0),
                fail: AtomicBool::new(false),
            }
        }

        fn set_attrs(&self, container_path: &str, attrs: ItemAttributes) {
            self.attrs
                .lock()
                .unwrap()
                .insert(container_path.to_string(), attrs);
        }

        fn calls(&self) -> u64 {
            self.calls.load(Ordering::Relaxed)
        }

        fn invalidate(&self, container_path: &str) {
            self.results.remove(container_path);
        }
    }

    #[async_trait]
    impl Container for StubContainer {
        async fn item_attributes_ref(&self, container_path: &VfsPath) -> Result<ResultRef> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if self.fail.load(Ordering::Relaxed) {
                return Err(VfsError::Backend {
                    path: container_path.clone(),
                    reason: "stub failure".to_string(),
                });
            }

            let key = container_path.as_str().to_string();
            let attrs = self
                .attrs
                .lock()
                .unwrap()
                .get(&key)
                .cloned()
                .unwrap_or_else(ItemAttributes::not_found);
            self.results
                .insert(key.clone(), Arc::new(ResultHolder::new(attrs)));
            Ok(ResultRef::new(&self.results, key))
        }
    }

    struct StubBackend {
        container: Arc<StubContainer>,
    }

    #[async_trait]
    impl StoreBackend for StubBackend {
        fn prune_mount_path(&self, path: &VfsPath) -> VfsPath {
            path.clone()
        }

        async fn container(&self, _path: &VfsPath) -> Result<Arc<dyn Container>> {
            let container: Arc<dyn Container> = self.container.clone();
            Ok(container)
        }
    }

    fn file_attrs(size: u64) -> ItemAttributes {
        let now = SystemTime::now();
        ItemAttributes {
            modified: now,
            accessed: now,
            created: now,
            size,
            version: 1,
            is_file: true,
            entry_kind: EntryKind::File,
        }
    }

    fn cache_over_stub() -> (VfsCache<StubBackend>, Arc<StubContainer>) {
        let container = Arc::new(StubContainer::new());
        let backend = Arc::new(StubBackend {
            container: Arc::clone(&container),
        });
        let options = MountOptions::builder()
            .ownership(Ownership { uid: 1000, gid: 100 })
            .build();
        (VfsCache::with_options(backend, options), container)
    }

    #[tokio::test]
    async fn test_getattr_is_idempotent_and_hits_cache() {
        let (cache, container) = cache_over_stub();
        container.set_attrs("/a/file", file_attrs(42));
        let path = VfsPath::from("/a/file");

        let first = cache.getattr_reply(&path).await;
        let second = cache.getattr_reply(&path).await;

        assert_eq!(first, second);
        assert_eq!(first.attr().unwrap().size, 42);
        assert_eq!(container.calls(), 1);

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.backend_calls, 1);
    }

    #[tokio::test]
    async fn test_invalidation_forces_fresh_lookup() {
        let (cache, container) = cache_over_stub();
        container.set_attrs("/a/file", file_attrs(42));
        let path = VfsPath::from("/a/file");

        let stale = cache.getattr_reply(&path).await;
        assert_eq!(stale.attr().unwrap().size, 42);

        // Backend-side write: the container recomputes and drops its slot.
        container.set_attrs("/a/file", file_attrs(99));
        container.invalidate("/a/file");

        let fresh = cache.getattr_reply(&path).await;
        assert_eq!(fresh.attr().unwrap().size, 99);
        assert_eq!(container.calls(), 2);
    }

    #[tokio::test]
    async fn test_translated_reply_is_stored_in_backend_holder() {
        let (cache, container) = cache_over_stub();
        container.set_attrs("/a/file", file_attrs(7));
        let path = VfsPath::from("/a/file");

        let reply = cache.getattr_reply(&path).await;

        let holder = container.results.get("/a/file").unwrap().value().clone();
        assert_eq!(holder.reply(FuseOp::GetAttr).unwrap(), reply);
    }

    #[tokio::test]
    async fn test_unknown_path_caches_not_found() {
        let (cache, container) = cache_over_stub();
        let path = VfsPath::from("/missing");

        let first = cache.getattr_reply(&path).await;
        assert_eq!(first.code, ENOENT);
        assert!(first.payload.is_none());

        // The negative reply lives in the backend holder too, so the second
        // lookup is a hit.
        let second = cache.getattr_reply(&path).await;
        assert_eq!(second.code, ENOENT);
        assert_eq!(container.calls(), 1);
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_default_envelope() {
        let (cache, container) = cache_over_stub();
        container.fail.store(true, Ordering::Relaxed);
        let path = VfsPath::from("/a/file");

        let reply = cache.getattr_reply(&path).await;
        assert_eq!(reply.code, ENOENT);
        assert!(reply.payload.is_none());
        assert_eq!(cache.stats().errors, 1);
    }

    #[tokio::test]
    async fn test_overlay_precedes_backend() {
        let (cache, container) = cache_over_stub();
        let path = VfsPath::from("/spool");

        assert!(cache.mkdir_virtual(&path).is_ok());
        let reply = cache.getattr_reply(&path).await;

        assert_eq!(reply.attr().unwrap().mode, MODE_DIR);
        assert_eq!(container.calls(), 0);
        assert_eq!(cache.stats().overlay_hits, 1);
    }

    #[tokio::test]
    async fn test_reply_callback_receives_code_and_attr() {
        let (cache, container) = cache_over_stub();
        container.set_attrs("/a/file", file_attrs(13));

        let mut seen = None;
        cache
            .getattr(&VfsPath::from("/a/file"), |code, attr| {
                seen = Some((code, attr));
            })
            .await;

        let (code, attr) = seen.unwrap();
        assert_eq!(code, 0);
        let attr = attr.unwrap();
        assert_eq!(attr.size, 13);
        assert_eq!(attr.mode, MODE_FILE);
        assert_eq!(attr.uid, 1000);

        let mut seen = None;
        cache
            .getattr(&VfsPath::from("/missing"), |code, attr| {
                seen = Some((code, attr));
            })
            .await;
        assert_eq!(seen.unwrap().0, ENOENT);
    }

    #[tokio::test]
    async fn test_create_open_dissolves_virtual_parent() {
        let (cache, container) = cache_over_stub();
        let dir = VfsPath::from("/a");
        cache.mkdir_virtual(&dir);

        let handled = cache.open_virtual(&VfsPath::from("/a/file"), OpenFlags::CREATE);
        assert!(handled.is_none());

        // The marker is gone, so getattr now consults the backend.
        let reply = cache.getattr_reply(&dir).await;
        assert_eq!(reply.code, ENOENT);
        assert_eq!(container.calls(), 1);
    }

    #[tokio::test]
    async fn test_non_create_open_keeps_virtual_parent() {
        let (cache, _container) = cache_over_stub();
        let dir = VfsPath::from("/a");
        cache.mkdir_virtual(&dir);

        cache.open_virtual(&VfsPath::from("/a/file"), OpenFlags::READ);
        assert!(cache.overlay().is_virtual(&dir));
    }

    #[tokio::test]
    async fn test_virtual_checks_delegate_for_unknown_paths() {
        let (cache, _container) = cache_over_stub();
        let path = VfsPath::from("/real/dir");

        assert!(cache.readdir_virtual(&path).is_none());
        assert!(cache
            .rename_virtual(&path, &VfsPath::from("/real/other"))
            .is_none());
    }

    #[tokio::test]
    async fn test_rename_then_getattr_uses_new_marker() {
        let (cache, container) = cache_over_stub();
        cache.mkdir_virtual(&VfsPath::from("/a"));

        let handled = cache.rename_virtual(&VfsPath::from("/a"), &VfsPath::from("/b"));
        assert!(handled.unwrap().is_ok());

        let reply = cache.getattr_reply(&VfsPath::from("/b")).await;
        assert_eq!(reply.attr().unwrap().mode, MODE_DIR);
        assert_eq!(container.calls(), 0);
    }
}
