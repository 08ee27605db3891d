//! The network-store collaborator interface and the shared result cache it
//! owns.
//!
//! The core never copies backend metadata into a private cache. It holds
//! [`ResultRef`]s, (weak pointer, key) pairs into a container's own
//! [`ResultsMap`], and reads or writes through the [`ResultHolder`] found
//! there. The container stays the single invalidation authority: dropping or
//! replacing a holder evicts everything the core cached for that entry, with
//! no second cache to fall out of sync.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::Result;
use crate::types::{FuseOp, FuseReply, ItemAttributes, VfsPath};

/// A container's result cache: opaque key to holder.
///
/// Owned by the backend. The core only ever holds weak references into it.
pub type ResultsMap = Arc<DashMap<String, Arc<ResultHolder>>>;

/// One backend cache slot: the attribute record the container computed plus
/// the per-operation replies the vfs layer has derived from it.
///
/// Both sides share the holder by reference, so a reply stored here is gone
/// the moment the container invalidates the slot.
#[derive(Debug)]
pub struct ResultHolder {
    attributes: ItemAttributes,
    replies: DashMap<FuseOp, FuseReply>,
}

impl ResultHolder {
    /// Wraps a freshly computed attribute record.
    pub fn new(attributes: ItemAttributes) -> Self {
        Self {
            attributes,
            replies: DashMap::new(),
        }
    }

    /// The backend attribute record.
    pub fn attributes(&self) -> &ItemAttributes {
        &self.attributes
    }

    /// The cached reply for `op`, if one was stored.
    pub fn reply(&self, op: FuseOp) -> Option<FuseReply> {
        self.replies.get(&op).map(|entry| entry.value().clone())
    }

    /// Stores a derived reply under `op`, visible to both sides.
    pub fn store_reply(&self, op: FuseOp, reply: FuseReply) {
        self.replies.insert(op, reply);
    }

    /// Drops every derived reply, keeping the attribute record.
    pub fn clear_replies(&self) {
        self.replies.clear();
    }
}

/// A borrowed, non-owning reference into a container's [`ResultsMap`].
///
/// Valid only while the container keeps an entry at `key`; once the slot is
/// dropped or replaced, [`holder`](Self::holder) observes the invalidation
/// as absence. Nothing is pushed to the core.
#[derive(Debug, Clone)]
pub struct ResultRef {
    map: Weak<DashMap<String, Arc<ResultHolder>>>,
    key: String,
}

impl ResultRef {
    /// Creates a reference to the slot at `key` in `map`.
    pub fn new(map: &ResultsMap, key: impl Into<String>) -> Self {
        Self {
            map: Arc::downgrade(map),
            key: key.into(),
        }
    }

    /// The opaque key this reference points at.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Resolves to the current holder, or `None` once the backend has
    /// invalidated the slot (or dropped the whole map).
    pub fn holder(&self) -> Option<Arc<ResultHolder>> {
        self.map
            .upgrade()?
            .get(&self.key)
            .map(|entry| Arc::clone(entry.value()))
    }
}

/// One mounted container of the network store.
#[async_trait]
pub trait Container: Send + Sync {
    /// Attribute lookup for a container-relative path, returning a reference
    /// into the container's own result cache rather than a copy.
    async fn item_attributes_ref(&self, container_path: &VfsPath) -> Result<ResultRef>;
}

/// The network store behind one mount point.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Strips the mount prefix, yielding the container-relative path.
    fn prune_mount_path(&self, path: &VfsPath) -> VfsPath;

    /// Resolves the container responsible for `path`.
    async fn container(&self, path: &VfsPath) -> Result<Arc<dyn Container>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FuseOp;

    fn results_map() -> ResultsMap {
        Arc::new(DashMap::new())
    }

    #[test]
    fn test_result_ref_resolves_live_slot() {
        let map = results_map();
        map.insert(
            "docs".to_string(),
            Arc::new(ResultHolder::new(ItemAttributes::virtual_directory())),
        );

        let result_ref = ResultRef::new(&map, "docs");
        let holder = result_ref.holder().unwrap();
        assert_eq!(holder.attributes().size, 0);
        assert_eq!(result_ref.key(), "docs");
    }

    #[test]
    fn test_result_ref_observes_invalidation_as_absence() {
        let map = results_map();
        map.insert(
            "docs".to_string(),
            Arc::new(ResultHolder::new(ItemAttributes::virtual_directory())),
        );
        let result_ref = ResultRef::new(&map, "docs");
        assert!(result_ref.holder().is_some());

        map.remove("docs");
        assert!(result_ref.holder().is_none());
    }

    #[test]
    fn test_result_ref_outlives_map_safely() {
        let map = results_map();
        let result_ref = ResultRef::new(&map, "docs");
        drop(map);
        assert!(result_ref.holder().is_none());
    }

    #[test]
    fn test_holder_reply_store_and_clear() {
        let holder = ResultHolder::new(ItemAttributes::not_found());
        assert!(holder.reply(FuseOp::GetAttr).is_none());

        holder.store_reply(FuseOp::GetAttr, FuseReply::ok());
        assert!(holder.reply(FuseOp::GetAttr).unwrap().is_ok());

        holder.clear_replies();
        assert!(holder.reply(FuseOp::GetAttr).is_none());
    }
}
