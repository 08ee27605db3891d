//! The uniform result envelope handed back to the callback layer.

use crate::error::ENOENT;
use crate::types::FileAttr;

/// Operation names used as keys into a backend result holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuseOp {
    /// Attribute lookup.
    GetAttr,
    /// Directory listing.
    ReadDir,
}

/// Payload carried by a successful reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyPayload {
    /// Translated attributes, for getattr.
    Attr(FileAttr),
    /// Entry names, for readdir.
    Entries(Vec<String>),
}

/// A `{code, payload}` pair, the only shape the callback layer ever sees.
///
/// The default value is the baseline failure: not-found with no payload.
/// Every stage that fails falls back to it, so internal errors surface as a
/// well-formed envelope rather than a fault.
#[derive(Debug, Clone, PartialEq)]
pub struct FuseReply {
    /// 0 on success, a positive POSIX errno otherwise.
    pub code: i32,
    /// Present only on success, and only for value-bearing operations.
    pub payload: Option<ReplyPayload>,
}

impl Default for FuseReply {
    fn default() -> Self {
        Self {
            code: ENOENT,
            payload: None,
        }
    }
}

impl FuseReply {
    /// A bare success, for operations that return no value.
    pub fn ok() -> Self {
        Self {
            code: 0,
            payload: None,
        }
    }

    /// A successful attribute reply.
    pub fn ok_attr(attr: FileAttr) -> Self {
        Self {
            code: 0,
            payload: Some(ReplyPayload::Attr(attr)),
        }
    }

    /// A successful listing reply.
    pub fn ok_entries(entries: Vec<String>) -> Self {
        Self {
            code: 0,
            payload: Some(ReplyPayload::Entries(entries)),
        }
    }

    /// A failure with the given errno and no payload.
    pub fn error(code: i32) -> Self {
        Self {
            code,
            payload: None,
        }
    }

    /// True when the operation succeeded.
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }

    /// The attribute payload, if this is a successful getattr reply.
    pub fn attr(&self) -> Option<&FileAttr> {
        match &self.payload {
            Some(ReplyPayload::Attr(attr)) => Some(attr),
            _ => None,
        }
    }

    /// The listing payload, if this is a successful readdir reply.
    pub fn entries(&self) -> Option<&[String]> {
        match &self.payload {
            Some(ReplyPayload::Entries(entries)) => Some(entries),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MODE_FILE;
    use std::time::SystemTime;

    #[test]
    fn test_default_is_not_found() {
        let reply = FuseReply::default();
        assert_eq!(reply.code, ENOENT);
        assert!(reply.payload.is_none());
        assert!(!reply.is_ok());
    }

    #[test]
    fn test_ok_attr_round_trip() {
        let now = SystemTime::now();
        let attr = FileAttr {
            mtime: now,
            atime: now,
            ctime: now,
            size: 7,
            nlink: 1,
            mode: MODE_FILE,
            uid: 1000,
            gid: 1000,
        };
        let reply = FuseReply::ok_attr(attr);
        assert!(reply.is_ok());
        assert_eq!(reply.attr().unwrap().size, 7);
        assert!(reply.entries().is_none());
    }

    #[test]
    fn test_ok_entries() {
        let reply = FuseReply::ok_entries(vec![]);
        assert!(reply.is_ok());
        assert_eq!(reply.entries().unwrap().len(), 0);
        assert!(reply.attr().is_none());
    }
}
