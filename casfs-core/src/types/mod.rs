// Module declarations
pub mod attr;
pub mod flags;
pub mod mount;
pub mod path;
pub mod reply;

// Re-export all types from submodules
pub use attr::{EntryKind, FileAttr, ItemAttributes, Ownership, MODE_DIR, MODE_FILE};
pub use flags::OpenFlags;
pub use mount::{MountHandle, MountOptions, MountOptionsBuilder};
pub use path::{VfsPath, MAX_ANCESTOR_WALK};
pub use reply::{FuseOp, FuseReply, ReplyPayload};
