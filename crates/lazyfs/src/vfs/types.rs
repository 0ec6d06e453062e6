//! VFS attribute types.
//!
//! Path-based and serializable, so they can cross an RPC boundary as-is.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// File type enumeration.
///
/// Keys are flat, so every entry is a regular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    /// Regular file.
    File,
}

impl FileType {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }
}

/// File attributes (metadata).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttr {
    /// Size in bytes.
    pub size: u64,
    /// File type.
    pub kind: FileType,
    /// Unix permissions (e.g., 0o444).
    pub perm: u32,
    /// Last modification time.
    pub mtime: SystemTime,
    /// Instant after which the entry is no longer served, if any.
    pub expires: Option<SystemTime>,
}

impl FileAttr {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }
}
