//! Metadata view over an entry.

use std::sync::Arc;
use std::time::SystemTime;

use crate::entry::{Entry, Expiry};
use crate::path::base_name;
use crate::vfs::{FileAttr, FileType};

/// Permission bits reported for every entry.
pub const ENTRY_PERM: u32 = 0o444;

/// Metadata for an entry. Every entry is a flat regular file.
#[derive(Debug, Clone)]
pub struct FileStat {
    entry: Arc<Entry>,
}

impl FileStat {
    pub(crate) fn new(entry: Arc<Entry>) -> Self {
        Self { entry }
    }

    /// Last path segment of the key.
    pub fn name(&self) -> &str {
        base_name(self.entry.name())
    }

    /// Full normalized key.
    pub fn path(&self) -> &str {
        self.entry.name()
    }

    /// Payload length in bytes.
    pub fn size(&self) -> u64 {
        self.entry.len() as u64
    }

    /// Always [`FileType::File`].
    pub fn mode(&self) -> FileType {
        FileType::File
    }

    /// Last modification time.
    pub fn modified(&self) -> SystemTime {
        self.entry.modified()
    }

    /// Always false.
    pub fn is_dir(&self) -> bool {
        !self.mode().is_file()
    }

    /// Expiry the entry was created with.
    pub fn expiry(&self) -> Expiry {
        self.entry.expiry()
    }

    /// Convert to VFS attributes.
    pub fn to_attr(&self) -> FileAttr {
        FileAttr {
            size: self.size(),
            kind: self.mode(),
            perm: ENTRY_PERM,
            mtime: self.modified(),
            expires: self.expiry().instant(),
        }
    }
}
