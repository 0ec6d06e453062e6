//! VFS operations trait.

use async_trait::async_trait;

use crate::error::LazyFsResult;
use crate::file::File;
use crate::store::LazyFs;
use crate::sub::SubFs;

use super::types::FileAttr;

/// Read-only VFS operations.
///
/// All operations are path-based. Paths go through the same normalization
/// as the synchronous API.
#[async_trait]
pub trait VfsOps: Send + Sync {
    /// Get file attributes. Follows `stat` semantics, so a miss only
    /// fulfills when the store is configured to.
    async fn getattr(&self, path: &str) -> LazyFsResult<FileAttr>;

    /// Read up to `size` bytes starting at `offset`.
    ///
    /// Returns fewer bytes if EOF is reached. Always fulfills on a miss.
    async fn read(&self, path: &str, offset: u64, size: u32) -> LazyFsResult<Vec<u8>>;

    /// Returns true if this filesystem is read-only.
    fn read_only(&self) -> bool {
        true
    }

    // ========================================================================
    // Convenience methods (default implementations)
    // ========================================================================

    /// Check if a path exists.
    async fn exists(&self, path: &str) -> bool {
        self.getattr(path).await.is_ok()
    }

    /// Read entire file contents.
    async fn read_all(&self, path: &str) -> LazyFsResult<Vec<u8>> {
        self.read(path, 0, u32::MAX).await
    }
}

/// Read `[offset, offset + size)` from an open file, clamped to its length.
fn read_range(file: File, offset: u64, size: u32) -> LazyFsResult<Vec<u8>> {
    let len = file.len().saturating_sub(offset).min(u64::from(size));
    let mut buf = vec![0u8; len as usize];
    let n = file.read_at(&mut buf, offset)?;
    buf.truncate(n);
    Ok(buf)
}

#[async_trait]
impl VfsOps for LazyFs {
    async fn getattr(&self, path: &str) -> LazyFsResult<FileAttr> {
        Ok(self.stat(path)?.to_attr())
    }

    async fn read(&self, path: &str, offset: u64, size: u32) -> LazyFsResult<Vec<u8>> {
        read_range(self.open(path)?, offset, size)
    }
}

#[async_trait]
impl VfsOps for SubFs {
    async fn getattr(&self, path: &str) -> LazyFsResult<FileAttr> {
        Ok(self.stat(path)?.to_attr())
    }

    async fn read(&self, path: &str, offset: u64, size: u32) -> LazyFsResult<Vec<u8>> {
        read_range(self.open(path)?, offset, size)
    }
}
