//! Prefix-scoped views.

use std::sync::Arc;

use crate::error::LazyFsResult;
use crate::file::File;
use crate::path::join;
use crate::stat::FileStat;
use crate::store::LazyFs;

/// A read-only view of a [`LazyFs`] rooted at a prefix.
///
/// Every call joins its path under the prefix and forwards to the owning
/// store. `..` clamps at the prefix. The view has no cache or options of its
/// own.
#[derive(Debug, Clone)]
pub struct SubFs {
    owner: Arc<LazyFs>,
    prefix: String,
}

impl SubFs {
    pub(crate) fn new(owner: Arc<LazyFs>, prefix: &str) -> Self {
        Self {
            owner,
            prefix: join("", prefix),
        }
    }

    /// The prefix, as a normalized path without case folding.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The store this view forwards to.
    pub fn owner(&self) -> &Arc<LazyFs> {
        &self.owner
    }

    fn resolve(&self, name: &str) -> String {
        join(&self.prefix, name)
    }

    /// Open `name` under the prefix.
    pub fn open(&self, name: &str) -> LazyFsResult<File> {
        self.owner.open(&self.resolve(name))
    }

    /// Read all of `name` under the prefix.
    pub fn read_file(&self, name: &str) -> LazyFsResult<Vec<u8>> {
        self.owner.read_file(&self.resolve(name))
    }

    /// Metadata for `name` under the prefix.
    pub fn stat(&self, name: &str) -> LazyFsResult<FileStat> {
        self.owner.stat(&self.resolve(name))
    }

    /// A deeper view; prefixes compose by joining.
    pub fn sub(&self, dir: &str) -> SubFs {
        SubFs {
            owner: Arc::clone(&self.owner),
            prefix: self.resolve(dir),
        }
    }
}
