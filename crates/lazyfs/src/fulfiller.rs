//! Fulfillers: pluggable content generators.
//!
//! A [`LazyFs`](crate::LazyFs) holds an append-only chain of fulfillers and
//! consults them newest-first whenever a key has no live entry.

use std::sync::Arc;
use std::time::SystemTime;

use crate::entry::Expiry;
use crate::error::BoxError;

/// Content produced by a fulfiller.
#[derive(Debug, Clone)]
pub struct Fulfilled {
    /// Payload bytes.
    pub content: Arc<[u8]>,
    /// Modification time; the store uses the fulfillment time when absent.
    pub modified: Option<SystemTime>,
    /// Expiry of the produced entry.
    pub expiry: Expiry,
}

impl Fulfilled {
    /// Content that never expires and has no explicit modification time.
    pub fn new(content: impl Into<Arc<[u8]>>) -> Self {
        Self {
            content: content.into(),
            modified: None,
            expiry: Expiry::Never,
        }
    }

    /// Set the modification time.
    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Set the expiry.
    pub fn with_expiry(mut self, expiry: Expiry) -> Self {
        self.expiry = expiry;
        self
    }
}

/// Outcome of asking one fulfiller for a path.
#[derive(Debug)]
pub enum Resolution {
    /// Content was produced; the chain stops here.
    Found(Fulfilled),
    /// Not mine, try the next-older fulfiller.
    Declined,
    /// Hard failure; the chain stops and the error reaches the caller.
    Failed(BoxError),
}

impl Resolution {
    /// Shorthand for `Found(Fulfilled::new(content))`.
    pub fn found(content: impl Into<Arc<[u8]>>) -> Self {
        Self::Found(Fulfilled::new(content))
    }

    /// Shorthand for a failure from anything convertible to a boxed error.
    pub fn fail(err: impl Into<BoxError>) -> Self {
        Self::Failed(err.into())
    }
}

impl From<Fulfilled> for Resolution {
    fn from(f: Fulfilled) -> Self {
        Self::Found(f)
    }
}

/// A content generator consulted on cache misses.
///
/// Fulfillers receive the normalized key. They run while the owning store's
/// lock is held: a slow fulfiller stalls every other operation on that store,
/// and a fulfiller must never call back into the store that invoked it.
/// There is no timeout; wrap the fulfiller with its own deadline if needed.
pub trait Fulfiller: Send + Sync {
    /// Try to produce content for `path`.
    fn fulfill(&self, path: &str) -> Resolution;
}

impl<F> Fulfiller for F
where
    F: Fn(&str) -> Resolution + Send + Sync,
{
    fn fulfill(&self, path: &str) -> Resolution {
        self(path)
    }
}

/// Ordered, append-only list of fulfillers.
#[derive(Default, Clone)]
pub(crate) struct Chain {
    fulfillers: Vec<Arc<dyn Fulfiller>>,
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("len", &self.fulfillers.len())
            .finish()
    }
}

impl Chain {
    pub(crate) fn push(&mut self, fulfiller: Arc<dyn Fulfiller>) {
        self.fulfillers.push(fulfiller);
    }

    pub(crate) fn len(&self) -> usize {
        self.fulfillers.len()
    }

    /// Walk newest to oldest, stopping at the first `Found` or `Failed`.
    ///
    /// Returns `Declined` if every fulfiller declined (or the chain is empty).
    pub(crate) fn resolve(&self, path: &str) -> Resolution {
        for (idx, fulfiller) in self.fulfillers.iter().enumerate().rev() {
            match fulfiller.fulfill(path) {
                Resolution::Declined => {
                    tracing::trace!(path, fulfiller = idx, "fulfiller declined");
                }
                resolved => return resolved,
            }
        }
        Resolution::Declined
    }
}
