//! Cached entries and their expiry.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// When an entry stops being valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiry {
    /// Never expires.
    #[default]
    Never,
    /// Expires at the given instant.
    At(SystemTime),
    /// Fulfilled content with this expiry is handed back but never stored.
    DoNotCache,
}

impl Expiry {
    /// Expire `ttl` from now. A `ttl` too large to represent never expires.
    pub fn after(ttl: Duration) -> Self {
        SystemTime::now().checked_add(ttl).map_or(Self::Never, Self::At)
    }

    /// The instant this expiry refers to, if any.
    ///
    /// `DoNotCache` maps to the epoch, so a directly seeded entry carrying it
    /// is already stale.
    pub fn instant(&self) -> Option<SystemTime> {
        match self {
            Self::Never => None,
            Self::At(t) => Some(*t),
            Self::DoNotCache => Some(SystemTime::UNIX_EPOCH),
        }
    }

    /// True if an entry with this expiry must not be returned at `now`.
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        self.instant().is_some_and(|t| t <= now)
    }

    /// True if content fulfilled at `now` with this expiry may be written to
    /// the store: it never expires, or it expires strictly after `now`.
    pub fn is_cacheable_at(&self, now: SystemTime) -> bool {
        match self {
            Self::Never => true,
            Self::At(t) => *t > now,
            Self::DoNotCache => false,
        }
    }
}

/// An immutable record in the namespace.
#[derive(Debug, Clone)]
pub struct Entry {
    payload: Arc<[u8]>,
    name: String,
    modified: SystemTime,
    expiry: Expiry,
}

impl Entry {
    /// Create an entry. `name` must already be normalized.
    pub fn new(
        name: impl Into<String>,
        payload: impl Into<Arc<[u8]>>,
        modified: SystemTime,
        expiry: Expiry,
    ) -> Self {
        Self {
            payload: payload.into(),
            name: name.into(),
            modified,
            expiry,
        }
    }

    /// Shared handle to the payload.
    pub fn payload(&self) -> &Arc<[u8]> {
        &self.payload
    }

    /// Normalized key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last modification time.
    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    /// Expiry of this entry.
    pub fn expiry(&self) -> Expiry {
        self.expiry
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub(crate) fn is_expired_at(&self, now: SystemTime) -> bool {
        self.expiry.is_expired_at(now)
    }
}
