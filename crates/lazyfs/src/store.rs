//! The namespace store.
//!
//! Maps normalized keys to entries and runs the fulfiller chain on misses.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use crate::config::{FsOption, FsOptions};
use crate::entry::{Entry, Expiry};
use crate::error::{LazyFsError, LazyFsResult};
use crate::file::File;
use crate::fulfiller::{Chain, Fulfiller, Resolution};
use crate::path::normalize;
use crate::stat::FileStat;
use crate::sub::SubFs;

struct Inner {
    entries: HashMap<String, Arc<Entry>>,
    chain: Chain,
    options: FsOptions,
}

impl Inner {
    fn normalize(&self, name: &str) -> String {
        normalize(name, self.options.case_insensitive)
    }

    /// Return the live entry for `key`, dropping it first if it has expired.
    fn lookup(&mut self, key: &str) -> Option<Arc<Entry>> {
        let entry = self.entries.get(key)?;
        if entry.is_expired_at(SystemTime::now()) {
            tracing::trace!(key, "dropping expired entry on access");
            self.entries.remove(key);
            return None;
        }
        Some(Arc::clone(entry))
    }

    /// Run the chain for `key`. Nothing is stored unless content was found
    /// with a cacheable expiry.
    #[tracing::instrument(skip(self), name = "lazyfs.fulfill", fields(fulfillers = self.chain.len()))]
    fn fulfill(&mut self, key: &str) -> LazyFsResult<Arc<Entry>> {
        let fulfilled = match self.chain.resolve(key) {
            Resolution::Found(f) => f,
            Resolution::Declined => return Err(LazyFsError::not_found(key)),
            Resolution::Failed(source) => {
                tracing::debug!(key, error = %source, "fulfiller failed");
                return Err(LazyFsError::generator_failure(key, source));
            }
        };

        let now = SystemTime::now();
        let modified = fulfilled.modified.unwrap_or(now);
        let entry = Arc::new(Entry::new(key, fulfilled.content, modified, fulfilled.expiry));
        if fulfilled.expiry.is_cacheable_at(now) {
            self.entries.insert(key.to_string(), Arc::clone(&entry));
            tracing::debug!(key, size = entry.len(), "fulfilled and cached");
        } else {
            tracing::debug!(key, size = entry.len(), "fulfilled, not cached");
        }
        Ok(entry)
    }

    /// Cache-or-fulfill. With `may_fulfill` false a miss is NotFound.
    fn resolve(&mut self, key: &str, may_fulfill: bool) -> LazyFsResult<Arc<Entry>> {
        if let Some(entry) = self.lookup(key) {
            return Ok(entry);
        }
        if !may_fulfill {
            return Err(LazyFsError::not_found(key));
        }
        self.fulfill(key)
    }
}

/// A lazily populated, in-memory file namespace.
///
/// Keys are normalized paths (see [`normalize`]). Entries are seeded with
/// [`LazyFs::put`] or produced on first access by the fulfillers registered
/// with [`LazyFs::fulfill_with`], which run newest-first.
///
/// One mutex guards entries, fulfillers and options, and it is held for the
/// whole of every operation, fulfiller calls included. At most one
/// fulfillment is in flight per store at any time.
pub struct LazyFs {
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for LazyFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyFs")
            .field("inner", &"<locked>")
            .finish()
    }
}

impl Default for LazyFs {
    fn default() -> Self {
        Self::new()
    }
}

impl LazyFs {
    /// Create an empty namespace with default options.
    pub fn new() -> Self {
        Self::with_options(FsOptions::default())
    }

    /// Create an empty namespace with the given options.
    pub fn with_options(options: FsOptions) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                chain: Chain::default(),
                options,
            }),
        }
    }

    /// Create an empty namespace, applying each toggle in order.
    pub fn from_options(options: impl IntoIterator<Item = FsOption>) -> LazyFsResult<Self> {
        let fs = Self::new();
        for option in options {
            fs.set(option).map_err(|e| {
                LazyFsError::invalid_configuration(format!("failed to apply {option}: {e}"))
            })?;
        }
        Ok(fs)
    }

    /// Apply a toggle to a live namespace.
    ///
    /// Changing case sensitivity fails while any entry is stored.
    pub fn set(&self, option: FsOption) -> LazyFsResult<()> {
        let mut inner = self.inner.lock();
        let entries = inner.entries.len();
        inner.options.apply(option, entries)
    }

    /// Current options.
    pub fn options(&self) -> FsOptions {
        self.inner.lock().options
    }

    /// Number of stored keys, including any not yet swept after expiring.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Register a fulfiller. Later registrations are consulted first.
    pub fn fulfill_with(&self, fulfiller: impl Fulfiller + 'static) {
        self.fulfill_with_arc(Arc::new(fulfiller));
    }

    /// Register an already shared fulfiller.
    pub fn fulfill_with_arc(&self, fulfiller: Arc<dyn Fulfiller>) {
        self.inner.lock().chain.push(fulfiller);
    }

    /// Register several fulfillers in order; the last one ends up consulted first.
    pub fn fulfill_with_all(&self, fulfillers: impl IntoIterator<Item = Arc<dyn Fulfiller>>) {
        let mut inner = self.inner.lock();
        for fulfiller in fulfillers {
            inner.chain.push(fulfiller);
        }
    }

    /// Seed `name` directly, replacing any existing entry.
    ///
    /// Unlike fulfillment, the entry is stored whatever its expiry. An entry
    /// seeded with [`Expiry::DoNotCache`] is therefore stored but already
    /// stale, and the next access or sweep drops it.
    pub fn put(
        &self,
        name: &str,
        content: impl Into<Arc<[u8]>>,
        modified: SystemTime,
        expiry: Expiry,
    ) {
        let mut inner = self.inner.lock();
        let key = inner.normalize(name);
        tracing::trace!(key = %key, "put");
        let entry = Arc::new(Entry::new(key.clone(), content, modified, expiry));
        inner.entries.insert(key, entry);
    }

    /// Open `name`, fulfilling it on a miss.
    pub fn open(&self, name: &str) -> LazyFsResult<File> {
        self.entry(name, true).map(File::new)
    }

    /// Read all of `name` into a fresh buffer, fulfilling it on a miss.
    pub fn read_file(&self, name: &str) -> LazyFsResult<Vec<u8>> {
        self.entry(name, true).map(|e| e.payload().to_vec())
    }

    /// Metadata for `name`.
    ///
    /// Fulfills on a miss only when [`FsOptions::stat_fulfills`] is set, in
    /// which case the produced entry is cached like any other.
    pub fn stat(&self, name: &str) -> LazyFsResult<FileStat> {
        let mut inner = self.inner.lock();
        let key = inner.normalize(name);
        let may_fulfill = inner.options.stat_fulfills;
        inner.resolve(&key, may_fulfill).map(FileStat::new)
    }

    /// True if `name` has a live entry. Never fulfills.
    pub fn contains(&self, name: &str) -> bool {
        let mut inner = self.inner.lock();
        let key = inner.normalize(name);
        inner.lookup(&key).is_some()
    }

    /// Remove `name`. Returns whether an entry was removed.
    pub fn expire(&self, name: &str) -> bool {
        let mut inner = self.inner.lock();
        let key = inner.normalize(name);
        inner.entries.remove(&key).is_some()
    }

    /// Remove every entry whose expiry lies in the past. Returns how many
    /// were removed.
    #[tracing::instrument(skip(self), name = "lazyfs.flush_expired")]
    pub fn flush_expired(&self) -> usize {
        let now = SystemTime::now();
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner
            .entries
            .retain(|_, entry| !entry.expiry().instant().is_some_and(|t| t < now));
        let removed = before - inner.entries.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = inner.entries.len(), "flushed expired entries");
        }
        removed
    }

    /// A read-only view of this namespace rooted at `prefix`.
    pub fn sub(self: &Arc<Self>, prefix: &str) -> SubFs {
        SubFs::new(Arc::clone(self), prefix)
    }

    fn entry(&self, name: &str, may_fulfill: bool) -> LazyFsResult<Arc<Entry>> {
        let mut inner = self.inner.lock();
        let key = inner.normalize(name);
        inner.resolve(&key, may_fulfill)
    }
}
