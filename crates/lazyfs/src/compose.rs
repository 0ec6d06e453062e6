//! Adapting existing read-only filesystems into fulfillers.
//!
//! A [`Source`] is anything that can load a whole file by path. [`Compose`]
//! wraps a source as a [`Fulfiller`], optionally stamping a TTL on what it
//! loads. Host directories ([`LocalSource`]) and other namespaces
//! ([`LazyFs`], [`SubFs`]) are sources out of the box.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::entry::Expiry;
use crate::error::{LazyFsError, LazyFsResult};
use crate::file::File;
use crate::fulfiller::{Fulfilled, Fulfiller, Resolution};
use crate::path::normalize;
use crate::store::LazyFs;
use crate::sub::SubFs;

/// A fully loaded file.
#[derive(Debug, Clone)]
pub struct Loaded {
    /// File contents.
    pub content: Vec<u8>,
    /// Modification time, if the source knows it.
    pub modified: Option<SystemTime>,
}

/// A read-only filesystem that can be composed into a namespace.
pub trait Source: Send + Sync {
    /// Load the whole file at `path`.
    fn load(&self, path: &str) -> LazyFsResult<Loaded>;
}

impl<S: Source + ?Sized> Source for Arc<S> {
    fn load(&self, path: &str) -> LazyFsResult<Loaded> {
        (**self).load(path)
    }
}

/// Fulfiller backed by a [`Source`].
///
/// Loaded content keeps the source's modification time (or the load time
/// when unknown). With a TTL it expires `ttl` after being loaded, otherwise
/// it is cached for good.
///
/// By default any source error, including a missing file, fails the whole
/// chain. Use [`Compose::fallthrough`] to let older fulfillers answer paths
/// the source does not have.
///
/// Composing a [`LazyFs`] into its own chain deadlocks.
pub struct Compose {
    source: Arc<dyn Source>,
    ttl: Option<Duration>,
    fallthrough: bool,
}

impl std::fmt::Debug for Compose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compose")
            .field("ttl", &self.ttl)
            .field("fallthrough", &self.fallthrough)
            .finish_non_exhaustive()
    }
}

impl Compose {
    /// Wrap `source` with no TTL.
    pub fn new(source: impl Source + 'static) -> Self {
        Self {
            source: Arc::new(source),
            ttl: None,
            fallthrough: false,
        }
    }

    /// Expire loaded entries `ttl` after loading.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Decline instead of failing when the source reports not-found.
    pub fn fallthrough(mut self) -> Self {
        self.fallthrough = true;
        self
    }
}

impl Fulfiller for Compose {
    fn fulfill(&self, path: &str) -> Resolution {
        match self.source.load(path) {
            Ok(loaded) => {
                let modified = loaded.modified.unwrap_or_else(SystemTime::now);
                let expiry = self.ttl.map_or(Expiry::Never, Expiry::after);
                Fulfilled::new(loaded.content)
                    .with_modified(modified)
                    .with_expiry(expiry)
                    .into()
            }
            Err(e) if self.fallthrough && e.is_not_found() => Resolution::Declined,
            Err(e) => Resolution::fail(e),
        }
    }
}

/// A host directory as a [`Source`].
///
/// Paths are resolved under `root`; anything resolving outside it (through
/// a symlink, say) is refused.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    /// Create a source rooted at `root`.
    ///
    /// The root is canonicalized up front when possible.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root: PathBuf = root.into();
        let root = root.canonicalize().unwrap_or(root);
        Self { root }
    }

    /// Get the root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> LazyFsResult<PathBuf> {
        let relative = normalize(path, false);
        let canonical = self.root.join(&relative).canonicalize()?;
        if !canonical.starts_with(&self.root) {
            return Err(LazyFsError::path_escapes_root(format!(
                "{} is not under {}",
                canonical.display(),
                self.root.display()
            )));
        }
        Ok(canonical)
    }
}

impl Source for LocalSource {
    fn load(&self, path: &str) -> LazyFsResult<Loaded> {
        let full = self.resolve(path)?;
        let content = std::fs::read(&full)?;
        let modified = std::fs::metadata(&full).and_then(|m| m.modified()).ok();
        Ok(Loaded { content, modified })
    }
}

fn load_file(mut file: File) -> LazyFsResult<Loaded> {
    let modified = file.stat()?.modified();
    let mut content = Vec::with_capacity(file.len() as usize);
    file.read_to_end(&mut content)?;
    Ok(Loaded {
        content,
        modified: Some(modified),
    })
}

impl Source for LazyFs {
    fn load(&self, path: &str) -> LazyFsResult<Loaded> {
        load_file(self.open(path)?)
    }
}

impl Source for SubFs {
    fn load(&self, path: &str) -> LazyFsResult<Loaded> {
        load_file(self.open(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(r: Resolution) -> Fulfilled {
        match r {
            Resolution::Found(f) => f,
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn test_local_source_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("css")).unwrap();
        std::fs::write(dir.path().join("css/site.css"), "body {}").unwrap();

        let compose = Compose::new(LocalSource::new(dir.path()));
        let f = found(compose.fulfill("css/site.css"));
        assert_eq!(&f.content[..], b"body {}");
        assert!(f.modified.is_some());
        assert_eq!(f.expiry, Expiry::Never);
    }

    #[test]
    fn test_ttl_sets_expiry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();

        let before = SystemTime::now();
        let compose = Compose::new(LocalSource::new(dir.path())).with_ttl(Duration::from_secs(60));
        match found(compose.fulfill("a.txt")).expiry {
            Expiry::At(t) => assert!(t >= before + Duration::from_secs(60)),
            other => panic!("expected At, got {other:?}"),
        }
    }

    #[test]
    fn test_unrepresentable_ttl_never_expires() {
        let upstream = Arc::new(LazyFs::new());
        upstream.put("a", b"x".to_vec(), SystemTime::now(), Expiry::Never);

        let fs = LazyFs::new();
        fs.fulfill_with(Compose::new(upstream).with_ttl(Duration::MAX));
        assert_eq!(fs.read_file("a").unwrap(), b"x");
        assert_eq!(fs.stat("a").unwrap().expiry(), Expiry::Never);
    }

    #[test]
    fn test_missing_file_fails_unless_fallthrough() {
        let dir = tempfile::tempdir().unwrap();

        let strict = Compose::new(LocalSource::new(dir.path()));
        assert!(matches!(strict.fulfill("missing.txt"), Resolution::Failed(_)));

        let lenient = Compose::new(LocalSource::new(dir.path())).fallthrough();
        assert!(matches!(lenient.fulfill("missing.txt"), Resolution::Declined));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret"), "s").unwrap();
        let root = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret"), root.path().join("link")).unwrap();

        let source = LocalSource::new(root.path());
        assert!(matches!(source.load("link"), Err(LazyFsError::PathEscapesRoot(_))));
    }

    #[test]
    fn test_parent_segments_stay_inside_root() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("inside.txt"), "in").unwrap();

        let source = LocalSource::new(root.path());
        assert_eq!(source.load("../../inside.txt").unwrap().content, b"in");
    }

    #[test]
    fn test_namespace_as_source() {
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(7);
        let upstream = Arc::new(LazyFs::new());
        upstream.put("shared/logo.svg", b"<svg/>".to_vec(), mtime, Expiry::Never);

        let compose = Compose::new(Arc::clone(&upstream));
        let f = found(compose.fulfill("shared/logo.svg"));
        assert_eq!(&f.content[..], b"<svg/>");
        assert_eq!(f.modified, Some(mtime));

        let via_sub = Compose::new(upstream.sub("shared")).fallthrough();
        assert_eq!(&found(via_sub.fulfill("logo.svg")).content[..], b"<svg/>");
        assert!(matches!(via_sub.fulfill("other.svg"), Resolution::Declined));
    }
}
