//! # lazyfs
//!
//! A lazily populated, in-memory file namespace.
//!
//! Keys are normalized, slash-delimited paths. An entry is either seeded
//! with [`LazyFs::put`] or produced on first access by a chain of
//! [`Fulfiller`]s, newest registration first. Produced entries are cached
//! until their [`Expiry`] passes, they are evicted with [`LazyFs::expire`],
//! or [`LazyFs::flush_expired`] sweeps them.
//!
//! ```
//! use lazyfs::{Expiry, Fulfilled, LazyFs, Resolution};
//! use std::time::Duration;
//!
//! let fs = LazyFs::new();
//! fs.fulfill_with(|path: &str| {
//!     if path.starts_with("greet/") {
//!         let name = &path["greet/".len()..];
//!         Resolution::Found(
//!             Fulfilled::new(format!("hello, {name}").into_bytes())
//!                 .with_expiry(Expiry::after(Duration::from_secs(60))),
//!         )
//!     } else {
//!         Resolution::Declined
//!     }
//! });
//!
//! assert_eq!(fs.read_file("/greet/./amy").unwrap(), b"hello, amy");
//! assert!(fs.read_file("/other").is_err());
//! ```
//!
//! Nothing runs in the background: expiry is checked on access and by
//! explicit sweeps. Each store is guarded by one mutex, held while
//! fulfillers run.

pub mod compose;
pub mod config;
pub mod entry;
pub mod error;
pub mod file;
pub mod fulfiller;
pub mod path;
pub mod stat;
pub mod store;
pub mod sub;
pub mod vfs;

pub use compose::{Compose, Loaded, LocalSource, Source};
pub use config::{FsOption, FsOptions};
pub use entry::{Entry, Expiry};
pub use error::{BoxError, LazyFsError, LazyFsResult};
pub use file::File;
pub use fulfiller::{Fulfilled, Fulfiller, Resolution};
pub use path::normalize;
pub use stat::FileStat;
pub use store::LazyFs;
pub use sub::SubFs;
pub use vfs::{FileAttr, FileType, VfsOps};
