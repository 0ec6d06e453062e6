//! Async, path-based access to a namespace.
//!
//! - [`VfsOps`] - read-only operations with explicit offset/size, shaped for
//!   RPC exposure
//! - [`FileAttr`] / [`FileType`] - serializable metadata
//!
//! [`LazyFs`](crate::LazyFs) and [`SubFs`](crate::SubFs) implement
//! [`VfsOps`]. The calls are synchronous underneath: a slow fulfiller blocks
//! the calling task.

mod ops;
mod types;

pub use ops::VfsOps;
pub use types::{FileAttr, FileType};
