//! Virtual Filesystem (VFS) for emptyvfs.
//!
//! - **EmptyFs**: A single empty, read-only root directory
//! - **MemoryFs**: Map-backed read-only files (for mounts, tests)
//! - **Namespace**: Union of filesystems bound at mount points
//!
//! # Design
//!
//! A bare [`Namespace`] has nothing at `/`. [`new_namespace`] binds an
//! [`EmptyFs`] there first, so walking up to the root or listing it always
//! finds a directory:
//!
//! ```text
//! /                      # EmptyFs (no entries of its own)
//! ├── /pkg/              # MemoryFs
//! └── /mnt/reference/    # any other Filesystem
//! ```
//!
//! A request is served by the nearest mount point at or above its path.

mod empty;
mod error;
mod memory;
mod namespace;
mod traits;

pub use empty::EmptyFs;
pub use error::{Op, VfsError};
pub use memory::MemoryFs;
pub use namespace::{BindMode, MountInfo, Namespace, new_namespace};
pub use traits::{DirEntry, DirEntryKind, FileMode, FileReader, Filesystem, ReadSeek};
