//! emptyvfs: an empty root directory for composable virtual filesystems.
//!
//! This crate provides:
//!
//! - **Filesystem**: The read-only capability trait every backend implements
//! - **EmptyFs**: A filesystem that is exactly one empty directory
//! - **Namespace**: Binds filesystems at mount points and resolves paths across them
//! - **new_namespace**: A namespace with `EmptyFs` already bound at `/`
//!
//! ```
//! use std::path::Path;
//! use emptyvfs::{BindMode, Filesystem, MemoryFs, new_namespace};
//!
//! # block_on(async {
//! let mut ns = new_namespace();
//! ns.bind("/pkg", MemoryFs::from_files([("readme", "hello")]), "/", BindMode::Replace);
//!
//! assert!(ns.stat(Path::new("/")).await.unwrap().is_dir());
//! assert_eq!(ns.read(Path::new("/pkg/readme")).await.unwrap(), b"hello");
//! assert!(ns.stat(Path::new("/other")).await.is_err());
//! # });
//! # fn block_on(f: impl std::future::Future<Output = ()>) {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod vfs;

pub use vfs::{
    BindMode, DirEntry, DirEntryKind, EmptyFs, FileMode, FileReader, Filesystem, MemoryFs,
    MountInfo, Namespace, Op, ReadSeek, VfsError, new_namespace,
};
