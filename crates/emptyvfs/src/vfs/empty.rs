//! EmptyFs — a read-only filesystem holding one empty directory.
//!
//! Bound at `/` by [`new_namespace`](crate::new_namespace) so that stat and
//! list of the namespace root succeed even when nothing else is mounted
//! there. Every other path is not found.

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use async_trait::async_trait;

use super::error::{Op, VfsError};
use super::traits::{DirEntry, FileReader, Filesystem};

/// The only path this filesystem knows about.
const ROOT: &str = "/";

/// An empty, immutable root directory.
#[derive(Debug, Clone)]
pub struct EmptyFs {
    root: DirEntry,
}

impl Default for EmptyFs {
    fn default() -> Self {
        Self::new()
    }
}

impl EmptyFs {
    /// Create an empty root directory stamped with the current time.
    pub fn new() -> Self {
        Self::with_created(SystemTime::now())
    }

    /// Create an empty root directory with a fixed creation time.
    pub fn with_created(created: SystemTime) -> Self {
        Self {
            root: DirEntry::directory("root").with_modified(created),
        }
    }

    /// The descriptor returned by `stat("/")`.
    pub fn entry(&self) -> &DirEntry {
        &self.root
    }

    /// When this filesystem was created.
    pub fn created(&self) -> SystemTime {
        // `root.modified` is always set by the constructor.
        self.root.modified.unwrap_or(SystemTime::UNIX_EPOCH)
    }

    /// Exact match only; the namespace hands us canonical paths.
    fn is_root(path: &Path) -> bool {
        path.as_os_str() == OsStr::new(ROOT)
    }

    fn lookup(&self, op: Op, path: &Path) -> io::Result<DirEntry> {
        if Self::is_root(path) {
            Ok(self.root.clone())
        } else {
            Err(VfsError::not_found(op, path).into())
        }
    }
}

#[async_trait]
impl Filesystem for EmptyFs {
    async fn open(&self, path: &Path) -> io::Result<FileReader> {
        if Self::is_root(path) {
            return Err(VfsError::is_a_directory(Op::Open, path).into());
        }
        Err(VfsError::not_found(Op::Open, path).into())
    }

    async fn stat(&self, path: &Path) -> io::Result<DirEntry> {
        self.lookup(Op::Stat, path)
    }

    async fn lstat(&self, path: &Path) -> io::Result<DirEntry> {
        self.lookup(Op::Lstat, path)
    }

    async fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        if Self::is_root(path) {
            return Ok(Vec::new());
        }
        Err(VfsError::not_found(Op::ReadDir, path).into())
    }

    fn describe(&self) -> &str {
        "emptyVFS"
    }
}
