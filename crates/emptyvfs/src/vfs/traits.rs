//! Core VFS traits and types.

use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::io;
use std::ops::BitOr;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek};

/// Kind of directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirEntryKind {
    File,
    Directory,
}

/// File mode bits: a type bit plus Unix permission bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMode(pub u32);

impl FileMode {
    /// Set on directories.
    pub const DIR: FileMode = FileMode(1 << 31);
    /// All permission bits (`rwxrwxrwx`).
    pub const PERM: FileMode = FileMode(0o777);

    pub fn is_dir(self) -> bool {
        self.0 & Self::DIR.0 != 0
    }

    /// Permission bits only.
    pub fn perm(self) -> FileMode {
        FileMode(self.0 & Self::PERM.0)
    }
}

impl BitOr for FileMode {
    type Output = FileMode;

    fn bitor(self, rhs: FileMode) -> FileMode {
        FileMode(self.0 | rhs.0)
    }
}

impl fmt::Display for FileMode {
    /// Renders like `ls -l`: `drwxrwxrwx`, `-r--r--r--`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(10);
        out.push(if self.is_dir() { 'd' } else { '-' });
        for shift in [6u32, 3, 0] {
            let bits = (self.0 >> shift) & 0o7;
            out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
            out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
            out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
        }
        f.write_str(&out)
    }
}

/// A directory entry — the unified file metadata type.
///
/// Returned by `stat()`, `lstat()` and, one per child, by `list()`.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Name of the entry (not full path).
    pub name: String,
    /// Kind of entry.
    pub kind: DirEntryKind,
    /// Size in bytes (0 for directories).
    pub size: u64,
    /// Type and permission bits.
    pub mode: FileMode,
    /// Last modification time, if available.
    pub modified: Option<SystemTime>,
    /// Backend-specific extension data. Nothing in this crate fills it.
    pub sys: Option<Arc<dyn Any + Send + Sync>>,
}

impl DirEntry {
    /// Create a new directory entry with full permissions.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DirEntryKind::Directory,
            size: 0,
            mode: FileMode::DIR | FileMode::PERM,
            modified: None,
            sys: None,
        }
    }

    /// Create a new file entry.
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            kind: DirEntryKind::File,
            size,
            mode: FileMode(0o644),
            modified: None,
            sys: None,
        }
    }

    /// Replace the type and permission bits.
    pub fn with_mode(mut self, mode: FileMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the modification time.
    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Returns true if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == DirEntryKind::Directory
    }

    /// Returns true if this entry is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind == DirEntryKind::File
    }
}

impl PartialEq for DirEntry {
    fn eq(&self, other: &Self) -> bool {
        let sys_eq = match (&self.sys, &other.sys) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        self.name == other.name
            && self.kind == other.kind
            && self.size == other.size
            && self.mode == other.mode
            && self.modified == other.modified
            && sys_eq
    }
}

/// Byte stream handed out by [`Filesystem::open`].
pub trait ReadSeek: AsyncRead + AsyncSeek + Send + Unpin {}

impl<T: AsyncRead + AsyncSeek + Send + Unpin> ReadSeek for T {}

pub type FileReader = Box<dyn ReadSeek>;

/// Read-only filesystem interface.
///
/// Paths arrive canonical and absolute: the namespace cleans them before
/// dispatch, so a backend sees `/` for its own root and `/a/b` below it.
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Open a file for reading.
    async fn open(&self, path: &Path) -> io::Result<FileReader>;

    /// Get metadata for a file or directory.
    async fn stat(&self, path: &Path) -> io::Result<DirEntry>;

    /// Get metadata without following symlinks.
    async fn lstat(&self, path: &Path) -> io::Result<DirEntry> {
        // Default: same as stat (for backends that don't support symlinks)
        self.stat(path).await
    }

    /// List entries in a directory.
    async fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Short identifier for diagnostics.
    fn describe(&self) -> &str;

    /// Read the entire contents of a file.
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let mut reader = self.open(path).await?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        Ok(data)
    }

    /// Check if a path exists.
    async fn exists(&self, path: &Path) -> bool {
        self.stat(path).await.is_ok()
    }
}
