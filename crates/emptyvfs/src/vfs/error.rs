//! Filesystem errors.
//!
//! Backends build a [`VfsError`] naming the operation and path, then hand it
//! back as an `io::Error` with the matching kind. The original value stays
//! reachable through `io::Error::get_ref` for callers that want the detail.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The filesystem operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Open,
    Stat,
    Lstat,
    ReadDir,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Op::Open => "open",
            Op::Stat => "stat",
            Op::Lstat => "lstat",
            Op::ReadDir => "readdir",
        })
    }
}

/// VFS operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VfsError {
    #[error("{op} {}: not found", .path.display())]
    NotFound { op: Op, path: PathBuf },
    #[error("{op} {}: is a directory", .path.display())]
    IsADirectory { op: Op, path: PathBuf },
    #[error("{op} {}: not a directory", .path.display())]
    NotADirectory { op: Op, path: PathBuf },
}

impl VfsError {
    pub fn not_found(op: Op, path: impl Into<PathBuf>) -> Self {
        VfsError::NotFound { op, path: path.into() }
    }

    pub fn is_a_directory(op: Op, path: impl Into<PathBuf>) -> Self {
        VfsError::IsADirectory { op, path: path.into() }
    }

    pub fn not_a_directory(op: Op, path: impl Into<PathBuf>) -> Self {
        VfsError::NotADirectory { op, path: path.into() }
    }

    /// The `io::ErrorKind` this error surfaces as.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            VfsError::NotFound { .. } => io::ErrorKind::NotFound,
            VfsError::IsADirectory { .. } => io::ErrorKind::IsADirectory,
            VfsError::NotADirectory { .. } => io::ErrorKind::NotADirectory,
        }
    }

    pub fn op(&self) -> Op {
        match self {
            VfsError::NotFound { op, .. }
            | VfsError::IsADirectory { op, .. }
            | VfsError::NotADirectory { op, .. } => *op,
        }
    }
}

impl From<VfsError> for io::Error {
    fn from(err: VfsError) -> Self {
        io::Error::new(err.kind(), err)
    }
}
