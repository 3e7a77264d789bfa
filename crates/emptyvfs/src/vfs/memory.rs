//! In-memory filesystem implementation.
//!
//! Built once from a set of `(path, content)` pairs and read-only after
//! that. Parent directories of every file are implied.

use super::error::{Op, VfsError};
use super::traits::{DirEntry, FileMode, FileReader, Filesystem};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::{self, Cursor};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Entry in the memory filesystem.
#[derive(Debug, Clone)]
enum Entry {
    File { data: Arc<[u8]> },
    Directory,
}

/// Map-backed read-only filesystem.
///
/// Keys are stored relative (`a/b.txt`); the root is the empty path.
#[derive(Debug, Clone)]
pub struct MemoryFs {
    entries: BTreeMap<PathBuf, Entry>,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFs {
    /// Create a filesystem with only a root directory.
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        // Root directory always exists
        entries.insert(PathBuf::new(), Entry::Directory);
        Self { entries }
    }

    /// Create a filesystem holding the given files.
    ///
    /// A later file replaces an earlier one with the same path. A file whose
    /// path is also needed as a directory is shadowed by the directory.
    pub fn from_files<I, P, D>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, D)>,
        P: AsRef<Path>,
        D: AsRef<[u8]>,
    {
        let mut fs = Self::new();
        for (path, data) in files {
            let normalized = Self::normalize(path.as_ref());
            if normalized.as_os_str().is_empty() {
                continue;
            }
            fs.insert_file(normalized, data.as_ref());
        }
        fs
    }

    fn insert_file(&mut self, normalized: PathBuf, data: &[u8]) {
        let mut current = PathBuf::new();
        for component in normalized.parent().into_iter().flat_map(|p| p.components()) {
            if let Component::Normal(s) = component {
                current.push(s);
                self.entries.insert(current.clone(), Entry::Directory);
            }
        }
        if !matches!(self.entries.get(&normalized), Some(Entry::Directory)) {
            self.entries.insert(normalized, Entry::File { data: Arc::from(data) });
        }
    }

    /// Normalize a path: remove leading `/`, resolve `.` and `..`.
    fn normalize(path: &Path) -> PathBuf {
        let mut result = PathBuf::new();
        for component in path.components() {
            match component {
                Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
                Component::ParentDir => {
                    result.pop();
                }
                Component::Normal(s) => {
                    result.push(s);
                }
            }
        }
        result
    }

    fn describe_entry(path: &Path, entry: &Entry) -> DirEntry {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "/".to_string());
        match entry {
            Entry::File { data } => {
                DirEntry::file(name, data.len() as u64).with_mode(FileMode(0o444))
            }
            Entry::Directory => {
                DirEntry::directory(name).with_mode(FileMode::DIR | FileMode(0o555))
            }
        }
    }
}

#[async_trait]
impl Filesystem for MemoryFs {
    async fn open(&self, path: &Path) -> io::Result<FileReader> {
        match self.entries.get(&Self::normalize(path)) {
            Some(Entry::File { data }) => Ok(Box::new(Cursor::new(Arc::clone(data)))),
            Some(Entry::Directory) => Err(VfsError::is_a_directory(Op::Open, path).into()),
            None => Err(VfsError::not_found(Op::Open, path).into()),
        }
    }

    async fn stat(&self, path: &Path) -> io::Result<DirEntry> {
        let normalized = Self::normalize(path);
        match self.entries.get(&normalized) {
            Some(entry) => Ok(Self::describe_entry(&normalized, entry)),
            None => Err(VfsError::not_found(Op::Stat, path).into()),
        }
    }

    async fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let normalized = Self::normalize(path);

        // Verify the path is a directory
        match self.entries.get(&normalized) {
            Some(Entry::Directory) => {}
            Some(Entry::File { .. }) => {
                return Err(VfsError::not_a_directory(Op::ReadDir, path).into());
            }
            None => return Err(VfsError::not_found(Op::ReadDir, path).into()),
        }

        // BTreeMap iteration keeps the result sorted by name
        let result = self
            .entries
            .iter()
            .filter(|(entry_path, _)| {
                entry_path.parent() == Some(normalized.as_path()) && **entry_path != normalized
            })
            .map(|(entry_path, entry)| Self::describe_entry(entry_path, entry))
            .collect();
        Ok(result)
    }

    fn describe(&self) -> &str {
        "memfs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryFs {
        MemoryFs::from_files([
            ("readme", "hello"),
            ("src/main.rs", "fn main() {}"),
            ("src/lib/mod.rs", ""),
        ])
    }

    #[tokio::test]
    async fn test_read() {
        let fs = sample();
        let data = fs.read(Path::new("/readme")).await.unwrap();
        assert_eq!(data, b"hello");
    }

    #[tokio::test]
    async fn test_open_is_seekable() {
        use tokio::io::{AsyncReadExt, AsyncSeekExt};

        let fs = sample();
        let mut reader = fs.open(Path::new("/readme")).await.unwrap();
        reader.seek(io::SeekFrom::Start(1)).await.unwrap();
        let mut rest = String::new();
        reader.read_to_string(&mut rest).await.unwrap();
        assert_eq!(rest, "ello");
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let fs = sample();
        let result = fs.read(Path::new("/nonexistent.txt")).await;
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_open_directory_fails() {
        let fs = sample();
        let err = fs.open(Path::new("/src")).await.err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::IsADirectory);
    }

    #[tokio::test]
    async fn test_implied_directories() {
        let fs = sample();
        assert!(fs.stat(Path::new("/src")).await.unwrap().is_dir());
        assert!(fs.stat(Path::new("/src/lib")).await.unwrap().is_dir());

        let root = fs.stat(Path::new("/")).await.unwrap();
        assert!(root.is_dir());
        assert_eq!(root.name, "/");
    }

    #[tokio::test]
    async fn test_stat_file() {
        let fs = sample();
        let entry = fs.stat(Path::new("/src/main.rs")).await.unwrap();
        assert!(entry.is_file());
        assert_eq!(entry.name, "main.rs");
        assert_eq!(entry.size, 12);
        assert_eq!(entry.mode, FileMode(0o444));
    }

    #[tokio::test]
    async fn test_list_directory() {
        let fs = sample();
        let entries = fs.list(Path::new("/")).await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["readme", "src"]);

        let entries = fs.list(Path::new("/src")).await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["lib", "main.rs"]);
    }

    #[tokio::test]
    async fn test_list_file_fails() {
        let fs = sample();
        let err = fs.list(Path::new("/readme")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotADirectory);
    }

    #[tokio::test]
    async fn test_path_normalization() {
        let fs = sample();

        // Various path forms should all work
        let data1 = fs.read(Path::new("src/main.rs")).await.unwrap();
        let data2 = fs.read(Path::new("/src/main.rs")).await.unwrap();
        let data3 = fs.read(Path::new("src/./main.rs")).await.unwrap();
        let data4 = fs.read(Path::new("src/lib/../main.rs")).await.unwrap();

        assert_eq!(data1, data2);
        assert_eq!(data2, data3);
        assert_eq!(data3, data4);
    }

    #[tokio::test]
    async fn test_later_file_wins() {
        let fs = MemoryFs::from_files([("a.txt", "first"), ("a.txt", "second")]);
        let data = fs.read(Path::new("/a.txt")).await.unwrap();
        assert_eq!(data, b"second");
    }

    #[tokio::test]
    async fn test_directory_shadows_file() {
        let fs = MemoryFs::from_files([("a/b.txt", "x"), ("a", "file")]);
        assert!(fs.stat(Path::new("/a")).await.unwrap().is_dir());
    }
}
