//! Namespace: a union of filesystems bound at mount points.
//!
//! Each mount point holds an ordered list of bindings. A request for a path
//! is served by the nearest mount point at or above it, trying its bindings
//! in order. Listings merge every binding and add directories leading to
//! mount points further down.

use super::empty::EmptyFs;
use super::error::{Op, VfsError};
use super::traits::{DirEntry, FileMode, FileReader, Filesystem};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::future::Future;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// How a new binding combines with what is already visible at its mount point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    /// Discard existing bindings at the mount point.
    Replace,
    /// Try the new filesystem first, then what was visible before.
    Before,
    /// Try what was visible before, then the new filesystem.
    After,
}

/// Information about one binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountInfo {
    /// Where the binding appears in the namespace (e.g., "/pkg").
    pub mount_point: PathBuf,
    /// The directory inside the bound filesystem that appears there.
    pub target: PathBuf,
    /// The bound filesystem's `describe()` string.
    pub fs: String,
}

#[derive(Clone)]
struct Mount {
    old: PathBuf,
    fs: Arc<dyn Filesystem>,
    new: PathBuf,
}

impl Mount {
    /// Map a namespace path under `old` to the bound filesystem's path.
    fn translate(&self, path: &Path) -> PathBuf {
        match path.strip_prefix(&self.old) {
            Ok(rest) if !rest.as_os_str().is_empty() => self.new.join(rest),
            _ => self.new.clone(),
        }
    }
}

/// A composable set of filesystems bound at mount points.
///
/// An empty `Namespace` has nothing at `/`, so even `stat("/")` fails until
/// something is bound there. See [`new_namespace`].
#[derive(Clone, Default)]
pub struct Namespace {
    /// Bindings keyed by cleaned mount point, in precedence order.
    mounts: BTreeMap<PathBuf, Vec<Mount>>,
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("mounts", &self.mounts.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "namespace {{")?;
        for (old, bindings) in &self.mounts {
            writeln!(f, "\t{}:", old.display())?;
            for m in bindings {
                writeln!(f, "\t\t{} {}", m.fs.describe(), m.new.display())?;
            }
        }
        write!(f, "}}")
    }
}

impl Namespace {
    /// Create a namespace with nothing bound.
    pub fn new() -> Self {
        Self {
            mounts: BTreeMap::new(),
        }
    }

    /// Bind the subtree `new` of `fs` at mount point `old`.
    pub fn bind(
        &mut self,
        old: impl AsRef<Path>,
        fs: impl Filesystem + 'static,
        new: impl AsRef<Path>,
        mode: BindMode,
    ) {
        self.bind_arc(old, Arc::new(fs), new, mode);
    }

    /// Bind a filesystem (already wrapped in Arc) at mount point `old`.
    ///
    /// With `Before` or `After`, whatever was visible at `old` (possibly
    /// inherited from a mount point above it) is kept alongside the new
    /// binding, rebased so it serves the same paths as before.
    pub fn bind_arc(
        &mut self,
        old: impl AsRef<Path>,
        fs: Arc<dyn Filesystem>,
        new: impl AsRef<Path>,
        mode: BindMode,
    ) {
        let old = clean(old.as_ref());
        let new = clean(new.as_ref());
        tracing::debug!(
            mount_point = %old.display(),
            target = %new.display(),
            fs = fs.describe(),
            ?mode,
            "bind"
        );

        let mount = Mount {
            old: old.clone(),
            fs,
            new,
        };
        let visible = || self.resolve(&old).to_vec();
        let mut bindings = match mode {
            BindMode::Replace => vec![mount],
            BindMode::Before => {
                let mut v = vec![mount];
                v.extend(visible());
                v
            }
            BindMode::After => {
                let mut v = visible();
                v.push(mount);
                v
            }
        };

        for m in &mut bindings {
            if m.old != old {
                // Inherited from an ancestor mount point; `resolve` only
                // returns ancestors, so the prefix always strips.
                if let Ok(suffix) = old.strip_prefix(&m.old) {
                    m.new = m.new.join(suffix);
                }
                m.old = old.clone();
            }
        }

        self.mounts.insert(old, bindings);
    }

    /// Remove every binding at the given mount point.
    ///
    /// Returns `true` if a mount was removed, `false` if nothing was mounted there.
    pub fn unmount(&mut self, old: impl AsRef<Path>) -> bool {
        let old = clean(old.as_ref());
        let removed = self.mounts.remove(&old).is_some();
        tracing::debug!(mount_point = %old.display(), removed, "unmount");
        removed
    }

    /// List all bindings, by mount point then precedence.
    pub fn mounts(&self) -> Vec<MountInfo> {
        self.mounts
            .values()
            .flatten()
            .map(|m| MountInfo {
                mount_point: m.old.clone(),
                target: m.new.clone(),
                fs: m.fs.describe().to_string(),
            })
            .collect()
    }

    /// Bindings of the nearest mount point at or above `path`.
    ///
    /// `path` must already be clean.
    fn resolve(&self, path: &Path) -> &[Mount] {
        let mut dir = Some(path);
        while let Some(p) = dir {
            if let Some(bindings) = self.mounts.get(p) {
                return bindings;
            }
            dir = p.parent();
        }
        tracing::trace!(path = %path.display(), "no mount point");
        &[]
    }

    /// Try each binding in order until one succeeds.
    ///
    /// The first error is reported, except that a not-found from one binding
    /// gives way to a more specific error from a later one.
    async fn first_ok<'a, T, F, Fut>(&'a self, op: Op, path: &Path, f: F) -> io::Result<T>
    where
        F: Fn(&'a dyn Filesystem, PathBuf) -> Fut,
        Fut: Future<Output = io::Result<T>>,
    {
        let path = clean(path);
        let mut err: Option<io::Error> = None;
        for m in self.resolve(&path) {
            match f(m.fs.as_ref(), m.translate(&path)).await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    let replace = match &err {
                        None => true,
                        Some(prev) => {
                            prev.kind() == io::ErrorKind::NotFound
                                && e.kind() != io::ErrorKind::NotFound
                        }
                    };
                    if replace {
                        err = Some(e);
                    }
                }
            }
        }
        Err(err.unwrap_or_else(|| VfsError::not_found(op, path).into()))
    }
}

#[async_trait]
impl Filesystem for Namespace {
    async fn open(&self, path: &Path) -> io::Result<FileReader> {
        self.first_ok(Op::Open, path, |fs, p| async move { fs.open(&p).await })
            .await
    }

    async fn stat(&self, path: &Path) -> io::Result<DirEntry> {
        self.first_ok(Op::Stat, path, |fs, p| async move { fs.stat(&p).await })
            .await
    }

    async fn lstat(&self, path: &Path) -> io::Result<DirEntry> {
        self.first_ok(Op::Lstat, path, |fs, p| async move { fs.lstat(&p).await })
            .await
    }

    async fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let path = clean(path);
        let mut entries = Vec::new();
        let mut seen = HashSet::new();
        let mut listed = false;
        let mut err: Option<io::Error> = None;

        for m in self.resolve(&path) {
            match m.fs.list(&m.translate(&path)).await {
                Ok(dir) => {
                    listed = true;
                    for entry in dir {
                        if seen.insert(entry.name.clone()) {
                            entries.push(entry);
                        }
                    }
                }
                Err(e) => {
                    if err.is_none() {
                        err = Some(e);
                    }
                }
            }
        }

        // Directories leading down to deeper mount points
        for old in self.mounts.keys() {
            if *old == path {
                continue;
            }
            let Ok(rest) = old.strip_prefix(&path) else {
                continue;
            };
            if let Some(Component::Normal(first)) = rest.components().next() {
                let name = first.to_string_lossy().into_owned();
                if seen.insert(name.clone()) {
                    entries.push(
                        DirEntry::directory(name).with_mode(FileMode::DIR | FileMode(0o555)),
                    );
                }
            }
        }

        if entries.is_empty() && !listed {
            return Err(err.unwrap_or_else(|| VfsError::not_found(Op::ReadDir, path).into()));
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn describe(&self) -> &str {
        "ns"
    }
}

/// Clean a namespace path: rooted at `/`, `.` and `..` resolved, no
/// trailing slash.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::Normal(s) => out.push(s),
            Component::ParentDir => {
                out.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    out
}

/// Create a namespace with an empty directory bound at `/`.
///
/// Stat and list of `/` succeed on the result even before anything else is
/// bound, and paths nobody claims fail with not-found. Every call builds
/// its own [`EmptyFs`], timestamped now.
pub fn new_namespace() -> Namespace {
    let mut ns = Namespace::new();
    ns.bind("/", EmptyFs::new(), "/", BindMode::Replace);
    ns
}
