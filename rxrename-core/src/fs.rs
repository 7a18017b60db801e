//! Filesystem access used by the planner and executor.
//!
//! Planning only asks [`Filesystem::exists`] and [`Filesystem::is_dir`]. Nothing
//! stops another process from changing the directory between planning and
//! execution; the plan is a best-effort snapshot, not a transaction.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

pub trait Filesystem {
    /// True if anything (file, directory or symlink, even dangling) sits at `path`.
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn make_dirs(&self, path: &Path) -> io::Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// The real filesystem, with relative names resolved against `root`.
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Non-hidden entries directly under the root, sorted by name.
    ///
    /// Names that are not valid UTF-8 cannot be matched or renamed; they are skipped
    /// with a logged warning.
    pub fn list_entries(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::from)?;
            let Some(name) = entry.file_name().to_str() else {
                warn!(name = %entry.file_name().to_string_lossy(), "skipping non-UTF-8 filename");
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            names.push(name.to_string());
        }
        Ok(names)
    }
}

impl Filesystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).symlink_metadata().is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.resolve(path).is_dir()
    }

    fn make_dirs(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(self.resolve(path))
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(self.resolve(from), self.resolve(to))
    }
}

/// In-memory filesystem for exercising plans without touching disk.
///
/// Paths are compared exactly as given; the root directory (empty path) always exists.
#[derive(Debug, Default)]
pub struct MemoryFs {
    files: RefCell<BTreeSet<PathBuf>>,
    dirs: RefCell<BTreeSet<PathBuf>>,
    /// Renames whose source is in here fail with `PermissionDenied`.
    locked: RefCell<BTreeSet<PathBuf>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let fs = Self::new();
        for file in files {
            fs.add_file(file);
        }
        fs
    }

    pub fn add_file(&self, path: impl Into<PathBuf>) {
        self.files.borrow_mut().insert(path.into());
    }

    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        self.dirs.borrow_mut().insert(path.into());
    }

    pub fn lock(&self, path: impl Into<PathBuf>) {
        self.locked.borrow_mut().insert(path.into());
    }

    pub fn files(&self) -> Vec<PathBuf> {
        self.files.borrow().iter().cloned().collect()
    }
}

impl Filesystem for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains(path) || self.is_dir(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.as_os_str().is_empty() || self.dirs.borrow().contains(path)
    }

    fn make_dirs(&self, path: &Path) -> io::Result<()> {
        let mut dirs = self.dirs.borrow_mut();
        for ancestor in path.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                dirs.insert(ancestor.to_path_buf());
            }
        }
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if self.locked.borrow().contains(from) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is locked", from.display()),
            ));
        }
        let mut files = self.files.borrow_mut();
        if !files.remove(from) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", from.display()),
            ));
        }
        files.insert(to.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_local_fs_resolves_against_root() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), "a").unwrap();

        let fs = LocalFs::new(temp_dir.path());
        assert!(fs.exists(Path::new("a.txt")));
        assert!(!fs.exists(Path::new("b.txt")));

        fs.make_dirs(Path::new("out/nested")).unwrap();
        assert!(fs.is_dir(Path::new("out/nested")));

        fs.rename(Path::new("a.txt"), Path::new("out/nested/b.txt"))
            .unwrap();
        assert!(temp_dir.path().join("out/nested/b.txt").exists());
        assert!(!temp_dir.path().join("a.txt").exists());
    }

    #[test]
    fn test_list_entries_sorted_without_hidden() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["b.txt", ".hidden", "a.txt"] {
            std::fs::write(temp_dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(temp_dir.path().join("dir")).unwrap();
        std::fs::write(temp_dir.path().join("dir/inner.txt"), "").unwrap();

        let names = LocalFs::new(temp_dir.path()).list_entries().unwrap();
        assert_eq!(names, ["a.txt", "b.txt", "dir"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_exists() {
        let temp_dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink("missing", temp_dir.path().join("link")).unwrap();
        assert!(LocalFs::new(temp_dir.path()).exists(Path::new("link")));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_list_entries_skips_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(OsStr::from_bytes(b"bad\xff.txt")), "").unwrap();
        std::fs::write(temp_dir.path().join("good.txt"), "").unwrap();

        let names = LocalFs::new(temp_dir.path()).list_entries().unwrap();
        assert_eq!(names, ["good.txt"]);
    }

    #[test]
    fn test_memory_fs_rename() {
        let fs = MemoryFs::with_files(["a"]);
        fs.rename(Path::new("a"), Path::new("b")).unwrap();
        assert_eq!(fs.files(), [PathBuf::from("b")]);
        assert!(fs.rename(Path::new("a"), Path::new("c")).is_err());

        fs.lock("b");
        let err = fs.rename(Path::new("b"), Path::new("c")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }
}
