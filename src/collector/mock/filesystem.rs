//! In-memory mock filesystem for testing collectors without real `/proc`.
//!
//! This module provides `MockFs` which simulates a filesystem in memory,
//! allowing tests to run on macOS and in CI environments without Linux.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Stores files and directories in memory, allowing tests to simulate
/// various `/proc` filesystem states without needing actual Linux access.
/// Paths registered with [`MockFs::add_unreadable`] are listed like regular
/// files but fail every read, which is how a process exiting between the
/// directory scan and the file read looks to a collector.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, Vec<u8>>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
    /// Paths whose reads fail with the given error kind.
    failures: HashMap<PathBuf, io::ErrorKind>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.failures.remove(&path);
        self.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    /// Adds a file that exists in directory listings but cannot be read.
    pub fn add_unreadable(&mut self, path: impl AsRef<Path>, kind: io::ErrorKind) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.remove(&path);
        self.failures.insert(path, kind);
    }

    /// Adds a process directory with its `cmdline` file.
    ///
    /// # Arguments
    /// * `pid` - Process ID
    /// * `cmdline` - Raw content of `/proc/[pid]/cmdline`, NUL separators included
    pub fn add_process(&mut self, pid: u32, cmdline: impl Into<Vec<u8>>) {
        let base = PathBuf::from(format!("/proc/{}", pid));
        self.add_dir(&base);
        self.add_file(base.join("cmdline"), cmdline);
    }

    /// Loads a mock filesystem from a directory snapshot.
    ///
    /// This is useful for regression tests with real `/proc` snapshots.
    pub fn from_snapshot(dir: &Path) -> io::Result<Self> {
        let mut fs = Self::new();
        load_directory_recursive(&mut fs, dir, Path::new("/proc"))?;
        Ok(fs)
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    fn lookup(&self, path: &Path) -> io::Result<&[u8]> {
        if let Some(kind) = self.failures.get(path) {
            return Err(io::Error::new(*kind, format!("simulated failure: {:?}", path)));
        }
        self.files.get(path).map(Vec::as_slice).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("file not found: {:?}", path))
        })
    }
}

fn load_directory_recursive(
    fs: &mut MockFs,
    real_path: &Path,
    virtual_path: &Path,
) -> io::Result<()> {
    fs.add_dir(virtual_path);

    for entry in std::fs::read_dir(real_path)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let name = entry.file_name();
        let real_child = entry.path();
        let virtual_child = virtual_path.join(&name);

        if file_type.is_dir() {
            load_directory_recursive(fs, &real_child, &virtual_child)?;
        } else if file_type.is_file() {
            match std::fs::read(&real_child) {
                Ok(content) => fs.add_file(&virtual_child, content),
                Err(e) => fs.add_unreadable(&virtual_child, e.kind()),
            }
        }
    }
    Ok(())
}

impl FileSystem for MockFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.lookup(path).map(<[u8]>::to_vec)
    }

    fn read_bytes(&self, path: &Path, limit: usize) -> io::Result<Vec<u8>> {
        let bytes = self.lookup(path)?;
        Ok(bytes[..bytes.len().min(limit)].to_vec())
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if let Some(kind) = self.failures.get(path) {
            return Err(io::Error::new(*kind, format!("simulated failure: {:?}", path)));
        }
        if !self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let mut entries = HashSet::new();

        // Direct children only
        let children = self
            .files
            .keys()
            .chain(self.failures.keys())
            .chain(self.directories.iter());
        for child in children {
            if child != path && child.parent().is_some_and(|parent| parent == path) {
                entries.insert(child.clone());
            }
        }

        Ok(entries.into_iter().collect())
    }
}
