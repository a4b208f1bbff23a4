//! Abstractions for filesystem access to enable testing and mocking.
//!
//! Every reader goes through the `FileSystem` trait, so a collector can be
//! pointed at the real `/proc` on Linux or at an in-memory `/proc` in tests.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Abstraction for filesystem operations.
///
/// Implementations must be safe to share between threads: each call opens,
/// reads and closes its own handle.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file.
    ///
    /// Content is returned as raw bytes; decoding is left to the caller so a
    /// non-UTF-8 file is not mistaken for a read failure.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Reads at most `limit` bytes from the start of a file.
    ///
    /// Content is returned as raw bytes; no UTF-8 validation is performed.
    fn read_bytes(&self, path: &Path, limit: usize) -> io::Result<Vec<u8>>;

    /// Lists entries in a directory.
    ///
    /// # Returns
    /// A vector of paths to entries in the directory, or an I/O error.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Real filesystem implementation that delegates to `std::fs`.
///
/// Use this in production to read from the actual `/proc` filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn read_bytes(&self, path: &Path, limit: usize) -> io::Result<Vec<u8>> {
        let file = File::open(path)?;
        let mut buf = Vec::with_capacity(limit.min(4096));
        file.take(limit as u64).read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }
}
