//! Temporary cache directories.

use std::fs;
use std::path::{Path, PathBuf};

/// A temporary directory standing in for a cache directory.
///
/// The directory is removed when dropped.
pub struct TempCacheDir {
    dir: tempfile::TempDir,
}

impl TempCacheDir {
    /// Creates an empty cache directory.
    pub fn new() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("latlon_cache")
            .tempdir()
            .expect("Failed to create temporary cache directory");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file inside the directory.
    pub fn entry(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Names of the files currently in the directory, sorted.
    pub fn entries(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.dir.path())
            .expect("Failed to list cache directory")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Size in bytes of a file inside the directory.
    pub fn entry_len(&self, name: &str) -> u64 {
        fs::metadata(self.entry(name))
            .expect("Failed to stat cache entry")
            .len()
    }

    /// Cuts a file down to `len` bytes, simulating an interrupted write.
    pub fn truncate(&self, name: &str, len: u64) {
        let file = fs::OpenOptions::new()
            .write(true)
            .open(self.entry(name))
            .expect("Failed to open cache entry");
        file.set_len(len).expect("Failed to truncate cache entry");
    }
}

impl Default for TempCacheDir {
    fn default() -> Self {
        Self::new()
    }
}
