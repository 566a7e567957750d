//! Locked on-disk store of computed coordinate buffers.
//!
//! Each entry is one file holding the latitude block followed by the
//! longitude block as native-endian `f64`, with no header. An entry is
//! either absent, complete, or corrupt; corrupt entries are purged and
//! recomputed, never patched. Writers publish entries by rename.

use std::ffi::CString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, warn};

use crate::cache::key::{build_key, CacheKey};
use crate::cache::lock::{LockMode, ScopedLock};
use crate::config::CacheConfig;
use crate::descriptor::GridDescriptor;
use crate::engine::ComputedBuffer;
use crate::error::{GeolocationError, Result};
use crate::types::CacheStats;

const VALUE_SIZE: u64 = std::mem::size_of::<f64>() as u64;

/// Permission bits of a finished entry.
const ENTRY_MODE: u32 = 0o644;

/// Check that a cache configuration is usable before any cache operation.
///
/// The directory must exist and be readable, writable and searchable by
/// this process.
pub fn preflight(config: &CacheConfig) -> Result<()> {
    config.validate().map_err(GeolocationError::config)?;

    let dir = &config.directory;
    let meta = fs::metadata(dir).map_err(|e| {
        GeolocationError::config(format!(
            "cache directory {} is not accessible: {}",
            dir.display(),
            e
        ))
    })?;
    if !meta.is_dir() {
        return Err(GeolocationError::config(format!(
            "cache path {} is not a directory",
            dir.display()
        )));
    }

    let c_path = CString::new(dir.as_os_str().as_bytes())
        .map_err(|_| GeolocationError::config("cache directory path contains a NUL byte"))?;
    // SAFETY: `c_path` is a valid NUL-terminated string for the whole call.
    let ret = unsafe { libc::access(c_path.as_ptr(), libc::R_OK | libc::W_OK | libc::X_OK) };
    if ret != 0 {
        return Err(GeolocationError::config(format!(
            "cache directory {} needs read, write and search permission: {}",
            dir.display(),
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

/// File cache of full-resolution latitude/longitude buffers.
///
/// Create one per process and share it; every operation takes `&self`.
pub struct LatLonCache {
    directory: PathBuf,
    prefix: String,
    max_size_bytes: u64,
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    purges: AtomicU64,
}

impl LatLonCache {
    /// Open the cache after a successful [`preflight`].
    pub fn open(config: &CacheConfig) -> Result<Self> {
        preflight(config)?;
        info!(
            directory = %config.directory.display(),
            prefix = %config.file_prefix,
            max_size_bytes = config.max_size_bytes,
            "geolocation cache enabled"
        );
        Ok(Self {
            directory: config.directory.clone(),
            prefix: config.file_prefix.clone(),
            max_size_bytes: config.max_size_bytes,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            purges: AtomicU64::new(0),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Key for a grid, if its coordinates are cached at all.
    pub fn key_for(&self, descriptor: &GridDescriptor) -> Option<CacheKey> {
        if !descriptor.is_cacheable() {
            return None;
        }
        build_key(&self.prefix, descriptor)
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.directory.join(&key.file_name)
    }

    fn lock_error(path: &Path, err: io::Error) -> GeolocationError {
        GeolocationError::lock(path.display().to_string(), err)
    }

    /// Open an entry for reading under a shared lock.
    ///
    /// Returns `Ok(None)` when the entry does not exist and `CacheCorrupt`
    /// when its size is wrong.
    pub fn get(&self, key: &CacheKey) -> Result<Option<CacheReader>> {
        let path = self.path_for(key);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key.file_name, "cache miss");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let lock =
            ScopedLock::acquire(file, LockMode::Shared).map_err(|e| Self::lock_error(&path, e))?;
        let len = lock.file().metadata()?.len();
        if len != key.expected_size {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Err(GeolocationError::corrupt(
                &key.file_name,
                format!("{} bytes on disk, expected {}", len, key.expected_size),
            ));
        }

        self.hits.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key.file_name, "cache hit");
        Ok(Some(CacheReader {
            lock,
            path,
            key: key.file_name.clone(),
            len,
        }))
    }

    /// Write a complete entry.
    ///
    /// The buffer is written to a temporary file in the cache directory and
    /// renamed over the entry path, so readers only ever open a missing or
    /// complete file. The rename happens while holding an exclusive lock on
    /// the entry being replaced, if any. Entries larger than the configured
    /// maximum size are skipped.
    pub fn put(&self, key: &CacheKey, buffer: &ComputedBuffer) -> Result<()> {
        let size = buffer.byte_len();
        if size != key.expected_size {
            return Err(GeolocationError::Io(format!(
                "buffer of {} bytes does not match entry {} of {} bytes",
                size, key.file_name, key.expected_size
            )));
        }
        if size > self.max_size_bytes {
            warn!(
                key = %key.file_name,
                size,
                max_size_bytes = self.max_size_bytes,
                "entry exceeds cache size limit, not stored"
            );
            return Ok(());
        }

        let temp_prefix = format!(".{}", self.prefix);
        let mut temp = tempfile::Builder::new()
            .prefix(&temp_prefix)
            .suffix(".tmp")
            .tempfile_in(&self.directory)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            writer.write_all(bytemuck::cast_slice(&buffer.latitude))?;
            writer.write_all(bytemuck::cast_slice(&buffer.longitude))?;
            writer.flush()?;
        }
        temp.as_file().sync_data()?;
        temp.as_file()
            .set_permissions(fs::Permissions::from_mode(ENTRY_MODE))?;

        let path = self.path_for(key);
        let replaced = match File::open(&path) {
            Ok(file) => Some(
                ScopedLock::acquire(file, LockMode::Exclusive)
                    .map_err(|e| Self::lock_error(&path, e))?,
            ),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        temp.persist(&path).map_err(|e| GeolocationError::from(e.error))?;
        if let Some(lock) = replaced {
            lock.release().map_err(|e| Self::lock_error(&path, e))?;
        }

        self.writes.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key.file_name, bytes = size, "cache entry written");
        Ok(())
    }

    /// Remove a corrupt entry.
    ///
    /// The file at the entry path is locked exclusively and removed only if
    /// it is still the file at that path and its size is still wrong. An
    /// entry completed by another process in the meantime is kept. Removing
    /// an absent entry succeeds.
    pub fn purge(&self, key: &CacheKey) -> Result<()> {
        let path = self.path_for(key);
        loop {
            let file = match File::open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
                Err(e) => return Err(e.into()),
            };
            let lock = ScopedLock::acquire(file, LockMode::Exclusive)
                .map_err(|e| Self::lock_error(&path, e))?;

            let held = lock.file().metadata()?;
            let current = match fs::metadata(&path) {
                Ok(meta) => meta,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
                Err(e) => return Err(e.into()),
            };
            if (held.dev(), held.ino()) != (current.dev(), current.ino()) {
                // Replaced while waiting for the lock; judge the new file.
                continue;
            }
            if held.len() == key.expected_size {
                debug!(key = %key.file_name, "cache entry complete, not purged");
                return Ok(());
            }

            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
                Err(e) => return Err(e.into()),
            }
            lock.release().map_err(|e| Self::lock_error(&path, e))?;
            self.purges.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key.file_name, "cache entry purged");
            return Ok(());
        }
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            purges: self.purges.load(Ordering::Relaxed),
        }
    }
}

/// A cache entry open for reading. Holds a shared lock until dropped.
#[derive(Debug)]
pub struct CacheReader {
    lock: ScopedLock,
    path: PathBuf,
    key: String,
    len: u64,
}

impl CacheReader {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read `count` values starting `offset` values into the entry.
    pub fn read_f64s(&mut self, offset: usize, count: usize) -> Result<Vec<f64>> {
        let start = offset as u64 * VALUE_SIZE;
        let end = start + count as u64 * VALUE_SIZE;
        if end > self.len {
            return Err(GeolocationError::corrupt(
                &self.key,
                format!("read of bytes {}..{} past end {}", start, end, self.len),
            ));
        }

        let key = &self.key;
        let file = self.lock.file_mut();
        file.seek(SeekFrom::Start(start))
            .map_err(|e| GeolocationError::corrupt(key, format!("seek to {}: {}", start, e)))?;

        let mut values = vec![0.0f64; count];
        file.read_exact(bytemuck::cast_slice_mut(&mut values))
            .map_err(|e| GeolocationError::corrupt(key, format!("short read at {}: {}", start, e)))?;
        Ok(values)
    }

    /// Release the shared lock and close the file.
    pub fn unlock_and_close(self) -> Result<()> {
        let path = self.path;
        self.lock
            .release()
            .map_err(|e| GeolocationError::lock(path.display().to_string(), e))
    }
}
