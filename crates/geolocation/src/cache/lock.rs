//! Advisory whole-file locks on cache files.
//!
//! Locks are `flock(2)` locks: they belong to the open file description, so
//! two handles opened separately conflict even inside one process. Waiting
//! is unbounded; a writer holding a lock forever stalls its readers.

use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;

/// Kind of lock to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Many readers at once.
    Shared,
    /// One writer, no readers.
    Exclusive,
}

impl LockMode {
    fn operation(self) -> libc::c_int {
        match self {
            Self::Shared => libc::LOCK_SH,
            Self::Exclusive => libc::LOCK_EX,
        }
    }
}

fn flock(file: &File, operation: libc::c_int) -> io::Result<()> {
    loop {
        // SAFETY: the descriptor is owned by `file` and open for the call.
        let ret = unsafe { libc::flock(file.as_raw_fd(), operation) };
        if ret == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

/// An open file holding an advisory lock until dropped.
#[derive(Debug)]
pub struct ScopedLock {
    file: File,
    mode: LockMode,
}

impl ScopedLock {
    /// Block until the lock is granted. Interrupted waits are retried.
    pub fn acquire(file: File, mode: LockMode) -> io::Result<Self> {
        flock(&file, mode.operation())?;
        Ok(Self { file, mode })
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }

    /// Release the lock and close the file, reporting unlock failures.
    pub fn release(self) -> io::Result<()> {
        flock(&self.file, libc::LOCK_UN)
    }
}

impl Drop for ScopedLock {
    fn drop(&mut self) {
        // Closing the descriptor would release the lock anyway.
        let _ = flock(&self.file, libc::LOCK_UN);
    }
}
