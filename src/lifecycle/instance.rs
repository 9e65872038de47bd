//! Single-instance coordination through a locked pid file.
//!
//! # Responsibilities
//! - Claim the listener role atomically across processes
//! - Take over pid files left behind by dead processes
//! - Release the pid file on every exit path we control
//!
//! # Design Decisions
//! - The claim is an exclusive `flock` on the pid file. The kernel drops it
//!   when the holder exits, so a dead holder can never block a new one
//! - The pid inside the file is informational; liveness is the lock itself
//! - After locking, the open file must still be the one linked at `path`,
//!   otherwise a releasing holder unlinked it under us and we retry
//! - Release unlinks the file before the lock is dropped

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

const MAX_ATTEMPTS: usize = 3;

/// Failure to claim the listener role.
#[derive(Debug, Error)]
pub enum InstanceError {
    /// A live process already holds the pid file.
    ///
    /// `pid` is `None` when the holder has locked the file but not yet
    /// written its pid.
    #[error("another instance is already running{}", describe_holder(.pid))]
    AlreadyRunning { pid: Option<u32> },

    #[error("pid file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn describe_holder(pid: &Option<u32>) -> String {
    pid.map(|pid| format!(" (pid {})", pid)).unwrap_or_default()
}

/// Token proving this process holds the pid file. Dropping it releases.
#[derive(Debug)]
pub struct InstanceGuard {
    path: PathBuf,
    pid: u32,
    // Holds the lock; must outlive the unlink in `Drop`.
    _file: File,
}

impl InstanceGuard {
    /// Claim `path` for the current process.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self, InstanceError> {
        let path = path.as_ref();
        let pid = std::process::id();
        let io_err = |source: io::Error| InstanceError::Io {
            path: path.to_path_buf(),
            source,
        };

        for _ in 0..MAX_ATTEMPTS {
            let Some(mut file) = claim(path).map_err(io_err)? else {
                return Err(InstanceError::AlreadyRunning { pid: read_pid(path) });
            };
            if !still_linked(&file, path).map_err(io_err)? {
                tracing::debug!(path = %path.display(), "Pid file was released while locking; retrying");
                continue;
            }

            if let Some(previous) = read_pid(path) {
                tracing::info!(path = %path.display(), stale_pid = previous, "Taking over stale pid file");
            }
            write_pid(&mut file, pid).map_err(io_err)?;

            tracing::debug!(path = %path.display(), pid, "Pid file acquired");
            return Ok(Self {
                path: path.to_path_buf(),
                pid,
                _file: file,
            });
        }

        Err(io_err(io::Error::new(
            io::ErrorKind::WouldBlock,
            "pid file is contended",
        )))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Release the pid file now rather than at drop.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        if read_pid(&self.path) == Some(self.pid) {
            match fs::remove_file(&self.path) {
                Ok(()) => tracing::debug!(path = %self.path.display(), "Pid file released"),
                Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove pid file"),
            }
        }
    }
}

/// Pid of the live process holding `path`, if any.
pub fn read_holder(path: impl AsRef<Path>) -> Option<u32> {
    read_pid(path.as_ref()).filter(|pid| is_alive(*pid))
}

/// Open `path` and take the exclusive lock, or `None` if someone holds it.
#[cfg(unix)]
fn claim(path: &Path) -> io::Result<Option<File>> {
    use std::os::unix::io::AsRawFd;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;

    // SAFETY: the descriptor is owned by `file` and stays open for the call.
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        return Ok(Some(file));
    }
    let err = io::Error::last_os_error();
    if err.kind() == io::ErrorKind::WouldBlock {
        Ok(None)
    } else {
        Err(err)
    }
}

/// Without `flock` the claim falls back to exclusive create, so stale files
/// must be removed by hand.
#[cfg(not(unix))]
fn claim(path: &Path) -> io::Result<Option<File>> {
    match OpenOptions::new().read(true).write(true).create_new(true).open(path) {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(e),
    }
}

/// Whether `file` is still the inode linked at `path`.
#[cfg(unix)]
fn still_linked(file: &File, path: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let ours = file.metadata()?;
    match fs::metadata(path) {
        Ok(linked) => Ok(ours.dev() == linked.dev() && ours.ino() == linked.ino()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(not(unix))]
fn still_linked(_file: &File, _path: &Path) -> io::Result<bool> {
    Ok(true)
}

fn write_pid(file: &mut File, pid: u32) -> io::Result<()> {
    file.set_len(0)?;
    file.write_all(pid.to_string().as_bytes())?;
    file.sync_all()
}

fn read_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// Whether a process with `pid` exists.
#[cfg(unix)]
pub fn is_alive(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    if pid <= 0 {
        return false;
    }
    // SAFETY: signal 0 performs the permission and existence checks only.
    let rc = unsafe { libc::kill(pid, 0) };
    rc == 0 || io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

/// Without a portable liveness probe every recorded pid counts as alive.
#[cfg(not(unix))]
pub fn is_alive(_pid: u32) -> bool {
    true
}
