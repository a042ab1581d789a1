use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{LockError, Result};

/// Holds the instance marker; the marker is removed when the guard drops.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(err) = unlock_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to remove lock file");
        }
    }
}

/// Creates the marker at `path` holding our pid. An existing marker means
/// another run is in progress, unless `reclaim_stale` is set and the
/// recorded pid is no longer alive.
pub fn acquire(path: &Path, reclaim_stale: bool) -> Result<LockGuard> {
    match lock_file(path, reclaim_stale) {
        Ok(None) => {
            tracing::debug!(path = %path.display(), pid = std::process::id(), "lock acquired");
            Ok(LockGuard {
                path: path.to_path_buf(),
            })
        }
        Ok(Some(pid)) => Err(LockError::AlreadyRunning {
            path: path.to_path_buf(),
            pid,
        }
        .into()),
        Err(source) => Err(LockError::Io {
            path: path.to_path_buf(),
            source,
        }
        .into()),
    }
}

// Returns the holder's pid text when the lock is taken.
fn lock_file(path: &Path, reclaim_stale: bool) -> io::Result<Option<String>> {
    for _ in 0..3 {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut f) => {
                writeln!(f, "{}", std::process::id())?;
                return Ok(None);
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                let holder = match fs::read_to_string(path) {
                    Ok(text) => text.trim().to_string(),
                    Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                    Err(err) => return Err(err),
                };
                if !reclaim_stale || pid_alive(&holder) {
                    return Ok(Some(display_pid(holder)));
                }
                tracing::warn!(path = %path.display(), pid = %holder, "reclaiming stale lock file");
                match fs::remove_file(path) {
                    Ok(()) => continue,
                    Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                    Err(err) => return Err(err),
                }
            }
            Err(err) => return Err(err),
        }
    }
    Ok(Some("unknown".to_string()))
}

fn unlock_file(path: &Path) -> io::Result<()> {
    let holder = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    if holder.trim() == std::process::id().to_string() {
        match fs::remove_file(path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => return Err(err),
            _ => {}
        }
    }
    Ok(())
}

// A marker without a parseable pid is never considered stale.
fn pid_alive(holder: &str) -> bool {
    match holder.parse::<u32>() {
        Ok(pid) => Path::new("/proc").join(pid.to_string()).exists(),
        Err(_) => true,
    }
}

fn display_pid(holder: String) -> String {
    if holder.is_empty() {
        "unknown".to_string()
    } else {
        holder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ZabwrapError;

    #[test]
    fn acquire_writes_pid_and_release_removes_marker() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("zabwrap.pid");
        let guard = acquire(&path, false).expect("acquire");
        let text = fs::read_to_string(&path).expect("read");
        assert_eq!(text.trim(), std::process::id().to_string());
        assert_eq!(guard.path(), path.as_path());
        drop(guard);
        assert!(!path.exists());
    }

    #[test]
    fn second_acquire_fails_while_marker_exists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("zabwrap.pid");
        let _guard = acquire(&path, false).expect("acquire");
        let err = acquire(&path, false).expect_err("held");
        match err {
            ZabwrapError::Lock(LockError::AlreadyRunning { pid, .. }) => {
                assert_eq!(pid, std::process::id().to_string());
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(path.exists());
    }

    #[test]
    fn dead_pid_marker_still_blocks_by_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("zabwrap.pid");
        fs::write(&path, "4294967294\n").expect("write");
        assert!(acquire(&path, false).is_err());
        assert_eq!(fs::read_to_string(&path).expect("read"), "4294967294\n");
    }

    #[test]
    fn dead_pid_marker_is_reclaimed_when_enabled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("zabwrap.pid");
        fs::write(&path, "4294967294\n").expect("write");
        let guard = acquire(&path, true).expect("reclaim");
        let text = fs::read_to_string(&path).expect("read");
        assert_eq!(text.trim(), std::process::id().to_string());
        drop(guard);
        assert!(!path.exists());
    }

    #[test]
    fn garbage_marker_is_never_reclaimed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("zabwrap.pid");
        fs::write(&path, "").expect("write");
        match acquire(&path, true) {
            Err(ZabwrapError::Lock(LockError::AlreadyRunning { pid, .. })) => {
                assert_eq!(pid, "unknown")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn release_leaves_foreign_marker() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("zabwrap.pid");
        let guard = acquire(&path, false).expect("acquire");
        fs::write(&path, "1\n").expect("overwrite");
        drop(guard);
        assert!(path.exists());
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("zabwrap.pid");
        let err = acquire(&path, false).expect_err("io");
        assert!(matches!(err, ZabwrapError::Lock(LockError::Io { .. })));
    }
}
