use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZabwrapError {
    #[error("{0}")]
    Message(String),
    #[error("{0}")]
    Lock(LockError),
    #[error("{0}")]
    Config(ConfigError),
    #[error("{0}")]
    Command(CommandError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {}: {}", path.display(), source)]
    Read { path: PathBuf, source: io::Error },
    #[error("parse config: {0}")]
    Parse(String),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum LockError {
    #[error("another instance is running (lock file {} held by pid {})", path.display(), pid)]
    AlreadyRunning { path: PathBuf, pid: String },
    #[error("failed to lock {}: {}", path.display(), source)]
    Io { path: PathBuf, source: io::Error },
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{}: {}", program, source)]
    Spawn { program: String, source: io::Error },
    #[error("{} timed out after {}s", program, timeout.as_secs())]
    Timeout { program: String, timeout: Duration },
    #[error("{} failed with exit code {}: {}", program, code, stderr)]
    Failed {
        program: String,
        code: i32,
        stderr: String,
    },
}

pub type Result<T> = std::result::Result<T, ZabwrapError>;

impl ZabwrapError {
    pub fn message(msg: impl Into<String>) -> Self {
        ZabwrapError::Message(msg.into())
    }
}

impl From<LockError> for ZabwrapError {
    fn from(err: LockError) -> Self {
        ZabwrapError::Lock(err)
    }
}

impl From<ConfigError> for ZabwrapError {
    fn from(err: ConfigError) -> Self {
        ZabwrapError::Config(err)
    }
}

impl From<CommandError> for ZabwrapError {
    fn from(err: CommandError) -> Self {
        ZabwrapError::Command(err)
    }
}
