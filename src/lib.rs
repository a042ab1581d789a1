pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod lock;
pub mod policy;
pub mod report;
pub mod types;
pub mod util;
pub mod zfs;

#[cfg(test)]
mod testing;

pub use error::{Result, ZabwrapError};
pub use types::{normalize, FsName, RunMode};
