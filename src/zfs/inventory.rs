use std::collections::BTreeSet;

use crate::error::Result;
use crate::types::FsName;
use crate::zfs::Zfs;

/// Filesystems considered in one run, in stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory(BTreeSet<FsName>);

impl Inventory {
    pub fn iter(&self) -> impl Iterator<Item = &FsName> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<FsName> for Inventory {
    fn from_iter<I: IntoIterator<Item = FsName>>(iter: I) -> Self {
        Inventory(iter.into_iter().collect())
    }
}

/// Uses `limit` verbatim when given, otherwise asks ZFS for every
/// filesystem.
pub fn list_filesystems<Z: Zfs + ?Sized>(zfs: &Z, limit: &[FsName]) -> Result<Inventory> {
    if !limit.is_empty() {
        tracing::debug!(count = limit.len(), "using caller-supplied filesystem list");
        return Ok(limit.iter().cloned().collect());
    }
    let lines = zfs.list_filesystems()?;
    Ok(parse_listing(&lines))
}

pub fn parse_listing<S: AsRef<str>>(lines: &[S]) -> Inventory {
    lines
        .iter()
        .map(|line| line.as_ref().trim())
        .filter(|line| !line.is_empty())
        .filter_map(|line| match line.parse::<FsName>() {
            Ok(fs) => Some(fs),
            Err(err) => {
                tracing::warn!(line, error = %err, "skipping unparseable listing entry");
                None
            }
        })
        .collect()
}
