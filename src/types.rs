use std::fmt;
use std::str::FromStr;

/// A ZFS filesystem name such as `pool/parent/child`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FsName(String);

impl FsName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hyphen-joined, lower-case form used as the inclusion-tag suffix and
    /// as the zfs-autobackup selector.
    pub fn normalized(&self) -> String {
        normalize(&self.0)
    }
}

pub fn normalize(name: &str) -> String {
    name.replace('/', "-").to_ascii_lowercase()
}

impl FromStr for FsName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("filesystem name is empty".to_string());
        }
        if s.contains('@') || s.contains('#') {
            return Err(format!("{} is a snapshot or bookmark, not a filesystem", s));
        }
        if s.starts_with('/') || s.ends_with('/') || s.contains("//") {
            return Err(format!("{} must be in pool/fs format", s));
        }
        Ok(FsName(s.to_string()))
    }
}

impl fmt::Display for FsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunMode {
    pub dry_run: bool,
    pub debug: bool,
    pub include_snapshots: bool,
}
