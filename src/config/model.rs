use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default, rename = "backupTypes")]
    pub backup_types: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub properties: PropertiesConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default, rename = "lockFile")]
    pub lock_file: Option<String>,
    #[serde(default)]
    pub lock: LockConfig,
    #[serde(default, rename = "logFile")]
    pub log_file: Option<String>,
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
    #[serde(default)]
    pub metrics: Option<MetricsConfig>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PropertiesConfig {
    #[serde(default, rename = "includePrefix")]
    pub include_prefix: Option<String>,
    #[serde(default, rename = "backupType")]
    pub backup_type: Option<String>,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default, rename = "lastStatus")]
    pub last_status: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ToolsConfig {
    #[serde(default)]
    pub zfs: Option<String>,
    #[serde(default)]
    pub autobackup: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LockConfig {
    #[serde(default, rename = "reclaimStale")]
    pub reclaim_stale: Option<bool>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TimeoutsConfig {
    #[serde(default, rename = "zfsSecs")]
    pub zfs_secs: Option<u64>,
    #[serde(default, rename = "backupSecs")]
    pub backup_secs: Option<u64>,
    #[serde(default, rename = "metricsSecs")]
    pub metrics_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default)]
    pub sender: Option<String>,
    pub server: String,
    #[serde(default)]
    pub port: Option<u16>,
    pub host: String,
    #[serde(default, rename = "keyPrefix")]
    pub key_prefix: Option<String>,
    #[serde(default, rename = "pskIdentity")]
    pub psk_identity: Option<String>,
    #[serde(default, rename = "pskFile")]
    pub psk_file: Option<String>,
}

/// Backup type name to zfs-autobackup retention spec. Built once at startup
/// and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupTypes(BTreeMap<String, String>);

impl BackupTypes {
    pub const SCRATCH: &'static str = "scratch";
    pub const SANDBOX: &'static str = "sandbox";

    pub fn new(table: BTreeMap<String, String>) -> Self {
        Self(table)
    }

    pub fn retention(&self, backup_type: &str) -> Option<&str> {
        self.0.get(backup_type).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for BackupTypes {
    fn default() -> Self {
        let table = [
            ("bks", "370,1d1y"),
            ("one", "10,1d1w"),
            ("r0", "650,1h10d,1d1y"),
            ("r1", "650,1h10d,1d1y"),
            ("r2", "650,1h10d,1d1y"),
            ("sandbox", "250,1h10d"),
            ("scratch", ""),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self(table)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Properties {
    pub include_prefix: String,
    pub backup_type: String,
    pub server: String,
    pub last_status: String,
}

impl Properties {
    /// Inclusion property for a filesystem, e.g. `autobackup:pool-a`.
    pub fn include_for(&self, normalized: &str) -> String {
        format!("{}{}", self.include_prefix, normalized)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tools {
    pub zfs: String,
    pub autobackup: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub zfs: Duration,
    pub backup: Duration,
    pub metrics: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metrics {
    pub sender: String,
    pub server: String,
    pub port: u16,
    pub host: String,
    pub key_prefix: String,
    pub psk_identity: Option<String>,
    pub psk_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub backup_types: BackupTypes,
    pub properties: Properties,
    pub tools: Tools,
    pub lock_file: PathBuf,
    pub reclaim_stale_lock: bool,
    pub log_file: Option<PathBuf>,
    pub timeouts: Timeouts,
    pub metrics: Option<Metrics>,
}
