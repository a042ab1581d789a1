use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::model::{
    BackupTypes, Config, Metrics, MetricsConfig, Properties, RuntimeConfig, Timeouts, Tools,
};
use crate::error::{ConfigError, Result};

pub const CONFIG_FILE: &str = "/etc/zabwrap.yaml";

const DEFAULT_LOCK_FILE: &str = "/var/run/zabwrap.pid";
const DEFAULT_LOG_FILE: &str = "/var/log/zabwrap.log";
const DEFAULT_ZFS: &str = "zfs";
const DEFAULT_AUTOBACKUP: &str = "/usr/local/bin/zfs-autobackup";
const DEFAULT_INCLUDE_PREFIX: &str = "autobackup:";
const DEFAULT_BACKUP_TYPE_PROP: &str = "zab:backuptype";
const DEFAULT_SERVER_PROP: &str = "zab:server";
const DEFAULT_LAST_STATUS_PROP: &str = "zab:laststatus";
const DEFAULT_ZFS_TIMEOUT_SECS: u64 = 120;
const DEFAULT_BACKUP_TIMEOUT_SECS: u64 = 86_400;
const DEFAULT_METRICS_TIMEOUT_SECS: u64 = 30;
const DEFAULT_METRICS_SENDER: &str = "zabbix_sender";
const DEFAULT_METRICS_PORT: u16 = 10051;
const DEFAULT_METRICS_KEY_PREFIX: &str = "zabwrap.status";

/// Loads the config at `path`. When `required` is false a missing file
/// yields the built-in defaults.
pub fn load_config(path: &Path, required: bool) -> Result<RuntimeConfig> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return parse_runtime(Config::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
            .into())
        }
    };
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<RuntimeConfig> {
    let cfg: Config = if contents.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?
    };
    parse_runtime(cfg)
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            backup_types: BackupTypes::default(),
            properties: Properties {
                include_prefix: DEFAULT_INCLUDE_PREFIX.to_string(),
                backup_type: DEFAULT_BACKUP_TYPE_PROP.to_string(),
                server: DEFAULT_SERVER_PROP.to_string(),
                last_status: DEFAULT_LAST_STATUS_PROP.to_string(),
            },
            tools: Tools {
                zfs: DEFAULT_ZFS.to_string(),
                autobackup: DEFAULT_AUTOBACKUP.to_string(),
            },
            lock_file: PathBuf::from(DEFAULT_LOCK_FILE),
            reclaim_stale_lock: false,
            log_file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
            timeouts: Timeouts {
                zfs: Duration::from_secs(DEFAULT_ZFS_TIMEOUT_SECS),
                backup: Duration::from_secs(DEFAULT_BACKUP_TIMEOUT_SECS),
                metrics: Duration::from_secs(DEFAULT_METRICS_TIMEOUT_SECS),
            },
            metrics: None,
        }
    }
}

fn parse_runtime(cfg: Config) -> Result<RuntimeConfig> {
    let defaults = RuntimeConfig::default();

    let backup_types = match cfg.backup_types {
        Some(table) => {
            for (name, retention) in &table {
                if name.trim().is_empty() || name.trim() != name {
                    return Err(ConfigError::Invalid(format!(
                        "backup type {:?} must be a non-empty name without surrounding spaces",
                        name
                    ))
                    .into());
                }
                if name != BackupTypes::SCRATCH && retention.trim().is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "backup type {}: retention is empty",
                        name
                    ))
                    .into());
                }
            }
            let types = BackupTypes::new(table);
            if types.is_empty() {
                return Err(ConfigError::Invalid("backupTypes is empty".to_string()).into());
            }
            types
        }
        None => defaults.backup_types,
    };

    let properties = Properties {
        include_prefix: non_empty(
            "properties.includePrefix",
            cfg.properties.include_prefix,
            defaults.properties.include_prefix,
        )?,
        backup_type: non_empty(
            "properties.backupType",
            cfg.properties.backup_type,
            defaults.properties.backup_type,
        )?,
        server: non_empty(
            "properties.server",
            cfg.properties.server,
            defaults.properties.server,
        )?,
        last_status: non_empty(
            "properties.lastStatus",
            cfg.properties.last_status,
            defaults.properties.last_status,
        )?,
    };

    let tools = Tools {
        zfs: non_empty("tools.zfs", cfg.tools.zfs, defaults.tools.zfs)?,
        autobackup: non_empty(
            "tools.autobackup",
            cfg.tools.autobackup,
            defaults.tools.autobackup,
        )?,
    };

    let lock_file = match cfg.lock_file {
        Some(path) if path.trim().is_empty() => {
            return Err(ConfigError::Invalid("lockFile is empty".to_string()).into())
        }
        Some(path) => PathBuf::from(path),
        None => defaults.lock_file,
    };

    let log_file = match cfg.log_file {
        Some(path) if path.trim().is_empty() => None,
        Some(path) => Some(PathBuf::from(path)),
        None => defaults.log_file,
    };

    let timeouts = Timeouts {
        zfs: seconds("timeouts.zfsSecs", cfg.timeouts.zfs_secs, defaults.timeouts.zfs)?,
        backup: seconds(
            "timeouts.backupSecs",
            cfg.timeouts.backup_secs,
            defaults.timeouts.backup,
        )?,
        metrics: seconds(
            "timeouts.metricsSecs",
            cfg.timeouts.metrics_secs,
            defaults.timeouts.metrics,
        )?,
    };

    let metrics = cfg.metrics.map(parse_metrics).transpose()?;

    Ok(RuntimeConfig {
        backup_types,
        properties,
        tools,
        lock_file,
        reclaim_stale_lock: cfg.lock.reclaim_stale.unwrap_or(defaults.reclaim_stale_lock),
        log_file,
        timeouts,
        metrics,
    })
}

fn parse_metrics(cfg: MetricsConfig) -> Result<Metrics> {
    if cfg.server.trim().is_empty() {
        return Err(ConfigError::Invalid("metrics.server is empty".to_string()).into());
    }
    if cfg.host.trim().is_empty() {
        return Err(ConfigError::Invalid("metrics.host is empty".to_string()).into());
    }
    if cfg.psk_identity.is_some() != cfg.psk_file.is_some() {
        return Err(ConfigError::Invalid(
            "metrics.pskIdentity and metrics.pskFile must be set together".to_string(),
        )
        .into());
    }
    Ok(Metrics {
        sender: non_empty(
            "metrics.sender",
            cfg.sender,
            DEFAULT_METRICS_SENDER.to_string(),
        )?,
        server: cfg.server,
        port: cfg.port.unwrap_or(DEFAULT_METRICS_PORT),
        host: cfg.host,
        key_prefix: non_empty(
            "metrics.keyPrefix",
            cfg.key_prefix,
            DEFAULT_METRICS_KEY_PREFIX.to_string(),
        )?,
        psk_identity: cfg.psk_identity,
        psk_file: cfg.psk_file.map(PathBuf::from),
    })
}

fn non_empty(key: &str, value: Option<String>, default: String) -> Result<String> {
    match value {
        Some(v) if v.trim().is_empty() => {
            Err(ConfigError::Invalid(format!("{} is empty", key)).into())
        }
        Some(v) => Ok(v),
        None => Ok(default),
    }
}

fn seconds(key: &str, value: Option<u64>, default: Duration) -> Result<Duration> {
    match value {
        Some(0) => Err(ConfigError::Invalid(format!("{} must be greater than zero", key)).into()),
        Some(secs) => Ok(Duration::from_secs(secs)),
        None => Ok(default),
    }
}
