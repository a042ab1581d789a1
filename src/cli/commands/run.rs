use chrono::Local;

use crate::backup::BackupRun;
use crate::config::RuntimeConfig;
use crate::error::Result;
use crate::lock;
use crate::report::console;
use crate::types::{FsName, RunMode};
use crate::util::command::{Runner, SystemRunner};
use crate::zfs::inventory::{list_filesystems, Inventory};
use crate::zfs::{Zfs, ZfsCli};

pub fn run_command(
    cfg: &RuntimeConfig,
    limit: &[FsName],
    orphans: bool,
    run_mode: RunMode,
) -> Result<()> {
    let runner = SystemRunner;
    let zfs = ZfsCli::new(&runner, cfg.tools.zfs.as_str(), cfg.timeouts.zfs);
    run_with(cfg, &zfs, &runner, limit, orphans, run_mode)
}

pub fn run_with<Z, R>(
    cfg: &RuntimeConfig,
    zfs: &Z,
    runner: &R,
    limit: &[FsName],
    orphans: bool,
    run_mode: RunMode,
) -> Result<()>
where
    Z: Zfs + ?Sized,
    R: Runner + ?Sized,
{
    println!("{}", Local::now().format("%d-%m-%Y %H:%M"));

    let _lock = lock::acquire(&cfg.lock_file, cfg.reclaim_stale_lock)?;

    let inventory = match list_filesystems(zfs, limit) {
        Ok(inventory) => inventory,
        Err(err) => {
            console::error(format!("could not list filesystems: {}", err));
            Inventory::default()
        }
    };
    if inventory.is_empty() {
        console::warn("nothing to back up");
    } else if run_mode.debug {
        console::info(format!(
            "{} filesystem(s) to check{}",
            inventory.len(),
            if run_mode.dry_run { " (dry-run)" } else { "" }
        ));
    }

    let run = BackupRun::new(cfg, zfs, runner, run_mode);
    let summary = if orphans {
        run.audit(&inventory)
    } else {
        run.backup(&inventory)
    };
    console::info(format!("summary: {}", summary));

    println!("{}", Local::now().format("%d-%m-%Y %H:%M"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::error::{LockError, ZabwrapError};
    use crate::testing::{FakeRunner, FakeZfs};

    fn config_with_lock(dir: &tempfile::TempDir) -> RuntimeConfig {
        RuntimeConfig {
            lock_file: dir.path().join("zabwrap.pid"),
            log_file: None,
            ..RuntimeConfig::default()
        }
    }

    fn tagged_fleet() -> FakeZfs {
        FakeZfs::default()
            .with_fs("pool/a")
            .with_prop("pool/a", "autobackup:pool-a", "true")
            .with_prop("pool/a", "zab:backuptype", "r1")
            .with_prop("pool/a", "zab:server", "h1:data-a")
    }

    #[test]
    fn held_lock_stops_run_before_any_zfs_or_backup_call() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = config_with_lock(&dir);
        fs::write(&cfg.lock_file, "1\n").expect("marker");
        let zfs = tagged_fleet();
        let runner = FakeRunner::default();

        let err = run_with(&cfg, &zfs, &runner, &[], false, RunMode::default())
            .expect_err("locked");

        assert!(matches!(
            err,
            ZabwrapError::Lock(LockError::AlreadyRunning { .. })
        ));
        assert_eq!(zfs.reads(), 0);
        assert!(zfs.writes().is_empty());
        assert!(runner.calls().is_empty());
        assert_eq!(fs::read_to_string(&cfg.lock_file).expect("read"), "1\n");
    }

    #[test]
    fn run_releases_lock_when_done() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = config_with_lock(&dir);
        let zfs = tagged_fleet();
        let runner = FakeRunner::default();

        run_with(&cfg, &zfs, &runner, &[], false, RunMode::default()).expect("run");

        assert!(!cfg.lock_file.exists());
        assert_eq!(runner.calls_to(&cfg.tools.autobackup).len(), 1);
        assert!(zfs.reads() > 0);
    }
}
