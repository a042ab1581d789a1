use std::fmt;

use crate::backup::autobackup::{build_and_maybe_run, Outcome};
use crate::config::model::RuntimeConfig;
use crate::policy::{AuditOutcome, Resolution, Resolver};
use crate::report::{console, Reporter};
use crate::types::RunMode;
use crate::util::command::Runner;
use crate::zfs::inventory::Inventory;
use crate::zfs::Zfs;

pub mod autobackup;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
    pub dry_run: usize,
    pub excluded: usize,
    pub unmanaged: usize,
    pub managed: usize,
    pub orphaned: usize,
    pub errors: usize,
}

impl Summary {
    fn tally(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::DryRun => self.dry_run += 1,
            Outcome::Succeeded => self.succeeded += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = [
            ("succeeded", self.succeeded),
            ("failed", self.failed),
            ("dry-run", self.dry_run),
            ("managed", self.managed),
            ("orphaned", self.orphaned),
            ("excluded", self.excluded),
            ("unmanaged", self.unmanaged),
            ("errors", self.errors),
        ];
        let shown: Vec<String> = counts
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(label, n)| match (*label, *n) {
                ("errors", 1) => "1 error".to_string(),
                _ => format!("{} {}", n, label),
            })
            .collect();
        if shown.is_empty() {
            f.write_str("nothing to do")
        } else {
            f.write_str(&shown.join(", "))
        }
    }
}

pub struct BackupRun<'a, Z: Zfs + ?Sized, R: Runner + ?Sized> {
    cfg: &'a RuntimeConfig,
    zfs: &'a Z,
    runner: &'a R,
    run_mode: RunMode,
}

impl<'a, Z: Zfs + ?Sized, R: Runner + ?Sized> BackupRun<'a, Z, R> {
    pub fn new(cfg: &'a RuntimeConfig, zfs: &'a Z, runner: &'a R, run_mode: RunMode) -> Self {
        Self {
            cfg,
            zfs,
            runner,
            run_mode,
        }
    }

    fn resolver(&self) -> Resolver<'a, Z> {
        Resolver::new(self.zfs, &self.cfg.backup_types, &self.cfg.properties)
    }

    /// Backs up every managed filesystem, one destination at a time. A
    /// failure only affects its own filesystem or destination.
    pub fn backup(&self, inventory: &Inventory) -> Summary {
        let resolver = self.resolver();
        let reporter = Reporter::new(
            self.zfs,
            self.runner,
            &self.cfg.properties.last_status,
            self.cfg.metrics.as_ref(),
            self.cfg.timeouts.metrics,
        );
        let mut summary = Summary::default();

        for fs in inventory.iter() {
            let resolution = match resolver.resolve(fs, self.run_mode.include_snapshots) {
                Ok(resolution) => resolution,
                Err(err) => {
                    console::error(format!("could not read tags for {}: {}", fs, err));
                    summary.errors += 1;
                    continue;
                }
            };
            match resolution {
                Resolution::Unmanaged => summary.unmanaged += 1,
                Resolution::Excluded => {
                    console::warn(format!("filesystem backup type is scratch: {}", fs));
                    summary.excluded += 1;
                }
                Resolution::UnknownType(backup_type) => {
                    console::error(format!(
                        "unknown backup type {:?} ({}) on {}",
                        backup_type, self.cfg.properties.backup_type, fs
                    ));
                    summary.errors += 1;
                }
                Resolution::Resolved {
                    backup_type,
                    invocations,
                    errors,
                } => {
                    for err in errors {
                        console::error(err);
                        summary.errors += 1;
                    }
                    for invocation in invocations {
                        if self.run_mode.debug {
                            console::info(format!(
                                "{}: type {} -> {}",
                                fs,
                                backup_type,
                                invocation.describe()
                            ));
                        }
                        let outcome = build_and_maybe_run(
                            self.runner,
                            &self.cfg.tools.autobackup,
                            &invocation,
                            self.run_mode,
                            self.cfg.timeouts.backup,
                        );
                        reporter.record(fs, &invocation, &outcome, self.run_mode);
                        summary.tally(&outcome);
                    }
                }
            }
        }
        summary
    }

    /// Reports filesystems no inventory member selects for backup.
    pub fn audit(&self, inventory: &Inventory) -> Summary {
        let resolver = self.resolver();
        let mut summary = Summary::default();
        for fs in inventory.iter() {
            match resolver.audit(inventory, fs) {
                Ok(AuditOutcome::Managed) => summary.managed += 1,
                Ok(AuditOutcome::Excluded) => {
                    console::warn(format!("filesystem backup type is scratch: {}", fs));
                    summary.excluded += 1;
                }
                Ok(AuditOutcome::Orphaned) => {
                    console::error(format!(
                        "filesystem {} not defined: {}",
                        self.cfg.properties.include_for(&fs.normalized()),
                        fs
                    ));
                    summary.orphaned += 1;
                }
                Err(err) => {
                    console::error(format!("could not read tags for {}: {}", fs, err));
                    summary.errors += 1;
                }
            }
        }
        summary
    }
}
