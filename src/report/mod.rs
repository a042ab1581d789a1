use std::time::Duration;

use crate::backup::autobackup::{Invocation, Outcome};
use crate::config::model::Metrics;
use crate::types::{FsName, RunMode};
use crate::util::command::Runner;
use crate::zfs::Zfs;

pub mod console;
pub mod metrics;
pub mod status;

/// Writes the outcome of each invocation back to the filesystem's
/// last-status tag and, when configured, to the monitoring sender. Both
/// paths are best-effort.
pub struct Reporter<'a, Z: Zfs + ?Sized, R: Runner + ?Sized> {
    zfs: &'a Z,
    runner: &'a R,
    status_property: &'a str,
    metrics: Option<&'a Metrics>,
    metrics_timeout: Duration,
}

impl<'a, Z: Zfs + ?Sized, R: Runner + ?Sized> Reporter<'a, Z, R> {
    pub fn new(
        zfs: &'a Z,
        runner: &'a R,
        status_property: &'a str,
        metrics: Option<&'a Metrics>,
        metrics_timeout: Duration,
    ) -> Self {
        Self {
            zfs,
            runner,
            status_property,
            metrics,
            metrics_timeout,
        }
    }

    pub fn record(&self, fs: &FsName, invocation: &Invocation, outcome: &Outcome, run_mode: RunMode) {
        let message = status::message(invocation, outcome);
        match outcome {
            Outcome::DryRun => {}
            Outcome::Succeeded => console::ok(&message),
            Outcome::Failed(_) => console::error(&message),
        }

        let value = status::status_value(outcome, &status::timestamp(), &message);
        if let Err(err) = self.zfs.set_property(fs, self.status_property, &value) {
            console::warn(format!(
                "could not record {} on {}: {}",
                self.status_property, fs, err
            ));
        }

        let Some(cfg) = self.metrics else {
            return;
        };
        let key = metrics::key_for(cfg, &invocation.selector);
        let metric = format!("{}: {}", outcome.word(), message);
        if run_mode.dry_run {
            console::labeled(&[("Metric", key.as_str()), ("Value", metrics::sanitize(&metric).as_str())]);
            return;
        }
        if let Err(err) = metrics::send(self.runner, cfg, self.metrics_timeout, &key, &metric) {
            console::warn(format!("could not send metric {}: {}", key, err));
        }
    }
}
