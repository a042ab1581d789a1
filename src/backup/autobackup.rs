use std::time::Duration;

use crate::policy::destination::Destination;
use crate::report::console;
use crate::types::RunMode;
use crate::util::command::{CommandLine, Runner};

/// One zfs-autobackup run: a filesystem selector, an optional remote target
/// and the retention to keep on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub selector: String,
    pub target: Option<Destination>,
    pub retention: String,
    pub include_snapshots: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    DryRun,
    Succeeded,
    Failed(String),
}

impl Outcome {
    pub fn word(&self) -> &'static str {
        match self {
            Outcome::DryRun => "dry-run",
            Outcome::Succeeded => "success",
            Outcome::Failed(_) => "failed",
        }
    }
}

impl Invocation {
    pub fn local(selector: impl Into<String>, retention: impl Into<String>, include_snapshots: bool) -> Self {
        Self {
            selector: selector.into(),
            target: None,
            retention: retention.into(),
            include_snapshots,
        }
    }

    pub fn remote(
        selector: impl Into<String>,
        target: Destination,
        retention: impl Into<String>,
        include_snapshots: bool,
    ) -> Self {
        Self {
            selector: selector.into(),
            target: Some(target),
            retention: retention.into(),
            include_snapshots,
        }
    }

    pub fn describe(&self) -> String {
        match &self.target {
            Some(target) => format!("{} -> {}", self.selector, target),
            None => format!("{} (local)", self.selector),
        }
    }

    pub fn args(&self) -> Vec<String> {
        let mut args = vec![self.selector.clone()];
        if let Some(target) = &self.target {
            args.push(target.path.clone());
        }
        args.push("--verbose".to_string());
        args.push("--keep-source".to_string());
        args.push(self.retention.clone());
        if let Some(target) = &self.target {
            args.push("--ssh-target".to_string());
            args.push(target.host.clone());
            args.push("--keep-target".to_string());
            args.push(self.retention.clone());
            args.push("--strip-path".to_string());
            args.push("1".to_string());
            args.push("--clear-mountpoint".to_string());
        }
        if self.include_snapshots {
            args.push("--other-snapshots".to_string());
        }
        args.push("--exclude-received".to_string());
        args.push("--exclude-unchanged".to_string());
        args.push("1".to_string());
        args
    }

    pub fn command_line(&self, program: &str) -> CommandLine {
        CommandLine::new(program).args(self.args())
    }
}

/// Prints the command in dry-run mode, otherwise runs it and folds the
/// result into an `Outcome`. Never returns an error: failures are outcomes.
pub fn build_and_maybe_run<R: Runner + ?Sized>(
    runner: &R,
    program: &str,
    invocation: &Invocation,
    run_mode: RunMode,
    timeout: Duration,
) -> Outcome {
    let line = invocation.command_line(program);
    if run_mode.dry_run {
        let shown = line.display();
        console::labeled(&[
            ("Backup Retention", invocation.retention.as_str()),
            ("Command", shown.as_str()),
        ]);
        return Outcome::DryRun;
    }

    tracing::info!(command = %line.display(), "running zfs-autobackup");
    match runner.run(&line, timeout) {
        Ok(output) => {
            console::passthrough(&output.stdout);
            console::passthrough(&output.stderr);
            if output.success() {
                Outcome::Succeeded
            } else {
                Outcome::Failed(failure_message(output.code, &output.stderr))
            }
        }
        Err(err) => Outcome::Failed(err.to_string()),
    }
}

fn failure_message(code: i32, stderr: &str) -> String {
    let last = stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty());
    match last {
        Some(line) => format!("exit code {}: {}", code, line),
        None => format!("exit code {}", code),
    }
}
