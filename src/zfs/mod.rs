use std::time::Duration;

use crate::error::Result;
use crate::types::FsName;
use crate::util::command::{CommandLine, Runner};

pub mod inventory;

/// Value `zfs get` prints for a property that is not set.
pub const UNSET: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertySource {
    Any,
    Local,
}

/// Tag store backed by ZFS user properties.
pub trait Zfs {
    /// Raw lines of the filesystem listing.
    fn list_filesystems(&self) -> Result<Vec<String>>;
    /// Trimmed property value; `-` when unset.
    fn get_property(&self, fs: &FsName, property: &str, source: PropertySource) -> Result<String>;
    fn set_property(&self, fs: &FsName, property: &str, value: &str) -> Result<()>;
}

pub struct ZfsCli<'a, R: Runner> {
    runner: &'a R,
    program: String,
    timeout: Duration,
}

impl<'a, R: Runner> ZfsCli<'a, R> {
    pub fn new(runner: &'a R, program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            runner,
            program: program.into(),
            timeout,
        }
    }

    fn exec(&self, line: CommandLine) -> Result<String> {
        let output = self.runner.run(&line, self.timeout)?;
        Ok(output.check(&line.display())?.stdout)
    }

    pub fn list_command(&self) -> CommandLine {
        CommandLine::new(&self.program).args(["list", "-Hp", "-o", "name"])
    }

    pub fn get_command(&self, fs: &FsName, property: &str, source: PropertySource) -> CommandLine {
        let mut line = CommandLine::new(&self.program).arg("get");
        if source == PropertySource::Local {
            line = line.args(["-s", "local"]);
        }
        line.args(["-H", "-o", "value"])
            .arg(property)
            .arg(fs.as_str())
    }

    pub fn set_command(&self, fs: &FsName, property: &str, value: &str) -> CommandLine {
        CommandLine::new(&self.program)
            .arg("set")
            .arg(format!("{}={}", property, value))
            .arg(fs.as_str())
    }
}

impl<'a, R: Runner> Zfs for ZfsCli<'a, R> {
    fn list_filesystems(&self) -> Result<Vec<String>> {
        let stdout = self.exec(self.list_command())?;
        Ok(stdout.lines().map(str::to_string).collect())
    }

    fn get_property(&self, fs: &FsName, property: &str, source: PropertySource) -> Result<String> {
        let stdout = self.exec(self.get_command(fs, property, source))?;
        let value = stdout.trim();
        // `-s local` prints nothing when the property is inherited or unset.
        if value.is_empty() {
            return Ok(UNSET.to_string());
        }
        Ok(value.to_string())
    }

    fn set_property(&self, fs: &FsName, property: &str, value: &str) -> Result<()> {
        self.exec(self.set_command(fs, property, value))?;
        Ok(())
    }
}
