use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use crate::error::{CommandError, Result, ZabwrapError};
use crate::types::FsName;
use crate::util::command::{CommandLine, CommandOutput, Runner};
use crate::zfs::{PropertySource, Zfs, UNSET};

#[derive(Debug, Clone)]
enum Response {
    Output(CommandOutput),
    Timeout,
}

/// Records every command and answers with canned output matched by prefix
/// of the displayed command line. Unmatched commands succeed silently.
#[derive(Debug, Default)]
pub struct FakeRunner {
    responses: RefCell<Vec<(String, Response)>>,
    calls: RefCell<Vec<CommandLine>>,
}

impl FakeRunner {
    pub fn respond(&self, prefix: &str, output: CommandOutput) {
        self.responses
            .borrow_mut()
            .push((prefix.to_string(), Response::Output(output)));
    }

    pub fn time_out(&self, prefix: &str) {
        self.responses
            .borrow_mut()
            .push((prefix.to_string(), Response::Timeout));
    }

    pub fn calls(&self) -> Vec<CommandLine> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, program: &str) -> Vec<CommandLine> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.program == program)
            .cloned()
            .collect()
    }
}

impl Runner for FakeRunner {
    fn run(&self, line: &CommandLine, timeout: Duration) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(line.clone());
        let shown = line.display();
        let response = self
            .responses
            .borrow()
            .iter()
            .rev()
            .find(|(prefix, _)| shown.starts_with(prefix.as_str()))
            .map(|(_, r)| r.clone());
        match response {
            Some(Response::Output(output)) => Ok(output),
            Some(Response::Timeout) => Err(CommandError::Timeout {
                program: line.program.clone(),
                timeout,
            }
            .into()),
            None => Ok(CommandOutput {
                code: 0,
                stdout: String::new(),
                stderr: String::new(),
            }),
        }
    }
}

/// In-memory tag store.
#[derive(Debug, Default)]
pub struct FakeZfs {
    filesystems: Vec<String>,
    // (fs, property) -> (value, set locally)
    props: RefCell<BTreeMap<(String, String), (String, bool)>>,
    writes: RefCell<Vec<(String, String, String)>>,
    failing_gets: RefCell<BTreeSet<String>>,
    fail_listing: Cell<bool>,
    fail_sets: Cell<bool>,
    reads: Cell<usize>,
}

impl FakeZfs {
    pub fn with_fs(mut self, name: &str) -> Self {
        self.filesystems.push(name.to_string());
        self
    }

    pub fn with_prop(self, fs: &str, property: &str, value: &str) -> Self {
        self.props.borrow_mut().insert(
            (fs.to_string(), property.to_string()),
            (value.to_string(), true),
        );
        self
    }

    pub fn with_inherited_prop(self, fs: &str, property: &str, value: &str) -> Self {
        self.props.borrow_mut().insert(
            (fs.to_string(), property.to_string()),
            (value.to_string(), false),
        );
        self
    }

    pub fn fail_listing(&self) {
        self.fail_listing.set(true);
    }

    pub fn fail_gets_for(&self, fs: &str) {
        self.failing_gets.borrow_mut().insert(fs.to_string());
    }

    pub fn fail_sets(&self) {
        self.fail_sets.set(true);
    }

    pub fn writes(&self) -> Vec<(String, String, String)> {
        self.writes.borrow().clone()
    }

    /// Listings and property reads served so far.
    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl Zfs for FakeZfs {
    fn list_filesystems(&self) -> Result<Vec<String>> {
        self.reads.set(self.reads.get() + 1);
        if self.fail_listing.get() {
            return Err(ZabwrapError::message("zfs list failed: no pools available"));
        }
        Ok(self.filesystems.clone())
    }

    fn get_property(&self, fs: &FsName, property: &str, source: PropertySource) -> Result<String> {
        self.reads.set(self.reads.get() + 1);
        if self.failing_gets.borrow().contains(fs.as_str()) {
            return Err(ZabwrapError::message(format!(
                "zfs get {} {}: dataset does not exist",
                property, fs
            )));
        }
        let props = self.props.borrow();
        let value = match props.get(&(fs.as_str().to_string(), property.to_string())) {
            Some((value, local)) if *local || source == PropertySource::Any => value.clone(),
            _ => UNSET.to_string(),
        };
        Ok(value)
    }

    fn set_property(&self, fs: &FsName, property: &str, value: &str) -> Result<()> {
        if self.fail_sets.get() {
            return Err(ZabwrapError::message("zfs set: permission denied"));
        }
        self.writes.borrow_mut().push((
            fs.as_str().to_string(),
            property.to_string(),
            value.to_string(),
        ));
        self.props.borrow_mut().insert(
            (fs.as_str().to_string(), property.to_string()),
            (value.to_string(), true),
        );
        Ok(())
    }
}
