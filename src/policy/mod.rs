use crate::backup::autobackup::Invocation;
use crate::config::model::{BackupTypes, Properties};
use crate::error::Result;
use crate::types::{normalize, FsName};
use crate::zfs::inventory::Inventory;
use crate::zfs::{PropertySource, Zfs, UNSET};

pub mod destination;

use destination::split_destinations;

const INCLUDED: &str = "true";

/// What one filesystem's tags ask for in a backup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Inclusion tag not set locally to `true`.
    Unmanaged,
    /// Backup type `scratch`.
    Excluded,
    UnknownType(String),
    Resolved {
        backup_type: String,
        invocations: Vec<Invocation>,
        errors: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    Managed,
    Excluded,
    Orphaned,
}

pub struct Resolver<'a, Z: Zfs + ?Sized> {
    zfs: &'a Z,
    types: &'a BackupTypes,
    props: &'a Properties,
}

impl<'a, Z: Zfs + ?Sized> Resolver<'a, Z> {
    pub fn new(zfs: &'a Z, types: &'a BackupTypes, props: &'a Properties) -> Self {
        Self { zfs, types, props }
    }

    pub fn resolve(&self, fs: &FsName, include_snapshots: bool) -> Result<Resolution> {
        let selector = fs.normalized();
        let include_prop = self.props.include_for(&selector);
        let included = self
            .zfs
            .get_property(fs, &include_prop, PropertySource::Local)?;
        if included != INCLUDED {
            tracing::debug!(fs = %fs, property = %include_prop, value = %included, "not managed");
            return Ok(Resolution::Unmanaged);
        }

        let backup_type = self.backup_type(fs)?;
        if backup_type == BackupTypes::SCRATCH {
            return Ok(Resolution::Excluded);
        }
        let Some(retention) = self.types.retention(&backup_type) else {
            return Ok(Resolution::UnknownType(backup_type));
        };

        if backup_type == BackupTypes::SANDBOX {
            return Ok(Resolution::Resolved {
                invocations: vec![Invocation::local(selector, retention, include_snapshots)],
                backup_type,
                errors: Vec::new(),
            });
        }

        let raw = self
            .zfs
            .get_property(fs, &self.props.server, PropertySource::Any)?;
        let mut invocations = Vec::new();
        let mut errors = Vec::new();
        if raw == UNSET {
            errors.push(format!("{} has no {} destinations", fs, self.props.server));
        } else {
            for entry in split_destinations(&raw) {
                match entry {
                    Ok(target) => invocations.push(Invocation::remote(
                        selector.clone(),
                        target,
                        retention,
                        include_snapshots,
                    )),
                    Err(err) => errors.push(format!("{}: {}", fs, err)),
                }
            }
            if invocations.is_empty() && errors.is_empty() {
                errors.push(format!("{} has no {} destinations", fs, self.props.server));
            }
        }

        Ok(Resolution::Resolved {
            backup_type,
            invocations,
            errors,
        })
    }

    /// Orphan check: is any filesystem of `inventory` selecting `fs` for
    /// backup?
    pub fn audit(&self, inventory: &Inventory, fs: &FsName) -> Result<AuditOutcome> {
        if self.backup_type(fs)? == BackupTypes::SCRATCH {
            return Ok(AuditOutcome::Excluded);
        }
        for candidate in inventory.iter() {
            let prop = self.props.include_for(&normalize(candidate.as_str()));
            if self.zfs.get_property(fs, &prop, PropertySource::Any)? == INCLUDED {
                tracing::debug!(fs = %fs, property = %prop, "managed");
                return Ok(AuditOutcome::Managed);
            }
        }
        Ok(AuditOutcome::Orphaned)
    }

    fn backup_type(&self, fs: &FsName) -> Result<String> {
        self.zfs
            .get_property(fs, &self.props.backup_type, PropertySource::Any)
    }
}
