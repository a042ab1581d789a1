use std::path::PathBuf;

use clap::Parser;

use crate::types::FsName;

#[derive(Parser, Debug)]
#[command(name = "zabwrap", version, about = "ZFS autobackup wrapper")]
pub struct Cli {
    /// Print the commands to be run
    #[arg(long, short = 'd')]
    pub dry_run: bool,
    /// Print filesystems no backup group selects
    #[arg(long, short = 'o')]
    pub orphans: bool,
    /// Only consider these filesystems (pool/fs format)
    #[arg(long, short = 'l', num_args = 1.., value_name = "FS")]
    pub limit: Vec<FsName>,
    /// Extra diagnostic output
    #[arg(long, short = 'v')]
    pub debug: bool,
    /// Also transfer snapshots not made by zfs-autobackup
    #[arg(long, short = 's')]
    pub include_snapshots: bool,
    /// Config file path
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}
