//! File-backed virtual disks: allocate a backing file, format it, mount it.
//!
//! Each step shells out to the system tool and returns its combined output.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::common::errors::{FsError, Result};
use crate::common::paths;

pub const BTRFS: &str = "btrfs";
pub const EXT4: &str = "ext4";

/// Layout of a file-backed disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualDiskLayout {
    pub file_system: String,
    /// Backing file size in gigabytes
    pub size_gb: u64,
    pub file_disk: PathBuf,
    pub mount_point: PathBuf,
    /// Allocate the backing file before formatting
    pub truncate: bool,
    /// Mount after formatting
    pub mount: bool,
}

impl VirtualDiskLayout {
    pub fn new(file_disk: impl Into<PathBuf>, size_gb: u64) -> Self {
        Self {
            file_system: BTRFS.to_string(),
            size_gb,
            file_disk: file_disk.into(),
            mount_point: PathBuf::new(),
            truncate: true,
            mount: false,
        }
    }
}

/// Run the layout's steps in order and return their joined output.
/// The first failing step aborts the rest.
pub fn create_virtual_disk(layout: &VirtualDiskLayout) -> Result<String> {
    let mut full_output = String::new();

    if layout.truncate {
        let out = truncate(&layout.file_disk, layout.size_gb)?;
        full_output.push_str(&out);
        full_output.push('\n');
    }

    if paths::file_exists(&layout.file_disk) {
        let out = mkfs(&layout.file_disk, &layout.file_system)?;
        full_output.push_str(&out);
        full_output.push('\n');
    }

    if layout.mount {
        let out = mount(&layout.file_disk, &layout.mount_point)?;
        full_output.push_str(&out);
        full_output.push('\n');
    }

    Ok(full_output)
}

/// Create or resize a sparse backing file
pub fn truncate(path: &Path, size_gb: u64) -> Result<String> {
    let size = format!("{}G", size_gb);
    run(Command::new("truncate").arg("-s").arg(size).arg(path))
}

/// Format `path` with filesystem `fs`
pub fn mkfs(path: &Path, fs: &str) -> Result<String> {
    run(Command::new("mkfs").arg("-t").arg(fs).arg(path))
}

/// Mount `file` on `to_folder`, creating the folder first
pub fn mount(file: &Path, to_folder: &Path) -> Result<String> {
    paths::create_folder(to_folder)?;
    run(Command::new("mount").arg(file).arg(to_folder))
}

fn run(cmd: &mut Command) -> Result<String> {
    let command = describe(cmd);
    debug!(%command, "running");

    let output = cmd.output().map_err(|source| FsError::Spawn {
        command: command.clone(),
        source,
    })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return Err(FsError::Command {
            command,
            status: output.status.to_string(),
            output: combined,
        });
    }
    Ok(combined)
}

fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().to_string()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().to_string()));
    parts.join(" ")
}
