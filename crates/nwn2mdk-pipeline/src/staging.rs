//! Staging workspace
//!
//! Conversions run inside the directory of the user-chosen target path,
//! using fixed temporary names. Only one conversion may run per directory
//! at a time; nothing here enforces that.

use nwn2mdk_core::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Prefix of the temporary interchange file
pub const TOOL_PREFIX: &str = "nwn2mdk";

/// Extension of the interchange format
pub const INTERCHANGE_EXTENSION: &str = "fbx";

/// Converter log, overwritten by every run
pub const LOG_FILE_NAME: &str = "log.txt";

/// Working directory of one conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingWorkspace {
    work_dir: PathBuf,
}

impl StagingWorkspace {
    /// Resolve the working directory for `target`
    ///
    /// The working directory is the (absolute) directory containing `target`;
    /// a bare file name resolves to the current directory. The directory does
    /// not need to exist.
    pub fn resolve(target: impl AsRef<Path>) -> Result<Self> {
        let target = target.as_ref();
        if target.as_os_str().is_empty() {
            return Err(Error::InvalidPath { path: target.to_path_buf() });
        }

        let parent = match target.parent() {
            Some(p) if p.as_os_str().is_empty() => Path::new("."),
            Some(p) => p,
            None => return Err(Error::InvalidPath { path: target.to_path_buf() }),
        };

        Ok(Self {
            work_dir: std::path::absolute(parent)?,
        })
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// File name of the temporary interchange file (`nwn2mdk-tmp.fbx`)
    pub fn interchange_name() -> String {
        format!("{TOOL_PREFIX}-tmp.{INTERCHANGE_EXTENSION}")
    }

    pub fn interchange_path(&self) -> PathBuf {
        self.work_dir.join(Self::interchange_name())
    }

    pub fn log_path(&self) -> PathBuf {
        self.work_dir.join(LOG_FILE_NAME)
    }

    /// Claim the interchange path for this run
    ///
    /// A file left behind by an earlier run is removed first, so anything
    /// found at the path afterwards was produced by the current run. The
    /// returned guard removes the file again when dropped.
    pub fn stage_interchange(&self) -> StagedFile {
        let path = self.interchange_path();
        cleanup(&path);
        StagedFile { path }
    }
}

/// Remove a staging file if present
///
/// Never fails: a missing file is a no-op, any other error is logged.
pub fn cleanup(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed staging file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove staging file"),
    }
}

/// Staging file removed on drop
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        cleanup(&self.path);
    }
}
