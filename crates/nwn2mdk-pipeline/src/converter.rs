//! External converter processes
//!
//! `nw2fbx` and `fbx2nw` are opaque executables. Their only outputs are an
//! exit status and whatever they print, which goes to the log file.

use nwn2mdk_core::{Error, Result};
use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::info;

/// Classified converter exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConverterExit {
    /// Exit code 0
    Success,
    /// Any other exit code; `None` when the process was killed by a signal
    Failure { code: Option<i32> },
}

impl ConverterExit {
    pub fn is_success(&self) -> bool {
        matches!(self, ConverterExit::Success)
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ConverterExit::Success => Some(0),
            ConverterExit::Failure { code } => *code,
        }
    }

    fn from_status(status: std::process::ExitStatus) -> Self {
        match status.code() {
            Some(0) => ConverterExit::Success,
            code => ConverterExit::Failure { code },
        }
    }
}

impl std::fmt::Display for ConverterExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConverterExit::Success => f.write_str("success"),
            ConverterExit::Failure { code: Some(code) } => write!(f, "failed with exit code {code}"),
            ConverterExit::Failure { code: None } => f.write_str("terminated by signal"),
        }
    }
}

/// One run of a converter executable
#[derive(Debug, Clone)]
pub struct ConverterInvocation {
    executable: PathBuf,
    args: Vec<OsString>,
    working_dir: PathBuf,
    log_path: PathBuf,
}

impl ConverterInvocation {
    pub fn new(
        executable: impl Into<PathBuf>,
        working_dir: impl Into<PathBuf>,
        log_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
            working_dir: working_dir.into(),
            log_path: log_path.into(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append the `-o <output>` pair every converter expects last
    pub fn output(self, output: impl Into<OsString>) -> Self {
        self.arg("-o").arg(output)
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Run the converter and wait for it to exit
    ///
    /// stdout and stderr both go to a freshly truncated log file; stdin is
    /// closed. There is no timeout. A nonzero exit is returned, not raised.
    pub fn invoke(&self) -> Result<ConverterExit> {
        let log = File::create(&self.log_path)?;
        let log_err = log.try_clone()?;

        info!(
            executable = %self.executable.display(),
            args = self.args.len(),
            working_dir = %self.working_dir.display(),
            "Launching converter"
        );

        let start = Instant::now();
        let status = Command::new(&self.executable)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(log)
            .stderr(log_err)
            .status()
            .map_err(|source| Error::Launch {
                executable: self.executable.clone(),
                source,
            })?;

        let exit = ConverterExit::from_status(status);
        info!(
            executable = %self.executable.display(),
            exit = %exit,
            duration_ms = %start.elapsed().as_millis(),
            "Converter finished"
        );

        Ok(exit)
    }
}
