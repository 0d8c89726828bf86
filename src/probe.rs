//! Checks that re-derive installation state from the host on every call.

use std::io;
use std::path::{Path, PathBuf};

use crate::runner::{CommandRunner, Invocation};

pub trait Probe {
    fn probe(&self) -> bool;
}

/// Succeeds when `<command> --version` runs and exits 0.
pub struct CommandProbe<'a> {
    runner: &'a dyn CommandRunner,
    command: &'a str,
}

impl<'a> CommandProbe<'a> {
    pub fn new(runner: &'a dyn CommandRunner, command: &'a str) -> Self {
        Self { runner, command }
    }
}

impl Probe for CommandProbe<'_> {
    fn probe(&self) -> bool {
        let invocation = Invocation::new(self.command).arg("--version");
        matches!(self.runner.run(&invocation), Ok(outcome) if outcome.is_success())
    }
}

/// Succeeds when the package database tool lists `package`.
pub struct PackageProbe<'a> {
    runner: &'a dyn CommandRunner,
    tool: &'a str,
    package: &'a str,
}

impl<'a> PackageProbe<'a> {
    pub fn new(runner: &'a dyn CommandRunner, tool: &'a str, package: &'a str) -> Self {
        Self {
            runner,
            tool,
            package,
        }
    }
}

impl Probe for PackageProbe<'_> {
    fn probe(&self) -> bool {
        let invocation = Invocation::new(self.tool).args(["-l", self.package]);
        matches!(self.runner.run(&invocation), Ok(outcome) if outcome.is_success())
    }
}

pub struct FileProbe {
    path: PathBuf,
}

impl FileProbe {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

/// Only a not-found error counts as absent: a file that cannot be inspected
/// (for example under an unreadable directory) is treated as present.
impl Probe for FileProbe {
    fn probe(&self) -> bool {
        match std::fs::metadata(&self.path) {
            Ok(_) => true,
            Err(e) => e.kind() != io::ErrorKind::NotFound,
        }
    }
}
