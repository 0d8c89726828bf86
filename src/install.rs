use std::path::{Path, PathBuf};

use crate::configure::ensure_configured;
use crate::dependency::ensure_dependency;
use crate::error::{BootstrapError, Result};
use crate::output::{print_error, print_success, print_warning};
use crate::plugin::ensure_plugin;
use crate::runner::CommandRunner;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    AlreadyPresent,
    Installed,
}

#[derive(Debug)]
pub struct StepReport {
    pub name: String,
    pub result: Result<StepStatus>,
}

#[derive(Debug, Default)]
pub struct InstallReport {
    pub steps: Vec<StepReport>,
    /// Set when a missing dependency could not be installed and the
    /// remaining steps were skipped.
    pub aborted: bool,
}

impl InstallReport {
    fn record(&mut self, name: impl Into<String>, result: Result<StepStatus>) -> bool {
        let ok = result.is_ok();
        if let Err(ref e) = result {
            print_error(&e.to_string());
        }
        self.steps.push(StepReport {
            name: name.into(),
            result,
        });
        ok
    }

    pub fn failures(&self) -> impl Iterator<Item = &BootstrapError> {
        self.steps.iter().filter_map(|step| step.result.as_ref().err())
    }

    pub fn succeeded(&self) -> bool {
        !self.aborted && self.failures().next().is_none()
    }

    pub fn exit_code(&self) -> i32 {
        self.failures().next().map_or(0, BootstrapError::exit_code)
    }

    fn failed_steps(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|step| step.result.is_err())
            .map(|step| step.name.as_str())
            .collect()
    }
}

/// Directory the plugin installer is stored in. Without an explicit one the
/// process working directory is looked up here, so only the plugin step
/// depends on it.
fn plugin_workdir(workdir: Option<&Path>) -> Result<PathBuf> {
    match workdir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir().map_err(|e| BootstrapError::WorkingDirectory(e.to_string())),
    }
}

/// Dependencies, then the Session Manager plugin, then the AWS CLI
/// configuration. A dependency that cannot be installed stops the sequence;
/// a plugin failure does not.
pub fn run_install(
    runner: &dyn CommandRunner,
    settings: &Settings,
    workdir: Option<&Path>,
    config_file: Option<&Path>,
) -> InstallReport {
    let mut report = InstallReport::default();

    for dependency in &settings.dependencies {
        let result = ensure_dependency(runner, settings, dependency);
        if !report.record(&dependency.label, result) {
            report.aborted = true;
            print_warning("Skipping remaining installation steps");
            return report;
        }
    }

    let plugin = plugin_workdir(workdir).and_then(|dir| {
        let artifact = settings.plugin_artifact()?;
        ensure_plugin(runner, settings, &dir.join(artifact))
    });
    report.record("Session Manager plugin", plugin);

    let configured = ensure_configured(runner, settings, config_file);
    report.record("AWS configuration", configured);

    if report.succeeded() {
        print_success("Installation and configuration complete");
    } else {
        print_warning(&format!(
            "Installation finished with failed steps: {}",
            report.failed_steps().join(", ")
        ));
    }

    report
}
