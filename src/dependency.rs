use crate::error::{BootstrapError, Result};
use crate::install::StepStatus;
use crate::output::{print_info, print_success, print_warning};
use crate::probe::{CommandProbe, Probe};
use crate::runner::{CommandRunner, Invocation};
use crate::settings::{Dependency, Settings};

/// Make sure `dependency` is runnable, installing its package when it is not.
pub fn ensure_dependency(
    runner: &dyn CommandRunner,
    settings: &Settings,
    dependency: &Dependency,
) -> Result<StepStatus> {
    if CommandProbe::new(runner, &dependency.command).probe() {
        print_info(&format!("{} is already installed.", dependency.label));
        return Ok(StepStatus::AlreadyPresent);
    }

    print_warning(&format!(
        "{} is not installed or not in the PATH. Attempting to install...",
        dependency.label
    ));

    let install = Invocation::new(&settings.privilege).args([
        settings.package_manager.as_str(),
        "install",
        dependency.package.as_str(),
        "-y",
    ]);

    let failure = |reason: String| BootstrapError::DependencyInstall {
        label: dependency.label.clone(),
        reason,
    };

    match runner.run(&install) {
        Ok(outcome) if outcome.is_success() => {
            print_success(&format!("{} installed successfully.", dependency.label));
            Ok(StepStatus::Installed)
        }
        Ok(outcome) => Err(failure(outcome.to_string())),
        Err(e) => Err(failure(e.to_string())),
    }
}
