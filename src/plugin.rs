use std::path::Path;

use crate::error::{BootstrapError, Result};
use crate::install::StepStatus;
use crate::output::{print_info, print_success};
use crate::probe::{FileProbe, PackageProbe, Probe};
use crate::runner::{CommandRunner, Invocation};
use crate::settings::Settings;

/// Install the Session Manager plugin unless the package database already
/// lists it. `artifact` is where the installer is (or will be) stored; an
/// existing file there is reused instead of downloaded again.
pub fn ensure_plugin(
    runner: &dyn CommandRunner,
    settings: &Settings,
    artifact: &Path,
) -> Result<StepStatus> {
    if PackageProbe::new(runner, &settings.package_tool, &settings.plugin_package).probe() {
        print_info("SSM Plugin already installed");
        return Ok(StepStatus::AlreadyPresent);
    }

    let artifact_arg = artifact.to_string_lossy().into_owned();

    if FileProbe::new(artifact).probe() {
        print_info(&format!(
            "Using existing installer {}",
            artifact.display()
        ));
    } else {
        download(runner, settings, &artifact_arg)?;
    }

    print_info("Installing AWS SSM Session Manager plugin...");
    let install = Invocation::new(&settings.privilege).args([
        settings.package_tool.as_str(),
        "-i",
        artifact_arg.as_str(),
    ]);

    match runner.run(&install) {
        Ok(outcome) if outcome.is_success() => {
            print_success("AWS SSM Session Manager plugin installed successfully.");
            Ok(StepStatus::Installed)
        }
        Ok(outcome) => Err(BootstrapError::PluginInstall(outcome.to_string())),
        Err(e) => Err(BootstrapError::PluginInstall(e.to_string())),
    }
}

fn download(runner: &dyn CommandRunner, settings: &Settings, artifact: &str) -> Result<()> {
    print_info("Downloading AWS SSM Session Manager plugin...");

    let fetch = Invocation::new(&settings.fetch_tool).args([
        "--fail",
        "--location",
        settings.plugin_url.as_str(),
        "-o",
        artifact,
    ]);

    match runner.run(&fetch) {
        Ok(outcome) if outcome.is_success() => {
            print_success("AWS SSM Session Manager plugin downloaded successfully.");
            Ok(())
        }
        Ok(outcome) => Err(BootstrapError::Download(outcome.to_string())),
        Err(e) => Err(BootstrapError::Download(e.to_string())),
    }
}
