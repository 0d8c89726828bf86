use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{BootstrapError, Result};
use crate::install::StepStatus;
use crate::output::{print_info, print_success, print_warning};
use crate::probe::{FileProbe, Probe};
use crate::runner::{CommandRunner, Invocation};
use crate::settings::Settings;

/// Where the AWS CLI keeps its configuration: `AWS_CONFIG_FILE` when set,
/// otherwise `~/.aws/config`.
pub fn config_file_path(home: Option<PathBuf>, override_path: Option<OsString>) -> Option<PathBuf> {
    match override_path {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => home.map(|home| home.join(".aws").join("config")),
    }
}

pub fn resolve_config_file() -> Option<PathBuf> {
    config_file_path(dirs::home_dir(), std::env::var_os("AWS_CONFIG_FILE"))
}

/// Run `aws configure` interactively unless `config_file` already exists.
/// An unresolved config file location counts as "not configured".
pub fn ensure_configured(
    runner: &dyn CommandRunner,
    settings: &Settings,
    config_file: Option<&Path>,
) -> Result<StepStatus> {
    match config_file {
        Some(path) if FileProbe::new(path).probe() => {
            print_info("AWS CLI is already configured");
            return Ok(StepStatus::AlreadyPresent);
        }
        Some(_) => {}
        None => print_warning("Failed to determine the user's home directory"),
    }

    print_info("Configuring AWS...");
    let configure = Invocation::new(&settings.aws_cli).arg("configure").attach();

    match runner.run(&configure) {
        Ok(outcome) if outcome.is_success() => {
            print_success("AWS configured successfully.");
            Ok(StepStatus::Installed)
        }
        Ok(outcome) => Err(BootstrapError::Configure(outcome.to_string())),
        Err(e) => Err(BootstrapError::Configure(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{ExitOutcome, IoMode, MockCommandRunner};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_file_path_under_home() {
        let path = config_file_path(Some(PathBuf::from("/home/dev")), None);
        assert_eq!(path, Some(PathBuf::from("/home/dev/.aws/config")));
    }

    #[test]
    fn test_config_file_path_override() {
        let path = config_file_path(
            Some(PathBuf::from("/home/dev")),
            Some(OsString::from("/etc/aws/config")),
        );
        assert_eq!(path, Some(PathBuf::from("/etc/aws/config")));

        let empty = config_file_path(None, Some(OsString::new()));
        assert_eq!(empty, None);
    }

    #[test]
    fn test_existing_config_skips_interactive_flow() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config");
        std::fs::write(&config, "[default]\nregion = ap-southeast-2\n").unwrap();

        let runner = MockCommandRunner::new();
        let status = ensure_configured(&runner, &Settings::default(), Some(&config)).unwrap();

        assert_eq!(status, StepStatus::AlreadyPresent);
    }

    #[test]
    fn test_missing_config_runs_attached_configure() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join(".aws").join("config");

        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|inv| inv.is("aws", &["configure"]) && inv.io_mode == IoMode::Attach)
            .times(1)
            .returning(|_| Ok(ExitOutcome::success()));

        let status = ensure_configured(&runner, &Settings::default(), Some(&config)).unwrap();
        assert_eq!(status, StepStatus::Installed);
    }

    #[test]
    fn test_unresolved_home_still_configures() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|inv| inv.is("aws", &["configure"]))
            .times(1)
            .returning(|_| Ok(ExitOutcome::failure(130)));

        let err = ensure_configured(&runner, &Settings::default(), None).unwrap_err();
        assert_eq!(err.to_string(), "Failed to execute 'aws configure': exit code 130");
    }
}
