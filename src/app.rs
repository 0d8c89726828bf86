use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use colored::*;

use crate::environments::EnvironmentTable;
use crate::error::Result;
use crate::install::{run_install, InstallReport};
use crate::output::print_debug;
use crate::runner::CommandRunner;
use crate::session::{start_port_forwarding, SessionRequest, SessionSummary};
use crate::settings::Settings;

const PROGRAM: &str = "ssm-bootstrap";

/// What a single invocation does. Chosen once from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Install,
    Connect {
        environment: String,
        local_port: u16,
        remote_port: u16,
    },
    List,
    Help,
}

#[derive(Debug)]
pub enum Outcome {
    Usage(String),
    Installed(InstallReport),
    SessionEnded(SessionSummary),
    Listed(EnvironmentTable),
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Installed(report) => report.exit_code(),
            Outcome::Usage(_) | Outcome::SessionEnded(_) | Outcome::Listed(_) => 0,
        }
    }
}

pub struct App<'a> {
    pub runner: &'a dyn CommandRunner,
    pub settings: Settings,
    /// Explicit environment table file.
    pub environments: Option<PathBuf>,
    /// Base directory searched for `ssm-bootstrap/environments.json`.
    pub config_dir: Option<PathBuf>,
    /// Directory the plugin installer is downloaded into; the working
    /// directory when unset.
    pub workdir: Option<PathBuf>,
    pub aws_config_file: Option<PathBuf>,
    /// Set when Ctrl-C arrives while a session is attached.
    pub interrupted: Arc<AtomicBool>,
    pub verbose: bool,
}

impl App<'_> {
    pub fn run(&self, mode: Mode) -> Result<Outcome> {
        print_debug(&format!("Mode: {:?}", mode), self.verbose);

        match mode {
            Mode::Help => Ok(Outcome::Usage(usage())),
            Mode::List => Ok(Outcome::Listed(self.environment_table()?)),
            Mode::Install => Ok(Outcome::Installed(self.install())),
            Mode::Connect {
                environment,
                local_port,
                remote_port,
            } => {
                let table = self.environment_table()?;
                let target = table.resolve(&environment)?;
                print_debug(
                    &format!(
                        "Resolved {} to {} in {}",
                        environment, target.instance_id, target.region
                    ),
                    self.verbose,
                );

                let request =
                    SessionRequest::new(&environment, target).with_ports(local_port, remote_port);
                let summary = start_port_forwarding(
                    self.runner,
                    &self.settings.aws_cli,
                    request,
                    &self.interrupted,
                )?;
                Ok(Outcome::SessionEnded(summary))
            }
        }
    }

    fn install(&self) -> InstallReport {
        print_debug(
            &format!("Plugin URL: {}", self.settings.plugin_url),
            self.verbose,
        );
        print_debug(
            &format!(
                "AWS config file: {}",
                self.aws_config_file
                    .as_deref()
                    .map_or("unknown".to_string(), |p| p.display().to_string())
            ),
            self.verbose,
        );

        run_install(
            self.runner,
            &self.settings,
            self.workdir.as_deref(),
            self.aws_config_file.as_deref(),
        )
    }

    fn environment_table(&self) -> Result<EnvironmentTable> {
        EnvironmentTable::discover(self.environments.as_deref(), self.config_dir.clone())
    }
}

pub fn usage() -> String {
    [
        "Usage:".to_string(),
        format!("  To install and configure, run: {} -i or --install", PROGRAM),
        format!(
            "  To connect to an environment, run: {} --ssm <environment>",
            PROGRAM
        ),
        format!("  To list known environments, run: {} --list", PROGRAM),
        format!("  To print this help message, run: {}", PROGRAM),
    ]
    .join("\n")
}

pub fn print_environments(table: &EnvironmentTable) {
    for (name, target) in table.iter() {
        println!(
            "{} {:<22} {}",
            format!("{:<20}", name).green().bold(),
            target.instance_id,
            target.region
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BootstrapError;
    use crate::runner::{ExitOutcome, MockCommandRunner};
    use pretty_assertions::assert_eq;

    fn app(runner: &MockCommandRunner) -> App<'_> {
        App {
            runner,
            settings: Settings::default(),
            environments: None,
            config_dir: None,
            workdir: None,
            aws_config_file: None,
            interrupted: Arc::new(AtomicBool::new(false)),
            verbose: false,
        }
    }

    fn connect(environment: &str) -> Mode {
        Mode::Connect {
            environment: environment.to_string(),
            local_port: 8080,
            remote_port: 8080,
        }
    }

    #[test]
    fn test_help_launches_nothing() {
        let runner = MockCommandRunner::new();
        let outcome = app(&runner).run(Mode::Help).unwrap();

        match outcome {
            Outcome::Usage(text) => {
                assert!(text.starts_with("Usage:"));
                assert!(text.contains("--ssm <environment>"));
            }
            other => panic!("expected usage, got {:?}", other),
        }
    }

    #[test]
    fn test_connect_prd_starts_port_forwarding() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|inv| {
                inv.is(
                    "aws",
                    &[
                        "ssm",
                        "start-session",
                        "--target",
                        "i-0b808b5c8b54ca924",
                        "--region",
                        "ap-southeast-2",
                        "--document-name",
                        "AWS-StartPortForwardingSession",
                        "--parameters",
                        r#"{"portNumber":["8080"],"localPortNumber":["8080"]}"#,
                    ],
                )
            })
            .times(1)
            .returning(|_| Ok(ExitOutcome::success()));

        let outcome = app(&runner).run(connect("amp-af-prd")).unwrap();

        assert!(matches!(outcome, Outcome::SessionEnded(_)));
        assert_eq!(outcome.exit_code(), 0);
    }

    #[test]
    fn test_connect_unknown_environment_launches_nothing() {
        let runner = MockCommandRunner::new();
        let err = app(&runner).run(connect("unknown-env")).unwrap_err();

        assert!(matches!(err, BootstrapError::UnknownEnvironment { .. }));
        assert!(err.to_string().starts_with("Invalid environment name: 'unknown-env'"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_connect_uses_injected_table() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("envs.json");
        std::fs::write(
            &table,
            r#"[{"name": "dev", "instance_id": "i-dev", "region": "eu-west-1"}]"#,
        )
        .unwrap();

        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|inv| inv.args.windows(2).any(|w| w[0] == "--target" && w[1] == "i-dev"))
            .times(1)
            .returning(|_| Ok(ExitOutcome::success()));

        let mut app = app(&runner);
        app.environments = Some(table);

        assert!(app.run(connect("dev")).is_ok());
        assert!(matches!(
            app.run(connect("amp-af-prd")),
            Err(BootstrapError::UnknownEnvironment { .. })
        ));
    }

    #[test]
    fn test_list_returns_table() {
        let runner = MockCommandRunner::new();
        match app(&runner).run(Mode::List).unwrap() {
            Outcome::Listed(table) => assert_eq!(table, EnvironmentTable::builtin()),
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_install_report_drives_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|inv| inv.is("aws", &["--version"]))
            .times(1)
            .returning(|_| Ok(ExitOutcome::failure(1)));
        runner
            .expect_run()
            .withf(|inv| inv.program == "sudo")
            .times(1)
            .returning(|_| Ok(ExitOutcome::failure(100)));

        let mut app = app(&runner);
        app.workdir = Some(dir.path().to_path_buf());

        let outcome = app.run(Mode::Install).unwrap();
        assert_eq!(outcome.exit_code(), 1);
    }
}
