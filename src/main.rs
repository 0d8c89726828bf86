use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

mod app;
mod configure;
mod dependency;
mod environments;
mod error;
mod install;
mod output;
mod plugin;
mod probe;
mod runner;
mod session;
mod settings;
mod signals;

use app::{print_environments, App, Mode, Outcome};
use output::{init_colors, print_debug, print_error, print_warning};
use runner::SystemRunner;
use session::print_session_summary;
use settings::{Settings, DEFAULT_PLUGIN_URL, DEFAULT_PORT};

#[derive(Parser)]
#[command(name = "ssm-bootstrap")]
#[command(about = "Install the AWS SSM toolchain and open port-forwarding sessions to named environments")]
#[command(version)]
struct Cli {
    /// Install and configure the AWS CLI, curl and the Session Manager plugin
    #[arg(short = 'i', long = "install", conflicts_with_all = ["ssm", "list"])]
    install: bool,

    /// Start a port-forwarding session to the named environment
    #[arg(long = "ssm", value_name = "NAME", conflicts_with = "list")]
    ssm: Option<String>,

    /// List the known environments
    #[arg(short = 'l', long = "list")]
    list: bool,

    /// JSON file with the environment table (defaults to the built-in table)
    #[arg(long = "environments", env = "SSM_BOOTSTRAP_ENVIRONMENTS", value_name = "FILE")]
    environments: Option<PathBuf>,

    /// Download location of the Session Manager plugin package
    #[arg(
        long = "plugin-url",
        env = "SSM_BOOTSTRAP_PLUGIN_URL",
        default_value = DEFAULT_PLUGIN_URL
    )]
    plugin_url: String,

    /// Local port for port forwarding
    #[arg(short = 'L', long = "local-port", default_value_t = DEFAULT_PORT)]
    local_port: u16,

    /// Remote port on the target instance
    #[arg(short = 'R', long = "remote-port", default_value_t = DEFAULT_PORT)]
    remote_port: u16,

    /// Hide connection summary after session ends
    #[arg(long = "no-summary")]
    no_summary: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.install {
            Mode::Install
        } else if let Some(environment) = &self.ssm {
            Mode::Connect {
                environment: environment.clone(),
                local_port: self.local_port,
                remote_port: self.remote_port,
            }
        } else if self.list {
            Mode::List
        } else {
            Mode::Help
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_colors();

    let mode = cli.mode();
    let settings = Settings {
        plugin_url: cli.plugin_url.clone(),
        ..Settings::default()
    };

    let aws_config_file = configure::resolve_config_file();

    print_debug("SSM Bootstrap", cli.verbose);

    // Ctrl-C ends the attached session; this process stays alive to report it.
    let interrupted = Arc::new(AtomicBool::new(false));
    if matches!(mode, Mode::Connect { .. }) {
        if let Err(e) = signals::watch_interrupts(interrupted.clone()) {
            print_warning(&format!("Failed to install Ctrl-C handler: {}", e));
        }
    }

    let runner = SystemRunner::new(cli.verbose);
    let app = App {
        runner: &runner,
        settings,
        environments: cli.environments.clone(),
        config_dir: dirs::config_dir(),
        workdir: None,
        aws_config_file,
        interrupted,
        verbose: cli.verbose,
    };

    let code = match tokio::task::block_in_place(|| app.run(mode)) {
        Ok(outcome) => {
            let code = outcome.exit_code();
            match outcome {
                Outcome::Usage(text) => println!("{}", text),
                Outcome::Listed(table) => print_environments(&table),
                Outcome::SessionEnded(summary) => {
                    if !cli.no_summary {
                        print_session_summary(&summary);
                    }
                }
                Outcome::Installed(_) => {}
            }
            code
        }
        Err(e) => {
            print_error(&e.to_string());
            e.exit_code()
        }
    };

    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
