use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use colored::*;
use serde::Serialize;

use crate::environments::Target;
use crate::error::{BootstrapError, Result};
use crate::output::{print_info, print_success};
use crate::runner::{CommandRunner, Invocation};
use crate::settings::{DEFAULT_PORT, PORT_FORWARDING_DOCUMENT};

/// `--parameters` payload of `AWS-StartPortForwardingSession`. Field order
/// is the serialized key order.
#[derive(Debug, Serialize)]
struct PortForwardingParameters {
    #[serde(rename = "portNumber")]
    port_number: [String; 1],
    #[serde(rename = "localPortNumber")]
    local_port_number: [String; 1],
}

#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub environment: String,
    pub target: Target,
    pub local_port: u16,
    pub remote_port: u16,
}

impl SessionRequest {
    pub fn new(environment: &str, target: &Target) -> Self {
        Self {
            environment: environment.to_string(),
            target: target.clone(),
            local_port: DEFAULT_PORT,
            remote_port: DEFAULT_PORT,
        }
    }

    pub fn with_ports(mut self, local_port: u16, remote_port: u16) -> Self {
        self.local_port = local_port;
        self.remote_port = remote_port;
        self
    }

    pub fn parameters(&self) -> Result<String> {
        let parameters = PortForwardingParameters {
            port_number: [self.remote_port.to_string()],
            local_port_number: [self.local_port.to_string()],
        };

        serde_json::to_string(&parameters).map_err(|e| BootstrapError::SessionLaunch {
            reason: format!("cannot encode session parameters: {}", e),
            code: None,
        })
    }

    pub fn invocation(&self, aws_cli: &str) -> Result<Invocation> {
        Ok(Invocation::new(aws_cli)
            .args(["ssm", "start-session"])
            .args(["--target", self.target.instance_id.as_str()])
            .args(["--region", self.target.region.as_str()])
            .args(["--document-name", PORT_FORWARDING_DOCUMENT])
            .arg("--parameters")
            .arg(self.parameters()?)
            .attach())
    }
}

#[derive(Debug)]
pub struct SessionSummary {
    pub request: SessionRequest,
    pub started_at: DateTime<Local>,
    pub duration: Duration,
    /// The session was ended with Ctrl-C rather than by the AWS CLI itself.
    pub interrupted: bool,
}

/// Start the port-forwarding session and block until the AWS CLI exits.
/// `interrupted` is set by the Ctrl-C watcher; a non-zero exit after an
/// interrupt is the normal way a session ends.
pub fn start_port_forwarding(
    runner: &dyn CommandRunner,
    aws_cli: &str,
    request: SessionRequest,
    interrupted: &AtomicBool,
) -> Result<SessionSummary> {
    let invocation = request.invocation(aws_cli)?;

    print_info(&format!(
        "Connecting to {} ({}, {})",
        request.environment.green().bold(),
        request.target.instance_id,
        request.target.region
    ));
    print_info(&format!(
        "Port forwarding: localhost:{} → {}:{}",
        request.local_port, request.target.instance_id, request.remote_port
    ));
    print_info(&format!(
        "Access at: {}",
        format!("http://localhost:{}", request.local_port).green()
    ));

    let started_at = Local::now();
    let start_instant = Instant::now();

    let outcome = runner.run(&invocation).map_err(|e| BootstrapError::SessionLaunch {
        reason: e.to_string(),
        code: None,
    })?;

    let interrupted = interrupted.load(Ordering::SeqCst);
    if !outcome.is_success() && !interrupted {
        return Err(BootstrapError::SessionLaunch {
            reason: outcome.to_string(),
            code: outcome.code,
        });
    }

    Ok(SessionSummary {
        request,
        started_at,
        duration: start_instant.elapsed(),
        interrupted,
    })
}

pub fn print_session_summary(summary: &SessionSummary) {
    eprintln!();
    print_success("Port forwarding session completed");

    let border = "━".repeat(75).blue();
    eprintln!("{}", border);
    eprintln!("{}", "SESSION SUMMARY".green().bold());
    eprintln!("{}", border);

    eprintln!("{}", "Target:".yellow().bold());
    eprintln!("  • Environment: {}", summary.request.environment.green());
    eprintln!(
        "  • Instance ID: {}",
        summary.request.target.instance_id.green()
    );
    eprintln!("  • Region: {}", summary.request.target.region);
    eprintln!();

    eprintln!("{}", "Connection Details:".yellow().bold());
    eprintln!("  • Document: {}", PORT_FORWARDING_DOCUMENT);
    eprintln!(
        "  • Local Port: {}",
        summary.request.local_port.to_string().green()
    );
    eprintln!(
        "  • Remote Port: {}",
        summary.request.remote_port.to_string().green()
    );
    eprintln!(
        "  • Started: {}",
        summary.started_at.format("%Y-%m-%d %H:%M:%S")
    );
    eprintln!(
        "  • Duration: {}",
        format_duration(summary.duration).green()
    );
    if summary.interrupted {
        eprintln!("  • Ended: interrupted (Ctrl-C)");
    }
    eprintln!("{}", border);
}

fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
