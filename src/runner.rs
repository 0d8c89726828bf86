use std::fmt;
use std::io;
use std::process::{Command, Stdio};

use crate::output::print_debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoMode {
    /// Standard streams are inherited: the child owns the terminal.
    Attach,
    /// Every standard stream goes to the null device.
    Silent,
}

/// A fully described external program launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub io_mode: IoMode,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            io_mode: IoMode::Silent,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn attach(mut self) -> Self {
        self.io_mode = IoMode::Attach;
        self
    }
}

#[cfg(test)]
impl Invocation {
    /// True when this launches `program` with exactly `args`.
    pub fn is(&self, program: &str, args: &[&str]) -> bool {
        self.program == program && self.args.iter().map(String::as_str).eq(args.iter().copied())
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '"') {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    pub code: Option<i32>,
}

impl ExitOutcome {
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

#[cfg(test)]
impl ExitOutcome {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn failure(code: i32) -> Self {
        Self { code: Some(code) }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {}", code),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// Launches external programs and waits for them to finish.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ExitOutcome>;
}

pub struct SystemRunner {
    verbose: bool,
}

impl SystemRunner {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ExitOutcome> {
        print_debug(&format!("Running: {}", invocation), self.verbose);

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);

        match invocation.io_mode {
            IoMode::Attach => {
                cmd.stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit());
            }
            IoMode::Silent => {
                cmd.stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null());
            }
        }

        let status = cmd.status()?;
        print_debug(
            &format!("{} finished with {:?}", invocation.program, status.code()),
            self.verbose,
        );

        Ok(ExitOutcome {
            code: status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_invocation_builder_defaults_to_silent() {
        let invocation = Invocation::new("dpkg").args(["-l", "session-manager-plugin"]);

        assert_eq!(invocation.io_mode, IoMode::Silent);
        assert!(invocation.is("dpkg", &["-l", "session-manager-plugin"]));
        assert!(!invocation.is("dpkg", &["-i", "session-manager-plugin"]));
    }

    #[test]
    fn test_invocation_display_quotes_json() {
        let invocation = Invocation::new("aws")
            .args(["ssm", "start-session"])
            .arg(r#"{"portNumber":["8080"]}"#)
            .attach();

        assert_eq!(
            invocation.to_string(),
            r#"aws ssm start-session '{"portNumber":["8080"]}'"#
        );
        assert_eq!(invocation.io_mode, IoMode::Attach);
    }

    #[test]
    fn test_exit_outcome() {
        assert!(ExitOutcome::success().is_success());
        assert!(!ExitOutcome::failure(100).is_success());
        assert!(!ExitOutcome { code: None }.is_success());
        assert_eq!(ExitOutcome::failure(100).to_string(), "exit code 100");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_exit_codes() {
        let runner = SystemRunner::new(false);

        let ok = runner.run(&Invocation::new("true")).unwrap();
        assert!(ok.is_success());

        let failed = runner.run(&Invocation::new("false")).unwrap();
        assert_eq!(failed.code, Some(1));
    }

    #[test]
    fn test_system_runner_missing_program_is_error() {
        let runner = SystemRunner::new(false);
        let result = runner.run(&Invocation::new("ssm-bootstrap-no-such-program").arg("--version"));

        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
