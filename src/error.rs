use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Failed to install {label}: {reason}")]
    DependencyInstall { label: String, reason: String },

    #[error("Failed to download AWS SSM Session Manager plugin: {0}")]
    Download(String),

    #[error("Failed to install AWS SSM Session Manager plugin: {0}")]
    PluginInstall(String),

    #[error("Failed to execute 'aws configure': {0}")]
    Configure(String),

    #[error("Invalid environment name: '{name}'. Known environments: {}", .known.join(", "))]
    UnknownEnvironment { name: String, known: Vec<String> },

    #[error("SSM session failed: {reason}")]
    SessionLaunch { reason: String, code: Option<i32> },

    #[error("Environment file {}: {reason}", .path.display())]
    EnvironmentFile { path: PathBuf, reason: String },

    #[error("Failed to determine the working directory: {0}")]
    WorkingDirectory(String),

    #[error("Invalid plugin URL '{url}': {reason}")]
    PluginUrl { url: String, reason: String },
}

impl BootstrapError {
    /// Process exit code reported for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            BootstrapError::UnknownEnvironment { .. } => 2,
            BootstrapError::SessionLaunch {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, BootstrapError>;
