use std::path::PathBuf;

use url::Url;

use crate::error::{BootstrapError, Result};

pub const DEFAULT_PLUGIN_URL: &str =
    "https://s3.amazonaws.com/session-manager-downloads/plugin/latest/ubuntu_64bit/session-manager-plugin.deb";
pub const PORT_FORWARDING_DOCUMENT: &str = "AWS-StartPortForwardingSession";
pub const DEFAULT_PORT: u16 = 8080;

/// An external command the tool needs, and the package that provides it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub command: String,
    pub label: String,
    pub package: String,
}

impl Dependency {
    pub fn new(command: &str, label: &str, package: &str) -> Self {
        Self {
            command: command.to_string(),
            label: label.to_string(),
            package: package.to_string(),
        }
    }
}

/// Names of the host programs driven by the install sequence.
#[derive(Debug, Clone)]
pub struct Settings {
    pub aws_cli: String,
    pub privilege: String,
    pub package_manager: String,
    pub package_tool: String,
    pub fetch_tool: String,
    pub plugin_package: String,
    pub plugin_url: String,
    pub dependencies: Vec<Dependency>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            aws_cli: "aws".to_string(),
            privilege: "sudo".to_string(),
            package_manager: "apt".to_string(),
            package_tool: "dpkg".to_string(),
            fetch_tool: "curl".to_string(),
            plugin_package: "session-manager-plugin".to_string(),
            plugin_url: DEFAULT_PLUGIN_URL.to_string(),
            dependencies: vec![
                Dependency::new("aws", "AWS CLI", "awscli"),
                Dependency::new("curl", "Curl", "curl"),
            ],
        }
    }
}

impl Settings {
    /// Local file the plugin installer is downloaded to: the last path
    /// segment of the plugin URL, relative to the working directory.
    pub fn plugin_artifact(&self) -> Result<PathBuf> {
        let invalid = |reason: &str| BootstrapError::PluginUrl {
            url: self.plugin_url.clone(),
            reason: reason.to_string(),
        };

        let url = Url::parse(&self.plugin_url).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != "https" {
            return Err(invalid("only https downloads are supported"));
        }

        url.path_segments()
            .and_then(|segments| segments.last())
            .filter(|name| !name.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| invalid("URL has no file name"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_artifact_name() {
        let settings = Settings::default();
        assert_eq!(
            settings.plugin_artifact().unwrap(),
            PathBuf::from("session-manager-plugin.deb")
        );
    }

    #[test]
    fn test_default_dependencies_order() {
        let settings = Settings::default();
        let commands: Vec<_> = settings
            .dependencies
            .iter()
            .map(|d| d.command.as_str())
            .collect();
        assert_eq!(commands, vec!["aws", "curl"]);
        assert_eq!(settings.dependencies[0].package, "awscli");
    }

    #[test]
    fn test_plugin_url_must_be_https_with_file_name() {
        let mut settings = Settings::default();

        settings.plugin_url = "http://example.com/plugin.deb".to_string();
        assert!(settings.plugin_artifact().is_err());

        settings.plugin_url = "https://example.com/".to_string();
        assert!(settings.plugin_artifact().is_err());

        settings.plugin_url = "not a url".to_string();
        assert!(matches!(
            settings.plugin_artifact(),
            Err(BootstrapError::PluginUrl { .. })
        ));
    }
}
