use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{BootstrapError, Result};

const TABLE_FILE: &str = "environments.json";

/// Instance a named environment forwards to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub instance_id: String,
    pub region: String,
}

#[derive(Debug, Deserialize)]
struct EnvironmentEntry {
    name: String,
    instance_id: String,
    region: String,
}

/// Immutable name → target mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentTable {
    entries: BTreeMap<String, Target>,
}

impl EnvironmentTable {
    pub fn builtin() -> Self {
        let entries = [
            ("amp-af-stg", "i-00c7da261367b0a31", "ap-southeast-1"),
            ("amp-af-prd", "i-0b808b5c8b54ca924", "ap-southeast-2"),
        ]
        .into_iter()
        .map(|(name, instance_id, region)| {
            (
                name.to_string(),
                Target {
                    instance_id: instance_id.to_string(),
                    region: region.to_string(),
                },
            )
        })
        .collect();

        Self { entries }
    }

    /// Parse a JSON array of `{ name, instance_id, region }` objects.
    /// Duplicate or empty names are rejected.
    pub fn from_json(json: &str) -> std::result::Result<Self, String> {
        let raw: Vec<EnvironmentEntry> = serde_json::from_str(json).map_err(|e| e.to_string())?;

        let mut entries = BTreeMap::new();
        for entry in raw {
            if entry.name.trim().is_empty() {
                return Err("environment name must not be empty".to_string());
            }
            if entry.instance_id.trim().is_empty() || entry.region.trim().is_empty() {
                return Err(format!(
                    "environment '{}' needs both instance_id and region",
                    entry.name
                ));
            }

            let target = Target {
                instance_id: entry.instance_id,
                region: entry.region,
            };
            if entries.insert(entry.name.clone(), target).is_some() {
                return Err(format!("duplicate environment '{}'", entry.name));
            }
        }

        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file_error = |reason: String| BootstrapError::EnvironmentFile {
            path: path.to_path_buf(),
            reason,
        };

        let content = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
        Self::from_json(&content).map_err(file_error)
    }

    /// `explicit` wins; otherwise the per-user table file if present;
    /// otherwise the built-in table.
    pub fn discover(explicit: Option<&Path>, config_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match config_dir.map(|dir| dir.join("ssm-bootstrap").join(TABLE_FILE)) {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::builtin()),
        }
    }

    pub fn resolve(&self, name: &str) -> Result<&Target> {
        self.entries
            .get(name)
            .ok_or_else(|| BootstrapError::UnknownEnvironment {
                name: name.to_string(),
                known: self.names().map(str::to_string).collect(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Target)> {
        self.entries.iter().map(|(name, target)| (name.as_str(), target))
    }
}
