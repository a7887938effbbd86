//! Infrastructure implementation of the `ConfigStore` port.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::ConfigError;
use crate::domain::config::WorkspaceConfig;

/// Commented example written by `config init`.
pub const CONFIG_TEMPLATE: &str = include_str!("../../../config.example.yaml");

/// Production implementation of `ConfigStore` that uses a YAML file on disk.
pub struct YamlConfigStore {
    path: PathBuf,
}

impl YamlConfigStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<WorkspaceConfig> {
        let shown = self.path.display().to_string();
        if !self.path.exists() {
            tracing::warn!(path = %shown, "configuration file not found, using defaults");
            return Ok(WorkspaceConfig::default());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::Unreadable {
            path: shown.clone(),
            reason: e.to_string(),
        })?;
        // An empty file deserializes to `()`, not a mapping.
        if content.trim().is_empty() {
            return Ok(WorkspaceConfig::default());
        }
        let config = serde_yaml::from_str(&content).map_err(|e| ConfigError::Malformed {
            path: shown,
            reason: e.to_string(),
        })?;
        Ok(config)
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn write_template(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        std::fs::write(&self.path, CONFIG_TEMPLATE)
            .with_context(|| format!("cannot write {}", self.path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("cannot set permissions on {}", self.path.display()))?;
        }
        Ok(())
    }
}
