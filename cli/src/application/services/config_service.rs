//! Application service: configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::{EnvOverrides, WorkspaceConfig};

/// Load the settings file, apply environment overrides, and validate.
///
/// Precedence is environment > file > built-in default.
///
/// # Errors
///
/// Returns a `ConfigError` when the file is unreadable, malformed, or holds
/// invalid values. Callers treat this as fatal at startup.
pub fn load_config(store: &impl ConfigStore, env: &EnvOverrides) -> Result<WorkspaceConfig> {
    let config = store.load()?.with_overrides(env);
    config.validate()?;
    tracing::debug!(path = %store.path().display(), "configuration loaded");
    Ok(config)
}

/// Write the example template, refusing to clobber unless `overwrite`.
///
/// Returns `false` when the file exists and `overwrite` is not set.
///
/// # Errors
///
/// Returns an error if the template cannot be written.
pub fn init_config(store: &impl ConfigStore, overwrite: bool) -> Result<bool> {
    if store.path().exists() && !overwrite {
        return Ok(false);
    }
    store.write_template()?;
    Ok(true)
}
