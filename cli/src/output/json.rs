//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one pretty-printed object per
//! command: the intent plus its result, the configuration, or the error
//! object below.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::services::dispatch::Handled;
use crate::domain::config::WorkspaceConfig;
use crate::domain::{ActionResult, Intent, error_code};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

#[derive(Serialize)]
struct HandledJson<'a> {
    intent: &'a Intent,
    dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a ActionResult>,
}

/// Format one handled command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_handled(handled: &Handled) -> Result<String> {
    let obj = HandledJson {
        intent: &handled.intent,
        dry_run: handled.result.is_none(),
        result: handled.result.as_ref(),
    };
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Machine-readable renderer for `--json`.
pub struct JsonRenderer;

impl JsonRenderer {
    /// Print one handled command.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_handled(&self, handled: &Handled) -> Result<()> {
        println!("{}", format_handled(handled)?);
        Ok(())
    }

    /// Print the error object on stdout, where JSON consumers read.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_error(&self, err: &anyhow::Error) -> Result<()> {
        println!("{}", format_error(&format!("{err:#}"), error_code(err))?);
        Ok(())
    }

    /// Print the redacted configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config(&self, config: &WorkspaceConfig, path: &Path) -> Result<()> {
        let obj = serde_json::json!({
            "path": path.display().to_string(),
            "config": config.redacted(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&obj).context("JSON serialization failed")?
        );
        Ok(())
    }
}
