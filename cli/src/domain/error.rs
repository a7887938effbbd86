//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while loading or validating the workspace configuration.
///
/// Any of these at startup aborts the process before a command is read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Gemini API key not found. Set GEMINI_API_KEY or add gemini.api_key to {path}")]
    MissingApiKey { path: String },

    #[error("Cannot read configuration file {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Cannot parse configuration file {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl ConfigError {
    /// Stable machine-readable code for JSON output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingApiKey { .. } => "config_missing_api_key",
            Self::Unreadable { .. } => "config_unreadable",
            Self::Malformed { .. } => "config_malformed",
            Self::InvalidValue { .. } => "config_invalid_value",
        }
    }
}

// ── Intent errors ─────────────────────────────────────────────────────────────

/// Errors raised while turning free text into a validated `Intent`.
#[derive(Debug, Error)]
pub enum IntentError {
    #[error("Could not reach the language model: {0}")]
    Unreachable(String),

    #[error("Language model returned an unusable response: {0}")]
    Malformed(String),

    #[error("Unknown agent '{0}'. Known agents: pi, esp")]
    UnknownAgent(String),

    #[error("Unknown action '{action}' for agent '{agent}'. Known actions: {known}")]
    UnknownAction {
        agent: String,
        action: String,
        known: String,
    },

    #[error("Action '{action}' requires parameter '{name}'")]
    MissingParameter { action: String, name: String },

    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
}

impl IntentError {
    /// Stable machine-readable code for JSON output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unreachable(_) | Self::Malformed(_) | Self::UnknownAgent(_) => "classification",
            Self::UnknownAction { .. } => "unknown_action",
            Self::MissingParameter { .. } => "missing_parameter",
            Self::InvalidParameter { .. } => "invalid_parameter",
        }
    }
}

// ── Device errors ─────────────────────────────────────────────────────────────

/// Errors raised by the Pi and ESP agents.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Could not connect to {target}: {reason}")]
    Connection { target: String, reason: String },

    #[error("Unknown sketch kind '{kind}'. Available: {available}")]
    TemplateNotFound { kind: String, available: String },

    #[error("Sketch '{kind}' requires parameter '{name}'")]
    MissingParameter { kind: String, name: String },

    #[error("Local file not found: {0}")]
    LocalFileNotFound(String),

    #[error("Compilation failed (exit code {exit_code}):\n{output}")]
    Compile { exit_code: i32, output: String },

    #[error("OTA upload to {target} failed: {output}")]
    Upload { target: String, output: String },
}

impl DeviceError {
    /// Stable machine-readable code for JSON output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection",
            Self::TemplateNotFound { .. } => "template_not_found",
            Self::MissingParameter { .. } => "missing_parameter",
            Self::LocalFileNotFound(_) => "local_file_not_found",
            Self::Compile { .. } => "compile",
            Self::Upload { .. } => "upload",
        }
    }
}

/// Best-effort machine code for any error surfaced at the dispatch boundary.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    if let Some(e) = err.downcast_ref::<ConfigError>() {
        return e.code();
    }
    if let Some(e) = err.downcast_ref::<IntentError>() {
        return e.code();
    }
    if let Some(e) = err.downcast_ref::<DeviceError>() {
        return e.code();
    }
    "internal"
}
