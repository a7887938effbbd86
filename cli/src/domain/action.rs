//! Result of one agent action, as shown to the user.

use std::path::PathBuf;

use serde::Serialize;

/// Outcome of an agent call. Displayed, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

/// Optional data attached to an [`ActionResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    /// Captured output of a command.
    Output(CommandOutput),
    /// One entry per diagnostic check, in execution order.
    Diagnostics { checks: Vec<DiagnosticCheck> },
    /// A sketch written to disk.
    Sketch { path: PathBuf },
    /// A compiled firmware image.
    Firmware { path: PathBuf, output: CommandOutput },
}

/// Captured output of a local or remote process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Build from raw captured bytes. Invalid UTF-8 is replaced, not rejected.
    #[must_use]
    pub fn from_bytes(exit_code: i32, stdout: &[u8], stderr: &[u8]) -> Self {
        Self {
            exit_code,
            stdout: String::from_utf8_lossy(stdout).into_owned(),
            stderr: String::from_utf8_lossy(stderr).into_owned(),
        }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// stdout and stderr joined, trimmed; used for error messages.
    #[must_use]
    pub fn combined(&self) -> String {
        let out = self.stdout.trim();
        let err = self.stderr.trim();
        match (out.is_empty(), err.is_empty()) {
            (true, _) => err.to_string(),
            (false, true) => out.to_string(),
            (false, false) => format!("{out}\n{err}"),
        }
    }
}

/// Outcome of a single diagnostic sub-command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticCheck {
    pub name: String,
    pub ok: bool,
    /// Trimmed stdout on success, the failure reason otherwise.
    pub value: String,
}

impl ActionResult {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            payload: None,
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            payload: None,
        }
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Success/failure driven by the command's exit code.
    #[must_use]
    pub fn from_command(description: &str, output: CommandOutput) -> Self {
        let result = if output.success() {
            Self::ok(format!("{description} succeeded"))
        } else {
            Self::failed(format!(
                "{description} failed with exit code {}",
                output.exit_code
            ))
        };
        result.with_payload(Payload::Output(output))
    }
}
