//! Raspberry Pi agent: package installs, shell commands, diagnostics, uploads.
//!
//! Every operation goes through a `RemoteHost`, which opens a fresh session
//! per call. Connection failures propagate as `DeviceError::Connection`; a
//! remote command that runs but exits non-zero is a failed `ActionResult`.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{PiOperations, RemoteHost};
use crate::domain::pi::{DIAGNOSTIC_CHECKS, PackageManager, install_command};
use crate::domain::{ActionResult, DeviceError, DiagnosticCheck, Payload};

pub struct PiAgent<H> {
    host: H,
}

impl<H: RemoteHost> PiAgent<H> {
    #[must_use]
    pub fn new(host: H) -> Self {
        Self { host }
    }
}

impl<H: RemoteHost> PiOperations for PiAgent<H> {
    async fn install_library(
        &self,
        manager: PackageManager,
        package: &str,
    ) -> Result<ActionResult> {
        let resolved = manager.resolve(package);
        let command = install_command(resolved, package);
        tracing::info!(%package, manager = %resolved, "installing on pi");
        let output = self.host.exec(&command).await?;
        let mut result = ActionResult::from_command(
            &format!("Installing {package} with {resolved} on {}", self.host.destination()),
            output,
        );
        if result.success {
            result.message = format!("Installed {package} with {resolved}");
        }
        Ok(result)
    }

    async fn diagnose(&self) -> Result<ActionResult> {
        let mut checks = Vec::with_capacity(DIAGNOSTIC_CHECKS.len());
        for (name, command) in DIAGNOSTIC_CHECKS {
            let check = match self.host.exec(command).await {
                Ok(out) if out.success() => DiagnosticCheck {
                    name: (*name).to_string(),
                    ok: true,
                    value: out.stdout.trim().to_string(),
                },
                Ok(out) => DiagnosticCheck {
                    name: (*name).to_string(),
                    ok: false,
                    value: format!("N/A (exit code {}) {}", out.exit_code, out.stderr.trim())
                        .trim_end()
                        .to_string(),
                },
                // Nothing after an unreachable host can succeed either.
                Err(e) if e.downcast_ref::<DeviceError>().is_some_and(is_connection) => {
                    return Err(e);
                }
                Err(e) => DiagnosticCheck {
                    name: (*name).to_string(),
                    ok: false,
                    value: format!("N/A ({e})"),
                },
            };
            if !check.ok {
                tracing::warn!(check = %check.name, value = %check.value, "diagnostic check failed");
            }
            checks.push(check);
        }

        let failed = checks.iter().filter(|c| !c.ok).count();
        let message = if failed == 0 {
            format!("Diagnostics collected from {}", self.host.destination())
        } else {
            format!(
                "Diagnostics collected from {} ({failed} of {} checks failed)",
                self.host.destination(),
                checks.len()
            )
        };
        Ok(ActionResult::ok(message).with_payload(Payload::Diagnostics { checks }))
    }

    async fn execute_command(&self, command: &str) -> Result<ActionResult> {
        tracing::info!(%command, "executing on pi");
        let output = self.host.exec(command).await?;
        Ok(ActionResult::from_command(
            &format!("`{command}` on {}", self.host.destination()),
            output,
        ))
    }

    async fn upload_program(&self, local: &Path, remote: &str) -> Result<ActionResult> {
        if !local.is_file() {
            return Err(DeviceError::LocalFileNotFound(local.display().to_string()).into());
        }
        let output = self.host.upload(local, remote).await?;
        if output.success() {
            return Ok(ActionResult::ok(format!(
                "Uploaded {} to {}:{remote}",
                local.display(),
                self.host.destination()
            ))
            .with_payload(Payload::Output(output)));
        }
        Ok(ActionResult::from_command(
            &format!("Uploading {} to {remote}", local.display()),
            output,
        ))
    }
}

fn is_connection(e: &DeviceError) -> bool {
    matches!(e, DeviceError::Connection { .. })
}
