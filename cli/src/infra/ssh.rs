//! Infrastructure implementation of the `RemoteHost` port over OpenSSH.
//!
//! Each call spawns its own `ssh` or `sftp` process. Password auth wraps the
//! client in `sshpass -e` so the secret travels in the child environment and
//! never appears in the argument list.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{CommandRunner, ProcessInput, RemoteHost};
use crate::domain::ssh::{SshAuth, SshTarget, connection_failure, sftp_put_batch};
use crate::domain::{CommandOutput, DeviceError};
use crate::infra::command_runner::capture;

const SSH: &str = "ssh";
const SFTP: &str = "sftp";
const SSHPASS: &str = "sshpass";

/// Raspberry Pi reached through the system OpenSSH client.
pub struct OpenSshHost<R> {
    target: SshTarget,
    runner: R,
}

impl<R: CommandRunner> OpenSshHost<R> {
    #[must_use]
    pub fn new(target: SshTarget, runner: R) -> Self {
        Self { target, runner }
    }

    /// Run `client` with `args`, through `sshpass` when a password is set.
    async fn run_client(
        &self,
        client: &str,
        args: &[String],
        stdin: Option<&[u8]>,
    ) -> Result<CommandOutput> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = match &self.target.auth {
            SshAuth::Password(password) => {
                let mut wrapped = vec!["-e", client];
                wrapped.extend(&args);
                let env = [("SSHPASS", password.as_str())];
                self.runner
                    .run_with_input(SSHPASS, &wrapped, &ProcessInput { env: &env, stdin })
                    .await
            }
            SshAuth::Key(_) | SshAuth::Default => {
                self.runner
                    .run_with_input(client, &args, &ProcessInput { env: &[], stdin })
                    .await
            }
        };

        let output = output.map_err(|e| DeviceError::Connection {
            target: self.target.destination(),
            reason: format!("{e:#}"),
        })?;
        let captured = capture(&output);
        if let Some(fallback) = connection_failure(&self.target.auth, captured.exit_code) {
            return Err(DeviceError::Connection {
                target: self.target.destination(),
                reason: non_empty(captured.stderr.trim(), fallback),
            }
            .into());
        }
        Ok(captured)
    }
}

impl<R: CommandRunner> RemoteHost for OpenSshHost<R> {
    fn destination(&self) -> String {
        self.target.destination()
    }

    async fn exec(&self, command: &str) -> Result<CommandOutput> {
        tracing::debug!(destination = %self.target.destination(), %command, "ssh exec");
        self.run_client(SSH, &self.target.ssh_args(command), None).await
    }

    async fn upload(&self, local: &Path, remote: &str) -> Result<CommandOutput> {
        let batch = sftp_put_batch(&local.to_string_lossy(), remote);
        tracing::debug!(destination = %self.target.destination(), %remote, "sftp put");
        self.run_client(SFTP, &self.target.sftp_args(), Some(batch.as_bytes())).await
    }
}

fn non_empty(s: &str, fallback: &str) -> String {
    if s.is_empty() {
        fallback.to_string()
    } else {
        s.to_string()
    }
}
