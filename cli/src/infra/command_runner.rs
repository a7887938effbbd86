//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` spawns each program with piped output and collects
//! stdout and stderr concurrently so a chatty child never blocks on a full
//! pipe. There is no timeout: `ssh` enforces its own connect timeout and
//! compile or upload runs take as long as they take.

use std::process::{Output, Stdio};

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::application::ports::{CommandRunner, ProcessInput};
use crate::domain::CommandOutput;

/// Production `CommandRunner` backed by `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run_with_input(
        &self,
        program: &str,
        args: &[&str],
        input: &ProcessInput<'_>,
    ) -> Result<Output> {
        let mut command = tokio::process::Command::new(program);
        command
            .args(args)
            .envs(input.env.iter().copied())
            .stdin(if input.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        tracing::debug!(%program, ?args, "spawning");
        let mut child = command
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let stdin_handle = child.stdin.take();
        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        let (status, stdout, stderr, ()) = tokio::join!(
            child.wait(),
            async {
                let mut buf = Vec::new();
                if let Some(ref mut h) = stdout_handle {
                    let _ = h.read_to_end(&mut buf).await;
                }
                buf
            },
            async {
                let mut buf = Vec::new();
                if let Some(ref mut h) = stderr_handle {
                    let _ = h.read_to_end(&mut buf).await;
                }
                buf
            },
            async {
                // Dropping the handle closes the pipe so the child sees EOF.
                if let (Some(mut stdin), Some(bytes)) = (stdin_handle, input.stdin) {
                    let _ = stdin.write_all(bytes).await;
                }
            },
        );

        Ok(Output {
            status: status.with_context(|| format!("waiting for {program}"))?,
            stdout,
            stderr,
        })
    }
}

/// Convert a finished process into the domain's captured output.
///
/// A child killed by a signal has no exit code and is reported as `-1`.
#[must_use]
pub fn capture(output: &Output) -> CommandOutput {
    CommandOutput::from_bytes(
        output.status.code().unwrap_or(-1),
        &output.stdout,
        &output.stderr,
    )
}
