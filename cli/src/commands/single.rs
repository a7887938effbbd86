//! One-shot mode: classify and run exactly one command.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::{EspOperations, IntentClassifier, PiOperations};
use crate::application::services::dispatch::{Dispatcher, Phase, enter};

/// Handle `command` once.
///
/// Exit code is success only when the action ran and reported success.
///
/// # Errors
///
/// Returns classification and dispatch errors for the caller to render.
pub async fn run<C, P, E>(
    app: &AppContext,
    dispatcher: &Dispatcher<'_, C, P, E>,
    command: &str,
) -> Result<ExitCode>
where
    C: IntentClassifier,
    P: PiOperations,
    E: EspOperations,
{
    let command = command.trim();
    ensure_command(command)?;

    let handled = dispatcher.handle(command, &app.reporter()).await?;
    app.renderer().render_handled(&handled)?;
    enter(Phase::Idle);

    let ok = handled.result.as_ref().is_none_or(|r| r.success);
    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Reject a blank request before any settings are loaded.
///
/// # Errors
///
/// Returns an error when `command` is empty or whitespace.
pub fn ensure_command(command: &str) -> Result<()> {
    if command.trim().is_empty() {
        anyhow::bail!("No command given. Pass a request or use --interactive.");
    }
    Ok(())
}
