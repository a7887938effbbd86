//! Interactive mode: a `gemini>` read-eval loop.
//!
//! Every error is rendered and the loop keeps going; only end of input or
//! an explicit `exit`/`quit` stops it.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use owo_colors::OwoColorize as _;

use crate::app::AppContext;
use crate::application::ports::{EspOperations, IntentClassifier, PiOperations};
use crate::application::services::dispatch::{Dispatcher, Phase, enter};
use crate::output::HumanRenderer;

pub const PROMPT: &str = "gemini> ";

/// What one input line asks the loop to do.
#[derive(Debug, PartialEq, Eq)]
pub enum LoopInput<'a> {
    Exit,
    Help,
    Blank,
    Command(&'a str),
}

#[must_use]
pub fn parse_line(line: &str) -> LoopInput<'_> {
    let line = line.trim();
    if line.is_empty() {
        return LoopInput::Blank;
    }
    match line.to_ascii_lowercase().as_str() {
        "exit" | "quit" => LoopInput::Exit,
        "help" | "?" => LoopInput::Help,
        _ => LoopInput::Command(line),
    }
}

/// Run the loop over `input`, writing prompts to `prompt_out`.
///
/// Results and errors go through the app's renderer. Returns the number of
/// commands handled, successful or not.
///
/// # Errors
///
/// Returns an error only when reading input or writing the prompt fails.
pub async fn run<C, P, E>(
    app: &AppContext,
    dispatcher: &Dispatcher<'_, C, P, E>,
    mut input: impl BufRead,
    mut prompt_out: impl Write,
) -> Result<usize>
where
    C: IntentClassifier,
    P: PiOperations,
    E: EspOperations,
{
    if !app.is_json() && !app.output.quiet {
        println!(
            "  {} Type a request, 'help' for examples, 'exit' to quit.",
            "gemini-workspace".style(app.output.styles.header)
        );
    }

    let mut handled = 0;
    let mut line = String::new();
    loop {
        enter(Phase::AwaitingCommand);
        if !app.is_json() {
            write!(prompt_out, "{}", PROMPT.style(app.output.styles.prompt))
                .context("writing prompt")?;
            prompt_out.flush().context("writing prompt")?;
        }

        line.clear();
        if input.read_line(&mut line).context("reading input")? == 0 {
            // End of input leaves the prompt line unterminated.
            if !app.is_json() {
                writeln!(prompt_out).context("writing prompt")?;
            }
            break;
        }

        match parse_line(&line) {
            LoopInput::Exit => break,
            LoopInput::Blank => {}
            LoopInput::Help => HumanRenderer::new(&app.output).render_help(),
            LoopInput::Command(command) => {
                handled += 1;
                match dispatcher.handle(command, &app.reporter()).await {
                    Ok(outcome) => app.renderer().render_handled(&outcome)?,
                    Err(e) => {
                        tracing::debug!(error = %format!("{e:#}"), "command failed");
                        app.renderer().render_error(&e)?;
                    }
                }
            }
        }
        enter(Phase::Idle);
    }
    Ok(handled)
}
