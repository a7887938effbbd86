//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly.

use std::cell::RefCell;

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// - on a TTY, `step()` drives a single spinner on stderr
/// - otherwise `step()` prints `"  → {message}"` to stderr
/// - nothing is emitted when quiet or in JSON mode
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    silent: bool,
    spinner: RefCell<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext, json: bool) -> Self {
        Self {
            ctx,
            silent: json || ctx.quiet,
            spinner: RefCell::new(None),
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if self.silent {
            return;
        }
        if !self.ctx.show_progress() {
            eprintln!("  {} {message}", "→".style(self.ctx.styles.info));
            return;
        }
        let mut spinner = self.spinner.borrow_mut();
        match spinner.as_ref() {
            Some(pb) => pb.set_message(message.to_string()),
            None => *spinner = Some(progress::spinner(message)),
        }
    }

    fn finish(&self) {
        if let Some(pb) = self.spinner.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }
}

impl Drop for TerminalReporter<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}
