//! Application context: unified state passed to every command handler.
//!
//! Adding a new cross-cutting concern requires only one field change here;
//! command signatures stay the same.

use std::path::PathBuf;

use anyhow::Result;

use crate::application::services::config_service;
use crate::domain::config::{EnvOverrides, WorkspaceConfig};
use crate::infra::config::YamlConfigStore;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer, TerminalReporter};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by the `CI` env var).
    pub yes: bool,
    /// Classify only; never touch a device.
    pub dry_run: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Behaviour options.
    pub behaviour: BehaviourFlags,
    /// Settings file location.
    pub config_path: PathBuf,
}

/// Unified application context passed to every command handler.
///
/// Constructed once in `Cli::run()` and passed as `&AppContext` to all
/// command handlers.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// YAML settings file.
    pub config_store: YamlConfigStore,
    /// When `true`, skip interactive prompts and use defaults.
    pub non_interactive: bool,
    /// Classify and print the intent without dispatching it.
    pub dry_run: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: AppFlags) -> Self {
        let non_interactive = flags.behaviour.yes || std::env::var("CI").is_ok();

        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            mode,
            config_store: YamlConfigStore::new(flags.config_path),
            non_interactive,
            dry_run: flags.behaviour.dry_run,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Progress reporter for one command.
    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output, self.is_json())
    }

    /// Load the settings file with `GEMINI_*` environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for unreadable, malformed, or invalid settings.
    pub fn load_config(&self) -> Result<WorkspaceConfig> {
        let env = EnvOverrides::from_lookup(|name| std::env::var(name).ok());
        config_service::load_config(&self.config_store, &env)
    }

    /// Ask the user for confirmation.
    ///
    /// When `non_interactive` is `true` (CI or `--yes`) or nobody is at the
    /// terminal, returns `default` immediately without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive || !console::user_attended_stderr() {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}
