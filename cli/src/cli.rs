//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Drive a Raspberry Pi and ESP8266/ESP32 boards with plain-language commands
#[derive(Parser)]
#[command(
    name = "gemini-workspace",
    version,
    propagate_version = true,
    arg_required_else_help = true,
    disable_help_subcommand = true,
    after_help = "Examples:\n  gemini-workspace Install numpy on my raspberry pi\n  \
                  gemini-workspace \"Create an ESP32 sketch to blink LED on GPIO 2\"\n  \
                  gemini-workspace -i"
)]
pub struct Cli {
    /// Command in plain language; words are joined with spaces
    #[arg(value_name = "PROMPT")]
    pub prompt: Vec<String>,

    /// Read commands from a `gemini>` prompt until exit, quit, or end of input
    #[arg(short, long, conflicts_with = "prompt")]
    pub interactive: bool,

    /// Settings file
    #[arg(
        short,
        long,
        global = true,
        env = "GEMINI_WORKSPACE_CONFIG",
        default_value = "config.yaml"
    )]
    pub config: PathBuf,

    /// Classify the command and print the intent without running it
    #[arg(long)]
    pub dry_run: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Answer yes to confirmation prompts
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// Errors from the command are rendered here, in the selected output
    /// mode, and turned into a failing exit code.
    ///
    /// # Errors
    ///
    /// Returns an error only if the error itself cannot be rendered.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            prompt,
            interactive,
            config,
            dry_run,
            json,
            quiet,
            no_color,
            verbose: _,
            yes,
            command,
        } = self;

        let app = AppContext::new(AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            behaviour: BehaviourFlags { yes, dry_run },
            config_path: config,
        });

        let outcome = match command {
            Some(Command::Config(cmd)) => commands::config::run(&app, cmd),
            None if interactive => commands::run_interactive(&app).await,
            // Env-sourced flags such as NO_COLOR keep clap from showing help.
            None if prompt.is_empty() && !app.is_json() => {
                eprint!("{}", Cli::command().render_help());
                return Ok(ExitCode::from(2));
            }
            None => commands::run_single(&app, &prompt.join(" ")).await,
        };

        match outcome {
            Ok(code) => Ok(code),
            Err(e) => {
                app.renderer().render_error(&e)?;
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
