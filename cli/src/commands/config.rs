//! `gemini-workspace config`: show the resolved settings or write a template.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::config_service;

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the resolved configuration with secrets masked
    Show,
    /// Write a commented example configuration file
    Init,
}

/// Run the config command.
///
/// # Errors
///
/// Returns an error if the settings cannot be loaded or written.
pub fn run(app: &AppContext, cmd: ConfigCommand) -> Result<ExitCode> {
    match cmd {
        ConfigCommand::Show => show_config(app),
        ConfigCommand::Init => init_config(app),
    }
}

fn show_config(app: &AppContext) -> Result<ExitCode> {
    let config = app.load_config()?;
    app.renderer().render_config(&config, app.config_store.path())?;
    Ok(ExitCode::SUCCESS)
}

fn init_config(app: &AppContext) -> Result<ExitCode> {
    let path = app.config_store.path();
    let overwrite = path.exists()
        && (app.non_interactive
            || app.confirm(&format!("{} exists. Overwrite?", path.display()), false)?);

    let written = config_service::init_config(&app.config_store, overwrite)?;
    if app.is_json() {
        let obj = serde_json::json!({ "path": path.display().to_string(), "written": written });
        println!("{}", serde_json::to_string_pretty(&obj)?);
    } else if written {
        app.output.success(&format!("Wrote {}", path.display()));
        app.output
            .info("Set GEMINI_API_KEY or edit gemini.api_key before running commands.");
    } else {
        app.output.warn(&format!("Left {} unchanged", path.display()));
    }
    Ok(ExitCode::SUCCESS)
}
