//! Command implementations
//!
//! `Session` is the composition root: the only place where concrete infra
//! types are wired into the application services.

pub mod config;
pub mod interactive;
pub mod single;

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::classifier::LlmClassifier;
use crate::application::services::dispatch::Dispatcher;
use crate::application::services::esp_agent::EspAgent;
use crate::application::services::pi_agent::PiAgent;
use crate::domain::ssh::SshTarget;
use crate::infra::arduino::ArduinoToolchain;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::fs::FsSketchStore;
use crate::infra::gemini::GeminiClient;
use crate::infra::ssh::OpenSshHost;

/// Production classifier and agents, built once from the loaded settings.
pub struct Session {
    classifier: LlmClassifier<GeminiClient>,
    pi: PiAgent<OpenSshHost<TokioCommandRunner>>,
    esp: EspAgent<ArduinoToolchain<TokioCommandRunner>, FsSketchStore>,
}

type ProductionDispatcher<'a> = Dispatcher<
    'a,
    LlmClassifier<GeminiClient>,
    PiAgent<OpenSshHost<TokioCommandRunner>>,
    EspAgent<ArduinoToolchain<TokioCommandRunner>, FsSketchStore>,
>;

impl Session {
    /// Load settings and build every component. Fails before any command
    /// is read when the configuration is unusable.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError`, including a missing API key.
    pub fn start(app: &AppContext) -> Result<Self> {
        let config = app.load_config()?;
        let api_key = config.api_key(&app.config_store.path().display().to_string())?;

        let classifier = LlmClassifier::new(GeminiClient::new(&config.gemini, api_key));
        let pi = PiAgent::new(OpenSshHost::new(
            SshTarget::from_config(&config.raspberry_pi),
            TokioCommandRunner::new(),
        ));
        let esp = EspAgent::new(
            config.esp_devices.clone(),
            ArduinoToolchain::new(&config.esp_devices, TokioCommandRunner::new()),
            FsSketchStore::new(&config.esp_devices.sketch_directory),
        );
        Ok(Self {
            classifier,
            pi,
            esp,
        })
    }

    fn dispatcher(&self, dry_run: bool) -> ProductionDispatcher<'_> {
        Dispatcher {
            classifier: &self.classifier,
            pi: &self.pi,
            esp: &self.esp,
            dry_run,
        }
    }
}

/// Single-command mode.
///
/// # Errors
///
/// Returns configuration, classification, and dispatch errors.
pub async fn run_single(app: &AppContext, command: &str) -> Result<ExitCode> {
    single::ensure_command(command)?;
    let session = Session::start(app)?;
    single::run(app, &session.dispatcher(app.dry_run), command).await
}

/// Interactive mode over stdin.
///
/// # Errors
///
/// Returns configuration errors, or I/O errors on the terminal.
pub async fn run_interactive(app: &AppContext) -> Result<ExitCode> {
    let session = Session::start(app)?;
    let handled = interactive::run(
        app,
        &session.dispatcher(app.dry_run),
        std::io::stdin().lock(),
        std::io::stdout(),
    )
    .await?;
    tracing::debug!(handled, "interactive session ended");
    Ok(ExitCode::SUCCESS)
}
