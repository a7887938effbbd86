//! Application service: classify a command and route it to an agent.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::fmt;
use std::path::PathBuf;

use anyhow::Result;

use crate::application::ports::{EspOperations, IntentClassifier, PiOperations, ProgressReporter};
use crate::domain::ActionResult;
use crate::domain::intent::{ActionKind, Intent, Parameters};
use crate::domain::pi::PackageManager;
use crate::domain::sketch::SketchRef;

/// Where a command is in its lifecycle. Logged at debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingCommand,
    Classifying,
    Dispatching,
    Reporting,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::AwaitingCommand => "awaiting_command",
            Self::Classifying => "classifying",
            Self::Dispatching => "dispatching",
            Self::Reporting => "reporting",
        };
        f.write_str(s)
    }
}

/// Record a phase transition.
pub fn enter(phase: Phase) {
    tracing::debug!(%phase, "phase");
}

/// Result of handling one command.
#[derive(Debug)]
pub struct Handled {
    pub intent: Intent,
    /// `None` when the dispatcher only planned the action (dry run).
    pub result: Option<ActionResult>,
}

/// Route a validated intent to the agent operation it names.
///
/// Parameters are extracted here so agents receive typed arguments.
///
/// # Errors
///
/// Returns `IntentError::MissingParameter` / `InvalidParameter` for bad
/// parameters, and whatever the agent operation returns.
pub async fn dispatch(
    intent: &Intent,
    pi: &impl PiOperations,
    esp: &impl EspOperations,
) -> Result<ActionResult> {
    let params = &intent.parameters;
    let action = intent.action;
    match action {
        ActionKind::InstallLibrary => {
            let package = params.require(action, &["package", "library"])?;
            let manager = params
                .text(&["manager", "package_manager"])
                .map(|m| PackageManager::parse(&m))
                .transpose()?
                .unwrap_or_default();
            pi.install_library(manager, &package).await
        }
        ActionKind::Diagnose => pi.diagnose().await,
        ActionKind::ExecuteCommand => {
            let command = params.require(action, &["command", "cmd"])?;
            pi.execute_command(&command).await
        }
        ActionKind::UploadProgram => {
            let local = params.require(action, &["local_path", "local"])?;
            let remote = params.require(action, &["remote_path", "remote"])?;
            pi.upload_program(&PathBuf::from(local), &remote).await
        }
        ActionKind::CreateSketch => {
            let kind = params.require(action, &["kind", "sketch", "template"])?;
            esp.create_sketch(&kind, params).await
        }
        ActionKind::CompileSketch => {
            let sketch = sketch_ref(action, params)?;
            let board = params.text(&["board", "fqbn"]);
            esp.compile_sketch(&sketch, board.as_deref()).await
        }
        ActionKind::UploadOta => {
            let host = params.require(action, &["host", "ip"])?;
            let sketch = sketch_ref(action, params)?;
            let port = params.port(&["port"])?;
            esp.upload_ota(&sketch, &host, port).await
        }
    }
}

fn sketch_ref(action: ActionKind, params: &Parameters) -> Result<SketchRef> {
    if let Some(path) = params.text(&["path", "sketch_path", "firmware"]) {
        return Ok(SketchRef::Path(PathBuf::from(path)));
    }
    let name = params.require(action, &["name", "sketch_name", "sketch"])?;
    Ok(SketchRef::Name(name))
}

/// Classifier plus both agents: everything one command needs.
pub struct Dispatcher<'a, C, P, E> {
    pub classifier: &'a C,
    pub pi: &'a P,
    pub esp: &'a E,
    pub dry_run: bool,
}

impl<C, P, E> Dispatcher<'_, C, P, E>
where
    C: IntentClassifier,
    P: PiOperations,
    E: EspOperations,
{
    /// Classify `command` and, unless dry-running, dispatch it.
    ///
    /// # Errors
    ///
    /// Returns the classification error or the dispatch error. Agents are
    /// never invoked when classification fails.
    pub async fn handle(&self, command: &str, reporter: &impl ProgressReporter) -> Result<Handled> {
        let handled = self.run(command, reporter).await;
        reporter.finish();
        enter(Phase::Reporting);
        handled
    }

    async fn run(&self, command: &str, reporter: &impl ProgressReporter) -> Result<Handled> {
        enter(Phase::Classifying);
        reporter.step("Understanding request...");
        let intent = self.classifier.classify(command).await?;

        if self.dry_run {
            return Ok(Handled {
                intent,
                result: None,
            });
        }

        enter(Phase::Dispatching);
        reporter.step(&format!("Running {} on {}...", intent.action, intent.agent));
        let result = dispatch(&intent, self.pi, self.esp).await?;
        Ok(Handled {
            intent,
            result: Some(result),
        })
    }
}
