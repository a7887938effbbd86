//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;

use crate::domain::config::WorkspaceConfig;
use crate::domain::pi::PackageManager;
use crate::domain::sketch::SketchRef;
use crate::domain::{ActionResult, CommandOutput, Intent, Parameters};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Extra process input beyond program and arguments.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessInput<'a> {
    /// Environment variables added to the child's inherited environment.
    pub env: &'a [(&'a str, &'a str)],
    /// Bytes written to the child's stdin, which is then closed.
    pub stdin: Option<&'a [u8]>,
}

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_input(program, args, &ProcessInput::default()).await
    }
    /// Run a program with extra environment and optional piped stdin.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or waited on.
    async fn run_with_input(
        &self,
        program: &str,
        args: &[&str],
        input: &ProcessInput<'_>,
    ) -> Result<Output>;
}

// ── Language Model Ports ──────────────────────────────────────────────────────

/// A text-in, text-out completion endpoint.
#[allow(async_fn_in_trait)]
pub trait CompletionClient {
    /// Send one prompt and return the model's text reply.
    ///
    /// # Errors
    ///
    /// Returns `IntentError::Unreachable` for transport failures and
    /// `IntentError::Malformed` for replies without text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Turns a free-text command into a validated `Intent`.
#[allow(async_fn_in_trait)]
pub trait IntentClassifier {
    /// Classify one command. Exactly one attempt, no retries.
    async fn classify(&self, command: &str) -> Result<Intent>;
}

// ── Device Transport Ports ────────────────────────────────────────────────────

/// A remote shell plus file transfer, one fresh session per call.
#[allow(async_fn_in_trait)]
pub trait RemoteHost {
    /// `user@host` for messages.
    fn destination(&self) -> String;
    /// Run `command` in the remote shell verbatim.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::Connection` when the host cannot be reached or
    /// authentication fails. A non-zero remote exit is not an error.
    async fn exec(&self, command: &str) -> Result<CommandOutput>;
    /// Copy one local file to `remote`, overwriting it.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::Connection` when the host cannot be reached.
    async fn upload(&self, local: &Path, remote: &str) -> Result<CommandOutput>;
}

/// Arduino compile and OTA upload tools.
#[allow(async_fn_in_trait)]
pub trait SketchToolchain {
    /// Compile the sketch folder for `board`, writing artifacts to `output_dir`.
    async fn compile(&self, sketch: &Path, board: &str, output_dir: &Path)
    -> Result<CommandOutput>;
    /// Push `firmware` to a device listening for OTA on `host:port`.
    async fn upload_ota(&self, firmware: &Path, host: &str, port: u16) -> Result<CommandOutput>;
}

/// Where generated sketches live.
pub trait SketchStore {
    /// Root sketch directory.
    fn root(&self) -> &Path;
    /// Write `<root>/<name>/<name>.ino`, creating folders and overwriting.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder or file cannot be written.
    fn write_sketch(&self, name: &str, source: &str) -> Result<PathBuf>;
}

// ── Agent Ports ───────────────────────────────────────────────────────────────

/// Operations the dispatcher can route to the Raspberry Pi agent.
#[allow(async_fn_in_trait)]
pub trait PiOperations {
    async fn install_library(&self, manager: PackageManager, package: &str)
    -> Result<ActionResult>;
    async fn diagnose(&self) -> Result<ActionResult>;
    /// Trust boundary: `command` reaches the remote shell unmodified.
    async fn execute_command(&self, command: &str) -> Result<ActionResult>;
    async fn upload_program(&self, local: &Path, remote: &str) -> Result<ActionResult>;
}

/// Operations the dispatcher can route to the ESP agent.
#[allow(async_fn_in_trait)]
pub trait EspOperations {
    async fn create_sketch(&self, kind: &str, params: &Parameters) -> Result<ActionResult>;
    async fn compile_sketch(&self, sketch: &SketchRef, board: Option<&str>)
    -> Result<ActionResult>;
    async fn upload_ota(
        &self,
        sketch: &SketchRef,
        host: &str,
        port: Option<u16>,
    ) -> Result<ActionResult>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message, replacing the previous one.
    fn step(&self, message: &str);
    /// Clear any in-progress indicator before results are printed.
    fn finish(&self);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts where the YAML settings file lives.
pub trait ConfigStore {
    /// Load the file, or defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Unreadable` or `ConfigError::Malformed`.
    fn load(&self) -> Result<WorkspaceConfig>;
    /// Path of the settings file.
    fn path(&self) -> &Path;
    /// Write the commented example template to `path()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write_template(&self) -> Result<()>;
}
