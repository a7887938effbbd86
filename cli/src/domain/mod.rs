//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod action;
pub mod config;
pub mod error;
pub mod intent;
pub mod pi;
pub mod sketch;
pub mod ssh;

pub use action::{ActionResult, CommandOutput, DiagnosticCheck, Payload};
pub use config::{EnvOverrides, WorkspaceConfig};
pub use error::{ConfigError, DeviceError, IntentError, error_code};
pub use intent::{ActionKind, Agent, Intent, ParamValue, Parameters, RawIntent};
