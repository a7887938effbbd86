//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, the
//! Gemini HTTP client, SSH transport, the Arduino toolchain, and filesystem
//! access.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod arduino;
pub mod command_runner;
pub mod config;
pub mod fs;
pub mod gemini;
pub mod ssh;
