//! Unit tests for gemini-workspace
//!
//! These tests use mocked dependencies and run fast without external I/O.

mod dispatch;
mod esp_agent;
mod interactive;
mod single;
