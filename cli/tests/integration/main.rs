//! Integration tests for gemini-workspace
//!
//! These tests spawn the actual binary and test end-to-end behavior. None of
//! them reach a real model or device.
