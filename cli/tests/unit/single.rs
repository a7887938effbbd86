//! Tests for single-command mode exit codes.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::process::ExitCode;

use gemini_workspace::application::services::classifier::LlmClassifier;
use gemini_workspace::application::services::dispatch::Dispatcher;
use gemini_workspace::commands::single;

use crate::helpers::quiet_app;
use crate::mocks::{RecordingEsp, RecordingPi, StubCompletion};

const INSTALL_NUMPY: &str =
    r#"{"agent": "pi", "action": "install_library", "parameters": {"package": "numpy"}}"#;

async fn run_once(
    completion: &StubCompletion,
    pi: &RecordingPi,
    dry_run: bool,
    command: &str,
) -> anyhow::Result<ExitCode> {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = quiet_app(dir.path());
    let classifier = LlmClassifier::new(completion);
    let esp = RecordingEsp::default();
    let dispatcher = Dispatcher {
        classifier: &classifier,
        pi,
        esp: &esp,
        dry_run,
    };
    single::run(&app, &dispatcher, command).await
}

#[tokio::test]
async fn test_successful_action_exits_zero() {
    let completion = StubCompletion::replying(INSTALL_NUMPY);
    let pi = RecordingPi::default();

    let code = run_once(&completion, &pi, false, "Install numpy on my raspberry pi")
        .await
        .expect("run");

    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(*pi.calls.borrow(), ["install_library auto numpy"]);
}

#[tokio::test]
async fn test_failed_action_exits_non_zero() {
    let completion = StubCompletion::replying(INSTALL_NUMPY);
    let pi = RecordingPi::failing();

    let code = run_once(&completion, &pi, false, "Install numpy on my raspberry pi")
        .await
        .expect("run");

    assert_eq!(code, ExitCode::FAILURE);
    assert_eq!(pi.calls.borrow().len(), 1);
}

#[tokio::test]
async fn test_dry_run_exits_zero_without_dispatching() {
    let completion = StubCompletion::replying(INSTALL_NUMPY);
    let pi = RecordingPi::failing();

    let code = run_once(&completion, &pi, true, "Install numpy on my raspberry pi")
        .await
        .expect("run");

    assert_eq!(code, ExitCode::SUCCESS);
    assert!(pi.calls.borrow().is_empty());
}

#[tokio::test]
async fn test_classification_failure_is_an_error() {
    let completion = StubCompletion::unreachable();
    let pi = RecordingPi::default();

    let err = run_once(&completion, &pi, false, "diagnose my pi").await.unwrap_err();

    assert!(err.to_string().contains("Could not reach"), "got: {err}");
    assert!(pi.calls.borrow().is_empty());
}

#[tokio::test]
async fn test_blank_command_never_calls_the_model() {
    let completion = StubCompletion::replying(INSTALL_NUMPY);
    let pi = RecordingPi::default();

    let err = run_once(&completion, &pi, false, "   ").await.unwrap_err();

    assert!(err.to_string().contains("No command given"), "got: {err}");
    assert_eq!(completion.calls.get(), 0);
}
