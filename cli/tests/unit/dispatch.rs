//! Tests for the `dispatch` application service.
//!
//! Classification is driven through `LlmClassifier` over a stub completion
//! client; agents are recorders, so every test checks exactly which agent
//! operation ran and with what arguments.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use gemini_workspace::application::services::classifier::LlmClassifier;
use gemini_workspace::application::services::dispatch::{Dispatcher, dispatch};
use gemini_workspace::domain::{ActionKind, Agent, Intent, IntentError, Parameters, error_code};

use crate::mocks::{CollectingReporter, RecordingEsp, RecordingPi, StubCompletion};

// ── Direct routing ────────────────────────────────────────────────────────────

async fn route(action: ActionKind, params: Parameters) -> (anyhow::Result<()>, Vec<String>) {
    let pi = RecordingPi::default();
    let esp = RecordingEsp::default();
    let result = dispatch(&Intent::new(action, params), &pi, &esp).await;
    let mut calls = pi.calls.into_inner();
    calls.extend(esp.calls.into_inner());
    (result.map(|_| ()), calls)
}

#[tokio::test]
async fn test_install_library_defaults_to_auto_manager() {
    let (result, calls) = route(
        ActionKind::InstallLibrary,
        Parameters::new().with("library", "numpy"),
    )
    .await;
    result.expect("dispatch");
    assert_eq!(calls, ["install_library auto numpy"]);
}

#[tokio::test]
async fn test_install_library_explicit_manager() {
    let (result, calls) = route(
        ActionKind::InstallLibrary,
        Parameters::new().with("package", "pm2").with("manager", "npm"),
    )
    .await;
    result.expect("dispatch");
    assert_eq!(calls, ["install_library npm pm2"]);
}

#[tokio::test]
async fn test_install_library_unknown_manager_is_invalid_parameter() {
    let (result, calls) = route(
        ActionKind::InstallLibrary,
        Parameters::new().with("package", "git").with("manager", "brew"),
    )
    .await;
    let err = result.unwrap_err();
    assert_eq!(error_code(&err), "invalid_parameter");
    assert!(calls.is_empty());
}

#[tokio::test]
async fn test_install_library_without_package_is_missing_parameter() {
    let (result, calls) = route(ActionKind::InstallLibrary, Parameters::new()).await;
    let err = result.unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<IntentError>(),
            Some(IntentError::MissingParameter { name, .. }) if name == "package"
        ),
        "got: {err:#}"
    );
    assert!(calls.is_empty());
}

#[tokio::test]
async fn test_diagnose_takes_no_parameters() {
    let (result, calls) = route(ActionKind::Diagnose, Parameters::new()).await;
    result.expect("dispatch");
    assert_eq!(calls, ["diagnose"]);
}

#[tokio::test]
async fn test_execute_command_passes_command_verbatim() {
    let (result, calls) = route(
        ActionKind::ExecuteCommand,
        Parameters::new().with("cmd", "ls -la /home/pi | head -n 3"),
    )
    .await;
    result.expect("dispatch");
    assert_eq!(calls, ["execute_command ls -la /home/pi | head -n 3"]);
}

#[tokio::test]
async fn test_upload_program_requires_both_paths() {
    let (result, calls) = route(
        ActionKind::UploadProgram,
        Parameters::new().with("local_path", "main.py"),
    )
    .await;
    let err = result.unwrap_err();
    assert!(err.to_string().contains("'remote_path'"), "got: {err}");
    assert!(calls.is_empty());

    let (result, calls) = route(
        ActionKind::UploadProgram,
        Parameters::new()
            .with("local", "main.py")
            .with("remote", "/home/pi/main.py"),
    )
    .await;
    result.expect("dispatch");
    assert_eq!(calls, ["upload_program main.py /home/pi/main.py"]);
}

#[tokio::test]
async fn test_create_sketch_forwards_all_parameters() {
    let (result, calls) = route(
        ActionKind::CreateSketch,
        Parameters::new()
            .with("kind", "blink")
            .with("device", "esp32")
            .with("pin", 2),
    )
    .await;
    result.expect("dispatch");
    assert_eq!(calls, ["create_sketch blink [device,kind,pin]"]);
}

#[tokio::test]
async fn test_compile_sketch_by_name_or_path() {
    let (result, calls) = route(
        ActionKind::CompileSketch,
        Parameters::new().with("name", "blink"),
    )
    .await;
    result.expect("dispatch");
    assert_eq!(calls, [r#"compile_sketch Name("blink") default"#]);

    let (result, calls) = route(
        ActionKind::CompileSketch,
        Parameters::new()
            .with("path", "/tmp/wifi")
            .with("fqbn", "esp32:esp32:esp32"),
    )
    .await;
    result.expect("dispatch");
    assert_eq!(calls, [r#"compile_sketch Path("/tmp/wifi") esp32:esp32:esp32"#]);
}

#[tokio::test]
async fn test_compile_sketch_without_reference_is_missing_parameter() {
    let (result, calls) = route(ActionKind::CompileSketch, Parameters::new()).await;
    let err = result.unwrap_err();
    assert_eq!(error_code(&err), "missing_parameter");
    assert!(err.to_string().contains("'name'"), "got: {err}");
    assert!(calls.is_empty());
}

#[tokio::test]
async fn test_upload_ota_parses_port() {
    let (result, calls) = route(
        ActionKind::UploadOta,
        Parameters::new()
            .with("ip", "192.168.1.100")
            .with("sketch", "blink")
            .with("port", 3232),
    )
    .await;
    result.expect("dispatch");
    assert_eq!(calls, [r#"upload_ota Name("blink") 192.168.1.100 Some(3232)"#]);
}

#[tokio::test]
async fn test_upload_ota_rejects_bad_port() {
    let (result, calls) = route(
        ActionKind::UploadOta,
        Parameters::new()
            .with("host", "192.168.1.100")
            .with("name", "blink")
            .with("port", "ota"),
    )
    .await;
    assert_eq!(error_code(&result.unwrap_err()), "invalid_parameter");
    assert!(calls.is_empty());
}

#[tokio::test]
async fn test_upload_ota_without_host_is_missing_parameter() {
    let (result, _) = route(ActionKind::UploadOta, Parameters::new().with("name", "blink")).await;
    let err = result.unwrap_err();
    assert!(err.to_string().contains("'host'"), "got: {err}");
}

// ── Full pipeline ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_install_numpy_end_to_end() {
    let completion = StubCompletion::replying(
        "```json\n{\"agent\": \"raspberry_pi\", \"action\": \"install_library\", \"parameters\": {\"package\": \"numpy\"}}\n```",
    );
    let classifier = LlmClassifier::new(&completion);
    let pi = RecordingPi::default();
    let esp = RecordingEsp::default();
    let reporter = CollectingReporter::default();
    let dispatcher = Dispatcher {
        classifier: &classifier,
        pi: &pi,
        esp: &esp,
        dry_run: false,
    };

    let handled = dispatcher
        .handle("Install numpy on my raspberry pi", &reporter)
        .await
        .expect("handled");

    assert_eq!(completion.calls.get(), 1);
    assert!(completion.last_prompt.borrow().ends_with("Install numpy on my raspberry pi"));
    assert_eq!(handled.intent.agent, Agent::Pi);
    assert_eq!(handled.intent.action, ActionKind::InstallLibrary);
    assert!(handled.result.expect("result").success);
    assert_eq!(*pi.calls.borrow(), ["install_library auto numpy"]);
    assert!(esp.calls.borrow().is_empty());
    assert_eq!(reporter.steps.borrow().len(), 2);
    assert_eq!(reporter.finished.get(), 1);
}

#[tokio::test]
async fn test_unknown_action_never_reaches_agents() {
    let completion =
        StubCompletion::replying(r#"{"agent": "pi", "action": "reboot", "parameters": {}}"#);
    let classifier = LlmClassifier::new(&completion);
    let pi = RecordingPi::default();
    let esp = RecordingEsp::default();
    let reporter = CollectingReporter::default();
    let dispatcher = Dispatcher {
        classifier: &classifier,
        pi: &pi,
        esp: &esp,
        dry_run: false,
    };

    let err = dispatcher
        .handle("reboot the pi", &reporter)
        .await
        .unwrap_err();

    assert_eq!(error_code(&err), "unknown_action");
    assert!(pi.calls.borrow().is_empty());
    assert!(esp.calls.borrow().is_empty());
    assert_eq!(reporter.finished.get(), 1, "spinner cleared on failure too");
}

#[tokio::test]
async fn test_unreachable_model_is_classification_error() {
    let completion = StubCompletion::unreachable();
    let classifier = LlmClassifier::new(&completion);
    let pi = RecordingPi::default();
    let esp = RecordingEsp::default();
    let dispatcher = Dispatcher {
        classifier: &classifier,
        pi: &pi,
        esp: &esp,
        dry_run: false,
    };

    let err = dispatcher
        .handle("diagnose my pi", &CollectingReporter::default())
        .await
        .unwrap_err();

    assert_eq!(error_code(&err), "classification");
    assert_eq!(completion.calls.get(), 1, "exactly one attempt");
    assert!(pi.calls.borrow().is_empty());
}

#[tokio::test]
async fn test_prose_reply_is_classification_error() {
    let completion = StubCompletion::replying("Sorry, I can't help with that.");
    let classifier = LlmClassifier::new(&completion);
    let pi = RecordingPi::default();
    let esp = RecordingEsp::default();
    let dispatcher = Dispatcher {
        classifier: &classifier,
        pi: &pi,
        esp: &esp,
        dry_run: false,
    };

    let err = dispatcher
        .handle("make coffee", &CollectingReporter::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<IntentError>(),
        Some(IntentError::Malformed(_))
    ));
}

#[tokio::test]
async fn test_dry_run_classifies_without_dispatching() {
    let completion = StubCompletion::replying(
        r#"{"agent": "esp", "action": "create_sketch", "parameters": {"kind": "blink", "pin": 2}}"#,
    );
    let classifier = LlmClassifier::new(&completion);
    let pi = RecordingPi::default();
    let esp = RecordingEsp::default();
    let reporter = CollectingReporter::default();
    let dispatcher = Dispatcher {
        classifier: &classifier,
        pi: &pi,
        esp: &esp,
        dry_run: true,
    };

    let handled = dispatcher
        .handle("blink an led on pin 2", &reporter)
        .await
        .expect("handled");

    assert_eq!(handled.intent.action, ActionKind::CreateSketch);
    assert!(handled.result.is_none());
    assert!(esp.calls.borrow().is_empty());
    assert_eq!(reporter.steps.borrow().len(), 1);
}
