//! Tests for the interactive loop over scripted stdin.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::io::Cursor;

use gemini_workspace::application::services::classifier::LlmClassifier;
use gemini_workspace::application::services::dispatch::Dispatcher;
use gemini_workspace::commands::interactive;

use crate::helpers::quiet_app;
use crate::mocks::{RecordingEsp, RecordingPi, StubCompletion};

const DIAGNOSE: &str = r#"{"agent": "pi", "action": "diagnose", "parameters": {}}"#;

struct Harness {
    completion: StubCompletion,
    pi: RecordingPi,
    esp: RecordingEsp,
}

impl Harness {
    fn new(completion: StubCompletion) -> Self {
        Self {
            completion,
            pi: RecordingPi::default(),
            esp: RecordingEsp::default(),
        }
    }

    /// Feed `script` to the loop; returns (commands handled, prompt output).
    async fn run(&self, script: &str) -> (usize, String) {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = quiet_app(dir.path());
        let classifier = LlmClassifier::new(&self.completion);
        let dispatcher = Dispatcher {
            classifier: &classifier,
            pi: &self.pi,
            esp: &self.esp,
            dry_run: false,
        };
        let mut prompts = Vec::new();
        let handled = interactive::run(&app, &dispatcher, Cursor::new(script), &mut prompts)
            .await
            .expect("loop");
        (handled, String::from_utf8(prompts).expect("utf-8"))
    }
}

#[tokio::test]
async fn test_help_and_blank_lines_never_call_the_model() {
    let h = Harness::new(StubCompletion::replying(DIAGNOSE));

    let (handled, prompts) = h.run("help\n\n   \nexit\n").await;

    assert_eq!(handled, 0);
    assert_eq!(h.completion.calls.get(), 0);
    assert_eq!(prompts.matches("gemini>").count(), 4);
}

#[tokio::test]
async fn test_commands_are_dispatched_until_quit() {
    let h = Harness::new(StubCompletion::replying(DIAGNOSE));

    let (handled, _) = h.run("check my pi\nhow is the pi doing\nQUIT\nignored\n").await;

    assert_eq!(handled, 2);
    assert_eq!(h.completion.calls.get(), 2);
    assert_eq!(*h.pi.calls.borrow(), ["diagnose", "diagnose"]);
}

#[tokio::test]
async fn test_end_of_input_ends_the_session() {
    let h = Harness::new(StubCompletion::replying(DIAGNOSE));

    let (handled, prompts) = h.run("check my pi").await;

    assert_eq!(handled, 1);
    assert!(prompts.ends_with('\n'), "prompt line terminated on EOF");
}

#[tokio::test]
async fn test_errors_do_not_stop_the_loop() {
    let h = Harness::new(StubCompletion::unreachable());

    let (handled, _) = h.run("install numpy\nrun uptime\nexit\n").await;

    assert_eq!(handled, 2);
    assert_eq!(h.completion.calls.get(), 2);
    assert!(h.pi.calls.borrow().is_empty());
    assert!(h.esp.calls.borrow().is_empty());
}

#[tokio::test]
async fn test_empty_input_handles_nothing() {
    let h = Harness::new(StubCompletion::replying(DIAGNOSE));

    let (handled, _) = h.run("").await;

    assert_eq!(handled, 0);
}
