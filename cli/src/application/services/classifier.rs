//! Intent classification: prompt construction, reply parsing, validation.
//!
//! The model is asked for a single JSON object. Whatever it returns is
//! validated against the closed (agent, action) set before anyone acts on it;
//! there is no keyword fallback.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::application::ports::{CompletionClient, IntentClassifier};
use crate::domain::intent::{ActionKind, Agent, Intent, RawIntent};
use crate::domain::IntentError;

const INSTRUCTIONS: &str = "You route commands for a workspace that manages a Raspberry Pi \
and ESP8266/ESP32 microcontrollers.
Decide which agent handles the user's request, which action to run, and extract its parameters.
Reply with exactly one JSON object and nothing else:
{\"agent\": \"pi\" | \"esp\", \"action\": <action name>, \"parameters\": {<name>: <string or number>}}
Only use the actions listed below. Omit parameters the user did not give; never invent WiFi credentials.";

const EXAMPLES: &str = r#"Examples:
"Install numpy on my raspberry pi" -> {"agent": "pi", "action": "install_library", "parameters": {"package": "numpy"}}
"Create an ESP32 sketch to blink LED on GPIO 2" -> {"agent": "esp", "action": "create_sketch", "parameters": {"kind": "blink", "device": "esp32", "pin": 2}}
"Upload the blink sketch to 192.168.1.100 via OTA" -> {"agent": "esp", "action": "upload_ota", "parameters": {"name": "blink", "host": "192.168.1.100"}}"#;

/// Build the full prompt sent to the model.
#[must_use]
pub fn build_prompt(command: &str) -> String {
    let mut prompt = String::from(INSTRUCTIONS);
    prompt.push_str("\n\nActions:\n");
    for agent in Agent::ALL {
        for action in agent.actions() {
            prompt.push_str(&format!(
                "- agent \"{agent}\", action \"{action}\": parameters {}\n",
                action.parameter_hint()
            ));
        }
    }
    prompt.push('\n');
    prompt.push_str(EXAMPLES);
    prompt.push_str("\n\nUser request: ");
    prompt.push_str(command.trim());
    prompt
}

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").expect("valid regex"));

/// Outermost `{...}` span of a reply, ignoring prose and code fences around it.
#[must_use]
pub fn extract_json_object(reply: &str) -> Option<&str> {
    JSON_OBJECT.find(reply).map(|m| m.as_str())
}

/// Parse and validate a model reply.
///
/// # Errors
///
/// `IntentError::Malformed` when no decodable object is present,
/// `IntentError::UnknownAgent` / `IntentError::UnknownAction` when the
/// object names something outside the closed set.
pub fn parse_reply(reply: &str) -> Result<Intent, IntentError> {
    let object = extract_json_object(reply)
        .ok_or_else(|| IntentError::Malformed("no JSON object in reply".to_string()))?;
    let raw: RawIntent = serde_json::from_str(object)
        .map_err(|e| IntentError::Malformed(format!("cannot decode intent: {e}")))?;
    Intent::try_from(raw)
}

/// Classifier backed by any `CompletionClient`.
pub struct LlmClassifier<C> {
    client: C,
}

impl<C: CompletionClient> LlmClassifier<C> {
    #[must_use]
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

impl<C: CompletionClient> IntentClassifier for LlmClassifier<C> {
    async fn classify(&self, command: &str) -> Result<Intent> {
        let reply = self.client.complete(&build_prompt(command)).await?;
        tracing::debug!(%reply, "model reply");
        let intent = parse_reply(&reply)?;
        tracing::info!(agent = %intent.agent, action = %intent.action, "classified");
        Ok(intent)
    }
}

/// Every action name, for help output.
#[must_use]
pub fn known_actions() -> Vec<&'static str> {
    ActionKind::ALL.iter().map(|a| a.as_str()).collect()
}
