//! Intent model: the closed set of (agent, action) pairs and their parameters.
//!
//! A language model reply is first decoded into a [`RawIntent`] (free-form
//! strings) and then validated into an [`Intent`]. Nothing downstream ever
//! sees an agent or action outside the enumerations below.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::IntentError;

// ── Agents ────────────────────────────────────────────────────────────────────

/// Device agent that handles an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Agent {
    Pi,
    Esp,
}

impl Agent {
    pub const ALL: [Agent; 2] = [Agent::Pi, Agent::Esp];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pi => "pi",
            Self::Esp => "esp",
        }
    }

    /// Parse an agent tag, accepting the long names the model tends to use.
    ///
    /// # Errors
    ///
    /// Returns `IntentError::UnknownAgent` for anything else.
    pub fn parse(tag: &str) -> Result<Self, IntentError> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "pi" | "raspberry_pi" | "raspberrypi" => Ok(Self::Pi),
            "esp" | "esp_device" | "esp8266" | "esp32" => Ok(Self::Esp),
            _ => Err(IntentError::UnknownAgent(tag.to_string())),
        }
    }

    /// Actions this agent accepts.
    pub fn actions(self) -> impl Iterator<Item = ActionKind> {
        ActionKind::ALL.into_iter().filter(move |a| a.agent() == self)
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Actions ───────────────────────────────────────────────────────────────────

/// Every action the dispatcher can route. Each belongs to exactly one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    InstallLibrary,
    Diagnose,
    ExecuteCommand,
    UploadProgram,
    CreateSketch,
    CompileSketch,
    UploadOta,
}

impl ActionKind {
    pub const ALL: [ActionKind; 7] = [
        ActionKind::InstallLibrary,
        ActionKind::Diagnose,
        ActionKind::ExecuteCommand,
        ActionKind::UploadProgram,
        ActionKind::CreateSketch,
        ActionKind::CompileSketch,
        ActionKind::UploadOta,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InstallLibrary => "install_library",
            Self::Diagnose => "diagnose",
            Self::ExecuteCommand => "execute_command",
            Self::UploadProgram => "upload_program",
            Self::CreateSketch => "create_sketch",
            Self::CompileSketch => "compile_sketch",
            Self::UploadOta => "upload_ota",
        }
    }

    #[must_use]
    pub fn agent(self) -> Agent {
        match self {
            Self::InstallLibrary | Self::Diagnose | Self::ExecuteCommand | Self::UploadProgram => {
                Agent::Pi
            }
            Self::CreateSketch | Self::CompileSketch | Self::UploadOta => Agent::Esp,
        }
    }

    /// Parameter hint shown to the language model.
    #[must_use]
    pub fn parameter_hint(self) -> &'static str {
        match self {
            Self::InstallLibrary => {
                r#"{"package": string, "manager": "auto" | "pip" | "apt" | "npm" (optional)}"#
            }
            Self::Diagnose => "{}",
            Self::ExecuteCommand => r#"{"command": string}"#,
            Self::UploadProgram => r#"{"local_path": string, "remote_path": string}"#,
            Self::CreateSketch => {
                r#"{"kind": "blink" | "wifi" | "ota" | "sensor", "device": "esp8266" | "esp32" (optional), "name": string (optional), "pin": number (optional), "interval_ms": number (optional), "ssid": string (wifi/ota), "password": string (wifi/ota), "hostname": string (optional)}"#
            }
            Self::CompileSketch => {
                r#"{"name": string or "path": string, "board": FQBN string (optional)}"#
            }
            Self::UploadOta => {
                r#"{"host": IP address, "name": string or "path": string, "port": number (optional)}"#
            }
        }
    }

    /// Resolve an action tag within the given agent.
    ///
    /// # Errors
    ///
    /// Returns `IntentError::UnknownAction` when the tag is not one of the
    /// agent's actions, including actions that belong to the other agent.
    pub fn parse_for(agent: Agent, tag: &str) -> Result<Self, IntentError> {
        let wanted = tag.trim().to_ascii_lowercase();
        agent
            .actions()
            .find(|a| a.as_str() == wanted)
            .ok_or_else(|| IntentError::UnknownAction {
                agent: agent.to_string(),
                action: tag.to_string(),
                known: agent
                    .actions()
                    .map(ActionKind::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Parameters ────────────────────────────────────────────────────────────────

/// A single parameter value as produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Flag(b) => write!(f, "{b}"),
        }
    }
}

/// Parameter map carried by an intent. Keys are kept as the model sent them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(BTreeMap<String, ParamValue>);

impl Parameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and fixtures.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// First non-blank value among `names`, rendered as a string.
    ///
    /// Nulls never reach here (see [`RawIntent`]); blank strings count as absent.
    #[must_use]
    pub fn text(&self, names: &[&str]) -> Option<String> {
        names
            .iter()
            .filter_map(|n| self.0.get(*n))
            .map(ToString::to_string)
            .find(|v| !v.trim().is_empty())
    }

    /// Like [`Parameters::text`] but fails with `MissingParameter`.
    ///
    /// # Errors
    ///
    /// Returns `IntentError::MissingParameter` naming the first alias.
    pub fn require(&self, action: ActionKind, names: &[&str]) -> Result<String, IntentError> {
        self.text(names).ok_or_else(|| IntentError::MissingParameter {
            action: action.to_string(),
            name: names.first().copied().unwrap_or_default().to_string(),
        })
    }

    /// Optional TCP port parameter.
    ///
    /// # Errors
    ///
    /// Returns `IntentError::InvalidParameter` for values outside `1..=65535`.
    pub fn port(&self, names: &[&str]) -> Result<Option<u16>, IntentError> {
        let Some(raw) = self.text(names) else {
            return Ok(None);
        };
        match raw.trim().parse::<u16>() {
            Ok(p) if p > 0 => Ok(Some(p)),
            _ => Err(IntentError::InvalidParameter {
                name: names.first().copied().unwrap_or_default().to_string(),
                reason: format!("'{raw}' is not a valid port"),
            }),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

// ── Raw and validated intents ─────────────────────────────────────────────────

/// Intent as decoded from the model, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawIntent {
    pub agent: String,
    pub action: String,
    #[serde(default, deserialize_with = "deserialize_params")]
    pub parameters: Parameters,
}

/// Drops `null` and nested values; the model occasionally emits them for
/// parameters it could not fill.
fn deserialize_params<'de, D>(de: D) -> Result<Parameters, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(de)?;
    let mut params = BTreeMap::new();
    for (k, v) in raw.unwrap_or_default() {
        let value = match v {
            serde_json::Value::String(s) => ParamValue::Text(s),
            serde_json::Value::Number(n) => ParamValue::Number(n),
            serde_json::Value::Bool(b) => ParamValue::Flag(b),
            _ => continue,
        };
        params.insert(k, value);
    }
    Ok(Parameters(params))
}

/// A validated intent: agent and action are guaranteed to be a known pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Intent {
    pub agent: Agent,
    pub action: ActionKind,
    pub parameters: Parameters,
}

impl Intent {
    #[must_use]
    pub fn new(action: ActionKind, parameters: Parameters) -> Self {
        Self {
            agent: action.agent(),
            action,
            parameters,
        }
    }
}

impl TryFrom<RawIntent> for Intent {
    type Error = IntentError;

    fn try_from(raw: RawIntent) -> Result<Self, Self::Error> {
        let agent = Agent::parse(&raw.agent)?;
        let action = ActionKind::parse_for(agent, &raw.action)?;
        Ok(Self {
            agent,
            action,
            parameters: raw.parameters,
        })
    }
}
