//! Domain types and validators for the workspace configuration.
//!
//! Pure functions only; no I/O.

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

/// Environment variable that overrides `gemini.api_key`.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Environment variable that overrides `gemini.model`.
pub const MODEL_ENV: &str = "GEMINI_MODEL";

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Language model settings.
    pub gemini: GeminiConfig,
    /// Raspberry Pi connection settings.
    pub raspberry_pi: PiConfig,
    /// ESP8266/ESP32 toolchain settings.
    pub esp_devices: EspConfig,
}

/// Gemini API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key. `GEMINI_API_KEY` takes precedence when set.
    pub api_key: Option<String>,
    /// Model identifier, e.g. `gemini-2.0-flash`.
    pub model: String,
    /// Base URL of the `generateContent` REST API.
    pub endpoint: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

/// SSH connection parameters for the Raspberry Pi.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PiConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    /// Password auth via `sshpass`. Ignored when `key_path` is set.
    pub password: Option<String>,
    /// Path to an SSH private key.
    pub key_path: Option<String>,
}

impl Default for PiConfig {
    fn default() -> Self {
        Self {
            host: "raspberrypi.local".to_string(),
            port: 22,
            username: "pi".to_string(),
            password: None,
            key_path: None,
        }
    }
}

/// Sketch directory and Arduino toolchain settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EspConfig {
    /// Directory that receives generated sketches.
    pub sketch_directory: String,
    /// Fully qualified board name passed to `arduino-cli --fqbn`.
    pub default_board: String,
    /// Default OTA port on the device.
    pub ota_port: u16,
    /// `arduino-cli` executable.
    pub arduino_cli: String,
    /// Path to the `espota.py` uploader shipped with the ESP cores.
    pub espota: String,
    /// Python interpreter used to run `espota`.
    pub python: String,
}

impl Default for EspConfig {
    fn default() -> Self {
        Self {
            sketch_directory: "./sketches".to_string(),
            default_board: "esp8266:esp8266:nodemcuv2".to_string(),
            ota_port: 8266,
            arduino_cli: "arduino-cli".to_string(),
            espota: "espota.py".to_string(),
            python: "python3".to_string(),
        }
    }
}

// ── Environment overrides ────────────────────────────────────────────────────

/// Values read from the process environment that override file settings.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
}

impl EnvOverrides {
    /// Build overrides from any variable lookup (`std::env::var` in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            api_key: non_empty(API_KEY_ENV),
            model: non_empty(MODEL_ENV),
        }
    }
}

impl WorkspaceConfig {
    /// Apply environment overrides. Environment wins over the file value.
    #[must_use]
    pub fn with_overrides(mut self, env: &EnvOverrides) -> Self {
        if let Some(key) = &env.api_key {
            self.gemini.api_key = Some(key.clone());
        }
        if let Some(model) = &env.model {
            self.gemini.model.clone_from(model);
        }
        self
    }

    /// Returns the effective API key or a `MissingApiKey` error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingApiKey` when neither file nor environment set a key.
    pub fn api_key(&self, path: &str) -> Result<&str, ConfigError> {
        self.gemini
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey {
                path: path.to_string(),
            })
    }

    /// Validates values that would otherwise fail later in a confusing way.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError::InvalidValue` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, reason: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        if self.gemini.model.trim().is_empty() {
            return Err(invalid("gemini.model", "must not be empty"));
        }
        if self.raspberry_pi.host.trim().is_empty() {
            return Err(invalid("raspberry_pi.host", "must not be empty"));
        }
        if self.raspberry_pi.port == 0 {
            return Err(invalid("raspberry_pi.port", "must be between 1 and 65535"));
        }
        if self.raspberry_pi.username.trim().is_empty() {
            return Err(invalid("raspberry_pi.username", "must not be empty"));
        }
        if self.esp_devices.sketch_directory.trim().is_empty() {
            return Err(invalid("esp_devices.sketch_directory", "must not be empty"));
        }
        if self.esp_devices.ota_port == 0 {
            return Err(invalid("esp_devices.ota_port", "must be between 1 and 65535"));
        }
        Ok(())
    }

    /// Copy with the API key replaced by a mask, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.gemini.api_key = copy.gemini.api_key.as_deref().map(mask_secret);
        if copy.raspberry_pi.password.is_some() {
            copy.raspberry_pi.password = Some("********".to_string());
        }
        copy
    }
}

/// Keeps the last four characters of a secret.
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

// ── Unit tests ───────────────────────────────────────────────────────────────
