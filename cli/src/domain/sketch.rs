//! Sketch templates and rendering.
//!
//! Templates are compile-time constants with `{{name}}` placeholders.
//! Rendering is pure: it either produces the full source or fails before
//! anything touches the filesystem.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::domain::error::DeviceError;
use crate::domain::intent::Parameters;

/// Microcontroller family; selects the WiFi/OTA headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipFamily {
    Esp8266,
    Esp32,
}

impl ChipFamily {
    /// Infer the family from a device name or an FQBN such as `esp32:esp32:esp32`.
    #[must_use]
    pub fn detect(hint: &str) -> Self {
        if hint.to_ascii_lowercase().contains("esp32") {
            Self::Esp32
        } else {
            Self::Esp8266
        }
    }

    fn wifi_include(self) -> &'static str {
        match self {
            Self::Esp8266 => "#include <ESP8266WiFi.h>",
            Self::Esp32 => "#include <WiFi.h>",
        }
    }

    fn mdns_include(self) -> &'static str {
        match self {
            Self::Esp8266 => "#include <ESP8266mDNS.h>",
            Self::Esp32 => "#include <ESPmDNS.h>",
        }
    }
}

/// Supported sketch kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SketchKind {
    Blink,
    Wifi,
    Ota,
    Sensor,
}

impl SketchKind {
    pub const ALL: [SketchKind; 4] = [Self::Blink, Self::Wifi, Self::Ota, Self::Sensor];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blink => "blink",
            Self::Wifi => "wifi",
            Self::Ota => "ota",
            Self::Sensor => "sensor",
        }
    }

    /// Look up a template by kind name.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::TemplateNotFound` for unknown kinds.
    pub fn parse(kind: &str) -> Result<Self, DeviceError> {
        let wanted = kind.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| DeviceError::TemplateNotFound {
                kind: kind.to_string(),
                available: Self::ALL
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    fn template(self) -> &'static str {
        match self {
            Self::Blink => BLINK_TEMPLATE,
            Self::Wifi => WIFI_TEMPLATE,
            Self::Ota => OTA_TEMPLATE,
            Self::Sensor => SENSOR_TEMPLATE,
        }
    }

    fn placeholders(self) -> &'static [Placeholder] {
        match self {
            Self::Blink => &[PIN_LED, INTERVAL],
            Self::Wifi => &[SSID, PASSWORD],
            Self::Ota => &[SSID, PASSWORD, HOSTNAME],
            Self::Sensor => &[PIN_ANALOG, INTERVAL],
        }
    }
}

impl fmt::Display for SketchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-fillable placeholder. `default: None` marks it required.
struct Placeholder {
    name: &'static str,
    aliases: &'static [&'static str],
    default: Option<&'static str>,
}

const PIN_LED: Placeholder = Placeholder {
    name: "pin",
    aliases: &["gpio", "led_pin"],
    default: Some("LED_BUILTIN"),
};
const PIN_ANALOG: Placeholder = Placeholder {
    name: "pin",
    aliases: &["gpio", "sensor_pin"],
    default: Some("A0"),
};
const INTERVAL: Placeholder = Placeholder {
    name: "interval_ms",
    aliases: &["interval", "delay_ms", "delay"],
    default: Some("1000"),
};
const SSID: Placeholder = Placeholder {
    name: "ssid",
    aliases: &["wifi_ssid"],
    default: None,
};
const PASSWORD: Placeholder = Placeholder {
    name: "password",
    aliases: &["wifi_password"],
    default: None,
};
const HOSTNAME: Placeholder = Placeholder {
    name: "hostname",
    aliases: &[],
    default: Some("esp-ota"),
};

/// Values the agent supplies rather than the user.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    pub family: ChipFamily,
    pub ota_port: u16,
}

/// Render the template for `kind` with `params`.
///
/// # Errors
///
/// Returns `DeviceError::MissingParameter` for the first required
/// placeholder without a value. String values are escaped for C literals.
pub fn render(
    kind: SketchKind,
    params: &Parameters,
    ctx: RenderContext,
) -> Result<String, DeviceError> {
    let mut values: HashMap<&str, String> = HashMap::from([
        ("wifi_include", ctx.family.wifi_include().to_string()),
        ("mdns_include", ctx.family.mdns_include().to_string()),
        ("ota_port", ctx.ota_port.to_string()),
    ]);

    for ph in kind.placeholders() {
        let names: Vec<&str> = std::iter::once(ph.name)
            .chain(ph.aliases.iter().copied())
            .collect();
        let value = match (params.text(&names), ph.default) {
            (Some(v), _) => escape_c(&v),
            (None, Some(d)) => d.to_string(),
            (None, None) => {
                return Err(DeviceError::MissingParameter {
                    kind: kind.to_string(),
                    name: ph.name.to_string(),
                });
            }
        };
        values.insert(ph.name, value);
    }

    // One pass, so substituted values are never expanded again.
    let source = PLACEHOLDER.replace_all(kind.template(), |caps: &Captures<'_>| {
        values
            .get(&caps[1])
            .cloned()
            .unwrap_or_else(|| caps[0].to_string())
    });
    Ok(source.into_owned())
}

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid regex"));

/// How an intent points at an existing sketch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SketchRef {
    /// A sketch folder, an `.ino` file, or a compiled `.bin`.
    Path(PathBuf),
    /// A sketch previously created under the sketch directory.
    Name(String),
}

impl SketchRef {
    /// Sketch folder for this reference. `root` is the sketch directory.
    ///
    /// A `.ino` or `.bin` file maps to its parent folder, with `build/`
    /// stripped for firmware images.
    #[must_use]
    pub fn folder(&self, root: &Path) -> PathBuf {
        match self {
            Self::Name(name) => root.join(sanitize_sketch_name(name)),
            Self::Path(path) if path.extension().is_some() => {
                let parent = path.parent().unwrap_or_else(|| Path::new("."));
                if parent.file_name().is_some_and(|n| n == BUILD_DIR) {
                    parent.parent().unwrap_or(parent).to_path_buf()
                } else {
                    parent.to_path_buf()
                }
            }
            Self::Path(path) => path.clone(),
        }
    }

    /// Firmware image to upload: `.bin` paths as given, otherwise the
    /// `arduino-cli` output `<folder>/build/<name>.ino.bin`.
    #[must_use]
    pub fn firmware(&self, root: &Path) -> PathBuf {
        if let Self::Path(path) = self {
            if path.extension().is_some_and(|e| e == "bin") {
                return path.clone();
            }
        }
        let folder = self.folder(root);
        let name = folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sketch".to_string());
        folder.join(BUILD_DIR).join(format!("{name}.ino.bin"))
    }
}

impl fmt::Display for SketchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Name(n) => f.write_str(n),
        }
    }
}

/// Compiler output folder inside a sketch folder.
pub const BUILD_DIR: &str = "build";

/// Arduino sketch names: letters, digits and underscores, not starting with a digit.
#[must_use]
pub fn sanitize_sketch_name(name: &str) -> String {
    let mut out = NAME_INVALID_CHARS
        .replace_all(name.trim(), "_")
        .trim_matches('_')
        .to_string();
    if out.is_empty() {
        out = "sketch".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static NAME_INVALID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("valid regex"));

fn escape_c(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

// ── Templates ─────────────────────────────────────────────────────────────────

const BLINK_TEMPLATE: &str = r#"// Blink an LED.
// Generated by gemini-workspace.

const int LED_PIN = {{pin}};
const unsigned long INTERVAL_MS = {{interval_ms}};

void setup() {
  pinMode(LED_PIN, OUTPUT);
}

void loop() {
  digitalWrite(LED_PIN, HIGH);
  delay(INTERVAL_MS);
  digitalWrite(LED_PIN, LOW);
  delay(INTERVAL_MS);
}
"#;

const WIFI_TEMPLATE: &str = r#"// Connect to a WiFi network and report the assigned address.
// Generated by gemini-workspace.

{{wifi_include}}

const char* WIFI_SSID = "{{ssid}}";
const char* WIFI_PASSWORD = "{{password}}";

void setup() {
  Serial.begin(115200);
  WiFi.mode(WIFI_STA);
  WiFi.begin(WIFI_SSID, WIFI_PASSWORD);
  Serial.print("Connecting to ");
  Serial.println(WIFI_SSID);
  while (WiFi.status() != WL_CONNECTED) {
    delay(500);
    Serial.print(".");
  }
  Serial.println();
  Serial.print("Connected, IP address: ");
  Serial.println(WiFi.localIP());
}

void loop() {
  if (WiFi.status() != WL_CONNECTED) {
    Serial.println("WiFi lost, reconnecting");
    WiFi.reconnect();
  }
  delay(10000);
}
"#;

const OTA_TEMPLATE: &str = r#"// WiFi + ArduinoOTA so later builds can be uploaded over the network.
// Generated by gemini-workspace.

{{wifi_include}}
{{mdns_include}}
#include <WiFiUdp.h>
#include <ArduinoOTA.h>

const char* WIFI_SSID = "{{ssid}}";
const char* WIFI_PASSWORD = "{{password}}";
const char* OTA_HOSTNAME = "{{hostname}}";

void setup() {
  Serial.begin(115200);
  WiFi.mode(WIFI_STA);
  WiFi.begin(WIFI_SSID, WIFI_PASSWORD);
  while (WiFi.waitForConnectResult() != WL_CONNECTED) {
    Serial.println("Connection failed, rebooting");
    delay(5000);
    ESP.restart();
  }

  ArduinoOTA.setHostname(OTA_HOSTNAME);
  ArduinoOTA.setPort({{ota_port}});
  ArduinoOTA.onStart([]() { Serial.println("OTA start"); });
  ArduinoOTA.onEnd([]() { Serial.println("\nOTA end"); });
  ArduinoOTA.onProgress([](unsigned int progress, unsigned int total) {
    Serial.printf("Progress: %u%%\r", (progress / (total / 100)));
  });
  ArduinoOTA.onError([](ota_error_t error) { Serial.printf("OTA error[%u]\n", error); });
  ArduinoOTA.begin();

  Serial.print("OTA ready, IP address: ");
  Serial.println(WiFi.localIP());
}

void loop() {
  ArduinoOTA.handle();
}
"#;

const SENSOR_TEMPLATE: &str = r#"// Read an analog sensor and print the value over serial.
// Generated by gemini-workspace.

const int SENSOR_PIN = {{pin}};
const unsigned long INTERVAL_MS = {{interval_ms}};

void setup() {
  Serial.begin(115200);
}

void loop() {
  int value = analogRead(SENSOR_PIN);
  Serial.print("sensor=");
  Serial.println(value);
  delay(INTERVAL_MS);
}
"#;
