//! Human-readable terminal renderer.

use std::path::Path;

use owo_colors::OwoColorize as _;

use crate::application::services::dispatch::Handled;
use crate::domain::config::{API_KEY_ENV, MODEL_ENV, WorkspaceConfig};
use crate::domain::{ActionResult, CommandOutput, DiagnosticCheck, Intent, Payload};
use crate::output::OutputContext;

/// Example requests shown by `help` in interactive mode.
pub const EXAMPLE_COMMANDS: &[&str] = &[
    "Install numpy on my raspberry pi",
    "Run diagnostics on the pi",
    "Show disk usage on the pi",
    "Upload ./app.py to /home/pi/app.py on the pi",
    "Create an ESP32 sketch to blink LED on GPIO 2",
    "Create a wifi sketch for network HomeNet with password secret",
    "Compile the blink sketch",
    "Upload the blink sketch to 192.168.1.100 via OTA",
];

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the intent and, when the action ran, its result.
    pub fn render_handled(&self, handled: &Handled) {
        match &handled.result {
            Some(result) => self.render_result(result),
            None => self.render_intent(&handled.intent),
        }
    }

    /// Render an action result with its payload.
    ///
    /// Captured process output is relayed even when `quiet`; it is the
    /// answer the user asked for.
    pub fn render_result(&self, result: &ActionResult) {
        if result.success {
            self.ctx.success(&result.message);
        } else {
            self.ctx.error(&result.message);
        }
        match &result.payload {
            Some(Payload::Output(output)) => self.relay(output),
            Some(Payload::Diagnostics { checks }) => self.render_diagnostics(checks),
            Some(Payload::Sketch { path }) => self.ctx.kv("Sketch:", &path.display().to_string()),
            Some(Payload::Firmware { path, output }) => {
                self.relay(output);
                self.ctx.kv("Firmware:", &path.display().to_string());
            }
            None => {}
        }
    }

    /// Render a classified intent without running it (dry run).
    pub fn render_intent(&self, intent: &Intent) {
        self.ctx.header("Planned action (dry run):");
        self.ctx.kv("Agent: ", intent.agent.as_str());
        self.ctx.kv("Action:", intent.action.as_str());
        for (name, value) in intent.parameters.iter() {
            self.ctx.kv(&format!("  {name}:"), &value.to_string());
        }
    }

    /// Render a command error.
    pub fn render_error(&self, err: &anyhow::Error) {
        self.ctx.error(&format!("{err:#}"));
    }

    fn render_diagnostics(&self, checks: &[DiagnosticCheck]) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.header("Diagnostics:");
        for check in checks {
            let mark = if check.ok {
                "✓".style(self.ctx.styles.success).to_string()
            } else {
                "✗".style(self.ctx.styles.error).to_string()
            };
            println!("    {mark} {}", format_diagnostic_line(check));
        }
    }

    fn relay(&self, output: &CommandOutput) {
        let stdout = output.stdout.trim_end();
        if !stdout.is_empty() {
            println!("{stdout}");
        }
        let stderr = output.stderr.trim_end();
        if !stderr.is_empty() {
            eprintln!("{}", stderr.style(self.ctx.styles.dim));
        }
    }

    /// Render the resolved configuration with secrets masked.
    pub fn render_config(&self, config: &WorkspaceConfig, path: &Path) {
        let c = config.redacted();
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        println!("  {}", "gemini:".style(self.ctx.styles.bold));
        println!(
            "    {:<18} {}",
            "api_key:",
            c.gemini.api_key.as_deref().unwrap_or("(not set)")
        );
        println!("    {:<18} {}", "model:", c.gemini.model);
        println!("    {:<18} {}", "endpoint:", c.gemini.endpoint);
        println!();
        println!("  {}", "raspberry_pi:".style(self.ctx.styles.bold));
        println!("    {:<18} {}", "host:", c.raspberry_pi.host);
        println!("    {:<18} {}", "port:", c.raspberry_pi.port);
        println!("    {:<18} {}", "username:", c.raspberry_pi.username);
        println!(
            "    {:<18} {}",
            "password:",
            c.raspberry_pi.password.as_deref().unwrap_or("(not set)")
        );
        println!(
            "    {:<18} {}",
            "key_path:",
            c.raspberry_pi.key_path.as_deref().unwrap_or("(not set)")
        );
        println!();
        println!("  {}", "esp_devices:".style(self.ctx.styles.bold));
        println!("    {:<18} {}", "sketch_directory:", c.esp_devices.sketch_directory);
        println!("    {:<18} {}", "default_board:", c.esp_devices.default_board);
        println!("    {:<18} {}", "ota_port:", c.esp_devices.ota_port);
        println!("    {:<18} {}", "arduino_cli:", c.esp_devices.arduino_cli);
        println!("    {:<18} {}", "espota:", c.esp_devices.espota);
        println!("    {:<18} {}", "python:", c.esp_devices.python);
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in [API_KEY_ENV, MODEL_ENV] {
            let state = if std::env::var(var).is_ok_and(|v| !v.trim().is_empty()) {
                "(set)"
            } else {
                "(not set)"
            };
            println!("    {:<18} {state}", format!("{var}:"));
        }
        println!();
    }

    /// Print interactive-mode help.
    pub fn render_help(&self) {
        self.ctx.header("Describe what you want in plain language, for example:");
        for example in EXAMPLE_COMMANDS {
            println!("    {}", example.style(self.ctx.styles.dim));
        }
        println!();
        println!("  Type 'exit' or 'quit' to leave.");
    }
}

/// `name: value` for one diagnostic entry.
#[must_use]
pub fn format_diagnostic_line(check: &DiagnosticCheck) -> String {
    if check.value.contains('\n') {
        let indented = check.value.lines().collect::<Vec<_>>().join("\n        ");
        format!("{}:\n        {indented}", check.name)
    } else {
        format!("{}: {}", check.name, check.value)
    }
}
