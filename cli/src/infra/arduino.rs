//! Infrastructure implementation of the `SketchToolchain` port.
//!
//! Compilation shells out to `arduino-cli`; OTA upload runs the `espota.py`
//! script that ships with the ESP Arduino cores.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{CommandRunner, SketchToolchain};
use crate::domain::config::EspConfig;
use crate::domain::{CommandOutput, DeviceError};
use crate::infra::command_runner::capture;

/// `arduino-cli` plus `espota.py`, located through the ESP config section.
pub struct ArduinoToolchain<R> {
    arduino_cli: String,
    python: String,
    espota: String,
    runner: R,
}

impl<R: CommandRunner> ArduinoToolchain<R> {
    #[must_use]
    pub fn new(config: &EspConfig, runner: R) -> Self {
        Self {
            arduino_cli: config.arduino_cli.clone(),
            python: config.python.clone(),
            espota: crate::domain::ssh::expand_home(&config.espota),
            runner,
        }
    }
}

impl<R: CommandRunner> SketchToolchain for ArduinoToolchain<R> {
    async fn compile(&self, sketch: &Path, board: &str, output_dir: &Path) -> Result<CommandOutput> {
        let sketch = sketch.to_string_lossy();
        let output_dir = output_dir.to_string_lossy();
        let args = [
            "compile",
            "--fqbn",
            board,
            "--output-dir",
            output_dir.as_ref(),
            sketch.as_ref(),
        ];
        let output = self
            .runner
            .run(&self.arduino_cli, &args)
            .await
            .map_err(|e| DeviceError::Compile {
                exit_code: -1,
                output: format!("{e:#}"),
            })?;
        Ok(capture(&output))
    }

    async fn upload_ota(&self, firmware: &Path, host: &str, port: u16) -> Result<CommandOutput> {
        let firmware = firmware.to_string_lossy();
        let port = port.to_string();
        let args = [
            self.espota.as_str(),
            "-i",
            host,
            "-p",
            port.as_str(),
            "-f",
            firmware.as_ref(),
        ];
        let output = self
            .runner
            .run(&self.python, &args)
            .await
            .map_err(|e| DeviceError::Upload {
                target: format!("{host}:{port}"),
                output: format!("{e:#}"),
            })?;
        Ok(capture(&output))
    }
}
