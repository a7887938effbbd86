//! ESP agent: render sketches, compile them, push firmware over the air.

use anyhow::Result;

use crate::application::ports::{EspOperations, SketchStore, SketchToolchain};
use crate::domain::config::EspConfig;
use crate::domain::sketch::{
    self, BUILD_DIR, ChipFamily, RenderContext, SketchKind, SketchRef, sanitize_sketch_name,
};
use crate::domain::{ActionResult, DeviceError, Parameters, Payload};

pub struct EspAgent<T, S> {
    config: EspConfig,
    toolchain: T,
    store: S,
}

impl<T: SketchToolchain, S: SketchStore> EspAgent<T, S> {
    #[must_use]
    pub fn new(config: EspConfig, toolchain: T, store: S) -> Self {
        Self {
            config,
            toolchain,
            store,
        }
    }
}

impl<T: SketchToolchain, S: SketchStore> EspAgent<T, S> {
    /// Relative paths name sketches under the sketch directory; one that
    /// exists only relative to the working directory is kept as given.
    fn resolve(&self, sketch: &SketchRef) -> SketchRef {
        match sketch {
            SketchRef::Path(path) if path.is_relative() => {
                let under_root = self.store.root().join(path);
                if under_root.exists() || !path.exists() {
                    SketchRef::Path(under_root)
                } else {
                    sketch.clone()
                }
            }
            _ => sketch.clone(),
        }
    }
}

impl<T: SketchToolchain, S: SketchStore> EspOperations for EspAgent<T, S> {
    async fn create_sketch(&self, kind: &str, params: &Parameters) -> Result<ActionResult> {
        let kind = SketchKind::parse(kind)?;
        let device = params
            .text(&["device", "board"])
            .unwrap_or_else(|| self.config.default_board.clone());
        let family = ChipFamily::detect(&device);
        let source = sketch::render(
            kind,
            params,
            RenderContext {
                family,
                ota_port: self.config.ota_port,
            },
        )?;
        let name = sanitize_sketch_name(
            &params
                .text(&["name", "sketch_name"])
                .unwrap_or_else(|| kind.as_str().to_string()),
        );
        let path = self.store.write_sketch(&name, &source)?;
        tracing::info!(kind = %kind, path = %path.display(), "sketch written");
        Ok(
            ActionResult::ok(format!("Created {kind} sketch at {}", path.display()))
                .with_payload(Payload::Sketch { path }),
        )
    }

    async fn compile_sketch(
        &self,
        sketch: &SketchRef,
        board: Option<&str>,
    ) -> Result<ActionResult> {
        let sketch = self.resolve(sketch);
        let folder = sketch.folder(self.store.root());
        let board = board.unwrap_or(&self.config.default_board);
        let output_dir = folder.join(BUILD_DIR);
        tracing::info!(sketch = %folder.display(), %board, "compiling");

        let output = self.toolchain.compile(&folder, board, &output_dir).await?;
        if !output.success() {
            return Err(DeviceError::Compile {
                exit_code: output.exit_code,
                output: output.combined(),
            }
            .into());
        }
        let firmware = sketch.firmware(self.store.root());
        let message = format!("Compiled {} for {board}", folder.display());
        Ok(ActionResult::ok(message).with_payload(Payload::Firmware {
            path: firmware,
            output,
        }))
    }

    async fn upload_ota(
        &self,
        sketch: &SketchRef,
        host: &str,
        port: Option<u16>,
    ) -> Result<ActionResult> {
        let port = port.unwrap_or(self.config.ota_port);
        let target = format!("{host}:{port}");
        let sketch = self.resolve(sketch);
        let firmware = sketch.firmware(self.store.root());
        if !firmware.is_file() {
            return Err(DeviceError::Upload {
                target,
                output: format!(
                    "firmware {} not found; compile the sketch first",
                    firmware.display()
                ),
            }
            .into());
        }

        tracing::info!(firmware = %firmware.display(), %target, "ota upload");
        let output = self.toolchain.upload_ota(&firmware, host, port).await?;
        if !output.success() {
            return Err(DeviceError::Upload {
                target,
                output: output.combined(),
            }
            .into());
        }
        Ok(
            ActionResult::ok(format!("Uploaded {} to {target}", firmware.display()))
                .with_payload(Payload::Output(output)),
        )
    }
}
