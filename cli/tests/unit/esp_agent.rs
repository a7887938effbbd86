//! Tests for the ESP agent with a real sketch directory and a fake toolchain.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use gemini_workspace::application::ports::EspOperations;
use gemini_workspace::application::services::esp_agent::EspAgent;
use gemini_workspace::domain::config::EspConfig;
use gemini_workspace::domain::sketch::SketchRef;
use gemini_workspace::domain::{DeviceError, Parameters, Payload, error_code};
use gemini_workspace::infra::fs::FsSketchStore;
use tempfile::TempDir;

use crate::mocks::FakeToolchain;

fn config() -> EspConfig {
    EspConfig::default()
}

fn agent<'a>(dir: &TempDir, toolchain: &'a FakeToolchain) -> EspAgent<&'a FakeToolchain, FsSketchStore> {
    let root = dir.path().to_str().expect("utf-8 tempdir");
    EspAgent::new(config(), toolchain, FsSketchStore::new(root))
}

fn write_firmware(root: &Path, name: &str) -> PathBuf {
    let build = root.join(name).join("build");
    std::fs::create_dir_all(&build).expect("mkdir");
    let bin = build.join(format!("{name}.ino.bin"));
    std::fs::write(&bin, [0xE9, 0x01, 0x02]).expect("write firmware");
    bin
}

// ── create_sketch ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_blink_on_gpio2_for_esp32() {
    let dir = tempfile::tempdir().expect("tempdir");
    let toolchain = FakeToolchain::exiting(0);
    let esp = agent(&dir, &toolchain);

    let params = Parameters::new()
        .with("kind", "blink")
        .with("device", "esp32")
        .with("pin", 2);
    let result = esp.create_sketch("blink", &params).await.expect("create");

    let expected = dir.path().join("blink").join("blink.ino");
    assert!(result.success);
    assert_eq!(result.payload, Some(Payload::Sketch { path: expected.clone() }));
    let source = std::fs::read_to_string(&expected).expect("sketch written");
    assert!(source.contains("LED_PIN = 2"), "got:\n{source}");
    assert!(!source.contains("{{"));
    assert!(toolchain.compiles.borrow().is_empty(), "create never compiles");
}

#[tokio::test]
async fn test_custom_name_is_sanitized() {
    let dir = tempfile::tempdir().expect("tempdir");
    let toolchain = FakeToolchain::exiting(0);
    let esp = agent(&dir, &toolchain);

    let params = Parameters::new().with("name", "../porch light");
    esp.create_sketch("blink", &params).await.expect("create");

    assert!(dir.path().join("porch_light").join("porch_light.ino").is_file());
}

#[tokio::test]
async fn test_wifi_esp32_uses_esp32_header() {
    let dir = tempfile::tempdir().expect("tempdir");
    let toolchain = FakeToolchain::exiting(0);
    let esp = agent(&dir, &toolchain);

    let params = Parameters::new()
        .with("device", "ESP32")
        .with("ssid", "home")
        .with("password", "hunter2");
    esp.create_sketch("wifi", &params).await.expect("create");

    let source = std::fs::read_to_string(dir.path().join("wifi").join("wifi.ino")).unwrap();
    assert!(source.contains("#include <WiFi.h>"));
    assert!(source.contains(r#"WIFI_SSID = "home""#));
}

#[tokio::test]
async fn test_ota_sketch_uses_configured_port_and_default_family() {
    let dir = tempfile::tempdir().expect("tempdir");
    let toolchain = FakeToolchain::exiting(0);
    let esp = agent(&dir, &toolchain);

    let params = Parameters::new().with("ssid", "home").with("password", "pw");
    esp.create_sketch("ota", &params).await.expect("create");

    let source = std::fs::read_to_string(dir.path().join("ota").join("ota.ino")).unwrap();
    assert!(source.contains("ArduinoOTA.setPort(8266);"));
    assert!(source.contains("<ESP8266WiFi.h>"), "default board is an ESP8266");
}

#[tokio::test]
async fn test_wifi_without_ssid_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let toolchain = FakeToolchain::exiting(0);
    let esp = agent(&dir, &toolchain);

    let err = esp
        .create_sketch("wifi", &Parameters::new().with("password", "pw"))
        .await
        .unwrap_err();

    assert!(
        matches!(
            err.downcast_ref::<DeviceError>(),
            Some(DeviceError::MissingParameter { name, .. }) if name == "ssid"
        ),
        "got: {err:#}"
    );
    assert!(!dir.path().join("wifi").exists());
}

#[tokio::test]
async fn test_unknown_kind_is_template_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let toolchain = FakeToolchain::exiting(0);
    let esp = agent(&dir, &toolchain);

    let err = esp
        .create_sketch("servo", &Parameters::new())
        .await
        .unwrap_err();

    assert_eq!(error_code(&err), "template_not_found");
    assert!(err.to_string().contains("blink"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

// ── compile_sketch ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_compile_defaults_board_and_build_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let toolchain = FakeToolchain::exiting(0);
    let esp = agent(&dir, &toolchain);

    let result = esp
        .compile_sketch(&SketchRef::Name("blink".to_string()), None)
        .await
        .expect("compile");

    let folder = dir.path().join("blink");
    let compiles = toolchain.compiles.borrow();
    assert_eq!(compiles.len(), 1);
    assert_eq!(compiles[0].0, folder);
    assert_eq!(compiles[0].1, "esp8266:esp8266:nodemcuv2");
    assert_eq!(compiles[0].2, folder.join("build"));
    assert!(result.success);
    match result.payload {
        Some(Payload::Firmware { path, output }) => {
            assert_eq!(path, folder.join("build").join("blink.ino.bin"));
            assert!(output.stdout.contains("Sketch uses"));
        }
        other => panic!("expected firmware payload, got {other:?}"),
    }
}

#[tokio::test]
async fn test_compile_explicit_board_and_ino_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let toolchain = FakeToolchain::exiting(0);
    let esp = agent(&dir, &toolchain);
    let ino = dir.path().join("elsewhere").join("sensor.ino");

    esp.compile_sketch(&SketchRef::Path(ino), Some("esp32:esp32:esp32"))
        .await
        .expect("compile");

    let compiles = toolchain.compiles.borrow();
    assert_eq!(compiles[0].0, dir.path().join("elsewhere"));
    assert_eq!(compiles[0].1, "esp32:esp32:esp32");
}

#[tokio::test]
async fn test_relative_sketch_path_is_under_sketch_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let toolchain = FakeToolchain::exiting(0);
    let esp = agent(&dir, &toolchain);

    esp.compile_sketch(&SketchRef::Path(PathBuf::from("porch/porch.ino")), None)
        .await
        .expect("compile");

    let compiles = toolchain.compiles.borrow();
    assert_eq!(compiles[0].0, dir.path().join("porch"));
    assert_eq!(compiles[0].2, dir.path().join("porch").join("build"));
}

#[tokio::test]
async fn test_compile_failure_is_compile_error_with_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let toolchain = FakeToolchain::exiting(1);
    let esp = agent(&dir, &toolchain);

    let err = esp
        .compile_sketch(&SketchRef::Name("blink".to_string()), None)
        .await
        .unwrap_err();

    match err.downcast_ref::<DeviceError>() {
        Some(DeviceError::Compile { exit_code, output }) => {
            assert_eq!(*exit_code, 1);
            assert!(output.contains("LED_PIN"), "got: {output}");
        }
        other => panic!("expected compile error, got {other:?}"),
    }
}

// ── upload_ota ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ota_without_firmware_never_calls_uploader() {
    let dir = tempfile::tempdir().expect("tempdir");
    let toolchain = FakeToolchain::exiting(0);
    let esp = agent(&dir, &toolchain);

    let err = esp
        .upload_ota(&SketchRef::Name("blink".to_string()), "192.168.1.100", None)
        .await
        .unwrap_err();

    assert_eq!(error_code(&err), "upload");
    assert!(err.to_string().contains("compile the sketch first"), "got: {err}");
    assert!(toolchain.uploads.borrow().is_empty());
}

#[tokio::test]
async fn test_ota_uses_default_port() {
    let dir = tempfile::tempdir().expect("tempdir");
    let firmware = write_firmware(dir.path(), "blink");
    let toolchain = FakeToolchain::exiting(0);
    let esp = agent(&dir, &toolchain);

    let result = esp
        .upload_ota(&SketchRef::Name("blink".to_string()), "192.168.1.100", None)
        .await
        .expect("upload");

    assert!(result.success);
    assert!(result.message.contains("192.168.1.100:8266"));
    assert_eq!(
        *toolchain.uploads.borrow(),
        [(firmware, "192.168.1.100".to_string(), 8266)]
    );
}

#[tokio::test]
async fn test_ota_explicit_port_and_bin_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let firmware = write_firmware(dir.path(), "ota");
    let toolchain = FakeToolchain::exiting(0);
    let esp = agent(&dir, &toolchain);

    esp.upload_ota(&SketchRef::Path(firmware.clone()), "10.0.0.7", Some(3232))
        .await
        .expect("upload");

    assert_eq!(
        *toolchain.uploads.borrow(),
        [(firmware, "10.0.0.7".to_string(), 3232)]
    );
}

#[tokio::test]
async fn test_ota_relative_bin_path_is_under_sketch_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let firmware = write_firmware(dir.path(), "porch");
    let toolchain = FakeToolchain::exiting(0);
    let esp = agent(&dir, &toolchain);

    esp.upload_ota(
        &SketchRef::Path(PathBuf::from("porch/build/porch.ino.bin")),
        "10.0.0.7",
        None,
    )
    .await
    .expect("upload");

    assert_eq!(
        *toolchain.uploads.borrow(),
        [(firmware, "10.0.0.7".to_string(), 8266)]
    );
}

#[tokio::test]
async fn test_ota_device_not_responding_is_upload_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_firmware(dir.path(), "blink");
    let toolchain = FakeToolchain::exiting(1);
    let esp = agent(&dir, &toolchain);

    let err = esp
        .upload_ota(&SketchRef::Name("blink".to_string()), "192.168.1.100", None)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DeviceError>(),
        Some(DeviceError::Upload { target, output })
            if target == "192.168.1.100:8266" && output.contains("No response")
    ));
}
