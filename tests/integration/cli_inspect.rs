//! CLI integration: inspect and config commands

use super::test_utils::with_isolated_env;
use propsheet::cli::{Commands, RunContext};
use propsheet::error::SheetError;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const SCENE: &str = r##"
[types.Light]
fields = [
    { name = "color", widget = "color" },
    { name = "intensity", widget = "slider" },
]

[types.Camera]
fields = [
    { name = "fov", widget = "slider" },
    { name = "color", widget = "color" },
]

[[objects]]
id = "L1"
type = "Light"
values = { color = "#ffffff", intensity = 1.0 }

[[objects]]
id = "L2"
type = "Light"
values = { color = "#ffffff", intensity = 2.0 }

[[objects]]
id = "C1"
type = "Camera"
values = { fov = 60 }
"##;

fn workspace_with_scene() -> TempDir {
    let workspace = TempDir::new().unwrap();
    std::fs::write(workspace.path().join("scene.toml"), SCENE).unwrap();
    workspace
}

fn inspect(select: &[&str], then_select: &[&str], format: &str) -> Commands {
    Commands::Inspect {
        scene: PathBuf::from("scene.toml"),
        select: select.iter().map(|s| s.to_string()).collect(),
        then_select: then_select.iter().map(|s| s.to_string()).collect(),
        style: None,
        format: format.to_string(),
        timeout_ms: 5000,
    }
}

fn run(workspace: &Path, command: &Commands) -> Result<String, SheetError> {
    let test_dir = TempDir::new().unwrap();
    with_isolated_env(&test_dir, || {
        RunContext::new(workspace.to_path_buf(), None)?.execute(command)
    })
}

#[test]
fn test_inspect_reports_merged_sheet() {
    let workspace = workspace_with_scene();
    let output = run(workspace.path(), &inspect(&["L1", "L2"], &[], "json")).unwrap();

    let sheets: serde_json::Value = serde_json::from_str(&output).unwrap();
    let sheets = sheets.as_array().unwrap();
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0]["epoch"], 1);

    let controls = sheets[0]["controls"].as_array().unwrap();
    assert_eq!(controls.len(), 2);
    assert_eq!(controls[0]["field"], "color");
    assert_eq!(controls[0]["value"]["state"], "uniform");
    assert_eq!(controls[1]["field"], "intensity");
    assert_eq!(controls[1]["value"]["state"], "mixed");
}

#[test]
fn test_inspect_replaced_selection_reports_only_latest() {
    let workspace = workspace_with_scene();
    let output = run(workspace.path(), &inspect(&["L1"], &["L1", "C1"], "json")).unwrap();

    let sheets: serde_json::Value = serde_json::from_str(&output).unwrap();
    let sheets = sheets.as_array().unwrap();
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0]["epoch"], 2);
    let fields: Vec<&str> = sheets[0]["controls"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["color"]);
}

#[test]
fn test_inspect_unknown_object_fails() {
    let workspace = workspace_with_scene();
    let err = run(workspace.path(), &inspect(&["L1", "ghost"], &[], "text")).unwrap_err();
    assert!(matches!(err, SheetError::UnknownObject(ref id) if id == "ghost"));
    assert!(propsheet::cli::map_error(&err).contains("ghost"));
}

#[test]
fn test_inspect_unknown_format_fails() {
    let workspace = workspace_with_scene();
    let err = run(workspace.path(), &inspect(&["L1"], &[], "yaml")).unwrap_err();
    assert!(matches!(err, SheetError::OutputError(ref message) if message.contains("yaml")));
}

#[test]
fn test_config_command_reflects_workspace_file() {
    let workspace = TempDir::new().unwrap();
    std::fs::create_dir_all(workspace.path().join("config")).unwrap();
    std::fs::write(
        workspace.path().join("config/config.toml"),
        "[orchestrator]\ndefault_style = \"union\"\n",
    )
    .unwrap();

    let output = run(
        workspace.path(),
        &Commands::Config {
            format: "toml".to_string(),
        },
    )
    .unwrap();
    assert!(output.contains("default_style = \"union\""));
}

#[test]
fn test_binary_inspect_text_output() {
    let workspace = workspace_with_scene();
    let test_dir = TempDir::new().unwrap();
    let config_home = test_dir.path().join("xdg");
    std::fs::create_dir_all(&config_home).unwrap();

    let bin = env!("CARGO_BIN_EXE_propsheet");
    let output = Command::new(bin)
        .env("XDG_CONFIG_HOME", config_home.as_os_str())
        .env("HOME", test_dir.path().as_os_str())
        .env_remove("PROPSHEET_ENV")
        .arg("--workspace")
        .arg(workspace.path())
        .arg("inspect")
        .arg("--scene")
        .arg("scene.toml")
        .arg("--select")
        .arg("L1,C1")
        .arg("--style")
        .arg("union")
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "propsheet inspect should succeed: stderr={:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("epoch 1"));
    for field in ["fov", "color", "intensity"] {
        assert!(stdout.contains(field), "missing {} in {}", field, stdout);
    }
}

#[test]
fn test_binary_reports_missing_scene() {
    let workspace = TempDir::new().unwrap();
    let bin = env!("CARGO_BIN_EXE_propsheet");
    let output = Command::new(bin)
        .env("XDG_CONFIG_HOME", workspace.path().join("xdg").as_os_str())
        .arg("--workspace")
        .arg(workspace.path())
        .arg("inspect")
        .arg("--scene")
        .arg("missing.toml")
        .arg("--select")
        .arg("L1")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid scene"));
}
