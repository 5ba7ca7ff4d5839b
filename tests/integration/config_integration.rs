//! Integration tests for layered configuration

use super::test_utils::with_isolated_env;
use propsheet::config::{global_config_path, ConfigLoader};
use propsheet::selection::Style;
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, contents: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

#[test]
fn test_defaults_without_any_file() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    let config = with_isolated_env(&test_dir, || ConfigLoader::load(workspace.path()).unwrap());

    assert_eq!(config.orchestrator.default_style, Style::Intersection);
    assert_eq!(config.orchestrator.worker_name_prefix, "propsheet-gen");
    assert!(config.orchestrator.checkpoint_between_buckets);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.output, "stderr");
    assert!(config.validate().is_ok());
}

#[test]
fn test_global_file_under_xdg_config_home() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    let config = with_isolated_env(&test_dir, || {
        let path = global_config_path().unwrap();
        assert!(path.starts_with(test_dir.path().join("xdg")));
        write(
            &path,
            r#"
[orchestrator]
default_style = "union"
"#,
        );
        ConfigLoader::load(workspace.path()).unwrap()
    });

    assert_eq!(config.orchestrator.default_style, Style::Union);
}

#[test]
fn test_workspace_file_overrides_global() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    let config = with_isolated_env(&test_dir, || {
        write(
            &global_config_path().unwrap(),
            r#"
[orchestrator]
default_style = "union"
worker_name_prefix = "global"
"#,
        );
        write(
            &workspace.path().join("config/config.toml"),
            r#"
[orchestrator]
worker_name_prefix = "workspace"
checkpoint_between_buckets = false
"#,
        );
        ConfigLoader::load(workspace.path()).unwrap()
    });

    assert_eq!(config.orchestrator.default_style, Style::Union);
    assert_eq!(config.orchestrator.worker_name_prefix, "workspace");
    assert!(!config.orchestrator.checkpoint_between_buckets);
}

#[test]
fn test_environment_file_selected_by_propsheet_env() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write(
        &workspace.path().join("config/config.toml"),
        "[logging]\nlevel = \"warn\"\n",
    );
    write(
        &workspace.path().join("config/ci.toml"),
        "[logging]\nlevel = \"trace\"\nformat = \"json\"\n",
    );

    let (default_env, ci_env) = with_isolated_env(&test_dir, || {
        let default_env = ConfigLoader::load(workspace.path()).unwrap();
        std::env::set_var("PROPSHEET_ENV", "ci");
        let ci_env = ConfigLoader::load(workspace.path()).unwrap();
        (default_env, ci_env)
    });

    assert_eq!(default_env.logging.level, "warn");
    assert_eq!(ci_env.logging.level, "trace");
    assert_eq!(ci_env.logging.format, "json");
}

#[test]
fn test_environment_variables_override_files() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    write(
        &workspace.path().join("config/config.toml"),
        "[orchestrator]\nworker_name_prefix = \"from-file\"\n",
    );

    let config = with_isolated_env(&test_dir, || {
        std::env::set_var("PROPSHEET__ORCHESTRATOR__WORKER_NAME_PREFIX", "from-env");
        std::env::set_var("PROPSHEET__ORCHESTRATOR__DEFAULT_STYLE", "union");
        ConfigLoader::load(workspace.path()).unwrap()
    });

    assert_eq!(config.orchestrator.worker_name_prefix, "from-env");
    assert_eq!(config.orchestrator.default_style, Style::Union);
}

#[test]
fn test_invalid_values_are_all_reported() {
    let test_dir = TempDir::new().unwrap();
    let config_file = test_dir.path().join("propsheet.toml");
    write(
        &config_file,
        r#"
[orchestrator]
worker_name_prefix = ""

[logging]
format = "yaml"
"#,
    );

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    let errors = config.clone().validate().unwrap_err();
    assert_eq!(errors.len(), 2);

    let message = config.validated().unwrap_err().to_string();
    assert!(message.contains("Orchestrator"));
    assert!(message.contains("Logging"));
}

#[test]
fn test_unknown_style_fails_to_load() {
    let test_dir = TempDir::new().unwrap();
    let config_file = test_dir.path().join("propsheet.toml");
    write(
        &config_file,
        "[orchestrator]\ndefault_style = \"diagonal\"\n",
    );

    assert!(ConfigLoader::load_from_file(&config_file).is_err());
}
