//! Integration tests for Settings config loading.
//!
//! These tests write only a project-local `.steptree.toml` in a temp
//! directory; a global config on the test machine would sit underneath it.

use std::fs;

use tempfile::TempDir;

use steptree::config::{local_config_path, RuntimeFlavor, Settings};

#[test]
fn given_local_config_when_load_then_overrides_runtime() {
    let project = TempDir::new().unwrap();
    fs::write(
        local_config_path(project.path()),
        r#"
[runtime]
flavor = "multi_thread"
worker_threads = 2
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(project.path())).expect("load settings");

    assert_eq!(settings.runtime.flavor, RuntimeFlavor::MultiThread);
    assert_eq!(settings.runtime.worker_threads, Some(2));
}

#[test]
fn given_local_config_with_log_filter_when_load_then_uses_it() {
    let project = TempDir::new().unwrap();
    fs::write(
        project.path().join(".steptree.toml"),
        "log_filter = \"steptree=trace\"\n",
    )
    .unwrap();

    let settings = Settings::load(Some(project.path())).expect("load settings");

    assert_eq!(settings.log_filter, "steptree=trace");
}

#[test]
fn given_invalid_local_config_when_load_then_config_error() {
    let project = TempDir::new().unwrap();
    fs::write(local_config_path(project.path()), "[runtime\nflavor = 1").unwrap();

    let err = Settings::load(Some(project.path())).unwrap_err();

    assert!(err.to_string().starts_with("config error: parse"));
}

#[test]
fn given_project_without_config_when_load_then_succeeds() {
    let project = TempDir::new().unwrap();
    assert!(Settings::load(Some(project.path())).is_ok());
}
