//! Unit tests for configuration and graceful degradation
//!
//! Uses serial_test to prevent ENV variable races: tests that touch
//! MAMMO_ROOT_FOLDER or MAMMO_ROOT are marked #[serial].

use mammo_common::config::{
    CompiledDefaults, LoggingConfig, RootFolderInitializer, RootFolderResolver, TomlConfig,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_root_env() {
    env::remove_var("MAMMO_ROOT_FOLDER");
    env::remove_var("MAMMO_ROOT");
}

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.log_level, "info");
    assert_eq!(defaults.port, 8000);
    assert_eq!(defaults.max_upload_bytes, 50 * 1024 * 1024);
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    clear_root_env();
    let dir = TempDir::new().unwrap();

    let resolver = RootFolderResolver::new("test-module")
        .with_config_path(Some(dir.path().join("absent.toml")));

    assert_eq!(
        resolver.resolve(),
        CompiledDefaults::for_current_platform().root_folder
    );
}

#[test]
#[serial]
fn test_resolver_cli_arg_beats_environment() {
    clear_root_env();
    env::set_var("MAMMO_ROOT_FOLDER", "/tmp/mammo-env");

    let resolver = RootFolderResolver::new("test-module")
        .with_cli_arg(Some(PathBuf::from("/tmp/mammo-cli")));

    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/mammo-cli"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_root_folder_env_takes_precedence() {
    clear_root_env();
    env::set_var("MAMMO_ROOT_FOLDER", "/tmp/mammo-priority-1");
    env::set_var("MAMMO_ROOT", "/tmp/mammo-priority-2");

    let resolver = RootFolderResolver::new("test-module");
    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/mammo-priority-1"));

    env::remove_var("MAMMO_ROOT_FOLDER");
    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/mammo-priority-2"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_reads_toml_root_folder() {
    clear_root_env();
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("mammo-api.toml");
    std::fs::write(&config_path, "root_folder = \"/srv/mammo\"\n").unwrap();

    let resolver = RootFolderResolver::new("mammo-api").with_config_path(Some(config_path));

    assert_eq!(resolver.resolve(), PathBuf::from("/srv/mammo"));
}

#[test]
#[serial]
fn test_resolver_invalid_toml_falls_back_to_default() {
    clear_root_env();
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("broken.toml");
    std::fs::write(&config_path, "root_folder = [unterminated").unwrap();

    let resolver = RootFolderResolver::new("mammo-api").with_config_path(Some(config_path));

    assert!(resolver.load_toml().is_none());
    assert_eq!(
        resolver.resolve(),
        CompiledDefaults::for_current_platform().root_folder
    );
}

#[test]
fn test_initializer_paths() {
    let root = PathBuf::from("/tmp/mammo-test-root");
    let initializer = RootFolderInitializer::new(root.clone());

    assert_eq!(initializer.database_path(), root.join("mammo.db"));
    assert_eq!(initializer.uploads_path(), root.join("uploads"));
}

#[test]
fn test_initializer_nested_directory_creation_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("level1").join("level2");

    let initializer = RootFolderInitializer::new(root.clone());
    assert!(initializer.ensure_directory_exists().is_ok());
    assert!(initializer.ensure_directory_exists().is_ok());
    assert!(root.is_dir());
}

#[test]
fn test_partial_toml_uses_defaults() {
    let config: TomlConfig = toml::from_str("port = 9100\n").unwrap();

    assert_eq!(config.port, Some(9100));
    assert_eq!(config.root_folder, None);
    assert_eq!(config.max_upload_mb, None);
    assert_eq!(config.logging, LoggingConfig::default());
}

#[test]
fn test_toml_roundtrip() {
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/data/mammo")),
        host: Some("0.0.0.0".to_string()),
        port: Some(8080),
        upload_dir: Some(PathBuf::from("/data/uploads")),
        max_upload_mb: Some(10),
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
    };

    let text = toml::to_string(&config).unwrap();
    let parsed: TomlConfig = toml::from_str(&text).unwrap();
    assert_eq!(parsed, config);
}
