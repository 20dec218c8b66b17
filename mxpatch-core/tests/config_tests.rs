//! Config error-message, atomic-write-safety, and init integration tests.
//! Layout: ~/.mxpatch/config.yaml

use assert_fs::prelude::*;
use mxpatch_core::{
    config::{self, EnvironmentConfig},
    ConfigError, EnvironmentName, EnvironmentRegistry,
};
use predicates::prelude::predicate;
use std::fs;
use std::path::PathBuf;

fn mx_root() -> PathBuf {
    PathBuf::from("/opt/IBM/SMP/maximo")
}

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_missing_config_returns_not_found() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ConfigNotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"));
    assert!(err.to_string().contains("mxpatch init"));
}

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".mxpatch/config.yaml")
        .write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
fn load_wrong_type_yaml_returns_parse_error() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".mxpatch/config.yaml")
        .write_str("- this is a list, not a mapping\n")
        .expect("write");

    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Atomic write safety
// ---------------------------------------------------------------------------

#[test]
fn mid_write_crash_leaves_original_intact() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    config::init_at(home.path(), mx_root(), false).expect("init");

    let path = config::config_path_at(home.path());
    let original_bytes = fs::read(&path).expect("read original");

    // Simulate crash: .tmp written but process died before rename
    let tmp = path.with_file_name("config.yaml.tmp");
    fs::write(&tmp, b"CRASH - INCOMPLETE WRITE").expect("write crash tmp");

    assert_eq!(original_bytes, fs::read(&path).expect("read after crash"));
    assert!(config::load_at(home.path()).is_ok(), "config must still load");
}

// ---------------------------------------------------------------------------
// 3. Init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_yaml() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let created = config::init_at(home.path(), mx_root(), false).expect("init");

    home.child(".mxpatch/config.yaml")
        .assert(predicate::path::exists());
    let loaded = config::load_at(home.path()).expect("load");
    assert_eq!(loaded, created);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let path = config::config_path_at(home.path());
        let mode = fs::metadata(&path).expect("meta").permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "expected 0600, got {mode:o}");
    }
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    config::init_at(home.path(), mx_root(), false).expect("first init");
    let err = config::init_at(home.path(), PathBuf::from("/other"), false).unwrap_err();
    assert!(matches!(err, ConfigError::AlreadyExists { .. }));

    let replaced = config::init_at(home.path(), PathBuf::from("/other"), true).expect("force");
    assert_eq!(replaced.maximo_root, PathBuf::from("/other"));
}

// ---------------------------------------------------------------------------
// 4. Environments from disk
// ---------------------------------------------------------------------------

#[test]
fn environments_resolve_and_read_coordinates() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let props = home.child("dev.properties");
    props
        .write_str(
            "# dev database\n\
             mxe.db.url=jdbc:sqlserver://mxdev01:1433;databaseName=maxdev;integratedSecurity=false;\n\
             mxe.db.user=maximo\n\
             mxe.db.password=secret\n",
        )
        .expect("write props");

    let mut cfg = config::init_at(home.path(), mx_root(), false).expect("init");
    cfg.environments.insert(
        EnvironmentName::from("DEV"),
        EnvironmentConfig {
            properties: props.path().to_path_buf(),
        },
    );
    config::save_at(home.path(), &cfg).expect("save");

    let loaded = config::load_at(home.path()).expect("load");
    let env = EnvironmentRegistry::from_config(&loaded)
        .resolve("DEV")
        .expect("resolve");
    let coords = env.coordinates().expect("coordinates");
    assert_eq!(coords.host, "mxdev01");
    assert_eq!(coords.port, 1433);
    assert_eq!(coords.database, "maxdev");
    assert_eq!(coords.user.as_deref(), Some("maximo"));
    assert_eq!(coords.password.as_deref(), Some("secret"));
}

#[test]
fn missing_properties_file_is_configuration_missing() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let mut cfg = config::init_at(home.path(), mx_root(), false).expect("init");
    cfg.environments.insert(
        EnvironmentName::from("TEST"),
        EnvironmentConfig {
            properties: home.path().join("nope.properties"),
        },
    );
    let env = EnvironmentRegistry::from_config(&cfg)
        .resolve("TEST")
        .expect("resolve");
    let err = env.coordinates().unwrap_err();
    assert!(matches!(err, ConfigError::PropertiesNotFound { .. }));
    assert!(err.is_missing_configuration());
}
