use std::path::PathBuf;

use medproto_cli::config::{load_config, save_config, CliConfig};
use tempfile::TempDir;

fn config_file(dir: &TempDir) -> PathBuf {
    dir.path().join("medproto").join("config.json")
}

#[test]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = load_config(&config_file(&dir)).unwrap();
    assert_eq!(config, CliConfig::default());
    assert_eq!(config.validation.overlap_threshold, 0.5);
}

#[test]
fn save_then_load_stamps_current_version() {
    let dir = TempDir::new().unwrap();
    let path = config_file(&dir);

    let mut config = CliConfig::default();
    config.validation.overlap_threshold = 0.7;
    config.validation.extra_abbreviations = vec!["pam".to_string()];
    config.medications_path = Some(PathBuf::from("/srv/medicamentos.json"));
    save_config(&config, &path).unwrap();

    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded.config_version, 1);
    assert_eq!(loaded.validation, config.validation);
    assert_eq!(loaded.medications_path, config.medications_path);
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn unversioned_config_is_migrated() {
    let dir = TempDir::new().unwrap();
    let path = config_file(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        r#"{ "overlap_threshold": 0.6, "recent_reference_years": 10, "medications_path": "meds.json" }"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.config_version, 1);
    assert_eq!(config.validation.overlap_threshold, 0.6);
    assert_eq!(config.validation.recent_reference_years, 10);
    assert!(config.validation.extra_abbreviations.is_empty());
    assert_eq!(config.medications_path, Some(PathBuf::from("meds.json")));
}

#[test]
fn newer_config_version_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = config_file(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{ "config_version": 99 }"#).unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("newer than this build supports"));
}

#[test]
fn out_of_range_version_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = config_file(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{ "config_version": 4294967297 }"#).unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("out of range"));
}

#[cfg(unix)]
#[test]
fn saved_config_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let path = config_file(&dir);
    save_config(&CliConfig::default(), &path).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
