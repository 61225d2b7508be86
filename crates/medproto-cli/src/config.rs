use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use medproto_validation::ValidationConfig;

/// Version written by [`save_config`]. Every bump needs a step in
/// [`migrate`].
const CURRENT_VERSION: u32 = 1;

/// Keys that lived at the top level before v1 and now belong to
/// [`ValidationConfig`].
const V0_VALIDATION_KEYS: [&str; 3] = ["overlap_threshold", "extra_abbreviations", "recent_reference_years"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Layout version; absent in files written before versioning.
    #[serde(default)]
    pub config_version: u32,
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Medication reference used when `validate` gets no `--medications`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medications_path: Option<PathBuf>,
}

/// `<platform config dir>/medproto/config.json`.
pub fn default_config_path() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("medproto").join("config.json"))
}

/// Load the config at `path`, or the defaults when there is no file yet.
pub fn load_config(path: &Path) -> eyre::Result<CliConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(CliConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Older layouts only deserialize after migration.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = match json.get("config_version").and_then(|v| v.as_u64()) {
        Some(v) => u32::try_from(v).map_err(|_| eyre::eyre!("config_version {v} is out of range"))?,
        None => 0,
    };

    let migrated = migrate(json, on_disk_version)?;
    let config: CliConfig = serde_json::from_value(migrated)?;
    Ok(config)
}

/// Upgrade raw config JSON one version at a time to [`CURRENT_VERSION`].
fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update medproto."
        ));
    }

    // v0 → v1: validation tunables move under `validation`
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        let mut validation = serde_json::Map::new();
        for key in V0_VALIDATION_KEYS {
            if let Some(value) = obj.remove(key) {
                validation.insert(key.to_string(), value);
            }
        }
        obj.entry("validation")
            .or_insert(serde_json::Value::Object(validation));
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!(from = 0, to = 1, "validation settings moved under `validation`");
    }

    Ok(json)
}

/// Save `config` stamped with the current version.
pub fn save_config(config: &CliConfig, path: &Path) -> eyre::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| eyre::eyre!("config path {} has no parent directory", path.display()))?;
    std::fs::create_dir_all(dir)?;

    let stamped = CliConfig {
        config_version: CURRENT_VERSION,
        ..config.clone()
    };
    let json = serde_json::to_string_pretty(&stamped)?;

    // Readers never see a half-written file.
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;

    // The file may name local reference paths; keep it owner-only.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
