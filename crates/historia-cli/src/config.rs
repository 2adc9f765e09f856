use std::path::{Path, PathBuf};
use std::time::Duration;

use historia_completion::retry::RetryPolicy;
use historia_intake::config::IntakeConfig;
use serde::{Deserialize, Serialize};

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
pub const CURRENT_VERSION: u32 = 1;

pub const DEFAULT_PROXY_ENDPOINT: &str = "http://127.0.0.1:8787/api/completion-proxy";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 90;
pub const DEFAULT_TESSERACT_BINARY: &str = "tesseract";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoriaConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    /// Completion proxy URL. The provider credential lives on the proxy.
    pub proxy_endpoint: String,
    /// Where the session snapshot is kept.
    pub data_dir: PathBuf,
    pub request_timeout_secs: u64,
    /// Added in v1. Older configs migrate to a single attempt.
    #[serde(default)]
    pub retry: RetryPolicy,
    pub completion_display_delay_ms: u64,
    pub summary_fallback: bool,
    pub tesseract_binary: PathBuf,
    pub created_at: jiff::Timestamp,
}

impl HistoriaConfig {
    /// Defaults with the session data under `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let intake = IntakeConfig::default();
        Self {
            config_version: CURRENT_VERSION,
            proxy_endpoint: DEFAULT_PROXY_ENDPOINT.to_string(),
            data_dir: data_dir.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
            completion_display_delay_ms: intake.completion_display_delay.as_millis() as u64,
            summary_fallback: intake.summary_fallback,
            tesseract_binary: PathBuf::from(DEFAULT_TESSERACT_BINARY),
            created_at: jiff::Timestamp::now(),
        }
    }

    /// Defaults with the platform data directory.
    pub fn defaults() -> eyre::Result<Self> {
        let base = dirs::data_dir().ok_or_else(|| eyre::eyre!("no data directory found"))?;
        Ok(Self::new(base.join("historia")))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn intake(&self) -> IntakeConfig {
        IntakeConfig {
            completion_display_delay: Duration::from_millis(self.completion_display_delay_ms),
            summary_fallback: self.summary_fallback,
        }
    }

    pub fn session_dir(&self) -> PathBuf {
        self.data_dir.join("session")
    }
}

fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("historia"))
}

pub fn default_config_path() -> eyre::Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

pub fn load_config(path: &Path) -> eyre::Result<HistoriaConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let migrated = migrate(json, on_disk_version)?;
    let config: HistoriaConfig = serde_json::from_value(migrated)?;
    Ok(config)
}

/// The saved config, or defaults when none has been written yet.
pub fn load_or_default(path: &Path) -> eyre::Result<HistoriaConfig> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        HistoriaConfig::defaults()
    }
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
///
/// Each migration is a pure transform on the raw JSON value.
pub fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update Historia."
        ));
    }

    // v0 → v1: add retry (single attempt, as v0 behaved)
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        if !obj.contains_key("retry") {
            obj.insert("retry".to_string(), serde_json::to_value(RetryPolicy::disabled())?);
        }
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 → v1 (added retry)");
    }

    Ok(json)
}

pub fn save_config(config: &HistoriaConfig, path: &Path) -> eyre::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| eyre::eyre!("config path {} has no parent", path.display()))?;
    std::fs::create_dir_all(dir)?;

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let json = serde_json::to_string_pretty(&stamped)?;

    // Write to a temp file then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
