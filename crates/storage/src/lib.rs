use directories::ProjectDirs;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_SCHEMA_VERSION: u32 = 1;
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local config directory")]
    NoConfigDirectory,
    #[error("unsupported config version {0}")]
    UnsupportedVersion(u32),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Settings for a headless viewer session. Command-line flags take
/// precedence over stored values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Base url of the content REST API.
    pub server: Option<String>,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub placeholder_height: f32,
    pub scroll_throttle_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            server: None,
            viewport_width: 1280.0,
            viewport_height: 800.0,
            placeholder_height: 800.0,
            scroll_throttle_ms: 100,
            request_timeout_secs: 30,
        }
    }
}

impl ViewerConfig {
    pub fn scroll_throttle(&self) -> Duration {
        Duration::from_millis(self.scroll_throttle_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigEnvelope {
    version: u32,
    config: ViewerConfig,
}

impl ConfigStore {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("dev", "DocPreview", "DocPreview")
            .ok_or(StorageError::NoConfigDirectory)?;

        Ok(Self { root: dirs.config_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn load(&self) -> Result<ViewerConfig, StorageError> {
        let path = self.config_path();
        if !path.exists() {
            debug!("no config at {}, using defaults", path.display());
            return Ok(ViewerConfig::default());
        }

        let bytes = fs::read(path)?;
        let envelope: ConfigEnvelope = serde_json::from_slice(&bytes)?;
        if envelope.version > CONFIG_SCHEMA_VERSION {
            return Err(StorageError::UnsupportedVersion(envelope.version));
        }

        Ok(envelope.config)
    }

    pub fn save(&self, config: &ViewerConfig) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;

        let envelope = ConfigEnvelope { version: CONFIG_SCHEMA_VERSION, config: config.clone() };

        let bytes = serde_json::to_vec_pretty(&envelope)?;
        fs::write(self.config_path(), bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trip() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = ConfigStore::with_root(temp.path().join("nested"));

        let config = ViewerConfig {
            server: Some("https://tenant.example.com".to_owned()),
            viewport_width: 1024.0,
            request_timeout_secs: 5,
            ..ViewerConfig::default()
        };

        store.save(&config).expect("save should succeed");
        let loaded = store.load().expect("load should succeed");

        assert_eq!(loaded, config);
    }

    #[test]
    fn load_defaults_when_file_absent() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = ConfigStore::with_root(temp.path());

        let loaded = store.load().expect("load should succeed");
        assert_eq!(loaded, ViewerConfig::default());
        assert_eq!(loaded.scroll_throttle(), Duration::from_millis(100));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = ConfigStore::with_root(temp.path());
        fs::write(store.config_path(), r#"{"version":1,"config":{"viewport_height":600}}"#)
            .expect("write config");

        let loaded = store.load().expect("load should succeed");
        assert_eq!(loaded.viewport_height, 600.0);
        assert_eq!(loaded.viewport_width, 1280.0);
        assert_eq!(loaded.server, None);
    }

    #[test]
    fn newer_schema_is_rejected() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = ConfigStore::with_root(temp.path());
        fs::write(store.config_path(), r#"{"version":9,"config":{}}"#).expect("write config");

        assert!(matches!(store.load(), Err(StorageError::UnsupportedVersion(9))));
    }
}
