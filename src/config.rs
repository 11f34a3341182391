use std::path::{Path, PathBuf};
use std::time::Duration;

use dirs::home_dir;
use log::error;
use thiserror::Error;

use crate::client::DEFAULT_CLIENT_NAME;
use crate::fetch::{DEFAULT_DEBOUNCE, DEFAULT_TIMEOUT};
use crate::query::{GeocoderVersion, QueryBuilder};

pub const ENV_V2_OVERRIDE: &str = "GEOCODER_V2_URL";
pub const ENV_CLIENT_NAME: &str = "GEOPROBE_CLIENT_NAME";
pub const ENV_CONFIG: &str = "GEOPROBE_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("Failed to parse config file {path}: {source}")]
  Parse {
    path: PathBuf,
    source: serde_json::Error,
  },
}

/// Settings read once at start. Unset values fall back to the defaults
/// through the accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
  #[serde(skip)]
  pub config_path: Option<PathBuf>,
  /// Replaces the environment based base URL of the v2 API.
  pub geocoder_v2_override: Option<String>,
  pub client_name: Option<String>,
  pub version: Option<GeocoderVersion>,
  pub debounce_ms: Option<u64>,
  pub timeout_secs: Option<u64>,
}

impl Config {
  /// Environment variables first, then the config file.
  #[must_use]
  pub fn new() -> Self {
    let from_env = Self::from_env();
    match Self::from_file() {
      Some(from_file) => from_env.merge(&from_file),
      None => from_env,
    }
  }

  fn config_dir() -> Option<PathBuf> {
    std::env::var(ENV_CONFIG)
      .ok()
      .map(PathBuf::from)
      .or_else(|| home_dir().map(|p| p.join(".config").join("geoprobe")))
  }

  fn from_env() -> Self {
    Self {
      config_path: Self::config_dir(),
      geocoder_v2_override: std::env::var(ENV_V2_OVERRIDE)
        .ok()
        .filter(|v| !v.trim().is_empty()),
      client_name: std::env::var(ENV_CLIENT_NAME).ok(),
      ..Self::default()
    }
  }

  fn from_file() -> Option<Self> {
    let config_path = Self::config_dir()?.join("config.json");
    if !config_path.exists() {
      return None;
    }
    Self::load_file(&config_path)
      .inspect_err(|e| error!("{e}"))
      .ok()
  }

  pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Fills every value unset in `self` from `other`.
  #[must_use]
  pub fn merge(mut self, other: &Self) -> Self {
    self.config_path = self.config_path.or(other.config_path.clone());
    self.geocoder_v2_override = self
      .geocoder_v2_override
      .or(other.geocoder_v2_override.clone());
    self.client_name = self.client_name.or(other.client_name.clone());
    self.version = self.version.or(other.version);
    self.debounce_ms = self.debounce_ms.or(other.debounce_ms);
    self.timeout_secs = self.timeout_secs.or(other.timeout_secs);
    self
  }

  #[must_use]
  pub fn client_name(&self) -> &str {
    self.client_name.as_deref().unwrap_or(DEFAULT_CLIENT_NAME)
  }

  #[must_use]
  pub fn version(&self) -> GeocoderVersion {
    self.version.unwrap_or_default()
  }

  #[must_use]
  pub fn debounce(&self) -> Duration {
    self.debounce_ms.map_or(DEFAULT_DEBOUNCE, Duration::from_millis)
  }

  #[must_use]
  pub fn timeout(&self) -> Duration {
    self.timeout_secs.map_or(DEFAULT_TIMEOUT, Duration::from_secs)
  }

  #[must_use]
  pub fn query_builder(&self) -> QueryBuilder {
    QueryBuilder::new(self.version(), self.geocoder_v2_override.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_apply_to_unset_values() {
    let config = Config::default();
    assert_eq!(config.client_name(), "entur-ror-bau");
    assert_eq!(config.version(), GeocoderVersion::V2);
    assert_eq!(config.debounce(), Duration::from_millis(200));
    assert_eq!(config.timeout(), Duration::from_secs(10));
    assert!(!config.query_builder().override_active());
  }

  #[test]
  fn merge_keeps_own_values() {
    let own = Config {
      geocoder_v2_override: Some("http://localhost:9000".to_string()),
      ..Config::default()
    };
    let other = Config {
      geocoder_v2_override: Some("http://elsewhere".to_string()),
      client_name: Some("tester".to_string()),
      debounce_ms: Some(50),
      ..Config::default()
    };
    let merged = own.merge(&other);
    assert_eq!(merged.geocoder_v2_override.as_deref(), Some("http://localhost:9000"));
    assert_eq!(merged.client_name(), "tester");
    assert_eq!(merged.debounce(), Duration::from_millis(50));
    assert!(merged.query_builder().override_active());
  }

  #[test]
  fn reads_partial_file() {
    let dir = std::env::temp_dir().join(format!("geoprobe-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");
    std::fs::write(&path, r#"{ "version": "v1", "timeout_secs": 3 }"#).unwrap();

    let config = Config::load_file(&path).unwrap();
    assert_eq!(config.version(), GeocoderVersion::V1);
    assert_eq!(config.timeout(), Duration::from_secs(3));
    assert_eq!(config.geocoder_v2_override, None);

    std::fs::write(&path, "not json").unwrap();
    assert!(matches!(Config::load_file(&path), Err(ConfigError::Parse { .. })));
    let _ = std::fs::remove_dir_all(&dir);
  }

  #[test]
  fn missing_file_is_a_read_error() {
    let err = Config::load_file(Path::new("/nonexistent/geoprobe/config.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
  }
}
