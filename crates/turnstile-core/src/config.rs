//! Terminal configuration persistence
//!
//! Backend origins, the kiosk role list and local paths. Stored as JSON
//! under the user's config directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::http::validate_base;
use crate::error::ConfigError;
use crate::kiosk::default_roles;
use crate::stats::STATS_INTERVAL;
use crate::storage::FileStore;

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

/// Configuration directory under ~/.config
const CONFIG_DIR_NAME: &str = "turnstile";

/// Settings shared by the kiosk and admin terminals
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnstileConfig {
    /// Origin of the check-in backend (login, status checks, stats)
    #[serde(default = "default_kiosk_base_url")]
    pub kiosk_base_url: String,

    /// Origin of the report backend
    #[serde(default = "default_report_base_url")]
    pub report_base_url: String,

    /// Roles offered on the kiosk, in display order
    #[serde(default = "default_roles")]
    pub roles: Vec<String>,

    /// Where downloaded reports are written
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Live stats refresh period
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,

    /// Persisted session record
    #[serde(default = "FileStore::default_path")]
    pub session_file: PathBuf,
}

fn default_kiosk_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_report_base_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("downloads"))
}

fn default_stats_interval_secs() -> u64 {
    STATS_INTERVAL.as_secs()
}

impl Default for TurnstileConfig {
    fn default() -> Self {
        Self {
            kiosk_base_url: default_kiosk_base_url(),
            report_base_url: default_report_base_url(),
            roles: default_roles(),
            download_dir: default_download_dir(),
            stats_interval_secs: default_stats_interval_secs(),
            session_file: FileStore::default_path(),
        }
    }
}

impl TurnstileConfig {
    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg_config).join(CONFIG_DIR_NAME));
        }

        dirs::config_dir().map(|p| p.join(CONFIG_DIR_NAME))
    }

    /// Get the full config file path
    pub fn config_file_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location
    ///
    /// Returns default configuration if the file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        match Self::config_file_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {:?}: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_file_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save configuration to an explicit file
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| ConfigError::Io(e.to_string()))?;
            }
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, contents).map_err(|e| ConfigError::Io(e.to_string()))?;

        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject settings the controllers cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_base(&self.kiosk_base_url)?;
        validate_base(&self.report_base_url)?;

        if self.roles.iter().all(|r| r.trim().is_empty()) {
            return Err(ConfigError::Invalid("At least one role is required".into()));
        }
        if self.stats_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "stats_interval_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = TurnstileConfig::default();
        assert_eq!(config.kiosk_base_url, "http://localhost:5000");
        assert_eq!(config.report_base_url, "http://localhost:5001");
        assert_eq!(config.roles, vec!["Student".to_string(), "Faculty".to_string()]);
        assert_eq!(config.stats_interval(), Duration::from_secs(15));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: TurnstileConfig =
            serde_json::from_str(r#"{"kiosk_base_url": "https://kiosk.example.org"}"#).unwrap();

        assert_eq!(config.kiosk_base_url, "https://kiosk.example.org");
        assert_eq!(config.report_base_url, "http://localhost:5001");
        assert_eq!(config.stats_interval_secs, 15);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = TurnstileConfig {
            roles: vec!["Student".into(), "Faculty".into(), "Visitor".into()],
            stats_interval_secs: 30,
            ..TurnstileConfig::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(TurnstileConfig::load_from(&path), config);
    }

    #[test]
    fn test_missing_or_corrupt_file_yields_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        assert_eq!(TurnstileConfig::load_from(&path), TurnstileConfig::default());

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(TurnstileConfig::load_from(&path), TurnstileConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let bad_url = TurnstileConfig {
            report_base_url: "ftp://reports".into(),
            ..TurnstileConfig::default()
        };
        assert!(matches!(bad_url.validate(), Err(ConfigError::Invalid(_))));

        let no_roles = TurnstileConfig {
            roles: vec![],
            ..TurnstileConfig::default()
        };
        assert!(matches!(no_roles.validate(), Err(ConfigError::Invalid(_))));

        let zero_interval = TurnstileConfig {
            stats_interval_secs: 0,
            ..TurnstileConfig::default()
        };
        assert!(matches!(zero_interval.validate(), Err(ConfigError::Invalid(_))));
    }
}
