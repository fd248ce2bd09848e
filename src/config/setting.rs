use super::utils::get_setting_path;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;
use std::time::Duration;

// Global settings instance
pub static SETTING: Lazy<RwLock<Setting>> = Lazy::new(|| RwLock::new(Setting::default()));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSetting {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSetting {
    /// Shared secret for token signing/verification.
    pub token_secret: String,
    /// Token lifetime in minutes.
    pub token_ttl_minutes: i64,
}

// Live-sync settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSetting {
    // Heartbeat probe interval (seconds)
    pub heartbeat_interval_secs: u64,
    // How long clients should wait for a pong before reconnecting
    pub ping_timeout_secs: u64,
    // Trailing window within which identical content hashes collapse
    #[serde(default = "default_dedup_window_secs")]
    pub dedup_window_secs: u64,
    // Maximum accepted content size (bytes)
    #[serde(default = "default_max_content_size")]
    pub max_content_size: i64,
}

fn default_dedup_window_secs() -> u64 {
    60
}

fn default_max_content_size() -> i64 {
    10 * 1024 * 1024
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSetting {
    // SQLite database path/URL
    pub database_url: String,
    // Per-user history cap; oldest excess items are evicted
    #[serde(default = "default_max_items_per_user")]
    pub max_items_per_user: u32,
}

fn default_max_items_per_user() -> u32 {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub server: ServerSetting,
    pub auth: AuthSetting,
    pub sync: SyncSetting,
    pub storage: StorageSetting,
}

impl Default for Setting {
    fn default() -> Self {
        Self {
            server: ServerSetting {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            auth: AuthSetting {
                token_secret: "change-this-secret".to_string(),
                token_ttl_minutes: 7 * 24 * 60,
            },
            sync: SyncSetting {
                heartbeat_interval_secs: 30,
                ping_timeout_secs: 10,
                dedup_window_secs: 60,
                max_content_size: 10 * 1024 * 1024,
            },
            storage: StorageSetting {
                database_url: "clipsync.db".to_string(),
                max_items_per_user: 20,
            },
        }
    }
}

impl Setting {
    /// Clone of the current global settings.
    pub fn get_instance() -> Self {
        SETTING.read().unwrap().clone()
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.sync.heartbeat_interval_secs)
    }

    pub fn dedup_window(&self) -> Duration {
        Duration::from_secs(self.sync.dedup_window_secs)
    }

    /// Load settings.
    ///
    /// Reads from the given path, or the default config location when no
    /// path is supplied. A missing file produces (and saves) defaults.
    pub fn load(setting_path: Option<PathBuf>) -> Result<Self> {
        let _setting_path = if let Some(path) = setting_path {
            path
        } else {
            get_setting_path()?
        };

        if let Ok(setting_str) = fs::read_to_string(&_setting_path) {
            let setting: Setting = serde_json::from_str(&setting_str)
                .with_context(|| "failed to parse settings file")?;

            // Update the global settings
            SETTING.write().unwrap().clone_from(&setting);

            Ok(setting)
        } else {
            // Settings file missing: create defaults and persist them
            let default_setting = Setting::default();
            default_setting.save(Some(_setting_path))?;
            Ok(default_setting)
        }
    }

    /// Save settings.
    pub fn save(&self, setting_path: Option<PathBuf>) -> Result<()> {
        let _setting_path = if let Some(path) = setting_path {
            path
        } else {
            get_setting_path()?
        };

        if let Some(parent) = _setting_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let setting_str = serde_json::to_string_pretty(self)?;

        fs::write(&_setting_path, setting_str)
            .with_context(|| format!("failed to write settings file: {:?}", _setting_path))?;
        // Update the global settings
        SETTING.write().unwrap().clone_from(self);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_setting_default() {
        let setting = Setting::default();
        assert_eq!(setting.server.port, 8000);
        assert_eq!(setting.sync.heartbeat_interval_secs, 30);
        assert_eq!(setting.sync.dedup_window_secs, 60);
        assert_eq!(setting.sync.max_content_size, 10 * 1024 * 1024);
        assert_eq!(setting.storage.max_items_per_user, 20);
        assert_eq!(setting.auth.token_ttl_minutes, 10080);
    }

    #[test]
    fn test_setting_save_load() -> Result<()> {
        let temp_dir = tempdir()?;
        let setting_path = temp_dir.path().join("test_setting.json");

        let mut setting = Setting::default();
        setting.server.port = 9200;
        setting.storage.max_items_per_user = 5;
        setting.save(Some(setting_path.clone()))?;

        let loaded_setting = Setting::load(Some(setting_path))?;

        assert_eq!(loaded_setting.server.port, 9200);
        assert_eq!(loaded_setting.storage.max_items_per_user, 5);
        assert_eq!(
            loaded_setting.sync.dedup_window_secs,
            setting.sync.dedup_window_secs
        );

        Ok(())
    }

    #[test]
    fn test_setting_load_missing_file_writes_defaults() -> Result<()> {
        let temp_dir = tempdir()?;
        let setting_path = temp_dir.path().join("fresh.json");

        let loaded = Setting::load(Some(setting_path.clone()))?;
        assert_eq!(loaded.server.port, 8000);
        assert!(setting_path.exists());

        Ok(())
    }
}
