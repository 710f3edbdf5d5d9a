//! Settings storage
//!
//! Manages persistence of client preferences.

use crate::storage::{get_data_dir, StorageError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Server address used when nothing else is configured
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3020";
/// Environment variable overriding the configured server address
pub const SERVER_URL_ENV: &str = "PICTUREPERFECT_SERVER_URL";

/// Client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Base URL of the enhancement server
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// UI theme: "dark" or "light"
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Where enhanced images and archives are saved
    #[serde(default = "default_download_directory")]
    pub download_directory: PathBuf,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_theme() -> String {
    "dark".to_string()
}

fn default_download_directory() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .or_else(|| get_data_dir().ok().map(|d| d.join("downloads")))
        .unwrap_or_else(|| PathBuf::from("./downloads"))
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            theme: default_theme(),
            download_directory: default_download_directory(),
        }
    }
}

impl ClientSettings {
    /// Normalize settings values
    pub fn validate(&mut self) {
        let url = self.server_url.trim().trim_end_matches('/');
        if url.starts_with("http://") || url.starts_with("https://") {
            self.server_url = url.to_string();
        } else {
            if !url.is_empty() {
                tracing::warn!("Unsupported server URL {:?}, using default", url);
            }
            self.server_url = default_server_url();
        }

        if self.theme != "dark" && self.theme != "light" {
            self.theme = default_theme();
        }

        if self.download_directory.as_os_str().is_empty() {
            self.download_directory = default_download_directory();
        }
    }

    /// Apply the environment override for the server address
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            tracing::info!("Using server URL from {}", SERVER_URL_ENV);
            self.server_url = url;
            self.validate();
        }
    }

    pub fn is_dark(&self) -> bool {
        self.theme == "dark"
    }

    /// Flip between the dark and light themes
    pub fn toggle_theme(&mut self) {
        self.theme = if self.is_dark() { "light" } else { "dark" }.to_string();
    }
}

/// Get the settings file path
fn get_settings_path() -> Result<PathBuf, StorageError> {
    Ok(get_data_dir()?.join("settings.json"))
}

/// Load settings from disk
///
/// Returns default settings if the file doesn't exist or is corrupted
pub fn load_settings() -> ClientSettings {
    let mut settings = match get_settings_path().and_then(|path| load_settings_from(&path)) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to load settings, using defaults: {}", e);
            ClientSettings::default()
        }
    };
    settings.apply_env();
    settings
}

/// Load and validate settings from a specific file
pub fn load_settings_from(path: &Path) -> Result<ClientSettings, StorageError> {
    if !path.exists() {
        tracing::info!("Settings file not found, using defaults");
        return Ok(ClientSettings::default());
    }

    let json = fs::read_to_string(path)?;
    let mut settings: ClientSettings = serde_json::from_str(&json)?;
    settings.validate();

    tracing::debug!("Loaded settings from {:?}", path);
    Ok(settings)
}

/// Save settings to disk
pub fn save_settings(settings: &ClientSettings) -> Result<(), StorageError> {
    save_settings_to(&get_settings_path()?, settings)
}

pub fn save_settings_to(path: &Path, settings: &ClientSettings) -> Result<(), StorageError> {
    // Ensure the parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;

    tracing::debug!("Saved settings to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ClientSettings::default();
        assert_eq!(settings.server_url, "http://127.0.0.1:3020");
        assert_eq!(settings.theme, "dark");
        assert!(!settings.download_directory.as_os_str().is_empty());
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = ClientSettings::default();

        // Trailing slashes are stripped
        settings.server_url = "https://enhance.local:8443/".to_string();
        settings.validate();
        assert_eq!(settings.server_url, "https://enhance.local:8443");

        // Unknown scheme falls back to the default
        settings.server_url = "ftp://enhance.local".to_string();
        settings.validate();
        assert_eq!(settings.server_url, DEFAULT_SERVER_URL);

        settings.server_url = "   ".to_string();
        settings.validate();
        assert_eq!(settings.server_url, DEFAULT_SERVER_URL);

        // Test invalid theme
        settings.theme = "sepia".to_string();
        settings.validate();
        assert_eq!(settings.theme, "dark");
    }

    #[test]
    fn test_toggle_theme() {
        let mut settings = ClientSettings::default();
        settings.toggle_theme();
        assert_eq!(settings.theme, "light");
        assert!(!settings.is_dark());
        settings.toggle_theme();
        assert!(settings.is_dark());
    }

    #[test]
    fn test_settings_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = ClientSettings::default();
        settings.theme = "light".to_string();
        settings.download_directory = dir.path().join("out");
        save_settings_to(&path, &settings).unwrap();

        let loaded = load_settings_from(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"theme": "light"}"#).unwrap();

        let loaded = load_settings_from(&path).unwrap();
        assert_eq!(loaded.theme, "light");
        assert_eq!(loaded.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_settings_from(&path), Err(StorageError::Json(_))));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_settings_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded.theme, "dark");
    }
}
