//! Configuration management
//!
//! Reads and writes settings.json in the data directory:
//! ```json
//! {
//!   "app": { "defaultViewType": "total", "defaultChartType": "bar", ... },
//!   "storage": { "backend": "remote", "remote": { "url": "...", "folder": "TransifexReports" } }
//! }
//! ```
//! Fields this crate does not manage are preserved on save. The remote
//! password is never stored; it comes from `TALLY_REMOTE_PASSWORD`.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::DEFAULT_FOLDER;
use crate::domain::result::Error;
use crate::services::filter::ViewKind;

const SETTINGS_FILE: &str = "settings.json";
pub const PASSWORD_ENV: &str = "TALLY_REMOTE_PASSWORD";
pub const BACKEND_ENV: &str = "TALLY_STORAGE_BACKEND";

const DEFAULT_EDIT_COLOR: &str = "#10b981";
const DEFAULT_REVIEW_COLOR: &str = "#ea580c";
const DEFAULT_LANGUAGE: &str = "en";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    storage: StorageSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_view_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_chart_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    edit_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    review_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    backend: Option<String>,
    #[serde(default)]
    remote: RemoteSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
}

/// How the dashboard chart is drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Stacked,
    Line,
    Pie,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Stacked => "stacked",
            Self::Line => "line",
            Self::Pie => "pie",
        }
    }
}

impl FromStr for ChartType {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Error> {
        match s.trim().to_lowercase().as_str() {
            "bar" => Ok(Self::Bar),
            "stacked" => Ok(Self::Stacked),
            "line" => Ok(Self::Line),
            "pie" => Ok(Self::Pie),
            other => Err(Error::Config(format!("unknown chart type '{other}'"))),
        }
    }
}

/// Where the dataset is persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Local,
    Remote,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Error> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            other => Err(Error::Config(format!(
                "unknown storage backend '{other}': expected local or remote"
            ))),
        }
    }
}

/// Remote folder store settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub url: Option<String>,
    pub folder: String,
    pub username: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: None,
            folder: DEFAULT_FOLDER.to_string(),
            username: None,
        }
    }
}

impl RemoteConfig {
    /// Password from the environment, never from settings.json
    pub fn password(&self) -> Option<String> {
        std::env::var(PASSWORD_ENV).ok().filter(|p| !p.is_empty())
    }
}

/// Tally configuration (typed view of settings.json)
#[derive(Debug, Clone)]
pub struct Config {
    pub default_view_type: ViewKind,
    pub default_chart_type: ChartType,
    pub edit_color: String,
    pub review_color: String,
    pub language: String,
    pub backend: Backend,
    pub remote: RemoteConfig,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_raw(SettingsFile::default())
    }
}

impl Config {
    fn from_raw(raw: SettingsFile) -> Self {
        let app = &raw.app;
        let remote = &raw.storage.remote;

        Self {
            default_view_type: app
                .default_view_type
                .as_deref()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            default_chart_type: app
                .default_chart_type
                .as_deref()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            edit_color: app
                .edit_color
                .clone()
                .unwrap_or_else(|| DEFAULT_EDIT_COLOR.to_string()),
            review_color: app
                .review_color
                .clone()
                .unwrap_or_else(|| DEFAULT_REVIEW_COLOR.to_string()),
            language: app
                .language
                .clone()
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            backend: raw
                .storage
                .backend
                .as_deref()
                .and_then(|b| b.parse().ok())
                .unwrap_or_default(),
            remote: RemoteConfig {
                url: remote.url.clone(),
                folder: remote
                    .folder
                    .clone()
                    .filter(|f| !f.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
                username: remote.username.clone(),
            },
            _raw_settings: raw,
        }
    }

    fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
        let settings_path = data_dir.join(SETTINGS_FILE);
        if !settings_path.exists() {
            return Ok(SettingsFile::default());
        }
        let content = std::fs::read_to_string(&settings_path)
            .with_context(|| format!("Failed to read {}", settings_path.display()))?;
        Ok(serde_json::from_str(&content).unwrap_or_default())
    }

    /// Load config from the data directory
    ///
    /// The storage backend can be overridden with `TALLY_STORAGE_BACKEND`.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let mut config = Self::from_raw(Self::read_settings(data_dir)?);

        if let Ok(backend) = std::env::var(BACKEND_ENV) {
            if !backend.trim().is_empty() {
                config.backend = backend.parse()?;
            }
        }

        Ok(config)
    }

    /// Save config to the data directory
    /// Preserves other settings that the CLI doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(data_dir)?;
        let settings_path = data_dir.join(SETTINGS_FILE);

        // Load existing settings to preserve fields we don't manage
        let mut settings = Self::read_settings(data_dir)?;

        // Update only the fields we manage
        settings.app.default_view_type = Some(self.default_view_type.as_str().to_string());
        settings.app.default_chart_type = Some(self.default_chart_type.as_str().to_string());
        settings.app.edit_color = Some(self.edit_color.clone());
        settings.app.review_color = Some(self.review_color.clone());
        settings.app.language = Some(self.language.clone());
        settings.storage.backend = Some(self.backend.as_str().to_string());
        settings.storage.remote = RemoteSettings {
            url: self.remote.url.clone(),
            folder: Some(self.remote.folder.clone()),
            username: self.remote.username.clone(),
        };

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Set a managed setting from its settings.json name
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaultViewType" => self.default_view_type = value.parse()?,
            "defaultChartType" => self.default_chart_type = value.parse()?,
            "editColor" => self.edit_color = parse_color(value)?,
            "reviewColor" => self.review_color = parse_color(value)?,
            "language" => self.language = value.trim().to_string(),
            "backend" => self.backend = value.parse()?,
            "remote.url" => self.remote.url = Some(value.trim().to_string()).filter(|v| !v.is_empty()),
            "remote.folder" => self.remote.folder = value.trim().to_string(),
            "remote.username" => {
                self.remote.username = Some(value.trim().to_string()).filter(|v| !v.is_empty())
            }
            other => return Err(Error::Config(format!("unknown setting '{other}'")).into()),
        }
        Ok(())
    }
}

/// `#rrggbb` hex color
fn parse_color(value: &str) -> std::result::Result<String, Error> {
    let value = value.trim();
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(value.to_lowercase())
    } else {
        Err(Error::Config(format!("'{value}' is not a #rrggbb color")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.default_view_type, ViewKind::Total);
        assert_eq!(config.default_chart_type, ChartType::Bar);
        assert_eq!(config.edit_color, "#10b981");
        assert_eq!(config.review_color, "#ea580c");
        assert_eq!(config.remote.folder, "TransifexReports");
        assert_eq!(config.backend, Backend::Local);
    }

    #[test]
    fn test_save_preserves_unmanaged_fields() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"app":{"theme":"dark","defaultViewType":"aggregated"},"onboarding":{"done":true}}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        assert_eq!(config.default_view_type, ViewKind::Aggregated);

        config.set("defaultChartType", "pie").unwrap();
        config.set("remote.url", "https://dav.example.com/").unwrap();
        config.save(dir.path()).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("settings.json")).unwrap()).unwrap();
        assert_eq!(saved["app"]["theme"], "dark");
        assert_eq!(saved["app"]["defaultChartType"], "pie");
        assert_eq!(saved["onboarding"]["done"], true);
        assert_eq!(saved["storage"]["remote"]["url"], "https://dav.example.com/");
        assert!(saved["storage"]["remote"].get("password").is_none());

        let reloaded = Config::load(dir.path()).unwrap();
        assert_eq!(reloaded.default_chart_type, ChartType::Pie);
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"app":{"defaultViewType":"sideways","defaultChartType":7}}"#,
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.default_view_type, ViewKind::Total);
        assert_eq!(config.default_chart_type, ChartType::Bar);
    }

    #[test]
    fn test_set_validates() {
        let mut config = Config::default();
        assert!(config.set("editColor", "green").is_err());
        config.set("editColor", "#ABCDEF").unwrap();
        assert_eq!(config.edit_color, "#abcdef");
        assert!(config.set("backend", "cloud").is_err());
        assert!(config.set("password", "secret").is_err());
    }
}
