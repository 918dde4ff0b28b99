// ANI Desktop - Settings store (n8n base URL + API key as a small JSON file)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5678";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to write settings to {path:?}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Connection settings for the workflow server, as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "n8nBaseUrl")]
    pub base_url: String,
    #[serde(rename = "n8nApiKey")]
    pub api_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
        }
    }
}

/// Partial settings as sent by the UI. Absent and empty fields are treated
/// the same way; unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsPatch {
    #[serde(rename = "n8nBaseUrl", default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(rename = "n8nApiKey", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// The file on disk. Unlike [`SettingsPatch`], extra keys are tolerated.
#[derive(Debug, Default, Deserialize)]
struct StoredSettings {
    #[serde(rename = "n8nBaseUrl", default)]
    base_url: Option<String>,
    #[serde(rename = "n8nApiKey", default)]
    api_key: Option<String>,
}

impl From<StoredSettings> for SettingsPatch {
    fn from(stored: StoredSettings) -> Self {
        Self {
            base_url: stored.base_url,
            api_key: stored.api_key,
        }
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

impl Settings {
    /// Normalize a patch the way `save` persists it: defaults for missing
    /// fields, then both fields trimmed.
    pub fn from_patch(patch: SettingsPatch) -> Self {
        let base_url = non_empty(patch.base_url).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_key = non_empty(patch.api_key).unwrap_or_default();
        Self {
            base_url: base_url.trim().to_string(),
            api_key: api_key.trim().to_string(),
        }
    }

    /// Fields set in `overrides` replace the stored ones.
    pub fn overridden_by(self, overrides: SettingsPatch) -> Self {
        Self {
            base_url: non_empty(overrides.base_url).unwrap_or(self.base_url),
            api_key: non_empty(overrides.api_key).unwrap_or(self.api_key),
        }
    }
}

/// Where a loaded value came from. Anything but `File` means defaults were used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "reason")]
pub enum SettingsSource {
    File,
    Missing,
    Invalid(String),
}

impl SettingsSource {
    pub fn is_default(&self) -> bool {
        !matches!(self, SettingsSource::File)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub source: SettingsSource,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings. Never fails: read or parse problems fall back to
    /// defaults and are reported through [`SettingsSource`].
    pub async fn load(&self) -> LoadedSettings {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = ?self.path, "Settings file not found, using defaults");
                return LoadedSettings {
                    settings: Settings::default(),
                    source: SettingsSource::Missing,
                };
            }
            Err(e) => return self.fallback(format!("read error: {}", e)),
        };

        match serde_json::from_str::<StoredSettings>(&raw) {
            Ok(stored) => LoadedSettings {
                settings: Settings::default().overridden_by(stored.into()),
                source: SettingsSource::File,
            },
            Err(e) => self.fallback(format!("parse error: {}", e)),
        }
    }

    fn fallback(&self, reason: String) -> LoadedSettings {
        tracing::warn!(path = ?self.path, reason = %reason, "Failed to load settings, using defaults");
        LoadedSettings {
            settings: Settings::default(),
            source: SettingsSource::Invalid(reason),
        }
    }

    /// Overwrite the settings file with the normalized patch and return what
    /// was written.
    pub async fn save(&self, patch: SettingsPatch) -> Result<Settings, SettingsError> {
        let settings = Settings::from_patch(patch);

        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| SettingsError::Filesystem {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }

        let body = serde_json::to_string_pretty(&settings)?;
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|source| SettingsError::Filesystem {
                path: self.path.clone(),
                source,
            })?;

        tracing::info!(path = ?self.path, base_url = %settings.base_url, "Settings saved");
        Ok(settings)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
