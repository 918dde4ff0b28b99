// ANI Desktop - settings, n8n workflow import and UI bridge backend
// License: Apache-2.0

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to resolve working directory: {0}")]
    WorkingDir(#[from] std::io::Error),
    #[error("working directory {0:?} has no parent to use as project root")]
    NoProjectRoot(PathBuf),
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

pub const DEFAULT_N8N_PORT: &str = "5678";
pub const DEFAULT_OLLAMA_PORT: &str = "11434";

const CONFIG_DIR: &str = ".config";
const SETTINGS_FILE: &str = "settings.json";
const WORKFLOWS_DIR: &str = "workflows";

/// Filesystem layout the backend works against.
///
/// The desktop shell runs from `<project>/ani-desktop`, so the project root
/// defaults to the parent of the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub project_root: PathBuf,
    pub settings_path: PathBuf,
    pub workflows_dir: PathBuf,
}

impl AppConfig {
    /// Layout rooted at `project_root`: `.config/settings.json` and `workflows/`.
    pub fn with_root(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        Self {
            settings_path: project_root.join(CONFIG_DIR).join(SETTINGS_FILE),
            workflows_dir: project_root.join(WORKFLOWS_DIR),
            project_root,
        }
    }

    /// Resolve the layout from the current working directory, then apply
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir()?;
        let mut config = Self::from_working_dir(&cwd)?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_working_dir(cwd: &Path) -> Result<Self, ConfigError> {
        let root = cwd
            .parent()
            .ok_or_else(|| ConfigError::NoProjectRoot(cwd.to_path_buf()))?;
        Ok(Self::with_root(root))
    }

    /// Apply environment variable overrides (prefix: ANI_)
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // A new root moves both derived paths; explicit paths still win below.
        if let Some(v) = lookup("ANI_PROJECT_ROOT").filter(|v| !v.is_empty()) {
            *self = Self::with_root(v);
        }
        if let Some(v) = lookup("ANI_SETTINGS_PATH").filter(|v| !v.is_empty()) {
            self.settings_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("ANI_WORKFLOWS_DIR").filter(|v| !v.is_empty()) {
            self.workflows_dir = PathBuf::from(v);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_layout_from_working_dir() {
        let cfg = AppConfig::from_working_dir(Path::new("/srv/ani/ani-desktop")).unwrap();
        assert_eq!(cfg.project_root, PathBuf::from("/srv/ani"));
        assert_eq!(
            cfg.settings_path,
            PathBuf::from("/srv/ani/.config/settings.json")
        );
        assert_eq!(cfg.workflows_dir, PathBuf::from("/srv/ani/workflows"));
    }

    #[test]
    fn test_root_without_parent_is_rejected() {
        let err = AppConfig::from_working_dir(Path::new("/")).unwrap_err();
        assert!(matches!(err, ConfigError::NoProjectRoot(_)));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("ANI_PROJECT_ROOT", "/opt/project"),
            ("ANI_WORKFLOWS_DIR", "/data/flows"),
        ]
        .into_iter()
        .collect();

        let mut cfg = AppConfig::with_root("/somewhere");
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.project_root, PathBuf::from("/opt/project"));
        assert_eq!(
            cfg.settings_path,
            PathBuf::from("/opt/project/.config/settings.json")
        );
        assert_eq!(cfg.workflows_dir, PathBuf::from("/data/flows"));
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let mut cfg = AppConfig::with_root("/somewhere");
        cfg.apply_overrides(|k| (k == "ANI_SETTINGS_PATH").then(String::new));
        assert_eq!(cfg, AppConfig::with_root("/somewhere"));
    }
}
