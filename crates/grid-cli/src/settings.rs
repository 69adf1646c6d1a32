//! User settings stored as TOML in the platform config directory:
//! - macOS: ~/Library/Application Support/dev.tree-grid.Tree-Grid/
//! - Windows: %APPDATA%/tree-grid/Tree Grid/config/
//! - Linux: ~/.config/treegrid/

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use grid_export::ExportScope;
use grid_model::MIN_COLUMN_WIDTH;
use grid_persistence::AutoSaveConfig;
use serde::{Deserialize, Serialize};

const APP_QUALIFIER: &str = "dev";
const APP_ORG: &str = "tree-grid";
const APP_NAME: &str = "Tree Grid";
const CONFIG_FILENAME: &str = "settings.toml";
const STATE_DIRNAME: &str = "tables";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub storage: StorageSettings,
    pub export: ExportSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Page shown when no route is given.
    pub default_route: String,
    /// Narrowest width a column can be resized to, in pixels.
    pub min_column_width: u32,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            default_route: "/enhanced-table/".to_string(),
            min_column_width: MIN_COLUMN_WIDTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory for saved table layouts; platform data dir when unset.
    pub state_dir: Option<PathBuf>,
    pub autosave: AutoSaveConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub scope: ExportScope,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
}

/// Default settings file, `None` when the platform has no config directory.
pub fn settings_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

impl Settings {
    /// Where table layouts live: the configured directory, the platform data
    /// directory, or `.tree-grid/` under the working directory.
    pub fn state_dir(&self) -> PathBuf {
        if let Some(dir) = &self.storage.state_dir {
            return dir.clone();
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join(STATE_DIRNAME))
            .unwrap_or_else(|| PathBuf::from(".tree-grid").join(STATE_DIRNAME))
    }
}

/// Load settings from `path`, or from the default location.
///
/// Returns default settings if:
/// - No path is given and the platform directory cannot be determined
/// - The settings file doesn't exist
/// - The settings file cannot be read or parsed
pub fn load_settings(path: Option<&Path>) -> Settings {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match settings_path() {
            Some(path) => path,
            None => {
                tracing::warn!("Could not determine settings path, using defaults");
                return Settings::default();
            }
        },
    };

    match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                tracing::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                tracing::warn!("Failed to parse settings file: {e}, using defaults");
                Settings::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No settings file at {}, using defaults", path.display());
            Settings::default()
        }
        Err(e) => {
            tracing::warn!("Failed to read settings file: {e}, using defaults");
            Settings::default()
        }
    }
}

/// Write settings to `path`, creating the parent directory if needed.
pub fn save_settings(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config directory {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(settings).context("serialize settings")?;
    fs::write(path, content).with_context(|| format!("write settings {}", path.display()))?;
    tracing::info!("Saved settings to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let settings = Settings::default();
        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let parsed: Settings = toml::from_str(
            r#"
            [general]
            min_column_width = 64

            [export]
            scope = "visible-rows"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.general.min_column_width, 64);
        assert_eq!(parsed.general.default_route, "/enhanced-table/");
        assert_eq!(parsed.export.scope, ExportScope::VisibleRows);
        assert!(parsed.storage.autosave.enabled);
    }

    #[test]
    fn unreadable_settings_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "general = [").unwrap();
        assert_eq!(load_settings(Some(&path)), Settings::default());
        assert_eq!(
            load_settings(Some(&dir.path().join("missing.toml"))),
            Settings::default()
        );
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let mut settings = Settings::default();
        settings.storage.state_dir = Some(dir.path().join("state"));
        save_settings(&settings, &path).unwrap();
        let loaded = load_settings(Some(&path));
        assert_eq!(loaded.state_dir(), dir.path().join("state"));
    }
}
