use markright_engine::host::HostOptions;
use markright_engine::view::ViewOptions;
use markright_engine::FocusMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root that wiki-links resolve against and new pages are created in.
    pub workspace_path: PathBuf,
    #[serde(default)]
    pub editor: EditorSettings,
}

/// The `[editor]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub focus_mode: FocusMode,
    pub update_debounce_ms: u64,
    pub overlays_enabled: bool,
    pub default_line_height_px: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            focus_mode: FocusMode::Off,
            update_debounce_ms: 300,
            overlays_enabled: true,
            default_line_height_px: 20.0,
        }
    }
}

impl EditorSettings {
    pub fn update_debounce(&self) -> Duration {
        Duration::from_millis(self.update_debounce_ms)
    }

    pub fn host_options(&self) -> HostOptions {
        HostOptions {
            debounce: self.update_debounce(),
            focus_mode: self.focus_mode,
        }
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            overlays_enabled: self.overlays_enabled,
            default_line_height_px: self.default_line_height_px,
            focus_mode: self.focus_mode,
        }
    }
}

impl Config {
    pub fn new(workspace_path: impl Into<PathBuf>) -> Self {
        Self {
            workspace_path: workspace_path.into(),
            editor: EditorSettings::default(),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the workspace path
        config.workspace_path =
            Self::expand_path(&config.workspace_path).unwrap_or(config.workspace_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markright");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/markright/config.toml"));
    }

    #[test]
    fn test_missing_editor_table_uses_defaults() {
        let config: Config = toml::from_str(r#"workspace_path = "/tmp/notes""#).unwrap();
        assert_eq!(config.editor, EditorSettings::default());
        assert_eq!(config.editor.update_debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_partial_editor_table() {
        let config: Config = toml::from_str(
            r#"
workspace_path = "/tmp/notes"

[editor]
focus_mode = "section"
update_debounce_ms = 150
"#,
        )
        .unwrap();

        assert_eq!(config.editor.focus_mode, FocusMode::Section);
        assert_eq!(config.editor.update_debounce_ms, 150);
        assert!(config.editor.overlays_enabled);
        assert_eq!(config.editor.default_line_height_px, 20.0);
    }

    #[test]
    fn test_unknown_focus_mode_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            "workspace_path = \"/tmp\"\n[editor]\nfocus_mode = \"zen\"\n",
        )
        .unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
    }

    #[test]
    fn test_settings_feed_engine_options() {
        let settings = EditorSettings {
            focus_mode: FocusMode::Paragraph,
            update_debounce_ms: 50,
            overlays_enabled: false,
            default_line_height_px: 18.0,
        };

        let host = settings.host_options();
        assert_eq!(host.debounce, Duration::from_millis(50));
        assert_eq!(host.focus_mode, FocusMode::Paragraph);

        let view = settings.view_options();
        assert!(!view.overlays_enabled);
        assert_eq!(view.default_line_height_px, 18.0);
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/path");
        let expanded = Config::expand_path(&path).unwrap();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("MARKRIGHT_TEST_ROOT", "/custom/notes");
        }

        let path = PathBuf::from("$MARKRIGHT_TEST_ROOT/wiki");
        assert_eq!(
            Config::expand_path(&path),
            Some(PathBuf::from("/custom/notes/wiki"))
        );

        unsafe {
            env::remove_var("MARKRIGHT_TEST_ROOT");
        }
    }

    #[test]
    fn test_expand_path_with_absolute_path() {
        let path = PathBuf::from("/absolute/path");
        assert_eq!(Config::expand_path(&path), Some(path));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/dir/config.toml");
        let mut test_config = Config::new("/tmp/test-notes");
        test_config.editor.focus_mode = FocusMode::Section;

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }
}
