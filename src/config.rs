//! Configuration types for lookout.

use std::collections::HashMap;
use std::path::PathBuf;

use lookout_sources::{EmptyQuery, SourceConfig};
use serde::{Deserialize, Serialize};

use crate::error::{LookoutError, Result};
use crate::screens::ScreenKind;
use crate::session::FailureMode;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookoutConfig {
    /// Transport settings and site base URLs.
    pub sources: SourceConfig,
    /// Per-screen behavior overrides, keyed by screen kind.
    pub screens: HashMap<ScreenKind, ScreenOverride>,
}

/// Overrides for one screen. Unset fields keep the screen default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenOverride {
    pub empty_query: Option<EmptyQuery>,
    pub failure: Option<FailureMode>,
}

impl LookoutConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails [`validate`](Self::validate).
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| LookoutError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| LookoutError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/lookout/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("lookout").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("lookout")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/lookout-config/config.toml")
        }
    }

    /// Check source settings.
    ///
    /// # Errors
    ///
    /// Returns [`LookoutError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.sources
            .validate()
            .map_err(|e| LookoutError::Config(e.to_string()))
    }

    /// Override for a screen, if configured.
    pub fn screen(&self, kind: ScreenKind) -> ScreenOverride {
        self.screens.get(&kind).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = LookoutConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.screens.is_empty());
        assert_eq!(config.screen(ScreenKind::Tatoeba), ScreenOverride::default());
    }

    #[test]
    fn screen_overrides_parse_from_toml() {
        let toml_str = r#"
            [sources]
            timeout_seconds = 10

            [screens.gamekyo_front_page]
            failure = "silent"

            [screens.gamekult_games]
            empty_query = "fetch"
        "#;
        let config: LookoutConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sources.timeout_seconds, Some(10));
        assert_eq!(
            config.screen(ScreenKind::GamekyoFrontPage).failure,
            Some(FailureMode::Silent)
        );
        assert_eq!(
            config.screen(ScreenKind::GamekultGames).empty_query,
            Some(EmptyQuery::Fetch)
        );
        assert_eq!(config.screen(ScreenKind::GamekultGames).failure, None);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = LookoutConfig::default();
        config.sources.user_agent = Some("lookout-test".into());
        config.screens.insert(
            ScreenKind::SmashingMagazine,
            ScreenOverride {
                empty_query: None,
                failure: Some(FailureMode::Notify),
            },
        );
        config.save_to_file(&path).unwrap();

        let loaded = LookoutConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = LookoutConfig::from_file(std::path::Path::new("/nonexistent/lookout.toml"));
        assert!(matches!(result, Err(LookoutError::Io(_))));
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();
        assert!(matches!(
            LookoutConfig::from_file(&path),
            Err(LookoutError::Config(_))
        ));
    }

    #[test]
    fn from_file_rejects_zero_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zero.toml");
        std::fs::write(&path, "[sources]\ntimeout_seconds = 0\n").unwrap();
        let err = LookoutConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn unknown_screen_is_rejected() {
        let result: std::result::Result<LookoutConfig, _> =
            toml::from_str("[screens.nope]\nfailure = \"silent\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = LookoutConfig::default_config_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.ends_with("config.toml"));
        assert!(path_str.contains("lookout"));
    }
}
