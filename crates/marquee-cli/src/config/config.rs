//! `AppConfig` struct and TOML read/write.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use url::Url;

/// Environment variable that overrides `api.api_key`.
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// TMDB connection settings.
    #[serde(default)]
    pub api: ApiSettings,
    /// Movie browser settings.
    #[serde(default)]
    pub browser: BrowserConfig,
}

/// TMDB connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ApiSettings {
    /// Base URL override (default: TMDB v3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Static API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Movie browser settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BrowserConfig {
    /// Quiet period after the last keystroke before a search fires.
    pub search_debounce_ms: u64,
    /// Distance (in lines) from the list bottom that triggers the next page.
    pub scroll_threshold: u16,
    /// Terminal width (in columns) above which the list uses two columns.
    pub two_column_min_width: u16,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: 800,
            scroll_threshold: 12,
            two_column_min_width: 160,
            request_timeout_secs: 30,
        }
    }
}

impl BrowserConfig {
    /// Search debounce delay.
    #[must_use]
    pub const fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config to TOML")?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Resolves the API key. A non-empty `env_value` wins over the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if neither source provides a key.
    pub fn resolve_api_key(&self, env_value: Option<String>) -> Result<String> {
        if let Some(key) = env_value.filter(|k| !k.is_empty()) {
            return Ok(key);
        }
        match self.api.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(String::from(key)),
            _ => bail!("TMDB API key is required: set {API_KEY_ENV} or api.api_key in config.toml"),
        }
    }

    /// Parses the configured base URL override, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if `api.base_url` is not a valid URL.
    pub fn base_url(&self) -> Result<Option<Url>> {
        self.api
            .base_url
            .as_deref()
            .map(|raw| {
                // Url::join drops the last path segment unless it ends with '/'.
                let normalized = if raw.ends_with('/') {
                    String::from(raw)
                } else {
                    format!("{raw}/")
                };
                Url::parse(&normalized).with_context(|| format!("invalid api.base_url: {raw}"))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_default_config() {
        // Arrange & Act
        let config = AppConfig::default();

        // Assert
        assert!(config.api.api_key.is_none());
        assert_eq!(config.browser.search_debounce(), Duration::from_millis(800));
        assert_eq!(config.browser.scroll_threshold, 12);
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        // Arrange
        let config = AppConfig {
            api: ApiSettings {
                base_url: Some(String::from("http://localhost:8080/3/")),
                api_key: Some(String::from("abc123")),
            },
            browser: BrowserConfig {
                search_debounce_ms: 300,
                ..BrowserConfig::default()
            },
        };

        // Act
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        // Assert
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        // Arrange
        let path = Path::new("/tmp/marquee_test_nonexistent_config.toml");

        // Act
        let config = AppConfig::load(path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = AppConfig {
            api: ApiSettings {
                base_url: None,
                api_key: Some(String::from("k")),
            },
            browser: BrowserConfig::default(),
        };

        // Act
        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_partial_browser_section() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[browser]\nscroll_threshold = 4\n").unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config.browser.scroll_threshold, 4);
        assert_eq!(config.browser.search_debounce_ms, 800);
    }

    #[test]
    fn test_env_key_overrides_config_key() {
        // Arrange
        let config = AppConfig {
            api: ApiSettings {
                base_url: None,
                api_key: Some(String::from("from-config")),
            },
            browser: BrowserConfig::default(),
        };

        // Act & Assert
        assert_eq!(
            config.resolve_api_key(Some(String::from("from-env"))).unwrap(),
            "from-env"
        );
        assert_eq!(config.resolve_api_key(Some(String::new())).unwrap(), "from-config");
        assert_eq!(config.resolve_api_key(None).unwrap(), "from-config");
    }

    #[test]
    fn test_missing_key_is_an_error() {
        // Arrange
        let config = AppConfig::default();

        // Act
        let result = config.resolve_api_key(None);

        // Assert
        assert!(result.unwrap_err().to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        // Arrange
        let config = AppConfig {
            api: ApiSettings {
                base_url: Some(String::from("http://localhost:9000/3")),
                api_key: None,
            },
            browser: BrowserConfig::default(),
        };

        // Act
        let url = config.base_url().unwrap().unwrap();

        // Assert
        assert_eq!(url.as_str(), "http://localhost:9000/3/");
        assert!(AppConfig::default().base_url().unwrap().is_none());
    }
}
