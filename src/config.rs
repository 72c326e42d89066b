use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "mistralai/mistral-7b-instruct";
pub const DEFAULT_TITLE: &str = "WTIChat";
pub const DEFAULT_REFERER: &str = "http://localhost";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are WTIChat, India's premier AI assistant. \
    You are helpful, knowledgeable, and respectful. \
    You provide accurate and informative responses while maintaining a professional tone.";

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// On-disk configuration. Every field is optional; unset fields fall back to
/// the defaults above when resolved.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub referer: Option<String>,
    pub title: Option<String>,
    pub system_prompt: Option<String>,
}

/// Resolved settings, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub referer: String,
    pub title: String,
    pub system_prompt: String,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// Resolve into [`Settings`], reading the key from the environment first.
    pub fn resolve(&self) -> Result<Settings> {
        self.resolve_with_env_key(std::env::var(API_KEY_ENV).ok())
    }

    /// Resolve with an explicitly supplied environment key.
    pub fn resolve_with_env_key(&self, env_key: Option<String>) -> Result<Settings> {
        let api_key = env_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                anyhow!(
                    "OpenRouter API key not configured. \
                     Set {} or run `wtichat config set-key <KEY>`",
                    API_KEY_ENV
                )
            })?;

        Ok(Settings {
            api_key,
            model: self.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: self.endpoint.clone().unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            referer: self.referer.clone().unwrap_or_else(|| DEFAULT_REFERER.to_string()),
            title: self.title.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            system_prompt: self
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        })
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("wtichat"))
    }

    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}

impl Settings {
    /// API key with everything but the last four characters masked.
    pub fn masked_key(&self) -> String {
        let count = self.api_key.chars().count();
        let tail: String = self.api_key.chars().skip(count.saturating_sub(4)).collect();
        format!("{}{}", "*".repeat(count.saturating_sub(4)), tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            api_key: Some("sk-or-test".to_string()),
            model: Some("openai/gpt-4o-mini".to_string()),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_resolve_fills_defaults() {
        let config = Config {
            api_key: Some("from-file".to_string()),
            ..Config::default()
        };
        let settings = config.resolve_with_env_key(None).unwrap();

        assert_eq!(settings.api_key, "from-file");
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.title, DEFAULT_TITLE);
        assert_eq!(settings.referer, DEFAULT_REFERER);
        assert_eq!(settings.system_prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn test_env_key_overrides_file_key() {
        let config = Config {
            api_key: Some("from-file".to_string()),
            ..Config::default()
        };
        let settings = config
            .resolve_with_env_key(Some("from-env".to_string()))
            .unwrap();
        assert_eq!(settings.api_key, "from-env");
    }

    #[test]
    fn test_blank_env_key_falls_back_to_file() {
        let config = Config {
            api_key: Some("from-file".to_string()),
            ..Config::default()
        };
        let settings = config.resolve_with_env_key(Some("  ".to_string())).unwrap();
        assert_eq!(settings.api_key, "from-file");
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let err = Config::new().resolve_with_env_key(None).unwrap_err();
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_masked_key_keeps_last_four() {
        let settings = Config {
            api_key: Some("sk-or-123456".to_string()),
            ..Config::default()
        }
        .resolve_with_env_key(None)
        .unwrap();
        assert_eq!(settings.masked_key(), "********3456");
    }
}
