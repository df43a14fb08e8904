//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Projdesk configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(skip)]
    pub token: Option<String>,
    pub base_url: String,
    /// Resource name the project records live under
    pub resource: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Records per page for `projects list`
    pub page_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: "http://localhost:8000/api".to_string(),
            resource: "projects".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

impl ApiConfig {
    /// Base URL, with `PROJDESK_API_URL` taking precedence over the file
    pub fn resolved_base_url(&self) -> String {
        env::var("PROJDESK_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.base_url.clone())
    }

    pub fn resolved_token(&self) -> anyhow::Result<Option<String>> {
        self.enforce_env_only()?;

        Ok(env::var("PROJDESK_API_TOKEN").ok())
    }

    pub fn redacted_token(&self) -> anyhow::Result<Option<String>> {
        self.resolved_token()
            .map(|opt| opt.map(|token| redact_token(&token)))
    }

    pub fn enforce_env_only(&self) -> anyhow::Result<()> {
        if self.token.is_some() {
            return Err(anyhow!(
                "API tokens must be provided via environment variables, not stored in configuration"
            ));
        }
        Ok(())
    }
}

/// Mask a token, keeping its last four characters
pub fn redact_token(token: &str) -> String {
    let count = token.chars().count();
    if count <= 4 {
        "***".to_string()
    } else {
        let suffix: String = token.chars().skip(count - 4).collect();
        format!("***{}", suffix)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("PROJDESK_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("projdesk")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or return defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let raw: toml::Table = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            // `api.token` is skipped by serde, so look for it in the raw table
            if raw
                .get("api")
                .and_then(|api| api.get("token"))
                .is_some()
            {
                return Err(anyhow!(
                    "API tokens must be provided via environment variables, not stored in configuration ({})",
                    path.display()
                ));
            }
            let config: Config = toml::Value::Table(raw)
                .try_into()
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.api.enforce_env_only()?;
        if self.api.resource.trim().is_empty() {
            return Err(anyhow!("api.resource must not be empty"));
        }
        if self.ui.page_size == 0 {
            return Err(anyhow!("ui.page_size must be at least 1"));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            // API settings
            "api.base_url" => Ok(self.api.base_url.clone()),
            "api.resource" => Ok(self.api.resource.clone()),
            "api.timeout_secs" => Ok(self.api.timeout_secs.to_string()),

            // UI settings
            "ui.page_size" => Ok(self.ui.page_size.to_string()),

            // Token (special handling - show redacted)
            "api.token" | "token" => match self.api.redacted_token()? {
                Some(redacted) => Ok(redacted),
                None => Ok("(not set - use PROJDESK_API_TOKEN env var)".to_string()),
            },

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `projdesk config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "api.base_url" => {
                let url = value.trim();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(anyhow!("Base URL must start with http:// or https://"));
                }
                self.api.base_url = url.trim_end_matches('/').to_string();
            }
            "api.resource" => {
                let resource = value.trim().trim_matches('/');
                if resource.is_empty() {
                    return Err(anyhow!("Resource name must not be empty"));
                }
                self.api.resource = resource.to_string();
            }
            "api.timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
                if secs == 0 {
                    return Err(anyhow!("Timeout must be at least 1 second"));
                }
                self.api.timeout_secs = secs;
            }
            "ui.page_size" => {
                let size: usize = value
                    .parse()
                    .with_context(|| format!("Invalid page_size value: {}", value))?;
                if size == 0 {
                    return Err(anyhow!("Page size must be at least 1"));
                }
                self.ui.page_size = size;
            }

            // Token cannot be set via config
            "api.token" | "token" => {
                return Err(anyhow!(
                    "API tokens cannot be stored in configuration for security. \
                     Set the PROJDESK_API_TOKEN environment variable instead."
                ));
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `projdesk config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = [
            "api.base_url",
            "api.resource",
            "api.timeout_secs",
            "api.token",
            "ui.page_size",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}
