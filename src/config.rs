use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

use crate::discovery::DEFAULT_PAGE_SIZE;
use crate::error::SyncError;

/// Environment variable holding the GitHub access token
pub const GITHUB_TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Main configuration structure for octosync
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Directory holding the organization's working copies
    #[serde(default = "default_base_directory")]
    pub base_directory: String,

    /// GitHub access and listing settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Reconciliation behavior settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// GitHub configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitHubConfig {
    /// Environment variable the access token is read from
    #[serde(default = "default_token_env_var")]
    pub token_env_var: String,

    /// Repositories requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u8,
}

/// Reconciliation configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SyncConfig {
    /// Maximum concurrent local inspections
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String, // "info"
}

// Default value functions
fn default_base_directory() -> String {
    ".".to_string()
}
fn default_token_env_var() -> String {
    GITHUB_TOKEN_ENV_VAR.to_string()
}
fn default_page_size() -> u8 {
    DEFAULT_PAGE_SIZE
}
fn default_max_parallel() -> usize {
    4
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token_env_var: default_token_env_var(),
            page_size: default_page_size(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_directory: default_base_directory(),
            github: GitHubConfig::default(),
            sync: SyncConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl LoggingConfig {
    /// Parsed log level; the offending string when it is not a level name
    pub fn level_filter(&self) -> std::result::Result<LevelFilter, String> {
        self.level.parse().map_err(|_| self.level.clone())
    }
}

impl Config {
    /// Load configuration from the default location, falling back to defaults
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            tracing::debug!("No configuration at {:?}, using defaults", config_path);
            let mut config = Self::default();
            config.expand_paths()?;
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.expand_paths()?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Get the default configuration file path (XDG compliant)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to get user config directory")?;

        Ok(config_dir.join("octosync").join("config.yml"))
    }

    /// Expand environment variables in configuration paths
    pub fn expand_paths(&mut self) -> Result<()> {
        self.base_directory = shellexpand::full(&self.base_directory)
            .context("Failed to expand base_directory path")?
            .into_owned();

        Ok(())
    }
}

/// Settings for one run, resolved once at startup
#[derive(Debug, Clone)]
pub struct Settings {
    pub org: String,
    pub token: String,
    pub base_directory: PathBuf,
    pub page_size: u8,
    pub max_parallel: usize,
}

impl Settings {
    /// Combine the CLI organization argument with the loaded configuration
    pub fn resolve(org_arg: Option<&str>, config: &Config) -> Result<Self, SyncError> {
        let token = github_token_from(&config.github.token_env_var)?;
        let org = org_name(org_arg)?;

        Ok(Self {
            org,
            token,
            base_directory: PathBuf::from(&config.base_directory),
            page_size: config.github.page_size.max(1),
            max_parallel: config.sync.max_parallel.max(1),
        })
    }
}

/// Organization to sync: the argument when given, else the working directory's name
pub fn org_name(arg: Option<&str>) -> Result<String, SyncError> {
    if let Some(name) = arg.filter(|name| !name.is_empty()) {
        return Ok(name.to_string());
    }

    let cwd = env::current_dir().map_err(|e| SyncError::OrganizationName(e.to_string()))?;

    cwd.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            SyncError::OrganizationName(format!(
                "working directory {} has no usable base name",
                cwd.display()
            ))
        })
}

/// Read the access token from `GITHUB_TOKEN`
pub fn github_token() -> Result<String, SyncError> {
    github_token_from(GITHUB_TOKEN_ENV_VAR)
}

/// Read the access token from the given environment variable
pub fn github_token_from(var: &str) -> Result<String, SyncError> {
    match env::var(var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(SyncError::MissingToken {
            var: var.to_string(),
        }),
    }
}
