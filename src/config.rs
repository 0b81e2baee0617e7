use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://api.toshl.com";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the API
  #[serde(default = "default_url")]
  pub url: String,
  /// Request timeout in seconds
  #[serde(default = "default_timeout")]
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      url: default_url(),
      timeout_secs: default_timeout(),
    }
  }
}

fn default_url() -> String {
  DEFAULT_API_URL.to_string()
}

fn default_timeout() -> u64 {
  30
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
  /// Start with an empty reference-data cache
  #[serde(default)]
  pub force_refresh: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
  /// Filter used when TOSHL_LOG is not set
  #[serde(default = "default_level")]
  pub level: String,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: default_level(),
    }
  }
}

fn default_level() -> String {
  "info".to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./toshl.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/toshl-cli/config.yaml
  ///
  /// Every setting has a default, so no file at all is fine.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("toshl.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("toshl-cli").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    // An empty document deserializes as null
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }

  /// Get the API token from environment variables.
  ///
  /// Checks TOSHL_TOKEN first, then TOSHL_API_TOKEN as fallback.
  pub fn get_api_token() -> Result<String> {
    std::env::var("TOSHL_TOKEN")
      .or_else(|_| std::env::var("TOSHL_API_TOKEN"))
      .map_err(|_| {
        eyre!("Toshl API token not found. Set TOSHL_TOKEN or TOSHL_API_TOKEN environment variable.")
      })
  }
}
