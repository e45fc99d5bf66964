use crate::cache::{CacheOptions, RefetchTriggers};
use crate::permissions::Role;
use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  /// Role of the signed-in user; gates which actions the UI offers
  #[serde(default)]
  pub role: Role,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the PayZenix server (e.g., "http://localhost:5000")
  pub url: String,
  /// Per-request timeout in seconds
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
  30
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Seconds a fetched list is served without refetching
  #[serde(default = "default_stale_time_secs")]
  pub stale_time_secs: u64,
  /// Refetch stale lists when the terminal regains focus
  #[serde(default = "default_true")]
  pub refetch_on_focus: bool,
  #[serde(default)]
  pub refetch_on_reconnect: bool,
}

fn default_stale_time_secs() -> u64 {
  5 * 60
}

fn default_true() -> bool {
  true
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      stale_time_secs: default_stale_time_secs(),
      refetch_on_focus: true,
      refetch_on_reconnect: false,
    }
  }
}

impl CacheConfig {
  pub fn options(&self) -> CacheOptions {
    CacheOptions::default()
      .with_stale_time(Duration::from_secs(self.stale_time_secs))
      .with_refetch(RefetchTriggers {
        on_focus: self.refetch_on_focus,
        on_reconnect: self.refetch_on_reconnect,
      })
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./payzenix.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/payzenix/config.yaml
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
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/payzenix/config.yaml\n\
                 with at least:\n\n  api:\n    url: http://localhost:5000"
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("payzenix.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("payzenix").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub(crate) fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(contents)
  }

  /// Get the API token from the environment, if any.
  ///
  /// Checks PAYZENIX_TOKEN. Requests go out unauthenticated without it.
  pub fn get_api_token() -> Option<String> {
    std::env::var("PAYZENIX_TOKEN")
      .ok()
      .filter(|t| !t.trim().is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_minimal_config_uses_defaults() {
    let config = Config::parse("api:\n  url: http://localhost:5000\n").unwrap();

    assert_eq!(config.api.url, "http://localhost:5000");
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.role, Role::Employee);

    let options = config.cache.options();
    assert_eq!(options.stale_time, Duration::from_secs(300));
    assert!(options.refetch.on_focus);
    assert!(!options.refetch.on_reconnect);
  }

  #[test]
  fn test_full_config() {
    let yaml = r#"
api:
  url: https://hr.example.com
  timeout_secs: 5
role: manager
cache:
  stale_time_secs: 30
  refetch_on_focus: false
  refetch_on_reconnect: true
"#;
    let config = Config::parse(yaml).unwrap();

    assert_eq!(config.role, Role::Manager);
    assert_eq!(config.api.timeout_secs, 5);
    let options = config.cache.options();
    assert_eq!(options.stale_time, Duration::from_secs(30));
    assert!(!options.refetch.on_focus);
    assert!(options.refetch.on_reconnect);
  }

  #[test]
  fn test_missing_explicit_path_is_an_error() {
    let err = Config::load(Some(Path::new("/nonexistent/payzenix.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }
}
