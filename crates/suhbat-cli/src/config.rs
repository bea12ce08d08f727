//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use suhbat_api::{ClientConfig, DEFAULT_DEVICE, FileCredentialStore};

/// Configuration for suhbat
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chat service root URL
    pub base_url: Option<String>,
    /// Device tag sent with streaming requests
    pub device: Option<String>,
    /// Request timeout in seconds, and the longest stall allowed while a
    /// reply streams; 0 disables both
    pub timeout_secs: Option<u64>,
    /// Where the access token and profile are kept
    pub credentials_path: Option<String>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("suhbat")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("SUHBAT_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default location, then apply environment overrides
    pub fn load() -> Self {
        let mut config = Self::load_from(&Self::config_path());
        if let Ok(url) = std::env::var("SUHBAT_BASE_URL") {
            if !url.is_empty() {
                config.base_url = Some(url);
            }
        }
        config
    }

    /// Load config from a file; a missing or unreadable file yields defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to a file
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let client = ClientConfig::default();
        let default_config = Config {
            base_url: Some(client.base_url),
            device: Some(client.device),
            timeout_secs: client.timeout.map(|t| t.as_secs()),
            credentials_path: None,
        };

        default_config.save_to(&path)?;
        Ok(path)
    }

    /// Build client settings, with `base_url` taking precedence over the file
    pub fn client_config(&self, base_url: Option<&str>) -> ClientConfig {
        let mut client = ClientConfig::default();
        if let Some(url) = base_url.or(self.base_url.as_deref()) {
            client = client.with_base_url(url.trim_end_matches('/'));
        }
        if let Some(device) = &self.device {
            client.device = device.clone();
        }
        if let Some(secs) = self.timeout_secs {
            let limit = (secs > 0).then(|| Duration::from_secs(secs));
            client = client.with_timeout(limit).with_read_timeout(limit);
        }
        client
    }

    /// Credential file location
    pub fn credentials_path(&self) -> PathBuf {
        self.credentials_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(FileCredentialStore::default_path)
    }
}

/// Generate example config content
pub fn example_config() -> String {
    format!(
        r#"# suhbat configuration file
# Place at ~/.config/suhbat/config.toml (Linux) or the platform config directory

# Chat service root (SUHBAT_BASE_URL overrides this)
base_url = "http://localhost:8000"

# Device tag sent with each streamed question
device = "{}"

# Request timeout in seconds. Streamed replies may run longer as long as they
# never stall for this long. 0 disables both limits.
timeout_secs = 120

# Where the access token is stored (optional)
# credentials_path = "~/.config/suhbat/credentials.json"
"#,
        DEFAULT_DEVICE
    )
}
