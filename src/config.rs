//! Configuration management for the boletines service

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Managed datastore settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// News-search API settings
    #[serde(default)]
    pub news: NewsConfig,

    /// Cache TTL tiers
    #[serde(default)]
    pub cache: CacheConfig,

    /// Retry policy constants
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the API server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Base URL of the managed datastore REST endpoint
    #[serde(default)]
    pub base_url: String,

    /// Service key sent on every datastore request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_key: Option<String>,

    /// Table holding bulletin rows
    #[serde(default = "default_table")]
    pub table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// Base URL of the news-search API
    #[serde(default = "default_news_base_url")]
    pub base_url: String,

    /// API key sent in the x-api-key header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default article language filter
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Default country filter (comma-separated ISO codes)
    #[serde(default = "default_countries")]
    pub countries: String,

    /// Default result page size
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Fallback TTL in seconds
    #[serde(default = "default_cache_ttl")]
    pub default_ttl_secs: u64,

    /// TTL for volatile search results
    #[serde(default = "default_search_ttl")]
    pub search_ttl_secs: u64,

    /// TTL for near-static reference data (source lists)
    #[serde(default = "default_static_ttl")]
    pub static_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the initial attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay before the first retry, doubled each attempt
    #[serde(default = "default_retry_delay_ms")]
    pub initial_delay_ms: u64,
}

fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_table() -> String {
    "boletines".to_string()
}

fn default_news_base_url() -> String {
    "https://api.newscatcherapi.com/v2".to_string()
}

fn default_lang() -> String {
    "es".to_string()
}

fn default_countries() -> String {
    "CL,ES,MX,AR,CO,PE".to_string()
}

fn default_page_size() -> u32 {
    20
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_cache_ttl() -> u64 {
    5 * 60
}

fn default_search_ttl() -> u64 {
    2 * 60
}

fn default_static_ttl() -> u64 {
    60 * 60
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            service_key: None,
            table: default_table(),
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: default_news_base_url(),
            api_key: None,
            lang: default_lang(),
            countries: default_countries(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_cache_ttl(),
            search_ttl_secs: default_search_ttl(),
            static_ttl_secs: default_static_ttl(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".boletines").join("config.yaml"))
    }

    /// Load configuration from the default path, falling back to defaults
    /// when no file exists. Secrets may be supplied via environment.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // Config carries service keys; keep it private on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// Environment variables win over file contents for secrets.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("BOLETINES_NEWS_API_KEY") {
            self.news.api_key = Some(key);
        }
        if let Ok(key) = std::env::var("BOLETINES_DB_SERVICE_KEY") {
            self.database.service_key = Some(key);
        }
        if let Ok(url) = std::env::var("BOLETINES_DB_URL") {
            self.database.base_url = url;
        }
    }

    /// Validate that the news client can be constructed
    pub fn validate_news(&self) -> Result<()> {
        if self.news.api_key.is_none() {
            return Err(ConfigError::MissingNewsApiKey.into());
        }
        Ok(())
    }

    /// Validate that the datastore client can be constructed
    pub fn validate_database(&self) -> Result<()> {
        if self.database.service_key.is_none() {
            return Err(ConfigError::MissingServiceKey.into());
        }
        if self.database.base_url.is_empty() {
            return Err(
                ConfigError::Invalid("database.base_url must be set".to_string()).into(),
            );
        }
        Ok(())
    }

    /// Retry policy assembled from the configured constants
    pub fn retry_policy(&self) -> crate::client::RetryPolicy {
        crate::client::RetryPolicy {
            max_retries: self.retry.max_retries,
            initial_delay: Duration::from_millis(self.retry.initial_delay_ms),
        }
    }
}
