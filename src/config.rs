use crate::common::error::{EnricherError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Runtime configuration, layered defaults -> config.toml -> environment.
/// API keys normally arrive through the environment (dotenv in dev);
/// tunables live in the TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub apis: ApisConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApisConfig {
    pub email_check: ApiConfig,
    pub whois: ApiConfig,
    pub company_directory: ApiConfig,
    pub local_business: ApiConfig,
    pub web_scraper: ScrapeConfig,
}

/// One external lookup service. A source with no key is simply disabled;
/// only the company directory needs `base_url` as well.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub key: Option<String>,
    pub base_url: Option<String>,
}

impl ApiConfig {
    pub fn is_enabled(&self) -> bool {
        self.key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// The site scraper runs locally and needs no key, so it gets a plain
/// on/off switch instead.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_file_size_bytes: u64,
    pub max_records_per_batch: usize,
    pub max_api_calls_per_minute: u32,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub request_retries: u32,
    pub request_retry_delay_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 50 * 1024 * 1024,
            max_records_per_batch: 10_000,
            max_api_calls_per_minute: 100,
            batch_size: 10,
            batch_delay_ms: 1000,
            request_retries: 3,
            request_retry_delay_ms: 1000,
        }
    }
}

const DEFAULT_CONFIG_PATH: &str = "config.toml";

impl Config {
    /// Load and validate. An explicit path must exist; the default
    /// `config.toml` is optional and its absence just means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match std::fs::read_to_string(DEFAULT_CONFIG_PATH) {
                Ok(content) => toml::from_str(&content)?,
                Err(_) => {
                    debug!("no config.toml found, using defaults");
                    Config::default()
                }
            },
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EnricherError::Config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Ok(toml::from_str(&content)?)
    }

    fn apply_env(&mut self) {
        if let Some(v) = env_string("EMAIL_CHECK_API_KEY") {
            self.apis.email_check.key = Some(v);
        }
        if let Some(v) = env_string("WHOIS_API_KEY") {
            self.apis.whois.key = Some(v);
        }
        if let Some(v) = env_string("COMPANY_DIRECTORY_API_KEY") {
            self.apis.company_directory.key = Some(v);
        }
        if let Some(v) = env_string("COMPANY_DIRECTORY_API_URL") {
            self.apis.company_directory.base_url = Some(v);
        }
        if let Some(v) = env_string("LOCAL_BUSINESS_API_KEY") {
            self.apis.local_business.key = Some(v);
        }
        if let Some(v) = env_string("WEB_SCRAPER_ENABLED") {
            self.apis.web_scraper.enabled = v == "true";
        }
    }

    fn validate(&self) -> Result<()> {
        if self.limits.batch_size == 0 {
            return Err(EnricherError::Config(
                "limits.batch_size must be at least 1".to_string(),
            ));
        }
        if self.limits.request_retries == 0 {
            return Err(EnricherError::Config(
                "limits.request_retries must be at least 1".to_string(),
            ));
        }
        if self.limits.max_file_size_bytes == 0 {
            return Err(EnricherError::Config(
                "limits.max_file_size_bytes must be positive".to_string(),
            ));
        }
        if self.limits.max_records_per_batch == 0 {
            return Err(EnricherError::Config(
                "limits.max_records_per_batch must be at least 1".to_string(),
            ));
        }
        if self.apis.company_directory.is_enabled()
            && self.apis.company_directory.base_url.is_none()
        {
            return Err(EnricherError::Config(
                "apis.company_directory.base_url is required when its key is set".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
