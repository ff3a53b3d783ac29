use crate::app::ports::FileStorePort;
use crate::common::constants::{
    COMPANY_DIRECTORY_SOURCE, EMAIL_VALIDATION_SOURCE, LOCAL_BUSINESS_SOURCE, WEB_SCRAPER_SOURCE,
    WHOIS_SOURCE,
};
use crate::config::Config;
use crate::infra::api_client::{ApiClient, RetryConfig};
use crate::infra::company_directory_api::CompanyDirectoryApi;
use crate::infra::email_validation_api::EmailValidationApi;
use crate::infra::file_store::{HttpFileStore, LocalFileStore};
use crate::infra::local_business_api::LocalBusinessApi;
use crate::infra::site_scraper::SiteScraper;
use crate::infra::whois_api::WhoisApi;
use crate::pipeline::ingestion::fetch::FetchConfig;
use crate::pipeline::processing::enrich::{
    BatchConfig, ContactEnricher, RateLimitConfig, SourceRateLimiter,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub fn retry_config(config: &Config) -> RetryConfig {
    RetryConfig {
        attempts: config.limits.request_retries,
        base_delay: Duration::from_millis(config.limits.request_retry_delay_ms),
    }
}

pub fn rate_limit_config(config: &Config) -> RateLimitConfig {
    RateLimitConfig {
        max_calls: config.limits.max_api_calls_per_minute,
        window: Duration::from_secs(60),
    }
}

pub fn fetch_config(config: &Config) -> FetchConfig {
    FetchConfig {
        max_file_size_bytes: config.limits.max_file_size_bytes,
    }
}

pub fn batch_config(config: &Config) -> BatchConfig {
    BatchConfig {
        batch_size: config.limits.batch_size,
        batch_delay: Duration::from_millis(config.limits.batch_delay_ms),
    }
}

/// Names of the lookup sources the configuration actually turns on.
pub fn enabled_sources(config: &Config) -> Vec<&'static str> {
    let apis = &config.apis;
    let mut sources = Vec::new();
    if apis.email_check.is_enabled() {
        sources.push(EMAIL_VALIDATION_SOURCE);
    }
    if apis.whois.is_enabled() {
        sources.push(WHOIS_SOURCE);
    }
    if apis.company_directory.is_enabled() {
        sources.push(COMPANY_DIRECTORY_SOURCE);
    }
    if apis.local_business.is_enabled() {
        sources.push(LOCAL_BUSINESS_SOURCE);
    }
    if apis.web_scraper.enabled {
        sources.push(WEB_SCRAPER_SOURCE);
    }
    sources
}

/// Wire every enabled lookup source into an enricher. Disabled sources
/// are simply left out, which is how the orchestrator knows to skip
/// them.
pub fn build_enricher(config: &Config) -> ContactEnricher {
    let client = ApiClient::new(retry_config(config));
    let limiter = SourceRateLimiter::new(rate_limit_config(config));
    let apis = &config.apis;

    let mut enricher = ContactEnricher::new(limiter);
    if apis.email_check.is_enabled() {
        enricher = enricher.with_email_validator(Arc::new(EmailValidationApi::new(
            client.clone(),
            apis.email_check.key.clone(),
        )));
    }
    if apis.whois.is_enabled() {
        enricher = enricher.with_whois(Arc::new(WhoisApi::new(
            client.clone(),
            apis.whois.key.clone(),
        )));
    }
    if apis.company_directory.is_enabled() {
        enricher = enricher.with_company_directory(Arc::new(CompanyDirectoryApi::new(
            client.clone(),
            apis.company_directory.key.clone(),
            apis.company_directory.base_url.clone(),
        )));
    }
    if apis.local_business.is_enabled() {
        enricher = enricher.with_local_business(Arc::new(LocalBusinessApi::new(
            client.clone(),
            apis.local_business.key.clone(),
        )));
    }
    if apis.web_scraper.enabled {
        enricher = enricher.with_web_scraper(Arc::new(SiteScraper::new(client)));
    }

    info!(sources = ?enabled_sources(config), "enrichment sources configured");
    enricher
}

/// Local paths read straight off disk; anything with an HTTP scheme goes
/// through the downloading store.
pub fn file_store_for(location: &str, config: &Config) -> Arc<dyn FileStorePort> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Arc::new(HttpFileStore::new(config.limits.max_file_size_bytes))
    } else {
        Arc::new(LocalFileStore)
    }
}
