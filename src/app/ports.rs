use crate::common::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single external lookup. Always recoverable: the
/// orchestrator records it as data on the affected sub-result and keeps
/// going, so this type never crosses the pipeline boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("{0} lookup is not configured")]
    NotConfigured(&'static str),

    #[error("rate limit exceeded for {0}")]
    RateLimited(&'static str),

    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected response: {0}")]
    Response(String),
}

pub type LookupResult<T> = std::result::Result<T, LookupError>;

/// Verdict from the email validation service. A lookup that failed still
/// produces one of these, with the validity fields left unset and the
/// failure recorded in `reason`/`error`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailValidation {
    pub valid: Option<bool>,
    pub deliverable: Option<bool>,
    pub reason: String,
    pub risk_score: Option<f64>,
    pub provider: Option<String>,
    pub error: Option<String>,
}

impl EmailValidation {
    /// Sub-result recorded when the validation call itself failed.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            reason: "validation_failed".to_string(),
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

/// WHOIS registration facts for a domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainInfo {
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
    pub expires_date: Option<String>,
    pub registrar: Option<String>,
    pub age_years: Option<u32>,
    pub nameservers: Vec<String>,
}

/// One company-directory record, already reduced to the fields the
/// pipeline keeps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub employee_count: Option<u64>,
    pub industry: Option<String>,
    pub annual_revenue: Option<f64>,
    pub description: Option<String>,
    pub headquarters: Option<String>,
    pub founded_year: Option<i32>,
    pub technologies: Vec<String>,
}

/// Content highlights scraped from a company website.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebsiteInfo {
    pub page_title: Option<String>,
    pub meta_description: Option<String>,
    pub main_heading: Option<String>,
    pub about_text: Option<String>,
}

/// Search terms for the local-business directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessQuery {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
}

/// One local-business listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessListing {
    pub rating: Option<f64>,
    pub reviews_count: Option<u64>,
    pub hours: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub categories: Vec<String>,
}

/// Raw text fetched from the upload store, with enough metadata to enforce
/// the size ceiling before parsing. Stores that cannot recover a file name
/// fall back to the location string.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub text: String,
    pub size_bytes: u64,
    pub file_name: String,
}

#[async_trait]
pub trait EmailValidatorPort: Send + Sync {
    async fn validate(&self, email: &str) -> LookupResult<EmailValidation>;
}

#[async_trait]
pub trait WhoisPort: Send + Sync {
    async fn domain_info(&self, domain: &str) -> LookupResult<DomainInfo>;
}

#[async_trait]
pub trait CompanyDirectoryPort: Send + Sync {
    /// Best match for the company name, or `None` when the directory has
    /// no record of it.
    async fn search(&self, company_name: &str) -> LookupResult<Option<CompanyProfile>>;
}

#[async_trait]
pub trait LocalBusinessPort: Send + Sync {
    async fn search(&self, query: &BusinessQuery) -> LookupResult<Option<BusinessListing>>;
}

#[async_trait]
pub trait WebScraperPort: Send + Sync {
    async fn scrape_site(&self, domain: &str) -> LookupResult<WebsiteInfo>;

    /// Whether `url` resolves to a real page. Used to verify heuristic
    /// profile URLs.
    async fn probe_url(&self, url: &str) -> LookupResult<bool>;
}

#[async_trait]
pub trait FileStorePort: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<StoredFile>;
}
