use crate::app::ports::{
    BusinessListing, BusinessQuery, CompanyDirectoryPort, CompanyProfile, DomainInfo,
    EmailValidation, EmailValidatorPort, LocalBusinessPort, WebScraperPort, WebsiteInfo,
    WhoisPort,
};
use crate::common::constants::{
    COMPANY_DIRECTORY_SOURCE, EMAIL_VALIDATION_SOURCE, FREE_MAIL_PROVIDERS,
    LOCAL_BUSINESS_SOURCE, WEB_SCRAPER_SOURCE, WHOIS_SOURCE,
};
use crate::common::types::{ContactField, NormalizedContact};
use crate::common::validate::email_domain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub mod batch;
pub mod rate_limit;

pub use batch::{BatchConfig, BatchError, BatchResult, BatchRunner};
pub use rate_limit::{RateLimitConfig, SourceRateLimiter};

/// Lookup sources that can contribute to a contact, in invocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentSource {
    EmailValidation,
    CompanyEnrichment,
    BusinessData,
    SocialProfiles,
}

impl EnrichmentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentSource::EmailValidation => "email_validation",
            EnrichmentSource::CompanyEnrichment => "company_enrichment",
            EnrichmentSource::BusinessData => "business_data",
            EnrichmentSource::SocialProfiles => "social_profiles",
        }
    }
}

impl std::fmt::Display for EnrichmentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw sub-results per source for one contact. A populated slot means the
/// source ran, even when what it recorded is a failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentDetails {
    pub email_validation: Option<EmailValidation>,
    pub company_enrichment: Option<CompanyData>,
    pub business_data: Option<BusinessData>,
    pub social_profiles: Option<SocialProfiles>,
}

impl EnrichmentDetails {
    pub fn sources(&self) -> Vec<EnrichmentSource> {
        let mut sources = Vec::new();
        if self.email_validation.is_some() {
            sources.push(EnrichmentSource::EmailValidation);
        }
        if self.company_enrichment.is_some() {
            sources.push(EnrichmentSource::CompanyEnrichment);
        }
        if self.business_data.is_some() {
            sources.push(EnrichmentSource::BusinessData);
        }
        if self.social_profiles.is_some() {
            sources.push(EnrichmentSource::SocialProfiles);
        }
        sources
    }
}

/// Aggregate of the three company sub-lookups. Partial by design: any
/// sub-lookup that failed appends to `error` while the others' fields
/// stay usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyData {
    pub domain_info: Option<DomainInfo>,
    pub company_age_years: Option<u32>,
    pub profile: Option<CompanyProfile>,
    pub website_info: Option<WebsiteInfo>,
    pub error: Option<String>,
}

/// Local-business sub-result. `listing` is `None` both when the directory
/// had no match and when the lookup failed; `error` tells the two apart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessData {
    pub listing: Option<BusinessListing>,
    pub error: Option<String>,
}

/// Heuristic social handles for a contact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialProfiles {
    pub linkedin_url: Option<String>,
    /// Set only when a scraping collaborator checked the URL.
    pub linkedin_verified: Option<bool>,
}

/// Every attribute enrichment can attach to a contact, projected from the
/// recorded details. All optional; a field stays unset when no source
/// supplied it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentAttributes {
    pub email_valid: Option<bool>,
    pub email_deliverable: Option<bool>,
    pub domain_info: Option<DomainInfo>,
    pub company_age_years: Option<u32>,
    pub company_size: Option<String>,
    pub industry: Option<String>,
    pub annual_revenue: Option<f64>,
    pub company_description: Option<String>,
    pub headquarters: Option<String>,
    pub founded_year: Option<i32>,
    pub technologies: Vec<String>,
    pub website_info: Option<WebsiteInfo>,
    pub business_rating: Option<f64>,
    pub business_reviews_count: Option<u64>,
    pub business_hours: Option<String>,
    pub business_address: Option<String>,
    pub business_website: Option<String>,
    pub business_categories: Vec<String>,
    pub linkedin_url: Option<String>,
    pub linkedin_verified: Option<bool>,
}

impl EnrichmentAttributes {
    /// Merge every successful sub-result into one attribute set. Failed
    /// sub-results contribute nothing here; their record lives in the
    /// details.
    pub fn from_details(details: &EnrichmentDetails) -> Self {
        let mut attrs = Self::default();
        if let Some(validation) = &details.email_validation {
            attrs.email_valid = validation.valid;
            attrs.email_deliverable = validation.deliverable;
        }
        if let Some(company) = &details.company_enrichment {
            attrs.domain_info = company.domain_info.clone();
            attrs.company_age_years = company.company_age_years;
            if let Some(profile) = &company.profile {
                attrs.company_size = profile.employee_count.map(|n| n.to_string());
                attrs.industry = profile.industry.clone();
                attrs.annual_revenue = profile.annual_revenue;
                attrs.company_description = profile.description.clone();
                attrs.headquarters = profile.headquarters.clone();
                attrs.founded_year = profile.founded_year;
                attrs.technologies = profile.technologies.clone();
            }
            attrs.website_info = company.website_info.clone();
        }
        if let Some(business) = &details.business_data {
            if let Some(listing) = &business.listing {
                attrs.business_rating = listing.rating;
                attrs.business_reviews_count = listing.reviews_count;
                attrs.business_hours = listing.hours.clone();
                attrs.business_address = listing.address.clone();
                attrs.business_website = listing.website.clone();
                attrs.business_categories = listing.categories.clone();
            }
        }
        if let Some(social) = &details.social_profiles {
            attrs.linkedin_url = social.linkedin_url.clone();
            attrs.linkedin_verified = social.linkedin_verified;
        }
        attrs
    }
}

/// A contact together with whatever enrichment attached to it. On the
/// failure path the attributes stay empty and the base contact is carried
/// through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedContact {
    pub contact: NormalizedContact,
    pub attributes: EnrichmentAttributes,
    pub enriched_at: Option<DateTime<Utc>>,
    pub sources: Vec<EnrichmentSource>,
}

impl EnrichedContact {
    pub fn untouched(contact: NormalizedContact) -> Self {
        Self {
            contact,
            attributes: EnrichmentAttributes::default(),
            enriched_at: None,
            sources: Vec::new(),
        }
    }
}

/// Per-contact result. Failure is data here, not an error type: the
/// orchestrator never lets a lookup problem escape to the batch runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentOutcome {
    pub success: bool,
    pub contact: EnrichedContact,
    pub details: EnrichmentDetails,
    pub error: Option<String>,
}

impl EnrichmentOutcome {
    fn failure(contact: NormalizedContact, details: EnrichmentDetails, message: String) -> Self {
        Self {
            success: false,
            contact: EnrichedContact::untouched(contact),
            details,
            error: Some(message),
        }
    }
}

/// Orchestrator options. Every recognized switch is listed here with its
/// default; construction is the only place they are read.
#[derive(Debug, Clone)]
pub struct EnricherConfig {
    pub validate_emails: bool,
    pub include_company_data: bool,
    pub include_social_profiles: bool,
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            validate_emails: true,
            include_company_data: true,
            include_social_profiles: true,
        }
    }
}

/// Runs the per-contact enrichment sequence. Each lookup source is
/// optional: a missing port simply disables that source. The rate limiter
/// is consulted before every external call and a rejection is recorded
/// like any other lookup failure.
pub struct ContactEnricher {
    config: EnricherConfig,
    limiter: SourceRateLimiter,
    email_validator: Option<Arc<dyn EmailValidatorPort>>,
    whois: Option<Arc<dyn WhoisPort>>,
    company_directory: Option<Arc<dyn CompanyDirectoryPort>>,
    local_business: Option<Arc<dyn LocalBusinessPort>>,
    web_scraper: Option<Arc<dyn WebScraperPort>>,
}

impl ContactEnricher {
    pub fn new(limiter: SourceRateLimiter) -> Self {
        Self {
            config: EnricherConfig::default(),
            limiter,
            email_validator: None,
            whois: None,
            company_directory: None,
            local_business: None,
            web_scraper: None,
        }
    }

    pub fn with_config(mut self, config: EnricherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_email_validator(mut self, port: Arc<dyn EmailValidatorPort>) -> Self {
        self.email_validator = Some(port);
        self
    }

    pub fn with_whois(mut self, port: Arc<dyn WhoisPort>) -> Self {
        self.whois = Some(port);
        self
    }

    pub fn with_company_directory(mut self, port: Arc<dyn CompanyDirectoryPort>) -> Self {
        self.company_directory = Some(port);
        self
    }

    pub fn with_local_business(mut self, port: Arc<dyn LocalBusinessPort>) -> Self {
        self.local_business = Some(port);
        self
    }

    pub fn with_web_scraper(mut self, port: Arc<dyn WebScraperPort>) -> Self {
        self.web_scraper = Some(port);
        self
    }

    /// Enrich one contact. Requires a non-empty email; everything past
    /// that precondition is best-effort and the returned outcome is the
    /// only way failures surface.
    #[instrument(skip(self, contact))]
    pub async fn enrich_contact(&self, contact: &NormalizedContact) -> EnrichmentOutcome {
        let mut details = EnrichmentDetails::default();

        let Some(email) = contact.get_non_empty(ContactField::Email) else {
            debug!("contact rejected before enrichment: no email");
            return EnrichmentOutcome::failure(
                contact.clone(),
                details,
                "missing required field: email".to_string(),
            );
        };

        if self.config.validate_emails {
            if let Some(validator) = &self.email_validator {
                let result = match self.limiter.try_acquire(EMAIL_VALIDATION_SOURCE).await {
                    Ok(()) => validator.validate(email).await,
                    Err(limited) => Err(limited),
                };
                let validation = result.unwrap_or_else(|e| {
                    warn!(target: "enrich::email", error = %e, "email validation failed");
                    EmailValidation::failed(e.to_string())
                });
                details.email_validation = Some(validation);
            }
        }

        let company_name = contact.get_non_empty(ContactField::CompanyName);
        let domain = derive_company_domain(contact);
        if self.config.include_company_data && (company_name.is_some() || domain.is_some()) {
            let company = self.enrich_company(company_name, domain.as_deref()).await;
            details.company_enrichment = Some(company);
        }

        if let Some(port) = &self.local_business {
            let phone = contact.get_non_empty(ContactField::Phone);
            if company_name.is_some() || phone.is_some() {
                let query = BusinessQuery {
                    name: company_name.map(str::to_string),
                    phone: phone.map(str::to_string),
                    location: contact
                        .get_non_empty(ContactField::Location)
                        .map(str::to_string),
                };
                details.business_data = Some(self.search_business(port.as_ref(), &query).await);
            }
        }

        if self.config.include_social_profiles {
            let first = contact.get_non_empty(ContactField::FirstName);
            let last = contact.get_non_empty(ContactField::LastName);
            if let (Some(first), Some(last), Some(_)) = (first, last, company_name) {
                details.social_profiles = Some(self.enrich_social(first, last).await);
            }
        }

        let sources = details.sources();
        let attributes = EnrichmentAttributes::from_details(&details);
        info!(
            sources = sources.len(),
            "contact enriched"
        );
        EnrichmentOutcome {
            success: true,
            contact: EnrichedContact {
                contact: contact.clone(),
                attributes,
                enriched_at: Some(Utc::now()),
                sources,
            },
            details,
            error: None,
        }
    }

    /// Up to three independent sub-lookups. Each failure is appended to
    /// the partial result's error field; none of them aborts the others.
    async fn enrich_company(&self, name: Option<&str>, domain: Option<&str>) -> CompanyData {
        let mut data = CompanyData::default();
        let mut failures: Vec<String> = Vec::new();

        if let (Some(domain), Some(whois)) = (domain, &self.whois) {
            match self.limiter.try_acquire(WHOIS_SOURCE).await {
                Ok(()) => match whois.domain_info(domain).await {
                    Ok(info) => {
                        data.company_age_years = info.age_years;
                        data.domain_info = Some(info);
                    }
                    Err(e) => {
                        warn!(target: "enrich::whois", domain, error = %e, "whois lookup failed");
                        failures.push(format!("whois: {e}"));
                    }
                },
                Err(e) => failures.push(format!("whois: {e}")),
            }
        }

        if let (Some(name), Some(directory)) = (name, &self.company_directory) {
            match self.limiter.try_acquire(COMPANY_DIRECTORY_SOURCE).await {
                Ok(()) => match directory.search(name).await {
                    Ok(Some(profile)) => data.profile = Some(profile),
                    Ok(None) => debug!(target: "enrich::directory", name, "no directory match"),
                    Err(e) => {
                        warn!(target: "enrich::directory", name, error = %e, "directory search failed");
                        failures.push(format!("company directory: {e}"));
                    }
                },
                Err(e) => failures.push(format!("company directory: {e}")),
            }
        }

        if let (Some(domain), Some(scraper)) = (domain, &self.web_scraper) {
            match self.limiter.try_acquire(WEB_SCRAPER_SOURCE).await {
                Ok(()) => match scraper.scrape_site(domain).await {
                    Ok(info) => data.website_info = Some(info),
                    Err(e) => {
                        warn!(target: "enrich::scrape", domain, error = %e, "website scrape failed");
                        failures.push(format!("website scrape: {e}"));
                    }
                },
                Err(e) => failures.push(format!("website scrape: {e}")),
            }
        }

        if !failures.is_empty() {
            data.error = Some(failures.join("; "));
        }
        data
    }

    async fn search_business(
        &self,
        port: &dyn LocalBusinessPort,
        query: &BusinessQuery,
    ) -> BusinessData {
        let result = match self.limiter.try_acquire(LOCAL_BUSINESS_SOURCE).await {
            Ok(()) => port.search(query).await,
            Err(limited) => Err(limited),
        };
        match result {
            Ok(listing) => BusinessData {
                listing,
                error: None,
            },
            Err(e) => {
                warn!(target: "enrich::business", error = %e, "local business search failed");
                BusinessData {
                    listing: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// The URL itself is pure string construction and always produced;
    /// verification happens only when a scraping collaborator is wired in.
    async fn enrich_social(&self, first: &str, last: &str) -> SocialProfiles {
        let url = format!(
            "https://www.linkedin.com/in/{}/",
            linkedin_username(first, last)
        );
        let mut profiles = SocialProfiles {
            linkedin_url: Some(url.clone()),
            linkedin_verified: None,
        };
        if let Some(scraper) = &self.web_scraper {
            let result = match self.limiter.try_acquire(WEB_SCRAPER_SOURCE).await {
                Ok(()) => scraper.probe_url(&url).await,
                Err(limited) => Err(limited),
            };
            match result {
                Ok(found) => profiles.linkedin_verified = Some(found),
                Err(e) => {
                    warn!(target: "enrich::social", url, error = %e, "profile verification failed")
                }
            }
        }
        profiles
    }
}

/// Company domain derived from the contact's email address. Consumer mail
/// hosts are skipped since they say nothing about the employer.
pub fn derive_company_domain(contact: &NormalizedContact) -> Option<String> {
    let email = contact.get_non_empty(ContactField::Email)?;
    let domain = email_domain(email)?;
    if FREE_MAIL_PROVIDERS.contains(&domain.as_str()) {
        None
    } else {
        Some(domain)
    }
}

/// Lowercased letters-only `first-last` slug. Several username patterns
/// are plausible; only this most common one is emitted.
pub fn linkedin_username(first: &str, last: &str) -> String {
    fn letters(s: &str) -> String {
        s.to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase())
            .collect()
    }
    format!("{}-{}", letters(first), letters(last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::LookupError;
    use async_trait::async_trait;

    fn contact(pairs: &[(ContactField, &str)]) -> NormalizedContact {
        let mut c = NormalizedContact::new();
        for (field, value) in pairs {
            c.set(*field, *value);
        }
        c
    }

    struct StubValidator {
        fail: bool,
    }

    #[async_trait]
    impl EmailValidatorPort for StubValidator {
        async fn validate(&self, _email: &str) -> Result<EmailValidation, LookupError> {
            if self.fail {
                Err(LookupError::Request("connect timeout".to_string()))
            } else {
                Ok(EmailValidation {
                    valid: Some(true),
                    deliverable: Some(true),
                    reason: "accepted".to_string(),
                    risk_score: Some(0.1),
                    provider: Some("stub".to_string()),
                    error: None,
                })
            }
        }
    }

    struct StubWhois {
        fail: bool,
    }

    #[async_trait]
    impl WhoisPort for StubWhois {
        async fn domain_info(&self, _domain: &str) -> Result<DomainInfo, LookupError> {
            if self.fail {
                Err(LookupError::Response("whois 500".to_string()))
            } else {
                Ok(DomainInfo {
                    created_date: Some("2010-03-01".to_string()),
                    registrar: Some("Example Registrar".to_string()),
                    age_years: Some(14),
                    ..DomainInfo::default()
                })
            }
        }
    }

    struct StubDirectory;

    #[async_trait]
    impl CompanyDirectoryPort for StubDirectory {
        async fn search(&self, _name: &str) -> Result<Option<CompanyProfile>, LookupError> {
            Ok(Some(CompanyProfile {
                employee_count: Some(250),
                industry: Some("Software".to_string()),
                ..CompanyProfile::default()
            }))
        }
    }

    struct StubBusiness;

    #[async_trait]
    impl LocalBusinessPort for StubBusiness {
        async fn search(
            &self,
            _query: &BusinessQuery,
        ) -> Result<Option<BusinessListing>, LookupError> {
            Ok(Some(BusinessListing {
                rating: Some(4.5),
                reviews_count: Some(120),
                ..BusinessListing::default()
            }))
        }
    }

    struct StubScraper {
        found: bool,
    }

    #[async_trait]
    impl WebScraperPort for StubScraper {
        async fn scrape_site(&self, _domain: &str) -> Result<WebsiteInfo, LookupError> {
            Ok(WebsiteInfo {
                page_title: Some("Acme".to_string()),
                ..WebsiteInfo::default()
            })
        }

        async fn probe_url(&self, _url: &str) -> Result<bool, LookupError> {
            Ok(self.found)
        }
    }

    fn bare_enricher() -> ContactEnricher {
        ContactEnricher::new(SourceRateLimiter::unlimited())
    }

    #[tokio::test]
    async fn missing_email_is_a_failure_outcome() {
        let enricher = bare_enricher();
        let outcome = enricher
            .enrich_contact(&contact(&[(ContactField::CompanyName, "Acme")]))
            .await;
        assert!(!outcome.success);
        assert!(outcome.error.as_deref().unwrap().contains("email"));
        assert!(outcome.contact.sources.is_empty());
        assert!(outcome.contact.enriched_at.is_none());
    }

    #[tokio::test]
    async fn empty_email_fails_the_precondition_too() {
        let enricher = bare_enricher();
        let outcome = enricher
            .enrich_contact(&contact(&[(ContactField::Email, "")]))
            .await;
        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn validation_failure_does_not_fail_the_contact() {
        let enricher =
            bare_enricher().with_email_validator(Arc::new(StubValidator { fail: true }));
        let outcome = enricher
            .enrich_contact(&contact(&[(ContactField::Email, "anna@acme.io")]))
            .await;
        assert!(outcome.success);
        let validation = outcome.details.email_validation.as_ref().unwrap();
        assert_eq!(validation.reason, "validation_failed");
        assert_eq!(validation.valid, None);
        assert!(validation.error.as_deref().unwrap().contains("connect timeout"));
        assert_eq!(outcome.contact.attributes.email_valid, None);
    }

    #[tokio::test]
    async fn whois_failure_leaves_directory_data_intact() {
        let enricher = bare_enricher()
            .with_whois(Arc::new(StubWhois { fail: true }))
            .with_company_directory(Arc::new(StubDirectory));
        let outcome = enricher
            .enrich_contact(&contact(&[
                (ContactField::Email, "anna@acme.io"),
                (ContactField::CompanyName, "Acme"),
            ]))
            .await;
        assert!(outcome.success);
        let company = outcome.details.company_enrichment.as_ref().unwrap();
        assert!(company.error.as_deref().unwrap().contains("whois"));
        assert_eq!(
            company.profile.as_ref().unwrap().employee_count,
            Some(250)
        );
        assert_eq!(outcome.contact.attributes.company_size.as_deref(), Some("250"));
        assert_eq!(outcome.contact.attributes.industry.as_deref(), Some("Software"));
    }

    #[tokio::test]
    async fn free_mail_domain_is_not_a_company_domain() {
        let c = contact(&[(ContactField::Email, "anna@gmail.com")]);
        assert_eq!(derive_company_domain(&c), None);

        let c = contact(&[(ContactField::Email, "anna@acme.io")]);
        assert_eq!(derive_company_domain(&c), Some("acme.io".to_string()));
    }

    #[tokio::test]
    async fn company_gate_needs_a_name_or_derived_domain() {
        // Free-mail address and no company name: the company source must
        // not run even with collaborators wired in.
        let enricher = bare_enricher()
            .with_whois(Arc::new(StubWhois { fail: false }))
            .with_company_directory(Arc::new(StubDirectory));
        let outcome = enricher
            .enrich_contact(&contact(&[(ContactField::Email, "anna@gmail.com")]))
            .await;
        assert!(outcome.success);
        assert!(outcome.details.company_enrichment.is_none());
    }

    #[tokio::test]
    async fn company_source_records_even_without_collaborators() {
        let enricher = bare_enricher();
        let outcome = enricher
            .enrich_contact(&contact(&[
                (ContactField::Email, "anna@gmail.com"),
                (ContactField::CompanyName, "Acme"),
            ]))
            .await;
        assert!(outcome.success);
        let company = outcome.details.company_enrichment.as_ref().unwrap();
        assert_eq!(*company, CompanyData::default());
        assert_eq!(
            outcome.contact.sources,
            vec![EnrichmentSource::CompanyEnrichment]
        );
    }

    #[tokio::test]
    async fn social_needs_first_last_and_company() {
        let enricher = bare_enricher();
        let outcome = enricher
            .enrich_contact(&contact(&[
                (ContactField::Email, "anna@acme.io"),
                (ContactField::FirstName, "Anna"),
                (ContactField::LastName, "Smith"),
            ]))
            .await;
        assert!(outcome.details.social_profiles.is_none());

        let outcome = enricher
            .enrich_contact(&contact(&[
                (ContactField::Email, "anna@acme.io"),
                (ContactField::FirstName, "Anna"),
                (ContactField::LastName, "Smith"),
                (ContactField::CompanyName, "Acme"),
            ]))
            .await;
        let social = outcome.details.social_profiles.as_ref().unwrap();
        assert_eq!(
            social.linkedin_url.as_deref(),
            Some("https://www.linkedin.com/in/anna-smith/")
        );
        assert_eq!(social.linkedin_verified, None);
    }

    #[tokio::test]
    async fn social_url_is_verified_when_a_scraper_is_wired() {
        let enricher = bare_enricher().with_web_scraper(Arc::new(StubScraper { found: true }));
        let outcome = enricher
            .enrich_contact(&contact(&[
                (ContactField::Email, "anna@acme.io"),
                (ContactField::FirstName, "Anna"),
                (ContactField::LastName, "Smith"),
                (ContactField::CompanyName, "Acme"),
            ]))
            .await;
        let social = outcome.details.social_profiles.as_ref().unwrap();
        assert_eq!(social.linkedin_verified, Some(true));
        assert_eq!(
            outcome.contact.attributes.linkedin_verified,
            Some(true)
        );
    }

    #[tokio::test]
    async fn rate_limited_validation_is_recorded_as_failed() {
        let limiter = SourceRateLimiter::new(RateLimitConfig {
            max_calls: 1,
            window: tokio::time::Duration::from_secs(60),
        });
        let enricher = ContactEnricher::new(limiter)
            .with_email_validator(Arc::new(StubValidator { fail: false }));
        let first = enricher
            .enrich_contact(&contact(&[(ContactField::Email, "a@acme.io")]))
            .await;
        assert_eq!(
            first.details.email_validation.as_ref().unwrap().valid,
            Some(true)
        );
        let second = enricher
            .enrich_contact(&contact(&[(ContactField::Email, "b@acme.io")]))
            .await;
        assert!(second.success);
        let validation = second.details.email_validation.as_ref().unwrap();
        assert_eq!(validation.reason, "validation_failed");
        assert!(validation.error.as_deref().unwrap().contains("rate limit"));
    }

    #[tokio::test]
    async fn full_stack_merges_every_source() {
        let enricher = bare_enricher()
            .with_email_validator(Arc::new(StubValidator { fail: false }))
            .with_whois(Arc::new(StubWhois { fail: false }))
            .with_company_directory(Arc::new(StubDirectory))
            .with_local_business(Arc::new(StubBusiness))
            .with_web_scraper(Arc::new(StubScraper { found: false }));
        let outcome = enricher
            .enrich_contact(&contact(&[
                (ContactField::Email, "anna@acme.io"),
                (ContactField::FirstName, "Anna"),
                (ContactField::LastName, "Smith"),
                (ContactField::CompanyName, "Acme"),
                (ContactField::Phone, "555-0100"),
                (ContactField::Location, "Seattle"),
            ]))
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.contact.sources.len(), 4);
        assert!(outcome.contact.enriched_at.is_some());
        let attrs = &outcome.contact.attributes;
        assert_eq!(attrs.email_valid, Some(true));
        assert_eq!(attrs.company_age_years, Some(14));
        assert_eq!(attrs.business_rating, Some(4.5));
        assert_eq!(attrs.linkedin_verified, Some(false));
        assert_eq!(
            attrs.website_info.as_ref().unwrap().page_title.as_deref(),
            Some("Acme")
        );
        // The base contact itself is never mutated by enrichment.
        assert_eq!(
            outcome.contact.contact.get(ContactField::CompanyName),
            Some("Acme")
        );
    }

    #[test]
    fn username_slug_strips_non_letters() {
        assert_eq!(linkedin_username("Anna", "Smith"), "anna-smith");
        assert_eq!(linkedin_username("Mary Anne", "O'Brien"), "maryanne-obrien");
        assert_eq!(linkedin_username("Jean-Luc", "Picard2"), "jeanluc-picard");
    }
}
