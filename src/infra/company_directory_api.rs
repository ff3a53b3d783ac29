use crate::app::ports::{CompanyDirectoryPort, CompanyProfile, LookupError, LookupResult};
use crate::common::constants::COMPANY_DIRECTORY_SOURCE;
use crate::infra::api_client::ApiClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// B2B directory lookup. Only the best match is requested; the caller
/// treats an empty result set as "company unknown".
pub struct CompanyDirectoryApi {
    client: ApiClient,
    key: Option<String>,
    base_url: Option<String>,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    company_name: &'a str,
    limit: u32,
}

#[derive(Deserialize)]
struct SearchResponse {
    results: Option<Vec<DirectoryCompany>>,
}

#[derive(Deserialize)]
struct DirectoryCompany {
    employee_count: Option<u64>,
    industry: Option<String>,
    annual_revenue: Option<f64>,
    description: Option<String>,
    headquarters: Option<String>,
    founded_year: Option<i32>,
    technologies: Option<Vec<String>>,
}

impl CompanyDirectoryApi {
    pub fn new(client: ApiClient, key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            client,
            key,
            base_url,
        }
    }
}

#[async_trait]
impl CompanyDirectoryPort for CompanyDirectoryApi {
    async fn search(&self, company_name: &str) -> LookupResult<Option<CompanyProfile>> {
        let key = self
            .key
            .as_deref()
            .ok_or(LookupError::NotConfigured(COMPANY_DIRECTORY_SOURCE))?;
        let base = self
            .base_url
            .as_deref()
            .ok_or(LookupError::NotConfigured(COMPANY_DIRECTORY_SOURCE))?;
        let url = format!("{}/company/search", base.trim_end_matches('/'));
        debug!(company_name, "searching company directory");
        let resp: SearchResponse = self
            .client
            .post_json(
                &url,
                Some(key),
                &SearchRequest {
                    company_name,
                    limit: 1,
                },
            )
            .await?;
        let company = match resp.results.unwrap_or_default().into_iter().next() {
            Some(c) => c,
            None => return Ok(None),
        };
        Ok(Some(CompanyProfile {
            employee_count: company.employee_count,
            industry: company.industry,
            annual_revenue: company.annual_revenue,
            description: company.description,
            headquarters: company.headquarters,
            founded_year: company.founded_year,
            technologies: company.technologies.unwrap_or_default(),
        }))
    }
}
