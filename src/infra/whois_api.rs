use crate::app::ports::{DomainInfo, LookupError, LookupResult, WhoisPort};
use crate::common::constants::WHOIS_SOURCE;
use crate::infra::api_client::ApiClient;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::debug;
use url::Url;

const ENDPOINT: &str = "https://www.whoisxmlapi.com/whoisserver/WhoisService";
const DAYS_PER_YEAR: i64 = 365;

/// Domain registration lookup. The upstream wraps everything in a
/// `WhoisRecord` envelope with camelCase fields.
pub struct WhoisApi {
    client: ApiClient,
    key: Option<String>,
}

#[derive(Deserialize)]
struct WhoisResponse {
    #[serde(rename = "WhoisRecord")]
    whois_record: Option<WhoisRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WhoisRecord {
    created_date: Option<String>,
    updated_date: Option<String>,
    expires_date: Option<String>,
    registrar_name: Option<String>,
    name_servers: Option<NameServers>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NameServers {
    host_names: Option<Vec<String>>,
}

impl WhoisApi {
    pub fn new(client: ApiClient, key: Option<String>) -> Self {
        Self { client, key }
    }
}

#[async_trait]
impl WhoisPort for WhoisApi {
    async fn domain_info(&self, domain: &str) -> LookupResult<DomainInfo> {
        let key = self
            .key
            .as_deref()
            .ok_or(LookupError::NotConfigured(WHOIS_SOURCE))?;
        let url = Url::parse_with_params(
            ENDPOINT,
            &[
                ("apiKey", key),
                ("domainName", domain),
                ("outputFormat", "JSON"),
            ],
        )
        .map_err(|e| LookupError::Request(e.to_string()))?;
        debug!(domain, "looking up whois record");
        let resp: WhoisResponse = self.client.get_json(url.as_str(), None).await?;
        let record = resp.whois_record.ok_or_else(|| {
            LookupError::Response("whois reply carried no WhoisRecord".to_string())
        })?;

        let age_years = record
            .created_date
            .as_deref()
            .and_then(|created| floored_age_years(created, Utc::now()));
        Ok(DomainInfo {
            created_date: record.created_date,
            updated_date: record.updated_date,
            expires_date: record.expires_date,
            registrar: record.registrar_name,
            age_years,
            nameservers: record
                .name_servers
                .and_then(|ns| ns.host_names)
                .unwrap_or_default(),
        })
    }
}

/// Whole years since the registration date, floored. Registries report
/// the date in a few shapes, so parsing is lenient.
fn floored_age_years(created: &str, now: DateTime<Utc>) -> Option<u32> {
    let created = parse_registry_date(created)?;
    let days = (now - created).num_days();
    if days < 0 {
        return None;
    }
    u32::try_from(days / DAYS_PER_YEAR).ok()
}

fn parse_registry_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Some registrars omit the colon in the offset, e.g. "+0000".
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(
            date.and_hms_opt(0, 0, 0)?
                .and_utc(),
        );
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(date)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn age_is_floored_to_whole_years() {
        // Fifteen years and change.
        let age = floored_age_years("2010-06-15T00:00:00Z", at("2026-01-01T00:00:00Z"));
        assert_eq!(age, Some(15));

        // A few months shy of one year.
        let age = floored_age_years("2025-06-01T00:00:00Z", at("2026-01-01T00:00:00Z"));
        assert_eq!(age, Some(0));
    }

    #[test]
    fn registry_date_shapes_are_accepted() {
        assert!(parse_registry_date("1997-09-15T04:00:00Z").is_some());
        assert!(parse_registry_date("1997-09-15T04:00:00+0000").is_some());
        assert!(parse_registry_date("1997-09-15").is_some());
        assert!(parse_registry_date("last tuesday").is_none());
    }

    #[test]
    fn future_registration_yields_no_age() {
        let age = floored_age_years("2030-01-01", at("2026-01-01T00:00:00Z"));
        assert_eq!(age, None);
    }

    #[tokio::test]
    async fn missing_key_reports_not_configured() {
        let api = WhoisApi::new(ApiClient::new(Default::default()), None);
        let err = api.domain_info("acme.io").await.unwrap_err();
        assert_eq!(err, LookupError::NotConfigured(WHOIS_SOURCE));
    }
}
