use crate::app::ports::{BusinessListing, BusinessQuery, LocalBusinessPort, LookupError, LookupResult};
use crate::common::constants::LOCAL_BUSINESS_SOURCE;
use crate::infra::api_client::ApiClient;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

const ENDPOINT: &str = "https://api.localbusinessdata.com/search";

/// Listing search keyed on whatever parts of the query the contact
/// actually supplied.
pub struct LocalBusinessApi {
    client: ApiClient,
    key: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    results: Option<Vec<ListingPayload>>,
}

#[derive(Deserialize)]
struct ListingPayload {
    rating: Option<f64>,
    reviews_count: Option<u64>,
    hours: Option<String>,
    address: Option<String>,
    website: Option<String>,
    categories: Option<Vec<String>>,
}

impl LocalBusinessApi {
    pub fn new(client: ApiClient, key: Option<String>) -> Self {
        Self { client, key }
    }
}

fn search_url(query: &BusinessQuery) -> LookupResult<Url> {
    let mut params: Vec<(&str, &str)> = Vec::new();
    if let Some(name) = query.name.as_deref() {
        params.push(("query", name));
    }
    if let Some(phone) = query.phone.as_deref() {
        params.push(("phone", phone));
    }
    if let Some(location) = query.location.as_deref() {
        params.push(("location", location));
    }
    Url::parse_with_params(ENDPOINT, &params).map_err(|e| LookupError::Request(e.to_string()))
}

#[async_trait]
impl LocalBusinessPort for LocalBusinessApi {
    async fn search(&self, query: &BusinessQuery) -> LookupResult<Option<BusinessListing>> {
        let key = self
            .key
            .as_deref()
            .ok_or(LookupError::NotConfigured(LOCAL_BUSINESS_SOURCE))?;
        let url = search_url(query)?;
        debug!(url = %url, "searching local business data");
        let resp: SearchResponse = self.client.get_json(url.as_str(), Some(key)).await?;
        let listing = match resp.results.unwrap_or_default().into_iter().next() {
            Some(l) => l,
            None => return Ok(None),
        };
        Ok(Some(BusinessListing {
            rating: listing.rating,
            reviews_count: listing.reviews_count,
            hours: listing.hours,
            address: listing.address,
            website: listing.website,
            categories: listing.categories.unwrap_or_default(),
        }))
    }
}
