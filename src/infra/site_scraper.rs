use crate::app::ports::{LookupResult, WebScraperPort, WebsiteInfo};
use crate::infra::api_client::ApiClient;
use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::debug;

/// Fetches a company homepage and pulls the handful of elements that
/// describe the business. HTML parsing stays in sync helpers so the
/// document never lives across an await.
pub struct SiteScraper {
    client: ApiClient,
}

impl SiteScraper {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WebScraperPort for SiteScraper {
    async fn scrape_site(&self, domain: &str) -> LookupResult<WebsiteInfo> {
        let url = format!("https://{domain}");
        debug!(url, "scraping company site");
        let html = self.client.get_text(&url).await?;
        Ok(extract_site_info(&html))
    }

    async fn probe_url(&self, url: &str) -> LookupResult<bool> {
        self.client.probe(url).await
    }
}

fn extract_site_info(html: &str) -> WebsiteInfo {
    let doc = Html::parse_document(html);
    WebsiteInfo {
        page_title: select_text(&doc, "title"),
        meta_description: select_attr(&doc, "meta[name=\"description\"]", "content"),
        main_heading: select_text(&doc, "h1"),
        about_text: select_text(&doc, ".about, #about"),
    }
}

fn select_text(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).unwrap();
    doc.select(&sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn select_attr(doc: &Html, selector: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(selector).unwrap();
    doc.select(&sel)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
