// Infrastructure adapters: concrete implementations of the app-layer
// ports plus the HTTP plumbing they share.

pub mod api_client;
pub mod company_directory_api;
pub mod email_validation_api;
pub mod factory;
pub mod file_store;
pub mod local_business_api;
pub mod site_scraper;
pub mod whois_api;

pub use api_client::{ApiClient, RetryConfig};
pub use factory::{build_enricher, file_store_for};
pub use file_store::{HttpFileStore, LocalFileStore};
