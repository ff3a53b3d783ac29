// Pipeline ingestion: file retrieval and pre-parse admission checks

pub mod fetch;

pub use fetch::{FetchConfig, FileFetcher};
