// Data processing pipeline: ingestion and processing stages

pub mod ingestion;
pub mod processing;

// Re-export key types and functions from each stage
pub use processing::parser;
