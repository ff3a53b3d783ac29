// Pipeline processing: parsing, inference, quality, normalization, and
// enrichment stages

pub mod enrich;
pub mod normalize;
pub mod parser;
pub mod quality;
pub mod schema;

// Re-export key types and functions
// (Currently no re-exports needed)
