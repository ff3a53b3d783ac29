use thiserror::Error;

/// Top-level error type for the enrichment pipeline.
#[derive(Error, Debug)]
pub enum EnricherError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File rejected: {0}")]
    FileRejected(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),
}

/// Reasons an uploaded file cannot be tokenized at all. Fatal to the
/// parse call; callers reject the file before any enrichment starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("file has no content to parse")]
    EmptyInput,

    #[error("no column headers found on the first line")]
    NoHeaders,
}

/// Precondition failures when projecting rows onto the canonical schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("column mapping has no entries; at least one field must be mapped")]
    EmptyMapping,
}

pub type Result<T> = std::result::Result<T, EnricherError>;
