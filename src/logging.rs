use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Sets up tracing with a JSON file log and a human-readable console log.
///
/// Console output goes to stderr; stdout is reserved for inspection
/// reports and the enrichment summary.
pub fn init_logging() {
    let _ = fs::create_dir_all("logs");

    // Daily-rotated JSON log under logs/, written off the hot path.
    let file_appender = tracing_appender::rolling::daily("logs", "enricher.log");
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);

    let console_layer = fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("contact_enricher=info".parse().unwrap()),
        )
        .with(file_layer)
        .with(console_layer)
        .init();

    // The appender guard must outlive main or buffered logs are dropped.
    std::mem::forget(_guard);
}
