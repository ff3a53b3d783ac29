use crate::app::ports::{FileStorePort, StoredFile};
use crate::common::constants::{SPREADSHEET_EXTENSIONS, SUPPORTED_EXTENSIONS};
use crate::common::error::{EnricherError, Result};
use std::sync::Arc;
use tracing::{debug, info};

const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// Admission limits applied before a file reaches the parser.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub max_file_size_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
        }
    }
}

/// Front door of the pipeline: retrieves a file through the store port
/// and rejects anything the parser should never see. The extension check
/// runs on the location alone so unsupported uploads fail before any
/// bytes move.
pub struct FileFetcher {
    store: Arc<dyn FileStorePort>,
    config: FetchConfig,
}

impl FileFetcher {
    pub fn new(store: Arc<dyn FileStorePort>, config: FetchConfig) -> Self {
        Self { store, config }
    }

    pub async fn fetch(&self, location: &str) -> Result<StoredFile> {
        check_extension(location)?;
        debug!(location, "fetching file");
        let file = self.store.fetch(location).await?;
        if file.size_bytes > self.config.max_file_size_bytes {
            return Err(EnricherError::FileRejected(format!(
                "{} is {} bytes, over the {} byte limit",
                file.file_name, file.size_bytes, self.config.max_file_size_bytes
            )));
        }
        info!(
            file_name = %file.file_name,
            size_bytes = file.size_bytes,
            "file accepted"
        );
        Ok(file)
    }
}

/// Admission check on the file name. Spreadsheet formats get a pointed
/// message since users hit that case constantly; everything else not on
/// the allow-list gets the generic one.
pub fn check_extension(location: &str) -> Result<()> {
    let ext = file_extension(location);
    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Ok(());
    }
    if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
        return Err(EnricherError::FileRejected(format!(
            ".{ext} spreadsheets are not supported; export the sheet as CSV and upload that"
        )));
    }
    Err(EnricherError::FileRejected(format!(
        "unsupported file type: {ext}; upload a .csv or .txt file"
    )))
}

/// Lowercased text after the last dot of the last path segment. Query
/// strings and fragments are stripped first so signed URLs check the
/// same as plain paths. A name with no dot yields the whole name, which
/// then fails the allow-list with a readable message.
fn file_extension(location: &str) -> String {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or(location);
    let segment = path.rsplit('/').next().unwrap_or(path);
    segment
        .rsplit('.')
        .next()
        .unwrap_or(segment)
        .to_lowercase()
}
