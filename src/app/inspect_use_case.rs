use crate::common::error::Result;
use crate::common::types::FieldMapping;
use crate::pipeline::ingestion::fetch::FileFetcher;
use crate::pipeline::processing::parser::{self, ParsedTable};
use crate::pipeline::processing::quality::{self, DataQualityReport};
use crate::pipeline::processing::schema::{self, ColumnTypeMap};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Facts about the upload itself, separate from what was inferred.
#[derive(Debug, Clone, Serialize)]
pub struct FileMetadata {
    pub file_name: String,
    pub size_bytes: u64,
    pub column_count: usize,
    pub total_row_count: u64,
    pub parsed_at: DateTime<Utc>,
}

/// Everything the upload preview shows: the sampled table, per-column
/// types, the suggested mapping, and the quality verdict.
#[derive(Debug, Clone, Serialize)]
pub struct FileInspection {
    pub metadata: FileMetadata,
    pub table: ParsedTable,
    pub column_types: ColumnTypeMap,
    pub suggested_mapping: FieldMapping,
    pub quality: DataQualityReport,
}

/// Use case for previewing an upload before committing to enrichment.
/// Runs the read-only half of the pipeline: fetch, parse, infer, assess.
pub struct InspectFileUseCase {
    fetcher: FileFetcher,
}

impl InspectFileUseCase {
    pub fn new(fetcher: FileFetcher) -> Self {
        Self { fetcher }
    }

    pub async fn inspect(&self, location: &str) -> Result<FileInspection> {
        let stored = self.fetcher.fetch(location).await?;
        let table = parser::parse(&stored.text)?;
        let column_types = schema::infer_types(&table);
        let suggested_mapping = schema::suggest_mapping(&table.headers);
        let quality = quality::assess(&table);

        info!(
            file_name = %stored.file_name,
            columns = table.column_count(),
            rows = table.total_row_count,
            score = quality.overall_score,
            "file inspected"
        );
        let metadata = FileMetadata {
            file_name: stored.file_name,
            size_bytes: stored.size_bytes,
            column_count: table.column_count(),
            total_row_count: table.total_row_count,
            parsed_at: Utc::now(),
        };
        Ok(FileInspection {
            metadata,
            table,
            column_types,
            suggested_mapping,
            quality,
        })
    }
}
