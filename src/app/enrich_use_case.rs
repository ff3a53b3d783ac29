use crate::common::error::{EnricherError, Result};
use crate::common::types::FieldMapping;
use crate::pipeline::ingestion::fetch::FileFetcher;
use crate::pipeline::processing::enrich::BatchRunner;
use crate::pipeline::processing::normalize;
use crate::pipeline::processing::parser;
use crate::pipeline::processing::schema;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// Record of one end-to-end enrichment run.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub job_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub contacts_in: usize,
    pub result: crate::pipeline::processing::enrich::BatchResult,
}

/// Use case for the whole pipeline: fetch, parse, map, normalize, then
/// hand the contacts to the batch runner. Mapping comes from the caller
/// when they reviewed the preview, otherwise from header inference.
pub struct EnrichFileUseCase {
    fetcher: FileFetcher,
    runner: BatchRunner,
    max_records_per_batch: usize,
}

impl EnrichFileUseCase {
    pub fn new(fetcher: FileFetcher, runner: BatchRunner, max_records_per_batch: usize) -> Self {
        Self {
            fetcher,
            runner,
            max_records_per_batch,
        }
    }

    pub async fn run(
        &self,
        location: &str,
        mapping_override: Option<FieldMapping>,
    ) -> Result<JobReport> {
        let job_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%job_id, location, "starting enrichment job");

        let stored = self.fetcher.fetch(location).await?;
        let table = parser::parse(&stored.text)?;
        let mapping = match mapping_override {
            Some(m) => {
                info!(%job_id, fields = m.len(), "using caller-supplied mapping");
                m
            }
            None => {
                let m = schema::suggest_mapping(&table.headers);
                info!(%job_id, fields = m.len(), "using inferred mapping");
                m
            }
        };

        let rows = parser::data_rows(&stored.text, &table);
        let contacts = normalize::normalize(&rows, &mapping)?;
        if contacts.is_empty() {
            return Err(EnricherError::FileRejected(format!(
                "{} contains no data rows to enrich",
                stored.file_name
            )));
        }
        if contacts.len() > self.max_records_per_batch {
            return Err(EnricherError::FileRejected(format!(
                "{} has {} contacts, over the {} record limit",
                stored.file_name,
                contacts.len(),
                self.max_records_per_batch
            )));
        }

        let contacts_in = contacts.len();
        let result = self.runner.enrich_batch(contacts).await;
        if result.total_errors > 0 {
            warn!(%job_id, errors = result.total_errors, "job finished with failed contacts");
        }
        Ok(JobReport {
            job_id,
            started_at,
            finished_at: Utc::now(),
            contacts_in,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::{FileStorePort, StoredFile};
    use crate::common::types::ContactField;
    use crate::pipeline::ingestion::fetch::FetchConfig;
    use crate::pipeline::processing::enrich::{
        BatchConfig, ContactEnricher, SourceRateLimiter,
    };
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct InMemoryStore {
        text: &'static str,
    }

    #[async_trait]
    impl FileStorePort for InMemoryStore {
        async fn fetch(&self, location: &str) -> Result<StoredFile> {
            Ok(StoredFile {
                text: self.text.to_string(),
                size_bytes: self.text.len() as u64,
                file_name: location.to_string(),
            })
        }
    }

    fn use_case(text: &'static str, max_records: usize) -> EnrichFileUseCase {
        let fetcher = FileFetcher::new(Arc::new(InMemoryStore { text }), FetchConfig::default());
        let runner = BatchRunner::new(
            Arc::new(ContactEnricher::new(SourceRateLimiter::unlimited())),
            BatchConfig {
                batch_size: 2,
                batch_delay: Duration::from_millis(0),
            },
        );
        EnrichFileUseCase::new(fetcher, runner, max_records)
    }

    #[tokio::test]
    async fn test_run_enriches_every_mapped_row() {
        let report = use_case(
            "email,first_name\n\
             anna@acme.io,Anna\n\
             bo@beta.org,Bo\n\
             cy@gamma.net,Cy\n",
            100,
        )
        .run("contacts.csv", None)
        .await
        .unwrap();

        assert_eq!(report.contacts_in, 3);
        assert_eq!(report.result.total_processed, 3);
        assert_eq!(report.result.total_errors, 0);
        assert!(report.finished_at >= report.started_at);
        let first = &report.result.outcomes[0].contact.contact;
        assert_eq!(first.get(ContactField::Email), Some("anna@acme.io"));
    }

    #[tokio::test]
    async fn test_missing_email_rows_land_in_errors() {
        let report = use_case(
            "email,first_name\n\
             anna@acme.io,Anna\n\
             ,NoMail\n",
            100,
        )
        .run("contacts.csv", None)
        .await
        .unwrap();

        assert_eq!(report.contacts_in, 2);
        assert_eq!(report.result.total_processed, 1);
        assert_eq!(report.result.total_errors, 1);
        assert_eq!(report.result.errors[0].index, 1);
    }

    #[tokio::test]
    async fn test_caller_mapping_overrides_inference() {
        let mut mapping = FieldMapping::new();
        mapping.insert(ContactField::Email, "contact");
        let report = use_case("contact,first_name\na@b.co,Anna\n", 100)
            .run("contacts.csv", Some(mapping))
            .await
            .unwrap();
        assert_eq!(report.result.total_processed, 1);
        let contact = &report.result.outcomes[0].contact.contact;
        assert_eq!(contact.get(ContactField::Email), Some("a@b.co"));
        // first_name was not in the caller's mapping, so it is absent.
        assert_eq!(contact.get(ContactField::FirstName), None);
    }

    #[tokio::test]
    async fn test_unmappable_headers_fail_before_enrichment() {
        let err = use_case("colour,shape\nred,square\n", 100)
            .run("things.csv", None)
            .await
            .unwrap_err();
        assert!(matches!(err, EnricherError::Normalization(_)));
    }

    #[tokio::test]
    async fn test_header_only_files_are_rejected() {
        let err = use_case("email,first_name\n", 100)
            .run("contacts.csv", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no data rows"));
    }

    #[tokio::test]
    async fn test_record_limit_is_enforced() {
        let err = use_case(
            "email\na@x.co\nb@x.co\nc@x.co\n",
            2,
        )
        .run("contacts.csv", None)
        .await
        .unwrap_err();
        assert!(err.to_string().contains("over the 2 record limit"));
    }
}
