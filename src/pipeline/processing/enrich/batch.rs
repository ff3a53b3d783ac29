use crate::common::error::{EnricherError, Result};
use crate::common::types::NormalizedContact;
use crate::pipeline::processing::enrich::{ContactEnricher, EnrichmentOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Chunking knobs for a batch run, validated at construction so a zero
/// batch size can never reach the chunking loop.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub batch_size: usize,
    pub batch_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            batch_delay: Duration::from_millis(1000),
        }
    }
}

impl BatchConfig {
    pub fn new(batch_size: usize, batch_delay: Duration) -> Result<Self> {
        if batch_size == 0 {
            return Err(EnricherError::Config(
                "batch_size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            batch_size,
            batch_delay,
        })
    }
}

/// One contact that did not produce an enrichment. `index` is the
/// position in the submitted input, so callers can line errors back up
/// with their source rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    pub index: usize,
    pub contact: NormalizedContact,
    pub error: String,
}

/// Result of a whole run. `outcomes` holds successes only; everything
/// else lands in `errors`. Together they account for every submitted
/// contact exactly once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResult {
    pub outcomes: Vec<EnrichmentOutcome>,
    pub errors: Vec<BatchError>,
    pub total_processed: usize,
    pub total_errors: usize,
}

/// Drives the enricher over a whole dataset: contacts are processed in
/// chunks, each chunk fanned out concurrently, with a pause between
/// chunks to stay polite to the upstream APIs.
pub struct BatchRunner {
    enricher: Arc<ContactEnricher>,
    config: BatchConfig,
}

impl BatchRunner {
    pub fn new(enricher: Arc<ContactEnricher>, config: BatchConfig) -> Self {
        Self { enricher, config }
    }

    /// Enrich every contact. Infallible by construction: per-contact
    /// problems, including a panicking task, become `BatchError` entries
    /// instead of aborting the run.
    #[instrument(skip(self, contacts))]
    pub async fn enrich_batch(&self, contacts: Vec<NormalizedContact>) -> BatchResult {
        let run_id = Uuid::new_v4();
        let total = contacts.len();
        let chunk_count = total.div_ceil(self.config.batch_size.max(1));
        info!(
            %run_id,
            contacts = total,
            chunks = chunk_count,
            batch_size = self.config.batch_size,
            "starting enrichment run"
        );

        let mut result = BatchResult::default();
        let chunks: Vec<Vec<NormalizedContact>> = contacts
            .chunks(self.config.batch_size.max(1))
            .map(|c| c.to_vec())
            .collect();
        let last_chunk = chunks.len().saturating_sub(1);
        let mut next_index = 0usize;

        for (chunk_no, chunk) in chunks.into_iter().enumerate() {
            debug!(%run_id, chunk = chunk_no + 1, size = chunk.len(), "processing chunk");

            let mut handles = Vec::with_capacity(chunk.len());
            for contact in chunk {
                let index = next_index;
                next_index += 1;
                let enricher = Arc::clone(&self.enricher);
                let task_contact = contact.clone();
                let handle =
                    tokio::spawn(async move { enricher.enrich_contact(&task_contact).await });
                handles.push((index, contact, handle));
            }

            // Awaiting handles in spawn order keeps outcomes aligned with
            // the input even though the tasks run concurrently.
            for (index, contact, handle) in handles {
                match handle.await {
                    Ok(outcome) if outcome.success => result.outcomes.push(outcome),
                    Ok(outcome) => {
                        let error = outcome
                            .error
                            .unwrap_or_else(|| "enrichment failed".to_string());
                        result.errors.push(BatchError {
                            index,
                            contact: outcome.contact.contact,
                            error,
                        });
                    }
                    Err(join_error) => {
                        warn!(%run_id, index, error = %join_error, "enrichment task aborted");
                        result.errors.push(BatchError {
                            index,
                            contact,
                            error: format!("enrichment task aborted: {join_error}"),
                        });
                    }
                }
            }

            if chunk_no < last_chunk && !self.config.batch_delay.is_zero() {
                tokio::time::sleep(self.config.batch_delay).await;
            }
        }

        result.total_processed = result.outcomes.len();
        result.total_errors = result.errors.len();
        info!(
            %run_id,
            enriched = result.total_processed,
            failed = result.total_errors,
            "enrichment run finished"
        );
        result
    }
}
