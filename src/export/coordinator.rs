//! Export coordinator for orchestrating export runs
//!
//! Drains a streaming query to exhaustion, normalizes every hit and hands
//! the complete record list to a format writer. Retrieval is all-or-nothing:
//! if any request or hit fails, the output is never opened.

use std::time::Instant;

use futures::TryStreamExt;
use tracing::{debug, info};

use crate::error::Result;
use crate::record::{Article, RecordNormalizer};

use super::progress::ProgressTracker;
use super::streaming::{StreamingQuery, into_batches};
use super::writers::OpenWriter;

/// Result of an export run
#[derive(Debug)]
pub struct ExportResult {
    /// Number of records exported
    pub records_exported: u64,
    /// Number of non-empty batches retrieved
    pub batches: u32,
    /// Bytes written to the output
    pub bytes_written: u64,
    /// Time taken for the run
    pub elapsed_ms: u64,
}

/// State of a retrieval after each batch
#[derive(Debug, Clone, Copy)]
struct BatchProgress {
    batches: u32,
    records: usize,
    total_hits: Option<u64>,
}

/// Drain `query`, normalizing each batch in retrieval order
///
/// `on_batch` runs after every non-empty batch. The first error ends the
/// loop and the records gathered so far are dropped.
async fn collect_records<F>(
    query: Box<dyn StreamingQuery>,
    normalizer: &RecordNormalizer,
    mut on_batch: F,
) -> Result<(Vec<Article>, u32)>
where
    F: FnMut(BatchProgress),
{
    let mut stream = into_batches(query);
    let mut records = Vec::new();
    let mut batches = 0u32;

    while let Some(batch) = stream.try_next().await? {
        records.extend(normalizer.normalize_batch(&batch.hits)?);
        batches += 1;
        on_batch(BatchProgress {
            batches,
            records: records.len(),
            total_hits: batch.total_hits,
        });
    }

    Ok((records, batches))
}

/// Retrieve and normalize every record reachable through `query`
///
/// Records come back in retrieval order. On error the records gathered so
/// far are dropped and only the error is returned.
pub async fn retrieve_all(
    query: Box<dyn StreamingQuery>,
    normalizer: &RecordNormalizer,
) -> Result<Vec<Article>> {
    let (records, _) = collect_records(query, normalizer, |_| {}).await?;
    Ok(records)
}

/// Coordinator for export runs
///
/// Orchestrates the scroll, normalization, progress tracking and output.
pub struct ExportCoordinator {
    /// Streaming query for fetching hits
    query: Box<dyn StreamingQuery>,
    /// Normalizer turning hits into records
    normalizer: RecordNormalizer,
    /// Progress tracker for user feedback
    tracker: ProgressTracker,
    /// Opens the format writer once retrieval has succeeded
    open_writer: OpenWriter,
}

impl ExportCoordinator {
    /// Create a new export coordinator
    pub fn new(
        query: Box<dyn StreamingQuery>,
        normalizer: RecordNormalizer,
        tracker: ProgressTracker,
        open_writer: OpenWriter,
    ) -> Self {
        Self {
            query,
            normalizer,
            tracker,
            open_writer,
        }
    }

    /// Execute the export run
    ///
    /// 1. Scroll through every batch, normalizing hits as they arrive
    /// 2. Open the output and write all records in retrieval order
    /// 3. Flush the output and report statistics
    ///
    /// A coordinator runs once; the scroll cursor cannot be rewound.
    pub async fn execute(self) -> Result<ExportResult> {
        let start_time = Instant::now();
        let Self {
            query,
            normalizer,
            tracker,
            open_writer,
        } = self;

        info!("Starting export run");
        let mut total_reported = false;
        let retrieved = collect_records(query, &normalizer, |progress| {
            if !total_reported {
                if let Some(total) = progress.total_hits {
                    tracker.set_total(total);
                    total_reported = true;
                }
            }
            tracker.update(progress.records as u64);

            // Log progress periodically
            if progress.batches % 10 == 0 {
                info!(
                    "Progress: {} records retrieved ({} batches)",
                    progress.records, progress.batches
                );
            }
        })
        .await;
        tracker.finish();
        let (records, batches) = retrieved?;

        debug!("Writing {} records", records.len());
        let mut writer = open_writer().await?;
        writer.write_batch(&records).await?;
        writer.finalize().await?;

        let result = ExportResult {
            records_exported: records.len() as u64,
            batches,
            bytes_written: writer.bytes_written(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Export completed: {} records, {} batches, {} bytes, {} ms",
            result.records_exported, result.batches, result.bytes_written, result.elapsed_ms
        );

        Ok(result)
    }
}
