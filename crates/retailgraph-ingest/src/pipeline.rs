//! Sequential ingestion driver: CSV file -> constraints -> batched upserts.

use std::path::{Path, PathBuf};

use retailgraph_store::{GraphStore, StoreError};

use crate::batch::upsert_batch;
use crate::constraints::ensure_constraints;
use crate::record::{transform_record, RawRecord, TransactionRow, TransformError};

/// Rows per mutation.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Fallback dataset filename when the CLI is given no path.
pub const DEFAULT_DATASET_FILE: &str = "Retail_Transactions_Dataset.csv";

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub batch_size: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub rows: usize,
    pub batches: usize,
    /// Rows loaded with an empty product list because the `Product` cell
    /// was not a valid list literal.
    pub malformed_product_rows: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("dataset not found at {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("failed to read dataset: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Ingest a transaction CSV into the graph store.
///
/// Fully sequential: constraints first, then one blocking mutation per
/// batch, in source-row order. A missing input file aborts before anything
/// touches the store. There is no retry and no rollback; batching is a
/// memory bound, not a semantic boundary, so rerunning after a failure
/// converges to the same graph as a clean run.
pub async fn ingest_file(
    store: &GraphStore,
    csv_path: &Path,
    options: &IngestOptions,
) -> Result<IngestReport, IngestError> {
    if !csv_path.exists() {
        return Err(IngestError::InputNotFound(csv_path.to_path_buf()));
    }

    tracing::info!(path = %csv_path.display(), "reading transactions dataset");
    ensure_constraints(store).await?;

    let batch_size = options.batch_size.max(1);
    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut report = IngestReport::default();
    let mut batch: Vec<TransactionRow> = Vec::with_capacity(batch_size);
    let mut batch_start = 0usize;

    for result in reader.deserialize::<RawRecord>() {
        let raw = result?;
        let outcome = transform_record(&raw)?;
        if outcome.product_degraded {
            report.malformed_product_rows += 1;
        }
        batch.push(outcome.row);

        if batch.len() == batch_size {
            flush(store, &mut batch, &mut batch_start, &mut report).await?;
        }
    }
    if !batch.is_empty() {
        flush(store, &mut batch, &mut batch_start, &mut report).await?;
    }

    tracing::info!(
        rows = report.rows,
        batches = report.batches,
        malformed_product_rows = report.malformed_product_rows,
        "ingestion complete"
    );
    Ok(report)
}

async fn flush(
    store: &GraphStore,
    batch: &mut Vec<TransactionRow>,
    batch_start: &mut usize,
    report: &mut IngestReport,
) -> Result<(), IngestError> {
    upsert_batch(store, batch).await?;
    tracing::info!(
        batch_start = *batch_start,
        rows = batch.len(),
        "processed batch"
    );
    *batch_start += batch.len();
    report.rows += batch.len();
    report.batches += 1;
    batch.clear();
    Ok(())
}
