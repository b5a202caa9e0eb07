//! Batch graph ingestion for RetailGraph.
//!
//! Reads the retail transaction CSV and loads it into the property graph in
//! three sequential stages:
//!
//! 1. [`constraints`]: declare one uniqueness constraint per entity key
//!    (idempotent; safe to rerun).
//! 2. [`record`]: map one tabular row into a normalized
//!    [`TransactionRow`], parsing the serialized product list defensively
//!    and coercing scalar fields strictly.
//! 3. [`batch`]: group rows into bounded batches and apply each batch as a
//!    single idempotent `UNWIND`/`MERGE` mutation.
//!
//! The whole pipeline is single-threaded and sequential: batches go out one
//! at a time, in source order, and a rerun of the same dataset converges to
//! the same graph (merge-by-key semantics everywhere; see the merge program
//! in [`batch`]). There is no rollback and no retry; the recovery path for
//! a failed run is to rerun it.

pub mod batch;
pub mod constraints;
pub mod pipeline;
pub mod record;

pub use batch::upsert_batch;
pub use constraints::ensure_constraints;
pub use pipeline::{
    ingest_file, IngestError, IngestOptions, IngestReport, DEFAULT_BATCH_SIZE,
    DEFAULT_DATASET_FILE,
};
pub use record::{
    parse_product_list, transform_record, ProductListError, RawRecord, TransactionRow,
    TransformError, TransformOutcome,
};
