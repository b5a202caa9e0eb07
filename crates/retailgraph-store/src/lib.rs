//! Graph store access for RetailGraph.
//!
//! Everything that talks Bolt lives here:
//! - [`StoreConfig`]: connection settings, read once from the environment at
//!   process start and threaded down as a value (never ambient state).
//! - [`GraphStore`]: a thin wrapper over the `neo4rs` driver that owns the
//!   connection for the duration of a run and maps driver failures into
//!   [`StoreError`] with distinct unavailable/auth diagnostics.
//! - [`tools`]: the read-only query and schema-introspection surface consumed
//!   by the assistant layer. The ingestion pipeline is the exclusive write
//!   path; nothing in `tools` mutates the graph.

pub mod client;
pub mod config;
pub mod tools;

pub use client::{GraphStore, StoreError};
pub use config::StoreConfig;

// Re-exported so callers build parameterized queries without naming the
// driver crate directly.
pub use neo4rs::{query, BoltType, Query};
