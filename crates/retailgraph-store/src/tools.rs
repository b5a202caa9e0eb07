//! Read-only tools over the graph store.
//!
//! These are the two functions the assistant layer calls. Both return plain
//! strings rather than structured results: the consumer is a language model
//! prompt, and a failed query must come back as an error *message*, not an
//! `Err` that aborts the conversation.
//!
//! Nothing here writes to the store. The generated-Cypher guardrails live in
//! the assistant crate; this module will execute whatever it is handed, so
//! it must only ever be wired to read-path callers.

use serde_json::Value;

use crate::client::{GraphStore, StoreError};

/// Execute a Cypher query and serialize all result rows as a JSON array.
///
/// Any failure (connectivity, syntax, deserialization) is folded into an
/// `Error executing query: ...` string.
pub async fn run_cypher_query(store: &GraphStore, cypher: &str) -> String {
    match collect_rows(store, cypher).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(%cypher, error = %e, "query tool swallowed a failure");
            format!("Error executing query: {e}")
        }
    }
}

async fn collect_rows(store: &GraphStore, cypher: &str) -> Result<String, StoreError> {
    let mut stream = store.execute(neo4rs::query(cypher)).await?;
    let mut records: Vec<Value> = Vec::new();
    while let Some(row) = stream
        .next()
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?
    {
        // Most analytics queries return scalars/aggregates, which map
        // cleanly onto JSON. Rows carrying whole nodes or relationships may
        // not; degrade those to their debug form instead of failing the
        // whole result set.
        match row.to::<Value>() {
            Ok(value) => records.push(value),
            Err(_) => records.push(Value::String(format!("{row:?}"))),
        }
    }
    serde_json::to_string(&records).map_err(|e| StoreError::Query(e.to_string()))
}

/// Describe the graph: node labels, relationship types, and a sampled
/// property set per label.
///
/// Property discovery samples ONE node per label (`MATCH (n:L) RETURN
/// keys(n) LIMIT 1`). That is a heuristic, not an inventory: a property
/// that only exists on other nodes of the label will not be listed. It is
/// bounded by the number of labels, which for this graph is five.
pub async fn get_graph_schema(store: &GraphStore) -> String {
    match describe_schema(store).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "schema tool swallowed a failure");
            format!("Error retrieving schema: {e}")
        }
    }
}

async fn describe_schema(store: &GraphStore) -> Result<String, StoreError> {
    let mut sections = Vec::new();

    let labels = single_column(store, "CALL db.labels()", "label").await?;
    sections.push(format!("Node Labels: {}", labels.join(", ")));

    let rel_types =
        single_column(store, "CALL db.relationshipTypes()", "relationshipType").await?;
    sections.push(format!("Relationship Types: {}", rel_types.join(", ")));

    for label in &labels {
        // Labels cannot be parameterized in Cypher; backticks keep unusual
        // label names from breaking the match.
        let cypher = format!("MATCH (n:`{label}`) RETURN keys(n) AS keys LIMIT 1");
        let mut stream = store.execute(neo4rs::query(&cypher)).await?;
        if let Some(row) = stream
            .next()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?
        {
            let keys: Vec<String> = row
                .get("keys")
                .map_err(|e| StoreError::Query(e.to_string()))?;
            sections.push(format!("Properties for {label}: {}", keys.join(", ")));
        }
    }

    Ok(sections.join("\n"))
}

async fn single_column(
    store: &GraphStore,
    cypher: &str,
    column: &str,
) -> Result<Vec<String>, StoreError> {
    let mut stream = store.execute(neo4rs::query(cypher)).await?;
    let mut values = Vec::new();
    while let Some(row) = stream
        .next()
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?
    {
        values.push(
            row.get::<String>(column)
                .map_err(|e| StoreError::Query(e.to_string()))?,
        );
    }
    Ok(values)
}
