//! Batch upserter: a contiguous run of transformed rows applied as one
//! idempotent graph mutation.
//!
//! Each batch is a single Cypher statement: `UNWIND` over a list of row
//! maps, followed by the merge program. One statement per batch means the
//! server applies it in one implicit transaction, and merge-by-key
//! semantics make a rerun of the same batch a no-op; the recovery story
//! after a partial failure is simply to run the dataset again.
//!
//! Rows within a batch are a set as far as the final graph is concerned:
//! nothing here may depend on row order inside a batch, only on the
//! per-entity rules (category set on create, transaction scalars
//! overwritten).

use std::collections::HashMap;

use neo4rs::BoltType;
use retailgraph_store::{query, GraphStore, StoreError};

use crate::record::TransactionRow;

/// The merge program applied to every batch.
///
/// Per row: customers, cities, and stores are create-or-matched by key
/// (the customer category is written only on create); the transaction is
/// create-or-matched by id with its scalars overwritten unconditionally;
/// the three structural edges and the per-product CONTAINS edges are
/// merged, so re-ingestion never duplicates them.
pub(crate) const MERGE_PROGRAM: &str = "
UNWIND $rows AS row

MERGE (c:Customer {name: row.customer_name})
ON CREATE SET c.category = row.customer_category

MERGE (cy:City {name: row.city})

MERGE (s:Store {type: row.store_type})

MERGE (t:Transaction {id: row.id})
SET t.date = row.date,
    t.total_items = row.total_items,
    t.total_cost = row.total_cost,
    t.payment_method = row.payment_method,
    t.discount_applied = row.discount_applied,
    t.season = row.season,
    t.promotion = row.promotion

MERGE (c)-[:MADE]->(t)
MERGE (t)-[:AT]->(s)
MERGE (t)-[:IN_CITY]->(cy)

FOREACH (product_name IN row.products |
    MERGE (p:Product {name: product_name})
    MERGE (t)-[:CONTAINS]->(p)
)
";

/// Apply one batch of rows as a single mutation.
pub async fn upsert_batch(store: &GraphStore, rows: &[TransactionRow]) -> Result<(), StoreError> {
    if rows.is_empty() {
        return Ok(());
    }
    let payload: Vec<HashMap<String, BoltType>> = rows.iter().map(row_parameters).collect();
    store
        .run(query(MERGE_PROGRAM).param("rows", payload))
        .await
}

/// Flatten one row into the Bolt map consumed by `UNWIND $rows AS row`.
pub(crate) fn row_parameters(row: &TransactionRow) -> HashMap<String, BoltType> {
    let mut m: HashMap<String, BoltType> = HashMap::new();
    m.insert("id".to_string(), row.id.clone().into());
    m.insert("date".to_string(), row.date.clone().into());
    m.insert(
        "customer_name".to_string(),
        row.customer_name.clone().into(),
    );
    m.insert(
        "customer_category".to_string(),
        row.customer_category.clone().into(),
    );
    m.insert("products".to_string(), row.products.clone().into());
    m.insert("total_items".to_string(), row.total_items.into());
    m.insert("total_cost".to_string(), row.total_cost.into());
    m.insert(
        "payment_method".to_string(),
        row.payment_method.clone().into(),
    );
    m.insert("city".to_string(), row.city.clone().into());
    m.insert("store_type".to_string(), row.store_type.clone().into());
    m.insert("discount_applied".to_string(), row.discount_applied.into());
    m.insert("season".to_string(), row.season.clone().into());
    m.insert("promotion".to_string(), row.promotion.clone().into());
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> TransactionRow {
        TransactionRow {
            id: "1000000001".to_string(),
            date: "2023-11-05 12:30:00".to_string(),
            customer_name: "Alice".to_string(),
            customer_category: "Premium".to_string(),
            products: vec!["Milk".to_string(), "Bread".to_string()],
            total_items: 2,
            total_cost: 9.75,
            payment_method: "Cash".to_string(),
            city: "Lisbon".to_string(),
            store_type: "Supermarket".to_string(),
            discount_applied: false,
            season: "Fall".to_string(),
            promotion: "None".to_string(),
        }
    }

    #[test]
    fn row_parameters_carry_every_merge_program_field() {
        let params = row_parameters(&sample_row());
        for key in [
            "id",
            "date",
            "customer_name",
            "customer_category",
            "products",
            "total_items",
            "total_cost",
            "payment_method",
            "city",
            "store_type",
            "discount_applied",
            "season",
            "promotion",
        ] {
            assert!(params.contains_key(key), "missing {key}");
            assert!(
                MERGE_PROGRAM.contains(&format!("row.{key}")),
                "merge program never reads row.{key}"
            );
        }
        assert!(matches!(params["total_items"], BoltType::Integer(_)));
        assert!(matches!(params["total_cost"], BoltType::Float(_)));
        assert!(matches!(params["discount_applied"], BoltType::Boolean(_)));
        assert!(matches!(params["products"], BoltType::List(_)));
    }

    #[test]
    fn category_is_first_writer_wins_and_scalars_are_overwritten() {
        // The category may only be written under ON CREATE; transaction
        // scalars must be written unconditionally.
        assert!(MERGE_PROGRAM.contains("ON CREATE SET c.category"));
        assert!(!MERGE_PROGRAM.contains("\nSET c.category"));
        assert!(MERGE_PROGRAM.contains("SET t.date"));
        assert!(!MERGE_PROGRAM.contains("ON CREATE SET t.date"));
    }

    #[test]
    fn every_node_and_edge_is_merged_never_created() {
        assert!(!MERGE_PROGRAM.contains("CREATE ("));
        for pattern in [
            "MERGE (c:Customer {name: row.customer_name})",
            "MERGE (cy:City {name: row.city})",
            "MERGE (s:Store {type: row.store_type})",
            "MERGE (t:Transaction {id: row.id})",
            "MERGE (c)-[:MADE]->(t)",
            "MERGE (t)-[:AT]->(s)",
            "MERGE (t)-[:IN_CITY]->(cy)",
            "MERGE (p:Product {name: product_name})",
            "MERGE (t)-[:CONTAINS]->(p)",
        ] {
            assert!(MERGE_PROGRAM.contains(pattern), "missing {pattern}");
        }
    }
}
