//! Schema initialization: one uniqueness constraint per entity key.
//!
//! Runs before the first batch. The statements use `IF NOT EXISTS`, so
//! re-running a load never fails on an already-declared constraint. The
//! constraints are what make the merge program safe against duplicate-key
//! races under concurrent writers; this pipeline is single-threaded, but
//! the graph it maintains should not depend on that.

use retailgraph_store::{query, GraphStore, StoreError};

/// Uniqueness constraints, one per natural key in the data model.
pub const CONSTRAINTS: [&str; 5] = [
    "CREATE CONSTRAINT transaction_id IF NOT EXISTS FOR (t:Transaction) REQUIRE t.id IS UNIQUE",
    "CREATE CONSTRAINT customer_name IF NOT EXISTS FOR (c:Customer) REQUIRE c.name IS UNIQUE",
    "CREATE CONSTRAINT product_name IF NOT EXISTS FOR (p:Product) REQUIRE p.name IS UNIQUE",
    "CREATE CONSTRAINT city_name IF NOT EXISTS FOR (cy:City) REQUIRE cy.name IS UNIQUE",
    "CREATE CONSTRAINT store_type IF NOT EXISTS FOR (s:Store) REQUIRE s.type IS UNIQUE",
];

/// Declare all uniqueness constraints. Idempotent.
pub async fn ensure_constraints(store: &GraphStore) -> Result<(), StoreError> {
    tracing::info!("creating constraints and indexes");
    for ddl in CONSTRAINTS {
        store.run(query(ddl)).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_constraint_is_idempotent_and_unique_per_label() {
        let mut labels = Vec::new();
        for ddl in CONSTRAINTS {
            assert!(ddl.contains("IF NOT EXISTS"), "rerunnable: {ddl}");
            assert!(ddl.contains("IS UNIQUE"), "uniqueness: {ddl}");
            let label = ddl
                .split("FOR (")
                .nth(1)
                .and_then(|rest| rest.split(')').next())
                .and_then(|binding| binding.split(':').nth(1))
                .expect("label in DDL");
            labels.push(label.to_string());
        }
        labels.sort();
        labels.dedup();
        assert_eq!(
            labels,
            ["City", "Customer", "Product", "Store", "Transaction"],
            "one constraint per entity kind"
        );
    }
}
