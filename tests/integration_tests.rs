//! Workspace-level integration tests.
//!
//! These exercise the seams between crates that do not require a live
//! graph store: CSV deserialization through the row transformer, batch
//! slicing, the dashboard sink, and the assistant loop's guardrails with a
//! scripted provider.

use retailgraph_assistant::{build_dashboard_spec, sanitize_cypher, AssistantReply, MockProvider};
use retailgraph_dashboard::{render_dashboard, save_dashboard, DashboardSpec};
use retailgraph_ingest::{transform_record, RawRecord, TransactionRow};

const SAMPLE_CSV: &str = "\
Transaction_ID,Date,Customer_Name,Customer_Category,Product,Total_Items,Total_Cost,Payment_Method,City,Store_Type,Discount_Applied,Season,Promotion
1000000001,2023-11-05 12:30:00,Alice,Premium,\"['Milk', 'Bread']\",2,9.75,Cash,Lisbon,Supermarket,True,Fall,None
1000000002,2023-11-05 13:00:00,Bob,Standard,N/A,1,3.10,Credit Card,Porto,Convenience Store,False,Fall,BOGO (Buy One Get One)
1000000003,2023-11-06 09:15:00,Alice,Premium,\"['Eggs']\",1,4.20,Cash,Lisbon,Supermarket,True,Fall,None
";

fn transformed_rows() -> (Vec<TransactionRow>, usize) {
    let mut reader = csv::Reader::from_reader(SAMPLE_CSV.as_bytes());
    let mut rows = Vec::new();
    let mut degraded = 0usize;
    for record in reader.deserialize::<RawRecord>() {
        let raw = record.expect("well-formed CSV");
        let outcome = transform_record(&raw).expect("transform");
        if outcome.product_degraded {
            degraded += 1;
        }
        rows.push(outcome.row);
    }
    (rows, degraded)
}

#[test]
fn csv_rows_flow_through_the_transformer() {
    let (rows, degraded) = transformed_rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(degraded, 1, "the N/A product cell degrades, not aborts");

    assert_eq!(rows[0].products, vec!["Milk", "Bread"]);
    assert!(rows[1].products.is_empty());
    assert_eq!(rows[1].customer_name, "Bob");
    assert!(!rows[1].discount_applied);
    assert_eq!(rows[2].id, "1000000003");
    assert!((rows[2].total_cost - 4.20).abs() < f64::EPSILON);
}

#[test]
fn batch_slicing_is_semantically_transparent() {
    // Batching is a memory bound, not a semantic boundary: the rows
    // submitted across many small batches must be exactly the rows of one
    // big batch, in source order.
    let (rows, _) = transformed_rows();
    let rebatched: Vec<TransactionRow> = rows.chunks(2).flatten().cloned().collect();
    assert_eq!(rebatched, rows);
}

#[test]
fn dashboard_sink_round_trips_a_payload_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let spec: DashboardSpec = serde_json::from_str(
        r#"{
            "title": "Top Customers",
            "chart": {
                "title": "Purchases",
                "label_key": "customer",
                "value_key": "purchases",
                "rows": [
                    {"customer": "Alice", "purchases": 2},
                    {"customer": "Bob", "purchases": 1}
                ]
            }
        }"#,
    )
    .expect("payload");

    let html = render_dashboard(&spec);
    assert!(html.contains("Top Customers"));
    assert!(html.contains("width:100%"));
    assert!(html.contains("width:50%"));

    let path = save_dashboard(&spec, dir.path(), "report").expect("save");
    assert!(path.exists());
}

#[tokio::test]
async fn assistant_guardrails_hold_with_a_scripted_provider() {
    // The provider drafts a mutation; the guard must refuse it.
    assert!(sanitize_cypher("MERGE (n:Customer {name: 'Mallory'}) RETURN n").is_err());

    // A read-only draft passes through fences and whitespace.
    let cypher = sanitize_cypher(
        "```cypher\nMATCH (t:Transaction)-[:CONTAINS]->(p:Product)\nRETURN p.name, count(*) AS n ORDER BY n DESC LIMIT 5\n```",
    )
    .expect("read-only");
    assert!(cypher.ends_with("LIMIT 5"));

    // Dashboard payloads from the model are best-effort.
    let reply = AssistantReply {
        cypher,
        rows_json: r#"[{"p.name": "Milk", "n": 2}]"#.to_string(),
        summary: "Milk is the most purchased product.".to_string(),
    };
    let provider = MockProvider::always("{\"title\": \"Products\"}");
    let spec = build_dashboard_spec(&provider, "top products?", &reply).await;
    assert_eq!(spec.title, "Products");
}
