//! The dashboard payload schema.
//!
//! Produced by the assistant layer (a language model emits it as JSON) or
//! supplied by hand, so every field is optional/defaulted and values are
//! loosely typed `serde_json::Value`s; the renderer stringifies whatever
//! it is given rather than rejecting it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSpec {
    pub title: String,
    pub subtitle: String,
    pub kpis: Vec<Kpi>,
    pub chart: Option<Chart>,
    pub tables: Vec<Table>,
    pub notes: Vec<String>,
    pub meta: Map<String, Value>,
}

/// One KPI card.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Kpi {
    pub label: String,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<Value>,
}

/// A horizontal bar chart over a list of records: `label_key` selects the
/// bar label, `value_key` the bar length.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Chart {
    pub title: String,
    pub label_key: String,
    pub value_key: String,
    pub rows: Vec<Map<String, Value>>,
}

/// A tabular panel. `columns` may be plain strings or objects carrying a
/// `name`/`label`/`key`; rows may be objects, arrays, or scalars.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Table {
    pub caption: String,
    pub columns: Vec<Value>,
    pub rows: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_deserializes_from_sparse_json() {
        let spec: DashboardSpec = serde_json::from_str(
            r#"{"title": "Sales", "kpis": [{"label": "Total", "value": 1234}]}"#,
        )
        .expect("sparse payload");
        assert_eq!(spec.title, "Sales");
        assert_eq!(spec.kpis.len(), 1);
        assert!(spec.chart.is_none());
        assert!(spec.tables.is_empty());
    }
}
