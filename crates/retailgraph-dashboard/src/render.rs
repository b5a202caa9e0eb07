//! Payload -> HTML assembly.

use serde_json::Value;
use std::collections::BTreeSet;

use crate::payload::{Chart, DashboardSpec, Kpi, Table};

const DEFAULT_TITLE: &str = "Retail Dashboard";

// Section caps keep a hostile or over-eager payload from producing a
// megabyte of markup.
const MAX_KPIS: usize = 8;
const MAX_CHART_ROWS: usize = 12;
const MAX_TABLES: usize = 4;
const MAX_TABLE_ROWS: usize = 20;
const MAX_NOTES: usize = 10;

/// Render the payload as a complete HTML document.
pub fn render_dashboard(spec: &DashboardSpec) -> String {
    let title = if spec.title.trim().is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        spec.title.clone()
    };

    let subtitle_block = if spec.subtitle.trim().is_empty() {
        String::new()
    } else {
        format!(r#"<div class="subtitle">{}</div>"#, escape_html(&spec.subtitle))
    };

    let template = include_str!("../templates/dashboard.html");
    template
        .replace("{{TITLE}}", &escape_html(&title))
        .replace("{{SUBTITLE_BLOCK}}", &subtitle_block)
        .replace("{{KPIS}}", &kpi_section(&spec.kpis))
        .replace("{{CHART}}", &chart_section(spec.chart.as_ref()))
        .replace("{{TABLES}}", &tables_section(&spec.tables))
        .replace("{{NOTES}}", &notes_section(&spec.notes))
        .replace("{{META}}", &meta_section(spec))
}

fn kpi_section(kpis: &[Kpi]) -> String {
    if kpis.is_empty() {
        return String::new();
    }
    let cards: Vec<String> = kpis
        .iter()
        .take(MAX_KPIS)
        .map(|k| {
            let mut card = format!(
                r#"<div class="card">
  <div class="kpi-label">{}</div>
  <div class="kpi-value">{}</div>"#,
                escape_html(&k.label),
                escape_value(&k.value),
            );
            if let Some(delta) = &k.delta {
                card.push_str(&format!(
                    "\n  <div class=\"kpi-delta\">{}</div>",
                    escape_value(delta)
                ));
            }
            if let Some(hint) = &k.hint {
                card.push_str(&format!(
                    "\n  <div class=\"kpi-hint\">{}</div>",
                    escape_value(hint)
                ));
            }
            card.push_str("\n</div>");
            card
        })
        .collect();
    format!("<div class=\"kpi-grid\">{}</div>", cards.join("\n"))
}

fn chart_section(chart: Option<&Chart>) -> String {
    let Some(chart) = chart else {
        return String::new();
    };
    if chart.rows.is_empty() || chart.label_key.is_empty() || chart.value_key.is_empty() {
        return String::new();
    }

    let rows = &chart.rows[..chart.rows.len().min(MAX_CHART_ROWS)];
    let values: Vec<f64> = rows
        .iter()
        .map(|r| numeric(r.get(&chart.value_key)))
        .collect();
    let mut max = values.iter().cloned().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        max = 1.0;
    }

    let mut bars = String::new();
    for (row, value) in rows.iter().zip(&values) {
        let label = row.get(&chart.label_key).map(stringify).unwrap_or_default();
        let shown = row.get(&chart.value_key).map(stringify).unwrap_or_default();
        let width = ((value / max) * 100.0) as u32;
        bars.push_str(&format!(
            r#"<div class="bar-row">
  <div class="bar-label">{}</div>
  <div class="bar-track"><div class="bar-fill" style="width:{width}%"></div></div>
  <div class="bar-value">{}</div>
</div>
"#,
            escape_html(&label),
            escape_html(&shown),
        ));
    }

    let title = if chart.title.trim().is_empty() {
        "Chart"
    } else {
        chart.title.as_str()
    };
    panel(title, &format!("<div class=\"bars\">{bars}</div>"))
}

fn tables_section(tables: &[Table]) -> String {
    tables
        .iter()
        .take(MAX_TABLES)
        .map(table_panel)
        .collect::<Vec<_>>()
        .join("\n")
}

fn table_panel(table: &Table) -> String {
    let rows = &table.rows[..table.rows.len().min(MAX_TABLE_ROWS)];
    let columns = normalize_columns(&table.columns, rows);

    let header: String = columns
        .iter()
        .map(|c| format!("<th>{}</th>", escape_html(c)))
        .collect();

    let mut body = String::new();
    for row in rows {
        let cells: String = match row {
            Value::Object(map) => columns
                .iter()
                .map(|c| format!("<td>{}</td>", escape_value(map.get(c).unwrap_or(&Value::Null))))
                .collect(),
            Value::Array(items) => (0..columns.len())
                .map(|i| {
                    format!(
                        "<td>{}</td>",
                        escape_value(items.get(i).unwrap_or(&Value::Null))
                    )
                })
                .collect(),
            scalar => {
                let mut cells = format!("<td>{}</td>", escape_value(scalar));
                for _ in 1..columns.len() {
                    cells.push_str("<td></td>");
                }
                cells
            }
        };
        body.push_str(&format!("<tr>{cells}</tr>"));
    }

    let caption = if table.caption.trim().is_empty() {
        "Table"
    } else {
        table.caption.as_str()
    };
    panel(
        caption,
        &format!(
            r#"<div class="table-wrap"><table><thead><tr>{header}</tr></thead><tbody>{body}</tbody></table></div>"#
        ),
    )
}

/// Resolve the column list: declared columns win (objects may carry the
/// name under `name`/`label`/`key`); otherwise infer from object-row keys,
/// then from the widest array row, then a single `value` column.
fn normalize_columns(declared: &[Value], rows: &[Value]) -> Vec<String> {
    if !declared.is_empty() {
        return declared
            .iter()
            .map(|c| match c {
                Value::Object(map) => ["name", "label", "key"]
                    .iter()
                    .find_map(|k| map.get(*k))
                    .map(stringify)
                    .unwrap_or_else(|| stringify(c)),
                other => stringify(other),
            })
            .collect();
    }

    let keys: BTreeSet<String> = rows
        .iter()
        .filter_map(|r| r.as_object())
        .flat_map(|m| m.keys().cloned())
        .collect();
    if !keys.is_empty() {
        return keys.into_iter().collect();
    }

    let widest = rows
        .iter()
        .filter_map(|r| r.as_array())
        .map(|a| a.len())
        .max()
        .unwrap_or(0);
    if widest > 0 {
        return (1..=widest).map(|i| format!("col_{i}")).collect();
    }

    vec!["value".to_string()]
}

fn notes_section(notes: &[String]) -> String {
    if notes.is_empty() {
        return String::new();
    }
    let items: String = notes
        .iter()
        .take(MAX_NOTES)
        .map(|n| format!("<li>{}</li>", escape_html(n)))
        .collect();
    panel("Notes", &format!("<ul class=\"notes\">{items}</ul>"))
}

fn meta_section(spec: &DashboardSpec) -> String {
    if spec.meta.is_empty() {
        return String::new();
    }
    let json = serde_json::to_string_pretty(&spec.meta).unwrap_or_default();
    panel("Meta", &format!("<div class=\"meta\">{}</div>", escape_html(&json)))
}

fn panel(title: &str, body: &str) -> String {
    format!(
        r#"<div class="panel">
  <div class="panel-title">{}</div>
  {body}
</div>"#,
        escape_html(title),
    )
}

/// Flatten a JSON value into display text. Strings render bare (no
/// quotes); compound values render as compact JSON.
fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        compound => serde_json::to_string(compound).unwrap_or_default(),
    }
}

fn numeric(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn escape_value(value: &Value) -> String {
    escape_html(&stringify(value))
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_spec() -> DashboardSpec {
        serde_json::from_value(json!({
            "title": "Store Performance <Q4>",
            "subtitle": "Revenue by store type",
            "kpis": [
                {"label": "Total Revenue", "value": 128_345.5, "delta": "+4.2%"},
                {"label": "Transactions", "value": 2500}
            ],
            "chart": {
                "title": "Revenue by city",
                "label_key": "city",
                "value_key": "revenue",
                "rows": [
                    {"city": "Lisbon", "revenue": 100},
                    {"city": "Porto", "revenue": 50}
                ]
            },
            "tables": [
                {"caption": "Top products", "columns": ["product", "count"],
                 "rows": [{"product": "Milk", "count": 42}, {"product": "Bread", "count": 17}]}
            ],
            "notes": ["Premium customers skew toward supermarkets."],
            "meta": {"source": "retail-graph"}
        }))
        .expect("spec")
    }

    #[test]
    fn renders_every_section_with_escaping() {
        let html = render_dashboard(&full_spec());
        assert!(html.contains("Store Performance &lt;Q4&gt;"));
        assert!(html.contains("Revenue by store type"));
        assert!(html.contains("Total Revenue"));
        assert!(html.contains("width:100%"), "largest bar fills the track");
        assert!(html.contains("width:50%"), "bars scale to the max value");
        assert!(html.contains("<th>product</th>"));
        assert!(html.contains("Premium customers"));
        assert!(html.contains("retail-graph"));
    }

    #[test]
    fn empty_spec_still_renders_a_document_with_default_title() {
        let html = render_dashboard(&DashboardSpec::default());
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("Retail Dashboard"));
        assert!(!html.contains("kpi-grid"));
        assert!(!html.contains("panel-title"));
    }

    #[test]
    fn script_injection_is_neutralized() {
        let spec = DashboardSpec {
            title: "<script>alert(1)</script>".to_string(),
            notes: vec!["<img src=x onerror=alert(1)>".to_string()],
            ..DashboardSpec::default()
        };
        let html = render_dashboard(&spec);
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&lt;img src=x"));
    }

    #[test]
    fn chart_with_non_positive_values_does_not_divide_by_zero() {
        let spec: DashboardSpec = serde_json::from_value(json!({
            "chart": {
                "label_key": "k", "value_key": "v",
                "rows": [{"k": "a", "v": 0}, {"k": "b", "v": "not a number"}]
            }
        }))
        .expect("spec");
        let html = render_dashboard(&spec);
        assert!(html.contains("width:0%"));
    }

    #[test]
    fn table_columns_are_inferred_from_row_keys_when_undeclared() {
        let spec: DashboardSpec = serde_json::from_value(json!({
            "tables": [{"rows": [{"b": 1, "a": 2}, {"c": 3}]}]
        }))
        .expect("spec");
        let html = render_dashboard(&spec);
        // Sorted, merged across rows.
        assert!(html.contains("<th>a</th><th>b</th><th>c</th>"));
    }

    #[test]
    fn row_caps_bound_the_output() {
        let rows: Vec<Value> = (0..100).map(|i| json!({"n": i})).collect();
        let spec: DashboardSpec = serde_json::from_value(json!({
            "tables": [{"caption": "big", "rows": rows}]
        }))
        .expect("spec");
        let html = render_dashboard(&spec);
        assert_eq!(html.matches("<tr>").count() - 1, 20, "20 body rows + header");
    }
}
