//! Row transformation: one CSV record -> one normalized transaction.
//!
//! The transformer is a pure mapping with one deliberate asymmetry:
//!
//! - The `Product` column carries a Python-style list literal
//!   (`"['Milk', 'Bread']"`). A malformed value degrades to an EMPTY
//!   product list with a recorded warning; one bad cell must not abort a
//!   whole batch.
//! - The scalar columns (`Total_Items`, `Total_Cost`, `Discount_Applied`)
//!   are coerced strictly. A coercion failure is a [`TransformError`] and
//!   aborts the containing batch: silently loading a transaction with a
//!   garbage total would corrupt every aggregate downstream.

use serde::Deserialize;

/// One row of the source dataset, exactly as it appears in the CSV.
///
/// Every field is captured as a string so that all type coercion happens in
/// [`transform_record`], explicitly, instead of inside the CSV
/// deserializer.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Transaction_ID")]
    pub transaction_id: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Customer_Name")]
    pub customer_name: String,
    #[serde(rename = "Customer_Category")]
    pub customer_category: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Total_Items")]
    pub total_items: String,
    #[serde(rename = "Total_Cost")]
    pub total_cost: String,
    #[serde(rename = "Payment_Method")]
    pub payment_method: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Store_Type")]
    pub store_type: String,
    #[serde(rename = "Discount_Applied")]
    pub discount_applied: String,
    #[serde(rename = "Season")]
    pub season: String,
    #[serde(rename = "Promotion")]
    pub promotion: String,
}

/// A normalized transaction, ready for the batch upserter.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub customer_name: String,
    pub customer_category: String,
    pub products: Vec<String>,
    pub total_items: i64,
    pub total_cost: f64,
    pub payment_method: String,
    pub city: String,
    pub store_type: String,
    pub discount_applied: bool,
    pub season: String,
    pub promotion: String,
}

/// Result of transforming one record.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutcome {
    pub row: TransactionRow,
    /// True when the `Product` cell was not a valid list literal and the
    /// row was loaded with an empty product list.
    pub product_degraded: bool,
}

/// Fatal scalar-coercion failure. Aborts the containing batch.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("transaction {transaction_id}: cannot coerce {field}={value:?} to {expected}")]
pub struct TransformError {
    pub transaction_id: String,
    pub field: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Non-fatal product-list parse failure. The row continues with an empty
/// product list.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ProductListError {
    #[error("not a list literal (expected surrounding brackets)")]
    NotAList,
    #[error("expected a quoted item at position {0}")]
    ExpectedItem(usize),
    #[error("unterminated quoted item starting at position {0}")]
    UnterminatedItem(usize),
    #[error("trailing content after item at position {0}")]
    TrailingContent(usize),
}

/// Transform one raw record into a [`TransactionRow`].
///
/// Product-list degradation is recorded in the outcome and via
/// `tracing::warn!`; scalar coercion failures propagate.
pub fn transform_record(raw: &RawRecord) -> Result<TransformOutcome, TransformError> {
    let (products, product_degraded) = match parse_product_list(&raw.product) {
        Ok(products) => (products, false),
        Err(e) => {
            tracing::warn!(
                transaction_id = %raw.transaction_id,
                value = %raw.product,
                error = %e,
                "product field is not a list literal; loading row with no products"
            );
            (Vec::new(), true)
        }
    };

    let row = TransactionRow {
        id: raw.transaction_id.clone(),
        date: raw.date.clone(),
        customer_name: raw.customer_name.clone(),
        customer_category: raw.customer_category.clone(),
        products,
        total_items: coerce_i64(raw, "Total_Items", &raw.total_items)?,
        total_cost: coerce_f64(raw, "Total_Cost", &raw.total_cost)?,
        payment_method: raw.payment_method.clone(),
        city: raw.city.clone(),
        store_type: raw.store_type.clone(),
        discount_applied: coerce_bool(raw, "Discount_Applied", &raw.discount_applied)?,
        season: raw.season.clone(),
        promotion: raw.promotion.clone(),
    };

    Ok(TransformOutcome {
        row,
        product_degraded,
    })
}

/// Parse a Python-style list literal of quoted strings.
///
/// Accepts single or double quotes per item, backslash escapes inside
/// items, and arbitrary whitespace between tokens. Anything else (bare
/// words, missing brackets, unbalanced quotes) is an error the caller is
/// expected to handle (the transformer downgrades it to an empty list).
pub fn parse_product_list(input: &str) -> Result<Vec<String>, ProductListError> {
    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or(ProductListError::NotAList)?;

    let chars: Vec<char> = body.chars().collect();
    let mut items = Vec::new();
    let mut i = 0usize;

    loop {
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }

        let quote = chars[i];
        if quote != '\'' && quote != '"' {
            return Err(ProductListError::ExpectedItem(i));
        }
        let start = i;
        i += 1;

        let mut item = String::new();
        let mut closed = false;
        while i < chars.len() {
            match chars[i] {
                '\\' if i + 1 < chars.len() => {
                    item.push(chars[i + 1]);
                    i += 2;
                }
                c if c == quote => {
                    closed = true;
                    i += 1;
                    break;
                }
                c => {
                    item.push(c);
                    i += 1;
                }
            }
        }
        if !closed {
            return Err(ProductListError::UnterminatedItem(start));
        }
        items.push(item);

        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if i < chars.len() {
            if chars[i] == ',' {
                i += 1;
            } else {
                return Err(ProductListError::TrailingContent(i));
            }
        }
    }

    Ok(items)
}

fn coerce_i64(raw: &RawRecord, field: &'static str, value: &str) -> Result<i64, TransformError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| coercion_error(raw, field, value, "integer"))
}

fn coerce_f64(raw: &RawRecord, field: &'static str, value: &str) -> Result<f64, TransformError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| coercion_error(raw, field, value, "float"))
}

/// The source dataset spells booleans the Python way (`True`/`False`).
fn coerce_bool(raw: &RawRecord, field: &'static str, value: &str) -> Result<bool, TransformError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(coercion_error(raw, field, value, "boolean")),
    }
}

fn coercion_error(
    raw: &RawRecord,
    field: &'static str,
    value: &str,
    expected: &'static str,
) -> TransformError {
    TransformError {
        transaction_id: raw.transaction_id.clone(),
        field,
        value: value.to_string(),
        expected,
    }
}
