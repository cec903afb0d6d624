//! Bulk re-import: accept loosely-shaped JSON records (exports from older
//! versions, spreadsheets, other tools) and normalize them into transactions.
//!
//! Nothing about the incoming shape is trusted. Each field has an ordered list
//! of places it may come from, and the record is rebuilt through the same
//! validation as freshly parsed statements.

use chrono::NaiveDate;
use serde_json::Value;
use tally_core::dates::parse_flexible_date;
use tally_core::{Transaction, parse_amount};
use tracing::debug;

use crate::builder::build_with_labels;
use crate::category_rules::categorize_merchant;

const PLACE_FIELDS: &[&str] = &["place", "description", "merchant", "name"];
const VALUE_FIELDS: &[&str] = &["value", "amount"];
const DATE_FIELDS: &[&str] = &["date_iso", "date", "transaction_date"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    pub transactions: Vec<Transaction>,
    pub rejected: usize,
}

fn first_string<'a>(record: &'a Value, fields: &[&str]) -> Option<&'a str> {
    fields
        .iter()
        .filter_map(|f| record.get(*f).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
}

fn first_number(record: &Value, fields: &[&str]) -> Option<f64> {
    fields.iter().find_map(|f| match record.get(*f)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_amount(s),
        _ => None,
    })
}

fn first_date(record: &Value) -> Option<NaiveDate> {
    DATE_FIELDS
        .iter()
        .filter_map(|f| record.get(*f).and_then(Value::as_str))
        .find_map(parse_flexible_date)
}

/// Given category/subcategory are kept only as a pair; anything partial is
/// reclassified from the merchant text.
fn labels<'a>(record: &'a Value, place: &str) -> (&'a str, &'a str) {
    let category = first_string(record, &["category"]);
    let subcategory = first_string(record, &["subcategory"]);
    match (category, subcategory) {
        (Some(c), Some(s)) => (c.trim(), s.trim()),
        _ => {
            let class = categorize_merchant(place);
            (class.category, class.subcategory)
        }
    }
}

/// Normalize one record. The store-assigned `id` is carried over when present
/// so re-imports of exported data still reconcile by natural key.
pub fn normalize_record(record: &Value) -> Option<Transaction> {
    let place = first_string(record, PLACE_FIELDS)?;
    let value = first_number(record, VALUE_FIELDS)?;
    let date = first_date(record)?;
    let (category, subcategory) = labels(record, place);

    let mut tx = build_with_labels(date, place, value, category, subcategory)?;
    tx.id = record.get("id").and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });
    Some(tx)
}

pub fn normalize_records(records: &[Value]) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    for (i, record) in records.iter().enumerate() {
        match normalize_record(record) {
            Some(tx) => batch.transactions.push(tx),
            None => {
                debug!(index = i, "re-import: dropping record that failed normalization");
                batch.rejected += 1;
            }
        }
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strict_shape_round_trips() {
        let rec = json!({
            "id": "abc",
            "place": "COUNTDOWN  PONSONBY",
            "amount": "$40.00",
            "date": "2025-08-29",
            "currency": "NZD",
            "value": 40.0,
            "date_iso": "2025-08-29",
            "category": "Groceries",
            "subcategory": "Supermarket",
            "statement_id": "2025-09-26",
            "statement_start": "2025-08-27",
            "statement_end": "2025-09-26"
        });
        let tx = normalize_record(&rec).unwrap();
        assert_eq!(tx.id.as_deref(), Some("abc"));
        assert_eq!(tx.place, "COUNTDOWN  PONSONBY");
        assert_eq!(tx.value, 40.0);
        assert_eq!(tx.statement_id.as_deref(), Some("2025-09-26"));
    }

    #[test]
    fn test_alternate_field_names_and_formats() {
        let rec = json!({
            "description": "OPENAI SAN FRANCISCO",
            "amount": "$1,032.10",
            "transaction_date": "15/09/2025"
        });
        let tx = normalize_record(&rec).unwrap();
        assert_eq!(tx.place, "OPENAI SAN FRANCISCO");
        assert_eq!(tx.value, 1032.1);
        assert_eq!(tx.amount, "$1032.10");
        assert_eq!(tx.date_iso, "2025-09-15");
        assert_eq!(tx.category, "Technology");
        assert_eq!(tx.statement_id.as_deref(), Some("2025-09-26"));
        assert!(tx.id.is_none());
    }

    #[test]
    fn test_value_preferred_over_amount_and_numeric_id() {
        let rec = json!({
            "id": 17,
            "merchant": "Z ENERGY",
            "value": "9.3",
            "amount": "$999.00",
            "date": "03.09.25"
        });
        let tx = normalize_record(&rec).unwrap();
        assert_eq!(tx.value, 9.3);
        assert_eq!(tx.id.as_deref(), Some("17"));
        assert_eq!(tx.date_iso, "2025-09-03");
    }

    #[test]
    fn test_partial_category_is_reclassified() {
        let rec = json!({
            "place": "COUNTDOWN",
            "value": 5,
            "date": "2025-09-01",
            "category": "Mystery"
        });
        let tx = normalize_record(&rec).unwrap();
        assert_eq!(tx.category, "Groceries");
    }

    #[test]
    fn test_batch_counts_rejections() {
        let records = vec![
            json!({ "place": "SHOP", "value": 5, "date": "2025-09-01" }),
            json!({ "place": "", "value": 5, "date": "2025-09-01" }),
            json!({ "place": "SHOP", "value": 0, "date": "2025-09-01" }),
            json!({ "place": "SHOP", "value": 5, "date": "someday" }),
            json!({ "place": "SHOP", "value": 60000, "date": "2025-09-01" }),
            json!("not an object"),
        ];
        let batch = normalize_records(&records);
        assert_eq!(batch.transactions.len(), 1);
        assert_eq!(batch.rejected, 5);
    }
}
