//! The persisted transaction record and the amount contract every parser shares.

use serde::{Deserialize, Serialize};

/// Every statement this system ingests is in New Zealand dollars.
pub const CURRENCY: &str = "NZD";

/// Exclusive upper bound on a single purchase. Anything at or above it is a
/// balance, limit or summary total that leaked through extraction.
pub const MAX_TRANSACTION_VALUE: f64 = 50_000.0;

pub const DEFAULT_CATEGORY: &str = "Other";
pub const DEFAULT_SUBCATEGORY: &str = "General";

/// A purchase as stored by the remote transaction service.
///
/// Field names are the wire format; the same shape is accepted by bulk re-import.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Merchant text exactly as extracted. Interior spacing is significant.
    pub place: String,
    /// `"$" + value` with two decimals
    pub amount: String,
    pub date: String,
    pub currency: String,
    pub value: f64,
    pub date_iso: String,
    pub category: String,
    pub subcategory: String,
    pub statement_id: Option<String>,
    pub statement_start: Option<String>,
    pub statement_end: Option<String>,
}

impl Transaction {
    /// Natural key used to spot the same purchase across uploads.
    /// Only the ends of `place` are trimmed; interior spacing stays part of the key.
    pub fn dedup_key(&self) -> (String, String) {
        (self.date_iso.clone(), self.place.trim().to_lowercase())
    }

    /// Copy of `self` with value-derived fields replaced. Never mutates in place.
    pub fn with_value(&self, value: f64) -> Self {
        Self {
            value,
            amount: format_amount(value),
            ..self.clone()
        }
    }

    pub fn with_category(&self, category: impl Into<String>, subcategory: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory.into(),
            ..self.clone()
        }
    }
}

/// True when `value` can be a purchase: finite, positive, below the ceiling.
pub fn is_valid_value(value: f64) -> bool {
    value.is_finite() && value > 0.0 && value < MAX_TRANSACTION_VALUE
}

/// `9.3 -> "$9.30"`
pub fn format_amount(value: f64) -> String {
    format!("${:.2}", value)
}

/// Parse a money token such as `"$1,234.50"`, `"NZ$12.00"`, `"-4.10"` or `"12.5"`.
/// Currency prefixes and thousands separators are ignored. Returns `None` for
/// anything that is not a finite number.
pub fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .trim_start_matches("NZD")
        .trim_start_matches("NZ")
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let v: f64 = cleaned.parse().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
