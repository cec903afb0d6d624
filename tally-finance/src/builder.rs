//! Turn parsed statement triples into fully-formed transaction records.

use chrono::NaiveDate;
use tally_core::dates::to_iso;
use tally_core::{CURRENCY, Transaction, format_amount, is_valid_value, period_for_date};
use tally_ingest::RawTransaction;
use tracing::debug;

use crate::category_rules::categorize_merchant;

/// Validate and enrich one triple. `None` when the value is out of range or
/// the merchant text is empty; the caller just moves on to the next triple.
pub fn build_transaction(date: NaiveDate, place: &str, value: f64) -> Option<Transaction> {
    let class = categorize_merchant(place);
    build_with_labels(date, place, value, class.category, class.subcategory)
}

pub(crate) fn build_with_labels(
    date: NaiveDate,
    place: &str,
    value: f64,
    category: &str,
    subcategory: &str,
) -> Option<Transaction> {
    if place.trim().is_empty() {
        debug!(%date, "rejecting transaction with empty place");
        return None;
    }
    if !is_valid_value(value) {
        debug!(%date, place, value, "rejecting transaction with out-of-range value");
        return None;
    }

    let date_iso = to_iso(date);
    let period = period_for_date(date);

    Some(Transaction {
        id: None,
        place: place.to_string(),
        amount: format_amount(value),
        date: date_iso.clone(),
        currency: CURRENCY.to_string(),
        value,
        date_iso,
        category: category.to_string(),
        subcategory: subcategory.to_string(),
        statement_id: period.statement_id,
        statement_start: period.statement_start,
        statement_end: period.statement_end,
    })
}

pub fn build_transactions(raw: &[RawTransaction]) -> Vec<Transaction> {
    raw.iter()
        .filter_map(|r| build_transaction(r.date, &r.description, r.amount))
        .collect()
}
