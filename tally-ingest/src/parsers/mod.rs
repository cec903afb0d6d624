//! Statement layout parsers.
//!
//! Each parser takes the assembled lines of one statement and returns the
//! purchases it can recognise, or nothing if its layout heuristic does not fit.

pub mod amex_nz;
pub mod nz_bank;
pub mod standard_bank;
pub mod tabular;

use anyhow::Result;
use chrono::NaiveDate;
use tally_core::is_valid_value;
use tracing::debug;

use crate::types::{RawTransaction, StatementFormat};

pub trait FormatParser: Send + Sync {
    fn format(&self) -> StatementFormat;

    fn parse(&self, lines: &[String]) -> Result<Vec<RawTransaction>>;
}

/// Parsers in the order the dispatcher tries them.
pub fn default_parsers() -> Vec<Box<dyn FormatParser>> {
    vec![
        Box::new(amex_nz::AmexParser),
        Box::new(standard_bank::StandardBankParser),
        Box::new(tabular::TabularParser),
        Box::new(nz_bank::NzBankParser),
    ]
}

/// Descriptions that are account movements rather than purchases, shared by the
/// single-line bank layouts.
pub(crate) const BANK_SKIP_WORDS: &[&str] = &["payment", "credit", "thank you"];

pub(crate) fn contains_any_ci(haystack: &str, needles: &[&str]) -> bool {
    let lower = haystack.to_lowercase();
    needles.iter().any(|n| lower.contains(n))
}

/// Final gate every parser funnels through. Drops (and logs) triples with an
/// empty description or a value outside the purchase range.
pub(crate) fn accept(date: NaiveDate, description: &str, amount: f64) -> Option<RawTransaction> {
    let description = description.trim();
    if description.is_empty() {
        debug!(%date, "dropping candidate with empty description");
        return None;
    }
    if !is_valid_value(amount) {
        debug!(%date, description, amount, "dropping candidate with out-of-range amount");
        return None;
    }
    Some(RawTransaction {
        date,
        description: description.to_string(),
        amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_bounds() {
        let d = NaiveDate::from_ymd_opt(2025, 8, 29).unwrap();
        assert!(accept(d, "SHOP", 12.5).is_some());
        assert!(accept(d, "SHOP", 0.0).is_none());
        assert!(accept(d, "SHOP", -3.0).is_none());
        assert!(accept(d, "SHOP", 50_000.0).is_none());
        assert!(accept(d, "SHOP", f64::NAN).is_none());
        assert!(accept(d, "   ", 10.0).is_none());
    }

    #[test]
    fn test_accept_trims_ends_only() {
        let d = NaiveDate::from_ymd_opt(2025, 8, 29).unwrap();
        let t = accept(d, "  MIGHTY   APE  ", 10.0).unwrap();
        assert_eq!(t.description, "MIGHTY   APE");
    }

    #[test]
    fn test_default_order() {
        let order: Vec<_> = default_parsers().iter().map(|p| p.format()).collect();
        assert_eq!(
            order,
            vec![
                StatementFormat::Amex,
                StatementFormat::StandardBank,
                StatementFormat::Tabular,
                StatementFormat::NzBank
            ]
        );
    }
}
