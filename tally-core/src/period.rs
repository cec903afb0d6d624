//! Billing-cycle assignment.
//!
//! Statements close on the 26th. A purchase on or before the 26th belongs to
//! the cycle closing that month; from the 27th it rolls into next month's.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dates::{parse_flexible_date, to_iso};

/// Last day of every statement cycle.
pub const CYCLE_CLOSE_DAY: u32 = 26;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementPeriod {
    pub statement_id: Option<String>,
    pub statement_start: Option<String>,
    pub statement_end: Option<String>,
}

impl StatementPeriod {
    pub fn is_known(&self) -> bool {
        self.statement_id.is_some()
    }
}

/// Cycle enclosing `date`. `statement_id` is the closing date.
pub fn period_for_date(date: NaiveDate) -> StatementPeriod {
    let (mut year, mut month) = (date.year(), date.month());
    if date.day() > CYCLE_CLOSE_DAY {
        if month == 12 {
            month = 1;
            year += 1;
        } else {
            month += 1;
        }
    }

    let (start_year, start_month) = if month == 1 { (year - 1, 12) } else { (year, month - 1) };

    // Day 26/27 exist in every month, so these cannot fail.
    let end = NaiveDate::from_ymd_opt(year, month, CYCLE_CLOSE_DAY);
    let start = NaiveDate::from_ymd_opt(start_year, start_month, CYCLE_CLOSE_DAY + 1);

    match (start, end) {
        (Some(start), Some(end)) => {
            let end = to_iso(end);
            StatementPeriod {
                statement_id: Some(end.clone()),
                statement_start: Some(to_iso(start)),
                statement_end: Some(end),
            }
        }
        _ => StatementPeriod::default(),
    }
}

/// String entry point. Missing or unparseable input yields an all-`None` period.
pub fn statement_period(date_iso: Option<&str>) -> StatementPeriod {
    date_iso
        .and_then(parse_flexible_date)
        .map(period_for_date)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(id: &str, start: &str, end: &str) -> StatementPeriod {
        StatementPeriod {
            statement_id: Some(id.to_string()),
            statement_start: Some(start.to_string()),
            statement_end: Some(end.to_string()),
        }
    }

    #[test]
    fn test_closing_day_stays_in_cycle() {
        assert_eq!(
            statement_period(Some("2025-09-26")),
            period("2025-09-26", "2025-08-27", "2025-09-26")
        );
    }

    #[test]
    fn test_day_after_close_rolls_forward() {
        assert_eq!(
            statement_period(Some("2025-09-27")),
            period("2025-10-26", "2025-09-27", "2025-10-26")
        );
    }

    #[test]
    fn test_december_rollover() {
        assert_eq!(
            statement_period(Some("2025-12-30")),
            period("2026-01-26", "2025-12-27", "2026-01-26")
        );
        // January before the close reaches back into the previous year
        assert_eq!(
            statement_period(Some("2026-01-05")),
            period("2026-01-26", "2025-12-27", "2026-01-26")
        );
    }

    #[test]
    fn test_first_of_month() {
        assert_eq!(
            statement_period(Some("2025-03-01")),
            period("2025-03-26", "2025-02-27", "2025-03-26")
        );
    }

    #[test]
    fn test_missing_or_garbage_is_all_none() {
        assert_eq!(statement_period(None), StatementPeriod::default());
        assert_eq!(statement_period(Some("not a date")), StatementPeriod::default());
        assert!(!statement_period(Some("")).is_known());
    }

    #[test]
    fn test_idempotent() {
        let a = statement_period(Some("2025-08-29"));
        let b = statement_period(Some("2025-08-29"));
        assert_eq!(a, b);
        assert_eq!(a.statement_id, a.statement_end);
    }
}
