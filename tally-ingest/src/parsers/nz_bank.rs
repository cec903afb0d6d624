//! NZ retail bank statement parser (text)
//!
//! Rows use one of three date styles depending on the bank and export:
//!   03 Sep 2025  COUNTDOWN PONSONBY  40.00
//!   03/09/25     Z ENERGY WESTGATE   9.30
//!   2025-09-03   MITRE 10 MEGA       $77.45
//!
//! The first style that matches a row wins for that row.

use anyhow::Result;
use chrono::NaiveDate;
use regex::{Captures, Regex};
use tally_core::dates::{date_from_parts, month_from_name};
use tally_core::parse_amount;
use tracing::debug;

use super::{FormatParser, accept, contains_any_ci};
use crate::types::{RawTransaction, StatementFormat};

const SKIP_WORDS: &[&str] = &["payment", "credit", "transfer in"];

const TAIL: &str = r"\s+(?P<desc>.+?)\s+(?P<sign>-)?\$?(?P<amt>[\d,]+\.\d{2})\s*$";

pub struct NzBankParser;

impl FormatParser for NzBankParser {
    fn format(&self) -> StatementFormat {
        StatementFormat::NzBank
    }

    fn parse(&self, lines: &[String]) -> Result<Vec<RawTransaction>> {
        parse_nz_bank_lines(lines)
    }
}

fn month_name_date(caps: &Captures) -> Option<NaiveDate> {
    let month = month_from_name(&caps["mon"])?;
    date_from_parts(&caps["d"], &month.to_string(), &caps["y"])
}

fn numeric_date(caps: &Captures) -> Option<NaiveDate> {
    date_from_parts(&caps["d"], &caps["m"], &caps["y"])
}

pub fn parse_nz_bank_lines(lines: &[String]) -> Result<Vec<RawTransaction>> {
    type DateFn = fn(&Captures) -> Option<NaiveDate>;
    let styles: [(Regex, DateFn); 3] = [
        (
            Regex::new(&format!(
                r"^\s*(?P<d>\d{{1,2}})\s+(?P<mon>[A-Za-z]{{3,9}})\s+(?P<y>\d{{4}}){TAIL}"
            ))?,
            month_name_date,
        ),
        (
            Regex::new(&format!(r"^\s*(?P<d>\d{{1,2}})/(?P<m>\d{{1,2}})/(?P<y>\d{{2}}){TAIL}"))?,
            numeric_date,
        ),
        (
            Regex::new(&format!(r"^\s*(?P<y>\d{{4}})-(?P<m>\d{{2}})-(?P<d>\d{{2}}){TAIL}"))?,
            numeric_date,
        ),
    ];

    let mut out = Vec::new();
    for line in lines {
        let Some((caps, to_date)) = styles
            .iter()
            .find_map(|(re, to_date)| re.captures(line).map(|c| (c, to_date)))
        else {
            continue;
        };

        let desc = &caps["desc"];
        if contains_any_ci(desc, SKIP_WORDS) {
            continue;
        }
        let Some(date) = to_date(&caps) else {
            debug!(line = line.as_str(), "nz bank: invalid date");
            continue;
        };
        let mut amount = parse_amount(&caps["amt"]).unwrap_or(0.0);
        if caps.name("sign").is_some() {
            amount = -amount;
        }
        if let Some(t) = accept(date, desc, amount) {
            out.push(t);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_three_date_styles() {
        let txns = parse_nz_bank_lines(&lines(&[
            "03 Sep 2025 COUNTDOWN PONSONBY 40.00",
            "04/09/25 Z ENERGY WESTGATE 9.30",
            "2025-09-05 MITRE 10 MEGA $77.45",
        ]))
        .unwrap();
        assert_eq!(txns.len(), 3);
        assert_eq!(txns[0].date.to_string(), "2025-09-03");
        assert_eq!(txns[1].date.to_string(), "2025-09-04");
        assert_eq!(txns[2].date.to_string(), "2025-09-05");
        assert_eq!(txns[2].description, "MITRE 10 MEGA");
        assert_eq!(txns[2].amount, 77.45);
    }

    #[test]
    fn test_skips_transfers_and_credits() {
        let txns = parse_nz_bank_lines(&lines(&[
            "03 Sep 2025 TRANSFER IN FROM SAVINGS 500.00",
            "04 Sep 2025 CREDIT INTEREST 1.20",
            "05 Sep 2025 AUTOMATIC PAYMENT RENT 450.00",
            "06 Sep 2025 WITHDRAWAL -20.00",
        ]))
        .unwrap();
        assert!(txns.is_empty());
    }

    #[test]
    fn test_unknown_month_name_dropped() {
        let txns = parse_nz_bank_lines(&lines(&["03 Foo 2025 SHOP 4.00"])).unwrap();
        assert!(txns.is_empty());
    }
}
