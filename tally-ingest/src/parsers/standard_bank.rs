//! Generic bank statement parser (text)
//!
//! One row per transaction, full date first and a currency-marked amount last:
//!   03/09/2025 COUNTDOWN PONSONBY $40.00
//!   04-09-2025 Z ENERGY NZ$9.30

use anyhow::Result;
use regex::Regex;
use tally_core::dates::date_from_parts;
use tally_core::parse_amount;
use tracing::debug;

use super::{BANK_SKIP_WORDS, FormatParser, accept, contains_any_ci};
use crate::types::{RawTransaction, StatementFormat};

pub struct StandardBankParser;

impl FormatParser for StandardBankParser {
    fn format(&self) -> StatementFormat {
        StatementFormat::StandardBank
    }

    fn parse(&self, lines: &[String]) -> Result<Vec<RawTransaction>> {
        parse_standard_bank_lines(lines)
    }
}

pub fn parse_standard_bank_lines(lines: &[String]) -> Result<Vec<RawTransaction>> {
    let row_re = Regex::new(concat!(
        r"^\s*(?P<d>\d{1,2})[/-](?P<m>\d{1,2})[/-](?P<y>\d{4})\s+",
        r"(?P<desc>.+?)\s+",
        r"(?P<sign>-)?\s*(?:NZD\s?|NZ\$|\$)(?P<amt>[\d,]+\.\d{2})\s*$"
    ))?;

    let mut out = Vec::new();
    for line in lines {
        let Some(caps) = row_re.captures(line) else {
            continue;
        };
        let desc = &caps["desc"];
        if contains_any_ci(desc, BANK_SKIP_WORDS) {
            continue;
        }
        let Some(date) = date_from_parts(&caps["d"], &caps["m"], &caps["y"]) else {
            debug!(line = line.as_str(), "standard bank: invalid date");
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

    #[test]
    fn test_parses_basic_rows() {
        let lines: Vec<String> = [
            "Date Description Amount",
            "03/09/2025 COUNTDOWN PONSONBY $40.00",
            "04-09-2025 Z ENERGY NZ$9.30",
            "05/09/2025 PAYMENT RECEIVED THANK YOU $500.00",
            "06/09/2025 REFUND -$12.00",
            "31/02/2025 BAD DATE $1.00",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let txns = parse_standard_bank_lines(&lines).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].description, "COUNTDOWN PONSONBY");
        assert_eq!(txns[0].amount, 40.0);
        assert_eq!(txns[0].date.to_string(), "2025-09-03");
        assert_eq!(txns[1].amount, 9.3);
    }

    #[test]
    fn test_requires_currency_marker() {
        let lines = vec!["03/09/2025 COUNTDOWN 40.00".to_string()];
        assert!(parse_standard_bank_lines(&lines).unwrap().is_empty());
    }
}
