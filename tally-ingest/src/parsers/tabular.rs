//! Column-aligned statement parser (text)
//!
//! Same row shape as the generic bank layout, but columns are separated by
//! runs of whitespace and the currency marker is optional:
//!   03/09/2025     COUNTDOWN PONSONBY          40.00
//!
//! Requiring two or more spaces between columns keeps prose lines that merely
//! start with a date from being read as rows.

use anyhow::Result;
use regex::Regex;
use tally_core::dates::date_from_parts;
use tally_core::parse_amount;
use tracing::debug;

use super::{BANK_SKIP_WORDS, FormatParser, accept, contains_any_ci};
use crate::types::{RawTransaction, StatementFormat};

pub struct TabularParser;

impl FormatParser for TabularParser {
    fn format(&self) -> StatementFormat {
        StatementFormat::Tabular
    }

    fn parse(&self, lines: &[String]) -> Result<Vec<RawTransaction>> {
        parse_tabular_lines(lines)
    }
}

pub fn parse_tabular_lines(lines: &[String]) -> Result<Vec<RawTransaction>> {
    let row_re = Regex::new(concat!(
        r"^\s*(?P<d>\d{1,2})[/-](?P<m>\d{1,2})[/-](?P<y>\d{4})\s{2,}",
        r"(?P<desc>\S.*?)\s{2,}",
        r"(?P<sign>-)?(?:NZD\s?|NZ\$|\$)?(?P<amt>[\d,]+\.\d{2})\s*$"
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
            debug!(line = line.as_str(), "tabular: invalid date");
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
