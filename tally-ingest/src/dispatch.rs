//! Try each layout parser in priority order; the first non-empty result wins.

use tracing::{info, warn};

use crate::parsers::{FormatParser, default_parsers};
use crate::types::{RawTransaction, StatementFormat};

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStatement {
    pub format: StatementFormat,
    pub transactions: Vec<RawTransaction>,
}

/// `None` means no parser recognised anything. Callers are expected to log
/// diagnostics rather than report an empty statement as a success silently.
pub fn parse_statement(lines: &[String]) -> Option<ParsedStatement> {
    parse_with(&default_parsers(), lines)
}

pub fn parse_with(parsers: &[Box<dyn FormatParser>], lines: &[String]) -> Option<ParsedStatement> {
    for parser in parsers {
        let format = parser.format();
        match parser.parse(lines) {
            Ok(transactions) if !transactions.is_empty() => {
                info!(format = format.label(), count = transactions.len(), "statement parsed");
                return Some(ParsedStatement {
                    format,
                    transactions,
                });
            }
            Ok(_) => {}
            Err(e) => warn!(format = format.label(), error = %e, "parser failed; trying next"),
        }
    }
    None
}
