//! American Express NZ statement parser (PDF text)
//!
//! Transaction rows start with a dotted date, often padded by the extractor:
//!   29 . 08 . 25   COUNTDOWN   PONSONBY          40.00
//!
//! When the amount survives on the same row we read it directly. In most real
//! statements it does not: the amount column is emitted as its own block of
//! lines, and a summary page near the top repeats some transactions with no
//! amount nearby. Those statements are reconstructed by pairing transaction
//! rows with standalone amount lines.
//!
//! Once a statement is long enough to have a summary page, nothing above
//! `SUMMARY_CUTOFF_LINE` is read as a transaction, whether or not it carries an
//! amount. Rows below it that do carry one are paired with it up front.

use anyhow::Result;
use regex::Regex;
use tally_core::dates::parse_dotted_date;
use tally_core::parse_amount;
use tracing::{debug, info};

use super::{FormatParser, accept};
use crate::types::{AmountCandidate, RawTransaction, StatementFormat, TransactionLine};

/// Lines before this index are the summary/header page.
pub const SUMMARY_CUTOFF_LINE: usize = 50;
/// Largest row/amount count mismatch still paired positionally.
pub const SEQUENTIAL_COUNT_SLACK: usize = 2;
/// How far from the first transaction row the first real amount may sit.
pub const ALIGNMENT_WINDOW_LINES: usize = 30;
/// Amounts usually render just after their row.
pub const LOOKAHEAD_LINES: usize = 5;
pub const LOOKBEHIND_LINES: usize = 30;

const AMOUNT_EPSILON: f64 = 0.01;

const EXCLUDED_DESCRIPTIONS: &[&str] = &["payment - thank you", "total of new transactions"];
const HEADER_MARKERS: &[&str] = &["minimum payment", "credit limit", "due by"];

const DATE: &str = r"\d{1,2}\s*\.\s*\d{1,2}\s*\.\s*\d{2}";
const MONEY: &str = r"\d{1,3}(?:,\d{3})+\.\d{2}|\d+\.\d{2}";

struct Patterns {
    direct: Regex,
    dated: Regex,
    credit_row: Regex,
    standalone_amount: Regex,
    money: Regex,
}

impl Patterns {
    fn new() -> Result<Self> {
        Ok(Self {
            direct: Regex::new(&format!(
                r"^\s*(?P<date>{DATE})\s+(?P<desc>.+?)\s+\$?(?P<amt>{MONEY})\s*$"
            ))?,
            dated: Regex::new(&format!(r"^\s*(?P<date>{DATE})\s+(?P<desc>.*\S)\s*$"))?,
            credit_row: Regex::new(&format!(r"(?:{MONEY})\s*CR\s*$"))?,
            standalone_amount: Regex::new(&format!(
                r"^\s*\$?\s*(?P<amt>{MONEY})(?:\s*CR)?\s*$"
            ))?,
            money: Regex::new(&format!(r"(?:^|[\s$])\s*(?P<amt>{MONEY})(?:\s|$)"))?,
        })
    }
}

pub struct AmexParser;

impl FormatParser for AmexParser {
    fn format(&self) -> StatementFormat {
        StatementFormat::Amex
    }

    fn parse(&self, lines: &[String]) -> Result<Vec<RawTransaction>> {
        parse_amex_lines(lines)
    }
}

/// Parse assembled statement lines.
///
/// A statement that ends before the cutoff has no summary page and is read
/// row by row. Anything longer goes through split mode, which also takes the
/// detailed rows that kept their amount.
pub fn parse_amex_lines(lines: &[String]) -> Result<Vec<RawTransaction>> {
    let pats = Patterns::new()?;

    if lines.len() <= SUMMARY_CUTOFF_LINE {
        let direct = parse_direct(lines, &pats);
        if !direct.is_empty() {
            info!(count = direct.len(), "amex: direct rows");
        }
        return Ok(direct);
    }

    let split = parse_split(lines, &pats);
    if !split.is_empty() {
        info!(count = split.len(), "amex: reconstructed from split rows/amounts");
    }
    Ok(split)
}

fn is_excluded(description: &str) -> bool {
    let lower = description.to_lowercase();
    EXCLUDED_DESCRIPTIONS.iter().any(|x| lower.contains(x))
}

fn parse_direct(lines: &[String], pats: &Patterns) -> Vec<RawTransaction> {
    let mut out = Vec::new();
    for line in lines {
        let Some(caps) = pats.direct.captures(line) else {
            continue;
        };
        let desc = &caps["desc"];
        if is_excluded(desc) {
            continue;
        }
        let Some(date) = parse_dotted_date(&caps["date"]) else {
            debug!(line = line.as_str(), "amex: unparseable date");
            continue;
        };
        let Some(amount) = parse_amount(&caps["amt"]) else {
            continue;
        };
        if let Some(t) = accept(date, desc, amount) {
            out.push(t);
        }
    }
    out
}

/// Amounts printed next to "Minimum Payment" in the header. The same figure
/// tends to reappear among the standalone amounts and must not be paired.
fn minimum_payments(header: &[String], pats: &Patterns) -> Vec<f64> {
    let mut found = Vec::new();
    for (i, line) in header.iter().enumerate() {
        if !line.to_lowercase().contains("minimum payment") {
            continue;
        }
        let value = header
            .iter()
            .skip(i)
            .take(3)
            .find_map(|l| pats.money.captures(l).and_then(|c| parse_amount(&c["amt"])));
        if let Some(v) = value {
            debug!(value = v, "amex: minimum payment in header");
            found.push(v);
        }
    }
    found
}

fn transaction_lines(lines: &[String], pats: &Patterns) -> Vec<TransactionLine> {
    lines
        .iter()
        .enumerate()
        .skip(SUMMARY_CUTOFF_LINE)
        .filter_map(|(i, line)| {
            if pats.credit_row.is_match(line) {
                debug!(line = i, "amex: skipping credit row");
                return None;
            }
            let (caps, inline_amount) = match pats.direct.captures(line) {
                Some(c) => {
                    let amount = parse_amount(&c["amt"]);
                    (c, amount)
                }
                None => (pats.dated.captures(line)?, None),
            };
            let description = caps["desc"].to_string();
            if is_excluded(&description) {
                debug!(line = i, "amex: skipping non-purchase row");
                return None;
            }
            Some(TransactionLine {
                date: caps["date"].to_string(),
                description,
                line_index: i,
                inline_amount,
            })
        })
        .collect()
}

fn amount_candidates(lines: &[String], min_payments: &[f64], pats: &Patterns) -> Vec<AmountCandidate> {
    let mut out = Vec::new();
    for (i, line) in lines.iter().enumerate().skip(SUMMARY_CUTOFF_LINE) {
        let Some(caps) = pats.standalone_amount.captures(line) else {
            continue;
        };
        if line.contains("CR") || line.contains('%') {
            continue;
        }
        let labels_header_total = lines.get(i + 1).is_some_and(|next| {
            let next = next.to_lowercase();
            HEADER_MARKERS.iter().any(|m| next.contains(m))
        });
        if labels_header_total {
            continue;
        }
        let Some(value) = parse_amount(&caps["amt"]) else {
            continue;
        };
        if min_payments.iter().any(|m| (m - value).abs() < AMOUNT_EPSILON) {
            debug!(value, line = i, "amex: dropping minimum-payment amount");
            continue;
        }
        out.push(AmountCandidate { value, line_index: i });
    }
    out
}

/// Pair rows (by line index) with amounts positionally. Returns one slot per row.
fn align_sequential(rows: &[usize], amounts: &[AmountCandidate], used: &mut [bool]) -> Vec<Option<f64>> {
    let mut assigned = vec![None; rows.len()];
    let Some(&first_row) = rows.first() else {
        return assigned;
    };

    let offset = if amounts.len() > rows.len() {
        amounts
            .iter()
            .position(|a| a.line_index.abs_diff(first_row) <= ALIGNMENT_WINDOW_LINES)
            .unwrap_or(0)
    } else {
        0
    };

    for (i, slot) in assigned.iter_mut().enumerate() {
        if let Some(a) = amounts.get(offset + i) {
            *slot = Some(a.value);
            used[offset + i] = true;
        }
    }
    assigned
}

fn unused<'a>(
    amounts: &'a [AmountCandidate],
    used: &'a [bool],
) -> impl Iterator<Item = (usize, &'a AmountCandidate)> + 'a {
    amounts.iter().enumerate().filter(move |(k, _)| !used[*k])
}

/// Nearest unused amount after the row, then before it. Amounts on the row
/// itself were already taken as `inline_amount`.
fn nearest_amount(row: usize, amounts: &[AmountCandidate], used: &[bool]) -> Option<usize> {
    let after = unused(amounts, used)
        .filter(|(_, a)| a.line_index > row && a.line_index <= row + LOOKAHEAD_LINES)
        .min_by_key(|(_, a)| a.line_index)
        .map(|(k, _)| k);
    if after.is_some() {
        return after;
    }

    unused(amounts, used)
        .filter(|(_, a)| a.line_index < row && a.line_index + LOOKBEHIND_LINES >= row)
        .max_by_key(|(_, a)| a.line_index)
        .map(|(k, _)| k)
}

fn parse_split(lines: &[String], pats: &Patterns) -> Vec<RawTransaction> {
    let header = &lines[..lines.len().min(SUMMARY_CUTOFF_LINE)];
    let min_payments = minimum_payments(header, pats);
    let rows = transaction_lines(lines, pats);
    let amounts = amount_candidates(lines, &min_payments, pats);

    let mut assigned: Vec<Option<f64>> = rows.iter().map(|r| r.inline_amount).collect();
    let open: Vec<usize> = (0..rows.len()).filter(|&i| assigned[i].is_none()).collect();

    debug!(
        rows = rows.len(),
        inline = rows.len() - open.len(),
        amounts = amounts.len(),
        "amex: split mode pools"
    );
    if rows.is_empty() {
        return Vec::new();
    }

    let mut used = vec![false; amounts.len()];
    if !open.is_empty() && open.len().abs_diff(amounts.len()) <= SEQUENTIAL_COUNT_SLACK {
        let open_lines: Vec<usize> = open.iter().map(|&i| rows[i].line_index).collect();
        let aligned = align_sequential(&open_lines, &amounts, &mut used);
        for (&i, value) in open.iter().zip(aligned) {
            assigned[i] = value;
        }
    }

    for &i in &open {
        if assigned[i].is_some() {
            continue;
        }
        if let Some(k) = nearest_amount(rows[i].line_index, &amounts, &used) {
            used[k] = true;
            assigned[i] = Some(amounts[k].value);
        }
    }

    let mut out = Vec::new();
    for (row, slot) in rows.iter().zip(assigned) {
        let Some(value) = slot else {
            debug!(line = row.line_index, "amex: no amount for row");
            continue;
        };
        let Some(date) = parse_dotted_date(&row.date) else {
            debug!(line = row.line_index, date = row.date.as_str(), "amex: unparseable date");
            continue;
        };
        if let Some(t) = accept(date, &row.description, value) {
            out.push(t);
        }
    }
    out
}
