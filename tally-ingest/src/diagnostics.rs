//! What an operator needs to see when no parser recognised a statement.

use regex::Regex;
use serde::Serialize;
use tracing::warn;

pub const DEFAULT_DIAGNOSTIC_LINES: usize = 50;
const SAMPLE_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseDiagnostics {
    pub total_lines: usize,
    pub first_lines: Vec<String>,
    pub date_samples: Vec<String>,
    pub amount_samples: Vec<String>,
    pub dollar_signs: usize,
    pub nzd_mentions: usize,
}

impl ParseDiagnostics {
    pub fn collect(lines: &[String], max_lines: usize) -> Self {
        let first_lines = lines
            .iter()
            .filter(|l| !l.trim().is_empty())
            .take(max_lines)
            .cloned()
            .collect();

        // Literal patterns; if one ever fails to compile we just lose its samples.
        let date_re = Regex::new(
            r"\d{1,2}\s*[./-]\s*\d{1,2}\s*[./-]\s*\d{2,4}|\d{4}-\d{2}-\d{2}|\d{1,2}\s+[A-Za-z]{3}\s+\d{4}",
        )
        .ok();
        let amount_re = Regex::new(r"(?:^|\s)\$?\d{1,3}(?:,\d{3})*\.\d{2}(?:\s|$)").ok();

        Self {
            total_lines: lines.len(),
            first_lines,
            date_samples: samples(lines, date_re.as_ref()),
            amount_samples: samples(lines, amount_re.as_ref()),
            dollar_signs: lines.iter().map(|l| l.matches('$').count()).sum(),
            nzd_mentions: lines.iter().map(|l| l.matches("NZD").count()).sum(),
        }
    }

    /// Emit the report at `warn` so it reaches the operator log, never the response body.
    pub fn log(&self) {
        warn!(
            total_lines = self.total_lines,
            dollar_signs = self.dollar_signs,
            nzd_mentions = self.nzd_mentions,
            "no statement format recognised"
        );
        for (i, line) in self.first_lines.iter().enumerate() {
            warn!(line = i, text = line.as_str(), "statement text");
        }
        warn!(samples = ?self.date_samples, "date-like lines");
        warn!(samples = ?self.amount_samples, "amount-like lines");
    }
}

fn samples(lines: &[String], re: Option<&Regex>) -> Vec<String> {
    let Some(re) = re else {
        return Vec::new();
    };
    lines
        .iter()
        .filter(|l| re.is_match(l))
        .take(SAMPLE_LIMIT)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_samples() {
        let lines: Vec<String> = [
            "",
            "Statement",
            "29.08.25 COUNTDOWN",
            "$40.00",
            "NZD 12.00 and $3.00",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let d = ParseDiagnostics::collect(&lines, 2);
        assert_eq!(d.total_lines, 5);
        assert_eq!(d.first_lines, vec!["Statement", "29.08.25 COUNTDOWN"]);
        assert_eq!(d.date_samples, vec!["29.08.25 COUNTDOWN"]);
        assert_eq!(d.amount_samples.len(), 2);
        assert_eq!(d.dollar_signs, 2);
        assert_eq!(d.nzd_mentions, 1);
    }
}
