use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One positioned piece of text as reported by the PDF decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    /// Vertical position on the page. Some decoders never report it.
    #[serde(default)]
    pub y: Option<f64>,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, y: f64) -> Self {
        Self {
            text: text.into(),
            y: Some(y),
        }
    }

    pub fn unpositioned(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            y: None,
        }
    }
}

/// Which layout heuristic produced a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementFormat {
    Amex,
    StandardBank,
    Tabular,
    NzBank,
}

impl StatementFormat {
    pub fn label(&self) -> &'static str {
        match self {
            StatementFormat::Amex => "amex",
            StatementFormat::StandardBank => "standard-bank",
            StatementFormat::Tabular => "tabular",
            StatementFormat::NzBank => "nz-bank",
        }
    }
}

/// Bank-agnostic `(date, description, amount)` triple produced by a format parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub date: NaiveDate,
    /// Merchant text with interior spacing preserved.
    pub description: String,
    /// Always a valid purchase value (see `tally_core::is_valid_value`).
    pub amount: f64,
}

/// A date-prefixed statement line. `inline_amount` is set when the amount was
/// printed on the same line; such rows never take from the candidate pool.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionLine {
    pub date: String,
    pub description: String,
    pub line_index: usize,
    pub inline_amount: Option<f64>,
}

/// A standalone money token that may belong to some transaction line.
#[derive(Debug, Clone, PartialEq)]
pub struct AmountCandidate {
    pub value: f64,
    pub line_index: usize,
}
