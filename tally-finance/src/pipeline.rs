//! One upload, one linear pass:
//! fragments -> lines -> parse -> build -> reconcile -> persist.

use serde::Serialize;
use tally_core::{Error, Transaction};
use tally_ingest::diagnostics::DEFAULT_DIAGNOSTIC_LINES;
use tally_ingest::{ParseDiagnostics, TextFragment, assemble_lines, parse_statement};
use thiserror::Error as ThisError;
use tracing::{info, warn};

use crate::builder::build_transactions;
use crate::import::normalize_records;
use crate::reconcile::{Reconciliation, reconcile};
use crate::store::TransactionStore;

/// Response body for an upload or re-import.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub success: bool,
    pub transactions: Vec<Transaction>,
    pub count: usize,
    pub duplicate_count: usize,
    pub updated: usize,
    pub saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ImportReport {
    fn empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            transactions: Vec::new(),
            count: 0,
            duplicate_count: 0,
            updated: 0,
            saved: false,
            message: Some(message.into()),
        }
    }
}

/// A pipeline failure. Whatever was extracted before the failure rides along
/// so the caller can still show or retry it.
#[derive(Debug, ThisError)]
#[error("{source}")]
pub struct ImportError {
    #[source]
    pub source: Error,
    pub transactions: Vec<Transaction>,
}

impl ImportError {
    fn new(source: Error, transactions: Vec<Transaction>) -> Self {
        Self {
            source,
            transactions,
        }
    }
}

impl From<Error> for ImportError {
    fn from(source: Error) -> Self {
        Self::new(source, Vec::new())
    }
}

/// Parse-and-build result before anything touches the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub format: Option<&'static str>,
    pub transactions: Vec<Transaction>,
}

pub struct StatementImporter<S> {
    store: S,
    diagnostic_lines: usize,
}

impl<S: TransactionStore> StatementImporter<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            diagnostic_lines: DEFAULT_DIAGNOSTIC_LINES,
        }
    }

    pub fn with_diagnostic_lines(mut self, n: usize) -> Self {
        self.diagnostic_lines = n;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Full upload path for one statement.
    pub async fn import_fragments(&self, fragments: &[TextFragment]) -> Result<ImportReport, ImportError> {
        let preview = preview_fragments(fragments, self.diagnostic_lines);
        if preview.transactions.is_empty() {
            let message = if preview.format.is_none() {
                "No transactions found in statement"
            } else {
                "No valid transactions found in statement"
            };
            return Ok(ImportReport::empty(message));
        }
        self.persist(preview.transactions).await
    }

    /// Bulk re-import of exported records.
    pub async fn import_records(&self, records: &[serde_json::Value]) -> Result<ImportReport, ImportError> {
        let batch = normalize_records(records);
        if batch.rejected > 0 {
            warn!(rejected = batch.rejected, "re-import: some records could not be normalized");
        }
        if batch.transactions.is_empty() {
            return Ok(ImportReport::empty("No valid records to import"));
        }
        self.persist(batch.transactions).await
    }

    async fn persist(&self, transactions: Vec<Transaction>) -> Result<ImportReport, ImportError> {
        let existing = match self.store.fetch_all().await {
            Ok(v) => v,
            Err(e) => return Err(ImportError::new(e, transactions)),
        };

        let Reconciliation {
            new_transactions,
            updates,
            duplicate_count,
        } = reconcile(transactions.clone(), &existing);

        for update in &updates {
            if let Err(e) = self.store.patch(&update.id, &update.patch()).await {
                return Err(ImportError::new(e, transactions));
            }
        }

        info!(
            extracted = transactions.len(),
            new = new_transactions.len(),
            updated = updates.len(),
            duplicates = duplicate_count,
            "reconciled statement"
        );

        if new_transactions.is_empty() {
            let message = if updates.is_empty() {
                format!("All {} transactions already exist", transactions.len())
            } else {
                format!("Updated {} existing transactions; nothing new to add", updates.len())
            };
            return Ok(ImportReport {
                success: true,
                count: transactions.len(),
                transactions,
                duplicate_count,
                updated: updates.len(),
                saved: false,
                message: Some(message),
            });
        }

        let results = match self.store.bulk_insert(&new_transactions).await {
            Ok(r) => r,
            Err(e) => return Err(ImportError::new(e, transactions)),
        };
        let failed = results.iter().filter(|r| !r.is_ok()).count();
        if failed > 0 {
            warn!(failed, "store rejected some inserted records");
        }

        let message = format!(
            "Saved {} new transactions ({} updated, {} duplicates skipped)",
            new_transactions.len() - failed,
            updates.len(),
            duplicate_count
        );
        Ok(ImportReport {
            success: true,
            count: transactions.len(),
            transactions,
            duplicate_count,
            updated: updates.len(),
            saved: true,
            message: Some(message),
        })
    }
}

/// Parse and build without touching the store. Logs diagnostics when no
/// format recognised the statement.
pub fn preview_fragments(fragments: &[TextFragment], diagnostic_lines: usize) -> Preview {
    let lines = assemble_lines(fragments);
    preview_lines(&lines, diagnostic_lines)
}

pub fn preview_lines(lines: &[String], diagnostic_lines: usize) -> Preview {
    let Some(parsed) = parse_statement(lines) else {
        ParseDiagnostics::collect(lines, diagnostic_lines).log();
        return Preview {
            format: None,
            transactions: Vec::new(),
        };
    };

    let transactions = build_transactions(&parsed.transactions);
    if transactions.len() < parsed.transactions.len() {
        warn!(
            dropped = parsed.transactions.len() - transactions.len(),
            "some parsed rows failed validation"
        );
    }
    Preview {
        format: Some(parsed.format.label()),
        transactions,
    }
}
