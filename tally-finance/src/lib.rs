//! tally-finance: categorisation, record building, reconciliation, store client, import pipeline

pub mod builder;
pub mod category_rules;
pub mod export;
pub mod import;
pub mod pipeline;
pub mod reconcile;
pub mod store;

pub use builder::{build_transaction, build_transactions};
pub use category_rules::{Classification, categorize_merchant};
pub use import::{NormalizedBatch, normalize_record, normalize_records};
pub use pipeline::{ImportError, ImportReport, Preview, StatementImporter, preview_fragments, preview_lines};
pub use reconcile::{Reconciliation, TransactionPatch, TransactionUpdate, reconcile};
pub use store::{HttpTransactionStore, InsertResult, StoreConfig, TransactionStore};
