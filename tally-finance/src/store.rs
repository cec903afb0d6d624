//! Remote transaction store: the port the pipeline persists through, plus the
//! HTTP adapter for the hosted service.
//!
//!   GET   /transactions        -> every stored transaction
//!   POST  /transactions/bulk   -> insert an array, per-record results back
//!   PATCH /transactions/:id    -> partial update (value/amount/category/subcategory)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use tally_core::{Error, Result, Transaction};
use tracing::{debug, info};

use crate::reconcile::TransactionPatch;

/// Outcome for one record of a bulk insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertResult {
    pub index: usize,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl InsertResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Full scan. Reconciliation needs every stored record in memory.
    async fn fetch_all(&self) -> Result<Vec<Transaction>>;

    async fn bulk_insert(&self, transactions: &[Transaction]) -> Result<Vec<InsertResult>>;

    async fn patch(&self, id: &str, patch: &TransactionPatch) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_key_header: String,
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8787".to_string(),
            api_key: None,
            api_key_header: "x-api-key".to_string(),
            timeout_secs: 30,
        }
    }
}

pub struct HttpTransactionStore {
    client: reqwest::Client,
    base_url: String,
}

/// Accepts either a bare array or `{ "transactions": [...] }` / `{ "results": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Transactions { transactions: Vec<T> },
    Results { results: Vec<T> },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(v) => v,
            Listing::Transactions { transactions } => transactions,
            Listing::Results { results } => results,
        }
    }
}

impl HttpTransactionStore {
    /// Fails with a configuration error when no API key is set, so callers can
    /// bail out before doing any parsing work.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::config("transaction store API key is not set"))?;

        let mut headers = HeaderMap::new();
        let name = HeaderName::from_bytes(config.api_key_header.as_bytes())
            .map_err(|e| Error::config(format!("invalid api_key_header: {e}")))?;
        let value = HeaderValue::from_str(key)
            .map_err(|e| Error::config(format!("invalid API key: {e}")))?;
        headers.insert(name, value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn check(resp: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::store(format!("{what}: {status} {body}")))
}

fn http_err(what: &str) -> impl FnOnce(reqwest::Error) -> Error + '_ {
    move |e| Error::Http(format!("{what}: {e}"))
}

#[async_trait]
impl TransactionStore for HttpTransactionStore {
    async fn fetch_all(&self) -> Result<Vec<Transaction>> {
        let resp = self
            .client
            .get(self.url("/transactions"))
            .send()
            .await
            .map_err(http_err("fetch transactions"))?;
        let resp = check(resp, "fetch transactions").await?;
        let listing: Listing<Transaction> = resp
            .json()
            .await
            .map_err(http_err("parse transactions"))?;
        let all = listing.into_vec();
        debug!(count = all.len(), "fetched existing transactions");
        Ok(all)
    }

    async fn bulk_insert(&self, transactions: &[Transaction]) -> Result<Vec<InsertResult>> {
        let resp = self
            .client
            .post(self.url("/transactions/bulk"))
            .json(transactions)
            .send()
            .await
            .map_err(http_err("bulk insert"))?;
        let resp = check(resp, "bulk insert").await?;
        let listing: Listing<InsertResult> = resp
            .json()
            .await
            .map_err(http_err("parse bulk insert response"))?;
        let results = listing.into_vec();
        info!(
            sent = transactions.len(),
            ok = results.iter().filter(|r| r.is_ok()).count(),
            "bulk insert finished"
        );
        Ok(results)
    }

    async fn patch(&self, id: &str, patch: &TransactionPatch) -> Result<()> {
        let resp = self
            .client
            .patch(self.url(&format!("/transactions/{id}")))
            .json(patch)
            .send()
            .await
            .map_err(http_err("patch transaction"))?;
        check(resp, "patch transaction").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_config_error() {
        let cfg = StoreConfig::default();
        assert!(matches!(HttpTransactionStore::new(&cfg), Err(Error::Config(_))));

        let cfg = StoreConfig {
            api_key: Some("  ".to_string()),
            ..StoreConfig::default()
        };
        assert!(matches!(HttpTransactionStore::new(&cfg), Err(Error::Config(_))));
    }

    #[test]
    fn test_url_joining() {
        let cfg = StoreConfig {
            base_url: "https://store.example/api/".to_string(),
            api_key: Some("k".to_string()),
            ..StoreConfig::default()
        };
        let store = HttpTransactionStore::new(&cfg).unwrap();
        assert_eq!(store.url("/transactions"), "https://store.example/api/transactions");
    }

    #[test]
    fn test_listing_shapes() {
        let bare: Listing<InsertResult> =
            serde_json::from_str(r#"[{"index":0,"id":"a"}]"#).unwrap();
        assert_eq!(bare.into_vec()[0].id.as_deref(), Some("a"));

        let wrapped: Listing<InsertResult> =
            serde_json::from_str(r#"{"results":[{"index":1,"error":"dup"}]}"#).unwrap();
        let v = wrapped.into_vec();
        assert!(!v[0].is_ok());
    }
}
