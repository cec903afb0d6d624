//! Diff freshly parsed transactions against what the store already holds.

use std::collections::HashMap;

use serde::Serialize;
use tally_core::Transaction;
use tracing::{debug, warn};

/// Value drift below this is rounding noise, not a changed transaction.
pub const VALUE_TOLERANCE: f64 = 0.01;

/// Partial update for an existing record: only the fields reconciliation may change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionPatch {
    pub value: f64,
    pub amount: String,
    pub category: String,
    pub subcategory: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionUpdate {
    pub id: String,
    /// The existing record with the new field values applied.
    pub merged: Transaction,
}

impl TransactionUpdate {
    pub fn patch(&self) -> TransactionPatch {
        TransactionPatch {
            value: self.merged.value,
            amount: self.merged.amount.clone(),
            category: self.merged.category.clone(),
            subcategory: self.merged.subcategory.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub new_transactions: Vec<Transaction>,
    pub updates: Vec<TransactionUpdate>,
    pub duplicate_count: usize,
}

impl Reconciliation {
    pub fn total(&self) -> usize {
        self.new_transactions.len() + self.updates.len() + self.duplicate_count
    }
}

fn needs_update(existing: &Transaction, incoming: &Transaction) -> bool {
    (existing.value - incoming.value).abs() > VALUE_TOLERANCE
        || existing.category != incoming.category
        || existing.subcategory != incoming.subcategory
}

/// Partition `incoming` into inserts, updates and pure duplicates.
///
/// Identity is `(date_iso, lowercased trimmed place)`; the first stored record
/// with a given key is the one compared against.
pub fn reconcile(incoming: Vec<Transaction>, existing: &[Transaction]) -> Reconciliation {
    let mut by_key: HashMap<(String, String), &Transaction> = HashMap::with_capacity(existing.len());
    for tx in existing {
        by_key.entry(tx.dedup_key()).or_insert(tx);
    }

    let submitted = incoming.len();
    let mut out = Reconciliation::default();

    for tx in incoming {
        let Some(found) = by_key.get(&tx.dedup_key()).copied() else {
            out.new_transactions.push(tx);
            continue;
        };

        if !needs_update(found, &tx) {
            continue;
        }

        let Some(id) = found.id.clone() else {
            warn!(place = tx.place.as_str(), date = tx.date_iso.as_str(), "changed record has no store id; leaving as is");
            continue;
        };

        let merged = found
            .with_value(tx.value)
            .with_category(tx.category.as_str(), tx.subcategory.as_str());
        debug!(id = id.as_str(), "queueing update");
        out.updates.push(TransactionUpdate { id, merged });
    }

    out.duplicate_count = submitted - out.new_transactions.len() - out.updates.len();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_transaction;
    use chrono::NaiveDate;

    fn tx(day: u32, place: &str, value: f64) -> Transaction {
        build_transaction(NaiveDate::from_ymd_opt(2025, 9, day).unwrap(), place, value).unwrap()
    }

    fn stored(id: &str, t: Transaction) -> Transaction {
        Transaction {
            id: Some(id.to_string()),
            ..t
        }
    }

    #[test]
    fn test_partition() {
        let existing = vec![
            stored("1", tx(1, "COUNTDOWN PONSONBY", 40.0)),
            stored("2", tx(2, "Z ENERGY", 9.3)),
            stored("3", tx(3, "MIGHTY APE", 20.0)),
        ];
        let incoming = vec![
            tx(1, "  countdown ponsonby ", 40.005), // duplicate within tolerance
            tx(2, "Z ENERGY", 12.0),                // value changed
            tx(4, "NEW SHOP", 5.0),                 // new
            tx(3, "MIGHTY APE", 20.0).with_category("Shopping", "Games & Toys"),
        ];

        let r = reconcile(incoming, &existing);
        assert_eq!(r.new_transactions.len(), 1);
        assert_eq!(r.new_transactions[0].place, "NEW SHOP");
        assert_eq!(r.updates.len(), 2);
        assert_eq!(r.duplicate_count, 1);

        let z = r.updates.iter().find(|u| u.id == "2").unwrap();
        assert_eq!(z.merged.value, 12.0);
        assert_eq!(z.merged.amount, "$12.00");
        assert_eq!(z.merged.id.as_deref(), Some("2"));
        assert_eq!(z.patch().amount, "$12.00");

        let ape = r.updates.iter().find(|u| u.id == "3").unwrap();
        assert_eq!(ape.merged.subcategory, "Games & Toys");
        assert_eq!(ape.merged.value, 20.0);
    }

    #[test]
    fn test_interior_spacing_is_a_different_key() {
        let existing = vec![stored("1", tx(1, "COUNTDOWN PONSONBY", 40.0))];
        let r = reconcile(vec![tx(1, "COUNTDOWN  PONSONBY", 40.0)], &existing);
        assert_eq!(r.new_transactions.len(), 1);
        assert_eq!(r.duplicate_count, 0);
    }

    #[test]
    fn test_same_place_other_day_is_new() {
        let existing = vec![stored("1", tx(1, "Z ENERGY", 9.3))];
        let r = reconcile(vec![tx(2, "Z ENERGY", 9.3)], &existing);
        assert_eq!(r.new_transactions.len(), 1);
    }

    #[test]
    fn test_changed_record_without_id_counts_as_duplicate() {
        let existing = vec![tx(1, "Z ENERGY", 9.3)];
        let r = reconcile(vec![tx(1, "Z ENERGY", 30.0)], &existing);
        assert!(r.updates.is_empty());
        assert_eq!(r.duplicate_count, 1);
    }

    #[test]
    fn test_partition_always_complete() {
        let pool: Vec<Transaction> = (1..=6)
            .map(|d| stored(&d.to_string(), tx(d, "SHOP", d as f64)))
            .collect();

        for take_existing in 0..=pool.len() {
            for shift in [0.0, 0.005, 1.0] {
                let existing = &pool[..take_existing];
                let incoming: Vec<Transaction> = (1..=8)
                    .map(|d| tx(d, "SHOP", d as f64 + shift))
                    .collect();
                let submitted = incoming.len();
                let r = reconcile(incoming, existing);
                assert_eq!(r.total(), submitted);
            }
        }
    }
}
