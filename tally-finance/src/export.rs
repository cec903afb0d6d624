//! Write transactions out as CSV for spreadsheets.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tally_core::Transaction;

const HEADER: [&str; 9] = [
    "date",
    "place",
    "amount",
    "value",
    "currency",
    "category",
    "subcategory",
    "statement_id",
    "id",
];

fn write_rows<W: Write>(wtr: &mut csv::Writer<W>, transactions: &[Transaction]) -> Result<()> {
    wtr.write_record(HEADER)?;
    for tx in transactions {
        let value = format!("{:.2}", tx.value);
        wtr.write_record([
            tx.date_iso.as_str(),
            tx.place.as_str(),
            tx.amount.as_str(),
            value.as_str(),
            tx.currency.as_str(),
            tx.category.as_str(),
            tx.subcategory.as_str(),
            tx.statement_id.as_deref().unwrap_or(""),
            tx.id.as_deref().unwrap_or(""),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv(path: impl AsRef<Path>, transactions: &[Transaction]) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    write_rows(&mut wtr, transactions).with_context(|| format!("write {}", path.display()))
}

pub fn to_csv_string(transactions: &[Transaction]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    write_rows(&mut wtr, transactions)?;
    let bytes = wtr.into_inner().context("flush csv buffer")?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_transaction;
    use chrono::NaiveDate;

    #[test]
    fn test_csv_quotes_commas_and_keeps_spacing() {
        let d = NaiveDate::from_ymd_opt(2025, 9, 3).unwrap();
        let txs = vec![
            build_transaction(d, "COUNTDOWN   PONSONBY", 40.0).unwrap(),
            build_transaction(d, "SMITH, JONES & CO", 12.5).unwrap(),
        ];
        let out = to_csv_string(&txs).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines[0],
            "date,place,amount,value,currency,category,subcategory,statement_id,id"
        );
        assert!(lines[1].starts_with("2025-09-03,COUNTDOWN   PONSONBY,$40.00,40.00,NZD,Groceries,"));
        assert!(lines[2].contains("\"SMITH, JONES & CO\""));
        assert!(lines[2].ends_with(",2025-09-26,"));
    }
}
