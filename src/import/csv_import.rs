use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

use super::detect::detect_layout;
use crate::models::{Transaction, TransactionKind};

pub(crate) const DEFAULT_CATEGORY: &str = "Uncategorized";

const EXPORT_HEADER: [&str; 5] = ["date", "kind", "name", "amount", "category"];

/// Column positions of an import file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CsvLayout {
    pub(crate) date_column: usize,
    pub(crate) name_column: Option<usize>,
    pub(crate) amount_column: usize,
    pub(crate) category_column: Option<usize>,
    pub(crate) has_header: bool,
}

impl Default for CsvLayout {
    /// `date,name,amount,category`
    fn default() -> Self {
        Self {
            date_column: 0,
            name_column: Some(1),
            amount_column: 2,
            category_column: Some(3),
            has_header: true,
        }
    }
}

pub(crate) struct CsvImporter;

impl CsvImporter {
    /// Read the CSV and work out its layout. Header rows are recognised by
    /// not parsing as dates or numbers; files without one use the default
    /// column order.
    pub(crate) fn read(path: &Path) -> Result<(CsvLayout, Vec<Vec<String>>)> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_path(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

        let mut all_rows: Vec<Vec<String>> = Vec::new();
        for result in rdr.records() {
            let record = result.context("Failed to read CSV record")?;
            all_rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        let Some(first_row) = all_rows.first() else {
            anyhow::bail!("CSV file is empty");
        };

        let looks_like_header = first_row.iter().all(|field| {
            let trimmed = field.trim();
            parse_decimal(trimmed).is_err() && parse_date(trimmed).is_err()
        });

        if !looks_like_header {
            return Ok((
                CsvLayout {
                    has_header: false,
                    ..CsvLayout::default()
                },
                all_rows,
            ));
        }

        let headers = all_rows.remove(0);
        let layout = detect_layout(&headers).unwrap_or_else(|| {
            warn!(?headers, "unrecognised CSV header, using default column order");
            CsvLayout::default()
        });
        Ok((layout, all_rows))
    }

    /// Turn rows into records of one kind. Amounts are stored as absolute
    /// values; blank rows are skipped.
    pub(crate) fn parse(
        rows: &[Vec<String>],
        layout: &CsvLayout,
        kind: TransactionKind,
    ) -> Result<Vec<Transaction>> {
        let mut transactions = Vec::new();
        let first_line = if layout.has_header { 2 } else { 1 };

        for (i, row) in rows.iter().enumerate() {
            let line = i + first_line;
            let date_str = field(row, Some(layout.date_column));
            if date_str.is_empty() {
                continue;
            }

            let date = parse_date(date_str)
                .with_context(|| format!("Line {line}: failed to parse date '{date_str}'"))?;
            let amount = parse_decimal(field(row, Some(layout.amount_column)))
                .with_context(|| format!("Line {line}: failed to parse amount"))?
                .abs();

            let category = match field(row, layout.category_column) {
                "" => DEFAULT_CATEGORY,
                c => c,
            };
            let name = match field(row, layout.name_column) {
                "" => category,
                n => n,
            };

            transactions.push(Transaction::new(
                kind,
                name.to_string(),
                amount,
                category.to_string(),
                date,
            ));
        }

        debug!(%kind, count = transactions.len(), "parsed CSV rows");
        Ok(transactions)
    }
}

/// Write records as CSV with a `kind` column. Returns the number of rows.
pub(crate) fn export_to_csv(txns: &[Transaction], path: &Path) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    wtr.write_record(EXPORT_HEADER)?;
    for txn in txns {
        wtr.write_record([
            txn.occurred_on.to_string(),
            txn.kind.as_str().to_string(),
            txn.name.clone(),
            txn.amount.to_string(),
            txn.category.clone(),
        ])?;
    }
    wtr.flush().context("Failed to write CSV file")?;
    Ok(txns.len())
}

fn field(row: &[String], column: Option<usize>) -> &str {
    column
        .and_then(|c| row.get(c))
        .map(|s| s.trim())
        .unwrap_or("")
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    // Two-digit years first: %Y would read "24" as year 24.
    for fmt in &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%m-%d-%Y", "%d.%m.%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    anyhow::bail!("Could not parse date: {}", s)
}

pub(crate) fn parse_decimal(s: &str) -> Result<Decimal> {
    let cleaned = s
        .replace(['$', ',', '"'], "")
        .replace('(', "-")
        .replace(')', "")
        .trim()
        .to_string();
    if cleaned.is_empty() {
        anyhow::bail!("Amount is empty");
    }
    Decimal::from_str(&cleaned).with_context(|| format!("Failed to parse '{}' as decimal", s))
}

#[cfg(test)]
#[path = "csv_import_tests.rs"]
mod tests;
