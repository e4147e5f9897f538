mod csv_import;
mod detect;

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::db::Database;
use crate::models::TransactionKind;

pub(crate) use csv_import::{export_to_csv, parse_date, parse_decimal, CsvImporter, CsvLayout};

/// Read a CSV file and store every row as a record of `kind`.
pub(crate) fn import_csv(db: &mut Database, path: &Path, kind: TransactionKind) -> Result<usize> {
    let (layout, rows) = CsvImporter::read(path)?;
    let txns = CsvImporter::parse(&rows, &layout, kind)?;
    let count = db.insert_transactions_batch(&txns)?;
    info!(path = %path.display(), %kind, count, "CSV imported");
    Ok(count)
}

/// Write one month (or everything) to CSV.
pub(crate) fn export_csv(db: &Database, path: &Path, month: Option<&str>) -> Result<usize> {
    let txns = db.get_all_transactions(month)?;
    let count = export_to_csv(&txns, path)?;
    info!(path = %path.display(), count, "CSV exported");
    Ok(count)
}
