mod schema;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::types::{ToSql, Type};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::analytics::{CategoryTotal, DataSource, Granularity, PeriodSum};
use crate::models::{Transaction, TransactionKind, TransactionUpdate};

pub(crate) const DEFAULT_LIST_LIMIT: u32 = 100;

const COLUMNS: &str = "id, name, amount, category, date, created_at";

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ListQuery {
    /// "YYYY-MM" filter.
    pub month: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct TransactionPage {
    pub items: Vec<Transaction>,
    pub total_count: i64,
    pub limit: u32,
    pub offset: u32,
}

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn
                .execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        let tx = self.conn.transaction()?;
        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                tx.execute_batch(sql)
                    .with_context(|| format!("Migration from version {from_version} failed"))?;
            }
        }
        if current < schema::CURRENT_VERSION {
            tx.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
            info!(from = current, to = schema::CURRENT_VERSION, "schema migrated");
        }
        tx.commit()?;
        Ok(())
    }

    pub(crate) fn schema_version(&self) -> Result<i32> {
        Ok(self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })?)
    }

    // ── Transactions ──────────────────────────────────────────

    pub(crate) fn insert_transaction(&self, txn: &Transaction) -> Result<i64> {
        txn.validate()?;
        self.conn.execute(
            &format!(
                "INSERT INTO {} (name, amount, category, date, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                txn.kind.table()
            ),
            params![
                txn.name,
                txn.amount.to_string(),
                txn.category,
                txn.occurred_on.to_string(),
                txn.created_at,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(kind = %txn.kind, id, "transaction inserted");
        Ok(id)
    }

    /// Insert all records in one transaction. Nothing is written if any
    /// record fails validation.
    pub(crate) fn insert_transactions_batch(&mut self, txns: &[Transaction]) -> Result<usize> {
        for (i, txn) in txns.iter().enumerate() {
            txn.validate()
                .with_context(|| format!("Record {} is invalid", i + 1))?;
        }
        let tx = self.conn.transaction()?;
        for txn in txns {
            tx.execute(
                &format!(
                    "INSERT INTO {} (name, amount, category, date, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                    txn.kind.table()
                ),
                params![
                    txn.name,
                    txn.amount.to_string(),
                    txn.category,
                    txn.occurred_on.to_string(),
                    txn.created_at,
                ],
            )?;
        }
        tx.commit()?;
        debug!(count = txns.len(), "batch inserted");
        Ok(txns.len())
    }

    pub(crate) fn get_transaction(
        &self,
        kind: TransactionKind,
        id: i64,
    ) -> Result<Option<Transaction>> {
        let result = self.conn.query_row(
            &format!("SELECT {COLUMNS} FROM {} WHERE id = ?1", kind.table()),
            params![id],
            |row| row_to_transaction(kind, row),
        );
        match result {
            Ok(t) => Ok(Some(t)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// One page of records of a kind, newest first.
    pub(crate) fn list_transactions(
        &self,
        kind: TransactionKind,
        query: &ListQuery,
    ) -> Result<TransactionPage> {
        let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        let table = kind.table();
        let month_pat = query.month.as_ref().map(|m| format!("{m}%"));
        let filter = if month_pat.is_some() {
            " WHERE date LIKE ?1"
        } else {
            ""
        };
        let param_values: Vec<&dyn ToSql> = match &month_pat {
            Some(m) => vec![m as &dyn ToSql],
            None => vec![],
        };

        let total_count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {table}{filter}"),
            param_values.as_slice(),
            |row| row.get(0),
        )?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMNS} FROM {table}{filter}
             ORDER BY date DESC, id DESC LIMIT {limit} OFFSET {}",
            query.offset
        ))?;
        let rows = stmt.query_map(param_values.as_slice(), |row| row_to_transaction(kind, row))?;
        let items = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(TransactionPage {
            items,
            total_count,
            limit,
            offset: query.offset,
        })
    }

    /// Apply the provided fields and return the stored record, or `None` when
    /// no record has that id.
    pub(crate) fn update_transaction(
        &self,
        kind: TransactionKind,
        id: i64,
        update: &TransactionUpdate,
    ) -> Result<Option<Transaction>> {
        update.validate()?;
        let Some(mut txn) = self.get_transaction(kind, id)? else {
            return Ok(None);
        };
        if update.is_empty() {
            return Ok(Some(txn));
        }
        update.apply(&mut txn);

        self.conn.execute(
            &format!(
                "UPDATE {} SET name = ?1, amount = ?2, category = ?3, date = ?4, updated_at = ?5
                 WHERE id = ?6",
                kind.table()
            ),
            params![
                txn.name,
                txn.amount.to_string(),
                txn.category,
                txn.occurred_on.to_string(),
                chrono::Utc::now().to_rfc3339(),
                id,
            ],
        )?;
        debug!(%kind, id, "transaction updated");
        Ok(Some(txn))
    }

    pub(crate) fn delete_transaction(&self, kind: TransactionKind, id: i64) -> Result<bool> {
        let deleted = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", kind.table()),
            params![id],
        )?;
        debug!(%kind, id, deleted, "transaction delete");
        Ok(deleted > 0)
    }

    pub(crate) fn get_month_transactions(&self, month: &str) -> Result<Vec<Transaction>> {
        self.get_all_transactions(Some(month))
    }

    /// Both kinds, newest first, optionally limited to one "YYYY-MM" month.
    pub(crate) fn get_all_transactions(&self, month: Option<&str>) -> Result<Vec<Transaction>> {
        let month_pat = month.map(|m| format!("{m}%"));
        let mut all = Vec::new();
        for &kind in TransactionKind::all() {
            let (sql, param_values): (String, Vec<&dyn ToSql>) = match &month_pat
            {
                Some(m) => (
                    format!("SELECT {COLUMNS} FROM {} WHERE date LIKE ?1", kind.table()),
                    vec![m as &dyn ToSql],
                ),
                None => (format!("SELECT {COLUMNS} FROM {}", kind.table()), vec![]),
            };
            let mut stmt = self.conn.prepare(&sql)?;
            let rows =
                stmt.query_map(param_values.as_slice(), |row| row_to_transaction(kind, row))?;
            for row in rows {
                all.push(row?);
            }
        }
        all.sort_by(|a, b| {
            b.occurred_on
                .cmp(&a.occurred_on)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(all)
    }

    pub(crate) fn get_categories(&self, kind: TransactionKind) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT DISTINCT category FROM {} ORDER BY category",
            kind.table()
        ))?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // ── Aggregation helpers ───────────────────────────────────

    /// (category, amount) rows of one kind, optionally from `since` on.
    fn category_amounts(
        &self,
        kind: TransactionKind,
        since: Option<NaiveDate>,
    ) -> Result<Vec<(String, Decimal)>> {
        let since = since.map(|d| d.to_string());
        let (sql, param_values): (String, Vec<&dyn ToSql>) = match &since {
            Some(d) => (
                format!(
                    "SELECT category, amount FROM {} WHERE date >= ?1",
                    kind.table()
                ),
                vec![d as &dyn ToSql],
            ),
            None => (
                format!("SELECT category, amount FROM {}", kind.table()),
                vec![],
            ),
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(param_values.as_slice(), |row| {
            let amount_str: String = row.get(1)?;
            Ok((
                row.get::<_, String>(0)?,
                Decimal::from_str(&amount_str).unwrap_or_default(),
            ))
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// (date, amount) rows of one kind from `since` on.
    fn dated_amounts(
        &self,
        kind: TransactionKind,
        since: NaiveDate,
    ) -> Result<Vec<(String, Decimal)>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT date, amount FROM {} WHERE date >= ?1",
            kind.table()
        ))?;
        let rows = stmt.query_map(params![since.to_string()], |row| {
            let amount_str: String = row.get(1)?;
            Ok((
                row.get::<_, String>(0)?,
                Decimal::from_str(&amount_str).unwrap_or_default(),
            ))
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

// ── Analytics data source ─────────────────────────────────────

impl DataSource for Database {
    fn expense_amounts_since(&self, since: NaiveDate) -> Result<Vec<(String, Decimal)>> {
        self.category_amounts(TransactionKind::Expense, Some(since))
    }

    fn fetch_recent_transactions(&self, since: NaiveDate) -> Result<Vec<Transaction>> {
        let kind = TransactionKind::Expense;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMNS} FROM {} WHERE date >= ?1",
            kind.table()
        ))?;
        let rows = stmt.query_map(params![since.to_string()], |row| {
            row_to_transaction(kind, row)
        })?;
        let mut txns = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        // Amounts are TEXT; order numerically here rather than in SQL.
        txns.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| b.id.cmp(&a.id)));
        Ok(txns)
    }

    fn fetch_period_sums(
        &self,
        granularity: Granularity,
        since: NaiveDate,
    ) -> Result<Vec<PeriodSum>> {
        let key_len = granularity.key_len();
        let mut sums: BTreeMap<String, PeriodSum> = BTreeMap::new();
        for &kind in TransactionKind::all() {
            for (date, amount) in self.dated_amounts(kind, since)? {
                let Some(key) = date.get(..key_len) else {
                    continue;
                };
                sums.entry(key.to_string())
                    .or_insert_with(|| PeriodSum::empty(key))
                    .record(kind, amount);
            }
        }
        Ok(sums.into_values().collect())
    }

    fn fetch_category_totals(
        &self,
        kind: TransactionKind,
        since: Option<NaiveDate>,
    ) -> Result<Vec<CategoryTotal>> {
        let mut totals: BTreeMap<String, CategoryTotal> = BTreeMap::new();
        for (category, amount) in self.category_amounts(kind, since)? {
            let entry = totals
                .entry(category)
                .or_insert_with_key(|c| CategoryTotal::new(c.as_str(), Decimal::ZERO, 0));
            entry.total = entry.total.saturating_add(amount);
            entry.count = entry.count.saturating_add(1);
        }
        Ok(totals.into_values().collect())
    }

    fn fetch_totals(&self) -> Result<(Decimal, Decimal)> {
        let total = |kind: TransactionKind| -> Result<Decimal> {
            Ok(self
                .category_amounts(kind, None)?
                .into_iter()
                .fold(Decimal::ZERO, |acc, (_, amount)| acc.saturating_add(amount)))
        };
        Ok((
            total(TransactionKind::Income)?,
            total(TransactionKind::Expense)?,
        ))
    }
}

fn row_to_transaction(kind: TransactionKind, row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let amount_str: String = row.get(2)?;
    let date_str: String = row.get(4)?;
    let occurred_on = NaiveDate::from_str(&date_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    Ok(Transaction {
        id: Some(row.get(0)?),
        kind,
        name: row.get(1)?,
        amount: Decimal::from_str(&amount_str).unwrap_or_default(),
        category: row.get(3)?,
        occurred_on,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests;
