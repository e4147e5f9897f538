use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::baseline::{category_averages, CategoryBaseline};
use super::ratio::CategoryTotal;
use crate::models::{Transaction, TransactionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Month,
    Day,
}

impl Granularity {
    /// Length of the "YYYY-MM" / "YYYY-MM-DD" prefix of an ISO date.
    pub(crate) fn key_len(&self) -> usize {
        match self {
            Self::Month => 7,
            Self::Day => 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSum {
    pub period: String,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub income_count: u32,
    pub expense_count: u32,
}

impl PeriodSum {
    pub fn empty(period: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            total_income: Decimal::ZERO,
            total_expense: Decimal::ZERO,
            income_count: 0,
            expense_count: 0,
        }
    }

    /// Fold one record into the sums. Totals saturate instead of overflowing.
    pub fn record(&mut self, kind: TransactionKind, amount: Decimal) {
        match kind {
            TransactionKind::Income => {
                self.total_income = self.total_income.saturating_add(amount);
                self.income_count = self.income_count.saturating_add(1);
            }
            TransactionKind::Expense => {
                self.total_expense = self.total_expense.saturating_add(amount);
                self.expense_count = self.expense_count.saturating_add(1);
            }
        }
    }
}

/// Rows the analytics layer needs from storage. Implementations do the
/// fetching and windowing; every computation happens on the returned values.
pub trait DataSource {
    /// (category, amount) for every expense dated on or after `since`.
    fn expense_amounts_since(&self, since: NaiveDate) -> Result<Vec<(String, Decimal)>>;

    /// Expenses dated on or after `since`, largest amount first.
    fn fetch_recent_transactions(&self, since: NaiveDate) -> Result<Vec<Transaction>>;

    /// Income and expense sums per period, oldest first. Periods with no
    /// records are omitted.
    fn fetch_period_sums(&self, granularity: Granularity, since: NaiveDate)
        -> Result<Vec<PeriodSum>>;

    /// Sum and record count per category for one kind, optionally
    /// restricted to `since`.
    fn fetch_category_totals(
        &self,
        kind: TransactionKind,
        since: Option<NaiveDate>,
    ) -> Result<Vec<CategoryTotal>>;

    /// All-time (income, expense) totals.
    fn fetch_totals(&self) -> Result<(Decimal, Decimal)>;

    fn fetch_category_averages(&self, since: NaiveDate) -> Result<CategoryBaseline> {
        Ok(category_averages(self.expense_amounts_since(since)?))
    }
}
