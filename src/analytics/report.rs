//! Analytics reports: fetch from a [`DataSource`], compute with the pure
//! baseline/anomaly/ratio functions, return a serializable result.

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::anomaly::{detect_anomalies, effective_threshold, AnomalyResult};
use super::baseline::{mean, CategoryBaseline};
use super::ratio::{
    growth, savings_rate, share_of_wallet, stability_ratio, trend_series, Growth, PeriodTotal,
    Stability, TrendPoint, WalletShare,
};
use super::source::{DataSource, Granularity, PeriodSum};
use crate::models::{Transaction, TransactionKind};

/// Days covered by the dashboard's daily averages.
const DAILY_AVERAGE_DAYS: i64 = 30;

// ── Date helpers ──────────────────────────────────────────────

pub(crate) fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

pub(crate) fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// `date` moved back `months` calendar months, clamped to the month's end.
pub(crate) fn months_back(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

fn sums_for(sums: &[PeriodSum], period: &str) -> (Decimal, Decimal) {
    sums.iter()
        .find(|s| s.period == period)
        .map(|s| (s.total_income, s.total_expense))
        .unwrap_or((Decimal::ZERO, Decimal::ZERO))
}

// ── Dashboard ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub month: String,
    pub total_income: Decimal,
    pub monthly_income: Decimal,
    pub daily_avg_income: Decimal,
    pub total_expense: Decimal,
    pub monthly_expense: Decimal,
    pub daily_avg_expense: Decimal,
    pub net_cash_flow: Decimal,
    pub savings_rate: f64,
    pub stability: Stability,
    pub top_expense_categories: Vec<WalletShare>,
}

pub fn dashboard(source: &impl DataSource, today: NaiveDate, top_n: usize) -> Result<Dashboard> {
    let (total_income, total_expense) = source
        .fetch_totals()
        .context("Failed to calculate totals")?;

    let month = month_key(today);
    let monthly = source
        .fetch_period_sums(Granularity::Month, month_start(today))
        .context("Failed to calculate monthly totals")?;
    let (monthly_income, monthly_expense) = sums_for(&monthly, &month);

    let daily = source
        .fetch_period_sums(
            Granularity::Day,
            today - Duration::days(DAILY_AVERAGE_DAYS),
        )
        .context("Failed to calculate daily averages")?;
    let daily_incomes: Vec<Decimal> = daily
        .iter()
        .map(|d| d.total_income)
        .filter(|v| *v > Decimal::ZERO)
        .collect();
    let daily_expenses: Vec<Decimal> = daily
        .iter()
        .map(|d| d.total_expense)
        .filter(|v| *v > Decimal::ZERO)
        .collect();

    let mut top_expense_categories = share_of_wallet(
        &source
            .fetch_category_totals(TransactionKind::Expense, None)
            .context("Failed to get expense categories")?,
    );
    top_expense_categories.truncate(top_n);

    debug!(%month, days = daily.len(), "dashboard computed");

    Ok(Dashboard {
        month,
        total_income,
        monthly_income,
        daily_avg_income: mean(&daily_incomes).unwrap_or(Decimal::ZERO),
        total_expense,
        monthly_expense,
        daily_avg_expense: mean(&daily_expenses).unwrap_or(Decimal::ZERO),
        net_cash_flow: total_income.saturating_sub(total_expense),
        savings_rate: savings_rate(total_income, total_expense),
        stability: stability_ratio(total_income, total_expense),
        top_expense_categories,
    })
}

// ── Anomalies ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyOptions {
    pub threshold: f64,
    /// Trailing window for category averages.
    pub baseline_months: u32,
    /// Window of expenses that get evaluated.
    pub recent_months: u32,
}

impl Default for AnomalyOptions {
    fn default() -> Self {
        Self {
            threshold: super::anomaly::DEFAULT_THRESHOLD,
            baseline_months: 3,
            recent_months: 1,
        }
    }
}

/// Fetched inputs of one anomaly pass. Results borrow from the report.
#[derive(Debug, Clone)]
pub struct AnomalyReport {
    pub threshold: f64,
    pub baseline_since: NaiveDate,
    pub recent_since: NaiveDate,
    baseline: CategoryBaseline,
    transactions: Vec<Transaction>,
}

impl AnomalyReport {
    pub fn results(&self) -> Vec<AnomalyResult<'_>> {
        detect_anomalies(&self.baseline, &self.transactions, self.threshold)
    }

    pub fn baseline(&self) -> &CategoryBaseline {
        &self.baseline
    }

    /// Number of recent expenses considered.
    pub fn evaluated(&self) -> usize {
        self.transactions.len()
    }
}

pub fn anomalies(
    source: &impl DataSource,
    today: NaiveDate,
    options: &AnomalyOptions,
) -> Result<AnomalyReport> {
    let baseline_since = months_back(today, options.baseline_months);
    let recent_since = months_back(today, options.recent_months);

    let baseline = source
        .fetch_category_averages(baseline_since)
        .context("Failed to calculate category averages")?;
    let transactions = source
        .fetch_recent_transactions(recent_since)
        .context("Failed to fetch recent expenses")?;

    debug!(
        categories = baseline.len(),
        transactions = transactions.len(),
        "anomaly inputs fetched"
    );

    Ok(AnomalyReport {
        threshold: effective_threshold(options.threshold),
        baseline_since,
        recent_since,
        baseline,
        transactions,
    })
}

// ── Income growth ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthReport {
    pub current_month: String,
    pub previous_month: String,
    pub current: Decimal,
    pub previous: Decimal,
    pub growth: Growth,
}

/// Income of the current calendar month against the previous one.
pub fn income_growth(source: &impl DataSource, today: NaiveDate) -> Result<GrowthReport> {
    let this_month = month_start(today);
    let last_month = months_back(this_month, 1);
    let sums = source
        .fetch_period_sums(Granularity::Month, last_month)
        .context("Failed to calculate growth")?;

    let current_month = month_key(this_month);
    let previous_month = month_key(last_month);
    let (current, _) = sums_for(&sums, &current_month);
    let (previous, _) = sums_for(&sums, &previous_month);

    Ok(GrowthReport {
        current_month,
        previous_month,
        current,
        previous,
        growth: growth(current, previous),
    })
}

// ── Expense trends ────────────────────────────────────────────

/// Monthly expense totals for the last `months` calendar months (current
/// month included) with month-over-month change.
pub fn expense_trends(
    source: &impl DataSource,
    today: NaiveDate,
    months: u32,
) -> Result<Vec<TrendPoint>> {
    let since = month_start(months_back(today, months.max(1) - 1));
    let sums = source
        .fetch_period_sums(Granularity::Month, since)
        .context("Failed to get trends")?;
    let totals: Vec<PeriodTotal> = sums
        .into_iter()
        .map(|s| PeriodTotal::new(s.period, s.total_expense, s.expense_count))
        .collect();
    Ok(trend_series(&totals))
}

// ── Top expense categories ────────────────────────────────────

pub fn top_expense_categories(
    source: &impl DataSource,
    since: Option<NaiveDate>,
    limit: usize,
) -> Result<Vec<WalletShare>> {
    let totals = source
        .fetch_category_totals(TransactionKind::Expense, since)
        .context("Failed to get top expenses")?;
    let mut shares = share_of_wallet(&totals);
    shares.truncate(limit);
    Ok(shares)
}

// ── Cash flow ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashFlowMonth {
    pub period: String,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_cash_flow: Decimal,
    pub savings_rate: f64,
    pub stability: Stability,
}

pub fn cash_flow_summary(
    source: &impl DataSource,
    today: NaiveDate,
    months: u32,
) -> Result<Vec<CashFlowMonth>> {
    let since = month_start(months_back(today, months.max(1) - 1));
    let sums = source
        .fetch_period_sums(Granularity::Month, since)
        .context("Failed to get cash flow summary")?;
    Ok(sums
        .into_iter()
        .map(|s| CashFlowMonth {
            net_cash_flow: s.total_income.saturating_sub(s.total_expense),
            savings_rate: savings_rate(s.total_income, s.total_expense),
            stability: stability_ratio(s.total_income, s.total_expense),
            period: s.period,
            total_income: s.total_income,
            total_expense: s.total_expense,
        })
        .collect())
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
