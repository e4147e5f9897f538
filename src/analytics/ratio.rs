//! Derived financial ratios over aggregate sums.
//!
//! Every function here is total: zero and negative denominators have a
//! defined result instead of a division fault.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StabilityStatus {
    Excellent,
    Good,
    Stable,
    Warning,
    Critical,
}

/// Inclusive lower bounds, sorted descending. Anything below the last bound
/// is `Critical`.
const STABILITY_BANDS: &[(f64, StabilityStatus)] = &[
    (1.5, StabilityStatus::Excellent),
    (1.2, StabilityStatus::Good),
    (1.0, StabilityStatus::Stable),
    (0.9, StabilityStatus::Warning),
];

impl StabilityStatus {
    pub fn classify(ratio: f64) -> Self {
        STABILITY_BANDS
            .iter()
            .find(|(bound, _)| ratio >= *bound)
            .map(|(_, status)| *status)
            .unwrap_or(StabilityStatus::Critical)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Stable => "Stable",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for StabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stability {
    pub ratio: f64,
    pub status: StabilityStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Growth {
    pub delta: Decimal,
    pub percentage: f64,
}

/// Aggregate of one category: summed amount and number of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
    pub count: u32,
}

impl CategoryTotal {
    pub fn new(category: impl Into<String>, total: Decimal, count: u32) -> Self {
        Self {
            category: category.into(),
            total,
            count,
        }
    }
}

/// Aggregate of one period, oldest first in a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodTotal {
    pub period: String,
    pub total: Decimal,
    pub count: u32,
}

impl PeriodTotal {
    pub fn new(period: impl Into<String>, total: Decimal, count: u32) -> Self {
        Self {
            period: period.into(),
            total,
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletShare {
    pub category: String,
    pub total: Decimal,
    pub count: u32,
    pub share_percentage: f64,
    pub cumulative_percentage: f64,
    pub rank: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendChange {
    pub amount: Decimal,
    pub percentage: f64,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub period: String,
    pub total: Decimal,
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<TrendChange>,
}

/// `((income - expense) / income) * 100`, or 0 when income is not positive.
pub fn savings_rate(total_income: Decimal, total_expense: Decimal) -> f64 {
    if total_income <= Decimal::ZERO {
        return 0.0;
    }
    percent_of(total_income.saturating_sub(total_expense), total_income)
}

/// `income / expense` banded into a status. The ratio is 0 (and therefore
/// `Critical`) when expense is not positive.
pub fn stability_ratio(total_income: Decimal, total_expense: Decimal) -> Stability {
    let ratio = if total_expense > Decimal::ZERO {
        total_income
            .checked_div(total_expense)
            .and_then(|r| r.to_f64())
            .unwrap_or(0.0)
    } else {
        0.0
    };
    Stability {
        ratio,
        status: StabilityStatus::classify(ratio),
    }
}

pub fn growth(current: Decimal, previous: Decimal) -> Growth {
    let delta = current.saturating_sub(previous);
    let percentage = if previous > Decimal::ZERO {
        percent_of(delta, previous)
    } else if current > Decimal::ZERO {
        100.0
    } else {
        0.0
    };
    Growth { delta, percentage }
}

/// Rank categories by descending total (ties keep input order) and compute
/// each one's share of the overall total plus the running cumulative share.
pub fn share_of_wallet(category_totals: &[CategoryTotal]) -> Vec<WalletShare> {
    let mut ranked: Vec<&CategoryTotal> = category_totals.iter().collect();
    ranked.sort_by(|a, b| b.total.cmp(&a.total));

    let grand_total = category_totals
        .iter()
        .fold(Decimal::ZERO, |acc, c| acc.saturating_add(c.total));

    let mut cumulative = Decimal::ZERO;
    ranked
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let share = if grand_total > Decimal::ZERO {
                percent_decimal(c.total, grand_total)
            } else {
                Decimal::ZERO
            };
            cumulative = cumulative.saturating_add(share);
            WalletShare {
                category: c.category.clone(),
                total: c.total,
                count: c.count,
                share_percentage: share.to_f64().unwrap_or(0.0),
                cumulative_percentage: cumulative.to_f64().unwrap_or(0.0),
                rank: i + 1,
            }
        })
        .collect()
}

/// Period-over-period changes for an ordered series of totals. The first
/// point has no change.
pub fn trend_series(totals: &[PeriodTotal]) -> Vec<TrendPoint> {
    let mut previous: Option<Decimal> = None;
    totals
        .iter()
        .map(|p| {
            let change = previous.map(|prev| {
                let g = growth(p.total, prev);
                TrendChange {
                    amount: g.delta,
                    percentage: g.percentage,
                    direction: direction_of(g.delta),
                }
            });
            previous = Some(p.total);
            TrendPoint {
                period: p.period.clone(),
                total: p.total,
                count: p.count,
                change,
            }
        })
        .collect()
}

fn direction_of(delta: Decimal) -> TrendDirection {
    if delta > Decimal::ZERO {
        TrendDirection::Up
    } else if delta < Decimal::ZERO {
        TrendDirection::Down
    } else {
        TrendDirection::Flat
    }
}

fn percent_of(numerator: Decimal, denominator: Decimal) -> f64 {
    percent_decimal(numerator, denominator)
        .to_f64()
        .unwrap_or(0.0)
}

fn percent_decimal(numerator: Decimal, denominator: Decimal) -> Decimal {
    numerator
        .checked_div(denominator)
        .and_then(|q| q.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
#[path = "ratio_tests.rs"]
mod tests;
