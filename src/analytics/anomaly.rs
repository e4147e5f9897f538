use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use super::baseline::CategoryBaseline;
use crate::models::Transaction;

/// Threshold used when the caller passes a non-positive (or NaN) value.
pub const DEFAULT_THRESHOLD: f64 = 1.5;

/// Upper bound callers accept for a user-supplied threshold.
pub const MAX_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Medium,
    High,
    Critical,
}

/// Lower bounds (exclusive), sorted descending. A deviation above the
/// threshold that clears none of these is `Medium`.
const SEVERITY_BANDS: &[(f64, Severity)] = &[(3.0, Severity::Critical), (2.0, Severity::High)];

impl Severity {
    pub fn classify(deviation_factor: f64) -> Self {
        SEVERITY_BANDS
            .iter()
            .find(|(bound, _)| deviation_factor > *bound)
            .map(|(_, severity)| *severity)
            .unwrap_or(Severity::Medium)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyResult<'a> {
    pub transaction: &'a Transaction,
    pub category_average: Decimal,
    pub deviation_factor: f64,
    pub severity: Severity,
}

pub fn effective_threshold(threshold: f64) -> f64 {
    if threshold.is_nan() || threshold <= 0.0 {
        DEFAULT_THRESHOLD
    } else {
        threshold
    }
}

/// Flag transactions whose amount exceeds `threshold` times their category
/// average. Transactions without a positive baseline are skipped. Output keeps
/// the input order.
pub fn detect_anomalies<'a>(
    baseline: &CategoryBaseline,
    transactions: &'a [Transaction],
    threshold: f64,
) -> Vec<AnomalyResult<'a>> {
    let threshold = effective_threshold(threshold);

    transactions
        .iter()
        .filter_map(|txn| {
            let average = baseline.get(&txn.category)?;
            let deviation_factor = deviation(txn.amount, average)?;
            (deviation_factor > threshold).then(|| AnomalyResult {
                transaction: txn,
                category_average: average,
                deviation_factor,
                severity: Severity::classify(deviation_factor),
            })
        })
        .collect()
}

/// `amount / average` as f64; `None` unless the average is strictly positive
/// and the quotient is finite.
fn deviation(amount: Decimal, average: Decimal) -> Option<f64> {
    if average <= Decimal::ZERO {
        return None;
    }
    let factor = amount.to_f64()? / average.to_f64()?;
    factor.is_finite().then_some(factor)
}

#[cfg(test)]
#[path = "anomaly_tests.rs"]
mod tests;
