use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// Mean expense amount per category over a trailing window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CategoryBaseline {
    averages: HashMap<String, Decimal>,
}

impl CategoryBaseline {
    pub fn get(&self, category: &str) -> Option<Decimal> {
        self.averages.get(category).copied()
    }

    pub fn len(&self) -> usize {
        self.averages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.averages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.averages.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, Decimal)> for CategoryBaseline {
    fn from_iter<I: IntoIterator<Item = (String, Decimal)>>(iter: I) -> Self {
        Self {
            averages: iter.into_iter().collect(),
        }
    }
}

/// Reduce (category, amount) pairs to category → mean amount.
///
/// Categories that never appear in `rows` are absent from the result. Sums
/// saturate at `Decimal::MAX`.
pub fn category_averages<I, S>(rows: I) -> CategoryBaseline
where
    I: IntoIterator<Item = (S, Decimal)>,
    S: Into<String>,
{
    let mut sums: HashMap<String, (Decimal, u32)> = HashMap::new();
    for (category, amount) in rows {
        let entry = sums.entry(category.into()).or_insert((Decimal::ZERO, 0));
        entry.0 = entry.0.saturating_add(amount);
        entry.1 = entry.1.saturating_add(1);
    }

    sums.into_iter()
        .filter_map(|(category, (sum, count))| {
            mean_of(sum, count).map(|avg| (category, avg))
        })
        .collect()
}

/// Arithmetic mean of a slice of amounts; `None` when empty.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    let sum = values
        .iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v));
    mean_of(sum, u32::try_from(values.len()).ok()?)
}

fn mean_of(sum: Decimal, count: u32) -> Option<Decimal> {
    if count == 0 {
        return None;
    }
    sum.checked_div(Decimal::from(count))
}

#[cfg(test)]
#[path = "baseline_tests.rs"]
mod tests;
