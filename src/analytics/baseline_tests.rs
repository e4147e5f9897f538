#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

#[test]
fn test_category_averages_basic() {
    let baseline = category_averages(vec![
        ("Food", dec!(10)),
        ("Food", dec!(20)),
        ("Rent", dec!(1000)),
    ]);
    assert_eq!(baseline.len(), 2);
    assert_eq!(baseline.get("Food"), Some(dec!(15)));
    assert_eq!(baseline.get("Rent"), Some(dec!(1000)));
}

#[test]
fn test_category_averages_absent_category() {
    let baseline = category_averages(vec![("Food", dec!(10))]);
    assert_eq!(baseline.get("Travel"), None);
}

#[test]
fn test_category_averages_empty() {
    let rows: Vec<(String, Decimal)> = Vec::new();
    let baseline = category_averages(rows);
    assert!(baseline.is_empty());
}

#[test]
fn test_equal_amounts_average_exactly() {
    let rows = std::iter::repeat(("Coffee", dec!(3.33))).take(7);
    let baseline = category_averages(rows);
    assert_eq!(baseline.get("Coffee"), Some(dec!(3.33)));
}

#[test]
fn test_category_names_are_case_sensitive() {
    let baseline = category_averages(vec![("food", dec!(10)), ("Food", dec!(30))]);
    assert_eq!(baseline.get("food"), Some(dec!(10)));
    assert_eq!(baseline.get("Food"), Some(dec!(30)));
}

#[test]
fn test_baseline_from_iter() {
    let baseline: CategoryBaseline = vec![("Food".to_string(), dec!(12.5))]
        .into_iter()
        .collect();
    assert_eq!(baseline.get("Food"), Some(dec!(12.5)));
    assert_eq!(baseline.iter().count(), 1);
}

#[test]
fn test_mean() {
    assert_eq!(mean(&[dec!(1), dec!(2), dec!(3)]), Some(dec!(2)));
    assert_eq!(mean(&[]), None);
}

#[test]
fn test_category_averages_huge_amounts_saturate() {
    let baseline = category_averages(vec![("Big", Decimal::MAX), ("Big", Decimal::MAX)]);
    assert_eq!(baseline.get("Big"), Decimal::MAX.checked_div(dec!(2)));
    assert_eq!(
        mean(&[Decimal::MAX, Decimal::MAX, Decimal::MAX]),
        Decimal::MAX.checked_div(dec!(3))
    );
}
