#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::transaction::MAX_AMOUNT;
use super::*;

// ── Transaction ───────────────────────────────────────────────

fn make_txn(kind: TransactionKind, amount: Decimal) -> Transaction {
    Transaction {
        id: None,
        kind,
        name: "Test".into(),
        amount,
        category: "Food".into(),
        occurred_on: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        created_at: String::new(),
    }
}

#[test]
fn test_income() {
    let txn = make_txn(TransactionKind::Income, dec!(100.00));
    assert!(txn.is_income());
    assert!(!txn.is_expense());
    assert_eq!(txn.signed_amount(), dec!(100.00));
}

#[test]
fn test_expense_signed_amount_is_negative() {
    let txn = make_txn(TransactionKind::Expense, dec!(50.00));
    assert!(txn.is_expense());
    assert_eq!(txn.signed_amount(), dec!(-50.00));
}

#[test]
fn test_new_sets_created_at() {
    let txn = Transaction::new(
        TransactionKind::Income,
        "Salary".into(),
        dec!(3000),
        "Salary".into(),
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
    );
    assert!(txn.id.is_none());
    assert!(!txn.created_at.is_empty());
}

#[test]
fn test_validate_rejects_blank_name() {
    let mut txn = make_txn(TransactionKind::Expense, dec!(10));
    txn.name = "   ".into();
    assert!(txn.validate().is_err());
}

#[test]
fn test_validate_rejects_blank_category() {
    let mut txn = make_txn(TransactionKind::Expense, dec!(10));
    txn.category = String::new();
    assert!(txn.validate().is_err());
}

#[test]
fn test_validate_rejects_negative_amount() {
    let txn = make_txn(TransactionKind::Expense, dec!(-0.01));
    assert!(txn.validate().is_err());
}

#[test]
fn test_validate_accepts_zero_amount() {
    let txn = make_txn(TransactionKind::Income, Decimal::ZERO);
    assert!(txn.validate().is_ok());
}

#[test]
fn test_validate_amount_cap() {
    assert_eq!(MAX_AMOUNT, dec!(1000000000000));
    assert!(make_txn(TransactionKind::Expense, MAX_AMOUNT).validate().is_ok());
    let txn = make_txn(TransactionKind::Expense, MAX_AMOUNT + dec!(0.01));
    assert!(txn.validate().is_err());
    assert!(make_txn(TransactionKind::Income, Decimal::MAX).validate().is_err());
}

// ── TransactionKind ───────────────────────────────────────────

#[test]
fn test_kind_parse() {
    assert_eq!(TransactionKind::parse("income"), Some(TransactionKind::Income));
    assert_eq!(TransactionKind::parse("INCOME"), Some(TransactionKind::Income));
    assert_eq!(TransactionKind::parse("expenses"), Some(TransactionKind::Expense));
    assert_eq!(TransactionKind::parse("exp"), Some(TransactionKind::Expense));
    assert_eq!(TransactionKind::parse("transfer"), None);
}

#[test]
fn test_kind_roundtrip() {
    for k in TransactionKind::all() {
        assert_eq!(TransactionKind::parse(k.as_str()), Some(*k));
    }
}

#[test]
fn test_kind_display_and_table() {
    assert_eq!(format!("{}", TransactionKind::Income), "Income");
    assert_eq!(TransactionKind::Income.table(), "incomes");
    assert_eq!(TransactionKind::Expense.table(), "expenses");
}

// ── TransactionUpdate ─────────────────────────────────────────

#[test]
fn test_update_empty() {
    assert!(TransactionUpdate::default().is_empty());
    let upd = TransactionUpdate {
        name: Some("x".into()),
        ..Default::default()
    };
    assert!(!upd.is_empty());
}

#[test]
fn test_update_apply_only_touches_given_fields() {
    let mut txn = make_txn(TransactionKind::Expense, dec!(10));
    let upd = TransactionUpdate {
        amount: Some(dec!(12.50)),
        category: Some("Dining".into()),
        ..Default::default()
    };
    upd.apply(&mut txn);
    assert_eq!(txn.amount, dec!(12.50));
    assert_eq!(txn.category, "Dining");
    assert_eq!(txn.name, "Test");
    assert_eq!(txn.occurred_on, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
}

#[test]
fn test_update_validate() {
    let upd = TransactionUpdate {
        amount: Some(dec!(-1)),
        ..Default::default()
    };
    assert!(upd.validate().is_err());
    assert!(TransactionUpdate::default().validate().is_ok());
}

// ── currency ──────────────────────────────────────────────────

#[test]
fn test_currency_symbol() {
    assert_eq!(currency::symbol("USD"), "$");
    assert_eq!(currency::symbol("eur"), "€");
    assert_eq!(currency::symbol("UAH"), "₴");
}

#[test]
fn test_currency_symbol_unknown_falls_back_to_code() {
    assert_eq!(currency::symbol("XYZ"), "XYZ");
    assert!(!currency::is_supported("XYZ"));
    assert!(currency::is_supported("gbp"));
}
