#![allow(clippy::unwrap_used)]

use super::*;
use crate::db::{Database, ListQuery};
use rust_decimal_macros::dec;
use std::io::Write;

fn make_csv_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

// ── parse_decimal ─────────────────────────────────────────────

#[test]
fn test_parse_decimal_basic() {
    assert_eq!(parse_decimal("100.50").unwrap(), dec!(100.50));
    assert_eq!(parse_decimal("-42.99").unwrap(), dec!(-42.99));
}

#[test]
fn test_parse_decimal_with_currency() {
    assert_eq!(parse_decimal("$1,234.56").unwrap(), dec!(1234.56));
    assert_eq!(parse_decimal("-$99.99").unwrap(), dec!(-99.99));
}

#[test]
fn test_parse_decimal_parentheses_negative() {
    assert_eq!(parse_decimal("(500.00)").unwrap(), dec!(-500.00));
}

#[test]
fn test_parse_decimal_quoted() {
    assert_eq!(parse_decimal("\"100.00\"").unwrap(), dec!(100.00));
}

#[test]
fn test_parse_decimal_invalid() {
    assert!(parse_decimal("not_a_number").is_err());
    assert!(parse_decimal("  ").is_err());
}

// ── parse_date ────────────────────────────────────────────────

#[test]
fn test_parse_date_formats() {
    let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    assert_eq!(parse_date("2024-01-15").unwrap(), expected);
    assert_eq!(parse_date("01/15/2024").unwrap(), expected);
    assert_eq!(parse_date("01-15-2024").unwrap(), expected);
    assert_eq!(parse_date("01/15/24").unwrap(), expected);
    assert_eq!(parse_date("15.01.2024").unwrap(), expected);
}

#[test]
fn test_parse_date_invalid() {
    assert!(parse_date("not-a-date").is_err());
    assert!(parse_date("").is_err());
}

// ── read / parse ──────────────────────────────────────────────

#[test]
fn test_read_with_header() {
    let file = make_csv_file("Date,Description,Amount,Category\n2024-01-05,Paycheck,3000,Salary\n");
    let (layout, rows) = CsvImporter::read(file.path()).unwrap();
    assert!(layout.has_header);
    assert_eq!(layout.name_column, Some(1));
    assert_eq!(rows.len(), 1);
}

#[test]
fn test_read_without_header() {
    let file = make_csv_file("2024-01-05,Paycheck,3000,Salary\n2024-02-05,Paycheck,3100,Salary\n");
    let (layout, rows) = CsvImporter::read(file.path()).unwrap();
    assert!(!layout.has_header);
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_read_empty_file() {
    let file = make_csv_file("");
    assert!(CsvImporter::read(file.path()).is_err());
}

#[test]
fn test_parse_rows() {
    let rows = vec![
        vec!["2024-03-01".into(), "Groceries".into(), "$82.10".into(), "Food".into()],
        vec!["".into(), "".into(), "".into(), "".into()],
        vec!["03/02/2024".into(), "".into(), "(12.00)".into(), "".into()],
    ];
    let txns = CsvImporter::parse(&rows, &CsvLayout::default(), TransactionKind::Expense).unwrap();
    assert_eq!(txns.len(), 2);
    assert_eq!(txns[0].amount, dec!(82.10));
    assert_eq!(txns[0].category, "Food");
    assert!(txns[0].is_expense());
    // Negative input is stored as its absolute value.
    assert_eq!(txns[1].amount, dec!(12.00));
    assert_eq!(txns[1].category, DEFAULT_CATEGORY);
    assert_eq!(txns[1].name, DEFAULT_CATEGORY);
}

#[test]
fn test_parse_reports_line_number() {
    let rows = vec![
        vec!["2024-03-01".into(), "Ok".into(), "1".into(), "Food".into()],
        vec!["2024-03-02".into(), "Bad".into(), "abc".into(), "Food".into()],
    ];
    let err = CsvImporter::parse(&rows, &CsvLayout::default(), TransactionKind::Expense)
        .unwrap_err();
    assert!(err.to_string().contains("Line 3"));
}

// ── Database round trip ───────────────────────────────────────

#[test]
fn test_import_into_database() {
    let mut db = Database::open_in_memory().unwrap();
    let file = make_csv_file(
        "date,name,amount,category\n2024-01-05,Paycheck,3000,Salary\n2024-01-20,Side gig,450.75,Freelance\n",
    );
    let count = crate::import::import_csv(&mut db, file.path(), TransactionKind::Income).unwrap();
    assert_eq!(count, 2);
    let page = db
        .list_transactions(TransactionKind::Income, &ListQuery::default())
        .unwrap();
    assert_eq!(page.total_count, 2);
    assert_eq!(page.items[0].name, "Side gig");
    assert_eq!(page.items[0].amount, dec!(450.75));
}

#[test]
fn test_export_month() {
    let db = Database::open_in_memory().unwrap();
    let on = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
    for (kind, name, amount, date) in [
        (TransactionKind::Income, "Paycheck", dec!(3000), "2024-03-01"),
        (TransactionKind::Expense, "Rent, March", dec!(1200), "2024-03-02"),
        (TransactionKind::Expense, "Rent", dec!(1200), "2024-02-02"),
    ] {
        db.insert_transaction(&Transaction::new(kind, name.into(), amount, "Home".into(), on(date)))
            .unwrap();
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("march.csv");
    let count = crate::import::export_csv(&db, &path, Some("2024-03")).unwrap();
    assert_eq!(count, 2);

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "date,kind,name,amount,category");
    assert_eq!(lines[1], "2024-03-02,expense,\"Rent, March\",1200,Home");
    assert_eq!(lines[2], "2024-03-01,income,Paycheck,3000,Home");
}

#[test]
fn test_exported_file_reimports() {
    let txns = vec![Transaction::new(
        TransactionKind::Expense,
        "Taxi".into(),
        dec!(23.40),
        "Transport".into(),
        NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
    )];
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    export_to_csv(&txns, &path).unwrap();

    let (layout, rows) = CsvImporter::read(&path).unwrap();
    assert_eq!(layout.amount_column, 3);
    let parsed = CsvImporter::parse(&rows, &layout, TransactionKind::Expense).unwrap();
    assert_eq!(parsed[0].name, "Taxi");
    assert_eq!(parsed[0].amount, dec!(23.40));
    assert_eq!(parsed[0].category, "Transport");
}
