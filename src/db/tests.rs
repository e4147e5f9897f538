#![allow(clippy::unwrap_used)]

use super::*;
use crate::analytics::report;
use rust_decimal_macros::dec;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn record(kind: TransactionKind, name: &str, amount: Decimal, category: &str, on: &str) -> Transaction {
    Transaction::new(kind, name.into(), amount, category.into(), date(on))
}

fn seeded() -> Database {
    let db = Database::open_in_memory().unwrap();
    let rows = [
        record(TransactionKind::Income, "Paycheck", dec!(3000), "Salary", "2024-02-01"),
        record(TransactionKind::Income, "Paycheck", dec!(3000), "Salary", "2024-03-01"),
        record(TransactionKind::Income, "Gig", dec!(250.50), "Freelance", "2024-03-08"),
        record(TransactionKind::Expense, "Rent", dec!(1200), "Housing", "2024-02-03"),
        record(TransactionKind::Expense, "Rent", dec!(1200), "Housing", "2024-03-03"),
        record(TransactionKind::Expense, "Groceries", dec!(80.25), "Food", "2024-03-04"),
        record(TransactionKind::Expense, "Dinner", dec!(45.10), "Food", "2024-03-09"),
    ];
    for r in &rows {
        db.insert_transaction(r).unwrap();
    }
    db
}

// ── Schema ────────────────────────────────────────────────────

#[test]
fn test_fresh_database_is_migrated() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.schema_version().unwrap(), schema::CURRENT_VERSION);
}

#[test]
fn test_reopen_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("findash.db");
    {
        let db = Database::open(&path).unwrap();
        db.insert_transaction(&record(
            TransactionKind::Expense,
            "Coffee",
            dec!(4.50),
            "Food",
            "2024-03-01",
        ))
        .unwrap();
    }
    let db = Database::open(&path).unwrap();
    assert_eq!(db.schema_version().unwrap(), schema::CURRENT_VERSION);
    let page = db
        .list_transactions(TransactionKind::Expense, &ListQuery::default())
        .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].amount, dec!(4.50));
}

// ── CRUD ──────────────────────────────────────────────────────

#[test]
fn test_insert_and_get() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .insert_transaction(&record(
            TransactionKind::Income,
            "Bonus",
            dec!(1234.56),
            "Salary",
            "2024-01-31",
        ))
        .unwrap();

    let fetched = db.get_transaction(TransactionKind::Income, id).unwrap().unwrap();
    assert_eq!(fetched.id, Some(id));
    assert_eq!(fetched.kind, TransactionKind::Income);
    assert_eq!(fetched.name, "Bonus");
    assert_eq!(fetched.amount, dec!(1234.56));
    assert_eq!(fetched.occurred_on, date("2024-01-31"));
}

#[test]
fn test_kinds_are_separate_tables() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .insert_transaction(&record(
            TransactionKind::Income,
            "Bonus",
            dec!(10),
            "Salary",
            "2024-01-31",
        ))
        .unwrap();
    assert!(db.get_transaction(TransactionKind::Expense, id).unwrap().is_none());
}

#[test]
fn test_get_not_found() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.get_transaction(TransactionKind::Expense, 99999).unwrap().is_none());
}

#[test]
fn test_insert_rejects_invalid() {
    let db = Database::open_in_memory().unwrap();
    let blank = record(TransactionKind::Expense, "  ", dec!(1), "Food", "2024-01-01");
    let negative = record(TransactionKind::Expense, "Tea", dec!(-1), "Food", "2024-01-01");
    assert!(db.insert_transaction(&blank).is_err());
    assert!(db.insert_transaction(&negative).is_err());
}

#[test]
fn test_batch_insert_is_all_or_nothing() {
    let mut db = Database::open_in_memory().unwrap();
    let rows = vec![
        record(TransactionKind::Expense, "Tea", dec!(3), "Food", "2024-01-01"),
        record(TransactionKind::Expense, "", dec!(3), "Food", "2024-01-02"),
    ];
    assert!(db.insert_transactions_batch(&rows).is_err());
    let page = db
        .list_transactions(TransactionKind::Expense, &ListQuery::default())
        .unwrap();
    assert_eq!(page.total_count, 0);

    let count = db.insert_transactions_batch(&rows[..1]).unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_list_newest_first_with_total() {
    let db = seeded();
    let page = db
        .list_transactions(TransactionKind::Expense, &ListQuery::default())
        .unwrap();
    assert_eq!(page.total_count, 4);
    assert_eq!(page.limit, DEFAULT_LIST_LIMIT);
    assert_eq!(page.offset, 0);
    let dates: Vec<String> = page.items.iter().map(|t| t.occurred_on.to_string()).collect();
    assert_eq!(
        dates,
        vec!["2024-03-09", "2024-03-04", "2024-03-03", "2024-02-03"]
    );
}

#[test]
fn test_list_pagination() {
    let db = seeded();
    let query = ListQuery {
        limit: Some(2),
        offset: 2,
        ..ListQuery::default()
    };
    let page = db.list_transactions(TransactionKind::Expense, &query).unwrap();
    assert_eq!(page.total_count, 4);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].occurred_on, date("2024-03-03"));
}

#[test]
fn test_list_month_filter() {
    let db = seeded();
    let query = ListQuery {
        month: Some("2024-02".into()),
        ..ListQuery::default()
    };
    let page = db.list_transactions(TransactionKind::Income, &query).unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].occurred_on, date("2024-02-01"));
}

#[test]
fn test_partial_update() {
    let db = seeded();
    let page = db
        .list_transactions(TransactionKind::Expense, &ListQuery::default())
        .unwrap();
    let id = page.items[0].id.unwrap();

    let update = TransactionUpdate {
        amount: Some(dec!(50)),
        ..TransactionUpdate::default()
    };
    let updated = db
        .update_transaction(TransactionKind::Expense, id, &update)
        .unwrap()
        .unwrap();
    assert_eq!(updated.amount, dec!(50));
    assert_eq!(updated.name, "Dinner");

    let stored = db.get_transaction(TransactionKind::Expense, id).unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[test]
fn test_update_missing_returns_none() {
    let db = seeded();
    let update = TransactionUpdate {
        name: Some("Renamed".into()),
        ..TransactionUpdate::default()
    };
    assert!(db
        .update_transaction(TransactionKind::Income, 4242, &update)
        .unwrap()
        .is_none());
}

#[test]
fn test_update_rejects_invalid() {
    let db = seeded();
    let update = TransactionUpdate {
        category: Some(String::new()),
        ..TransactionUpdate::default()
    };
    assert!(db.update_transaction(TransactionKind::Income, 1, &update).is_err());
}

#[test]
fn test_delete() {
    let db = seeded();
    assert!(db.delete_transaction(TransactionKind::Income, 1).unwrap());
    assert!(!db.delete_transaction(TransactionKind::Income, 1).unwrap());
    assert!(db.get_transaction(TransactionKind::Income, 1).unwrap().is_none());
}

#[test]
fn test_month_transactions_mix_kinds() {
    let db = seeded();
    let txns = db.get_month_transactions("2024-03").unwrap();
    assert_eq!(txns.len(), 5);
    assert_eq!(txns[0].occurred_on, date("2024-03-09"));
    assert!(txns.iter().any(|t| t.is_income()));
    assert!(txns.iter().any(|t| t.is_expense()));
}

#[test]
fn test_all_transactions() {
    let db = seeded();
    assert_eq!(db.get_all_transactions(None).unwrap().len(), 7);
}

#[test]
fn test_categories() {
    let db = seeded();
    assert_eq!(
        db.get_categories(TransactionKind::Expense).unwrap(),
        vec!["Food".to_string(), "Housing".to_string()]
    );
}

// ── Data source ───────────────────────────────────────────────

#[test]
fn test_totals_are_exact() {
    let db = seeded();
    let (income, expense) = db.fetch_totals().unwrap();
    assert_eq!(income, dec!(6250.50));
    assert_eq!(expense, dec!(2525.35));
}

#[test]
fn test_period_sums_by_month() {
    let db = seeded();
    let sums = db
        .fetch_period_sums(Granularity::Month, date("2024-01-01"))
        .unwrap();
    assert_eq!(sums.len(), 2);
    assert_eq!(sums[0].period, "2024-02");
    assert_eq!(sums[1].period, "2024-03");
    assert_eq!(sums[1].total_income, dec!(3250.50));
    assert_eq!(sums[1].total_expense, dec!(1325.35));
    assert_eq!((sums[1].income_count, sums[1].expense_count), (2, 3));
}

#[test]
fn test_period_sums_by_day() {
    let db = seeded();
    let sums = db
        .fetch_period_sums(Granularity::Day, date("2024-03-04"))
        .unwrap();
    let periods: Vec<&str> = sums.iter().map(|s| s.period.as_str()).collect();
    assert_eq!(periods, vec!["2024-03-04", "2024-03-08", "2024-03-09"]);
}

#[test]
fn test_recent_transactions_by_amount() {
    let db = seeded();
    let txns = db.fetch_recent_transactions(date("2024-03-01")).unwrap();
    let amounts: Vec<Decimal> = txns.iter().map(|t| t.amount).collect();
    assert_eq!(amounts, vec![dec!(1200), dec!(80.25), dec!(45.10)]);
    assert!(txns.iter().all(|t| t.is_expense()));
}

#[test]
fn test_category_averages() {
    let db = seeded();
    let baseline = db.fetch_category_averages(date("2024-01-01")).unwrap();
    assert_eq!(baseline.get("Housing"), Some(dec!(1200)));
    assert_eq!(baseline.get("Food"), Some(dec!(62.675)));
    assert_eq!(baseline.get("Salary"), None);
}

#[test]
fn test_category_totals_since() {
    let db = seeded();
    let totals = db
        .fetch_category_totals(TransactionKind::Expense, Some(date("2024-03-01")))
        .unwrap();
    assert_eq!(
        totals,
        vec![
            CategoryTotal::new("Food", dec!(125.35), 2),
            CategoryTotal::new("Housing", dec!(1200), 1),
        ]
    );
}

#[test]
fn test_report_over_database() {
    let db = seeded();
    let g = report::income_growth(&db, date("2024-03-20")).unwrap();
    assert_eq!(g.current, dec!(3250.50));
    assert_eq!(g.previous, dec!(3000));
    assert_eq!(g.growth.delta, dec!(250.50));
}

// ── Oversized amounts ─────────────────────────────────────────

/// Writes rows straight to the tables, skipping `validate`, the way an
/// older build or an external tool could have.
fn insert_raw(db: &Database, kind: TransactionKind, amount: Decimal, category: &str, on: &str) {
    db.conn
        .execute(
            &format!(
                "INSERT INTO {} (name, amount, category, date, created_at)
                 VALUES ('raw', ?1, ?2, ?3, '')",
                kind.table()
            ),
            params![amount.to_string(), category, on],
        )
        .unwrap();
}

#[test]
fn test_insert_rejects_amount_over_cap() {
    let db = Database::open_in_memory().unwrap();
    let txn = record(TransactionKind::Expense, "Yacht", Decimal::MAX, "Fun", "2024-03-01");
    assert!(db.insert_transaction(&txn).is_err());
    assert!(db.get_all_transactions(None).unwrap().is_empty());
}

#[test]
fn test_huge_stored_amounts_saturate() {
    let db = Database::open_in_memory().unwrap();
    for on in ["2024-03-02", "2024-03-05"] {
        insert_raw(&db, TransactionKind::Expense, Decimal::MAX, "Big", on);
        insert_raw(&db, TransactionKind::Income, Decimal::MAX, "Windfall", on);
    }

    assert_eq!(db.fetch_totals().unwrap(), (Decimal::MAX, Decimal::MAX));

    let sums = db
        .fetch_period_sums(Granularity::Month, date("2024-03-01"))
        .unwrap();
    assert_eq!(sums.len(), 1);
    assert_eq!(sums[0].total_expense, Decimal::MAX);
    assert_eq!(sums[0].expense_count, 2);

    let totals = db
        .fetch_category_totals(TransactionKind::Expense, None)
        .unwrap();
    assert_eq!(totals, vec![CategoryTotal::new("Big", Decimal::MAX, 2)]);

    let baseline = db.fetch_category_averages(date("2024-01-01")).unwrap();
    assert_eq!(baseline.get("Big"), Decimal::MAX.checked_div(dec!(2)));

    let today = date("2024-03-20");
    let dash = report::dashboard(&db, today, 5).unwrap();
    assert_eq!(dash.total_expense, Decimal::MAX);
    assert_eq!(dash.net_cash_flow, Decimal::ZERO);
    assert_eq!(dash.top_expense_categories[0].count, 2);

    let months = report::cash_flow_summary(&db, today, 3).unwrap();
    assert_eq!(months[0].net_cash_flow, Decimal::ZERO);

    let options = report::AnomalyOptions::default();
    let anomalies = report::anomalies(&db, today, &options).unwrap();
    assert_eq!(anomalies.results().len(), 2);
}
