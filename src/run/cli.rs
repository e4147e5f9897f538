use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::analytics::report::{self, month_key};
use crate::analytics::{AnomalyOptions, AnomalyResult};
use crate::config::{validate_threshold, Config};
use crate::db::{Database, ListQuery};
use crate::import::{self, parse_date, parse_decimal};
use crate::models::{Transaction, TransactionKind, TransactionUpdate};
use crate::ui::util::{format_amount, format_change, format_percent, truncate};

/// Flags that consume the following argument.
const VALUE_FLAGS: &[&str] = &[
    "--month",
    "--limit",
    "--offset",
    "--threshold",
    "--months",
    "--since",
    "--name",
    "--amount",
    "--category",
    "--date",
];

pub(crate) fn as_cli(args: &[String], config: &Config, db: &mut Database) -> Result<()> {
    let rest = &args[2..];
    let ctx = Ctx {
        config,
        today: Local::now().date_naive(),
        json: rest.iter().any(|a| a == "--json"),
    };

    match args[1].as_str() {
        "add" => cli_add(rest, &ctx, db),
        "list" | "ls" => cli_list(rest, &ctx, db),
        "show" => cli_show(rest, &ctx, db),
        "update" => cli_update(rest, &ctx, db),
        "delete" | "rm" => cli_delete(rest, db),
        "dashboard" | "d" => cli_dashboard(&ctx, db),
        "anomalies" | "a" => cli_anomalies(rest, &ctx, db),
        "growth" => cli_growth(&ctx, db),
        "trends" => cli_trends(rest, &ctx, db),
        "top" => cli_top(rest, &ctx, db),
        "cashflow" => cli_cashflow(rest, &ctx, db),
        "categories" => cli_categories(rest, &ctx, db),
        "import" => cli_import(rest, db),
        "export" => cli_export(rest, &ctx, db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!(
                "findash {} (schema v{})",
                env!("CARGO_PKG_VERSION"),
                db.schema_version()?
            );
            Ok(())
        }
        other => {
            print_usage();
            bail!("Unknown command: {other}");
        }
    }
}

struct Ctx<'a> {
    config: &'a Config,
    today: NaiveDate,
    json: bool,
}

impl Ctx<'_> {
    fn money(&self, amount: Decimal) -> String {
        format_amount(amount, self.config.currency_symbol())
    }
}

fn print_usage() {
    println!("FinDash - income, expenses and cash-flow analytics");
    println!();
    println!("Usage: findash [command]");
    println!();
    println!("Commands:");
    println!("  (none)                                  Launch interactive TUI");
    println!("  add <kind> <date> <category> <name> <amount>");
    println!("                                          Record an income or expense");
    println!("  list <kind> [--month YYYY-MM] [--limit N] [--offset N]");
    println!("  show <kind> <id>                        Show one record");
    println!("  update <kind> <id> [--name S] [--amount N] [--category S] [--date D]");
    println!("  delete <kind> <id>                      Delete one record");
    println!("  dashboard                               Totals, ratios and top categories");
    println!("  anomalies [--threshold N]               Unusually large recent expenses");
    println!("  growth                                  Income vs previous month");
    println!("  trends [--months N]                     Monthly expense trend");
    println!("  top [--limit N] [--since YYYY-MM-DD]    Top expense categories");
    println!("  cashflow [--months N]                   Monthly cash-flow summary");
    println!("  categories <kind>                       List categories in use");
    println!("  import <kind> <file.csv>                Import CSV rows as one kind");
    println!("  export [path] [--month YYYY-MM|all]     Export records to CSV");
    println!("  --help, -h                              Show this help");
    println!("  --version, -V                           Show version");
    println!();
    println!("<kind> is income or expense. Read-only commands accept --json.");
}

// ── Argument helpers ─────────────────────────────────────────

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn parsed_flag<T: std::str::FromStr>(args: &[String], name: &str) -> Result<Option<T>> {
    flag(args, name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| anyhow::anyhow!("Invalid value for {name}: {raw}"))
        })
        .transpose()
}

/// Arguments that are neither flags nor flag values.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut skip = false;
    for arg in args {
        if skip {
            skip = false;
        } else if VALUE_FLAGS.contains(&arg.as_str()) {
            skip = true;
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

fn kind_arg(arg: Option<&&str>) -> Result<TransactionKind> {
    let raw = arg.copied().unwrap_or_default();
    TransactionKind::parse(raw).ok_or_else(|| {
        let kinds: Vec<&str> = TransactionKind::all().iter().map(|k| k.as_str()).collect();
        anyhow::anyhow!("Expected one of {}, got '{raw}'", kinds.join("/"))
    })
}

fn id_arg(arg: Option<&&str>) -> Result<i64> {
    let raw = arg.copied().unwrap_or_default();
    raw.parse()
        .with_context(|| format!("Expected a numeric id, got '{raw}'"))
}

fn date_arg(raw: &str, today: NaiveDate) -> Result<NaiveDate> {
    if raw.eq_ignore_ascii_case("today") {
        return Ok(today);
    }
    parse_date(raw)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_transaction(txn: &Transaction, ctx: &Ctx) {
    println!(
        "{:<6} {}  {:<8} {:<28} {:<16} {:>14}",
        txn.id.unwrap_or(0),
        txn.occurred_on,
        txn.kind.as_str(),
        truncate(&txn.name, 28),
        truncate(&txn.category, 16),
        ctx.money(txn.amount),
    );
}

// ── Records ──────────────────────────────────────────────────

fn cli_add(args: &[String], ctx: &Ctx, db: &mut Database) -> Result<()> {
    let pos = positionals(args);
    if pos.len() < 5 {
        bail!("Usage: findash add <income|expense> <date|today> <category> <name> <amount>");
    }
    let kind = kind_arg(pos.first())?;
    let date = date_arg(pos[1], ctx.today)?;
    let category = pos[2].to_string();
    let name = pos[3..pos.len() - 1].join(" ");
    let amount = parse_decimal(pos[pos.len() - 1])?;

    let mut txn = Transaction::new(kind, name, amount, category, date);
    let id = db.insert_transaction(&txn)?;
    txn.id = Some(id);
    info!(%kind, id, "record added");

    if ctx.json {
        print_json(&txn)
    } else {
        println!("Added {} #{id}", kind.as_str());
        Ok(())
    }
}

fn cli_list(args: &[String], ctx: &Ctx, db: &mut Database) -> Result<()> {
    let pos = positionals(args);
    let kind = kind_arg(pos.first())?;
    let query = ListQuery {
        month: flag(args, "--month").map(str::to_string),
        limit: parsed_flag(args, "--limit")?,
        offset: parsed_flag(args, "--offset")?.unwrap_or(0),
    };
    let page = db.list_transactions(kind, &query)?;

    if ctx.json {
        return print_json(&page);
    }
    if page.items.is_empty() {
        println!("No {} records", kind.as_str());
        return Ok(());
    }
    println!(
        "{:<6} {:<10}  {:<8} {:<28} {:<16} {:>14}",
        "ID", "Date", "Kind", "Name", "Category", "Amount"
    );
    println!("{}", "─".repeat(88));
    for txn in &page.items {
        print_transaction(txn, ctx);
    }
    println!(
        "Showing {}-{} of {}",
        page.offset + 1,
        page.offset as usize + page.items.len(),
        page.total_count
    );
    Ok(())
}

fn cli_show(args: &[String], ctx: &Ctx, db: &mut Database) -> Result<()> {
    let pos = positionals(args);
    let kind = kind_arg(pos.first())?;
    let id = id_arg(pos.get(1))?;
    let Some(txn) = db.get_transaction(kind, id)? else {
        bail!("No {} with id {id}", kind.as_str());
    };
    if ctx.json {
        print_json(&txn)
    } else {
        print_transaction(&txn, ctx);
        Ok(())
    }
}

fn cli_update(args: &[String], ctx: &Ctx, db: &mut Database) -> Result<()> {
    let pos = positionals(args);
    let kind = kind_arg(pos.first())?;
    let id = id_arg(pos.get(1))?;
    let update = TransactionUpdate {
        name: flag(args, "--name").map(str::to_string),
        amount: flag(args, "--amount").map(parse_decimal).transpose()?,
        category: flag(args, "--category").map(str::to_string),
        occurred_on: flag(args, "--date")
            .map(|d| date_arg(d, ctx.today))
            .transpose()?,
    };
    if update.is_empty() {
        bail!("Nothing to update. Use --name, --amount, --category or --date");
    }

    let Some(txn) = db.update_transaction(kind, id, &update)? else {
        bail!("No {} with id {id}", kind.as_str());
    };
    info!(%kind, id, "record updated");
    if ctx.json {
        print_json(&txn)
    } else {
        print_transaction(&txn, ctx);
        Ok(())
    }
}

fn cli_delete(args: &[String], db: &mut Database) -> Result<()> {
    let pos = positionals(args);
    let kind = kind_arg(pos.first())?;
    let id = id_arg(pos.get(1))?;
    if !db.delete_transaction(kind, id)? {
        bail!("No {} with id {id}", kind.as_str());
    }
    info!(%kind, id, "record deleted");
    println!("Deleted {} #{id}", kind.as_str());
    Ok(())
}

// ── Analytics ────────────────────────────────────────────────

fn cli_dashboard(ctx: &Ctx, db: &mut Database) -> Result<()> {
    let dash = report::dashboard(db, ctx.today, ctx.config.top_categories)?;
    if ctx.json {
        return print_json(&dash);
    }

    println!("FinDash - {}", dash.month);
    println!("{}", "─".repeat(44));
    println!("  Income (month):     {:>18}", ctx.money(dash.monthly_income));
    println!("  Expenses (month):   {:>18}", ctx.money(dash.monthly_expense));
    println!("  Daily avg income:   {:>18}", ctx.money(dash.daily_avg_income));
    println!("  Daily avg expense:  {:>18}", ctx.money(dash.daily_avg_expense));
    println!("  Total income:       {:>18}", ctx.money(dash.total_income));
    println!("  Total expenses:     {:>18}", ctx.money(dash.total_expense));
    println!("  Net cash flow:      {:>18}", ctx.money(dash.net_cash_flow));
    println!("  Savings rate:       {:>18}", format_percent(dash.savings_rate));
    println!(
        "  Stability:          {:>18}",
        format!("{:.2} {}", dash.stability.ratio, dash.stability.status)
    );

    if !dash.top_expense_categories.is_empty() {
        println!();
        println!("Top Expense Categories:");
        for share in &dash.top_expense_categories {
            println!(
                "  {}. {:<22} {:>14} {:>7} {:>5}x",
                share.rank,
                truncate(&share.category, 22),
                ctx.money(share.total),
                format_percent(share.share_percentage),
                share.count
            );
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct AnomalyOutput<'a> {
    threshold: f64,
    baseline_since: NaiveDate,
    recent_since: NaiveDate,
    evaluated: usize,
    baselines: BTreeMap<&'a str, Decimal>,
    anomalies: Vec<AnomalyResult<'a>>,
}

fn cli_anomalies(args: &[String], ctx: &Ctx, db: &mut Database) -> Result<()> {
    let threshold = match parsed_flag::<f64>(args, "--threshold")? {
        Some(t) => validate_threshold(t)?,
        None => ctx.config.anomaly.threshold,
    };
    let options = AnomalyOptions {
        threshold,
        ..ctx.config.anomaly
    };
    let anomalies = report::anomalies(db, ctx.today, &options)?;
    let results = anomalies.results();

    if ctx.json {
        return print_json(&AnomalyOutput {
            threshold: anomalies.threshold,
            baseline_since: anomalies.baseline_since,
            recent_since: anomalies.recent_since,
            evaluated: anomalies.evaluated(),
            baselines: anomalies.baseline().iter().collect(),
            anomalies: results,
        });
    }

    println!(
        "Checked {} expenses since {} against averages since {} (threshold {:.2}x)",
        anomalies.evaluated(),
        anomalies.recent_since,
        anomalies.baseline_since,
        anomalies.threshold
    );
    if results.is_empty() {
        println!("Nothing unusual");
        return Ok(());
    }
    println!();
    for r in &results {
        println!(
            "  {:<9} {}  {:<24} {:<16} {:>12} avg {:>12}  {:.2}x",
            r.severity.as_str(),
            r.transaction.occurred_on,
            truncate(&r.transaction.name, 24),
            truncate(&r.transaction.category, 16),
            ctx.money(r.transaction.amount),
            ctx.money(r.category_average),
            r.deviation_factor
        );
    }
    Ok(())
}

fn cli_growth(ctx: &Ctx, db: &mut Database) -> Result<()> {
    let g = report::income_growth(db, ctx.today)?;
    if ctx.json {
        return print_json(&g);
    }
    println!("  {}: {:>14}", g.current_month, ctx.money(g.current));
    println!("  {}: {:>14}", g.previous_month, ctx.money(g.previous));
    println!(
        "  Change:  {:>14} ({})",
        ctx.money(g.growth.delta),
        format_change(g.growth.percentage)
    );
    Ok(())
}

fn months_flag(args: &[String], ctx: &Ctx) -> Result<u32> {
    match parsed_flag::<u32>(args, "--months")? {
        Some(0) => bail!("--months must be at least 1"),
        Some(m) => Ok(m),
        None => Ok(ctx.config.trend_months),
    }
}

fn cli_trends(args: &[String], ctx: &Ctx, db: &mut Database) -> Result<()> {
    let points = report::expense_trends(db, ctx.today, months_flag(args, ctx)?)?;
    if ctx.json {
        return print_json(&points);
    }
    if points.is_empty() {
        println!("No expenses in this window");
        return Ok(());
    }
    for p in &points {
        let change = p
            .change
            .map(|c| format!("{:?} {}", c.direction, format_change(c.percentage)))
            .unwrap_or_default();
        println!(
            "  {}  {:>14} {:>5}x  {change}",
            p.period,
            ctx.money(p.total),
            p.count
        );
    }
    Ok(())
}

fn cli_top(args: &[String], ctx: &Ctx, db: &mut Database) -> Result<()> {
    let limit = parsed_flag::<usize>(args, "--limit")?.unwrap_or(ctx.config.top_categories);
    let since = flag(args, "--since").map(parse_date).transpose()?;
    let shares = report::top_expense_categories(db, since, limit)?;
    if ctx.json {
        return print_json(&shares);
    }
    if shares.is_empty() {
        println!("No expenses");
        return Ok(());
    }
    for s in &shares {
        println!(
            "  {}. {:<22} {:>14} {:>5}x {:>7} (cumulative {})",
            s.rank,
            truncate(&s.category, 22),
            ctx.money(s.total),
            s.count,
            format_percent(s.share_percentage),
            format_percent(s.cumulative_percentage)
        );
    }
    Ok(())
}

fn cli_cashflow(args: &[String], ctx: &Ctx, db: &mut Database) -> Result<()> {
    let months = report::cash_flow_summary(db, ctx.today, months_flag(args, ctx)?)?;
    if ctx.json {
        return print_json(&months);
    }
    println!(
        "  {:<8} {:>14} {:>14} {:>14} {:>8}  Stability",
        "Month", "Income", "Expenses", "Net", "Savings"
    );
    println!("{}", "─".repeat(80));
    for m in &months {
        println!(
            "  {:<8} {:>14} {:>14} {:>14} {:>8}  {:.2} {}",
            m.period,
            ctx.money(m.total_income),
            ctx.money(m.total_expense),
            ctx.money(m.net_cash_flow),
            format_percent(m.savings_rate),
            m.stability.ratio,
            m.stability.status
        );
    }
    Ok(())
}

fn cli_categories(args: &[String], ctx: &Ctx, db: &mut Database) -> Result<()> {
    let kind = kind_arg(positionals(args).first())?;
    let categories = db.get_categories(kind)?;
    if ctx.json {
        return print_json(&categories);
    }
    for category in &categories {
        println!("  {category}");
    }
    Ok(())
}

// ── CSV ──────────────────────────────────────────────────────

fn cli_import(args: &[String], db: &mut Database) -> Result<()> {
    let pos = positionals(args);
    if pos.len() < 2 {
        bail!("Usage: findash import <income|expense> <file.csv>");
    }
    let kind = kind_arg(pos.first())?;
    let file_path = shellexpand(pos[1]);
    let path = Path::new(&file_path);
    if !path.exists() {
        bail!("File not found: {file_path}");
    }

    let count = import::import_csv(db, path, kind)?;
    println!("Imported {count} {} records", kind.as_str());
    Ok(())
}

fn cli_export(args: &[String], ctx: &Ctx, db: &mut Database) -> Result<()> {
    let month = match flag(args, "--month") {
        Some("all") => None,
        Some(m) => Some(m.to_string()),
        None => Some(month_key(ctx.today)),
    };
    let suffix = month.as_deref().unwrap_or("all");

    let output_path = positionals(args)
        .first()
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/findash-export-{suffix}.csv")
        });

    let count = import::export_csv(db, Path::new(&output_path), month.as_deref())?;
    if count == 0 {
        println!("No records for {suffix}");
    } else {
        println!("Exported {count} records to {output_path}");
    }
    Ok(())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_flag_lookup() {
        let a = args("expense --month 2024-03 --limit 5 --json");
        assert_eq!(flag(&a, "--month"), Some("2024-03"));
        assert_eq!(parsed_flag::<u32>(&a, "--limit").unwrap(), Some(5));
        assert_eq!(parsed_flag::<u32>(&a, "--offset").unwrap(), None);
        assert!(parsed_flag::<u32>(&args("--limit x"), "--limit").is_err());
    }

    #[test]
    fn test_positionals_skip_flag_values() {
        let a = args("expense 2024-03-01 Food --json Corner cafe 4.50");
        assert_eq!(
            positionals(&a),
            vec!["expense", "2024-03-01", "Food", "Corner", "cafe", "4.50"]
        );
        let a = args("expense 7 --name Lunch --amount 12");
        assert_eq!(positionals(&a), vec!["expense", "7"]);
    }

    #[test]
    fn test_kind_and_id_args() {
        assert_eq!(kind_arg(Some(&"income")).unwrap(), TransactionKind::Income);
        assert!(kind_arg(Some(&"savings")).is_err());
        assert!(kind_arg(None).is_err());
        assert_eq!(id_arg(Some(&"42")).unwrap(), 42);
        assert!(id_arg(Some(&"abc")).is_err());
    }

    #[test]
    fn test_date_arg() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        assert_eq!(date_arg("today", today).unwrap(), today);
        assert_eq!(
            date_arg("03/01/2024", today).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert!(date_arg("yesterday", today).is_err());
    }

    #[test]
    fn test_shellexpand() {
        assert_eq!(shellexpand("/tmp/x.csv"), "/tmp/x.csv");
        let expanded = shellexpand("~/x.csv");
        assert!(expanded.ends_with("/x.csv"));
        assert!(!expanded.starts_with('~'));
    }
}
