use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDate;

use super::app::{parse_month, App, InputMode, PendingAction, Screen};
use crate::config::validate_threshold;
use crate::db::Database;
use crate::import::{self, parse_decimal};
use crate::models::{Transaction, TransactionKind, TransactionUpdate};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit FinDash", cmd_quit, r);
    register_command!("quit", "Quit FinDash", cmd_quit, r);
    register_command!("d", "Go to Dashboard", cmd_dashboard, r);
    register_command!("dashboard", "Go to Dashboard", cmd_dashboard, r);
    register_command!("t", "Go to Transactions", cmd_transactions, r);
    register_command!("transactions", "Go to Transactions", cmd_transactions, r);
    register_command!("a", "Go to Anomalies", cmd_anomalies, r);
    register_command!("anomalies", "Go to Anomalies", cmd_anomalies, r);
    register_command!("tr", "Go to Trends", cmd_trends, r);
    register_command!("trends", "Go to Trends", cmd_trends, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("month", "Set month (e.g. :month 2024-01)", cmd_month, r);
    register_command!("m", "Set month (e.g. :m 2024-01)", cmd_month, r);
    register_command!("next-month", "Go to next month", cmd_next_month, r);
    register_command!("prev-month", "Go to previous month", cmd_prev_month, r);
    register_command!(
        "add-income",
        "Add income (e.g. :add-income today Salary Paycheck 3000)",
        cmd_add_income,
        r
    );
    register_command!(
        "add-expense",
        "Add expense (e.g. :add-expense 2024-01-15 Food Coffee 4.50)",
        cmd_add_expense,
        r
    );
    register_command!("delete", "Delete selected transaction", cmd_delete, r);
    register_command!("rename", "Rename selected transaction", cmd_rename, r);
    register_command!(
        "recat",
        "Change category of selected transaction",
        cmd_recat,
        r
    );
    register_command!(
        "threshold",
        "Set anomaly threshold (e.g. :threshold 2.0)",
        cmd_threshold,
        r
    );
    register_command!(
        "export",
        "Export transactions to CSV (e.g. :export ~/findash.csv)",
        cmd_export,
        r
    );
    register_command!(
        "import",
        "Import CSV (e.g. :import expense ~/bank.csv)",
        cmd_import,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, db)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 2) // skip short aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_dashboard(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Dashboard;
    app.refresh_dashboard(db)?;
    Ok(())
}

fn cmd_transactions(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Transactions;
    app.refresh_transactions(db)?;
    Ok(())
}

fn cmd_anomalies(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Anomalies;
    app.refresh_anomalies(db)?;
    Ok(())
}

fn cmd_trends(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Trends;
    app.refresh_trends(db)?;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_month(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.current_month = crate::analytics::report::month_key(app.today);
        app.refresh_all(db)?;
        app.set_status(format!("Month: {}", app.current_month));
        return Ok(());
    }

    // Accept "2024-01", "2024-1", "01", "1"
    let month = if args.len() <= 2 {
        let year = &app.current_month[..4];
        format!("{year}-{args:0>2}")
    } else {
        match args.split_once('-') {
            Some((y, m)) if m.len() == 1 => format!("{y}-0{m}"),
            _ => args.to_string(),
        }
    };

    if month.len() == 7 && parse_month(&month).is_some() {
        app.set_status(format!("Switched to month: {month}"));
        app.current_month = month;
        app.refresh_all(db)?;
    } else {
        app.set_status("Invalid month format. Use YYYY-MM (e.g. 2024-01)");
    }

    Ok(())
}

fn cmd_next_month(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    advance_month(app, db, 1)
}

fn cmd_prev_month(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    advance_month(app, db, -1)
}

fn advance_month(app: &mut App, db: &mut Database, delta: i32) -> anyhow::Result<()> {
    if app.shift_month(delta) {
        app.set_status(format!("Month: {}", app.current_month));
        app.refresh_all(db)?;
    }
    Ok(())
}

fn cmd_add_income(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    add_transaction(TransactionKind::Income, args, app, db)
}

fn cmd_add_expense(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    add_transaction(TransactionKind::Expense, args, app, db)
}

/// `<date|today> <category> <name...> <amount>`
fn add_transaction(
    kind: TransactionKind,
    args: &str,
    app: &mut App,
    db: &mut Database,
) -> anyhow::Result<()> {
    let usage = format!(
        "Usage: :add-{} <date|today> <category> <name> <amount>",
        kind.as_str()
    );
    let tokens: Vec<&str> = args.split_whitespace().collect();
    if tokens.len() < 4 {
        app.set_status(usage);
        return Ok(());
    }

    let date = match parse_date_arg(tokens[0], app.today) {
        Some(d) => d,
        None => {
            app.set_status(format!("Invalid date: {}", tokens[0]));
            return Ok(());
        }
    };
    let amount_str = tokens[tokens.len() - 1];
    let amount = match parse_decimal(amount_str) {
        Ok(a) => a,
        Err(_) => {
            app.set_status(format!("Invalid amount: {amount_str}"));
            return Ok(());
        }
    };
    let category = tokens[1];
    let name = tokens[2..tokens.len() - 1].join(" ");

    let txn = Transaction::new(kind, name.clone(), amount, category.to_string(), date);
    if let Err(e) = txn.validate() {
        app.set_status(format!("Invalid {kind}: {e}"));
        return Ok(());
    }
    db.insert_transaction(&txn)?;
    app.refresh_all(db)?;
    app.set_status(format!(
        "Added {kind}: {name} {}{amount}",
        app.currency_symbol
    ));
    Ok(())
}

fn parse_date_arg(arg: &str, today: NaiveDate) -> Option<NaiveDate> {
    if arg.eq_ignore_ascii_case("today") {
        return Some(today);
    }
    import::parse_date(arg).ok()
}

fn cmd_delete(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if app.screen != Screen::Transactions || app.transactions.is_empty() {
        app.set_status("Navigate to Transactions and select one first");
        return Ok(());
    }

    if let Some(txn) = app.selected_transaction() {
        if let Some(id) = txn.id {
            let (kind, name) = (txn.kind, txn.name.clone());
            app.confirm_message = format!("Delete {} '{name}'?", kind.as_str());
            app.pending_action = Some(PendingAction::DeleteTransaction { kind, id, name });
            app.input_mode = InputMode::Confirm;
        }
    }

    Ok(())
}

fn cmd_rename(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if app.screen != Screen::Transactions || app.transactions.is_empty() {
        app.set_status("Navigate to Transactions and select one first");
        return Ok(());
    }

    if args.is_empty() {
        if let Some(txn) = app.selected_transaction() {
            app.command_input = txn.name.clone();
            app.input_mode = InputMode::Editing;
            app.set_status("Type new name, press Enter to confirm");
        }
        return Ok(());
    }

    let update = TransactionUpdate {
        name: Some(args.to_string()),
        ..TransactionUpdate::default()
    };
    if apply_to_selected(app, db, &update)? {
        app.set_status(format!("Renamed transaction to: {args}"));
    }
    Ok(())
}

fn cmd_recat(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if app.screen != Screen::Transactions || app.transactions.is_empty() {
        app.set_status("Navigate to Transactions and select one first");
        return Ok(());
    }

    if args.is_empty() {
        app.set_status("Usage: :recat <category>");
        return Ok(());
    }

    let update = TransactionUpdate {
        category: Some(args.to_string()),
        ..TransactionUpdate::default()
    };
    if apply_to_selected(app, db, &update)? {
        app.set_status(format!("Categorized as: {args}"));
    }
    Ok(())
}

/// Update the highlighted row and reload every view that depends on it.
pub(crate) fn apply_to_selected(
    app: &mut App,
    db: &mut Database,
    update: &TransactionUpdate,
) -> anyhow::Result<bool> {
    let Some((kind, id)) = app
        .selected_transaction()
        .and_then(|t| t.id.map(|id| (t.kind, id)))
    else {
        return Ok(false);
    };
    if let Err(e) = update.validate() {
        app.set_status(format!("Error: {e}"));
        return Ok(false);
    }
    let updated = db.update_transaction(kind, id, update)?.is_some();
    app.refresh_all(db)?;
    Ok(updated)
}

fn cmd_threshold(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status(format!(
            "Anomaly threshold: {:.2}",
            app.anomaly_options.threshold
        ));
        return Ok(());
    }

    match args.parse::<f64>().map_err(anyhow::Error::from).and_then(validate_threshold) {
        Ok(value) => {
            app.anomaly_options.threshold = value;
            app.refresh_anomalies(db)?;
            app.set_status(format!("Anomaly threshold set to {value:.2}"));
        }
        Err(e) => app.set_status(format!("Invalid threshold: {e}")),
    }
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        app.export_dir
            .join(format!("findash-export-{}.csv", app.current_month))
    } else {
        crate::run::shellexpand(args).into()
    };

    let count = import::export_csv(db, &path, Some(&app.current_month))?;
    if count == 0 {
        app.set_status("No transactions to export");
    } else {
        app.set_status(format!(
            "Exported {count} transactions to {}",
            path.display()
        ));
    }
    Ok(())
}

fn cmd_import(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let usage = "Usage: :import <income|expense> <file.csv>";
    let Some((kind, path)) = args.split_once(' ') else {
        app.set_status(usage);
        return Ok(());
    };
    let Some(kind) = TransactionKind::parse(kind) else {
        app.set_status(usage);
        return Ok(());
    };

    let path = crate::run::shellexpand(path.trim());
    if !Path::new(&path).exists() {
        app.set_status(format!("File not found: {path}"));
        return Ok(());
    }

    match import::import_csv(db, Path::new(&path), kind) {
        Ok(count) => {
            app.refresh_all(db)?;
            app.set_status(format!("Imported {count} {} records", kind.as_str()));
        }
        Err(e) => app.set_status(format!("Import failed: {e:#}")),
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
