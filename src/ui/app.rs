use anyhow::Result;
use chrono::{Datelike, Months, NaiveDate};
use std::path::PathBuf;

use crate::analytics::report::{self, month_key};
use crate::analytics::{
    AnomalyOptions, AnomalyReport, CashFlowMonth, Dashboard, GrowthReport, TrendPoint,
};
use crate::config::Config;
use crate::db::Database;
use crate::models::{Transaction, TransactionKind};
use crate::ui::util::clamp_cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Dashboard,
    Transactions,
    Anomalies,
    Trends,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[
            Self::Dashboard,
            Self::Transactions,
            Self::Anomalies,
            Self::Trends,
        ]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "Dashboard"),
            Self::Transactions => write!(f, "Transactions"),
            Self::Anomalies => write!(f, "Anomalies"),
            Self::Trends => write!(f, "Trends"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Editing,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Editing => write!(f, "EDIT"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PendingAction {
    DeleteTransaction {
        kind: TransactionKind,
        id: i64,
        name: String,
    },
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    /// "YYYY-MM" being viewed.
    pub(crate) current_month: String,
    pub(crate) today: NaiveDate,

    // Settings
    pub(crate) currency_symbol: String,
    pub(crate) anomaly_options: AnomalyOptions,
    pub(crate) trend_months: u32,
    pub(crate) top_categories: usize,
    pub(crate) export_dir: PathBuf,

    // Dashboard
    pub(crate) dashboard: Option<Dashboard>,
    pub(crate) growth: Option<GrowthReport>,

    // Transactions
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) transaction_index: usize,
    pub(crate) transaction_scroll: usize,

    // Anomalies
    pub(crate) anomaly_report: Option<AnomalyReport>,
    pub(crate) anomaly_index: usize,
    pub(crate) anomaly_scroll: usize,

    // Trends
    pub(crate) trends: Vec<TrendPoint>,
    pub(crate) cash_flow: Vec<CashFlowMonth>,
    pub(crate) trend_index: usize,
    pub(crate) trend_scroll: usize,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(config: &Config, today: NaiveDate) -> Self {
        Self {
            running: true,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,
            current_month: month_key(today),
            today,

            currency_symbol: config.currency_symbol().to_string(),
            anomaly_options: config.anomaly,
            trend_months: config.trend_months,
            top_categories: config.top_categories,
            export_dir: directories::UserDirs::new()
                .map(|d| d.home_dir().to_path_buf())
                .unwrap_or_else(|| config.data_dir.clone()),

            dashboard: None,
            growth: None,

            transactions: Vec::new(),
            transaction_index: 0,
            transaction_scroll: 0,

            anomaly_report: None,
            anomaly_index: 0,
            anomaly_scroll: 0,

            trends: Vec::new(),
            cash_flow: Vec::new(),
            trend_index: 0,
            trend_scroll: 0,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    /// Reference date for the analytics: today when viewing the current
    /// month, otherwise the last day of the viewed month.
    pub(crate) fn as_of(&self) -> NaiveDate {
        if self.current_month == month_key(self.today) {
            return self.today;
        }
        parse_month(&self.current_month)
            .and_then(|first| first.checked_add_months(Months::new(1)))
            .and_then(|next| next.pred_opt())
            .unwrap_or(self.today)
    }

    pub(crate) fn refresh_dashboard(&mut self, db: &Database) -> Result<()> {
        let as_of = self.as_of();
        self.dashboard = Some(report::dashboard(db, as_of, self.top_categories)?);
        self.growth = Some(report::income_growth(db, as_of)?);
        Ok(())
    }

    pub(crate) fn refresh_transactions(&mut self, db: &Database) -> Result<()> {
        self.transactions = db.get_month_transactions(&self.current_month)?;
        clamp_cursor(
            &mut self.transaction_index,
            &mut self.transaction_scroll,
            self.transactions.len(),
        );
        Ok(())
    }

    pub(crate) fn refresh_anomalies(&mut self, db: &Database) -> Result<()> {
        let report = report::anomalies(db, self.as_of(), &self.anomaly_options)?;
        let len = report.results().len();
        self.anomaly_report = Some(report);
        clamp_cursor(&mut self.anomaly_index, &mut self.anomaly_scroll, len);
        Ok(())
    }

    pub(crate) fn refresh_trends(&mut self, db: &Database) -> Result<()> {
        let as_of = self.as_of();
        self.trends = report::expense_trends(db, as_of, self.trend_months)?;
        self.cash_flow = report::cash_flow_summary(db, as_of, self.trend_months)?;
        clamp_cursor(&mut self.trend_index, &mut self.trend_scroll, self.cash_flow.len());
        Ok(())
    }

    pub(crate) fn refresh_all(&mut self, db: &Database) -> Result<()> {
        self.refresh_dashboard(db)?;
        self.refresh_transactions(db)?;
        self.refresh_anomalies(db)?;
        self.refresh_trends(db)?;
        Ok(())
    }

    /// Move the viewed month by `delta` months.
    pub(crate) fn shift_month(&mut self, delta: i32) -> bool {
        let Some(first) = parse_month(&self.current_month) else {
            return false;
        };
        let months = Months::new(delta.unsigned_abs());
        let shifted = if delta >= 0 {
            first.checked_add_months(months)
        } else {
            first.checked_sub_months(months)
        };
        match shifted {
            Some(d) => {
                self.current_month = month_key(d);
                true
            }
            None => false,
        }
    }

    pub(crate) fn selected_transaction(&self) -> Option<&Transaction> {
        self.transactions.get(self.transaction_index)
    }

    /// Rows that fit in a table body (borders and header excluded).
    pub(crate) fn page(&self) -> usize {
        self.visible_rows.max(1)
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

/// First day of a "YYYY-MM" month.
pub(crate) fn parse_month(month: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").ok()?;
    (date.day() == 1).then_some(date)
}
