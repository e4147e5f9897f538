use ratatui::{
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Cell, Row, Table},
    Frame,
};
use rust_decimal::Decimal;

use super::{empty_panel, panel};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    if app.transactions.is_empty() {
        f.render_widget(
            empty_panel(
                format!(" Transactions {} (0) ", app.current_month),
                &[
                    "No transactions for this month",
                    "Add one with :add-income / :add-expense or :import a CSV",
                ],
            ),
            area,
        );
        return;
    }

    let header_cells = ["Date", "Name", "Category", "Kind", "Amount"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .transactions
        .iter()
        .enumerate()
        .skip(app.transaction_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, txn)| {
            let amount_style = if txn.is_income() {
                theme::income_style()
            } else {
                theme::expense_style()
            };
            let signed = txn.signed_amount();
            let sign = if signed > Decimal::ZERO { "+" } else { "" };
            let amount_str = format!("{sign}{}", format_amount(signed, &app.currency_symbol));

            let style = if i == app.transaction_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            Row::new(vec![
                Cell::from(format!("  {}", txn.occurred_on)),
                Cell::from(truncate(&txn.name, 40)),
                Cell::from(truncate(&txn.category, 18)),
                Cell::from(txn.kind.as_str()),
                Cell::from(Span::styled(amount_str, amount_style)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(14),
        Constraint::Min(20),
        Constraint::Length(18),
        Constraint::Length(9),
        Constraint::Length(16),
    ];

    let (income, expense) = app
        .transactions
        .iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(inc, exp), t| {
            if t.is_expense() {
                (inc, exp.saturating_add(t.amount))
            } else {
                (inc.saturating_add(t.amount), exp)
            }
        });

    let table = Table::new(rows, widths).header(header).block(panel(format!(
        " Transactions {} ({}) in {} out {} ",
        app.current_month,
        app.transactions.len(),
        format_amount(income, &app.currency_symbol),
        format_amount(expense, &app.currency_symbol),
    )));

    f.render_widget(table, area);
}
