use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    widgets::{Bar, BarChart, BarGroup, Cell, Row, Table},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;

use super::{empty_panel, panel};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_change, format_percent};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let title = format!(" Cash Flow, last {} months ", app.trend_months);
    if app.cash_flow.is_empty() {
        f.render_widget(empty_panel(title, &["No records in this window"]), area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(10)])
        .split(area);

    render_table(f, chunks[0], app, title);
    render_expense_chart(f, chunks[1], app);
}

fn render_table(f: &mut Frame, area: Rect, app: &App, title: String) {
    let header_cells = [
        "Month", "Income", "Expenses", "Count", "Change", "Net", "Savings", "Stability",
    ]
    .iter()
    .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);
    let sym = app.currency_symbol.as_str();

    let rows: Vec<Row> = app
        .cash_flow
        .iter()
        .enumerate()
        .skip(app.trend_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, month)| {
            let point = app.trends.iter().find(|p| p.period == month.period);
            let count = point.map_or(0, |p| p.count);
            let change = point.and_then(|p| p.change);
            let change_cell = match change {
                Some(c) => Span::styled(
                    format_change(c.percentage),
                    theme::expense_trend_style(c.direction),
                ),
                None => Span::styled("-", theme::dim_style()),
            };
            let net_style = if month.net_cash_flow.is_sign_negative() {
                theme::expense_style()
            } else {
                theme::income_style()
            };
            let stability = Span::styled(
                format!(
                    "{:.2} {}",
                    month.stability.ratio,
                    month.stability.status.as_str()
                ),
                Style::default().fg(theme::stability_color(month.stability.status)),
            );

            let style = if i == app.trend_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            Row::new(vec![
                Cell::from(format!("  {}", month.period)),
                Cell::from(format_amount(month.total_income, sym)),
                Cell::from(format_amount(month.total_expense, sym)),
                Cell::from(count.to_string()),
                Cell::from(change_cell),
                Cell::from(Span::styled(
                    format_amount(month.net_cash_flow, sym),
                    net_style,
                )),
                Cell::from(format_percent(month.savings_rate)),
                Cell::from(stability),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(6),
        Constraint::Length(9),
        Constraint::Length(14),
        Constraint::Length(9),
        Constraint::Min(16),
    ];

    let table = Table::new(rows, widths).header(header).block(panel(title));
    f.render_widget(table, area);
}

fn render_expense_chart(f: &mut Frame, area: Rect, app: &App) {
    let bars: Vec<Bar> = app
        .trends
        .iter()
        .map(|p| {
            let color = p
                .change
                .map(|c| theme::expense_trend_style(c.direction))
                .unwrap_or_else(|| Style::default().fg(theme::ACCENT));
            Bar::default()
                .value(p.total.to_u64().unwrap_or(0))
                .label(p.period.clone().into())
                .style(color)
                .value_style(Style::default().fg(theme::TEXT))
        })
        .collect();

    let chart = BarChart::default()
        .block(panel(" Monthly Expenses ".into()))
        .data(BarGroup::default().bars(&bars))
        .bar_width(9)
        .bar_gap(2);

    f.render_widget(chart, area);
}
