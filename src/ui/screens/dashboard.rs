use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Paragraph, Sparkline},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::{empty_panel, panel};
use crate::analytics::Dashboard;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_change, format_percent, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(dash) = &app.dashboard else {
        f.render_widget(
            empty_panel(" Dashboard ".into(), &["Loading…"]),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Monthly cards
            Constraint::Length(6), // Ratio cards
            Constraint::Min(8),    // Top categories
            Constraint::Length(3), // Expense sparkline
        ])
        .split(area);

    render_monthly_cards(f, chunks[0], app, dash);
    render_ratio_cards(f, chunks[1], app, dash);
    render_top_categories(f, chunks[2], app, dash);
    render_expense_sparkline(f, chunks[3], app);
}

fn quarters(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(area)
}

fn render_monthly_cards(f: &mut Frame, area: Rect, app: &App, dash: &Dashboard) {
    let cards = quarters(area);
    let sym = app.currency_symbol.as_str();

    render_card(
        f,
        cards[0],
        &format!("Income {}", dash.month),
        format_amount(dash.monthly_income, sym),
        theme::GREEN,
        format!("{} / day", format_amount(dash.daily_avg_income, sym)),
    );
    render_card(
        f,
        cards[1],
        &format!("Expenses {}", dash.month),
        format_amount(dash.monthly_expense, sym),
        theme::RED,
        format!("{} / day", format_amount(dash.daily_avg_expense, sym)),
    );
    render_card(
        f,
        cards[2],
        "Net Cash Flow",
        format_amount(dash.net_cash_flow, sym),
        signed_color(dash.net_cash_flow),
        "all time".into(),
    );

    let (growth_text, growth_color, growth_sub) = match &app.growth {
        Some(g) => (
            format_change(g.growth.percentage),
            signed_color(g.growth.delta),
            format!("vs {}", g.previous_month),
        ),
        None => ("-".into(), theme::TEXT_DIM, String::new()),
    };
    render_card(
        f,
        cards[3],
        "Income Growth",
        growth_text,
        growth_color,
        growth_sub,
    );
}

fn render_ratio_cards(f: &mut Frame, area: Rect, app: &App, dash: &Dashboard) {
    let cards = quarters(area);
    let sym = app.currency_symbol.as_str();

    render_card(
        f,
        cards[0],
        "Total Income",
        format_amount(dash.total_income, sym),
        theme::GREEN,
        String::new(),
    );
    render_card(
        f,
        cards[1],
        "Total Expenses",
        format_amount(dash.total_expense, sym),
        theme::RED,
        String::new(),
    );
    render_card(
        f,
        cards[2],
        "Savings Rate",
        format_percent(dash.savings_rate),
        if dash.savings_rate >= 0.0 {
            theme::GREEN
        } else {
            theme::RED
        },
        String::new(),
    );
    render_card(
        f,
        cards[3],
        "Stability",
        format!("{:.2}", dash.stability.ratio),
        theme::stability_color(dash.stability.status),
        dash.stability.status.as_str().to_string(),
    );
}

fn signed_color(value: Decimal) -> Color {
    if value >= Decimal::ZERO {
        theme::GREEN
    } else {
        theme::RED
    }
}

fn render_card(f: &mut Frame, area: Rect, title: &str, value: String, color: Color, sub: String) {
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(sub, theme::dim_style())),
    ])
    .centered()
    .block(panel(format!(" {title} ")));

    f.render_widget(text, area);
}

fn render_top_categories(f: &mut Frame, area: Rect, app: &App, dash: &Dashboard) {
    let title = format!(" Top {} Expense Categories ", app.top_categories);
    if dash.top_expense_categories.is_empty() {
        f.render_widget(
            empty_panel(title, &["No expenses yet. Add one with :add-expense"]),
            area,
        );
        return;
    }

    let bars: Vec<Bar> = dash
        .top_expense_categories
        .iter()
        .map(|share| {
            Bar::default()
                .value(share.total.to_u64().unwrap_or(0))
                .text_value(format!(
                    "{} ({}, {}x)",
                    format_amount(share.total, &app.currency_symbol),
                    format_percent(share.share_percentage),
                    share.count
                ))
                .label(Line::from(truncate(&share.category, 20)))
                .style(Style::default().fg(theme::ACCENT))
                .value_style(
                    Style::default()
                        .fg(theme::HEADER_BG)
                        .bg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let chart = BarChart::default()
        .block(panel(title))
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(1);

    f.render_widget(chart, area);
}

fn render_expense_sparkline(f: &mut Frame, area: Rect, app: &App) {
    let data: Vec<u64> = app
        .trends
        .iter()
        .map(|p| p.total.to_u64().unwrap_or(0))
        .collect();

    let sparkline = Sparkline::default()
        .block(panel(format!(
            " Monthly Spending, last {} months ",
            app.trend_months
        )))
        .data(&data)
        .style(Style::default().fg(theme::YELLOW));

    f.render_widget(sparkline, area);
}
