use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use super::{empty_panel, panel};
use crate::analytics::AnomalyReport;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(report) = &app.anomaly_report else {
        f.render_widget(empty_panel(" Anomalies ".into(), &["Loading…"]), area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(5)])
        .split(area);

    render_summary(f, chunks[0], report);
    render_table(f, chunks[1], app, report);
}

fn render_summary(f: &mut Frame, area: Rect, report: &AnomalyReport) {
    let text = vec![
        Line::from(vec![
            Span::styled(" Baseline since ", theme::dim_style()),
            Span::styled(report.baseline_since.to_string(), theme::normal_style()),
            Span::styled(
                format!("  ({} categories)", report.baseline().len()),
                theme::dim_style(),
            ),
        ]),
        Line::from(vec![
            Span::styled(" Checking since ", theme::dim_style()),
            Span::styled(report.recent_since.to_string(), theme::normal_style()),
            Span::styled(
                format!(
                    "  ({} expenses, threshold {:.2}x)",
                    report.evaluated(),
                    report.threshold
                ),
                theme::dim_style(),
            ),
        ]),
    ];
    f.render_widget(Paragraph::new(text).block(panel(" Window ".into())), area);
}

fn render_table(f: &mut Frame, area: Rect, app: &App, report: &AnomalyReport) {
    let results = report.results();
    let title = format!(" Unusual Expenses ({}) ", results.len());
    if results.is_empty() {
        f.render_widget(
            empty_panel(title, &["Nothing unusual in the recent window"]),
            area,
        );
        return;
    }

    let header_cells = ["Date", "Name", "Category", "Amount", "Average", "Factor", "Severity"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);
    let sym = app.currency_symbol.as_str();

    let rows: Vec<Row> = results
        .iter()
        .enumerate()
        .skip(app.anomaly_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, r)| {
            let style = if i == app.anomaly_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let severity = Span::styled(
                r.severity.as_str(),
                Style::default()
                    .fg(theme::severity_color(r.severity))
                    .add_modifier(Modifier::BOLD),
            );

            Row::new(vec![
                Cell::from(format!("  {}", r.transaction.occurred_on)),
                Cell::from(truncate(&r.transaction.name, 30)),
                Cell::from(truncate(&r.transaction.category, 16)),
                Cell::from(format_amount(r.transaction.amount, sym)),
                Cell::from(format_amount(r.category_average, sym)),
                Cell::from(format!("{:.2}x", r.deviation_factor)),
                Cell::from(severity),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(14),
        Constraint::Min(16),
        Constraint::Length(16),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(8),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths).header(header).block(panel(title));
    f.render_widget(table, area);
}
