pub(crate) mod anomalies;
pub(crate) mod dashboard;
pub(crate) mod transactions;
pub(crate) mod trends;

use ratatui::{
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::ui::theme;

pub(crate) fn panel(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(title, theme::title_style()))
}

/// Centered placeholder for a panel with nothing to show.
pub(crate) fn empty_panel(title: String, lines: &[&str]) -> Paragraph<'static> {
    let mut text = vec![Line::from("")];
    for (i, l) in lines.iter().enumerate() {
        if i > 0 {
            text.push(Line::from(""));
        }
        text.push(Line::from(Span::styled(l.to_string(), theme::dim_style())));
    }
    Paragraph::new(text).centered().block(panel(title))
}
