use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::{error, info};

use crate::config::Config;
use crate::db::Database;
use crate::models::TransactionUpdate;
use crate::ui::app::{App, InputMode, PendingAction, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

pub(crate) fn as_tui(config: &Config, db: &mut Database) -> Result<()> {
    let mut app = App::new(config, Local::now().date_naive());
    app.refresh_all(db)?;
    info!(month = %app.current_month, "starting TUI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, db);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        error!(error = %e, "TUI exited with error");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db: &mut Database,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            // tab + status + command bars, table borders and header
            let content_height = f.area().height.saturating_sub(6) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.show_help {
                app.show_help = false;
                continue;
            }
            let outcome = match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, db),
                InputMode::Command => handle_command_input(key, app, db),
                InputMode::Editing => handle_editing_input(key, app, db),
                InputMode::Confirm => handle_confirm_input(key, app, db),
            };
            // Keep the UI alive on database errors; surface them in the status bar.
            if let Err(e) = outcome {
                error!(error = %e, "command failed");
                app.input_mode = InputMode::Normal;
                app.set_status(format!("Error: {e:#}"));
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_down(app);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_up(app);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app),
        KeyCode::Char('1') => switch_screen(app, db, Screen::Dashboard)?,
        KeyCode::Char('2') => switch_screen(app, db, Screen::Transactions)?,
        KeyCode::Char('3') => switch_screen(app, db, Screen::Anomalies)?,
        KeyCode::Char('4') => switch_screen(app, db, Screen::Trends)?,
        KeyCode::Tab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let next = (idx + 1) % screens.len();
            switch_screen(app, db, screens[next])?;
        }
        KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let prev = if idx == 0 { screens.len() - 1 } else { idx - 1 };
            switch_screen(app, db, screens[prev])?;
        }
        KeyCode::Char('H') => commands::handle_command("prev-month", app, db)?,
        KeyCode::Char('L') => commands::handle_command("next-month", app, db)?,
        KeyCode::Char('D') if app.screen == Screen::Transactions => {
            commands::handle_command("delete", app, db)?;
        }
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Esc => app.status_message.clear(),
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, db)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => app.command_input.push(c),
        _ => {}
    }
    Ok(())
}

fn handle_editing_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let new_name = app.command_input.trim().to_string();
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
            if !new_name.is_empty() {
                let update = TransactionUpdate {
                    name: Some(new_name.clone()),
                    ..TransactionUpdate::default()
                };
                if commands::apply_to_selected(app, db, &update)? {
                    app.set_status(format!("Renamed to: {new_name}"));
                }
            }
        }
        KeyCode::Esc => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
            app.set_status("Edit cancelled");
        }
        KeyCode::Backspace => {
            app.command_input.pop();
        }
        KeyCode::Char(c) => app.command_input.push(c),
        _ => {}
    }
    Ok(())
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    app.input_mode = InputMode::Normal;
    app.confirm_message.clear();
    let action = app.pending_action.take();

    match (key.code, action) {
        (
            KeyCode::Char('y') | KeyCode::Char('Y'),
            Some(PendingAction::DeleteTransaction { kind, id, name }),
        ) => {
            if db.delete_transaction(kind, id)? {
                info!(%kind, id, "deleted from TUI");
                app.set_status(format!("Deleted: {name}"));
            } else {
                app.set_status(format!("Already gone: {name}"));
            }
            app.refresh_all(db)?;
        }
        _ => app.set_status("Cancelled"),
    }
    Ok(())
}

// ── Navigation helpers ───────────────────────────────────────

fn switch_screen(app: &mut App, db: &mut Database, screen: Screen) -> Result<()> {
    app.screen = screen;
    match screen {
        Screen::Dashboard => app.refresh_dashboard(db)?,
        Screen::Transactions => app.refresh_transactions(db)?,
        Screen::Anomalies => app.refresh_anomalies(db)?,
        Screen::Trends => app.refresh_trends(db)?,
    }
    Ok(())
}

/// Cursor, scroll offset and row count of the list on the active screen.
fn cursor(app: &mut App) -> Option<(&mut usize, &mut usize, usize)> {
    match app.screen {
        Screen::Dashboard => None,
        Screen::Transactions => Some((
            &mut app.transaction_index,
            &mut app.transaction_scroll,
            app.transactions.len(),
        )),
        Screen::Anomalies => {
            let len = app
                .anomaly_report
                .as_ref()
                .map_or(0, |r| r.results().len());
            Some((&mut app.anomaly_index, &mut app.anomaly_scroll, len))
        }
        Screen::Trends => Some((
            &mut app.trend_index,
            &mut app.trend_scroll,
            app.cash_flow.len(),
        )),
    }
}

fn handle_move_down(app: &mut App) {
    let page = app.page();
    if let Some((index, scroll, len)) = cursor(app) {
        scroll_down(index, scroll, len, page);
    }
}

fn handle_move_up(app: &mut App) {
    if let Some((index, scroll, _)) = cursor(app) {
        scroll_up(index, scroll);
    }
}

fn handle_goto_top(app: &mut App) {
    if let Some((index, scroll, _)) = cursor(app) {
        scroll_to_top(index, scroll);
    }
}

fn handle_goto_bottom(app: &mut App) {
    let page = app.page();
    if let Some((index, scroll, len)) = cursor(app) {
        scroll_to_bottom(index, scroll, len, page);
    }
}
