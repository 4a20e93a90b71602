use super::{delete_confirmation, footer, form, header, list, log, login, notifications, sidebar, Frame};
use crate::state::{State, View};
use ratatui::layout::{Constraint, Direction, Layout};

const SIDEBAR_WIDTH: u16 = 20;
const LOG_HEIGHT: u16 = 8;

/// Render all widgets according to state.
///
pub fn all(frame: &mut Frame, state: &mut State) {
    let size = frame.size();

    if state.current_view() == View::Login {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
            .split(size);
        login(frame, rows[0], state);
        footer(frame, rows[1], state);
        return;
    }

    let mut constraints = vec![
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ];
    if state.is_log_visible() {
        constraints.insert(2, Constraint::Length(LOG_HEIGHT));
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(size);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)].as_ref())
        .split(rows[1]);

    header(frame, rows[0], state);
    sidebar(frame, body[0], state);
    list(frame, body[1], state);
    if state.is_log_visible() {
        log(frame, rows[2], state);
    }
    footer(frame, rows[rows.len() - 1], state);

    if state.form().is_some() {
        form(frame, size, state);
    }
    if state.delete_confirmation().is_some() {
        delete_confirmation(frame, size, state);
    }
    notifications(frame, body[1], state);
}
