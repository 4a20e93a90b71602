use super::Frame;
use crate::state::{Focus, InputMode, State, View};
use crate::ui::ColorSpec;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Return the mode label, its color and the key hints for the current state.
///
fn controls(state: &State) -> (&'static str, ColorSpec, String) {
    let theme = state.theme();
    if state.current_view() == View::Login {
        return (
            "LOGIN:",
            theme.footer_normal,
            " Enter: sign in, Ctrl+C: quit".to_string(),
        );
    }
    if state.delete_confirmation().is_some() {
        return ("DELETE:", theme.footer_delete, " y: confirm, n: cancel".to_string());
    }
    if state.form().is_some() {
        return (
            "FORM:",
            theme.footer_form,
            " Tab/Shift+Tab: field, Enter: save, Esc: cancel".to_string(),
        );
    }
    if state.input_mode() == InputMode::Search {
        return (
            "SEARCH:",
            theme.footer_search,
            " Enter: apply, Esc: clear".to_string(),
        );
    }
    if state.current_focus() == Focus::Sidebar {
        return (
            "NORMAL:",
            theme.footer_normal,
            " j/k: move, Enter: open, Tab: table, l: log, X: sign out, q: quit".to_string(),
        );
    }

    let mut hints = vec!["j/k: row", "n/p: page", "/: search"];
    if let Some(screen) = state.screen() {
        if screen.resource.is_editable() {
            hints.push("c: new");
            hints.push("e: edit");
        }
        hints.push("d: delete");
        if screen.resource.drill_down().is_some() {
            hints.push("Enter: open");
        }
        if !screen.resource.statuses().is_empty() {
            hints.push("s: status");
        }
        if screen.parent.is_some() {
            hints.push("Esc: back");
        }
    }
    hints.push("r: refresh");
    hints.push("q: quit");
    ("LIST:", theme.footer_normal, format!(" {}", hints.join(", ")))
}

/// Render footer widget according to state.
///
pub fn footer(frame: &mut Frame, size: Rect, state: &State) {
    let theme = state.theme();
    let (label, color, hints) = controls(state);
    let controls_content = Line::from(vec![
        Span::styled(
            label,
            Style::default()
                .fg(theme.text.to_color())
                .bg(color.to_color())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(hints, Style::default().fg(theme.warning.to_color())),
    ]);
    let controls_widget = Paragraph::new(controls_content).alignment(Alignment::Left);

    let right_content = Line::from(vec![Span::styled(
        format!(" {} ", env!("CARGO_PKG_VERSION")),
        Style::default().fg(theme.text_muted.to_color()),
    )]);
    let right_content_width = right_content.width();
    let right_widget = Paragraph::new(right_content).alignment(Alignment::Right);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(right_content_width.try_into().unwrap_or(0)),
        ])
        .split(size);

    frame.render_widget(controls_widget, columns[0]);
    frame.render_widget(right_widget, columns[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Api;
    use crate::query::{ListOptions, QueryCache};
    use crate::session::Session;
    use crate::ui::Theme;
    use std::sync::Arc;

    #[test]
    fn test_login_controls() {
        let session = Arc::new(Session::in_memory(None));
        let api = Arc::new(Api::new("http://127.0.0.1:9", session).unwrap());
        let state = State::new(
            api,
            Arc::new(QueryCache::default()),
            ListOptions::default(),
            None,
            Theme::default(),
        );
        let (label, _, hints) = controls(&state);
        assert_eq!(label, "LOGIN:");
        assert!(hints.contains("sign in"));
    }
}
