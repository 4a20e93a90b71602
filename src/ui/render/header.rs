use super::Frame;
use crate::state::State;
use crate::ui::widgets::styling;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};

const TITLE: &str = " Academy Admin";

/// Render the title bar with the signed-in operator.
///
pub fn header(frame: &mut Frame, size: Rect, state: &State) {
    let theme = state.theme();
    let operator = match state.profile() {
        Some(profile) => {
            let name = profile.field("name");
            let role = profile.field("role");
            if role.is_empty() {
                format!("{} ", name)
            } else {
                format!("{} ({}) ", name, role)
            }
        }
        None => "… ".to_string(),
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(operator.chars().count() as u16)].as_ref())
        .split(size);

    let title = Paragraph::new(Line::from(Span::styled(TITLE, styling::header_style(theme))));
    let operator = Paragraph::new(Line::from(Span::styled(
        operator,
        styling::muted_text_style(theme),
    )))
    .alignment(Alignment::Right);

    frame.render_widget(title, columns[0]);
    frame.render_widget(operator, columns[1]);
}
