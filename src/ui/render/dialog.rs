use super::Frame;
use crate::state::State;
use crate::ui::widgets::styling;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const NOTIFICATION_WIDTH: u16 = 48;

/// Render the delete confirmation dialog on top of the list.
///
pub fn delete_confirmation(frame: &mut Frame, size: Rect, state: &State) {
    let pending = match state.delete_confirmation() {
        Some(pending) => pending,
        None => return,
    };
    let theme = state.theme();
    let popup_area = centered_rect(60, 25, size);
    frame.render_widget(Clear, popup_area);

    let display_name = if pending.label.chars().count() > 45 {
        format!("{}...", pending.label.chars().take(45).collect::<String>())
    } else {
        pending.label.clone()
    };
    let prompt = if pending.submitting {
        Span::styled("Deleting...", styling::muted_text_style(theme))
    } else {
        Span::styled("y/Enter: confirm, n/Esc: cancel", styling::muted_text_style(theme))
    };

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "Delete {}: \"{}\"?",
                pending.mutation.resource.singular(),
                display_name
            ),
            Style::default()
                .fg(theme.text.to_color())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "This action cannot be undone.",
            Style::default()
                .fg(theme.warning.to_color())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(prompt),
    ];

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" Confirm delete ", styling::active_block_title_style()))
                .border_style(Style::default().fg(theme.error.to_color())),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

/// Render pending notifications stacked in the top right corner of the area.
///
pub fn notifications(frame: &mut Frame, size: Rect, state: &State) {
    let theme = state.theme();
    let width = NOTIFICATION_WIDTH.min(size.width);
    let mut y = size.y + 1;
    for notification in state.notifications().iter().rev() {
        if y + 3 > size.y + size.height {
            break;
        }
        let area = Rect::new(size.x + size.width - width, y, width, 3);
        let style = styling::notification_style(theme, notification.level);
        let line = Line::from(vec![
            Span::styled(
                format!("{} ", notification.created_at.format("%H:%M:%S")),
                styling::muted_text_style(theme),
            ),
            Span::styled(notification.message.clone(), style),
        ]);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(line).block(Block::default().borders(Borders::ALL).border_style(style)),
            area,
        );
        y += 3;
    }
}

/// Helper function to create a centered rectangle.
///
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(60, 50, outer);
        assert_eq!(inner.width, 60);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 20);
        assert_eq!(inner.y, 10);
    }
}
