use super::dialog::centered_rect;
use super::Frame;
use crate::api::FieldKind;
use crate::state::State;
use crate::ui::widgets::styling;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Render the create/edit modal over the list.
///
pub fn form(frame: &mut Frame, size: ratatui::layout::Rect, state: &State) {
    let form = match state.form() {
        Some(form) => form,
        None => return,
    };
    let theme = state.theme();
    let area = centered_rect(60, 70, size);
    frame.render_widget(Clear, area);

    let outer = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {} ", form.title()),
            styling::active_block_title_style(),
        ))
        .border_style(styling::active_block_border_style(theme));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let mut constraints: Vec<Constraint> = form
        .fields
        .iter()
        .map(|field| match field.spec.kind {
            FieldKind::Multiline => Constraint::Length(5),
            _ => Constraint::Length(3),
        })
        .collect();
    constraints.push(Constraint::Min(1));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .margin(1)
        .split(inner);

    for (index, field) in form.fields.iter().enumerate() {
        let focused = index == form.focused;
        let mut title = field.spec.label.to_string();
        if field.spec.required {
            title.push_str(" *");
        }
        if let Some(ref error) = field.error {
            title = format!("{} · {}", title, error);
        }
        let border_style = if field.error.is_some() {
            styling::error_text_style(theme)
        } else if focused {
            styling::active_block_border_style(theme)
        } else {
            styling::normal_block_border_style(theme)
        };
        let value = if focused && !form.submitting {
            format!("{}▏", field.value)
        } else {
            field.value.clone()
        };
        let input = Paragraph::new(value)
            .style(styling::normal_text_style(theme))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(border_style),
            );
        frame.render_widget(input, rows[index]);
    }

    let status = if form.submitting {
        Line::from(Span::styled("Saving...", styling::muted_text_style(theme)))
    } else if let Some(ref error) = form.error {
        Line::from(Span::styled(error.clone(), styling::error_text_style(theme)))
    } else {
        Line::from(Span::styled(
            "Tab: next field, Enter: save, Esc: cancel",
            styling::muted_text_style(theme),
        ))
    };
    frame.render_widget(Paragraph::new(status).wrap(Wrap { trim: true }), rows[form.fields.len()]);
}
