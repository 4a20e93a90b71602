use super::Frame;
use crate::state::State;
use crate::ui::widgets::styling;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders},
};
use tui_logger::TuiLoggerWidget;

/// Render log widget according to state.
///
pub fn log(frame: &mut Frame, size: Rect, state: &State) {
    let theme = state.theme();
    let widget = TuiLoggerWidget::default()
        .block(
            Block::default()
                .title("Log (l to hide)")
                .borders(Borders::ALL)
                .border_style(styling::normal_block_border_style(theme)),
        )
        .style_error(Style::default().fg(theme.error.to_color()))
        .style_warn(Style::default().fg(theme.warning.to_color()))
        .style_info(Style::default().fg(theme.success.to_color()))
        .style_debug(Style::default().fg(theme.text_muted.to_color()))
        .style_trace(Style::default().fg(theme.text_muted.to_color()))
        .style(styling::normal_text_style(theme));
    frame.render_widget(widget, size);
}
