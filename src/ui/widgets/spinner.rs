use crate::state::State;
use crate::ui::widgets::styling;
use ratatui::{
    layout::Alignment,
    text::{Line, Text},
    widgets::Paragraph,
};

/// Frames of the loading animation.
///
pub const FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Return a centered loading paragraph for an area of the given height.
///
pub fn widget(state: &State, height: u16) -> Paragraph<'static> {
    let frame = FRAMES[state.get_spinner_index() % FRAMES.len()];
    let mut lines: Vec<Line> = (0..height.saturating_sub(2) / 2).map(|_| Line::from("")).collect();
    lines.push(Line::from(format!("{} Loading...", frame)));
    Paragraph::new(Text::from(lines))
        .style(styling::muted_text_style(state.theme()))
        .alignment(Alignment::Center)
}
