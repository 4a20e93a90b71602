use super::Frame;
use crate::state::State;
use crate::ui::widgets::styling;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub const BANNER: &str = "
                         _                               _           _
   __ _  ___  __ _  __| | ___ _ __ ___  _   _        __ _  __| |_ __ ___ (_)_ __
  / _` |/ __|/ _` |/ _` |/ _ \\ '_ ` _ \\| | | |_____ / _` |/ _` | '_ ` _ \\| | '_ \\
 | (_| | (__| (_| | (_| |  __/ | | | | | |_| |_____| (_| | (_| | | | | | | | | | |
  \\__,_|\\___|\\__,_|\\__,_|\\___|_| |_| |_|\\__, |      \\__,_|\\__,_|_| |_| |_|_|_| |_|
                                        |___/
";

pub const INSTRUCTIONS: &str = "Sign in with an administrator access token.

Paste the token issued by the platform below and press Enter.
It is verified against the server and kept in session.yml
next to the configuration file until you sign out or it expires.";

/// Render the sign-in screen.
///
pub fn login(frame: &mut Frame, size: Rect, state: &State) {
    let theme = state.theme();
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Academy Admin - Sign in")
        .border_style(styling::active_block_border_style(theme));
    frame.render_widget(block, size);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .margin(1)
        .split(size);

    let banner = Paragraph::new(BANNER)
        .style(styling::banner_style(theme))
        .alignment(Alignment::Center);
    frame.render_widget(banner, chunks[0]);

    let instructions = Paragraph::new(INSTRUCTIONS)
        .style(styling::normal_text_style(theme))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(instructions, chunks[1]);

    let token_input = state.token_input();
    let (input_text, input_style) = if token_input.is_empty() {
        ("Enter token here...".to_string(), styling::muted_text_style(theme))
    } else {
        (
            "*".repeat(token_input.chars().count().min(50)),
            styling::normal_text_style(theme),
        )
    };
    let (title, border) = if state.is_signing_in() {
        ("Access Token (verifying...)", styling::muted_text_style(theme))
    } else if state.auth_error().is_some() {
        ("Access Token (Enter to resubmit)", styling::error_text_style(theme))
    } else {
        (
            "Access Token (Enter to submit)",
            Style::default().fg(theme.warning.to_color()),
        )
    };
    let input = Paragraph::new(input_text)
        .style(input_style)
        .block(Block::default().borders(Borders::ALL).title(title).border_style(border));
    frame.render_widget(input, chunks[2]);

    if let Some(error) = state.auth_error() {
        let message = Paragraph::new(error.to_string())
            .style(styling::error_text_style(theme))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(message, chunks[3]);
    }
}
