use super::Frame;
use crate::api::Resource;
use crate::state::{Focus, State};
use crate::ui::widgets::styling;
use ratatui::{
    layout::Rect,
    text::Span,
    widgets::{Block, Borders, List, ListItem, ListState},
};

const BLOCK_TITLE: &str = "Resources";

/// Render the resource sidebar according to state.
///
pub fn sidebar(frame: &mut Frame, size: Rect, state: &State) {
    let theme = state.theme();
    let mounted = state.screen().map(|screen| screen.resource);

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(styling::normal_block_border_style(theme));
    if state.current_focus() == Focus::Sidebar {
        block = block
            .border_style(styling::active_block_border_style(theme))
            .title(Span::styled(BLOCK_TITLE, styling::active_block_title_style()));
    } else {
        block = block.title(BLOCK_TITLE);
    }

    let items: Vec<ListItem> = Resource::ALL
        .iter()
        .map(|resource| {
            let marker = if Some(*resource) == mounted { "• " } else { "  " };
            ListItem::new(format!("{}{}", marker, resource.title()))
        })
        .collect();

    let list = List::new(items)
        .style(styling::normal_text_style(theme))
        .highlight_style(styling::highlight_style(theme))
        .block(block);

    let mut list_state = ListState::default();
    list_state.select(Some(state.sidebar_index()));
    frame.render_stateful_widget(list, size, &mut list_state);
}
