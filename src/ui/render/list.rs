use super::widgets::spinner;
use super::Frame;
use crate::api::Record;
use crate::query::ListViewState;
use crate::state::{Focus, InputMode, State};
use crate::ui::widgets::styling;
use crate::ui::Theme;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};

const ERROR_PLACEHOLDER: &str = "Server error";

/// Render the mounted list screen: search bar, table and pagination line.
///
pub fn list(frame: &mut Frame, size: Rect, state: &mut State) {
    let theme = state.theme().clone();
    let focused = state.current_focus() == Focus::Table;
    let searching = state.input_mode() == InputMode::Search;
    let loading = spinner::widget(state, size.height.saturating_sub(4));

    let screen = match state.screen_mut() {
        Some(screen) => screen,
        None => {
            let hint = Paragraph::new("Select a resource on the left")
                .style(styling::muted_text_style(&theme))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(hint, size);
            return;
        }
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(size);

    // Search bar
    let input = screen.controller.search_input();
    let search_line = if searching {
        Line::from(vec![
            Span::styled("/", styling::header_style(&theme)),
            Span::styled(format!("{}▏", input), styling::normal_text_style(&theme)),
        ])
    } else if input.is_empty() {
        Line::from(Span::styled("Press / to search", styling::muted_text_style(&theme)))
    } else {
        Line::from(Span::styled(format!("/{}", input), styling::normal_text_style(&theme)))
    };
    let mut search_title = "Search".to_string();
    if !screen.resource.statuses().is_empty() {
        search_title = format!(
            "Search · status: {}",
            screen.status_filter().unwrap_or("all")
        );
    }
    let search_block = Block::default()
        .borders(Borders::ALL)
        .title(search_title)
        .border_style(if searching {
            styling::active_block_border_style(&theme)
        } else {
            styling::normal_block_border_style(&theme)
        });
    frame.render_widget(Paragraph::new(search_line).block(search_block), rows[0]);

    // Table
    let view = screen.controller.state();
    let mut title = screen.title();
    if view.is_loading && view.has_loaded {
        title.push_str(" ⟳");
    }
    let block = if focused {
        Block::default()
            .borders(Borders::ALL)
            .border_style(styling::active_block_border_style(&theme))
            .title(Span::styled(title, styling::active_block_title_style()))
    } else {
        Block::default()
            .borders(Borders::ALL)
            .border_style(styling::normal_block_border_style(&theme))
            .title(title)
    };

    if view.is_error {
        let detail = view.error.clone().unwrap_or_default();
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(ERROR_PLACEHOLDER, styling::error_text_style(&theme))),
            Line::from(Span::styled(detail, styling::muted_text_style(&theme))),
            Line::from(""),
            Line::from(Span::styled("Press r to retry", styling::muted_text_style(&theme))),
        ];
        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(paragraph, rows[1]);
    } else if view.is_loading && !view.has_loaded {
        frame.render_widget(loading.block(block), rows[1]);
    } else if view.is_empty() {
        let message = if view.search_term.is_empty() {
            format!("No {} found", screen.resource.title().to_lowercase())
        } else {
            format!("No results for \"{}\"", view.search_term)
        };
        let paragraph = Paragraph::new(vec![Line::from(""), Line::from(message)])
            .style(styling::muted_text_style(&theme))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, rows[1]);
    } else {
        let columns = screen.resource.columns();
        let header = Row::new(columns.iter().map(|c| Cell::from(c.header)))
            .style(styling::header_style(&theme))
            .bottom_margin(1);
        let body: Vec<Row> = view
            .items
            .iter()
            .map(|record: &Record| {
                Row::new(columns.iter().map(|c| Cell::from(record.field(c.field))))
            })
            .collect();
        let widths: Vec<Constraint> = columns.iter().map(|c| Constraint::Percentage(c.width)).collect();
        let table = Table::new(body, widths)
            .header(header)
            .style(styling::normal_text_style(&theme))
            .highlight_style(styling::highlight_style(&theme))
            .block(block);
        frame.render_stateful_widget(table, rows[1], &mut screen.table_state);
    }

    let footer = Paragraph::new(pagination(view, &theme)).alignment(Alignment::Right);
    frame.render_widget(footer, rows[2]);
}

/// Return the "first-last of total · page x/y" line.
///
fn pagination<'a>(view: &ListViewState<Record>, theme: &Theme) -> Line<'a> {
    let pages = view.total_pages.max(1);
    let position = match view.visible_range() {
        Some((first, last)) => format!("{}-{} of {}", first, last, view.total),
        None => format!("0 of {}", view.total),
    };
    let previous = if view.has_previous_page() { "‹ p " } else { "    " };
    let next = if view.has_next_page() { " n ›" } else { "    " };
    Line::from(vec![
        Span::styled(previous, styling::header_style(theme)),
        Span::styled(
            format!("{} · page {}/{}", position, view.current_page, pages),
            styling::muted_text_style(theme),
        ),
        Span::styled(format!("{} ", next), styling::header_style(theme)),
    ])
}
