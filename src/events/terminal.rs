use crate::state::{Focus, InputMode, NotificationLevel, State, StateError, View};
use anyhow::Result;
use crossterm::{
    event,
    event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
};
use log::*;
use std::{sync::mpsc, thread, time::Duration};

/// Specify terminal event poll rate in milliseconds.
///
const TICK_RATE_IN_MS: u64 = 60;

/// Specify different terminal event types.
///
#[derive(Debug)]
pub enum Event<I> {
    Input(I),
    Tick,
}

/// Specify struct for managing terminal events channel.
///
pub struct Handler {
    rx: mpsc::Receiver<Event<KeyEvent>>,
    _tx: mpsc::Sender<Event<KeyEvent>>,
}

impl Handler {
    /// Return new instance after spawning new input polling thread.
    ///
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let tx_clone = tx.clone();
        thread::spawn(move || loop {
            let tick_rate = Duration::from_millis(TICK_RATE_IN_MS);
            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                        if tx_clone.send(Event::Input(key)).is_err() {
                            break;
                        }
                    }
                    Ok(_) => (),
                    Err(e) => error!("Failed to read terminal event: {}", e),
                },
                Ok(false) => (),
                Err(e) => {
                    error!("Failed to poll terminal events: {}", e);
                    break;
                }
            }
            if tx_clone.send(Event::Tick).is_err() {
                break;
            }
        });
        Handler { rx, _tx: tx }
    }

    /// Block until the next terminal event arrives. No state is held while
    /// waiting.
    ///
    pub fn next(&self) -> Result<Event<KeyEvent>> {
        Ok(self.rx.recv()?)
    }

    /// Apply a terminal event to the state. Returns true if should continue or
    /// false if exit was requested.
    ///
    pub fn handle(&self, state: &mut State, event: Event<KeyEvent>) -> bool {
        match event {
            Event::Input(key) => handle_key(state, key),
            Event::Tick => {
                state.advance_spinner_index();
                state.tick();
                true
            }
        }
    }
}

impl Default for Handler {
    fn default() -> Self {
        Handler::new()
    }
}

/// Route a key press to the active view, dialog or input. Returns false if
/// exit was requested.
///
fn handle_key(state: &mut State, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        debug!("Processing exit terminal event '{:?}'...", key);
        return false;
    }
    match state.current_view() {
        View::Login => {
            login_key(state, key);
            true
        }
        View::Dashboard if state.delete_confirmation().is_some() => {
            delete_dialog_key(state, key);
            true
        }
        View::Dashboard if state.form().is_some() => {
            form_key(state, key);
            true
        }
        View::Dashboard if state.input_mode() == InputMode::Search => {
            search_key(state, key);
            true
        }
        View::Dashboard => dashboard_key(state, key),
    }
}

/// Return the typed character for unmodified and shifted letters.
///
fn typed(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() => Some(c),
        _ => None,
    }
}

fn login_key(state: &mut State, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            debug!("Processing submit token event...");
            state.submit_token();
        }
        KeyCode::Backspace => state.remove_token_char(),
        _ => {
            if let Some(c) = typed(&key) {
                state.add_token_char(c);
            }
        }
    }
}

fn delete_dialog_key(state: &mut State, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            state.confirm_delete();
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            if !state.cancel_delete() {
                debug!("Delete already sent, waiting for the server");
            }
        }
        _ => (),
    }
}

fn form_key(state: &mut State, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        if !state.close_form() {
            debug!("Form already sent, waiting for the server");
        }
        return;
    }
    if key.code == KeyCode::Enter {
        state.submit_form();
        return;
    }
    let form = match state.form_mut() {
        Some(form) => form,
        None => return,
    };
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.previous_field(),
        KeyCode::Backspace => form.backspace(),
        _ => {
            if let Some(c) = typed(&key) {
                form.insert_char(c);
            }
        }
    }
}

fn search_key(state: &mut State, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => state.finish_search(),
        KeyCode::Esc => state.clear_search(),
        KeyCode::Backspace => state.remove_search_char(),
        _ => {
            if let Some(c) = typed(&key) {
                state.add_search_char(c);
            }
        }
    }
}

fn dashboard_key(state: &mut State, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => {
            debug!("Processing exit terminal event '{:?}'...", key);
            return false;
        }
        KeyCode::Tab => state.toggle_focus(),
        KeyCode::Char('/') => state.start_search(),
        KeyCode::Char('r') => state.refresh(),
        KeyCode::Char('l') => state.toggle_log(),
        KeyCode::Char('X') => state.sign_out(),
        _ => match state.current_focus() {
            Focus::Sidebar => sidebar_key(state, key),
            Focus::Table => {
                if let Err(e) = table_key(state, key) {
                    debug!("Ignoring '{:?}': {}", key.code, e);
                    state.notify(NotificationLevel::Error, e.to_string());
                }
            }
        },
    }
    true
}

fn sidebar_key(state: &mut State, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => state.previous_resource(),
        KeyCode::Down | KeyCode::Char('j') => state.next_resource(),
        KeyCode::Enter | KeyCode::Right => state.open_selected_resource(),
        _ => debug!("Skipping processing of terminal event '{:?}'...", key),
    }
}

fn table_key(state: &mut State, key: KeyEvent) -> Result<(), StateError> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => state.previous_row(),
        KeyCode::Down | KeyCode::Char('j') => state.next_row(),
        KeyCode::Right | KeyCode::Char('n') => state.next_page(),
        KeyCode::Left | KeyCode::Char('p') => state.previous_page(),
        KeyCode::Char('s') => state.cycle_status_filter(),
        KeyCode::Char('c') => state.open_create_form()?,
        KeyCode::Char('e') => state.open_edit_form()?,
        KeyCode::Char('d') => state.request_delete()?,
        KeyCode::Enter => {
            state.drill_down()?;
        }
        KeyCode::Esc => {
            if !state.go_back() {
                state.focus_sidebar();
            }
        }
        _ => debug!("Skipping processing of terminal event '{:?}'...", key),
    }
    Ok(())
}
