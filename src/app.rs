use crate::api::Api;
use crate::config::{Config, ConfigError};
use crate::error::AppError;
use crate::events::network::{Event as NetworkEvent, Handler as NetworkEventHandler};
use crate::events::terminal::Handler as TerminalEventHandler;
use crate::query::{ListOptions, QueryCache};
use crate::session::Session;
use crate::state::State;
use crate::ui::Theme;
use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::*;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout, Stdout};
use std::sync::Arc;
use tokio::sync::Mutex;
use tui_logger::{init_logger, set_default_level};

pub type NetworkEventSender = std::sync::mpsc::Sender<NetworkEvent>;
type NetworkEventReceiver = std::sync::mpsc::Receiver<NetworkEvent>;

/// Oversees event processing, state management, and terminal output.
///
pub struct App {
    api: Arc<Api>,
    cache: Arc<QueryCache>,
    state: Arc<Mutex<State>>,
}

impl App {
    /// Start a new application according to the given configuration. Returns
    /// the result of the application execution.
    ///
    pub async fn start(config: Config) -> Result<()> {
        let level = config.log_level_filter();
        init_logger(level).map_err(|e| AppError::Logger(format!("{:?}", e)))?;
        set_default_level(level);

        info!("Starting application...");
        let dir_path = config.dir_path().ok_or(ConfigError::FilePathNotSet)?;
        let session = Arc::new(Session::load(dir_path)?);
        let api = Arc::new(Api::new(&config.api_base_url, Arc::clone(&session))?);
        let cache = Arc::new(QueryCache::new(config.cache_keep_for()));
        let theme = Theme::from_name(&config.theme_name).unwrap_or_else(|| {
            warn!("Unknown theme '{}', using default", config.theme_name);
            Theme::default()
        });
        let list_options = ListOptions {
            limit: config.page_size(),
            debounce: config.search_debounce(),
            ..ListOptions::default()
        };

        let (tx, rx) = std::sync::mpsc::channel::<NetworkEvent>();
        let state = State::new(
            Arc::clone(&api),
            Arc::clone(&cache),
            list_options,
            Some(tx.clone()),
            theme,
        );
        let app = App {
            api,
            cache,
            state: Arc::new(Mutex::new(state)),
        };
        app.start_network(rx);

        if session.is_authenticated() {
            tx.send(NetworkEvent::Me)?;
        }
        app.start_ui().await?;

        info!("Exiting application...");
        Ok(())
    }

    /// Start a separate thread for sign-in and mutation requests.
    ///
    fn start_network(&self, net_receiver: NetworkEventReceiver) {
        debug!("Creating new thread for asynchronous networking...");
        let cloned_state = Arc::clone(&self.state);
        let api = Arc::clone(&self.api);
        let cache = Arc::clone(&self.cache);
        std::thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!("Failed to start network runtime: {}", e);
                    return;
                }
            };
            runtime.block_on(async {
                let mut network_event_handler = NetworkEventHandler::new(&cloned_state, &api, &cache);
                while let Ok(network_event) = net_receiver.recv() {
                    if let Err(e) = network_event_handler.handle(network_event).await {
                        error!("Failed to handle network event: {}", e);
                    }
                }
            })
        });
    }

    /// Begin the terminal event poll on a separate thread before starting the
    /// render loop. Return the result following an exit request or
    /// unrecoverable error. The terminal is restored in both cases.
    ///
    async fn start_ui(&self) -> Result<()> {
        debug!("Starting user interface on main thread...");
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        enable_raw_mode()?;

        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;

        let result = self.render_loop(&mut terminal).await;

        disable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, LeaveAlternateScreen, DisableMouseCapture)?;
        terminal.show_cursor()?;

        result
    }

    async fn render_loop(&self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let terminal_event_handler = TerminalEventHandler::new();
        loop {
            {
                let mut state = self.state.lock().await;
                terminal.draw(|frame| crate::ui::render(frame, &mut state))?;
            }
            // The network thread may update the state while we wait for input.
            let event = tokio::task::block_in_place(|| terminal_event_handler.next())?;
            let mut state = self.state.lock().await;
            if !terminal_event_handler.handle(&mut state, event) {
                debug!("Received application exit request.");
                break;
            }
        }
        Ok(())
    }
}
