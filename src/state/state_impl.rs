use crate::api::{Api, Record, Resource};
use crate::app::NetworkEventSender;
use crate::events::network::Event as NetworkEvent;
use crate::query::{Filters, ListOptions, Mutation, MutationOp, QueryCache};
use crate::ui::{Theme, SPINNER_FRAME_COUNT};
use chrono::{DateTime, Local};
use log::*;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::error::StateError;
use super::form::FormState;
use super::navigation::{Focus, InputMode, NotificationLevel, View};
use super::screen::{drill_filters, ListScreen, Parent};

/// How long a notification stays on screen.
///
const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

/// Transient message shown above the footer.
///
#[derive(Clone, Debug)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Local>,
    expires_at: Instant,
}

/// Delete waiting for confirmation, or already sent.
///
#[derive(Clone, Debug)]
pub struct PendingDelete {
    pub mutation: Mutation,
    pub label: String,
    pub submitting: bool,
    pub submission: Option<u64>,
}

/// Houses data representative of application state.
///
pub struct State {
    api: Arc<Api>,
    cache: Arc<QueryCache>,
    list_options: ListOptions,
    net_sender: Option<NetworkEventSender>,
    theme: Theme,
    view: View,
    focus: Focus,
    input_mode: InputMode,
    sidebar_index: usize,
    screen: Option<ListScreen>,
    form: Option<FormState>,
    delete_confirmation: Option<PendingDelete>,
    notifications: Vec<Notification>,
    profile: Option<Record>,
    token_input: String,
    auth_error: Option<String>,
    signing_in: bool,
    show_log: bool,
    spinner_index: usize,
    last_submission: u64,
}

impl State {
    /// Return new state. With a stored session the first resource is mounted
    /// right away, which requires a tokio runtime.
    ///
    pub fn new(
        api: Arc<Api>,
        cache: Arc<QueryCache>,
        list_options: ListOptions,
        net_sender: Option<NetworkEventSender>,
        theme: Theme,
    ) -> Self {
        let mut state = State {
            api,
            cache,
            list_options,
            net_sender,
            theme,
            view: View::Login,
            focus: Focus::Sidebar,
            input_mode: InputMode::Normal,
            sidebar_index: 0,
            screen: None,
            form: None,
            delete_confirmation: None,
            notifications: vec![],
            profile: None,
            token_input: String::new(),
            auth_error: None,
            signing_in: false,
            show_log: false,
            spinner_index: 0,
            last_submission: 0,
        };
        if state.api.session().is_authenticated() {
            state.enter_dashboard();
        }
        state
    }

    pub fn current_view(&self) -> View {
        self.view
    }

    pub fn current_focus(&self) -> Focus {
        self.focus
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn sidebar_index(&self) -> usize {
        self.sidebar_index
    }

    pub fn screen(&self) -> Option<&ListScreen> {
        self.screen.as_ref()
    }

    pub fn screen_mut(&mut self) -> Option<&mut ListScreen> {
        self.screen.as_mut()
    }

    pub fn form(&self) -> Option<&FormState> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut FormState> {
        self.form.as_mut()
    }

    pub fn delete_confirmation(&self) -> Option<&PendingDelete> {
        self.delete_confirmation.as_ref()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn profile(&self) -> Option<&Record> {
        self.profile.as_ref()
    }

    pub fn set_profile(&mut self, profile: Record) {
        self.profile = Some(profile);
    }

    pub fn token_input(&self) -> &str {
        &self.token_input
    }

    pub fn auth_error(&self) -> Option<&str> {
        self.auth_error.as_deref()
    }

    pub fn is_signing_in(&self) -> bool {
        self.signing_in
    }

    pub fn is_log_visible(&self) -> bool {
        self.show_log
    }

    pub fn toggle_log(&mut self) {
        self.show_log = !self.show_log;
    }

    pub fn get_spinner_index(&self) -> usize {
        self.spinner_index
    }

    /// Advance the spinner index.
    ///
    pub fn advance_spinner_index(&mut self) {
        self.spinner_index = (self.spinner_index + 1) % SPINNER_FRAME_COUNT;
    }

    /// Called once per render loop iteration: detects an expired session,
    /// drives the mounted controller and drops stale notifications.
    ///
    pub fn tick(&mut self) {
        if self.view == View::Dashboard && !self.api.session().is_authenticated() {
            self.leave_dashboard(Some("Session expired, sign in again".to_string()));
        }
        if let Some(screen) = self.screen.as_mut() {
            if screen.controller.tick() {
                screen.clamp_selection();
            }
        }
        self.expire_notifications(Instant::now());
        self.cache.evict_expired();
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification {
            level,
            message: message.into(),
            created_at: Local::now(),
            expires_at: Instant::now() + NOTIFICATION_TTL,
        });
    }

    fn expire_notifications(&mut self, now: Instant) {
        self.notifications.retain(|n| n.expires_at > now);
    }

    fn send(&self, event: NetworkEvent) -> bool {
        match self.net_sender {
            Some(ref sender) => match sender.send(event) {
                Ok(_) => true,
                Err(e) => {
                    error!("Failed to dispatch network event: {}", e);
                    false
                }
            },
            None => {
                warn!("No network sender attached, dropping event");
                false
            }
        }
    }

    // Sidebar and screens

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Sidebar => Focus::Table,
            Focus::Table => Focus::Sidebar,
        };
    }

    pub fn focus_sidebar(&mut self) {
        self.focus = Focus::Sidebar;
    }

    pub fn next_resource(&mut self) {
        self.sidebar_index = (self.sidebar_index + 1) % Resource::ALL.len();
    }

    pub fn previous_resource(&mut self) {
        self.sidebar_index = (self.sidebar_index + Resource::ALL.len() - 1) % Resource::ALL.len();
    }

    /// Mount a fresh list for the resource under the sidebar cursor.
    ///
    pub fn open_selected_resource(&mut self) {
        let resource = Resource::ALL[self.sidebar_index];
        info!("Opening {}", resource.title());
        self.mount(resource, Filters::default(), None);
        self.focus = Focus::Table;
    }

    fn mount(&mut self, resource: Resource, filters: Filters, parent: Option<Parent>) {
        let mut options = self.list_options.clone();
        options.filters = filters;
        options.skip = false;
        self.input_mode = InputMode::Normal;
        // Dropping the previous screen cancels its in-flight request.
        self.screen = Some(ListScreen::mount(
            &self.api,
            &self.cache,
            resource,
            options,
            parent,
        ));
    }

    pub fn next_row(&mut self) {
        if let Some(screen) = self.screen.as_mut() {
            screen.select_next();
        }
    }

    pub fn previous_row(&mut self) {
        if let Some(screen) = self.screen.as_mut() {
            screen.select_previous();
        }
    }

    pub fn next_page(&mut self) {
        if let Some(screen) = self.screen.as_mut() {
            screen.controller.next_page();
            screen.table_state.select(None);
        }
    }

    pub fn previous_page(&mut self) {
        if let Some(screen) = self.screen.as_mut() {
            screen.controller.previous_page();
            screen.table_state.select(None);
        }
    }

    pub fn refresh(&mut self) {
        if let Some(screen) = self.screen.as_mut() {
            info!("Refreshing {}", screen.resource.title());
            screen.controller.refetch();
        }
    }

    pub fn cycle_status_filter(&mut self) {
        if let Some(screen) = self.screen.as_mut() {
            screen.cycle_status();
            screen.table_state.select(None);
        }
    }

    /// Open the child list of the selected row. Returns false if the
    /// resource has no child list.
    ///
    pub fn drill_down(&mut self) -> Result<bool, StateError> {
        let screen = self.screen.as_ref().ok_or(StateError::NoScreen)?;
        let child = match screen.resource.drill_down() {
            Some(child) => child,
            None => return Ok(false),
        };
        let record = screen.selected().ok_or(StateError::NoSelection)?;
        let id = record.id().ok_or(StateError::MissingId)?;
        let label = match record.field("name") {
            name if !name.is_empty() => name,
            _ => record.field("title"),
        };
        let parent = Parent {
            resource: screen.resource,
            label,
        };
        info!("Opening {} of {} {}", child.title(), parent.resource.singular(), id);
        let filters = drill_filters(parent.resource, &id);
        self.mount(child, filters, Some(parent));
        Ok(true)
    }

    /// Return to the parent list of a drilled-down screen.
    ///
    pub fn go_back(&mut self) -> bool {
        let parent = match self.screen.as_ref().and_then(|s| s.parent.clone()) {
            Some(parent) => parent,
            None => return false,
        };
        self.mount(parent.resource, Filters::default(), None);
        true
    }

    // Search

    pub fn start_search(&mut self) {
        if self.screen.is_some() {
            self.input_mode = InputMode::Search;
        }
    }

    pub fn add_search_char(&mut self, c: char) {
        if let Some(screen) = self.screen.as_mut() {
            let mut term = screen.controller.search_input().to_owned();
            term.push(c);
            screen.controller.set_search_term(term);
        }
    }

    pub fn remove_search_char(&mut self) {
        if let Some(screen) = self.screen.as_mut() {
            let mut term = screen.controller.search_input().to_owned();
            term.pop();
            screen.controller.set_search_term(term);
        }
    }

    /// Leave search input and apply the typed term without waiting.
    ///
    pub fn finish_search(&mut self) {
        self.input_mode = InputMode::Normal;
        if let Some(screen) = self.screen.as_mut() {
            if screen.controller.flush_search() {
                screen.table_state.select(None);
            }
        }
    }

    pub fn clear_search(&mut self) {
        self.input_mode = InputMode::Normal;
        if let Some(screen) = self.screen.as_mut() {
            screen.controller.set_search_term("");
            screen.controller.flush_search();
        }
    }

    // Forms

    pub fn open_create_form(&mut self) -> Result<(), StateError> {
        let screen = self.screen.as_ref().ok_or(StateError::NoScreen)?;
        let mut form = FormState::create(screen.resource)?;
        // Children opened from a parent row start attached to it.
        if let Some(ref parent) = screen.parent {
            let filters = screen.controller.filters();
            let pinned = match parent.resource {
                Resource::Companies => filters.company_id.as_deref().map(|id| ("companyId", id)),
                Resource::Courses => filters.course_id.as_deref().map(|id| ("courseId", id)),
                _ => None,
            };
            if let Some((name, id)) = pinned {
                if let Some(field) = form.fields.iter_mut().find(|f| f.spec.name == name) {
                    field.value = id.to_owned();
                }
            }
        }
        self.form = Some(form);
        Ok(())
    }

    pub fn open_edit_form(&mut self) -> Result<(), StateError> {
        let screen = self.screen.as_ref().ok_or(StateError::NoScreen)?;
        let record = screen.selected().ok_or(StateError::NoSelection)?;
        self.form = Some(FormState::edit(screen.resource, record)?);
        Ok(())
    }

    /// Close the form unless its mutation is still in flight.
    ///
    pub fn close_form(&mut self) -> bool {
        match self.form {
            Some(ref form) if form.submitting => false,
            _ => {
                self.form = None;
                true
            }
        }
    }

    fn next_submission(&mut self) -> u64 {
        self.last_submission += 1;
        self.last_submission
    }

    /// Validate and, if valid, dispatch the form's mutation. Returns true if
    /// the mutation was sent.
    ///
    pub fn submit_form(&mut self) -> bool {
        let submission = self.next_submission();
        let mutation = match self.form.as_mut() {
            Some(form) if !form.submitting => {
                if !form.validate() {
                    debug!("Form for {} is invalid", form.resource.endpoint());
                    return false;
                }
                form.start_submit(submission);
                form.to_mutation()
            }
            _ => return false,
        };
        info!("{}...", mutation.describe());
        let sent = self.send(NetworkEvent::Mutate {
            submission,
            mutation,
        });
        if !sent {
            if let Some(form) = self.form.as_mut() {
                form.fail_submit("Could not reach the network worker".to_string());
            }
        }
        sent
    }

    // Delete

    pub fn request_delete(&mut self) -> Result<(), StateError> {
        let screen = self.screen.as_ref().ok_or(StateError::NoScreen)?;
        let record = screen.selected().ok_or(StateError::NoSelection)?;
        let id = record.id().ok_or(StateError::MissingId)?;
        let label = screen
            .resource
            .columns()
            .first()
            .map(|column| record.field(column.field))
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| id.clone());
        self.delete_confirmation = Some(PendingDelete {
            mutation: Mutation::delete(screen.resource, &id),
            label,
            submitting: false,
            submission: None,
        });
        Ok(())
    }

    pub fn confirm_delete(&mut self) -> bool {
        let submission = self.next_submission();
        let mutation = match self.delete_confirmation.as_mut() {
            Some(pending) if !pending.submitting => {
                pending.submitting = true;
                pending.submission = Some(submission);
                pending.mutation.clone()
            }
            _ => return false,
        };
        info!("{}...", mutation.describe());
        let sent = self.send(NetworkEvent::Mutate {
            submission,
            mutation,
        });
        if !sent {
            self.delete_confirmation = None;
        }
        sent
    }

    /// Dismiss the dialog unless its delete is still in flight.
    ///
    pub fn cancel_delete(&mut self) -> bool {
        match self.delete_confirmation {
            Some(ref pending) if pending.submitting => false,
            _ => {
                self.delete_confirmation = None;
                true
            }
        }
    }

    fn owns_delete(&self, submission: u64) -> bool {
        matches!(self.delete_confirmation, Some(ref p) if p.submission == Some(submission))
    }

    fn owns_form(&self, submission: u64) -> bool {
        matches!(self.form, Some(ref f) if f.submission == Some(submission))
    }

    /// Apply a successful mutation: close the dialog that sent it and notify.
    /// Dialogs opened after the submission are left alone.
    ///
    pub fn mutation_succeeded(&mut self, submission: u64, mutation: &Mutation) {
        match mutation.op {
            MutationOp::Delete { .. } => {
                if self.owns_delete(submission) {
                    self.delete_confirmation = None;
                }
            }
            MutationOp::Create { .. } | MutationOp::Update { .. } => {
                if self.owns_form(submission) {
                    self.form = None;
                }
            }
        }
        self.notify(
            NotificationLevel::Success,
            format!("{} succeeded", mutation.describe()),
        );
    }

    /// Apply a failed mutation. Forms stay open with their values.
    ///
    pub fn mutation_failed(&mut self, submission: u64, mutation: &Mutation, message: String) {
        match mutation.op {
            MutationOp::Delete { .. } => {
                if self.owns_delete(submission) {
                    self.delete_confirmation = None;
                }
            }
            MutationOp::Create { .. } | MutationOp::Update { .. } => {
                if self.owns_form(submission) {
                    if let Some(form) = self.form.as_mut() {
                        form.fail_submit(message.clone());
                    }
                }
            }
        }
        self.notify(
            NotificationLevel::Error,
            format!("{} failed: {}", mutation.describe(), message),
        );
    }

    // Login

    pub fn add_token_char(&mut self, c: char) {
        if !self.signing_in {
            self.token_input.push(c);
            self.auth_error = None;
        }
    }

    pub fn remove_token_char(&mut self) {
        if !self.signing_in {
            self.token_input.pop();
        }
    }

    /// Send the typed token for verification. Blank input is refused.
    ///
    pub fn submit_token(&mut self) -> bool {
        let token = self.token_input.trim().to_owned();
        if token.is_empty() {
            self.auth_error = Some("Paste an access token first".to_string());
            return false;
        }
        if self.signing_in {
            return false;
        }
        self.signing_in = true;
        self.auth_error = None;
        let sent = self.send(NetworkEvent::SignIn { token });
        if !sent {
            self.signing_in = false;
        }
        sent
    }

    pub fn sign_in_succeeded(&mut self, profile: Record) {
        self.signing_in = false;
        self.token_input.clear();
        self.auth_error = None;
        self.profile = Some(profile);
        self.enter_dashboard();
    }

    pub fn sign_in_failed(&mut self, message: String) {
        self.signing_in = false;
        self.auth_error = Some(message);
    }

    /// Forget the stored token and return to the login view.
    ///
    pub fn sign_out(&mut self) {
        info!("Signing out");
        self.api.session().sign_out();
        self.leave_dashboard(None);
    }

    fn enter_dashboard(&mut self) {
        self.view = View::Dashboard;
        self.open_selected_resource();
    }

    fn leave_dashboard(&mut self, reason: Option<String>) {
        if let Some(ref reason) = reason {
            warn!("{}", reason);
        }
        self.screen = None;
        self.form = None;
        self.delete_confirmation = None;
        self.profile = None;
        self.input_mode = InputMode::Normal;
        self.focus = Focus::Sidebar;
        self.cache.clear();
        self.view = View::Login;
        self.auth_error = reason;
    }
}
