//! Mounted list screen.

use crate::api::{Api, Record, Resource, ResourceSource};
use crate::query::{Filters, ListController, ListOptions, QueryCache};
use ratatui::widgets::TableState;
use std::sync::Arc;

/// Parent row a drilled-down list is scoped to.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parent {
    pub resource: Resource,
    pub label: String,
}

/// One resource list with its controller and table selection.
///
pub struct ListScreen {
    pub resource: Resource,
    pub controller: ListController<Record>,
    pub table_state: TableState,
    pub parent: Option<Parent>,
}

impl ListScreen {
    /// Mount a fresh screen. Must be called within a tokio runtime since the
    /// controller issues its first request immediately.
    ///
    pub fn mount(
        api: &Arc<Api>,
        cache: &Arc<QueryCache>,
        resource: Resource,
        options: ListOptions,
        parent: Option<Parent>,
    ) -> Self {
        let source = Arc::new(ResourceSource::new(Arc::clone(api), resource));
        ListScreen {
            resource,
            controller: ListController::new(source, Arc::clone(cache), options),
            table_state: TableState::default(),
            parent,
        }
    }

    pub fn title(&self) -> String {
        match self.parent {
            Some(ref parent) => format!("{} of {}", self.resource.title(), parent.label),
            None => self.resource.title().to_string(),
        }
    }

    pub fn selected(&self) -> Option<&Record> {
        self.table_state
            .selected()
            .and_then(|index| self.controller.state().items.get(index))
    }

    pub fn select_next(&mut self) {
        let len = self.controller.state().items.len();
        if len == 0 {
            return;
        }
        let next = match self.table_state.selected() {
            Some(index) if index + 1 < len => index + 1,
            Some(index) => index,
            None => 0,
        };
        self.table_state.select(Some(next));
    }

    pub fn select_previous(&mut self) {
        if self.controller.state().items.is_empty() {
            return;
        }
        let previous = match self.table_state.selected() {
            Some(index) => index.saturating_sub(1),
            None => 0,
        };
        self.table_state.select(Some(previous));
    }

    /// Keep the selection on a row that exists after the items changed.
    ///
    pub fn clamp_selection(&mut self) {
        let len = self.controller.state().items.len();
        match self.table_state.selected() {
            _ if len == 0 => self.table_state.select(None),
            Some(index) if index >= len => self.table_state.select(Some(len - 1)),
            None => self.table_state.select(Some(0)),
            Some(_) => (),
        }
    }

    pub fn status_filter(&self) -> Option<&str> {
        self.controller.filters().status.as_deref()
    }

    /// Step through All and each status the resource knows.
    ///
    pub fn cycle_status(&mut self) {
        let statuses = self.resource.statuses();
        if statuses.is_empty() {
            return;
        }
        let next = match self.status_filter() {
            None => Some(statuses[0]),
            Some(current) => statuses
                .iter()
                .position(|s| *s == current)
                .and_then(|index| statuses.get(index + 1))
                .copied(),
        };
        let mut filters = self.controller.filters().clone();
        filters.status = next.map(str::to_owned);
        self.controller.set_filters(filters);
    }
}

/// Filters of the child list opened from a parent row.
///
pub fn drill_filters(parent: Resource, id: &str) -> Filters {
    let mut filters = Filters::default();
    match parent {
        Resource::Companies => filters.company_id = Some(id.to_owned()),
        Resource::Tests => filters.test_id = Some(id.to_owned()),
        Resource::Courses => filters.course_id = Some(id.to_owned()),
        _ => (),
    }
    filters
}
